//! Pattern Detection
//!
//! A fixed catalog of Unreal Engine idioms and a rule-table matcher that
//! finds them line by line, attaching improvement suggestions and learning
//! resources. Nothing here is inferred; every rule is a literal or regex.
//!
//! @module knowledge/patterns

use crate::core::error::{Error, Result};
use crate::extract::context_window;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// =============================================================================
// TYPES
// =============================================================================

/// A known idiom in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternInfo {
    pub name: String,
    pub description: String,
    pub best_practices: Vec<String>,
    pub documentation: String,
    pub examples: Vec<String>,
    pub related_patterns: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Documentation,
    Community,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningResource {
    pub title: String,
    pub url: String,
    pub kind: ResourceKind,
}

/// One occurrence of a catalog pattern in a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodePatternMatch {
    pub pattern: String,
    pub file: PathBuf,
    /// 1-based line
    pub line: usize,
    pub context: String,
    pub suggestions: Vec<String>,
    pub learning_resources: Vec<LearningResource>,
}

// =============================================================================
// CATALOG
// =============================================================================

const DOCS_BASE: &str = "https://dev.epicgames.com/documentation/en-us/unreal-engine";
const COMMUNITY_WIKI: &str = "https://unrealcommunity.wiki";

fn entry(
    name: &str,
    description: &str,
    best_practices: &[&str],
    doc_path: &str,
    examples: &[&str],
    related: &[&str],
) -> PatternInfo {
    PatternInfo {
        name: name.to_string(),
        description: description.to_string(),
        best_practices: best_practices.iter().map(|s| s.to_string()).collect(),
        documentation: format!("{}/{}", DOCS_BASE, doc_path),
        examples: examples.iter().map(|s| s.to_string()).collect(),
        related_patterns: related.iter().map(|s| s.to_string()).collect(),
    }
}

static CATALOG: Lazy<Vec<PatternInfo>> = Lazy::new(|| {
    vec![
        entry(
            "UPROPERTY",
            "Exposes a member variable to the reflection system, editor and Blueprints",
            &[
                "Always give editable properties a Category",
                "Use the narrowest edit specifier that works (EditDefaultsOnly over EditAnywhere)",
                "Mark UObject pointers as UPROPERTY so the garbage collector tracks them",
                "Prefer TObjectPtr<> for UObject member pointers",
            ],
            "unreal-engine-uproperties",
            &[
                "UPROPERTY(EditAnywhere, BlueprintReadWrite, Category = \"Stats\")\nfloat Health = 100.f;",
                "UPROPERTY(VisibleAnywhere, Category = \"Components\")\nTObjectPtr<UStaticMeshComponent> Mesh;",
            ],
            &["UFUNCTION", "Property Replication"],
        ),
        entry(
            "UFUNCTION",
            "Exposes a member function to the reflection system, Blueprints or RPCs",
            &[
                "Give Blueprint-callable functions a Category",
                "Use BlueprintPure only for functions without side effects",
                "Validate RPC parameters with WithValidation on server functions",
            ],
            "ufunctions-in-unreal-engine",
            &["UFUNCTION(BlueprintCallable, Category = \"Combat\")\nvoid ApplyDamage(float Amount);"],
            &["UPROPERTY", "Delegate Declaration"],
        ),
        entry(
            "UCLASS",
            "Declares a class to the reflection system",
            &[
                "Add Blueprintable or BlueprintType when designers extend or reference the class",
                "Keep GENERATED_BODY() as the first line of the class body",
            ],
            "class-specifiers",
            &["UCLASS(Blueprintable)\nclass AMyActor : public AActor"],
            &["UPROPERTY", "UFUNCTION"],
        ),
        entry(
            "Component Creation",
            "Creates default subobjects (components) in an actor constructor",
            &[
                "Create components only in the constructor",
                "Name subobjects with TEXT() literals that are unique per owner",
                "Attach components with SetupAttachment, not AttachToComponent, in constructors",
            ],
            "creating-and-attaching-actor-components-in-unreal-engine",
            &["Mesh = CreateDefaultSubobject<UStaticMeshComponent>(TEXT(\"Mesh\"));"],
            &["UPROPERTY", "Actor Tick"],
        ),
        entry(
            "Delegate Declaration",
            "Declares single-cast, multicast or dynamic delegate types",
            &[
                "Use dynamic delegates only when Blueprints must bind to them",
                "Unbind delegates when the listener is destroyed",
            ],
            "delegates-and-lamba-functions-in-unreal-engine",
            &["DECLARE_DYNAMIC_MULTICAST_DELEGATE_OneParam(FOnHealthChanged, float, NewHealth);"],
            &["UFUNCTION"],
        ),
        entry(
            "Property Replication",
            "Replicates actor properties from server to clients",
            &[
                "Register every replicated property in GetLifetimeReplicatedProps",
                "Use replication conditions to reduce bandwidth",
                "Prefer RepNotify over polling for reacting to replicated changes",
            ],
            "replicate-actor-properties-in-unreal-engine",
            &["DOREPLIFETIME(AMyActor, Health);"],
            &["UPROPERTY", "UFUNCTION"],
        ),
        entry(
            "Actor Tick",
            "Enables per-frame updates for an actor",
            &[
                "Disable ticking for actors that do not need per-frame work",
                "Use timers or events instead of polling in Tick",
                "Raise TickInterval for low-frequency updates",
            ],
            "actor-ticking-in-unreal-engine",
            &["PrimaryActorTick.bCanEverTick = true;"],
            &["Timer Management"],
        ),
        entry(
            "Timer Management",
            "Schedules delayed or repeating callbacks through the world timer manager",
            &[
                "Keep the FTimerHandle to clear the timer later",
                "Clear timers in EndPlay",
            ],
            "gameplay-timers-in-unreal-engine",
            &["GetWorldTimerManager().SetTimer(TimerHandle, this, &AMyActor::OnTimer, 1.0f, true);"],
            &["Actor Tick"],
        ),
        entry(
            "Soft Object Reference",
            "References assets without forcing them to load",
            &[
                "Use soft references for large or rarely used assets",
                "Load soft references asynchronously through the streamable manager",
            ],
            "referencing-assets-in-unreal-engine",
            &["TSoftObjectPtr<UTexture2D> Icon;"],
            &["UPROPERTY"],
        ),
    ]
});

/// Dedicated per-pattern line matchers
static MATCHERS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    [
        ("UPROPERTY", r"\bUPROPERTY\s*\("),
        ("UFUNCTION", r"\bUFUNCTION\s*\("),
        ("UCLASS", r"\bUCLASS\s*\("),
        ("Component Creation", r"\bCreateDefaultSubobject\s*<"),
        (
            "Delegate Declaration",
            r"\bDECLARE_(?:DYNAMIC_)?(?:MULTICAST_)?DELEGATE",
        ),
        (
            "Property Replication",
            r"\bDOREPLIFETIME(?:_CONDITION)?\s*\(|\bGetLifetimeReplicatedProps\b",
        ),
        ("Actor Tick", r"\bPrimaryActorTick\.bCanEverTick\b"),
        (
            "Timer Management",
            r"\bGetWorldTimerManager\s*\(\s*\)\s*\.\s*SetTimer\b",
        ),
        ("Soft Object Reference", r"\bTSoft(?:Object|Class)Ptr\s*<"),
    ]
    .into_iter()
    .map(|(name, source)| (name, Regex::new(source).unwrap()))
    .collect()
});

static EDITOR_SPECIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:Edit|Visible)(?:Anywhere|DefaultsOnly|InstanceOnly)\b|\bBlueprintRead(?:Only|Write)\b")
        .unwrap()
});

/// The full pattern catalog
pub fn catalog() -> &'static [PatternInfo] {
    &CATALOG
}

// =============================================================================
// MATCHING
// =============================================================================

/// Whether a line matches a pattern's dedicated regex
pub fn is_pattern_match(pattern: &PatternInfo, line: &str) -> bool {
    MATCHERS
        .iter()
        .find(|(name, _)| *name == pattern.name)
        .is_some_and(|(_, re)| re.is_match(line))
}

/// First line of the pattern's first example, if any
fn example_head(pattern: &PatternInfo) -> Option<&str> {
    pattern
        .examples
        .first()
        .and_then(|e| e.lines().next())
        .map(str::trim)
        .filter(|l| !l.is_empty())
}

/// Scan content for every catalog pattern.
///
/// Results are ordered by catalog entry, then by line.
pub fn detect_patterns(content: &str, file: &Path) -> Vec<CodePatternMatch> {
    let lines: Vec<&str> = content.lines().collect();
    let mut matches = Vec::new();

    for pattern in catalog() {
        let head = example_head(pattern);
        for (index, line) in lines.iter().enumerate() {
            let example_hit = head.is_some_and(|h| line.contains(h));
            if !example_hit && !is_pattern_match(pattern, line) {
                continue;
            }

            matches.push(CodePatternMatch {
                pattern: pattern.name.clone(),
                file: file.to_path_buf(),
                line: index + 1,
                context: context_window(&lines, index),
                suggestions: suggestions_for(pattern, line),
                learning_resources: learning_resources(pattern),
            });
        }
    }

    matches
}

/// Fixed per-pattern heuristics
fn suggestions_for(pattern: &PatternInfo, line: &str) -> Vec<String> {
    let mut suggestions = Vec::new();

    match pattern.name.as_str() {
        "UPROPERTY" => {
            if !line.contains("Category") {
                suggestions.push(
                    "Add a Category specifier to organize this property in the editor".to_string(),
                );
            }
            if !EDITOR_SPECIFIER.is_match(line) {
                suggestions.push(
                    "Consider an editor or Blueprint access specifier (e.g. EditDefaultsOnly, BlueprintReadOnly)"
                        .to_string(),
                );
            }
        }
        "UFUNCTION" => {
            let blueprint_exposed = line.contains("BlueprintCallable") || line.contains("BlueprintPure");
            if blueprint_exposed && !line.contains("Category") {
                suggestions.push(
                    "Add a Category specifier so the function is easy to find in Blueprints"
                        .to_string(),
                );
            }
        }
        "UCLASS" => {
            if line.contains("UCLASS()") {
                suggestions.push(
                    "Add Blueprintable or BlueprintType if designers need to use this class"
                        .to_string(),
                );
            }
        }
        "Component Creation" => {
            if !line.contains("TEXT(") {
                suggestions.push("Wrap the subobject name in TEXT()".to_string());
            }
        }
        "Delegate Declaration" => {
            if line.contains("DYNAMIC") {
                suggestions.push(
                    "Use a non-dynamic delegate unless Blueprints need to bind to it".to_string(),
                );
            }
        }
        "Property Replication" => {
            if line.contains("DOREPLIFETIME(") {
                suggestions.push(
                    "Consider DOREPLIFETIME_CONDITION to limit replication to relevant connections"
                        .to_string(),
                );
            }
        }
        "Actor Tick" => {
            if line.contains("true") {
                suggestions.push(
                    "Disable ticking if this actor has no per-frame work, or raise its tick interval"
                        .to_string(),
                );
            }
        }
        _ => {}
    }

    suggestions
}

/// Official documentation plus a community wiki search derived from the name
pub fn learning_resources(pattern: &PatternInfo) -> Vec<LearningResource> {
    let slug = pattern.name.to_lowercase().replace(' ', "-");
    vec![
        LearningResource {
            title: format!("{} documentation", pattern.name),
            url: pattern.documentation.clone(),
            kind: ResourceKind::Documentation,
        },
        LearningResource {
            title: format!("{} on the community wiki", pattern.name),
            url: format!("{}/{}", COMMUNITY_WIKI, slug),
            kind: ResourceKind::Community,
        },
    ]
}

/// Look up a catalog entry by name: exact (case-insensitive) first, then
/// the first entry whose name contains the concept
pub fn best_practices(concept: &str) -> Result<PatternInfo> {
    let wanted = concept.trim().to_lowercase();
    if wanted.is_empty() {
        return Err(Error::InvalidArgument {
            message: "concept must not be empty".to_string(),
        });
    }

    catalog()
        .iter()
        .find(|p| p.name.to_lowercase() == wanted)
        .or_else(|| {
            catalog()
                .iter()
                .find(|p| p.name.to_lowercase().contains(&wanted))
        })
        .cloned()
        .ok_or_else(|| Error::UnknownPattern {
            name: concept.to_string(),
        })
}

// =============================================================================
// TESTS
// =============================================================================
