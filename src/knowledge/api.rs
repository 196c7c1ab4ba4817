//! API reference synthesis
//!
//! Builds documentation-like records from extracted classes and their
//! leading comments, and ranks them against free-text queries.
//!
//! @module knowledge/api

use crate::extract::{ClassInfo, MethodInfo, PropertyInfo, Visibility};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// Default number of results returned by a query
pub const DEFAULT_MAX_RESULTS: usize = 10;

const NAME_WEIGHT: u32 = 10;
const CATEGORY_WEIGHT: u32 = 5;
const MODULE_WEIGHT: u32 = 5;
const FIELD_WEIGHT: u32 = 2;

// =============================================================================
// TYPES
// =============================================================================

/// Coarse class category, inferred from naming conventions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApiCategory {
    Object,
    Actor,
    Structure,
    Component,
    Miscellaneous,
}

impl ApiCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Object => "Object",
            Self::Actor => "Actor",
            Self::Structure => "Structure",
            Self::Component => "Component",
            Self::Miscellaneous => "Miscellaneous",
        }
    }
}

impl std::fmt::Display for ApiCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One documented member row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDoc {
    pub name: String,
    pub signature: String,
    pub visibility: Visibility,
    pub line: usize,
}

/// Documentation record derived from a [`ClassInfo`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiReference {
    pub class_name: String,
    pub description: String,
    pub syntax: String,
    pub category: ApiCategory,
    pub module: String,
    pub file: PathBuf,
    pub line: usize,
    pub examples: Vec<String>,
    pub remarks: Vec<String>,
    pub see_also: Vec<String>,
    pub methods: Vec<MemberDoc>,
    pub properties: Vec<MemberDoc>,
}

/// Filters and limits for [`query`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiQueryOptions {
    pub category: Option<String>,
    pub module: Option<String>,
    pub max_results: usize,
    pub include_examples: bool,
}

impl Default for ApiQueryOptions {
    fn default() -> Self {
        Self {
            category: None,
            module: None,
            max_results: DEFAULT_MAX_RESULTS,
            include_examples: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiQueryResult {
    pub reference: ApiReference,
    pub relevance: u32,
}

/// Comment text split into its documentation parts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedComments {
    pub description: String,
    pub examples: Vec<String>,
    pub remarks: Vec<String>,
    pub see_also: Vec<String>,
}

// =============================================================================
// SYNTHESIS
// =============================================================================

impl ApiReference {
    pub fn from_class(class: &ClassInfo) -> Self {
        let docs = parse_comments(&class.comments);

        Self {
            class_name: class.name.clone(),
            description: docs.description,
            syntax: render_syntax(&class.name, &class.superclasses),
            category: classify_category(&class.name, &class.superclasses),
            module: infer_module(&class.file),
            file: class.file.clone(),
            line: class.line,
            examples: docs.examples,
            remarks: docs.remarks,
            see_also: docs.see_also,
            methods: class.methods.iter().map(method_doc).collect(),
            properties: class.properties.iter().map(property_doc).collect(),
        }
    }

    /// Lowercased text of every searchable field
    fn haystack(&self) -> String {
        let mut fields = vec![
            self.class_name.clone(),
            self.description.clone(),
            self.syntax.clone(),
            self.category.as_str().to_string(),
            self.module.clone(),
            self.file.display().to_string(),
        ];
        fields.extend(self.examples.iter().cloned());
        fields.extend(self.remarks.iter().cloned());
        fields.extend(self.see_also.iter().cloned());
        fields.extend(self.methods.iter().map(|m| m.signature.clone()));
        fields.extend(self.properties.iter().map(|p| p.signature.clone()));
        fields.join("\n").to_lowercase()
    }
}

/// Category from the first letter of the name, falling back to superclasses
pub fn classify_category(name: &str, superclasses: &[String]) -> ApiCategory {
    match name.chars().next() {
        Some('U') => ApiCategory::Object,
        Some('A') => ApiCategory::Actor,
        Some('F') => ApiCategory::Structure,
        _ if superclasses.iter().any(|s| s.contains("Component")) => ApiCategory::Component,
        _ => ApiCategory::Miscellaneous,
    }
}

/// Module name: the path component after `Runtime`, or `Core`
pub fn infer_module(path: &Path) -> String {
    let mut components = path.components().filter_map(|c| match c {
        Component::Normal(part) => part.to_str(),
        _ => None,
    });

    while let Some(part) = components.next() {
        if part == "Runtime" {
            if let Some(module) = components.next() {
                return module.to_string();
            }
        }
    }

    "Core".to_string()
}

/// `class Name : public Base1, public Base2`
pub fn render_syntax(name: &str, superclasses: &[String]) -> String {
    if superclasses.is_empty() {
        return format!("class {}", name);
    }

    let bases = superclasses
        .iter()
        .map(|s| format!("public {}", s))
        .collect::<Vec<_>>()
        .join(", ");
    format!("class {} : {}", name, bases)
}

/// Strip comment markers and split tagged lines from the description
pub fn parse_comments(comments: &[String]) -> ParsedComments {
    let mut parsed = ParsedComments::default();
    let mut description = Vec::new();

    for line in comments.iter().flat_map(|c| c.lines()).map(strip_markers) {
        if line.is_empty() {
            continue;
        }

        if let Some(rest) = tag_body(line, "@example") {
            parsed.examples.push(rest.to_string());
        } else if let Some(rest) = tag_body(line, "@remarks") {
            parsed.remarks.push(rest.to_string());
        } else if let Some(rest) = tag_body(line, "@see") {
            parsed.see_also.push(rest.to_string());
        } else {
            description.push(line);
        }
    }

    parsed.description = description.join(" ");
    parsed
}

fn strip_markers(line: &str) -> &str {
    let mut line = line.trim();
    for prefix in ["/**", "/*!", "/*", "///", "//!", "//"] {
        if let Some(rest) = line.strip_prefix(prefix) {
            line = rest;
            break;
        }
    }
    line = line.trim();
    if let Some(rest) = line.strip_suffix("*/") {
        line = rest.trim_end();
    }
    line.trim_start_matches('*').trim()
}

fn tag_body<'a>(line: &'a str, tag: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(tag)?;
    // `@seemore` is not a `@see` tag
    if rest.chars().next().is_some_and(|c| c.is_alphanumeric()) {
        return None;
    }
    Some(rest.trim())
}

fn method_doc(method: &MethodInfo) -> MemberDoc {
    let params = method
        .parameters
        .iter()
        .map(|p| match &p.default_value {
            Some(default) => format!("{} {} = {}", p.param_type, p.name, default),
            None => format!("{} {}", p.param_type, p.name),
        })
        .collect::<Vec<_>>()
        .join(", ");

    let mut signature = String::new();
    if method.is_virtual {
        signature.push_str("virtual ");
    }
    if !method.return_type.is_empty() {
        signature.push_str(&method.return_type);
        signature.push(' ');
    }
    signature.push_str(&format!("{}({})", method.name, params));
    if method.is_override {
        signature.push_str(" override");
    }

    MemberDoc {
        name: method.name.clone(),
        signature,
        visibility: method.visibility,
        line: method.line,
    }
}

fn property_doc(property: &PropertyInfo) -> MemberDoc {
    MemberDoc {
        name: property.name.clone(),
        signature: format!("{} {}", property.property_type, property.name),
        visibility: property.visibility,
        line: property.line,
    }
}

// =============================================================================
// QUERY
// =============================================================================

/// Summed per-term relevance of a reference against lowercased query terms
pub fn score(reference: &ApiReference, terms: &[String]) -> u32 {
    let name = reference.class_name.to_lowercase();
    let category = reference.category.as_str().to_lowercase();
    let module = reference.module.to_lowercase();
    let haystack = reference.haystack();

    terms
        .iter()
        .map(|term| {
            let mut points = 0;
            if name.contains(term.as_str()) {
                points += NAME_WEIGHT;
            }
            if category.contains(term.as_str()) {
                points += CATEGORY_WEIGHT;
            }
            if module.contains(term.as_str()) {
                points += MODULE_WEIGHT;
            }
            if haystack.contains(term.as_str()) {
                points += FIELD_WEIGHT;
            }
            points
        })
        .sum()
}

/// Rank references against a whitespace-tokenized query.
///
/// Only positively scored references survive; ties keep input order.
pub fn query<'a, I>(references: I, text: &str, options: &ApiQueryOptions) -> Vec<ApiQueryResult>
where
    I: IntoIterator<Item = &'a ApiReference>,
{
    let terms: Vec<String> = text.split_whitespace().map(str::to_lowercase).collect();

    let mut results: Vec<ApiQueryResult> = references
        .into_iter()
        .filter(|r| {
            options
                .category
                .as_ref()
                .map_or(true, |c| r.category.as_str().eq_ignore_ascii_case(c))
        })
        .filter(|r| {
            options
                .module
                .as_ref()
                .map_or(true, |m| r.module.eq_ignore_ascii_case(m))
        })
        .map(|r| ApiQueryResult {
            relevance: score(r, &terms),
            reference: r.clone(),
        })
        .filter(|r| r.relevance > 0)
        .collect();

    results.sort_by(|a, b| b.relevance.cmp(&a.relevance));
    results.truncate(options.max_results);

    if !options.include_examples {
        for result in &mut results {
            result.reference.examples.clear();
        }
    }

    results
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ParameterInfo;

    fn class(name: &str, superclasses: &[&str], file: &str) -> ClassInfo {
        ClassInfo {
            name: name.to_string(),
            file: PathBuf::from(file),
            line: 1,
            superclasses: superclasses.iter().map(|s| s.to_string()).collect(),
            interfaces: Vec::new(),
            methods: Vec::new(),
            properties: Vec::new(),
            comments: Vec::new(),
        }
    }

    #[test]
    fn test_classify_category() {
        assert_eq!(classify_category("UObject", &[]), ApiCategory::Object);
        assert_eq!(classify_category("AActor", &[]), ApiCategory::Actor);
        assert_eq!(classify_category("FVector", &[]), ApiCategory::Structure);
        assert_eq!(
            classify_category("MyWidget", &["USceneComponent".to_string()]),
            ApiCategory::Component
        );
        assert_eq!(classify_category("Helper", &[]), ApiCategory::Miscellaneous);
    }

    #[test]
    fn test_infer_module() {
        assert_eq!(
            infer_module(Path::new("/ue/Engine/Source/Runtime/Engine/Classes/Actor.h")),
            "Engine"
        );
        assert_eq!(infer_module(Path::new("/game/Source/MyGame/Thing.h")), "Core");
        assert_eq!(infer_module(Path::new("/ue/Runtime")), "Core");
    }

    #[test]
    fn test_render_syntax() {
        assert_eq!(render_syntax("A", &[]), "class A");
        assert_eq!(
            render_syntax("AMyActor", &["AActor".to_string(), "IInterface".to_string()]),
            "class AMyActor : public AActor, public IInterface"
        );
    }

    #[test]
    fn test_parse_comments() {
        let comments = vec![
            "/**\n * Base class for placeable objects.\n * @see UActorComponent\n */".to_string(),
            "// @example SpawnActor<AActor>()".to_string(),
            "/// @remarks Not thread safe".to_string(),
            "// Ticks every frame.".to_string(),
        ];

        let parsed = parse_comments(&comments);
        assert_eq!(
            parsed.description,
            "Base class for placeable objects. Ticks every frame."
        );
        assert_eq!(parsed.see_also, vec!["UActorComponent"]);
        assert_eq!(parsed.examples, vec!["SpawnActor<AActor>()"]);
        assert_eq!(parsed.remarks, vec!["Not thread safe"]);
    }

    #[test]
    fn test_method_signature() {
        let mut info = class("AActor", &[], "Actor.h");
        info.methods.push(MethodInfo {
            name: "Tick".to_string(),
            return_type: "void".to_string(),
            parameters: vec![ParameterInfo {
                name: "DeltaTime".to_string(),
                param_type: "float".to_string(),
                default_value: Some("0.f".to_string()),
            }],
            is_virtual: true,
            is_override: true,
            visibility: Visibility::Public,
            line: 4,
        });

        let reference = ApiReference::from_class(&info);
        assert_eq!(
            reference.methods[0].signature,
            "virtual void Tick(float DeltaTime = 0.f) override"
        );
    }

    #[test]
    fn test_query_ranks_exact_name_first() {
        let actor = ApiReference::from_class(&class(
            "AActor",
            &["UObject"],
            "/ue/Engine/Source/Runtime/Engine/Classes/GameFramework/Actor.h",
        ));
        let component = ApiReference::from_class(&class(
            "UActorComponent",
            &["UObject"],
            "/ue/Engine/Source/Runtime/Engine/Classes/Components/ActorComponent.h",
        ));

        let options = ApiQueryOptions {
            max_results: 1,
            ..Default::default()
        };
        let results = query([&component, &actor], "actor", &options);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].reference.class_name, "AActor");
        assert!(results[0].relevance > score(&component, &["actor".to_string()]));
    }

    #[test]
    fn test_query_filters_and_drops_zero_scores() {
        let actor = ApiReference::from_class(&class("AActor", &[], "/x/Runtime/Engine/Actor.h"));
        let vector = ApiReference::from_class(&class("FVector", &[], "/x/Runtime/Core/Vector.h"));

        let options = ApiQueryOptions {
            module: Some("core".to_string()),
            ..Default::default()
        };
        let results = query([&actor, &vector], "vector actor", &options);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].reference.class_name, "FVector");

        assert!(query([&actor, &vector], "zzz", &ApiQueryOptions::default()).is_empty());
    }

    #[test]
    fn test_query_strips_examples_on_request() {
        let mut info = class("AActor", &[], "Actor.h");
        info.comments = vec!["// @example GetWorld()->SpawnActor<AActor>()".to_string()];
        let reference = ApiReference::from_class(&info);

        let options = ApiQueryOptions {
            include_examples: false,
            ..Default::default()
        };
        let results = query([&reference], "AActor", &options);
        assert!(results[0].reference.examples.is_empty());
    }
}
