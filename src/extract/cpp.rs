//! C++ class extraction
//!
//! Runs structural queries against tree-sitter C++ trees and turns the
//! captures into `ClassInfo` records. Extraction never fails on an
//! incomplete class: missing bodies or base clauses just leave the
//! corresponding lists empty.
//!
//! @module extract/cpp

use super::{
    is_interface_name, ClassInfo, MethodInfo, ParameterInfo, PropertyInfo, ReferenceKind,
    Visibility,
};
use std::path::Path;
use streaming_iterator::StreamingIterator;
use tree_sitter::{Node, Query, QueryCursor, Tree};

// =============================================================================
// TREE-SITTER QUERIES
// =============================================================================

/// Query binding `class`, `class_name` and `class_body` for every class or
/// struct declaration that has a body
pub fn class_query_source() -> &'static str {
    "(class_specifier name: (_) @class_name body: (field_declaration_list) @class_body) @class
(struct_specifier name: (_) @class_name body: (field_declaration_list) @class_body) @class"
}

/// Query matching every occurrence of `identifier`.
///
/// Classes are matched on `type_identifier` nodes, everything else on plain
/// `identifier` nodes. The identifier must already be validated as a C++
/// identifier; it is embedded verbatim in the predicate.
pub fn reference_query_source(identifier: &str, kind: Option<ReferenceKind>) -> String {
    let node_kind = match kind {
        Some(ReferenceKind::Class) => "type_identifier",
        _ => "identifier",
    };
    format!(
        "(({}) @reference (#eq? @reference \"{}\"))",
        node_kind, identifier
    )
}

/// Node kinds accepted as "the type" of a member or parameter
const TYPE_KINDS: &[&str] = &[
    "primitive_type",
    "type_identifier",
    "sized_type_specifier",
    "qualified_identifier",
    "template_type",
    "placeholder_type_specifier",
    "auto",
];

/// Reflection macros that may sit between a doc comment and its class
const REFLECTION_MACROS: &[&str] = &["UCLASS", "USTRUCT", "UINTERFACE", "UENUM"];

// =============================================================================
// MAIN EXTRACTION FUNCTIONS
// =============================================================================

/// Extract every class matched by the compiled class query
pub fn extract_classes(tree: &Tree, query: &Query, source: &str, file: &Path) -> Vec<ClassInfo> {
    let bytes = source.as_bytes();
    let capture_names = query.capture_names();
    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(query, tree.root_node(), bytes);

    let mut classes = Vec::new();
    while let Some(m) = matches.next() {
        let mut class_node: Option<Node> = None;
        let mut name_node: Option<Node> = None;
        let mut body_node: Option<Node> = None;

        for capture in m.captures {
            match capture_names[capture.index as usize] {
                "class" => class_node = Some(capture.node),
                "class_name" => name_node = Some(capture.node),
                "class_body" => body_node = Some(capture.node),
                _ => {}
            }
        }

        if let Some(class_node) = class_node {
            classes.push(build_class(class_node, name_node, body_node, bytes, file));
        }
    }

    classes
}

/// 0-based (row, column) of every `@reference` capture
pub fn reference_positions(tree: &Tree, query: &Query, source: &str) -> Vec<(usize, usize)> {
    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(query, tree.root_node(), source.as_bytes());

    let mut positions = Vec::new();
    while let Some(m) = matches.next() {
        for capture in m.captures {
            let point = capture.node.start_position();
            positions.push((point.row, point.column));
        }
    }
    positions.sort_unstable();
    positions.dedup();
    positions
}

// =============================================================================
// CLASS ASSEMBLY
// =============================================================================

fn build_class(
    class_node: Node,
    name_node: Option<Node>,
    body_node: Option<Node>,
    source: &[u8],
    file: &Path,
) -> ClassInfo {
    let name = name_node
        .and_then(|n| find_first(n, &["type_identifier"]))
        .map(|n| node_text(n, source))
        .unwrap_or_default();

    let superclasses = named_child(class_node, "base_class_clause")
        .map(|clause| collect_kind(clause, "type_identifier", source))
        .unwrap_or_default();

    let interfaces = superclasses
        .iter()
        .filter(|s| is_interface_name(s))
        .cloned()
        .collect();

    let (methods, properties) = match body_node {
        Some(body) => extract_members(body, source),
        None => (Vec::new(), Vec::new()),
    };

    ClassInfo {
        name,
        file: file.to_path_buf(),
        line: class_node.start_position().row + 1,
        superclasses,
        interfaces,
        methods,
        properties,
        comments: leading_comments(class_node, source),
    }
}

/// Walk the direct children of a class body
fn extract_members(body: Node, source: &[u8]) -> (Vec<MethodInfo>, Vec<PropertyInfo>) {
    let mut methods = Vec::new();
    let mut properties = Vec::new();
    let mut visibility = Visibility::Public;

    let mut walker = body.walk();
    for child in body.named_children(&mut walker) {
        match child.kind() {
            "access_specifier" => {
                if let Some(v) = Visibility::from_label(&node_text(child, source)) {
                    visibility = v;
                }
            }
            "function_definition" | "declaration" => {
                methods.extend(method_from(child, visibility, source));
            }
            "field_declaration" => {
                if declares_function(child) {
                    methods.extend(method_from(child, visibility, source));
                } else {
                    properties.extend(properties_from(child, visibility, source));
                }
            }
            "template_declaration" => {
                let mut inner_walker = child.walk();
                for inner in child.named_children(&mut inner_walker) {
                    if matches!(
                        inner.kind(),
                        "function_definition" | "declaration" | "field_declaration"
                    ) && declares_function(inner)
                    {
                        methods.extend(method_from(inner, visibility, source));
                    }
                }
            }
            _ => {}
        }
    }

    (methods, properties)
}

fn declares_function(node: Node) -> bool {
    node.child_by_field_name("declarator")
        .and_then(|d| find_first(d, &["function_declarator"]))
        .is_some()
}

fn method_from(node: Node, visibility: Visibility, source: &[u8]) -> Option<MethodInfo> {
    let declarator = node.child_by_field_name("declarator")?;
    let function = find_first(declarator, &["function_declarator"])?;
    let name = node_text(function.child_by_field_name("declarator")?, source);

    let return_type = node
        .child_by_field_name("type")
        .map(|t| type_text(t, source))
        .unwrap_or_default();

    // GENERATED_BODY() and friends parse as untyped function declarations
    if return_type.is_empty() && is_macro_name(&name) {
        return None;
    }

    let parameters = function
        .child_by_field_name("parameters")
        .map(|p| extract_parameters(p, source))
        .unwrap_or_default();

    Some(MethodInfo {
        name,
        return_type,
        parameters,
        is_virtual: has_virtual_keyword(node),
        is_override: has_override_specifier(node, source),
        visibility,
        line: node.start_position().row + 1,
    })
}

fn properties_from(node: Node, visibility: Visibility, source: &[u8]) -> Vec<PropertyInfo> {
    let property_type = node
        .child_by_field_name("type")
        .map(|t| type_text(t, source))
        .unwrap_or_default();

    let mut walker = node.walk();
    let properties = node
        .children_by_field_name("declarator", &mut walker)
        // `SOME_MACRO(Arg)` parses as a field of type SOME_MACRO named Arg
        .filter(|declarator| {
            !(is_macro_name(&property_type) && declarator.kind() == "parenthesized_declarator")
        })
        .filter_map(|declarator| find_first(declarator, &["field_identifier", "identifier"]))
        .map(|name| PropertyInfo {
            name: node_text(name, source),
            property_type: property_type.clone(),
            visibility,
            line: node.start_position().row + 1,
        })
        .collect();
    properties
}

/// Parameters lacking either a type or a name are dropped
fn extract_parameters(list: Node, source: &[u8]) -> Vec<ParameterInfo> {
    let mut parameters = Vec::new();
    let mut walker = list.walk();

    for param in list.named_children(&mut walker) {
        if !matches!(
            param.kind(),
            "parameter_declaration" | "optional_parameter_declaration"
        ) {
            continue;
        }

        let param_type = param
            .child_by_field_name("type")
            .map(|t| type_text(t, source));
        let name = param
            .child_by_field_name("declarator")
            .and_then(|d| find_first(d, &["identifier", "field_identifier"]))
            .map(|n| node_text(n, source));

        if let (Some(param_type), Some(name)) = (param_type, name) {
            parameters.push(ParameterInfo {
                name,
                param_type,
                default_value: param
                    .child_by_field_name("default_value")
                    .map(|d| node_text(d, source)),
            });
        }
    }

    parameters
}

fn has_virtual_keyword(node: Node) -> bool {
    let mut walker = node.walk();
    let found = node
        .children(&mut walker)
        .any(|c| matches!(c.kind(), "virtual" | "virtual_function_specifier"));
    found
}

fn has_override_specifier(member: Node, source: &[u8]) -> bool {
    collect_kind(member, "virtual_specifier", source)
        .iter()
        .any(|s| s == "override")
}

/// Comment nodes directly above a class, in source order. A single
/// reflection macro line (`UCLASS(...)`) between comment and class is skipped.
fn leading_comments(class_node: Node, source: &[u8]) -> Vec<String> {
    let mut anchor = class_node;
    while let Some(parent) = anchor.parent() {
        if matches!(parent.kind(), "declaration" | "template_declaration") {
            anchor = parent;
        } else {
            break;
        }
    }

    let mut comments = Vec::new();
    let mut skipped_macro = false;
    let mut current = anchor.prev_named_sibling();

    while let Some(sibling) = current {
        let text = node_text(sibling, source);
        if sibling.kind() == "comment" {
            comments.push(text);
        } else if !skipped_macro && is_reflection_macro(&text) {
            skipped_macro = true;
        } else {
            break;
        }
        current = sibling.prev_named_sibling();
    }

    comments.reverse();
    comments
}

// =============================================================================
// NODE HELPERS
// =============================================================================

fn node_text(node: Node, source: &[u8]) -> String {
    node.utf8_text(source).unwrap_or("").to_string()
}

/// First node (pre-order, self included) whose kind is in `kinds`
fn find_first<'t>(node: Node<'t>, kinds: &[&str]) -> Option<Node<'t>> {
    if kinds.contains(&node.kind()) {
        return Some(node);
    }
    let mut walker = node.walk();
    let children: Vec<Node<'t>> = node.children(&mut walker).collect();
    children.into_iter().find_map(|child| find_first(child, kinds))
}

fn named_child<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    let mut walker = node.walk();
    let found = node.named_children(&mut walker).find(|c| c.kind() == kind);
    found
}

/// Text of every descendant of `kind`, in source order
fn collect_kind(node: Node, kind: &str, source: &[u8]) -> Vec<String> {
    let mut out = Vec::new();
    collect_kind_into(node, kind, source, &mut out);
    out
}

fn collect_kind_into(node: Node, kind: &str, source: &[u8], out: &mut Vec<String>) {
    if node.kind() == kind {
        out.push(node_text(node, source));
        return;
    }
    let mut walker = node.walk();
    for child in node.children(&mut walker) {
        collect_kind_into(child, kind, source, out);
    }
}

/// First type token under a `type` field; falls back to the raw text
fn type_text(type_node: Node, source: &[u8]) -> String {
    find_first(type_node, TYPE_KINDS)
        .map(|n| node_text(n, source))
        .unwrap_or_else(|| node_text(type_node, source))
}

fn is_macro_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

fn is_reflection_macro(text: &str) -> bool {
    let trimmed = text.trim_start();
    REFLECTION_MACROS.iter().any(|m| trimmed.starts_with(m))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::{CppParser, TreeParser};
    use tree_sitter::Query;

    fn classes_of(code: &str) -> Vec<ClassInfo> {
        let tree = CppParser.parse(code).unwrap();
        let query = Query::new(&CppParser::grammar(), class_query_source()).unwrap();
        extract_classes(&tree, &query, code, Path::new("Test.h"))
    }

    #[test]
    fn test_simple_class() {
        let classes = classes_of("class A : public B { public: void M(); int P; };");
        assert_eq!(classes.len(), 1);

        let class = &classes[0];
        assert_eq!(class.name, "A");
        assert_eq!(class.superclasses, vec!["B".to_string()]);
        assert_eq!(class.methods.len(), 1);
        assert_eq!(class.methods[0].name, "M");
        assert_eq!(class.methods[0].return_type, "void");
        assert!(class.methods[0].parameters.is_empty());
        assert_eq!(class.properties.len(), 1);
        assert_eq!(class.properties[0].name, "P");
        assert_eq!(class.properties[0].property_type, "int");
    }

    #[test]
    fn test_multiple_bases_in_order() {
        let classes = classes_of("class C : public Base1, public IFoo, protected Base2 {};");
        let class = &classes[0];
        assert_eq!(class.superclasses, vec!["Base1", "IFoo", "Base2"]);
        assert_eq!(class.interfaces, vec!["IFoo"]);
    }

    #[test]
    fn test_parameters_and_defaults() {
        let code = r#"
class FWidget {
public:
    float Scale(float Factor, int Count = 3);
};
"#;
        let classes = classes_of(code);
        let method = &classes[0].methods[0];
        assert_eq!(method.name, "Scale");
        assert_eq!(method.return_type, "float");
        assert_eq!(method.parameters.len(), 2);
        assert_eq!(method.parameters[0].name, "Factor");
        assert_eq!(method.parameters[0].param_type, "float");
        assert_eq!(method.parameters[0].default_value, None);
        assert_eq!(method.parameters[1].name, "Count");
        assert_eq!(method.parameters[1].default_value.as_deref(), Some("3"));
    }

    #[test]
    fn test_unnamed_parameter_dropped() {
        let classes = classes_of("class A { public: void Set(int, float Value); };");
        let params = &classes[0].methods[0].parameters;
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].name, "Value");
    }

    #[test]
    fn test_inline_definition_and_virtual() {
        let code = r#"
class AMyActor : public AActor {
public:
    virtual void BeginPlay() override;
    int GetCount() const { return Count; }
private:
    int Count;
};
"#;
        let classes = classes_of(code);
        let class = &classes[0];

        let begin_play = class.methods.iter().find(|m| m.name == "BeginPlay").unwrap();
        assert!(begin_play.is_virtual);
        assert!(begin_play.is_override);

        let get_count = class.methods.iter().find(|m| m.name == "GetCount").unwrap();
        assert_eq!(get_count.return_type, "int");
        assert!(!get_count.is_virtual);
        assert_eq!(get_count.visibility, Visibility::Public);

        assert_eq!(class.properties[0].name, "Count");
        assert_eq!(class.properties[0].visibility, Visibility::Private);
    }

    #[test]
    fn test_struct_and_missing_base() {
        let classes = classes_of("struct FStats { float Health; float Armor; };");
        assert_eq!(classes[0].name, "FStats");
        assert!(classes[0].superclasses.is_empty());
        assert_eq!(classes[0].properties.len(), 2);
    }

    #[test]
    fn test_declaration_line_and_comments() {
        let code = "// Base for things\n// Second line\nclass UThing {\n};\n";
        let classes = classes_of(code);
        assert_eq!(classes[0].line, 3);
        assert_eq!(
            classes[0].comments,
            vec!["// Base for things".to_string(), "// Second line".to_string()]
        );
    }

    #[test]
    fn test_forward_declaration_ignored() {
        let classes = classes_of("class AActor;\nclass B {};");
        assert_eq!(classes.len(), 1);
        assert_eq!(classes[0].name, "B");
    }

    #[test]
    fn test_unreal_reflected_header() {
        let code = r#"#pragma once

// Actor with health tracking
UCLASS(Blueprintable, meta=(DisplayName="Health (HP)"))
class ENGINE_API AHealthActor : public AActor, public IDamageable
{
	GENERATED_BODY()

public:
	UPROPERTY(EditAnywhere, BlueprintReadWrite, Category="Stats")
	float Health;

	UFUNCTION(BlueprintCallable)
	void Tick(float DeltaTime);

	ENGINE_API virtual void BeginPlay() override;
};
"#;
        let classes = classes_of(code);
        assert_eq!(classes.len(), 1);

        let class = &classes[0];
        assert_eq!(class.name, "AHealthActor");
        assert_eq!(class.line, 5);
        assert_eq!(class.superclasses, vec!["AActor", "IDamageable"]);
        assert_eq!(class.interfaces, vec!["IDamageable"]);
        assert_eq!(class.comments, vec!["// Actor with health tracking".to_string()]);

        let properties: Vec<&str> = class.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(properties, vec!["Health"]);
        assert_eq!(class.properties[0].line, 11);

        let methods: Vec<&str> = class.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(methods, vec!["Tick", "BeginPlay"]);
        assert_eq!(class.methods[0].parameters[0].name, "DeltaTime");
        assert!(class.methods[1].is_override);
    }

    #[test]
    fn test_export_macro_struct() {
        let classes = classes_of("struct CORE_API FVector2D\n{\n\tfloat X;\n\tfloat Y;\n};\n");
        assert_eq!(classes.len(), 1);
        assert_eq!(classes[0].name, "FVector2D");
        assert_eq!(classes[0].properties.len(), 2);
    }

    #[test]
    fn test_reference_positions() {
        let code = "class Foo {};\nFoo* Make();\nint Foo2;\n";
        let tree = CppParser.parse(code).unwrap();
        let source = reference_query_source("Foo", Some(ReferenceKind::Class));
        let query = Query::new(&CppParser::grammar(), &source).unwrap();

        let positions = reference_positions(&tree, &query, code);
        assert_eq!(positions, vec![(0, 6), (1, 0)]);
    }

    #[test]
    fn test_reference_query_kinds() {
        assert!(reference_query_source("X", Some(ReferenceKind::Class)).contains("type_identifier"));
        assert!(reference_query_source("X", Some(ReferenceKind::Function)).starts_with("((identifier)"));
        assert!(reference_query_source("X", None).starts_with("((identifier)"));
    }
}
