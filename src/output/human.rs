//! Human-readable output formatting

use crate::analyzer::InitSummary;
use crate::extract::{ClassHierarchy, ClassInfo, CodeReference};
use crate::knowledge::{ApiQueryResult, CodePatternMatch, PatternInfo, SubsystemInfo};
use crate::protocol::ResponseData;

/// Format a result for human consumption
pub fn format(data: &ResponseData) -> String {
    match data {
        ResponseData::Initialized(summary) => format_init(summary),
        ResponseData::Class(class) => format_class(class),
        ResponseData::Hierarchy(hierarchy) => {
            let mut output = String::new();
            format_hierarchy(hierarchy, 0, &mut output);
            output
        }
        ResponseData::References(references) => format_references(references),
        ResponseData::Subsystem(info) => format_subsystem(info),
        ResponseData::ApiReference(results) => format_api(results),
        ResponseData::Patterns(matches) => format_patterns(matches),
        ResponseData::BestPractices(pattern) => format_practices(pattern),
    }
}

fn format_init(summary: &InitSummary) -> String {
    format!(
        "Initialized {:?} root {} ({} files, {} classes)\n",
        summary.kind,
        summary.root.display(),
        summary.files_scanned,
        summary.classes_found
    )
}

fn format_class(class: &ClassInfo) -> String {
    let mut output = format!("class {}", class.name);
    if !class.superclasses.is_empty() {
        output.push_str(&format!(" : {}", class.superclasses.join(", ")));
    }
    output.push_str(&format!("\n  {}:{}\n", class.file.display(), class.line));

    if !class.interfaces.is_empty() {
        output.push_str(&format!("  interfaces: {}\n", class.interfaces.join(", ")));
    }

    for comment in &class.comments {
        for line in comment.lines() {
            output.push_str(&format!("  {}\n", line.trim()));
        }
    }

    if !class.methods.is_empty() {
        output.push_str(&format!("\nMethods ({}):\n", class.methods.len()));
        for method in &class.methods {
            let params = method
                .parameters
                .iter()
                .map(|p| format!("{} {}", p.param_type, p.name))
                .collect::<Vec<_>>()
                .join(", ");
            let mut flags = String::new();
            if method.is_virtual {
                flags.push_str(" [virtual]");
            }
            if method.is_override {
                flags.push_str(" [override]");
            }
            output.push_str(&format!(
                "  {:<9} {} {}({}){}  (line {})\n",
                method.visibility.as_str(),
                method.return_type,
                method.name,
                params,
                flags,
                method.line
            ));
        }
    }

    if !class.properties.is_empty() {
        output.push_str(&format!("\nProperties ({}):\n", class.properties.len()));
        for property in &class.properties {
            output.push_str(&format!(
                "  {:<9} {} {}  (line {})\n",
                property.visibility.as_str(),
                property.property_type,
                property.name,
                property.line
            ));
        }
    }

    output
}

fn format_hierarchy(node: &ClassHierarchy, depth: usize, output: &mut String) {
    let indent = "  ".repeat(depth);
    output.push_str(&format!("{}{}", indent, node.class_name));
    if let Some(interfaces) = node.interfaces.as_ref().filter(|i| !i.is_empty()) {
        output.push_str(&format!(" [{}]", interfaces.join(", ")));
    }
    output.push('\n');

    for parent in &node.superclasses {
        format_hierarchy(parent, depth + 1, output);
    }
}

fn format_references(references: &[CodeReference]) -> String {
    if references.is_empty() {
        return "No matches found\n".to_string();
    }

    let mut output = format!("Found {} matches\n\n", references.len());
    for reference in references {
        output.push_str(&format!(
            "{}:{}:{}\n",
            reference.file.display(),
            reference.line,
            reference.column
        ));
        for line in reference.context.lines() {
            let truncated: String = if line.chars().count() > 100 {
                format!("{}...", line.chars().take(97).collect::<String>())
            } else {
                line.to_string()
            };
            output.push_str(&format!("   {}\n", truncated));
        }
        output.push('\n');
    }
    output
}

fn format_subsystem(info: &SubsystemInfo) -> String {
    let mut output = format!(
        "{}: {} source files, {} classes\n",
        info.name,
        info.source_files.len(),
        info.main_classes.len()
    );
    for class in &info.main_classes {
        output.push_str(&format!("  {}\n", class));
    }
    output
}

fn format_api(results: &[ApiQueryResult]) -> String {
    if results.is_empty() {
        return "No API entries matched\n".to_string();
    }

    let mut output = String::new();
    for (i, result) in results.iter().enumerate() {
        let reference = &result.reference;
        output.push_str(&format!(
            "{}. {} [{} / {}] (score {})\n   {}\n",
            i + 1,
            reference.class_name,
            reference.category,
            reference.module,
            result.relevance,
            reference.syntax
        ));
        if !reference.description.is_empty() {
            output.push_str(&format!("   {}\n", reference.description));
        }
        for example in &reference.examples {
            output.push_str(&format!("   e.g. {}\n", example));
        }
        output.push_str(&format!(
            "   {}:{}\n\n",
            reference.file.display(),
            reference.line
        ));
    }
    output
}

fn format_patterns(matches: &[CodePatternMatch]) -> String {
    if matches.is_empty() {
        return "No known patterns found\n".to_string();
    }

    let mut output = String::new();
    for m in matches {
        output.push_str(&format!("{} at {}:{}\n", m.pattern, m.file.display(), m.line));
        for suggestion in &m.suggestions {
            output.push_str(&format!("  - {}\n", suggestion));
        }
    }
    output
}

fn format_practices(pattern: &PatternInfo) -> String {
    let mut output = format!("{}\n{}\n\nBest practices:\n", pattern.name, pattern.description);
    for practice in &pattern.best_practices {
        output.push_str(&format!("  - {}\n", practice));
    }

    output.push_str("\nExamples:\n");
    for example in &pattern.examples {
        for line in example.lines() {
            output.push_str(&format!("  {}\n", line));
        }
        output.push('\n');
    }

    if !pattern.related_patterns.is_empty() {
        output.push_str(&format!("Related: {}\n", pattern.related_patterns.join(", ")));
    }
    output.push_str(&format!("Docs: {}\n", pattern.documentation));
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hierarchy_is_indented() {
        let hierarchy = ClassHierarchy {
            class_name: "AMyActor".to_string(),
            superclasses: vec![ClassHierarchy {
                class_name: "AActor".to_string(),
                superclasses: Vec::new(),
                interfaces: Some(Vec::new()),
            }],
            interfaces: Some(vec!["IDamageable".to_string()]),
        };

        let output = format(&ResponseData::Hierarchy(hierarchy));
        assert_eq!(output, "AMyActor [IDamageable]\n  AActor\n");
    }

    #[test]
    fn test_empty_references() {
        assert_eq!(
            format(&ResponseData::References(Vec::new())),
            "No matches found\n"
        );
    }
}
