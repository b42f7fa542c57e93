// Interface extraction: synthesize an interface from the public non-static
// instance members of a class or struct. Text-only; nothing is written to
// disk, the client saves the suggested file.

use crate::model::{Accessibility, SymbolKind};
use crate::semantics::{SemanticIndex, SymbolRecord};

#[derive(Debug)]
pub struct ExtractedInterface {
    pub interface_name: String,
    pub suggested_file_name: String,
    pub text: String,
    pub member_count: usize,
}

pub fn extract(
    index: &SemanticIndex,
    type_id: usize,
    interface_name: &str,
    include_member_names: Option<&[String]>,
) -> ExtractedInterface {
    let type_record = index.symbol(type_id);
    let mut members: Vec<&SymbolRecord> = index
        .members_of(&type_record.qualified_name)
        .into_iter()
        .map(|id| index.symbol(id))
        .filter(|m| {
            m.accessibility == Accessibility::Public
                && !m.modifiers.is_static
                && !m.is_constructor
                && matches!(
                    m.kind,
                    SymbolKind::Method | SymbolKind::Property | SymbolKind::Event
                )
        })
        .collect();
    if let Some(names) = include_member_names {
        members.retain(|m| names.iter().any(|n| n == &m.name));
    }
    members.sort_by_key(|m| m.decl_span.start_byte);

    let mut body = String::new();
    for member in &members {
        body.push_str("    ");
        body.push_str(&member_signature(member));
        body.push('\n');
    }

    let declaration = format!("public interface {interface_name}\n{{\n{body}}}\n");
    let text = if type_record.namespace.is_empty() {
        declaration
    } else {
        let indented: String = declaration
            .lines()
            .map(|line| {
                if line.is_empty() {
                    String::from("\n")
                } else {
                    format!("    {line}\n")
                }
            })
            .collect();
        format!("namespace {}\n{{\n{}}}\n", type_record.namespace, indented)
    };

    ExtractedInterface {
        interface_name: interface_name.to_string(),
        suggested_file_name: format!("{interface_name}.cs"),
        text,
        member_count: members.len(),
    }
}

fn member_signature(member: &SymbolRecord) -> String {
    match member.kind {
        SymbolKind::Method => {
            let return_type = member.return_type.as_deref().unwrap_or("void");
            let params = member
                .parameters
                .iter()
                .map(|p| format!("{} {}", p.type_display, p.name))
                .collect::<Vec<_>>()
                .join(", ");
            format!("{return_type} {}({params});", member.name)
        }
        SymbolKind::Property => {
            let type_display = member.type_display.as_deref().unwrap_or("object");
            let (has_get, has_set) = member.accessors.unwrap_or((true, false));
            let accessors = match (has_get, has_set) {
                (true, true) => "{ get; set; }",
                (true, false) => "{ get; }",
                (false, true) => "{ set; }",
                (false, false) => "{ get; }",
            };
            format!("{type_display} {} {accessors}", member.name)
        }
        SymbolKind::Event => {
            let type_display = member.type_display.as_deref().unwrap_or("System.EventHandler");
            format!("event {type_display} {};", member.name)
        }
        _ => String::new(),
    }
}
