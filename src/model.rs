// Shared data model. Kinds, severities, and accessibilities are tagged
// variants internally and become strings only at the protocol boundary.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SymbolKind {
    Namespace,
    Class,
    Interface,
    Struct,
    Enum,
    Delegate,
    Method,
    Property,
    Field,
    Event,
    Parameter,
    Local,
}

impl SymbolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Namespace => "Namespace",
            SymbolKind::Class => "Class",
            SymbolKind::Interface => "Interface",
            SymbolKind::Struct => "Struct",
            SymbolKind::Enum => "Enum",
            SymbolKind::Delegate => "Delegate",
            SymbolKind::Method => "Method",
            SymbolKind::Property => "Property",
            SymbolKind::Field => "Field",
            SymbolKind::Event => "Event",
            SymbolKind::Parameter => "Parameter",
            SymbolKind::Local => "Local",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "namespace" => Some(SymbolKind::Namespace),
            "class" => Some(SymbolKind::Class),
            "interface" => Some(SymbolKind::Interface),
            "struct" => Some(SymbolKind::Struct),
            "enum" => Some(SymbolKind::Enum),
            "delegate" => Some(SymbolKind::Delegate),
            "method" => Some(SymbolKind::Method),
            "property" => Some(SymbolKind::Property),
            "field" => Some(SymbolKind::Field),
            "event" => Some(SymbolKind::Event),
            "parameter" => Some(SymbolKind::Parameter),
            "local" => Some(SymbolKind::Local),
            _ => None,
        }
    }

    /// Named types: the kinds that can carry a base list and members.
    pub fn is_type(&self) -> bool {
        matches!(
            self,
            SymbolKind::Class
                | SymbolKind::Interface
                | SymbolKind::Struct
                | SymbolKind::Enum
                | SymbolKind::Delegate
        )
    }

    pub fn is_member(&self) -> bool {
        matches!(
            self,
            SymbolKind::Method | SymbolKind::Property | SymbolKind::Field | SymbolKind::Event
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Accessibility {
    Public,
    Private,
    Internal,
    Protected,
    ProtectedInternal,
    PrivateProtected,
}

impl Accessibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Accessibility::Public => "Public",
            Accessibility::Private => "Private",
            Accessibility::Internal => "Internal",
            Accessibility::Protected => "Protected",
            Accessibility::ProtectedInternal => "ProtectedInternal",
            Accessibility::PrivateProtected => "PrivateProtected",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let folded: String = value
            .trim()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        match folded.as_str() {
            "public" => Some(Accessibility::Public),
            "private" => Some(Accessibility::Private),
            "internal" => Some(Accessibility::Internal),
            "protected" => Some(Accessibility::Protected),
            "protectedinternal" => Some(Accessibility::ProtectedInternal),
            "privateprotected" => Some(Accessibility::PrivateProtected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hidden,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "Error",
            Severity::Warning => "Warning",
            Severity::Info => "Info",
            Severity::Hidden => "Hidden",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "error" => Some(Severity::Error),
            "warning" => Some(Severity::Warning),
            "info" => Some(Severity::Info),
            "hidden" => Some(Severity::Hidden),
            _ => None,
        }
    }
}

/// Byte- and position-addressed extent of a node within one document.
/// Lines and columns are 0-based throughout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start_line: usize,
    pub start_col: usize,
    pub end_line: usize,
    pub end_col: usize,
    pub start_byte: usize,
    pub end_byte: usize,
}

impl Span {
    pub fn contains_byte(&self, byte: usize) -> bool {
        byte >= self.start_byte && byte < self.end_byte
    }

    pub fn byte_distance(&self, byte: usize) -> usize {
        if self.contains_byte(byte) {
            0
        } else if byte < self.start_byte {
            self.start_byte - byte
        } else {
            byte - self.end_byte + 1
        }
    }

    pub fn location(&self, file_path: &str) -> Location {
        Location {
            file_path: file_path.to_string(),
            start_line: self.start_line,
            start_column: self.start_col,
            end_line: self.end_line,
            end_column: self.end_col,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub file_path: String,
    pub start_line: usize,
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reference {
    pub file_path: String,
    pub line: usize,
    pub column: usize,
    pub excerpt: String,
    /// Write-vs-read detection is not implemented; every reference reports
    /// "read".
    pub kind: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub id: String,
    pub severity: Severity,
    pub message: String,
    pub location: Location,
    pub fingerprint: String,
}

impl Diagnostic {
    pub fn new(id: &str, severity: Severity, message: String, location: Location) -> Self {
        let fingerprint = diagnostic_fingerprint(id, severity, &message, &location);
        Self {
            id: id.to_string(),
            severity,
            message,
            location,
            fingerprint,
        }
    }
}

fn diagnostic_fingerprint(
    id: &str,
    severity: Severity,
    message: &str,
    location: &Location,
) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(id.as_bytes());
    hasher.update(&[0xff]);
    hasher.update(severity.as_str().as_bytes());
    hasher.update(&[0xff]);
    hasher.update(message.as_bytes());
    hasher.update(&[0xff]);
    hasher.update(location.file_path.as_bytes());
    hasher.update(&[0xff]);
    hasher.update(&(location.start_line as u64).to_le_bytes());
    hasher.update(&(location.start_column as u64).to_le_bytes());
    hasher.finalize().to_hex().to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChangeType {
    Modified,
    Added,
    Removed,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditHunk {
    /// 0-based first line of the replaced region in the old text.
    pub start_line: usize,
    /// Number of old lines replaced (0 for a pure insertion).
    pub old_lines: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_text: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentEdit {
    pub file_path: String,
    pub change_type: ChangeType,
    pub change_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hunks: Option<Vec<EditHunk>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditPlan {
    pub total_files: usize,
    pub total_changes: usize,
    pub edits: Vec<DocumentEdit>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub truncated: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_strings() {
        for kind in [
            SymbolKind::Namespace,
            SymbolKind::Class,
            SymbolKind::Delegate,
            SymbolKind::Local,
        ] {
            assert_eq!(SymbolKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(SymbolKind::parse("CLASS"), Some(SymbolKind::Class));
        assert_eq!(SymbolKind::parse("record"), None);
    }

    #[test]
    fn accessibility_accepts_spaced_forms() {
        assert_eq!(
            Accessibility::parse("protected internal"),
            Some(Accessibility::ProtectedInternal)
        );
        assert_eq!(
            Accessibility::parse("PrivateProtected"),
            Some(Accessibility::PrivateProtected)
        );
    }

    #[test]
    fn span_byte_distance() {
        let span = Span {
            start_byte: 10,
            end_byte: 20,
            ..Span::default()
        };
        assert_eq!(span.byte_distance(15), 0);
        assert_eq!(span.byte_distance(5), 5);
        assert_eq!(span.byte_distance(25), 6);
    }

    #[test]
    fn diagnostic_fingerprint_is_stable() {
        let loc = Location {
            file_path: "a.cs".into(),
            start_line: 1,
            start_column: 2,
            end_line: 1,
            end_column: 5,
        };
        let a = Diagnostic::new("USG001", Severity::Warning, "msg".into(), loc.clone());
        let b = Diagnostic::new("USG001", Severity::Warning, "msg".into(), loc);
        assert_eq!(a.fingerprint, b.fingerprint);
    }
}
