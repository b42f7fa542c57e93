// Whitespace normalization: line endings to LF, leading tabs expanded,
// trailing whitespace stripped, blank-line runs collapsed, exactly one
// trailing newline. Idempotent by construction.

pub fn normalize_whitespace(source: &str) -> String {
    let unified = source.replace("\r\n", "\n").replace('\r', "\n");
    let mut out: Vec<String> = Vec::new();
    let mut blank_run = 0usize;
    for line in unified.split('\n') {
        let line = expand_leading_tabs(line);
        let line = line.trim_end().to_string();
        if line.is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push(line);
    }
    while out.last().map(|l| l.is_empty()).unwrap_or(false) {
        out.pop();
    }
    let mut text = out.join("\n");
    text.push('\n');
    text
}

fn expand_leading_tabs(line: &str) -> String {
    let mut expanded = String::with_capacity(line.len());
    let mut in_indent = true;
    for ch in line.chars() {
        match ch {
            '\t' if in_indent => expanded.push_str("    "),
            ' ' if in_indent => expanded.push(' '),
            other => {
                in_indent = false;
                expanded.push(other);
            }
        }
    }
    expanded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_line_endings_and_trailing_space() {
        let source = "class C\r\n{\t\r\n    void M() { }  \r\n}\r\n";
        let normalized = normalize_whitespace(source);
        assert_eq!(normalized, "class C\n{\n    void M() { }\n}\n");
    }

    #[test]
    fn collapses_blank_line_runs() {
        let source = "a\n\n\n\nb\n";
        assert_eq!(normalize_whitespace(source), "a\n\nb\n");
    }

    #[test]
    fn expands_leading_tabs_only() {
        let source = "\tvar s = \"a\tb\";\n";
        assert_eq!(normalize_whitespace(source), "    var s = \"a\tb\";\n");
    }

    #[test]
    fn idempotent() {
        let source = "class C\r\n{\r\n\r\n\r\n\tint x;   \r\n}";
        let once = normalize_whitespace(source);
        assert_eq!(normalize_whitespace(&once), once);
    }
}
