// Per-document symbol extraction. Walks a tree-sitter C# tree and records
// every name-bearing declaration with the detail the query layers need:
// accessibility, modifiers, attributes, parameters, base lists, accessors.

use crate::model::{Accessibility, Span, SymbolKind};
use crate::workspace::DocKey;
use tree_sitter::Node;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub is_static: bool,
    pub is_async: bool,
    pub is_abstract: bool,
    pub is_virtual: bool,
    pub is_override: bool,
    pub is_sealed: bool,
    pub is_readonly: bool,
    pub is_partial: bool,
    pub is_extension: bool,
    pub is_const: bool,
}

#[derive(Debug, Clone)]
pub struct ParamInfo {
    pub name: String,
    pub type_display: String,
}

#[derive(Debug, Clone)]
pub struct SymbolRecord {
    pub id: usize,
    pub kind: SymbolKind,
    pub name: String,
    /// Namespace-qualified name without parameter decoration.
    pub qualified_name: String,
    /// Full display string; methods append their parameter types.
    pub display: String,
    pub accessibility: Accessibility,
    pub doc: DocKey,
    pub decl_span: Span,
    pub name_span: Span,
    /// Locals and parameters bind only inside this span.
    pub scope_span: Option<Span>,
    /// Qualified name of the containing type, when any.
    pub container: Option<String>,
    pub namespace: String,
    /// Base types and interfaces as written in the base list.
    pub base_types: Vec<String>,
    /// Attribute names as written (without argument lists).
    pub attributes: Vec<String>,
    pub modifiers: Modifiers,
    pub parameters: Vec<ParamInfo>,
    /// Property/field/event/local/parameter type display.
    pub type_display: Option<String>,
    pub return_type: Option<String>,
    pub signature: Option<String>,
    /// Property accessors: (has getter, has setter).
    pub accessors: Option<(bool, bool)>,
    pub is_constructor: bool,
    pub is_implicit: bool,
    /// Extra declaration sites for merged symbols (namespaces).
    pub extra_locations: Vec<(DocKey, Span)>,
}

#[derive(Clone)]
struct Context {
    namespace_stack: Vec<String>,
    type_stack: Vec<String>,
    /// Kind of the immediately enclosing type, for member defaults.
    enclosing_type: Option<SymbolKind>,
    /// Declaration span of the enclosing member, for local/param scoping.
    member_scope: Option<Span>,
}

impl Context {
    fn namespace(&self) -> String {
        self.namespace_stack.join(".")
    }

    fn container(&self) -> Option<String> {
        if self.type_stack.is_empty() {
            return None;
        }
        let ns = self.namespace();
        let types = self.type_stack.join(".");
        Some(if ns.is_empty() {
            types
        } else {
            format!("{ns}.{types}")
        })
    }

    fn qualify(&self, name: &str) -> String {
        let mut parts = Vec::new();
        let ns = self.namespace();
        if !ns.is_empty() {
            parts.push(ns);
        }
        if !self.type_stack.is_empty() {
            parts.push(self.type_stack.join("."));
        }
        parts.push(name.to_string());
        parts.join(".")
    }
}

pub fn extract_document(doc: DocKey, tree: &tree_sitter::Tree, source: &str, out: &mut Vec<SymbolRecord>) {
    let mut ctx = Context {
        namespace_stack: Vec::new(),
        type_stack: Vec::new(),
        enclosing_type: None,
        member_scope: None,
    };
    // A file-scoped namespace declaration scopes every following sibling of
    // the compilation unit, so the walk tracks it as it goes.
    let root = tree.root_node();
    let mut cursor = root.walk();
    for child in root.named_children(&mut cursor) {
        if child.kind() == "file_scoped_namespace_declaration" {
            if let Some(next) = handle_namespace(child, &ctx, doc, source, out) {
                ctx = next;
            }
            continue;
        }
        walk_declaration(child, &ctx, doc, source, out);
    }
}

fn walk_scope(node: Node<'_>, ctx: &Context, doc: DocKey, source: &str, out: &mut Vec<SymbolRecord>) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        walk_declaration(child, ctx, doc, source, out);
    }
}

fn walk_declaration(
    node: Node<'_>,
    ctx: &Context,
    doc: DocKey,
    source: &str,
    out: &mut Vec<SymbolRecord>,
) {
    match node.kind() {
        "namespace_declaration" | "file_scoped_namespace_declaration" => {
            handle_namespace(node, ctx, doc, source, out);
        }
        "class_declaration" | "record_declaration" => {
            handle_type(node, ctx, doc, source, out, SymbolKind::Class)
        }
        "struct_declaration" => handle_type(node, ctx, doc, source, out, SymbolKind::Struct),
        "interface_declaration" => handle_type(node, ctx, doc, source, out, SymbolKind::Interface),
        "enum_declaration" => handle_type(node, ctx, doc, source, out, SymbolKind::Enum),
        "delegate_declaration" => handle_delegate(node, ctx, doc, source, out),
        "method_declaration" => handle_method(node, ctx, doc, source, out, false),
        "constructor_declaration" => handle_method(node, ctx, doc, source, out, true),
        "property_declaration" => handle_property(node, ctx, doc, source, out),
        "field_declaration" => handle_field(node, ctx, doc, source, out, SymbolKind::Field),
        "event_field_declaration" => handle_field(node, ctx, doc, source, out, SymbolKind::Event),
        "event_declaration" => handle_event(node, ctx, doc, source, out),
        "enum_member_declaration" => handle_enum_member(node, ctx, doc, source, out),
        "global_statement" => walk_scope(node, ctx, doc, source, out),
        _ => {}
    }
}

fn handle_namespace(
    node: Node<'_>,
    ctx: &Context,
    doc: DocKey,
    source: &str,
    out: &mut Vec<SymbolRecord>,
) -> Option<Context> {
    let name_node = node.child_by_field_name("name")?;
    let written = node_text(name_node, source);
    let parts: Vec<String> = written
        .replace("::", ".")
        .split('.')
        .filter(|p| !p.trim().is_empty())
        .map(|p| p.trim().to_string())
        .collect();
    if parts.is_empty() {
        return None;
    }
    let mut next = ctx.clone();
    next.namespace_stack.extend(parts.clone());
    let qualified = next.namespace();

    out.push(SymbolRecord {
        id: 0,
        kind: SymbolKind::Namespace,
        name: parts.last().cloned().unwrap_or_else(|| qualified.clone()),
        display: qualified.clone(),
        qualified_name: qualified,
        accessibility: Accessibility::Public,
        doc,
        decl_span: span_of(node),
        name_span: span_of(name_node),
        scope_span: None,
        container: None,
        namespace: ctx.namespace(),
        base_types: Vec::new(),
        attributes: Vec::new(),
        modifiers: Modifiers::default(),
        parameters: Vec::new(),
        type_display: None,
        return_type: None,
        signature: None,
        accessors: None,
        is_constructor: false,
        is_implicit: false,
        extra_locations: Vec::new(),
    });

    if node.kind() == "file_scoped_namespace_declaration" {
        // Some grammar revisions nest the following declarations under the
        // directive node; walking it is harmless when they are siblings.
        walk_scope(node, &next, doc, source, out);
    } else if let Some(body) = node.child_by_field_name("body") {
        walk_scope(body, &next, doc, source, out);
    }
    Some(next)
}

fn handle_type(
    node: Node<'_>,
    ctx: &Context,
    doc: DocKey,
    source: &str,
    out: &mut Vec<SymbolRecord>,
    kind: SymbolKind,
) {
    let Some(name_node) = node.child_by_field_name("name") else {
        return;
    };
    let name = node_text(name_node, source);
    if name.is_empty() {
        return;
    }
    let modifiers = modifiers_of(node, source);
    let accessibility = accessibility_of(&modifiers_list(node, source)).unwrap_or({
        if ctx.type_stack.is_empty() {
            Accessibility::Internal
        } else {
            Accessibility::Private
        }
    });
    let qualified = ctx.qualify(&name);
    out.push(SymbolRecord {
        id: 0,
        kind,
        name: name.clone(),
        display: qualified.clone(),
        qualified_name: qualified.clone(),
        accessibility,
        doc,
        decl_span: span_of(node),
        name_span: span_of(name_node),
        scope_span: None,
        container: ctx.container(),
        namespace: ctx.namespace(),
        base_types: base_list_types(node, source),
        attributes: attribute_names(node, source),
        modifiers,
        parameters: Vec::new(),
        type_display: None,
        return_type: None,
        signature: type_signature(node, source),
        accessors: None,
        is_constructor: false,
        is_implicit: false,
        extra_locations: Vec::new(),
    });

    if kind == SymbolKind::Enum {
        if let Some(body) = node.child_by_field_name("body") {
            let mut next = ctx.clone();
            next.type_stack.push(name);
            next.enclosing_type = Some(kind);
            walk_scope(body, &next, doc, source, out);
        }
        return;
    }

    let mut next = ctx.clone();
    next.type_stack.push(name);
    next.enclosing_type = Some(kind);
    if let Some(body) = node.child_by_field_name("body") {
        walk_scope(body, &next, doc, source, out);
    }
}

fn handle_delegate(
    node: Node<'_>,
    ctx: &Context,
    doc: DocKey,
    source: &str,
    out: &mut Vec<SymbolRecord>,
) {
    let Some(name_node) = node.child_by_field_name("name") else {
        return;
    };
    let name = node_text(name_node, source);
    if name.is_empty() {
        return;
    }
    let modifiers = modifiers_of(node, source);
    let accessibility = accessibility_of(&modifiers_list(node, source)).unwrap_or({
        if ctx.type_stack.is_empty() {
            Accessibility::Internal
        } else {
            Accessibility::Private
        }
    });
    let parameters = parameters_of(node, source);
    let return_type = return_type_of(node, source);
    let qualified = ctx.qualify(&name);
    let display = format!("{qualified}({})", param_type_list(&parameters));
    out.push(SymbolRecord {
        id: 0,
        kind: SymbolKind::Delegate,
        name,
        qualified_name: qualified,
        display,
        accessibility,
        doc,
        decl_span: span_of(node),
        name_span: span_of(name_node),
        scope_span: None,
        container: ctx.container(),
        namespace: ctx.namespace(),
        base_types: Vec::new(),
        attributes: attribute_names(node, source),
        modifiers,
        parameters,
        type_display: None,
        return_type,
        signature: None,
        accessors: None,
        is_constructor: false,
        is_implicit: false,
        extra_locations: Vec::new(),
    });
}

fn handle_method(
    node: Node<'_>,
    ctx: &Context,
    doc: DocKey,
    source: &str,
    out: &mut Vec<SymbolRecord>,
    is_constructor: bool,
) {
    let Some(name_node) = node.child_by_field_name("name") else {
        return;
    };
    let name = node_text(name_node, source);
    if name.is_empty() {
        return;
    }
    let mut modifiers = modifiers_of(node, source);
    let parameters = parameters_of(node, source);
    modifiers.is_extension = node
        .child_by_field_name("parameters")
        .map(|params| first_param_is_this(params, source))
        .unwrap_or(false);
    let accessibility = accessibility_of(&modifiers_list(node, source))
        .unwrap_or(member_default_accessibility(ctx));
    let return_type = if is_constructor {
        None
    } else {
        return_type_of(node, source)
    };
    let qualified = ctx.qualify(&name);
    let display = format!("{qualified}({})", param_type_list(&parameters));
    let signature = Some(format!(
        "{} {}({})",
        return_type.as_deref().unwrap_or(if is_constructor { "" } else { "void" }).trim(),
        name,
        parameters
            .iter()
            .map(|p| format!("{} {}", p.type_display, p.name))
            .collect::<Vec<_>>()
            .join(", ")
    ));
    let decl_span = span_of(node);
    out.push(SymbolRecord {
        id: 0,
        kind: SymbolKind::Method,
        name,
        qualified_name: qualified,
        display,
        accessibility,
        doc,
        decl_span,
        name_span: span_of(name_node),
        scope_span: None,
        container: ctx.container(),
        namespace: ctx.namespace(),
        base_types: Vec::new(),
        attributes: attribute_names(node, source),
        modifiers,
        parameters: parameters.clone(),
        type_display: None,
        return_type,
        signature: signature.map(|s| s.trim().to_string()),
        accessors: None,
        is_constructor,
        is_implicit: false,
        extra_locations: Vec::new(),
    });

    let mut next = ctx.clone();
    next.member_scope = Some(decl_span);
    if let Some(params) = node.child_by_field_name("parameters") {
        extract_parameters(params, &next, doc, source, out);
    }
    if let Some(body) = node.child_by_field_name("body") {
        extract_locals(body, &next, doc, source, out);
    }
}

fn handle_property(
    node: Node<'_>,
    ctx: &Context,
    doc: DocKey,
    source: &str,
    out: &mut Vec<SymbolRecord>,
) {
    let Some(name_node) = node.child_by_field_name("name") else {
        return;
    };
    let name = node_text(name_node, source);
    if name.is_empty() {
        return;
    }
    let modifiers = modifiers_of(node, source);
    let accessibility = accessibility_of(&modifiers_list(node, source))
        .unwrap_or(member_default_accessibility(ctx));
    let type_display = type_node_of(node, source);
    let qualified = ctx.qualify(&name);
    out.push(SymbolRecord {
        id: 0,
        kind: SymbolKind::Property,
        name,
        display: qualified.clone(),
        qualified_name: qualified,
        accessibility,
        doc,
        decl_span: span_of(node),
        name_span: span_of(name_node),
        scope_span: None,
        container: ctx.container(),
        namespace: ctx.namespace(),
        base_types: Vec::new(),
        attributes: attribute_names(node, source),
        modifiers,
        parameters: Vec::new(),
        type_display,
        return_type: None,
        signature: None,
        accessors: Some(property_accessors(node, source)),
        is_constructor: false,
        is_implicit: false,
        extra_locations: Vec::new(),
    });
}

fn handle_field(
    node: Node<'_>,
    ctx: &Context,
    doc: DocKey,
    source: &str,
    out: &mut Vec<SymbolRecord>,
    kind: SymbolKind,
) {
    let modifiers = modifiers_of(node, source);
    let accessibility = accessibility_of(&modifiers_list(node, source))
        .unwrap_or(member_default_accessibility(ctx));
    let attributes = attribute_names(node, source);
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() != "variable_declaration" {
            continue;
        }
        let type_display = child
            .child_by_field_name("type")
            .map(|t| node_text(t, source));
        let mut decl_cursor = child.walk();
        for declarator in child.named_children(&mut decl_cursor) {
            if declarator.kind() != "variable_declarator" {
                continue;
            }
            let Some(name_node) = declarator.child_by_field_name("name") else {
                continue;
            };
            let name = node_text(name_node, source);
            if name.is_empty() {
                continue;
            }
            let qualified = ctx.qualify(&name);
            out.push(SymbolRecord {
                id: 0,
                kind,
                name,
                display: qualified.clone(),
                qualified_name: qualified,
                accessibility,
                doc,
                decl_span: span_of(node),
                name_span: span_of(name_node),
                scope_span: None,
                container: ctx.container(),
                namespace: ctx.namespace(),
                base_types: Vec::new(),
                attributes: attributes.clone(),
                modifiers,
                parameters: Vec::new(),
                type_display: type_display.clone(),
                return_type: None,
                signature: None,
                accessors: None,
                is_constructor: false,
                is_implicit: false,
                extra_locations: Vec::new(),
            });
        }
    }
}

fn handle_event(
    node: Node<'_>,
    ctx: &Context,
    doc: DocKey,
    source: &str,
    out: &mut Vec<SymbolRecord>,
) {
    let Some(name_node) = node.child_by_field_name("name") else {
        return;
    };
    let name = node_text(name_node, source);
    if name.is_empty() {
        return;
    }
    let modifiers = modifiers_of(node, source);
    let accessibility = accessibility_of(&modifiers_list(node, source))
        .unwrap_or(member_default_accessibility(ctx));
    let qualified = ctx.qualify(&name);
    out.push(SymbolRecord {
        id: 0,
        kind: SymbolKind::Event,
        name,
        display: qualified.clone(),
        qualified_name: qualified,
        accessibility,
        doc,
        decl_span: span_of(node),
        name_span: span_of(name_node),
        scope_span: None,
        container: ctx.container(),
        namespace: ctx.namespace(),
        base_types: Vec::new(),
        attributes: attribute_names(node, source),
        modifiers,
        parameters: Vec::new(),
        type_display: type_node_of(node, source),
        return_type: None,
        signature: None,
        accessors: None,
        is_constructor: false,
        is_implicit: false,
        extra_locations: Vec::new(),
    });
}

fn handle_enum_member(
    node: Node<'_>,
    ctx: &Context,
    doc: DocKey,
    source: &str,
    out: &mut Vec<SymbolRecord>,
) {
    let Some(name_node) = node.child_by_field_name("name") else {
        return;
    };
    let name = node_text(name_node, source);
    if name.is_empty() {
        return;
    }
    let qualified = ctx.qualify(&name);
    out.push(SymbolRecord {
        id: 0,
        kind: SymbolKind::Field,
        name,
        display: qualified.clone(),
        qualified_name: qualified,
        accessibility: Accessibility::Public,
        doc,
        decl_span: span_of(node),
        name_span: span_of(name_node),
        scope_span: None,
        container: ctx.container(),
        namespace: ctx.namespace(),
        base_types: Vec::new(),
        attributes: Vec::new(),
        modifiers: Modifiers {
            is_static: true,
            is_const: true,
            ..Modifiers::default()
        },
        parameters: Vec::new(),
        type_display: None,
        return_type: None,
        signature: None,
        accessors: None,
        is_constructor: false,
        is_implicit: false,
        extra_locations: Vec::new(),
    });
}

fn extract_parameters(
    params: Node<'_>,
    ctx: &Context,
    doc: DocKey,
    source: &str,
    out: &mut Vec<SymbolRecord>,
) {
    let mut cursor = params.walk();
    for param in params.named_children(&mut cursor) {
        if param.kind() != "parameter" {
            continue;
        }
        let Some(name_node) = param.child_by_field_name("name") else {
            continue;
        };
        let name = node_text(name_node, source);
        if name.is_empty() {
            continue;
        }
        let type_display = param
            .child_by_field_name("type")
            .map(|t| node_text(t, source));
        out.push(SymbolRecord {
            id: 0,
            kind: SymbolKind::Parameter,
            name: name.clone(),
            display: name.clone(),
            qualified_name: name,
            accessibility: Accessibility::Private,
            doc,
            decl_span: span_of(param),
            name_span: span_of(name_node),
            scope_span: ctx.member_scope,
            container: ctx.container(),
            namespace: ctx.namespace(),
            base_types: Vec::new(),
            attributes: Vec::new(),
            modifiers: Modifiers::default(),
            parameters: Vec::new(),
            type_display,
            return_type: None,
            signature: None,
            accessors: None,
            is_constructor: false,
            is_implicit: false,
            extra_locations: Vec::new(),
        });
    }
}

fn extract_locals(
    node: Node<'_>,
    ctx: &Context,
    doc: DocKey,
    source: &str,
    out: &mut Vec<SymbolRecord>,
) {
    if matches!(
        node.kind(),
        "anonymous_method_expression" | "lambda_expression"
    ) {
        return;
    }
    if node.kind() == "local_declaration_statement" {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if child.kind() != "variable_declaration" {
                continue;
            }
            let type_display = child
                .child_by_field_name("type")
                .map(|t| node_text(t, source));
            let mut decl_cursor = child.walk();
            for declarator in child.named_children(&mut decl_cursor) {
                if declarator.kind() != "variable_declarator" {
                    continue;
                }
                let Some(name_node) = declarator.child_by_field_name("name") else {
                    continue;
                };
                let name = node_text(name_node, source);
                if name.is_empty() {
                    continue;
                }
                out.push(SymbolRecord {
                    id: 0,
                    kind: SymbolKind::Local,
                    name: name.clone(),
                    display: name.clone(),
                    qualified_name: name,
                    accessibility: Accessibility::Private,
                    doc,
                    decl_span: span_of(declarator),
                    name_span: span_of(name_node),
                    scope_span: ctx.member_scope,
                    container: ctx.container(),
                    namespace: ctx.namespace(),
                    base_types: Vec::new(),
                    attributes: Vec::new(),
                    modifiers: Modifiers::default(),
                    parameters: Vec::new(),
                    type_display: type_display.clone(),
                    return_type: None,
                    signature: None,
                    accessors: None,
                    is_constructor: false,
                    is_implicit: false,
                    extra_locations: Vec::new(),
                });
            }
        }
    }
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        extract_locals(child, ctx, doc, source, out);
    }
}

fn member_default_accessibility(ctx: &Context) -> Accessibility {
    match ctx.enclosing_type {
        Some(SymbolKind::Interface) => Accessibility::Public,
        _ => Accessibility::Private,
    }
}

fn modifiers_list(node: Node<'_>, source: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() == "modifier" {
            out.push(node_text(child, source));
        }
    }
    out
}

fn modifiers_of(node: Node<'_>, source: &str) -> Modifiers {
    let list = modifiers_list(node, source);
    let has = |word: &str| list.iter().any(|m| m == word);
    Modifiers {
        is_static: has("static"),
        is_async: has("async"),
        is_abstract: has("abstract"),
        is_virtual: has("virtual"),
        is_override: has("override"),
        is_sealed: has("sealed"),
        is_readonly: has("readonly"),
        is_partial: has("partial"),
        is_extension: false,
        is_const: has("const"),
    }
}

fn accessibility_of(modifiers: &[String]) -> Option<Accessibility> {
    let has = |word: &str| modifiers.iter().any(|m| m == word);
    if has("public") {
        Some(Accessibility::Public)
    } else if has("protected") && has("internal") {
        Some(Accessibility::ProtectedInternal)
    } else if has("private") && has("protected") {
        Some(Accessibility::PrivateProtected)
    } else if has("internal") {
        Some(Accessibility::Internal)
    } else if has("protected") {
        Some(Accessibility::Protected)
    } else if has("private") {
        Some(Accessibility::Private)
    } else {
        None
    }
}

fn attribute_names(node: Node<'_>, source: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() != "attribute_list" {
            continue;
        }
        let mut list_cursor = child.walk();
        for attr in child.named_children(&mut list_cursor) {
            if attr.kind() != "attribute" {
                continue;
            }
            let Some(name_node) = attr.child_by_field_name("name") else {
                continue;
            };
            let raw = node_text(name_node, source);
            let short = raw
                .rsplit('.')
                .next()
                .unwrap_or(&raw)
                .split('<')
                .next()
                .unwrap_or(&raw)
                .to_string();
            if !short.is_empty() {
                out.push(short);
            }
        }
    }
    out
}

fn base_list_types(node: Node<'_>, source: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() != "base_list" {
            continue;
        }
        let mut base_cursor = child.walk();
        for base in child.named_children(&mut base_cursor) {
            match base.kind() {
                "argument_list" => {}
                "primary_constructor_base_type" => {
                    let type_node = base.child_by_field_name("type").unwrap_or(base);
                    let name = node_text(type_node, source);
                    if !name.is_empty() {
                        out.push(name);
                    }
                }
                _ => {
                    let name = node_text(base, source);
                    if !name.is_empty() {
                        out.push(name);
                    }
                }
            }
        }
    }
    out
}

fn parameters_of(node: Node<'_>, source: &str) -> Vec<ParamInfo> {
    let Some(params) = node.child_by_field_name("parameters") else {
        return Vec::new();
    };
    let mut out = Vec::new();
    let mut cursor = params.walk();
    for param in params.named_children(&mut cursor) {
        if param.kind() != "parameter" {
            continue;
        }
        let name = param
            .child_by_field_name("name")
            .map(|n| node_text(n, source))
            .unwrap_or_default();
        let type_display = param
            .child_by_field_name("type")
            .map(|t| node_text(t, source))
            .unwrap_or_default();
        if !name.is_empty() {
            out.push(ParamInfo { name, type_display });
        }
    }
    out
}

fn first_param_is_this(params: Node<'_>, source: &str) -> bool {
    let mut cursor = params.walk();
    for param in params.named_children(&mut cursor) {
        if param.kind() == "parameter" {
            return node_text(param, source).starts_with("this ");
        }
    }
    false
}

fn param_type_list(parameters: &[ParamInfo]) -> String {
    parameters
        .iter()
        .map(|p| p.type_display.clone())
        .collect::<Vec<_>>()
        .join(", ")
}

fn return_type_of(node: Node<'_>, source: &str) -> Option<String> {
    node.child_by_field_name("returns")
        .or_else(|| node.child_by_field_name("type"))
        .map(|n| node_text(n, source))
        .filter(|t| !t.is_empty())
}

fn type_node_of(node: Node<'_>, source: &str) -> Option<String> {
    if let Some(t) = node.child_by_field_name("type") {
        let text = node_text(t, source);
        if !text.is_empty() {
            return Some(text);
        }
    }
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if matches!(
            child.kind(),
            "predefined_type"
                | "identifier"
                | "qualified_name"
                | "generic_name"
                | "nullable_type"
                | "array_type"
        ) {
            let text = node_text(child, source);
            if !text.is_empty() {
                return Some(text);
            }
        }
        // Stop scanning once the member name is reached.
        if child.id() == node.child_by_field_name("name").map(|n| n.id()).unwrap_or(0) {
            break;
        }
    }
    None
}

fn property_accessors(node: Node<'_>, source: &str) -> (bool, bool) {
    let mut has_get = false;
    let mut has_set = false;
    let mut saw_list = false;
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() != "accessor_list" {
            continue;
        }
        saw_list = true;
        let mut acc_cursor = child.walk();
        for accessor in child.named_children(&mut acc_cursor) {
            let text = node_text(accessor, source);
            if text.starts_with("get") || text.contains("get;") || text.contains("get ") {
                has_get = true;
            }
            if text.starts_with("set")
                || text.starts_with("init")
                || text.contains("set;")
                || text.contains("init;")
            {
                has_set = true;
            }
        }
    }
    if !saw_list {
        // Expression-bodied property: getter only.
        has_get = true;
    }
    (has_get, has_set)
}

fn type_signature(node: Node<'_>, source: &str) -> Option<String> {
    let name = node.child_by_field_name("name")?;
    let bases = base_list_types(node, source);
    let name_text = node_text(name, source);
    if bases.is_empty() {
        Some(name_text)
    } else {
        Some(format!("{} : {}", name_text, bases.join(", ")))
    }
}

fn span_of(node: Node<'_>) -> Span {
    let start = node.start_position();
    let end = node.end_position();
    Span {
        start_line: start.row,
        start_col: start.column,
        end_line: end.row,
        end_col: end.column,
        start_byte: node.start_byte(),
        end_byte: node.end_byte(),
    }
}

pub fn node_text(node: Node<'_>, source: &str) -> String {
    source
        .get(node.start_byte()..node.end_byte())
        .unwrap_or("")
        .trim()
        .to_string()
}
