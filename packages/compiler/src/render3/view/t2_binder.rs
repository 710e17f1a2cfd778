//! Render3 T2 Binder
//!
//! Matches directives against template nodes and resolves what every
//! template-local name in a bound expression refers to.

use std::collections::HashMap;

use indexmap::IndexSet;

use crate::directive_matching::{create_css_selector, CssSelector, SelectorMatcher};
use crate::expression_parser::ast::{ASTKind, AbsoluteSourceSpan, AST};
use crate::render3::r3_ast::{self as t, ElementOrTemplate, NodeId};

use super::t2_api::{DirectiveMeta, ReferenceTarget, Target, TemplateEntity};

/// Binds templates against a fixed set of directives.
pub struct R3TargetBinder<D> {
    matcher: SelectorMatcher<D>,
}

impl<D: DirectiveMeta> R3TargetBinder<D> {
    pub fn new(matcher: SelectorMatcher<D>) -> Self {
        R3TargetBinder { matcher }
    }

    /// Builds a matcher from directive metadata. Directives without a
    /// selector, or with one that fails to parse, are never matched.
    pub fn from_directives(directives: impl IntoIterator<Item = D>) -> Self {
        let mut matcher = SelectorMatcher::new();
        for directive in directives {
            let Some(selector) = directive.selector() else {
                continue;
            };
            if let Ok(selectors) = CssSelector::parse(selector) {
                matcher.add_selectables(selectors, directive);
            }
        }
        R3TargetBinder::new(matcher)
    }

    pub fn bind<'a>(&self, target: Target<'a>) -> BoundTarget<'a, D> {
        let mut bound = BoundTarget {
            target,
            directives: HashMap::new(),
            references: HashMap::new(),
            expressions: HashMap::new(),
            symbols: HashMap::new(),
            nesting_levels: HashMap::new(),
            used_pipes: IndexSet::new(),
        };

        let mut directive_binder = DirectiveBinder {
            matcher: &self.matcher,
            directives: &mut bound.directives,
            references: &mut bound.references,
        };
        directive_binder.ingest(target.template);

        let mut scopes = ScopeTree::default();
        let root = scopes.push(None, None);
        scopes.ingest(root, target.template);
        bound.symbols = scopes.symbols.clone();

        let mut template_binder = TemplateBinder {
            scopes: &scopes,
            expressions: &mut bound.expressions,
            nesting_levels: &mut bound.nesting_levels,
            used_pipes: &mut bound.used_pipes,
        };
        template_binder.ingest(root, 0, target.template);

        bound
    }
}

// ============================================================================
// Directive matching
// ============================================================================

struct DirectiveBinder<'m, D> {
    matcher: &'m SelectorMatcher<D>,
    directives: &'m mut HashMap<NodeId, Vec<D>>,
    references: &'m mut HashMap<NodeId, ReferenceTarget<D>>,
}

impl<'m, D: DirectiveMeta> DirectiveBinder<'m, D> {
    fn ingest(&mut self, nodes: &[t::R3Node]) {
        for node in nodes {
            match node {
                t::R3Node::Element(el) => {
                    self.visit_element_or_template(&el.name, ElementOrTemplate::Element(el));
                    self.ingest(&el.children);
                }
                t::R3Node::Template(tmpl) => {
                    self.visit_element_or_template("ng-template", ElementOrTemplate::Template(tmpl));
                    self.ingest(&tmpl.children);
                }
                t::R3Node::Content(_) | t::R3Node::Text(_) | t::R3Node::BoundText(_) => {}
            }
        }
    }

    fn visit_element_or_template(&mut self, element_name: &str, node: ElementOrTemplate<'_>) {
        let selector = create_css_selector(element_name, &attrs_for_directive_matching(node));
        let directives: Vec<D> = self.matcher.match_(&selector).into_iter().cloned().collect();

        for reference in node.references() {
            let target = if reference.value.trim().is_empty() {
                match directives.iter().find(|dir| dir.is_component()) {
                    Some(component) => ReferenceTarget::Directive {
                        directive: component.clone(),
                        node: node.id(),
                    },
                    None => match node {
                        ElementOrTemplate::Element(el) => ReferenceTarget::Element(el.id),
                        ElementOrTemplate::Template(tmpl) => ReferenceTarget::Template(tmpl.id),
                    },
                }
            } else {
                let exported = directives.iter().find(|dir| {
                    dir.export_as()
                        .is_some_and(|names| names.iter().any(|name| name == &reference.value))
                });
                match exported {
                    Some(directive) => ReferenceTarget::Directive {
                        directive: directive.clone(),
                        node: node.id(),
                    },
                    // Unresolved `exportAs` names are left unbound.
                    None => continue,
                }
            };
            self.references.insert(reference.id, target);
        }

        if !directives.is_empty() {
            self.directives.insert(node.id(), directives);
        }
    }
}

/// Static attributes keep their values. Property bindings and events only
/// contribute their names.
fn attrs_for_directive_matching(node: ElementOrTemplate<'_>) -> Vec<(String, String)> {
    let mut attrs: Vec<(String, String)> = node
        .attributes()
        .iter()
        .map(|attr| (attr.name.clone(), attr.value.clone()))
        .collect();
    attrs.extend(
        node.inputs()
            .iter()
            .filter(|input| input.type_ == t::BindingType::Property)
            .map(|input| (input.name.clone(), String::new())),
    );
    attrs.extend(node.outputs().iter().map(|output| (output.name.clone(), String::new())));
    attrs
}

// ============================================================================
// Scopes
// ============================================================================

struct Scope<'a> {
    parent: Option<usize>,
    template: Option<&'a t::Template>,
    entities: HashMap<&'a str, TemplateEntity<'a>>,
}

/// Lexical scopes of a template. References are visible throughout the
/// scope that declares them, regardless of position.
#[derive(Default)]
struct ScopeTree<'a> {
    scopes: Vec<Scope<'a>>,
    child_scopes: HashMap<NodeId, usize>,
    symbols: HashMap<NodeId, &'a t::Template>,
}

impl<'a> ScopeTree<'a> {
    fn push(&mut self, parent: Option<usize>, template: Option<&'a t::Template>) -> usize {
        self.scopes.push(Scope {
            parent,
            template,
            entities: HashMap::new(),
        });
        self.scopes.len() - 1
    }

    fn declare(&mut self, scope: usize, entity: TemplateEntity<'a>) {
        let current = &mut self.scopes[scope];
        // The first declaration of a name wins.
        if current.entities.contains_key(entity.name()) {
            return;
        }
        current.entities.insert(entity.name(), entity);
        if let Some(template) = current.template {
            self.symbols.insert(entity.id(), template);
        }
    }

    fn ingest(&mut self, scope: usize, nodes: &'a [t::R3Node]) {
        for node in nodes {
            match node {
                t::R3Node::Element(el) => {
                    for reference in &el.references {
                        self.declare(scope, TemplateEntity::Reference(reference));
                    }
                    self.ingest(scope, &el.children);
                }
                t::R3Node::Template(tmpl) => {
                    // References on the template itself belong to the outer scope.
                    for reference in &tmpl.references {
                        self.declare(scope, TemplateEntity::Reference(reference));
                    }
                    let child = self.push(Some(scope), Some(tmpl));
                    self.child_scopes.insert(tmpl.id, child);
                    for variable in &tmpl.variables {
                        self.declare(child, TemplateEntity::Variable(variable));
                    }
                    self.ingest(child, &tmpl.children);
                }
                t::R3Node::Content(_) | t::R3Node::Text(_) | t::R3Node::BoundText(_) => {}
            }
        }
    }

    fn lookup(&self, scope: usize, name: &str) -> Option<TemplateEntity<'a>> {
        let mut current = Some(scope);
        while let Some(idx) = current {
            if let Some(entity) = self.scopes[idx].entities.get(name) {
                return Some(*entity);
            }
            current = self.scopes[idx].parent;
        }
        None
    }
}

// ============================================================================
// Expression binding
// ============================================================================

struct TemplateBinder<'s, 'a> {
    scopes: &'s ScopeTree<'a>,
    expressions: &'s mut HashMap<AbsoluteSourceSpan, TemplateEntity<'a>>,
    nesting_levels: &'s mut HashMap<NodeId, usize>,
    used_pipes: &'s mut IndexSet<String>,
}

impl<'s, 'a> TemplateBinder<'s, 'a> {
    fn ingest(&mut self, scope: usize, level: usize, nodes: &'a [t::R3Node]) {
        for node in nodes {
            match node {
                t::R3Node::Element(el) => {
                    self.visit_bindings(scope, ElementOrTemplate::Element(el));
                    self.ingest(scope, level, &el.children);
                }
                t::R3Node::Template(tmpl) => {
                    self.visit_bindings(scope, ElementOrTemplate::Template(tmpl));
                    self.nesting_levels.insert(tmpl.id, level + 1);
                    if let Some(child) = self.scopes.child_scopes.get(&tmpl.id) {
                        self.ingest(*child, level + 1, &tmpl.children);
                    }
                }
                t::R3Node::BoundText(text) => self.visit_expression(scope, &text.value),
                t::R3Node::Content(_) | t::R3Node::Text(_) => {}
            }
        }
    }

    fn visit_bindings(&mut self, scope: usize, node: ElementOrTemplate<'a>) {
        for input in node.inputs() {
            self.visit_expression(scope, &input.value);
        }
        for output in node.outputs() {
            self.visit_expression(scope, &output.handler);
        }
    }

    fn visit_expression(&mut self, scope: usize, ast: &'a AST) {
        let mut nodes = Vec::new();
        ast.walk(&mut |node| nodes.push(node));
        for node in nodes {
            match &node.kind {
                ASTKind::PropertyRead(read) | ASTKind::SafePropertyRead(read) => {
                    self.maybe_map(scope, node, &read.receiver, &read.name)
                }
                ASTKind::PropertyWrite(write) => self.maybe_map(scope, node, &write.receiver, &write.name),
                ASTKind::MethodCall(call) | ASTKind::SafeMethodCall(call) => {
                    self.maybe_map(scope, node, &call.receiver, &call.name)
                }
                ASTKind::BindingPipe(pipe) => {
                    self.used_pipes.insert(pipe.name.clone());
                }
                _ => {}
            }
        }
    }

    fn maybe_map(&mut self, scope: usize, node: &AST, receiver: &AST, name: &str) {
        if !receiver.is_implicit_receiver() {
            return;
        }
        if let Some(entity) = self.scopes.lookup(scope, name) {
            self.expressions.insert(node.source_span, entity);
        }
    }
}

// ============================================================================
// Bound target
// ============================================================================

/// The result of binding a template: directives per node, reference targets
/// and the template-local entity behind each bound expression.
pub struct BoundTarget<'a, D> {
    pub target: Target<'a>,
    directives: HashMap<NodeId, Vec<D>>,
    references: HashMap<NodeId, ReferenceTarget<D>>,
    expressions: HashMap<AbsoluteSourceSpan, TemplateEntity<'a>>,
    symbols: HashMap<NodeId, &'a t::Template>,
    nesting_levels: HashMap<NodeId, usize>,
    used_pipes: IndexSet<String>,
}

impl<'a, D: DirectiveMeta> BoundTarget<'a, D> {
    /// Directives matched on an element or template, in registration order.
    pub fn get_directives_of_node(&self, node: NodeId) -> Option<&[D]> {
        self.directives.get(&node).map(Vec::as_slice)
    }

    pub fn get_reference_target(&self, reference: &t::Reference) -> Option<&ReferenceTarget<D>> {
        self.references.get(&reference.id)
    }

    /// The reference or variable an implicit-receiver read, write or call
    /// resolves to, if any.
    pub fn get_expression_target(&self, expr: &AST) -> Option<TemplateEntity<'a>> {
        self.expressions.get(&expr.source_span).copied()
    }

    /// The template whose scope declares `entity`, if it is not top level.
    pub fn get_template_of_symbol(&self, entity: TemplateEntity<'_>) -> Option<&'a t::Template> {
        self.symbols.get(&entity.id()).copied()
    }

    /// Number of templates enclosing the children of `template`.
    pub fn get_nesting_level(&self, template: NodeId) -> usize {
        self.nesting_levels.get(&template).copied().unwrap_or(0)
    }

    /// Every matched directive, deduplicated by name in first-match order.
    pub fn get_used_directives(&self) -> Vec<D> {
        let mut seen = IndexSet::new();
        let mut used = Vec::new();
        let mut ids: Vec<&NodeId> = self.directives.keys().collect();
        ids.sort();
        for id in ids {
            for directive in &self.directives[id] {
                if seen.insert(directive.name().to_string()) {
                    used.push(directive.clone());
                }
            }
        }
        used
    }

    pub fn get_used_pipes(&self) -> Vec<String> {
        self.used_pipes.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;

    use super::*;
    use crate::render3::view::template::{parse_template, ParseTemplateOptions};

    #[derive(Debug, Clone)]
    struct TestDir {
        name: String,
        selector: String,
        is_component: bool,
        inputs: IndexMap<String, String>,
        outputs: IndexMap<String, String>,
        export_as: Option<Vec<String>>,
    }

    impl TestDir {
        fn new(name: &str, selector: &str) -> Self {
            TestDir {
                name: name.to_string(),
                selector: selector.to_string(),
                is_component: false,
                inputs: IndexMap::new(),
                outputs: IndexMap::new(),
                export_as: None,
            }
        }
    }

    impl DirectiveMeta for TestDir {
        fn name(&self) -> &str {
            &self.name
        }
        fn selector(&self) -> Option<&str> {
            Some(&self.selector)
        }
        fn is_component(&self) -> bool {
            self.is_component
        }
        fn inputs(&self) -> &IndexMap<String, String> {
            &self.inputs
        }
        fn outputs(&self) -> &IndexMap<String, String> {
            &self.outputs
        }
        fn export_as(&self) -> Option<&[String]> {
            self.export_as.as_deref()
        }
    }

    fn nodes(template: &str) -> Vec<t::R3Node> {
        let parsed = parse_template(template, "test.html", ParseTemplateOptions::default(), "test.html");
        assert!(parsed.errors.is_empty(), "{:?}", parsed.errors);
        parsed.nodes
    }

    fn element(node: &t::R3Node) -> &t::Element {
        match node {
            t::R3Node::Element(el) => el,
            other => panic!("expected element, got {:?}", other),
        }
    }

    fn template(node: &t::R3Node) -> &t::Template {
        match node {
            t::R3Node::Template(tmpl) => tmpl,
            other => panic!("expected template, got {:?}", other),
        }
    }

    fn interpolated(node: &t::R3Node) -> &AST {
        let t::R3Node::BoundText(text) = node else {
            panic!("expected bound text, got {:?}", node);
        };
        let ASTKind::Interpolation { expressions, .. } = &text.value.kind else {
            panic!("expected interpolation");
        };
        &expressions[0]
    }

    #[test]
    fn should_match_directives_by_attribute_and_binding() {
        let mut dir = TestDir::new("Dir", "[dir]");
        dir.inputs.insert("value".into(), "value".into());
        let binder = R3TargetBinder::from_directives(vec![dir, TestDir::new("Other", "other")]);
        let parsed = nodes("<div dir [value]=\"x\"></div><span [dir]=\"y\"></span><p></p>");
        let bound = binder.bind(Target { template: &parsed });

        let names = |node: &t::R3Node| -> Vec<String> {
            bound
                .get_directives_of_node(element(node).id)
                .map(|dirs| dirs.iter().map(|d| d.name.clone()).collect())
                .unwrap_or_default()
        };
        assert_eq!(names(&parsed[0]), vec!["Dir"]);
        assert_eq!(names(&parsed[1]), vec!["Dir"]);
        assert!(names(&parsed[2]).is_empty());
        assert_eq!(bound.get_used_directives().len(), 1);
    }

    #[test]
    fn should_match_structural_directives_on_ng_template() {
        let binder = R3TargetBinder::from_directives(vec![TestDir::new("NgIf", "[ngIf]")]);
        let parsed = nodes("<div *ngIf=\"show\"></div>");
        let bound = binder.bind(Target { template: &parsed });
        let tmpl = template(&parsed[0]);
        assert_eq!(bound.get_directives_of_node(tmpl.id).map(|d| d.len()), Some(1));
        assert!(bound.get_directives_of_node(element(&tmpl.children[0]).id).is_none());
    }

    #[test]
    fn should_resolve_reference_targets() {
        let mut cmp = TestDir::new("Cmp", "my-cmp");
        cmp.is_component = true;
        let mut form = TestDir::new("Form", "form");
        form.export_as = Some(vec!["ngForm".into()]);
        let binder = R3TargetBinder::from_directives(vec![cmp, form]);
        let parsed = nodes("<my-cmp #c></my-cmp><form #f=\"ngForm\"></form><input #i><form #bad=\"nope\"></form>");
        let bound = binder.bind(Target { template: &parsed });

        let target = |idx: usize| bound.get_reference_target(&element(&parsed[idx]).references[0]);
        assert!(matches!(target(0), Some(ReferenceTarget::Directive { directive, .. }) if directive.name == "Cmp"));
        assert!(matches!(target(1), Some(ReferenceTarget::Directive { directive, .. }) if directive.name == "Form"));
        assert!(matches!(target(2), Some(ReferenceTarget::Element(id)) if *id == element(&parsed[2]).id));
        assert!(target(3).is_none());
    }

    #[test]
    fn should_bind_variables_and_references_to_expressions() {
        let binder = R3TargetBinder::<TestDir>::from_directives(Vec::new());
        let parsed = nodes(
            "<input #name><ng-template let-item><b>{{ item }}</b><b>{{ name }}</b><b>{{ other }}</b></ng-template>",
        );
        let bound = binder.bind(Target { template: &parsed });
        let tmpl = template(&parsed[1]);
        let text = |idx: usize| interpolated(&element(&tmpl.children[idx]).children[0]);

        let item = bound.get_expression_target(text(0));
        assert!(matches!(item, Some(TemplateEntity::Variable(v)) if v.name == "item"));
        let owner = bound.get_template_of_symbol(item.unwrap());
        assert_eq!(owner.map(|t| t.id), Some(tmpl.id));

        let name = bound.get_expression_target(text(1));
        assert!(matches!(name, Some(TemplateEntity::Reference(r)) if r.name == "name"));
        assert!(bound.get_template_of_symbol(name.unwrap()).is_none());

        assert!(bound.get_expression_target(text(2)).is_none());
        assert_eq!(bound.get_nesting_level(tmpl.id), 1);
    }

    #[test]
    fn should_not_leak_variables_out_of_their_template() {
        let binder = R3TargetBinder::<TestDir>::from_directives(Vec::new());
        let parsed = nodes("<ng-template let-item></ng-template><p>{{ item }}</p>");
        let bound = binder.bind(Target { template: &parsed });
        let p = element(&parsed[1]);
        assert!(bound.get_expression_target(interpolated(&p.children[0])).is_none());
    }

    #[test]
    fn should_collect_used_pipes() {
        let binder = R3TargetBinder::<TestDir>::from_directives(Vec::new());
        let parsed = nodes("<p [title]=\"a | upper\">{{ b | date:'short' | upper }}</p>");
        let bound = binder.bind(Target { template: &parsed });
        assert_eq!(bound.get_used_pipes(), vec!["upper", "date"]);
    }
}
