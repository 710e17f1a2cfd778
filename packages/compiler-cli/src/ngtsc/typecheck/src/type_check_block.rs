// Type Check Block
//
// A type check block (TCB) is a function whose body mirrors a component
// template: elements become DOM element variables, directives become
// instances built through their type constructors, and every binding becomes
// an expression over `ctx`, the component instance. Type errors inside the
// TCB are template errors.

use std::collections::{HashMap, HashSet};
use std::mem;

use angular_compiler::expression_parser::ast::{ASTKind, AST};
use angular_compiler::render3::r3_ast::{self as t, BindingType, NodeId, R3Node};
use angular_compiler::render3::view::{BoundTarget, ReferenceTarget, TemplateEntity};
use anyhow::anyhow;
use ts::{ClassDeclaration, DeclId, SourceFile};

use super::expression::{ast_to_typescript, property_access, string_literal, ExpressionResolver};
use super::type_constructor::type_parameters;
use crate::ngtsc::translator::{translate_expression, ImportManager};
use crate::ngtsc::typecheck::api::{TypeCheckBlockMetadata, TypeCheckableDirectiveMeta};
use crate::ngtsc::util::is_valid_identifier;

/// Generates the type check block of the component `node`, whose template
/// has been bound into `bound`. Directive classes are referenced through
/// `imports`.
pub fn generate_type_check_block(
    node: &ClassDeclaration,
    file: &SourceFile,
    meta: &TypeCheckBlockMetadata,
    bound: &BoundTarget<'_, TypeCheckableDirectiveMeta>,
    imports: &mut ImportManager,
) -> anyhow::Result<String> {
    let name = node
        .name_text()
        .ok_or_else(|| anyhow!("type check block requested for an anonymous class"))?;
    let mut tcb = Tcb {
        bound,
        imports,
        context_file: &file.file_name,
        next_id: 0,
        scope: Scope::default(),
        parents: Vec::new(),
    };
    tcb.process_nodes(bound.target.template)?;

    let (params, args) = type_parameters(node, file);
    Ok(format!(
        "function {}{}(ctx: {}{}) {{ if (true) {{ {} }} }}",
        meta.fn_name,
        params,
        name,
        args,
        tcb.scope.statements.join(" ")
    ))
}

/// Ids and statements of one level of template nesting.
#[derive(Default)]
struct Scope {
    elements: HashMap<NodeId, String>,
    directives: HashMap<(NodeId, DeclId), String>,
    template_ctx: HashMap<NodeId, String>,
    variables: HashMap<NodeId, String>,
    statements: Vec<String>,
}

struct Tcb<'b, 't> {
    bound: &'b BoundTarget<'t, TypeCheckableDirectiveMeta>,
    imports: &'b mut ImportManager,
    context_file: &'b str,
    next_id: usize,
    /// The innermost scope. Enclosing scopes are in `parents`.
    scope: Scope,
    parents: Vec<Scope>,
}

impl<'b, 't> Tcb<'b, 't> {
    fn allocate_id(&mut self) -> String {
        let id = format!("_t{}", self.next_id);
        self.next_id += 1;
        id
    }

    /// Looks an id up from the innermost scope outwards.
    fn find(&self, lookup: impl Fn(&Scope) -> Option<&String>) -> Option<String> {
        std::iter::once(&self.scope)
            .chain(self.parents.iter().rev())
            .find_map(lookup)
            .cloned()
    }

    fn push_scope(&mut self) {
        let parent = mem::take(&mut self.scope);
        self.parents.push(parent);
    }

    fn pop_scope(&mut self) -> anyhow::Result<Scope> {
        let parent = self
            .parents
            .pop()
            .ok_or_else(|| anyhow!("type check block scope underflow"))?;
        Ok(mem::replace(&mut self.scope, parent))
    }

    fn statement(&mut self, statement: String) {
        self.scope.statements.push(statement);
    }

    fn process_nodes(&mut self, nodes: &[R3Node]) -> anyhow::Result<()> {
        for node in nodes {
            match node {
                R3Node::Element(el) => self.process_element(el)?,
                R3Node::Template(tmpl) => self.process_template(tmpl)?,
                R3Node::BoundText(text) => {
                    let expr = self.expression(&text.value)?;
                    self.statement(format!("{};", expr));
                }
                R3Node::Content(_) | R3Node::Text(_) => {}
            }
        }
        Ok(())
    }

    fn process_element(&mut self, el: &t::Element) -> anyhow::Result<()> {
        let id = self.allocate_id();
        self.scope.elements.insert(el.id, id.clone());
        self.statement(format!("var {} = document.createElement({});", id, string_literal(&el.name)));

        let claimed = self.process_directives(el.id, &el.inputs)?;
        for input in &el.inputs {
            if input.type_ != BindingType::Property || claimed.contains(&input.name) {
                continue;
            }
            let expr = self.expression(&input.value)?;
            self.statement(format!("{} = {};", property_access(&id, &input.name), expr));
        }

        self.process_nodes(&el.children)
    }

    /// Instantiates each directive matched on `node` that has no instance
    /// yet, and returns the names of the inputs the directives consumed.
    fn process_directives(&mut self, node: NodeId, inputs: &[t::BoundAttribute]) -> anyhow::Result<HashSet<String>> {
        let mut claimed = HashSet::new();
        let bound = self.bound;
        let Some(directives) = bound.get_directives_of_node(node) else {
            return Ok(claimed);
        };

        for dir in directives {
            let key = (node, dir.reference.decl);
            if self.find(|scope| scope.directives.get(&key)).is_some() {
                continue;
            }
            let id = self.allocate_id();
            self.scope.directives.insert(key, id.clone());

            // Binding name to class property; a later declaration of the same
            // binding name wins.
            let by_binding: HashMap<&str, &str> = dir
                .inputs
                .iter()
                .map(|(field, binding)| (binding.as_str(), field.as_str()))
                .collect();
            let mut bindings = Vec::new();
            for input in inputs {
                if let Some(field) = by_binding.get(input.name.as_str()) {
                    let expr = self.expression(&input.value)?;
                    bindings.push((*field, expr));
                    claimed.insert(input.name.clone());
                }
            }

            let dir_ref = self.directive_ref(dir)?;
            let init = bindings
                .iter()
                .map(|(field, expr)| format!("{}: {}", object_key(field), expr))
                .collect::<Vec<_>>();
            let init = if init.is_empty() {
                "{}".to_string()
            } else {
                format!("{{ {} }}", init.join(", "))
            };
            self.statement(format!("var {} = {}.ngTypeCtor({});", id, dir_ref, init));
            for (field, expr) in bindings {
                self.statement(format!("{} = {};", property_access(&id, field), expr));
            }
        }
        Ok(claimed)
    }

    fn process_template(&mut self, tmpl: &t::Template) -> anyhow::Result<()> {
        let ctx = self.allocate_id();
        self.statement(format!("var {}: any = null!;", ctx));
        self.process_directives(tmpl.id, &tmpl.inputs)?;

        self.push_scope();
        self.scope.template_ctx.insert(tmpl.id, ctx.clone());
        self.process_nodes(&tmpl.children)?;
        let child = self.pop_scope()?;

        let mut guards = Vec::new();
        let bound = self.bound;
        for dir in bound.get_directives_of_node(tmpl.id).unwrap_or_default() {
            let key = (tmpl.id, dir.reference.decl);
            let dir_id = self
                .find(|scope| scope.directives.get(&key))
                .ok_or_else(|| anyhow!("no instance of {} on its template", dir.name))?;
            let dir_ref = self.directive_ref(dir)?;
            for input in &dir.ng_template_guards {
                if let Some(binding) = tmpl.inputs.iter().find(|binding| &binding.name == input) {
                    let expr = self.expression(&binding.value)?;
                    let guard = property_access(&dir_ref, &format!("ngTemplateGuard_{}", input));
                    guards.push(format!("{}({}, {})", guard, dir_id, expr));
                }
            }
            if dir.has_ng_template_context_guard {
                guards.push(format!("{}.ngTemplateContextGuard({}, {})", dir_ref, dir_id, ctx));
            }
        }
        let guard = if guards.is_empty() {
            "true".to_string()
        } else {
            guards.join(" && ")
        };
        self.statement(format!("if ({}) {{ {} }}", guard, child.statements.join(" ")));
        Ok(())
    }

    fn directive_ref(&mut self, dir: &TypeCheckableDirectiveMeta) -> anyhow::Result<String> {
        translate_expression(&dir.reference.to_expression(self.context_file), self.imports)
    }

    fn expression(&mut self, ast: &AST) -> anyhow::Result<String> {
        ast_to_typescript(ast, self)
    }

    /// The id of `variable`, declaring it in the current scope on first use.
    fn resolve_variable(&mut self, variable: &t::Variable) -> anyhow::Result<String> {
        if let Some(id) = self.find(|scope| scope.variables.get(&variable.id)) {
            return Ok(id);
        }
        let tmpl = self
            .bound
            .get_template_of_symbol(TemplateEntity::Variable(variable))
            .ok_or_else(|| anyhow!("no template declares variable {}", variable.name))?;
        let ctx = self
            .find(|scope| scope.template_ctx.get(&tmpl.id))
            .ok_or_else(|| anyhow!("variable {} is used outside of its template", variable.name))?;
        let id = self.allocate_id();
        self.statement(format!("var {} = {};", id, property_access(&ctx, &variable.value)));
        self.scope.variables.insert(variable.id, id.clone());
        Ok(id)
    }
}

impl Tcb<'_, '_> {
    /// The id of the element or directive instance `reference` points at.
    /// Template references have no instance and read as `any`.
    fn resolve_reference(&self, reference: &t::Reference) -> anyhow::Result<String> {
        let bound = self.bound;
        let target = bound
            .get_reference_target(reference)
            .ok_or_else(|| anyhow!("reference #{} has no target", reference.name))?;
        let id = match target {
            ReferenceTarget::Element(node) => self.find(|scope| scope.elements.get(node)),
            ReferenceTarget::Directive { directive, node } => {
                let key = (*node, directive.reference.decl);
                self.find(|scope| scope.directives.get(&key))
            }
            ReferenceTarget::Template(_) => Some("(null! as any)".to_string()),
        };
        id.ok_or_else(|| anyhow!("reference #{} is read before its target is declared", reference.name))
    }
}

impl ExpressionResolver for Tcb<'_, '_> {
    fn resolve(&mut self, ast: &AST) -> anyhow::Result<Option<String>> {
        if ast.is_implicit_receiver() {
            return Ok(Some("ctx".to_string()));
        }
        if !matches!(ast.kind, ASTKind::PropertyRead(_)) {
            return Ok(None);
        }
        match self.bound.get_expression_target(ast) {
            None => Ok(None),
            Some(TemplateEntity::Variable(variable)) => self.resolve_variable(variable).map(Some),
            Some(TemplateEntity::Reference(reference)) => self.resolve_reference(reference).map(Some),
        }
    }
}

fn object_key(name: &str) -> String {
    if is_valid_identifier(name) {
        name.to_string()
    } else {
        string_literal(name)
    }
}
