// Evaluation Context
//
// What every decorator handler needs to read a class: the program, the
// reflection host and static evaluation of decorator arguments.

use indexmap::IndexMap;
use ts::{reflect_object_literal, ClassDeclaration, Expression, FileId, Program, SourceFile};

use super::util::{unwrap_expression, ForwardRefResolver};
use crate::ngtsc::diagnostics::{fatal, ErrorCode, HandlerResult, SourceSpan};
use crate::ngtsc::partial_evaluator::{ForeignFunctionResolver, PartialEvaluator, ResolvedValue};
use crate::ngtsc::reflection::{Decorator, ReflectionHost};

#[derive(Clone, Copy)]
pub struct AnalysisContext<'a> {
    pub program: &'a Program,
    pub reflector: &'a dyn ReflectionHost,
    /// Compiling `@angular/core` itself.
    pub is_core: bool,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(program: &'a Program, reflector: &'a dyn ReflectionHost, is_core: bool) -> Self {
        Self {
            program,
            reflector,
            is_core,
        }
    }

    pub fn file(&self, class: &ClassDeclaration) -> &'a SourceFile {
        self.program.file(class.id.file)
    }

    pub fn span(&self, class: &ClassDeclaration, expr: &Expression) -> SourceSpan {
        SourceSpan::new(self.file(class).file_name.clone(), expr.range)
    }

    /// Evaluates `expr`, seeing through `forwardRef` calls.
    pub fn evaluate(&self, expr: &Expression, file: FileId) -> ResolvedValue {
        self.evaluate_with(expr, file, &ForwardRefResolver)
    }

    pub fn evaluate_with(&self, expr: &Expression, file: FileId, foreign: &dyn ForeignFunctionResolver) -> ResolvedValue {
        PartialEvaluator::new(self.reflector, self.program).evaluate(expr, file, Some(foreign))
    }
}

/// The properties of the object literal passed to a decorator.
pub fn decorator_object_literal(decorator: &Decorator, arg: &Expression) -> HandlerResult<IndexMap<String, Expression>> {
    match unwrap_expression(arg).as_object_literal() {
        Some(members) => Ok(reflect_object_literal(members)
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect()),
        None => fatal(
            ErrorCode::DecoratorArgNotLiteral,
            Some(decorator.span_of(arg.range)),
            format!("@{} argument must be literal.", decorator.name),
        ),
    }
}
