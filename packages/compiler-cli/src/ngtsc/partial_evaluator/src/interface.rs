// Interface
//
// Public entry point of the partial evaluator.

use ts::{Expression, FileId, Program};

use super::interpreter::StaticInterpreter;
use super::result::ResolvedValue;
use crate::ngtsc::imports::Reference;
use crate::ngtsc::reflection::{FunctionDefinition, ReflectionHost};

/// Expression a foreign function call evaluates to, and the file whose
/// scope it must be evaluated in.
#[derive(Debug, Clone)]
pub struct ForeignFunctionResult {
    pub expression: Expression,
    pub file: FileId,
}

/// Hook that lets callers give meaning to calls of functions the evaluator
/// cannot see into, such as `forwardRef(() => X)`.
pub trait ForeignFunctionResolver {
    fn resolve(
        &self,
        callee: &Reference,
        function: &FunctionDefinition,
        args: &[Expression],
        call_site: FileId,
    ) -> Option<ForeignFunctionResult>;
}

pub struct PartialEvaluator<'a> {
    host: &'a dyn ReflectionHost,
    program: &'a Program,
}

impl<'a> PartialEvaluator<'a> {
    pub fn new(host: &'a dyn ReflectionHost, program: &'a Program) -> Self {
        Self { host, program }
    }

    pub fn program(&self) -> &'a Program {
        self.program
    }

    /// Evaluates `expr`, written in `file`, as far as it can be known at
    /// compile time.
    pub fn evaluate(
        &self,
        expr: &Expression,
        file: FileId,
        foreign: Option<&dyn ForeignFunctionResolver>,
    ) -> ResolvedValue {
        StaticInterpreter::new(self.host, self.program, foreign).visit(expr, file)
    }
}
