//! Constant Pool
//!
//! ConstantPool reuses literal arrays and maps when two or more identical
//! literals are requested, hoisting them into `const _cN = ...` statements.

use std::collections::HashMap;

use crate::output::output_ast as o;

const CONSTANT_PREFIX: &str = "_c";

/// A literal handed out by the pool. Once a second request for the same
/// literal arrives it is replaced by a shared variable.
#[derive(Debug, Clone)]
struct FixupExpression {
    resolved: o::Expression,
    shared: bool,
}

impl FixupExpression {
    fn new(expr: o::Expression) -> Self {
        FixupExpression {
            resolved: expr,
            shared: false,
        }
    }

    fn fixup(&mut self, expression: o::Expression) {
        self.resolved = expression;
        self.shared = true;
    }
}

#[derive(Debug, Default)]
pub struct ConstantPool {
    pub statements: Vec<o::Statement>,
    literals: HashMap<String, FixupExpression>,
    next_name_index: u32,
}

impl ConstantPool {
    pub fn new() -> Self {
        ConstantPool {
            statements: Vec::new(),
            literals: HashMap::new(),
            next_name_index: 0,
        }
    }

    /// Returns `literal`, or a reference to a shared constant holding it.
    ///
    /// Literals are shared on their second request, or immediately when
    /// `force_shared` is set. Primitive literals are never pooled.
    pub fn get_const_literal(&mut self, literal: o::Expression, force_shared: bool) -> o::Expression {
        if matches!(literal, o::Expression::Literal(_)) || !literal.is_constant() {
            return literal;
        }
        let key = format!("{:?}", literal);

        match self.literals.get(&key) {
            Some(existing) if existing.shared => existing.resolved.clone(),
            Some(_) => {
                let var = self.declare(literal);
                if let Some(fixup) = self.literals.get_mut(&key) {
                    fixup.fixup(var.clone());
                }
                var
            }
            None if force_shared => {
                let var = self.declare(literal.clone());
                let mut fixup = FixupExpression::new(literal);
                fixup.fixup(var.clone());
                self.literals.insert(key, fixup);
                var
            }
            None => {
                self.literals.insert(key, FixupExpression::new(literal.clone()));
                literal
            }
        }
    }

    fn declare(&mut self, literal: o::Expression) -> o::Expression {
        let name = self.fresh_name();
        self.statements.push(o::Statement::DeclareVar(o::DeclareVarStmt {
            name: name.clone(),
            value: Some(literal),
            type_: None,
            modifiers: vec![o::StmtModifier::Final],
        }));
        o::variable(name)
    }

    /// A unique name for a function or variable, e.g. `_c0`.
    pub fn fresh_name(&mut self) -> String {
        let name = format!("{}{}", CONSTANT_PREFIX, self.next_name_index);
        self.next_name_index += 1;
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs() -> o::Expression {
        o::literal_arr(vec![o::literal("id"), o::literal("main")])
    }

    #[test]
    fn should_share_literals_on_second_request() {
        let mut pool = ConstantPool::new();
        let first = pool.get_const_literal(attrs(), false);
        assert_eq!(first, attrs());
        assert!(pool.statements.is_empty());

        let second = pool.get_const_literal(attrs(), false);
        assert_eq!(second, o::variable("_c0"));
        assert_eq!(pool.statements.len(), 1);

        let third = pool.get_const_literal(attrs(), false);
        assert_eq!(third, o::variable("_c0"));
        assert_eq!(pool.statements.len(), 1);
    }

    #[test]
    fn should_share_immediately_when_forced() {
        let mut pool = ConstantPool::new();
        assert_eq!(pool.get_const_literal(attrs(), true), o::variable("_c0"));
        assert_eq!(pool.get_const_literal(o::literal("x"), true), o::literal("x"));
    }
}
