//! Partial Evaluator
//!
//! Static evaluation of the expressions found in decorator arguments.

pub mod src {
    pub mod dynamic;
    pub mod interface;
    pub mod interpreter;
    pub mod result;
}

pub use src::dynamic::{DynamicReason, DynamicValue};
pub use src::interface::{ForeignFunctionResolver, ForeignFunctionResult, PartialEvaluator};
pub use src::result::ResolvedValue;

#[cfg(test)]
mod test;
