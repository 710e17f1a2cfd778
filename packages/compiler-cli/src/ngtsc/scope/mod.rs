//! Selector scopes
//!
//! Which directives and pipes are visible to the template of each component,
//! as determined by the NgModules of the program and its dependencies.

pub mod src;

pub use src::*;

#[cfg(test)]
mod test;
