pub mod src {
    pub mod host;
    pub mod typescript;
}

pub use src::host::*;
pub use src::typescript::{type_to_value, TypeScriptReflectionHost};
