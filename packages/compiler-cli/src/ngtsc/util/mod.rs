pub mod src {
    pub mod path;
    pub mod visitor;
}

pub use src::path::*;
pub use src::visitor::*;
