//! Resource loading for component templates and styles.

pub mod src {
    pub mod loader;
}

pub use src::loader::*;
