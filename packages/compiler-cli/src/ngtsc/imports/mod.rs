pub mod src {
    pub mod core;
    pub mod references;
}

pub use src::core::{
    get_r3_symbols_file, is_angular_core_package, validate_and_rewrite_core_symbol, ImportRewriter,
    NoopImportRewriter, R3SymbolsImportRewriter, CORE_MODULE,
};
pub use src::references::{Reference, ReferenceKind};

#[cfg(test)]
mod test;
