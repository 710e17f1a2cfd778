// Compiler configuration
//
// Options read from the `angularCompilerOptions` and `compilerOptions`
// blocks of a tsconfig file.

pub mod compiler_options;

pub use compiler_options::NgCompilerOptions;
