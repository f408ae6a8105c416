#![deny(clippy::all)]

/**
 * Wasaby Compiler CLI
 *
 * Command line driver for the template compiler
 */
pub use wasaby_compiler as compiler;

pub mod perform_compile;

/// CLI version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
