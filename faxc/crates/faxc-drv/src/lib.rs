//! faxc-drv — the compiler driver.
//!
//! Thin orchestration layer: read the source from standard input, hand it
//! to [`faxc_par::compile`], print the resulting three-address listing, and
//! turn a [`CompileError`] into a diagnostic on stderr with a non-zero
//! exit. There is only one phase worth naming here — the front end does
//! lexing, parsing, and code generation in one pass — so the logging below
//! narrates that single pass rather than a multi-stage pipeline.

use std::io::Read;

use faxc_util::{CompileError, Result};

/// Driver configuration. There are no flags: the program always reads its
/// source from standard input.
#[derive(Debug, Clone, Default)]
pub struct Config;

impl Config {
    pub fn from_args<I: IntoIterator<Item = String>>(_args: I) -> Result<Self> {
        Ok(Config)
    }
}

fn read_stdin() -> Result<String> {
    log::debug!("reading stdin");
    let mut source = String::new();
    std::io::stdin()
        .read_to_string(&mut source)
        .map_err(CompileError::from)?;
    Ok(source)
}

/// Compiles `source` and returns the three-address listing.
///
/// This is the core entry point the CLI and the unit tests both drive; it
/// carries no trailing newline — that belongs only at the point of
/// printing to a terminal, not in the listing itself.
pub fn compile_source(source: &str) -> Result<String> {
    log::info!("compiling {} bytes", source.len());
    let listing = faxc_par::compile(source)?;
    log::debug!("emitted {} bytes of three-address code", listing.len());
    Ok(listing)
}

/// Reads standard input and compiles it.
pub fn run(_config: &Config) -> Result<String> {
    let source = read_stdin()?;
    compile_source(&source)
}

/// Binary entry point: read stdin, compile, and print.
pub fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let config = Config::from_args(std::env::args())?;
    let listing = run(&config)?;
    println!("{listing}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiles_a_simple_program() {
        let listing = compile_source("{ int i; i = 10; }").unwrap();
        assert_eq!(listing, "L1:\ti = 10\nL2:");
    }

    #[test]
    fn surfaces_a_compile_error() {
        let err = compile_source("{ i = 10; }").unwrap_err();
        assert!(matches!(err, CompileError::Fatal { message, .. } if message == "i undeclared"));
    }
}
