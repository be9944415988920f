//! Diagnostics go to stderr through `env_logger`; stdout carries only the
//! operator lines.

use env_logger::Env;

/// Honour RUST_LOG, falling back to `info` (or `debug` when verbose).
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .try_init();
}
