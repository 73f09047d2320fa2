//! Console logging using env_logger
//!
//! Defaults to `info`; `RUST_LOG` overrides the filter, e.g.
//! `RUST_LOG=soten=debug,soten_mirror=debug`.

use env_logger::Env;

/// Initialize logging; a second call keeps the first logger
pub fn init() {
    let result = env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init();

    if let Err(e) = result {
        log::debug!("Logger already initialized: {}", e);
    }
}
