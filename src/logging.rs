//! Tracing setup
//!
//! The engine logs under `txprop::engine` and the reference manager under
//! `txprop::manager`. Nothing is printed until a subscriber is installed.

use tracing_subscriber::{fmt, EnvFilter};

/// Install a global fmt subscriber filtered by `filter`
///
/// `RUST_LOG` takes precedence when set. `filter` uses the same directive
/// syntax, e.g. `"txprop::engine=debug"`.
///
/// Returns `false` if a global subscriber was already installed or the
/// filter does not parse.
pub fn init_tracing(filter: &str) -> bool {
    let env_filter = match EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(filter)) {
        Ok(env_filter) => env_filter,
        Err(_) => return false,
    };

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_thread_ids(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber).is_ok()
}
