//! Internal settings for the crate.
//!
//! Initializes logging at startup when the `setup_tracing` feature is enabled.
//! Logging behavior is controlled by the `DEBUG_SPART_KD` environment variable.
//! If it is not set or set to a falsy value ("0", "false", or empty), logging
//! stays disabled. Otherwise, logging is enabled at the DEBUG level.

use ctor::ctor;
use tracing::Level;

#[ctor]
fn set_debug_level() {
    if std::env::var("DEBUG_SPART_KD").map_or(true, |v| v == "0" || v == "false" || v.is_empty())
    {
        // Falsy or unset: leave the default no-op subscriber in place.
    } else {
        tracing_subscriber::fmt().with_max_level(Level::DEBUG).init();
    }
}
