use log::LevelFilter;
use std::str::FromStr;

pub const ENGINE_NAME: &str = "raymarch-csg";

/// Environment variables that can be used to configure the engine
#[allow(non_snake_case)]
pub mod ENV {
    /// Set to `off`, `error`, `warn`, `info`, `debug` or `trace` to override the log level
    pub const LOG_LEVEL: &str = "RMCSG_LOG_LEVEL";
    /// Number of frames the demo binary renders before exiting
    pub const FRAME_COUNT: &str = "RMCSG_FRAME_COUNT";
}

/// Log level filter. Log messages with lower levels than this will not be displayed.
#[cfg(debug_assertions)]
pub const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Debug;
#[cfg(not(debug_assertions))]
pub const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Info;

/// Frames rendered by the demo binary when `ENV::FRAME_COUNT` isn't set
pub const DEFAULT_FRAME_COUNT: usize = 240;

/// Save state files start with these bytes. Change the last byte whenever a saved struct changes
/// its serialized shape so old files get rejected instead of misread.
pub const PRECURSOR_BYTES: [u8; 8] = *b"RMCSG\0\0\x01";
pub const PRECURSOR_BYTE_COUNT: usize = PRECURSOR_BYTES.len();

/// Reads `ENV::LOG_LEVEL`, falling back to `DEFAULT_LOG_LEVEL` if unset or unparsable.
pub fn log_level_from_env() -> LevelFilter {
    std::env::var(ENV::LOG_LEVEL)
        .ok()
        .and_then(|value| LevelFilter::from_str(value.trim()).ok())
        .unwrap_or(DEFAULT_LOG_LEVEL)
}

/// Reads `ENV::FRAME_COUNT`, falling back to `DEFAULT_FRAME_COUNT` if unset or unparsable.
pub fn frame_count_from_env() -> usize {
    std::env::var(ENV::FRAME_COUNT)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(DEFAULT_FRAME_COUNT)
}
