//! CLI Exit Code Registry
//!
//! Single source of truth for `sgrid` exit codes. Scripts rely on them.
//!
//! | Code | Meaning                                              |
//! |------|------------------------------------------------------|
//! | 0    | Success                                              |
//! | 1    | General error (unspecified)                          |
//! | 2    | Usage error (bad args, unknown preset, bad settings) |
//! | 3    | I/O error reading a script, settings or catalog      |
//! | 4    | Parse error in a script, settings or catalog         |
//! | 5    | Replay finished but `--strict` saw a rejected op     |

use surveygrid_config::ConfigError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, unknown preset, invalid settings values.
pub const EXIT_USAGE: u8 = 2;

/// A script, settings file or form catalog could not be read.
pub const EXIT_IO: u8 = 3;

/// A script, settings file or form catalog is malformed.
pub const EXIT_PARSE: u8 = 4;

/// `--strict` and at least one operation was rejected by the grid.
pub const EXIT_REJECTED: u8 = 5;

/// Map a configuration error to its exit code.
pub fn config_exit_code(err: &ConfigError) -> u8 {
    match err {
        ConfigError::Io { .. } => EXIT_IO,
        ConfigError::Json(_) | ConfigError::Toml(_) => EXIT_PARSE,
        ConfigError::TomlEncode(_) => EXIT_ERROR,
        ConfigError::ZeroMinColumns { .. }
        | ConfigError::Schema { .. }
        | ConfigError::EmptyFieldKey { .. }
        | ConfigError::UnknownPreset(_) => EXIT_USAGE,
    }
}
