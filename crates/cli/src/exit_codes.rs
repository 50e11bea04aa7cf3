//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract: scheduled jobs rely on them.
//!
//! | Code | Meaning                                               |
//! |------|-------------------------------------------------------|
//! | 0    | Success                                               |
//! | 1    | General error (unspecified)                           |
//! | 2    | CLI usage error (bad args)                            |
//! | 3    | Config cannot be read, parsed or validated            |
//! | 4    | A source file is missing                              |
//! | 5    | A source file could not be read or lacks a column     |
//! | 6    | Report export failed                                  |
//! | 7    | Updates found (only with `--fail-on-updates`)         |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into `recon_exit_code` or the command's error handling

use taxsync_recon::ReconError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// Config file unreadable, malformed TOML, or failed validation.
pub const EXIT_INVALID_CONFIG: u8 = 3;

/// One of the APEX / COMMAND / EDITS files does not exist.
pub const EXIT_SOURCE_UNAVAILABLE: u8 = 4;

/// A source file exists but cannot be read as a table, or a required column is missing.
pub const EXIT_SOURCE_READ: u8 = 5;

/// Excel or CSV report could not be written.
pub const EXIT_WRITE: u8 = 6;

/// Run succeeded and at least one jurisdiction requires an update.
/// Only returned when `--fail-on-updates` is set.
pub const EXIT_UPDATES_FOUND: u8 = 7;

/// Map a ReconError to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_INVALID_CONFIG,
        ReconError::SourceUnavailable { .. } => EXIT_SOURCE_UNAVAILABLE,
        ReconError::MissingColumn { .. } | ReconError::Read { .. } => EXIT_SOURCE_READ,
        ReconError::Write(_) => EXIT_WRITE,
    }
}
