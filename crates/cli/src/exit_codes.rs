//! CLI Exit Code Registry
//!
//! Single source of truth for `tally` exit codes. Scripts and schedulers
//! branch on them, so a code never changes meaning once released.
//!
//! | Code | Meaning                                                   |
//! |------|-----------------------------------------------------------|
//! | 0    | Success (a clean recon run, report, daily action)         |
//! | 1    | Recon run completed and found discrepancies               |
//! | 2    | Usage error (bad arguments, missing input file)           |
//! | 3    | Invalid input (duplicate key, non-integer key, bad range) |
//! | 4    | Invalid config (TOML parse or validation failure)         |
//! | 5    | Runtime error (I/O, malformed source file)                |
//! | 6    | Result store error (SQLite)                               |

use tally_recon::ReconError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// Recon finished and reported at least one discrepancy.
/// Like `diff(1)`, exit 1 means "sources differ."
pub const EXIT_DISCREPANCIES: u8 = 1;

/// Usage error - bad arguments, missing required file.
/// Matches clap's own exit code for argument errors.
pub const EXIT_USAGE: u8 = 2;

/// Duplicate key, non-integer key, or inverted key range.
pub const EXIT_INVALID_INPUT: u8 = 3;

/// Config could not be parsed or failed validation.
pub const EXIT_INVALID_CONFIG: u8 = 4;

/// I/O failure or malformed delimited file.
pub const EXIT_RUNTIME: u8 = 5;

/// Result store could not be opened, read, or written.
pub const EXIT_STORE: u8 = 6;

/// Map an engine error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        e if e.is_invalid_input() => EXIT_INVALID_INPUT,
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_INVALID_CONFIG,
        _ => EXIT_RUNTIME,
    }
}
