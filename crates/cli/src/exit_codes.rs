//! CLI Exit Code Registry
//!
//! Single source of truth for `brdiff` exit codes. Scripts rely on them.
//!
//! | Code | Meaning                                             |
//! |------|-----------------------------------------------------|
//! | 0    | Success; for `compare`, the reports match           |
//! | 1    | `compare` found differences                         |
//! | 2    | Usage error (bad arguments, unknown output type)    |
//! | 3    | Input could not be read                             |
//! | 4    | Input is not a recognizable billing report          |
//! | 5    | Settings file missing, malformed or invalid         |
//! | 6    | Output could not be written                         |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant with the next free number
//! 2. Document what triggers it
//! 3. Update the table above

/// Command completed; no differences.
pub const EXIT_SUCCESS: u8 = 0;

/// Reports differ. Like `diff(1)`, exit 1 means "files differ."
pub const EXIT_DIFFS: u8 = 1;

/// Bad arguments.
pub const EXIT_USAGE: u8 = 2;

/// Input file missing, unreadable, or of an unknown type.
pub const EXIT_INPUT: u8 = 3;

/// No data rows, or no row classifies as part of a billing report.
pub const EXIT_UNRECOGNIZED: u8 = 4;

pub const EXIT_CONFIG: u8 = 5;

/// Output file or stdout could not be written.
pub const EXIT_OUTPUT: u8 = 6;
