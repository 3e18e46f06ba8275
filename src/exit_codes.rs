//! Exit code constants for the mdxgen CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, invalid config)
//! - 2: Validation failure (required file missing, type check failed)
//! - 3: Generation failure (retries exhausted, fatal request, empty output)
//! - 4: Prompt unavailable (no cache and fetch failed)
//! - 5: I/O failure (output tree or state directory could not be written)

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments or invalid configuration.
pub const USER_ERROR: i32 = 1;

/// Validation failure: the generated tree did not satisfy its requirements.
pub const VALIDATION_FAILURE: i32 = 2;

/// Generation failure: the model produced nothing usable.
pub const GENERATION_FAILURE: i32 = 3;

/// The prompt document could not be obtained.
pub const PROMPT_UNAVAILABLE: i32 = 4;

/// Filesystem failure while materializing output or state.
pub const IO_FAILURE: i32 = 5;
