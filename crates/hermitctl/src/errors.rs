//! Exit codes for hermitctl

/// Scan succeeded, or a non-scan command completed
pub const EXIT_SUCCESS: i32 = 0;

/// Configuration or other fatal error
pub const EXIT_GENERAL_ERROR: i32 = 1;

/// Scan finished in error (capture or parse failure)
pub const EXIT_SCAN_FAILED: i32 = 2;

/// Operator cancelled before a result arrived
pub const EXIT_CANCELLED: i32 = 130;
