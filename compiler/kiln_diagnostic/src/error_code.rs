//! Error codes for backend diagnostics.
//!
//! Format: E#### where the first digit indicates the phase. The backend owns
//! the E5xxx range.

use std::fmt;

/// Error codes for backend diagnostics.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    /// Map key type cannot be hashed or compared by the runtime
    E5101,
}

impl ErrorCode {
    /// The code as written in messages (`E5101`).
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorCode::E5101 => "E5101",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
