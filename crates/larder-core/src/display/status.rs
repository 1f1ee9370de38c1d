//! Confirmation messages for completed operations.

use std::fmt;

/// Confirmation line printed after a command changes state.
///
/// Failures are not rendered through this type; they surface as errors.
pub struct OperationStatus {
    pub message: String,
}

impl OperationStatus {
    /// Confirms a completed operation.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Success: {}", self.message)
    }
}
