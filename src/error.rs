//! Fatal, run-ending errors.
//!
//! Per-file ingest problems are *not* represented here: they are recovered
//! locally as [`crate::io::SkipReason`]s. An `AppError` always ends the run and
//! carries the process exit code `main` should return.

/// Exit code for invalid input or configuration.
pub const EXIT_INPUT: u8 = 2;
/// Exit code for failures while writing exports or rendering the chart.
pub const EXIT_OUTPUT: u8 = 4;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    /// Invalid input or configuration (exit code 2).
    pub fn input(message: impl Into<String>) -> Self {
        Self::new(EXIT_INPUT, message)
    }

    /// Export or rendering failure (exit code 4).
    pub fn output(message: impl Into<String>) -> Self {
        Self::new(EXIT_OUTPUT, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_assign_exit_codes() {
        assert_eq!(AppError::input("bad").exit_code(), EXIT_INPUT);
        assert_eq!(AppError::output("disk full").exit_code(), EXIT_OUTPUT);
        assert_eq!(AppError::output("disk full").to_string(), "disk full");
    }
}
