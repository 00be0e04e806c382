//! Outcome of a single external tool invocation.

/// Exit code and combined stdout/stderr of one external process.
///
/// A non-zero exit is an ordinary value here, not an error: the pipeline
/// decides what to do with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessResult {
    /// Process exit code, `-1` when the process could not be launched,
    /// was killed by a signal, or timed out.
    pub exit_code: i32,
    /// Standard output and standard error merged in arrival order.
    pub output: String,
}

impl ProcessResult {
    /// Exit code reported when no real exit status exists.
    pub const NO_EXIT_CODE: i32 = -1;

    pub fn new(exit_code: i32, output: impl Into<String>) -> Self {
        Self {
            exit_code,
            output: output.into(),
        }
    }

    /// Result for a process that never started.
    pub fn launch_failure(message: impl Into<String>) -> Self {
        Self::new(Self::NO_EXIT_CODE, message)
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}
