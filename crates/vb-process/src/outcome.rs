/// Exit code and captured output of a single command execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    exit_code: i32,
    stdout: String,
    stderr: String,
}

impl CommandOutcome {
    pub fn new(exit_code: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    /// Successful outcome with the given standard output.
    pub fn success(stdout: impl Into<String>) -> Self {
        Self::new(0, stdout, "")
    }

    /// Failed outcome with exit code 1 and no output.
    pub fn failure() -> Self {
        Self::new(1, "", "")
    }

    /// True when the command exited with status zero.
    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }

    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }

    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    pub fn stderr(&self) -> &str {
        &self.stderr
    }

    /// Non-empty lines of standard output without their line terminators.
    pub fn output_lines(&self) -> impl Iterator<Item = &str> {
        self.stdout.lines().filter(|line| !line.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_depends_only_on_exit_code() {
        assert!(CommandOutcome::new(0, "", "warning: something").succeeded());
        assert!(!CommandOutcome::new(1, "output", "").succeeded());
        assert!(!CommandOutcome::new(-1, "", "").succeeded());
    }

    #[test]
    fn output_lines_drop_terminators_and_blank_lines() {
        let outcome = CommandOutcome::success("first\r\n\nsecond\n   \nthird");
        let lines: Vec<_> = outcome.output_lines().collect();
        assert_eq!(lines, vec!["first", "second", "third"]);
    }

    #[test]
    fn accessors_return_captured_values() {
        let outcome = CommandOutcome::new(128, "out", "err");
        assert_eq!(outcome.exit_code(), 128);
        assert_eq!(outcome.stdout(), "out");
        assert_eq!(outcome.stderr(), "err");
    }
}
