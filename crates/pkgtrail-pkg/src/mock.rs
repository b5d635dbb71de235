//! Canned-output executor for collector tests

use std::collections::HashMap;

use async_trait::async_trait;
use pkgtrail_exec::{CommandExecutor, CommandResult, ExecError};

/// Answers known command lines with fixed results; anything else behaves like
/// a missing tool
#[derive(Debug, Default)]
pub(crate) struct MockExecutor {
    responses: HashMap<String, CommandResult>,
}

impl MockExecutor {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with(mut self, cmd: &str, status: i32, stdout: &str) -> Self {
        self.responses
            .insert(cmd.to_string(), CommandResult::new(status, stdout));
        self
    }
}

#[async_trait]
impl CommandExecutor for MockExecutor {
    async fn run(&self, cmd: &str) -> Result<CommandResult, ExecError> {
        Ok(self.responses.get(cmd).cloned().unwrap_or_else(|| {
            let tool = cmd.split_whitespace().next().unwrap_or_default();
            CommandResult::new(127, "").with_stderr(format!("sh: 1: {tool}: not found"))
        }))
    }

    fn executor_type(&self) -> &'static str {
        "mock"
    }
}
