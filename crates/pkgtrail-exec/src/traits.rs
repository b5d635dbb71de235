//! Command executor trait

use async_trait::async_trait;

use crate::error::ExecError;
use crate::result::CommandResult;

/// Runs a shell command line and captures its output.
///
/// A non-zero exit status is reported through [`CommandResult::status`],
/// not as an `Err`; only failing to start or wait for the process is an error.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn run(&self, cmd: &str) -> Result<CommandResult, ExecError>;

    fn executor_type(&self) -> &'static str;
}
