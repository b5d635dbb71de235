//! pkgtrail-exec: Command execution abstraction
//!
//! Provides the executor trait used by the collectors and a local
//! implementation that shells out through `sh -c`.

pub mod error;
pub mod local;
pub mod result;
pub mod traits;

pub use error::ExecError;
pub use local::LocalExecutor;
pub use result::CommandResult;
pub use traits::CommandExecutor;
