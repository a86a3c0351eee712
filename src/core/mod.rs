pub mod engine;
pub mod error;
pub mod template;
pub mod types;

pub use engine::{execute, Engine};
pub use error::{AppError, DefaultErrorReporter, ErrorReporter};
pub use types::{ErrorCategory, ErrorSeverity, LogLevel, OutputTarget};
