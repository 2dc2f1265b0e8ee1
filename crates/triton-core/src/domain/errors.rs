use std::fmt::{Display, Formatter};
use std::time::Duration;

pub type TritonResult<T> = Result<T, TritonError>;
pub type ParserResult<T> = TritonResult<T>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TritonErrorCategory {
    Validation,
    EmptyInputDirectory,
    Launch,
    Timeout,
    MalformedFilename,
    MalformedOutput,
    NumericParse,
    Driver,
    IoSystem,
    Internal,
}

impl TritonErrorCategory {
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Validation | Self::EmptyInputDirectory => 2,
            Self::Launch => 3,
            Self::Timeout => 4,
            Self::MalformedFilename | Self::MalformedOutput | Self::NumericParse => 5,
            Self::Driver => 6,
            Self::IoSystem => 7,
            Self::Internal => 8,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "ValidationError",
            Self::EmptyInputDirectory => "EmptyInputDirectoryError",
            Self::Launch => "LaunchError",
            Self::Timeout => "TimeoutError",
            Self::MalformedFilename => "MalformedFilenameError",
            Self::MalformedOutput => "MalformedOutputError",
            Self::NumericParse => "ParseError",
            Self::Driver => "DriverError",
            Self::IoSystem => "IoSystemError",
            Self::Internal => "InternalError",
        }
    }

    /// Errors raised before the batch starts; reported without detail.
    pub const fn is_validation(self) -> bool {
        matches!(self, Self::Validation | Self::EmptyInputDirectory)
    }

    /// Per-file parsing failures that a lenient batch may skip.
    pub const fn is_per_file(self) -> bool {
        matches!(
            self,
            Self::MalformedFilename | Self::MalformedOutput | Self::NumericParse
        )
    }
}

impl Display for TritonErrorCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{category} [{code}] {message}")]
pub struct TritonError {
    category: TritonErrorCategory,
    code: &'static str,
    message: String,
}

impl TritonError {
    pub fn new(
        category: TritonErrorCategory,
        code: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            code,
            message: message.into(),
        }
    }

    pub fn validation(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(TritonErrorCategory::Validation, code, message)
    }

    pub fn empty_input_directory(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(TritonErrorCategory::EmptyInputDirectory, code, message)
    }

    pub fn launch(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(TritonErrorCategory::Launch, code, message)
    }

    pub fn timeout(timeout: Duration) -> Self {
        Self::new(
            TritonErrorCategory::Timeout,
            "WAIT.TIMEOUT",
            format!("condition not met within {:.3}s", timeout.as_secs_f64()),
        )
    }

    pub fn malformed_filename(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(TritonErrorCategory::MalformedFilename, code, message)
    }

    pub fn malformed_output(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(TritonErrorCategory::MalformedOutput, code, message)
    }

    pub fn numeric_parse(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(TritonErrorCategory::NumericParse, code, message)
    }

    pub fn driver(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(TritonErrorCategory::Driver, code, message)
    }

    pub fn io_system(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(TritonErrorCategory::IoSystem, code, message)
    }

    pub fn internal(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(TritonErrorCategory::Internal, code, message)
    }

    pub const fn category(&self) -> TritonErrorCategory {
        self.category
    }

    pub const fn code(&self) -> &'static str {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn exit_code(&self) -> i32 {
        self.category.exit_code()
    }

    pub fn diagnostic_line(&self) -> String {
        format!("ERROR: [{}] {}", self.code, self.message)
    }
}
