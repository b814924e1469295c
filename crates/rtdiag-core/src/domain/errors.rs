use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RtDiagResult<T> = Result<T, RtDiagError>;
pub type ParserResult<T> = RtDiagResult<T>;
pub type NumericsResult<T> = RtDiagResult<T>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RtDiagErrorCategory {
    NotFound,
    Format,
    Dimension,
    InputType,
    IoSystem,
    Internal,
}

impl RtDiagErrorCategory {
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Format => 2,
            Self::NotFound => 3,
            Self::Dimension => 4,
            Self::InputType => 5,
            Self::IoSystem => 6,
            Self::Internal => 7,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "NotFoundError",
            Self::Format => "FormatError",
            Self::Dimension => "DimensionError",
            Self::InputType => "TypeError",
            Self::IoSystem => "IoSystemError",
            Self::Internal => "InternalError",
        }
    }
}

impl Display for RtDiagErrorCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtDiagError {
    category: RtDiagErrorCategory,
    placeholder: &'static str,
    message: String,
}

impl RtDiagError {
    pub fn new(
        category: RtDiagErrorCategory,
        placeholder: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            placeholder,
            message: message.into(),
        }
    }

    pub fn not_found(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(RtDiagErrorCategory::NotFound, placeholder, message)
    }

    pub fn format(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(RtDiagErrorCategory::Format, placeholder, message)
    }

    pub fn dimension(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(RtDiagErrorCategory::Dimension, placeholder, message)
    }

    pub fn input_type(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(RtDiagErrorCategory::InputType, placeholder, message)
    }

    pub fn io_system(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(RtDiagErrorCategory::IoSystem, placeholder, message)
    }

    pub fn internal(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(RtDiagErrorCategory::Internal, placeholder, message)
    }

    /// Maps a failed read onto `NotFound` when the file is absent and
    /// `IoSystem` otherwise.
    pub fn from_read_failure(
        not_found_placeholder: &'static str,
        io_placeholder: &'static str,
        path: &std::path::Path,
        source: &std::io::Error,
    ) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::not_found(
                not_found_placeholder,
                format!("unable to find '{}'", path.display()),
            )
        } else {
            Self::io_system(
                io_placeholder,
                format!("failed to read '{}': {}", path.display(), source),
            )
        }
    }

    pub const fn category(&self) -> RtDiagErrorCategory {
        self.category
    }

    pub const fn placeholder(&self) -> &'static str {
        self.placeholder
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn exit_code(&self) -> i32 {
        self.category.exit_code()
    }

    pub fn diagnostic_line(&self) -> String {
        format!("ERROR: [{}] {}", self.placeholder, self.message)
    }

    pub fn fatal_exit_line(&self) -> String {
        format!("FATAL EXIT CODE: {}", self.exit_code())
    }
}

impl Display for RtDiagError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {}",
            self.category.as_str(),
            self.placeholder,
            self.message
        )
    }
}

impl Error for RtDiagError {}

#[cfg(test)]
mod tests {
    use super::{RtDiagError, RtDiagErrorCategory};
    use std::io;
    use std::path::Path;

    #[test]
    fn exit_mapping_is_stable() {
        let cases = [
            (RtDiagErrorCategory::Format, 2, "FormatError"),
            (RtDiagErrorCategory::NotFound, 3, "NotFoundError"),
            (RtDiagErrorCategory::Dimension, 4, "DimensionError"),
            (RtDiagErrorCategory::InputType, 5, "TypeError"),
            (RtDiagErrorCategory::IoSystem, 6, "IoSystemError"),
            (RtDiagErrorCategory::Internal, 7, "InternalError"),
        ];

        for (category, exit_code, name) in cases {
            assert_eq!(category.exit_code(), exit_code);
            assert_eq!(category.as_str(), name);
        }
    }

    #[test]
    fn fatal_error_renders_diagnostic_lines() {
        let error =
            RtDiagError::format("FORMAT.SPEC_ROW_LENGTH", "row 3 has 2 columns, expected 4");

        assert_eq!(error.exit_code(), 2);
        assert_eq!(
            error.diagnostic_line(),
            "ERROR: [FORMAT.SPEC_ROW_LENGTH] row 3 has 2 columns, expected 4"
        );
        assert_eq!(error.fatal_exit_line(), "FATAL EXIT CODE: 2");
        assert_eq!(
            error.to_string(),
            "FormatError [FORMAT.SPEC_ROW_LENGTH] row 3 has 2 columns, expected 4"
        );
    }

    #[test]
    fn read_failures_split_absence_from_other_io_errors() {
        let path = Path::new("missing.spec");
        let absent = io::Error::new(io::ErrorKind::NotFound, "gone");
        let denied = io::Error::new(io::ErrorKind::PermissionDenied, "denied");

        let error = RtDiagError::from_read_failure("NOTFOUND.X", "IO.X", path, &absent);
        assert_eq!(error.category(), RtDiagErrorCategory::NotFound);
        assert_eq!(error.placeholder(), "NOTFOUND.X");

        let error = RtDiagError::from_read_failure("NOTFOUND.X", "IO.X", path, &denied);
        assert_eq!(error.category(), RtDiagErrorCategory::IoSystem);
        assert_eq!(error.placeholder(), "IO.X");
    }
}
