use std::path::{Path, PathBuf};
use thiserror::Error;

pub type DatatoolResult<T> = Result<T, DatatoolError>;

/// Exit code for failures that are not I/O or syntax related.
pub const EXIT_OTHER: i32 = 1;
/// Exit code for malformed arguments, settings or unsupported formats.
pub const EXIT_SYNTAX: i32 = 2;
/// Exit code for file, workbook and export failures.
pub const EXIT_IO: i32 = 3;

#[derive(Error, Debug)]
pub enum DatatoolError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Settings error: {0}")]
    Settings(#[from] serde_yaml::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Unable to import data from '{}': {message}", path.display())]
    Import {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("No such sheet: {0}")]
    SheetNotFound(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Syntax error: {0}")]
    Syntax(String),

    #[error("Edit error: {0}")]
    Edit(String),

    #[error("Operation cancelled by user")]
    Cancelled,
}

impl DatatoolError {
    /// Wrap a library or I/O failure as an import failure for `path`.
    pub fn import<E>(path: &Path, cause: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Import {
            path: path.to_path_buf(),
            message: cause.to_string(),
            source: Some(Box::new(cause)),
        }
    }

    /// Wrap any error raised inside an importer so that the caller sees a
    /// single import failure naming the source file. File-not-found,
    /// sheet-resolution, cancellation and already-wrapped errors pass through.
    pub fn into_import(self, path: &Path) -> Self {
        match self {
            err @ (Self::FileNotFound(_)
            | Self::Import { .. }
            | Self::SheetNotFound(_)
            | Self::Cancelled) => err,
            other => Self::Import {
                path: path.to_path_buf(),
                message: other.to_string(),
                source: Some(Box::new(other)),
            },
        }
    }

    /// Process exit code used in batch mode.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Settings(_) | Self::Syntax(_) | Self::UnsupportedFormat(_) => EXIT_SYNTAX,
            Self::Io(_)
            | Self::Csv(_)
            | Self::FileNotFound(_)
            | Self::Import { .. }
            | Self::SheetNotFound(_)
            | Self::Export(_) => EXIT_IO,
            Self::Edit(_) | Self::Cancelled => EXIT_OTHER,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_import_wraps_cause_and_names_file() {
        let cause = std::io::Error::new(std::io::ErrorKind::InvalidData, "bad zip header");
        let err = DatatoolError::import(Path::new("data.xlsx"), cause);

        let msg = err.to_string();
        assert!(msg.contains("data.xlsx"));
        assert!(msg.contains("bad zip header"));
        assert!(err.source().is_some());
        assert_eq!(err.exit_code(), EXIT_IO);
    }

    #[test]
    fn test_into_import_passes_through_distinct_kinds() {
        let path = Path::new("data.xlsx");

        let err = DatatoolError::SheetNotFound("Totals".into()).into_import(path);
        assert!(matches!(err, DatatoolError::SheetNotFound(_)));

        let err = DatatoolError::Cancelled.into_import(path);
        assert!(err.is_cancelled());

        let err = DatatoolError::Syntax("bad".into()).into_import(path);
        assert!(matches!(err, DatatoolError::Import { .. }));
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(DatatoolError::Syntax("x".into()).exit_code(), EXIT_SYNTAX);
        assert_eq!(
            DatatoolError::UnsupportedFormat("x".into()).exit_code(),
            EXIT_SYNTAX
        );
        assert_eq!(
            DatatoolError::FileNotFound(PathBuf::from("x")).exit_code(),
            EXIT_IO
        );
        assert_eq!(DatatoolError::Cancelled.exit_code(), EXIT_OTHER);
    }
}
