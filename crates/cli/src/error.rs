//! CLI error types.

use std::fmt;

use error_stack::Report;
use prebid_loader_common::error::LoaderError;

#[derive(Debug)]
pub enum CliError {
    /// Settings or config document error
    Config(String),
    /// Page or bid fixture error
    Input(String),
    /// IO error
    Io(std::io::Error),
    /// HTTP request error
    Http(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Input(msg) => write!(f, "Input error: {}", msg),
            CliError::Io(err) => write!(f, "IO error: {}", err),
            CliError::Http(msg) => write!(f, "HTTP error: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io(err)
    }
}

impl From<Report<LoaderError>> for CliError {
    fn from(report: Report<LoaderError>) -> Self {
        let message = format!("{:?}", report);
        match report.current_context() {
            LoaderError::ConfigFetch { .. } => CliError::Http(message),
            LoaderError::ConfigParse { .. } | LoaderError::Configuration { .. } => {
                CliError::Config(message)
            }
            LoaderError::Page { .. }
            | LoaderError::Template { .. }
            | LoaderError::Engine { .. } => CliError::Input(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_cli_error_display() {
        assert_eq!(
            format!("{}", CliError::Config("test".into())),
            "Configuration error: test"
        );
        assert_eq!(
            format!("{}", CliError::Input("test".into())),
            "Input error: test"
        );
        assert_eq!(
            format!("{}", CliError::Http("test".into())),
            "HTTP error: test"
        );
    }

    #[test]
    fn test_cli_error_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let cli_err: CliError = io_err.into();
        assert!(matches!(cli_err, CliError::Io(_)));
        assert!(cli_err.source().is_some());
    }

    #[test]
    fn test_cli_error_from_report() {
        let fetch: CliError = Report::new(LoaderError::ConfigFetch {
            message: "HTTP error! status: 404".into(),
        })
        .into();
        assert!(matches!(fetch, CliError::Http(msg) if msg.contains("status: 404")));

        let parse: CliError = Report::new(LoaderError::ConfigParse {
            message: "bad".into(),
        })
        .into();
        assert!(matches!(parse, CliError::Config(_)));

        let engine: CliError = Report::new(LoaderError::Engine {
            message: "Invalid bid fixture".into(),
        })
        .into();
        assert!(matches!(engine, CliError::Input(_)));
        assert!(engine.source().is_none());
    }
}
