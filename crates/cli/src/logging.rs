//! Logger setup.

use log::LevelFilter;

use crate::error::CliError;

#[must_use]
pub fn level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Install a `fern` dispatcher writing timestamped records to stderr.
///
/// # Errors
///
/// Returns [`CliError::Config`] if a logger is already installed.
pub fn init_logger(verbose: bool) -> Result<(), CliError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}  {} {}",
                chrono::Local::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
                record.level(),
                message
            ))
        })
        .level(level(verbose))
        .level_for("ureq", LevelFilter::Warn)
        .level_for("rustls", LevelFilter::Warn)
        .chain(std::io::stderr())
        .apply()
        .map_err(|e| CliError::Config(format!("Failed to initialize logger: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level() {
        assert_eq!(level(true), LevelFilter::Debug);
        assert_eq!(level(false), LevelFilter::Info);
    }
}
