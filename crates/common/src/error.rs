//! Error types for the loader.
//!
//! [`LoaderError`] is the context carried by `error_stack::Report`s returned from
//! fallible operations. The remaining types describe conditions that are
//! recovered locally and only ever logged.

use derive_more::{Display, Error};

/// Failures surfaced to the host.
#[derive(Debug, Display, Error)]
pub enum LoaderError {
    /// Network failure or non-success HTTP status while fetching the config.
    #[display("Failed to fetch configuration: {message}")]
    ConfigFetch { message: String },

    /// The config document is not valid JSON or does not match the expected shape.
    #[display("Failed to parse configuration: {message}")]
    ConfigParse { message: String },

    /// Loader settings could not be loaded or validated.
    #[display("Configuration error: {message}")]
    Configuration { message: String },

    /// The HTML page could not be parsed or rewritten.
    #[display("Page error: {message}")]
    Page { message: String },

    /// A page template failed to render.
    #[display("Template error: {message}")]
    Template { message: String },

    /// The bidding engine could not be set up.
    #[display("Engine error: {message}")]
    Engine { message: String },
}

impl LoaderError {
    /// Returns `true` for errors that put the session into its terminal error state.
    #[must_use]
    pub fn is_terminal_for_session(&self) -> bool {
        matches!(self, Self::ConfigFetch { .. } | Self::ConfigParse { .. })
    }
}

/// Why a `mediaTypesRef` did not resolve.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum MediaTypeError {
    /// The reference is not exactly `<type>.<preset>`.
    #[display("Invalid mediaTypesRef format: {reference}")]
    MalformedReference { reference: String },

    /// No preset is registered under the reference.
    #[display("MediaTypes preset not found: {reference}")]
    MissingPreset { reference: String },

    /// The preset exists but its type is neither `banner` nor `video`.
    #[display("Unsupported media type in reference: {reference}")]
    UnsupportedType { reference: String },
}

/// The config has no usable `adUnits` sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
#[display("No adUnits found in config")]
pub struct MissingAdUnits;
