//! Core of the Prebid loader.
//!
//! Loads a JSON configuration document, maps it onto the settings and ad units
//! a header-bidding engine understands, runs auctions through that engine and
//! renders winning creatives and debug output into a page.
//!
//! # Modules
//!
//! - [`ad_units`]: Config ad unit declarations to engine ad units
//! - [`debug`]: Debug panel and console reporting
//! - [`engine`]: Bidding engine interface, command queue and replay engine
//! - [`error`]: Error types
//! - [`fetch`]: Cache-busted config retrieval
//! - [`global_settings`]: Config sections to engine global settings
//! - [`media_types`]: `mediaTypesRef` preset resolution
//! - [`page`]: Page interface and the static HTML implementation
//! - [`prebid_config`]: The configuration document
//! - [`session`]: The loader session state machine
//! - [`settings`]: Loader settings from TOML and the environment
//! - [`templates`]: Handlebars markup for creatives and debug entries
//! - [`test_support`]: Fixtures and fakes for tests

pub mod ad_units;
pub mod debug;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod global_settings;
pub mod media_types;
pub mod page;
pub mod prebid_config;
pub mod session;
pub mod settings;
pub mod templates;
