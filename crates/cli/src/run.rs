//! Full loader session against a static page and recorded bids.

use std::fs;
use std::path::{Path, PathBuf};

use prebid_loader_common::engine::ReplayEngine;
use prebid_loader_common::fetch::ConfigFetcher;
use prebid_loader_common::page::HtmlPage;
use prebid_loader_common::session::{Control, Session, SessionState};
use prebid_loader_common::settings::Settings;
use url::Url;

use crate::error::CliError;
use crate::http::UreqClient;

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub page: PathBuf,
    pub base_url: String,
    pub bids: PathBuf,
    pub output: Option<PathBuf>,
    pub settings: Option<PathBuf>,
    pub config_url: Option<String>,
    pub refresh: bool,
    pub show_config: bool,
}

/// Embedded settings, or the given TOML file, merged with the environment.
///
/// # Errors
///
/// Returns [`CliError::Config`] if the settings are invalid.
pub fn load_settings(file: Option<&Path>) -> Result<Settings, CliError> {
    let settings = match file {
        Some(path) => Settings::from_toml(&fs::read_to_string(path)?)?,
        None => Settings::new()?,
    };
    Ok(settings)
}

/// Result of a rendered session.
#[derive(Debug)]
pub struct RenderedPage {
    pub html: String,
    pub state: SessionState,
}

/// Run a session and render the resulting page.
///
/// A failed config load is not an error here: the page shows it, and the
/// returned state is [`SessionState::Error`].
///
/// # Errors
///
/// Returns an error if an input cannot be read or the page cannot be rendered.
pub fn render_page(options: &RunOptions, mut settings: Settings) -> Result<RenderedPage, CliError> {
    if let Some(config_url) = &options.config_url {
        settings.loader.config_url.clone_from(config_url);
    }

    let base_url = Url::parse(&options.base_url)
        .map_err(|e| CliError::Input(format!("Invalid base URL {}: {}", options.base_url, e)))?;
    let page = HtmlPage::parse(fs::read_to_string(&options.page)?)?;
    let engine = ReplayEngine::from_json(&fs::read_to_string(&options.bids)?)?;

    let fetcher = ConfigFetcher::new(
        UreqClient::new(settings.loader.failsafe_timeout_ms),
        base_url,
        settings.loader.config_url.clone(),
    );

    let mut session = Session::new(settings, engine, page)?;
    session.engine_ready();

    if let Err(e) = futures::executor::block_on(session.load(&fetcher)) {
        log::error!("Session failed: {}", e.current_context());
    }

    if options.refresh {
        session.click(Control::RefreshBids);
    }
    if options.show_config {
        session.click(Control::ShowConfig);
    }

    let state = session.state();
    let html = session.into_page().render()?;
    Ok(RenderedPage { html, state })
}

/// Run a session and write the page to `options.output`, or stdout.
///
/// # Errors
///
/// Returns an error if rendering fails or the config could not be loaded.
pub fn run(options: &RunOptions, verbose: bool) -> Result<(), CliError> {
    let settings = load_settings(options.settings.as_deref())?;
    if verbose {
        log::info!(
            "Rendering {} with config {}",
            options.page.display(),
            options.config_url.as_deref().unwrap_or(&settings.loader.config_url)
        );
    }

    let rendered = render_page(options, settings)?;

    match &options.output {
        Some(path) => {
            fs::write(path, &rendered.html)?;
            log::info!("Rendered page written to: {}", path.display());
        }
        None => println!("{}", rendered.html),
    }

    if rendered.state == SessionState::Error {
        return Err(CliError::Config(
            "Configuration could not be loaded; see the page status".to_string(),
        ));
    }
    Ok(())
}
