//! Loader session: loads the config, drives the engine and renders results.
//!
//! A session owns the config for its whole lifetime and moves through
//! `Idle → Loading → ConfigLoaded → AuctionRequested → AuctionComplete`. A
//! failed fetch or parse ends in `Error`, which is terminal. Work after the
//! load runs from the engine command queue, so nothing reaches the engine
//! before [`Session::engine_ready`] is called.

use std::collections::HashSet;
use std::sync::Arc;

use error_stack::Report;
use serde_json::json;

use crate::ad_units::{build_ad_units, AdUnit};
use crate::debug::{DebugContent, DebugReporter, EntryKind};
use crate::engine::{Bid, BidRequest, BiddingEngine, Command, CommandQueue};
use crate::error::LoaderError;
use crate::fetch::{ConfigFetcher, HttpClient};
use crate::global_settings::map_global_settings;
use crate::page::Page;
use crate::prebid_config::Config;
use crate::settings::Settings;
use crate::templates::{PageTemplates, NO_BID_PLACEHOLDER};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Loading,
    ConfigLoaded,
    AuctionRequested,
    AuctionComplete,
    Error,
}

/// Styling of the status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Loading,
    Success,
    Error,
}

impl StatusKind {
    #[must_use]
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Loading => "status loading",
            Self::Success => "status success",
            Self::Error => "status error",
        }
    }
}

/// Page controls the session responds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    RefreshBids,
    ShowConfig,
}

fn bid_summary(bid: &Bid) -> serde_json::Value {
    let dimension = |value: Option<u32>| value.map_or_else(|| "-".to_string(), |v| v.to_string());
    json!({
        "bidder": bid.bidder,
        "cpm": format!("{:.4}", bid.cpm),
        "size": format!("{}x{}", dimension(bid.width), dimension(bid.height)),
        "timeToRespond": format!("{}ms", bid.time_to_respond),
        "statusMessage": bid.status_message,
    })
}

pub struct Session<E, P> {
    settings: Settings,
    state: SessionState,
    config: Option<Arc<Config>>,
    ad_units: Vec<AdUnit>,
    engine: E,
    page: P,
    queue: CommandQueue,
    templates: Arc<PageTemplates>,
    reporter: DebugReporter,
    wired: HashSet<Control>,
}

impl<E: BiddingEngine, P: Page> Session<E, P> {
    /// Create an idle session.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::Template`] if the page templates fail to compile.
    pub fn new(settings: Settings, engine: E, page: P) -> Result<Self, Report<LoaderError>> {
        let templates = Arc::new(PageTemplates::new()?);
        let reporter = DebugReporter::new(
            settings.page.debug_output.clone(),
            settings.loader.console_prefix.clone(),
            Arc::clone(&templates),
        );

        Ok(Self {
            settings,
            state: SessionState::Idle,
            config: None,
            ad_units: Vec::new(),
            engine,
            page,
            queue: CommandQueue::new(),
            templates,
            reporter,
            wired: HashSet::new(),
        })
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The loaded config, once the session is past `Loading`.
    #[must_use]
    pub fn config(&self) -> Option<&Config> {
        self.config.as_deref()
    }

    /// Ad units with a mount point on the page.
    #[must_use]
    pub fn ad_units(&self) -> &[AdUnit] {
        &self.ad_units
    }

    #[must_use]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    #[must_use]
    pub fn page(&self) -> &P {
        &self.page
    }

    #[must_use]
    pub fn reporter(&self) -> &DebugReporter {
        &self.reporter
    }

    #[must_use]
    pub fn into_page(self) -> P {
        self.page
    }

    fn transition(&mut self, next: SessionState) {
        log::debug!("Session state {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    fn update_status(&mut self, message: &str, kind: StatusKind) {
        self.page.set_text(&self.settings.page.status, message);
        self.page
            .set_class(&self.settings.page.status, kind.css_class());
    }

    fn debug(&mut self, content: impl Into<DebugContent>, kind: EntryKind) {
        self.reporter.log(&mut self.page, content, kind);
    }

    /// Fetch the config and queue initialisation.
    ///
    /// A session loads at most once; later calls are ignored.
    ///
    /// # Errors
    ///
    /// Returns the fetch or parse failure after moving the session to
    /// [`SessionState::Error`].
    pub async fn load<C: HttpClient>(
        &mut self,
        fetcher: &ConfigFetcher<C>,
    ) -> Result<(), Report<LoaderError>> {
        if self.state != SessionState::Idle {
            log::warn!("Ignoring load request in state {:?}", self.state);
            return Ok(());
        }

        self.transition(SessionState::Loading);
        self.update_status(
            &format!("Loading configuration from {}...", fetcher.config_url()),
            StatusKind::Loading,
        );

        match fetcher.fetch().await {
            Ok(config) => {
                self.on_config_loaded(config);
                Ok(())
            }
            Err(e) => {
                self.on_load_failed(&e);
                Err(e)
            }
        }
    }

    fn on_config_loaded(&mut self, config: Config) {
        self.transition(SessionState::ConfigLoaded);
        self.update_status("Configuration loaded successfully", StatusKind::Success);
        self.debug("Configuration loaded:", EntryKind::Info);
        self.debug(config.summary(), EntryKind::Info);

        self.config = Some(Arc::new(config));
        self.queue.push(Command::Initialize);
        self.drain();
    }

    fn on_load_failed(&mut self, error: &Report<LoaderError>) {
        let context = error.current_context();
        let message = context.to_string();
        if context.is_terminal_for_session() {
            self.transition(SessionState::Error);
        } else {
            self.transition(SessionState::Idle);
        }
        self.update_status(
            &format!("Error loading configuration: {message}"),
            StatusKind::Error,
        );
        self.debug(format!("Failed to load config: {message}"), EntryKind::NoBid);
        log::error!("Config load error: {:?}", error);
    }

    /// Signal that the engine can accept commands and run everything queued.
    pub fn engine_ready(&mut self) {
        self.queue.mark_ready();
        self.drain();
    }

    fn drain(&mut self) {
        while let Some(command) = self.queue.next_ready() {
            if self.state == SessionState::Error {
                log::debug!("Dropping {:?}: session failed", command);
                continue;
            }
            match command {
                Command::Initialize => self.initialize(),
                Command::RequestBids => self.request_bids(),
            }
        }
    }

    fn initialize(&mut self) {
        let Some(config) = self.config.clone() else {
            log::warn!("Initialize queued without a config");
            return;
        };

        let global_settings = map_global_settings(&config);
        self.debug("Applying Prebid config:", EntryKind::Info);
        self.debug(
            serde_json::to_value(&global_settings).unwrap_or_default(),
            EntryKind::Info,
        );
        self.engine.set_config(&global_settings);

        let all_ad_units = build_ad_units(&config);
        let total = all_ad_units.len();
        let page = &self.page;
        let mounted: Vec<AdUnit> = all_ad_units
            .into_iter()
            .filter(|unit| page.has_element(&unit.code))
            .collect();
        self.ad_units = mounted;

        self.debug(
            format!(
                "Built {} ad units, {} have matching DOM elements",
                total,
                self.ad_units.len()
            ),
            EntryKind::Info,
        );
        self.debug(
            serde_json::to_value(&self.ad_units).unwrap_or_default(),
            EntryKind::Info,
        );

        self.wire_controls();
        self.queue.push(Command::RequestBids);
    }

    fn wire_controls(&mut self) {
        let ids = &self.settings.page;

        if self.page.has_element(&ids.refresh_button) {
            self.page.set_disabled(&ids.refresh_button, false);
            self.wired.insert(Control::RefreshBids);
        }

        if self.page.has_element(&ids.show_config_button)
            && self.page.has_element(&ids.config_display)
            && self.page.has_element(&ids.config_json)
        {
            self.wired.insert(Control::ShowConfig);
        }
    }

    fn request_bids(&mut self) {
        self.update_status("Requesting bids...", StatusKind::Loading);
        self.reporter.clear(&mut self.page);
        self.debug(
            format!(
                "Starting bid request for {} ad units...",
                self.ad_units.len()
            ),
            EntryKind::Info,
        );

        let timeout_ms = self
            .config
            .as_ref()
            .and_then(|config| config.bidder_timeout_ms())
            .unwrap_or(self.settings.loader.fallback_timeout_ms);

        self.transition(SessionState::AuctionRequested);
        self.engine.request_bids(&BidRequest {
            ad_units: &self.ad_units,
            timeout_ms,
        });
        self.on_auction_complete();
    }

    fn on_auction_complete(&mut self) {
        self.reporter.clear(&mut self.page);
        self.debug("=== Auction Complete ===", EntryKind::Info);

        let responses = self.engine.bid_responses();
        if responses.is_empty() {
            self.debug("No bid responses received", EntryKind::NoBid);
        }

        for (code, unit) in &responses {
            self.debug(format!("\n--- {code} ---"), EntryKind::Info);

            if unit.bids.is_empty() {
                self.debug("  No bids", EntryKind::NoBid);
            } else {
                for bid in &unit.bids {
                    self.debug(bid_summary(bid), EntryKind::Info);
                }
            }

            self.render_ad(code);
        }

        let no_bids = self.engine.no_bids();
        if !no_bids.is_empty() {
            self.debug("\n=== No Bids ===", EntryKind::Info);
            for (code, bidders) in &no_bids {
                for no_bid in bidders {
                    self.debug(
                        format!("{}: {} - no bid", code, no_bid.bidder),
                        EntryKind::NoBid,
                    );
                }
            }
        }

        self.update_status("Auction complete - bids received", StatusKind::Success);
        self.transition(SessionState::AuctionComplete);
    }

    fn render_ad(&mut self, code: &str) {
        if !self.page.has_element(code) {
            return;
        }

        let Some(winner) = self.engine.highest_cpm_bids(code).into_iter().next() else {
            self.page.set_inner_html(code, NO_BID_PLACEHOLDER);
            self.debug(format!("No winning bid for {code}"), EntryKind::NoBid);
            return;
        };

        let width = winner
            .width
            .filter(|w| *w > 0)
            .unwrap_or(self.settings.render.default_width);
        let height = winner
            .height
            .filter(|h| *h > 0)
            .unwrap_or(self.settings.render.default_height);

        match self.templates.creative_frame(&winner.ad, width, height) {
            Ok(frame) => {
                self.page.set_inner_html(code, &frame);
                self.debug(
                    format!(
                        "Rendered ad for {}: {} @ ${:.2}",
                        code, winner.bidder, winner.cpm
                    ),
                    EntryKind::Winning,
                );
            }
            Err(e) => log::error!("Failed to render creative for {}: {:?}", code, e),
        }
    }

    /// Handle a click on a page control. Controls that were not wired during
    /// initialisation ignore clicks.
    pub fn click(&mut self, control: Control) {
        if !self.wired.contains(&control) {
            log::debug!("Ignoring click on unwired control {:?}", control);
            return;
        }

        match control {
            Control::RefreshBids => {
                self.queue.push(Command::RequestBids);
                self.drain();
            }
            Control::ShowConfig => self.toggle_config_display(),
        }
    }

    fn toggle_config_display(&mut self) {
        let Some(config) = self.config.clone() else {
            return;
        };
        let ids = &self.settings.page;

        let pretty = serde_json::to_string_pretty(config.document()).unwrap_or_default();
        self.page.set_text(&ids.config_json, &pretty);

        let next = if self.page.display(&ids.config_display).as_deref() == Some("none") {
            "block"
        } else {
            "none"
        };
        self.page.set_display(&ids.config_display, next);
    }
}
