//! Engine that replays recorded auction results.
//!
//! The fixture document has the engine's own response shapes:
//!
//! ```json
//! {
//!   "bidResponses": {"top": {"bids": [{"bidder": "appnexus", "cpm": 1.5, "ad": "<div/>"}]}},
//!   "noBids": {"side": [{"bidder": "rubicon"}]}
//! }
//! ```
//!
//! Each auction only reports results for the ad units it was asked about.

use error_stack::{Report, ResultExt};
use serde::Deserialize;

use crate::error::LoaderError;
use crate::global_settings::GlobalSettings;

use super::{Bid, BidRequest, BidResponses, BiddingEngine, NoBids};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Fixture {
    #[serde(default)]
    bid_responses: BidResponses,
    #[serde(default)]
    no_bids: NoBids,
}

/// One call to [`BiddingEngine::request_bids`] as seen by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub ad_unit_codes: Vec<String>,
    pub timeout_ms: u64,
}

#[derive(Debug, Default)]
pub struct ReplayEngine {
    fixture: Fixture,
    settings: Option<GlobalSettings>,
    requests: Vec<RecordedRequest>,
}

impl ReplayEngine {
    /// Load a fixture document.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::Engine`] if the fixture is not valid JSON or has
    /// the wrong shape.
    pub fn from_json(json: &str) -> Result<Self, Report<LoaderError>> {
        let mut fixture: Fixture =
            serde_json::from_str(json).change_context(LoaderError::Engine {
                message: "Invalid bid fixture".to_string(),
            })?;

        for (code, unit) in &mut fixture.bid_responses {
            for bid in &mut unit.bids {
                if bid.ad_unit_code.is_empty() {
                    bid.ad_unit_code.clone_from(code);
                }
            }
        }
        for (code, no_bids) in &mut fixture.no_bids {
            for no_bid in no_bids {
                if no_bid.ad_unit_code.is_empty() {
                    no_bid.ad_unit_code.clone_from(code);
                }
            }
        }

        Ok(Self {
            fixture,
            ..Self::default()
        })
    }

    /// Settings from the last `set_config` call.
    #[must_use]
    pub fn applied_settings(&self) -> Option<&GlobalSettings> {
        self.settings.as_ref()
    }

    /// Every auction requested so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> &[RecordedRequest] {
        &self.requests
    }

    fn was_requested(&self, code: &str) -> bool {
        self.requests
            .last()
            .is_some_and(|request| request.ad_unit_codes.iter().any(|c| c == code))
    }
}

impl BiddingEngine for ReplayEngine {
    fn set_config(&mut self, settings: &GlobalSettings) {
        log::debug!("Replay engine received settings: {:?}", settings);
        self.settings = Some(settings.clone());
    }

    fn request_bids(&mut self, request: &BidRequest<'_>) {
        let ad_unit_codes = request
            .ad_units
            .iter()
            .map(|unit| unit.code.clone())
            .collect();
        self.requests.push(RecordedRequest {
            ad_unit_codes,
            timeout_ms: request.timeout_ms,
        });
    }

    fn bid_responses(&self) -> BidResponses {
        self.fixture
            .bid_responses
            .iter()
            .filter(|(code, _)| self.was_requested(code))
            .map(|(code, bids)| (code.clone(), bids.clone()))
            .collect()
    }

    fn no_bids(&self) -> NoBids {
        self.fixture
            .no_bids
            .iter()
            .filter(|(code, _)| self.was_requested(code))
            .map(|(code, no_bids)| (code.clone(), no_bids.clone()))
            .collect()
    }

    fn highest_cpm_bids(&self, ad_unit_code: &str) -> Vec<Bid> {
        if !self.was_requested(ad_unit_code) {
            return Vec::new();
        }
        let mut bids = self
            .fixture
            .bid_responses
            .get(ad_unit_code)
            .map(|unit| unit.bids.clone())
            .unwrap_or_default();
        bids.sort_by(|a, b| b.cpm.total_cmp(&a.cpm));
        bids
    }
}
