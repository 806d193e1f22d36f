//! Interface to the external header-bidding engine.
//!
//! The loader never runs an auction itself. It configures the engine, hands it
//! ad units and reads back the results through [`BiddingEngine`]. Any
//! implementation can be substituted; [`ReplayEngine`] replays recorded
//! responses and doubles as the test fake.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ad_units::AdUnit;
use crate::global_settings::GlobalSettings;

pub mod queue;
pub mod replay;

pub use queue::{Command, CommandQueue};
pub use replay::ReplayEngine;

/// A bid returned by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bid {
    pub bidder: String,
    #[serde(default)]
    pub ad_unit_code: String,
    /// Price in CPM.
    pub cpm: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Creative markup.
    #[serde(default)]
    pub ad: String,
    #[serde(default)]
    pub time_to_respond: u64,
    #[serde(default)]
    pub status_message: String,
}

/// A bidder that explicitly declined to bid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoBid {
    pub bidder: String,
    #[serde(default)]
    pub ad_unit_code: String,
}

/// Bids received for one ad unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdUnitBids {
    #[serde(default)]
    pub bids: Vec<Bid>,
}

/// Ad unit code → bids received.
pub type BidResponses = BTreeMap<String, AdUnitBids>;

/// Ad unit code → bidders that returned no bid.
pub type NoBids = BTreeMap<String, Vec<NoBid>>;

/// Arguments to [`BiddingEngine::request_bids`].
#[derive(Debug, Clone, Copy)]
pub struct BidRequest<'a> {
    pub ad_units: &'a [AdUnit],
    /// Advisory; enforced by the engine.
    pub timeout_ms: u64,
}

/// Narrow view of the bidding engine.
pub trait BiddingEngine {
    /// Apply global settings.
    fn set_config(&mut self, settings: &GlobalSettings);

    /// Run an auction for the given ad units.
    ///
    /// Returns once the engine considers the auction complete; the session
    /// reads results as soon as this returns. Engines that report completion
    /// through a callback must block here until that callback has fired.
    fn request_bids(&mut self, request: &BidRequest<'_>);

    /// All bids from the last auction, keyed by ad unit code.
    fn bid_responses(&self) -> BidResponses;

    /// All no-bids from the last auction, keyed by ad unit code.
    fn no_bids(&self) -> NoBids;

    /// Bids for one ad unit, highest CPM first.
    fn highest_cpm_bids(&self, ad_unit_code: &str) -> Vec<Bid>;
}
