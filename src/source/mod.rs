pub mod client;

use async_trait::async_trait;

pub use client::RacingApiClient;

use crate::error::Result;
use crate::types::{RaceMeeting, RaceOddsUpdate};

/// Remote data source supplying race metadata and raw odds values.
///
/// A runner absent from an odds response means "no update for this runner in
/// this cycle", never "zero odds".
#[async_trait]
pub trait OddsSource: Send + Sync {
    /// Fetch the full race card for a meeting.
    async fn fetch_race_card(&self, date: &str, venue: &str) -> Result<RaceMeeting>;

    /// Fetch the current win/place odds for one race.
    async fn fetch_race_odds(
        &self,
        date: &str,
        venue: &str,
        race_no: u32,
    ) -> Result<RaceOddsUpdate>;
}
