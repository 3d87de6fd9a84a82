/// Odds ingestion: fetch, reconcile with history, commit snapshot + history
use std::sync::Arc;

use futures_util::future;
use tracing::{info, warn};

use crate::error::Result;
use crate::history::HistoryStore;
use crate::source::OddsSource;
use crate::types::{MeetingOddsHistory, OddPoint, Race, RaceMeeting, RaceOddsUpdate};
use crate::utils::now_ms;

pub struct IngestionCoordinator {
    source: Arc<dyn OddsSource>,
    history: Arc<HistoryStore>,
}

impl IngestionCoordinator {
    pub fn new(source: Arc<dyn OddsSource>, history: Arc<HistoryStore>) -> Self {
        IngestionCoordinator { source, history }
    }

    /// Refresh odds for every race of the meeting.
    ///
    /// All per-race fetches are issued up front and awaited together. If any
    /// one fails the whole refresh fails and nothing is committed; the
    /// persisted history and the caller's snapshot stay exactly as they were.
    /// On success, every new point carries one shared capture timestamp and
    /// the history is saved with a single write.
    pub async fn ingest_all(
        &self,
        meeting: &RaceMeeting,
    ) -> Result<(RaceMeeting, MeetingOddsHistory)> {
        let date = meeting.date.as_str();
        let venue = meeting.venue_code.as_str();

        let fetches = meeting
            .races
            .iter()
            .map(|race| self.source.fetch_race_odds(date, venue, race.no));
        let results = future::try_join_all(fetches).await?;

        let _guard = self.history.lock_meeting(date, venue).await;
        let mut history = self.history.load(date, venue).await;
        let captured_at = now_ms();

        let mut updated = meeting.clone();
        let mut appended = 0;
        for (race, odds) in updated.races.iter_mut().zip(results.iter()) {
            appended += apply_race_odds(race, odds, captured_at, &mut history);
        }

        self.history.save(date, venue, &history).await?;
        info!(
            "🔄 Refreshed odds for {} {}: {} new points across {} races",
            date,
            venue,
            appended,
            updated.races.len()
        );
        Ok((updated, history))
    }

    /// Refresh odds for a single race, used when a view first selects a race
    /// that has no odds yet. An unknown race number is not an error: the
    /// input meeting is returned unchanged together with the current
    /// persisted history. A fetch failure surfaces to the caller with
    /// nothing committed.
    pub async fn ingest_one(
        &self,
        meeting: &RaceMeeting,
        race_no: u32,
    ) -> Result<(RaceMeeting, MeetingOddsHistory)> {
        let date = meeting.date.as_str();
        let venue = meeting.venue_code.as_str();

        let Some(index) = meeting.races.iter().position(|race| race.no == race_no) else {
            warn!("Race {} not found in meeting {} {}", race_no, date, venue);
            let history = self.history.load(date, venue).await;
            return Ok((meeting.clone(), history));
        };

        let odds = self.source.fetch_race_odds(date, venue, race_no).await?;

        let _guard = self.history.lock_meeting(date, venue).await;
        let mut history = self.history.load(date, venue).await;
        let captured_at = now_ms();

        let mut updated = meeting.clone();
        apply_race_odds(&mut updated.races[index], &odds, captured_at, &mut history);

        self.history.save(date, venue, &history).await?;
        Ok((updated, history))
    }
}

/// Write fresh odds onto the race snapshot and append one point per runner
/// that had a value reported this cycle. Runners absent from the update are
/// left alone. Returns the number of points appended.
fn apply_race_odds(
    race: &mut Race,
    odds: &RaceOddsUpdate,
    captured_at: i64,
    history: &mut MeetingOddsHistory,
) -> usize {
    let mut appended = 0;
    for runner in &mut race.runners {
        let Some(fresh) = odds.get(&runner.no) else {
            continue;
        };
        runner.win_odds = fresh.win_odds;
        runner.place_odds = fresh.place_odds;
        history.push_point(
            race.no,
            &runner.horse.id,
            OddPoint {
                timestamp: captured_at,
                win_odds: fresh.win_odds,
                place_odds: fresh.place_odds,
            },
        );
        appended += 1;
    }
    appended
}
