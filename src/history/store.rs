/// Append-only odds history persistence, keyed by (date, venue)
///
/// Every save is a full rewrite of the meeting's blob; there is no partial
/// update primitive. Callers doing read-modify-write must hold the meeting
/// lock so overlapping refreshes cannot discard each other's points.
use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, warn};

use crate::error::Result;
use crate::storage::KeyValueStore;
use crate::types::{MeetingOddsHistory, OddPoint, RaceMeeting};

pub(crate) fn history_key(date: &str, venue: &str) -> String {
    format!("RaceOddsHistory_{date}_{venue}")
}

fn meeting_key(date: &str, venue: &str) -> String {
    format!("RaceMeeting_{date}_{venue}")
}

pub struct HistoryStore {
    store: Arc<dyn KeyValueStore>,
    meeting_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl HistoryStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        HistoryStore {
            store,
            meeting_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Serialization point for load-mutate-save cycles against one meeting.
    /// Overlapping refreshes (manual + timer) queue here instead of racing.
    pub async fn lock_meeting(&self, date: &str, venue: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.meeting_locks.lock().await;
            Arc::clone(
                locks
                    .entry(history_key(date, venue))
                    .or_insert_with(|| Arc::new(Mutex::new(()))),
            )
        };
        lock.lock_owned().await
    }

    /// Load the persisted history for a meeting. Missing key yields an empty
    /// history; a corrupt blob is deleted and replaced by an empty history.
    /// Never surfaces an error to the caller.
    pub async fn load(&self, date: &str, venue: &str) -> MeetingOddsHistory {
        let key = history_key(date, venue);
        match self.store.get(&key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(history) => history,
                Err(e) => {
                    warn!("Corrupt odds history under {}, discarding: {}", key, e);
                    if let Err(e) = self.store.delete(&key).await {
                        warn!("Failed to delete corrupt history {}: {}", key, e);
                    }
                    MeetingOddsHistory::default()
                }
            },
            Ok(None) => MeetingOddsHistory::default(),
            Err(e) => {
                warn!("Failed to read odds history {}: {}", key, e);
                MeetingOddsHistory::default()
            }
        }
    }

    /// Full-replace write of the meeting's history blob.
    pub async fn save(&self, date: &str, venue: &str, history: &MeetingOddsHistory) -> Result<()> {
        let raw = serde_json::to_string(history)?;
        self.store.set(&history_key(date, venue), &raw).await?;
        debug!(
            "Saved odds history for {} {}: {} points",
            date,
            venue,
            history.point_count()
        );
        Ok(())
    }

    /// Append a single point: load, extend, save, under the meeting lock.
    pub async fn append(
        &self,
        date: &str,
        venue: &str,
        race_no: u32,
        horse_id: &str,
        point: OddPoint,
    ) -> Result<()> {
        let _guard = self.lock_meeting(date, venue).await;
        let mut history = self.load(date, venue).await;
        history.push_point(race_no, horse_id, point);
        self.save(date, venue, &history).await
    }

    /// Series for one horse, sorted ascending by timestamp. Unknown race or
    /// horse yields an empty series.
    pub async fn get_series(
        &self,
        date: &str,
        venue: &str,
        race_no: u32,
        horse_id: &str,
    ) -> Vec<OddPoint> {
        let history = self.load(date, venue).await;
        let mut series = history
            .series(race_no, horse_id)
            .map(|s| s.to_vec())
            .unwrap_or_default();
        series.sort_by_key(|point| point.timestamp);
        series
    }

    /// Persist the base race card with odds stripped. The stored card stays
    /// static; history remains the single source of truth for odds.
    pub async fn save_meeting(&self, meeting: &RaceMeeting) -> Result<()> {
        let mut stripped = meeting.clone();
        for race in &mut stripped.races {
            for runner in &mut race.runners {
                runner.win_odds = None;
                runner.place_odds = None;
            }
        }
        let raw = serde_json::to_string(&stripped)?;
        self.store
            .set(&meeting_key(&meeting.date, &meeting.venue_code), &raw)
            .await
    }

    /// Load the cached race card, if any. Corrupt payloads are deleted.
    pub async fn load_meeting(&self, date: &str, venue: &str) -> Option<RaceMeeting> {
        let key = meeting_key(date, venue);
        match self.store.get(&key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(meeting) => Some(meeting),
                Err(e) => {
                    warn!("Corrupt cached race card under {}, discarding: {}", key, e);
                    if let Err(e) = self.store.delete(&key).await {
                        warn!("Failed to delete corrupt race card {}: {}", key, e);
                    }
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!("Failed to read cached race card {}: {}", key, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::types::{Horse, Jockey, Race, Runner, Trainer};

    fn new_store() -> (Arc<MemoryStore>, HistoryStore) {
        let substrate = Arc::new(MemoryStore::new());
        let history = HistoryStore::new(substrate.clone() as Arc<dyn KeyValueStore>);
        (substrate, history)
    }

    fn point(timestamp: i64, win: Option<f64>, place: Option<f64>) -> OddPoint {
        OddPoint {
            timestamp,
            win_odds: win,
            place_odds: place,
        }
    }

    #[tokio::test]
    async fn test_load_missing_returns_empty() {
        let (_, store) = new_store();
        let history = store.load("2025-09-21", "ST").await;
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_save_load_round_trip_preserves_nulls() {
        let (_, store) = new_store();

        let mut history = MeetingOddsHistory::default();
        history.push_point(1, "H001", point(1000, Some(5.2), Some(1.8)));
        history.push_point(1, "H001", point(2000, None, Some(1.9)));
        history.push_point(3, "H104", point(2000, Some(12.0), None));
        // Horse with an empty series survives the round trip too
        history.races.entry(2).or_default().insert("H050".to_string(), Vec::new());

        store.save("2025-09-21", "ST", &history).await.unwrap();
        let reloaded = store.load("2025-09-21", "ST").await;

        assert_eq!(reloaded, history);
        assert_eq!(reloaded.series(1, "H001").unwrap()[1].win_odds, None);
        assert_eq!(reloaded.series(2, "H050"), Some(&[][..]));
    }

    #[tokio::test]
    async fn test_corrupt_blob_is_deleted_and_replaced_by_empty() {
        let (substrate, store) = new_store();
        let key = history_key("2025-09-21", "ST");
        substrate.set(&key, "{not json").await.unwrap();

        let history = store.load("2025-09-21", "ST").await;
        assert!(history.is_empty());

        // The corrupt key must be gone from the substrate
        assert_eq!(substrate.get(&key).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_append_extends_never_overwrites() {
        let (_, store) = new_store();

        store
            .append("2025-09-21", "ST", 1, "H001", point(1000, Some(4.5), Some(1.6)))
            .await
            .unwrap();
        store
            .append("2025-09-21", "ST", 1, "H001", point(2000, Some(4.8), Some(1.7)))
            .await
            .unwrap();

        let series = store.get_series("2025-09-21", "ST", 1, "H001").await;
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].timestamp, 1000);
        assert_eq!(series[1].win_odds, Some(4.8));
    }

    #[tokio::test]
    async fn test_meetings_are_namespaced_by_date_and_venue() {
        let (_, store) = new_store();

        store
            .append("2025-09-21", "ST", 1, "H001", point(1000, Some(4.5), None))
            .await
            .unwrap();
        store
            .append("2025-09-24", "HV", 1, "H001", point(1000, Some(9.9), None))
            .await
            .unwrap();

        let st = store.get_series("2025-09-21", "ST", 1, "H001").await;
        let hv = store.get_series("2025-09-24", "HV", 1, "H001").await;
        assert_eq!(st[0].win_odds, Some(4.5));
        assert_eq!(hv[0].win_odds, Some(9.9));
    }

    #[tokio::test]
    async fn test_get_series_sorts_ascending() {
        let (_, store) = new_store();

        let mut history = MeetingOddsHistory::default();
        history.push_point(1, "H001", point(3000, Some(5.0), None));
        history.push_point(1, "H001", point(1000, Some(4.0), None));
        history.push_point(1, "H001", point(2000, Some(4.5), None));
        store.save("2025-09-21", "ST", &history).await.unwrap();

        let series = store.get_series("2025-09-21", "ST", 1, "H001").await;
        let timestamps: Vec<i64> = series.iter().map(|p| p.timestamp).collect();
        assert_eq!(timestamps, vec![1000, 2000, 3000]);
    }

    fn sample_meeting() -> RaceMeeting {
        RaceMeeting {
            id: "M1".to_string(),
            venue_code: "ST".to_string(),
            date: "2025-09-21".to_string(),
            total_number_of_race: 1,
            races: vec![Race {
                id: "R1".to_string(),
                no: 1,
                race_name_en: "Test Handicap".to_string(),
                race_name_ch: String::new(),
                distance: 1200,
                go_en: "Good".to_string(),
                go_ch: String::new(),
                runners: vec![Runner {
                    id: "RN1".to_string(),
                    no: 1,
                    name_en: "Fast Horse".to_string(),
                    name_ch: String::new(),
                    barrier_draw_number: 3,
                    handicap_weight: 126.0,
                    win_odds: Some(4.5),
                    place_odds: Some(1.6),
                    jockey: Jockey {
                        code: "J01".to_string(),
                        name_en: "A Jockey".to_string(),
                        name_ch: String::new(),
                    },
                    trainer: Trainer {
                        code: "T01".to_string(),
                        name_en: "A Trainer".to_string(),
                        name_ch: String::new(),
                    },
                    horse: Horse {
                        id: "H001".to_string(),
                        code: "FH1".to_string(),
                    },
                    current_rating: Some(60.0),
                    current_weight: Some(1100.0),
                    last6_run: None,
                    gear_info: None,
                }],
            }],
        }
    }

    #[tokio::test]
    async fn test_save_meeting_strips_odds() {
        let (_, store) = new_store();
        let meeting = sample_meeting();

        store.save_meeting(&meeting).await.unwrap();
        let cached = store.load_meeting("2025-09-21", "ST").await.unwrap();

        let runner = &cached.races[0].runners[0];
        assert_eq!(runner.win_odds, None);
        assert_eq!(runner.place_odds, None);
        // The caller's meeting is untouched
        assert_eq!(meeting.races[0].runners[0].win_odds, Some(4.5));
    }

    #[tokio::test]
    async fn test_load_meeting_corrupt_payload_yields_none() {
        let (substrate, store) = new_store();
        substrate
            .set(&meeting_key("2025-09-21", "ST"), "][")
            .await
            .unwrap();

        assert!(store.load_meeting("2025-09-21", "ST").await.is_none());
        assert_eq!(
            substrate.get(&meeting_key("2025-09-21", "ST")).await.unwrap(),
            None
        );
    }
}
