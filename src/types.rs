/// Core type definitions for the odds tracker
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One timestamped observation of a runner's win/place odds.
///
/// Immutable once created; either odds value may be absent when the source
/// had no quote for that pool in the capture cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OddPoint {
    pub timestamp: i64,
    #[serde(rename = "winOdds", default)]
    pub win_odds: Option<f64>,
    #[serde(rename = "placeOdds", default)]
    pub place_odds: Option<f64>,
}

/// Odds series for one horse within one race, append-only in arrival order.
pub type EntitySeries = Vec<OddPoint>;

/// Per-race odds history, keyed by horse id.
pub type RaceOddsHistory = BTreeMap<String, EntitySeries>;

/// Full odds history for one meeting, keyed by race number.
///
/// This is the unit of persistence: one blob per (date, venue) key. BTreeMaps
/// keep serialization deterministic, so an aborted refresh leaves the stored
/// blob byte-identical.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeetingOddsHistory {
    pub races: BTreeMap<u32, RaceOddsHistory>,
}

impl MeetingOddsHistory {
    pub fn race(&self, race_no: u32) -> Option<&RaceOddsHistory> {
        self.races.get(&race_no)
    }

    pub fn series(&self, race_no: u32, horse_id: &str) -> Option<&[OddPoint]> {
        self.races
            .get(&race_no)
            .and_then(|race| race.get(horse_id))
            .map(|series| series.as_slice())
    }

    /// Append a point, creating the nested maps on first sight of a
    /// race/horse. Existing points are never touched.
    pub fn push_point(&mut self, race_no: u32, horse_id: &str, point: OddPoint) {
        self.races
            .entry(race_no)
            .or_default()
            .entry(horse_id.to_string())
            .or_default()
            .push(point);
    }

    pub fn is_empty(&self) -> bool {
        self.races.is_empty()
    }

    /// Total number of stored points across all races and horses.
    pub fn point_count(&self) -> usize {
        self.races
            .values()
            .flat_map(|race| race.values())
            .map(|series| series.len())
            .sum()
    }
}

/// OHLC aggregate of win odds observed within one time bucket
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candle {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// Fresh odds for one runner as reported by the source in one cycle
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunnerOdds {
    pub win_odds: Option<f64>,
    pub place_odds: Option<f64>,
}

/// Per-race fetch result: runner number -> fresh odds. A runner absent from
/// the map means "no update this cycle", not zero odds.
pub type RaceOddsUpdate = std::collections::HashMap<u32, RunnerOdds>;

/// Horse identity within the race card
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Horse {
    pub id: String,
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Jockey {
    pub code: String,
    pub name_en: String,
    pub name_ch: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trainer {
    pub code: String,
    pub name_en: String,
    pub name_ch: String,
}

/// One competing runner. The win/place odds here are the *snapshot* view,
/// derived from history by the merger; history stays the source of truth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Runner {
    pub id: String,
    pub no: u32,
    pub name_en: String,
    pub name_ch: String,
    #[serde(rename = "barrierDrawNumber")]
    pub barrier_draw_number: u32,
    #[serde(rename = "handicapWeight")]
    pub handicap_weight: f64,
    #[serde(rename = "winOdds", default)]
    pub win_odds: Option<f64>,
    #[serde(rename = "placeOdds", default)]
    pub place_odds: Option<f64>,
    pub jockey: Jockey,
    pub trainer: Trainer,
    pub horse: Horse,
    #[serde(rename = "currentRating", default)]
    pub current_rating: Option<f64>,
    #[serde(rename = "currentWeight", default)]
    pub current_weight: Option<f64>,
    #[serde(rename = "last6run", default)]
    pub last6_run: Option<String>,
    #[serde(rename = "gearInfo", default)]
    pub gear_info: Option<String>,
}

/// One race within a meeting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Race {
    pub id: String,
    pub no: u32,
    #[serde(rename = "raceName_en", default)]
    pub race_name_en: String,
    #[serde(rename = "raceName_ch", default)]
    pub race_name_ch: String,
    pub distance: u32,
    #[serde(rename = "go_en", default)]
    pub go_en: String,
    #[serde(rename = "go_ch", default)]
    pub go_ch: String,
    pub runners: Vec<Runner>,
}

/// A venue+date grouping of scheduled races
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceMeeting {
    pub id: String,
    #[serde(rename = "venueCode")]
    pub venue_code: String,
    pub date: String,
    #[serde(rename = "totalNumberOfRace")]
    pub total_number_of_race: u32,
    pub races: Vec<Race>,
}

impl RaceMeeting {
    pub fn race(&self, race_no: u32) -> Option<&Race> {
        self.races.iter().find(|race| race.no == race_no)
    }
}

/// Configuration for the odds tracker
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // Odds Source
    pub api_url: String,
    pub meeting_url: String,
    pub fetch_timeout_sec: u64,

    // Refresh Loop
    pub refresh_interval_sec: u64,
    pub auto_refresh: bool,

    // Persistence
    pub data_dir: String,

    // Presentation Defaults
    pub chart_bucket_ms: i64,
    pub table_page_size: usize,

    // Reference Data
    pub horse_csv: String,
    pub jockey_csv: String,
    pub trainer_csv: String,
    pub model_params_path: String,

    // Logging
    pub log_level: String,
}

impl Config {
    /// Env-filter directive for the tracing subscriber: the configured level
    /// for this crate, info elsewhere.
    pub fn log_filter(&self) -> String {
        format!("paddock={},info", self.log_level)
    }
}
