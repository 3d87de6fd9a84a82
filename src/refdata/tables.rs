/// Historical performance tables loaded from CSV at startup
use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::error::Result;

#[derive(Debug, Clone, Deserialize)]
pub struct HorseStats {
    #[serde(rename = "HorseId")]
    pub horse_id: String,
    #[serde(rename = "Age")]
    pub age: Option<f64>,
    #[serde(rename = "InitialRating")]
    pub initial_rating: Option<f64>,
    #[serde(rename = "AvgSpeedMps")]
    pub avg_speed_mps: Option<f64>,
    #[serde(rename = "AvgWinDistance")]
    pub avg_win_distance: Option<f64>,
    #[serde(rename = "RacesCounted")]
    pub races_counted: Option<f64>,
    #[serde(rename = "WinRate")]
    pub win_rate: Option<f64>,
    #[serde(rename = "WinPlaceRate")]
    pub win_place_rate: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JockeyStats {
    #[serde(rename = "JockeyId")]
    pub jockey_id: String,
    #[serde(rename = "WinRate")]
    pub win_rate: Option<f64>,
    #[serde(rename = "WinPlaceRate")]
    pub win_place_rate: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrainerStats {
    #[serde(rename = "TrainerId")]
    pub trainer_id: String,
    #[serde(rename = "WinRate")]
    pub win_rate: Option<f64>,
    #[serde(rename = "WinPlaceRate")]
    pub win_place_rate: Option<f64>,
}

/// In-memory lookup tables keyed by the ids the race card uses.
#[derive(Debug, Default)]
pub struct ReferenceData {
    pub horses: HashMap<String, HorseStats>,
    pub jockeys: HashMap<String, JockeyStats>,
    pub trainers: HashMap<String, TrainerStats>,
}

impl ReferenceData {
    pub fn load<P: AsRef<Path>>(horse_csv: P, jockey_csv: P, trainer_csv: P) -> Result<Self> {
        let horses = load_table(horse_csv, |h: &HorseStats| h.horse_id.clone())?;
        let jockeys = load_table(jockey_csv, |j: &JockeyStats| j.jockey_id.clone())?;
        let trainers = load_table(trainer_csv, |t: &TrainerStats| t.trainer_id.clone())?;
        info!(
            "📋 Loaded reference data: {} horses, {} jockeys, {} trainers",
            horses.len(),
            jockeys.len(),
            trainers.len()
        );
        Ok(ReferenceData {
            horses,
            jockeys,
            trainers,
        })
    }
}

fn load_table<P, T, F>(path: P, key: F) -> Result<HashMap<String, T>>
where
    P: AsRef<Path>,
    T: for<'de> Deserialize<'de>,
    F: Fn(&T) -> String,
{
    let mut reader = csv::Reader::from_path(path.as_ref())?;
    let mut table = HashMap::new();
    for record in reader.deserialize() {
        let row: T = record?;
        table.insert(key(&row), row);
    }
    Ok(table)
}
