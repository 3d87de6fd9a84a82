/// Assembles the per-runner feature vector the ranking model expects
use crate::error::{OddsError, Result};
use crate::predict::PreprocessingParams;
use crate::refdata::ReferenceData;
use crate::types::{Race, RaceMeeting, Runner};

/// Build the scaled numerical + one-hot categorical vector for one runner.
///
/// Missing stats fall back to field-level defaults so a first-time starter
/// still gets a sane vector. An unknown category encodes as all zeros,
/// matching how the training-side encoder handles unseen values.
pub fn feature_vector(
    runner: &Runner,
    race: &Race,
    meeting: &RaceMeeting,
    refdata: &ReferenceData,
    params: &PreprocessingParams,
) -> Result<Vec<f64>> {
    let horse = refdata.horses.get(&runner.horse.id);
    let jockey = refdata.jockeys.get(&runner.jockey.code);
    let trainer = refdata.trainers.get(&runner.trainer.code);

    let numerical = |name: &str| -> Result<f64> {
        let value = match name {
            "distance" => race.distance as f64,
            "barrier" => runner.barrier_draw_number as f64,
            "initial_rating" => horse.and_then(|h| h.initial_rating).unwrap_or(50.0),
            "handicap_weight" => runner.handicap_weight,
            "declared_weight" => runner.current_weight.unwrap_or(1120.0),
            "age" => horse.and_then(|h| h.age).unwrap_or(5.0),
            "current_rating" => runner.current_rating.unwrap_or(50.0),
            "jockey_win_rate" => jockey.and_then(|j| j.win_rate).unwrap_or(0.1),
            "jockey_win_place_rate" => jockey.and_then(|j| j.win_place_rate).unwrap_or(0.1),
            "trainer_win_rate" => trainer.and_then(|t| t.win_rate).unwrap_or(0.08),
            "trainer_win_place_rate" => trainer.and_then(|t| t.win_place_rate).unwrap_or(0.24),
            "win_odds" => runner.win_odds.unwrap_or(9.0),
            "avg_speed_mps" => horse.and_then(|h| h.avg_speed_mps).unwrap_or(16.93),
            "avg_win_distance" => horse.and_then(|h| h.avg_win_distance).unwrap_or(4.43),
            "races_counted" => horse.and_then(|h| h.races_counted).unwrap_or(1.0),
            "horse_win_rate" => horse.and_then(|h| h.win_rate).unwrap_or(0.05),
            "horse_win_place_rate" => horse.and_then(|h| h.win_place_rate).unwrap_or(0.1),
            other => {
                return Err(OddsError::ModelError(format!(
                    "unknown numerical feature '{other}'"
                )))
            }
        };
        Ok(value)
    };

    let mut vector = Vec::with_capacity(params.feature_len());
    for (i, name) in params.numerical_features.iter().enumerate() {
        let raw = numerical(name)?;
        vector.push((raw - params.scaler_mean[i]) / params.scaler_scale[i]);
    }

    for name in &params.categorical_features {
        let value = match name.as_str() {
            "going" => {
                if race.go_en.is_empty() {
                    "Good".to_string()
                } else {
                    race.go_en.clone()
                }
            }
            "venue" => meeting.venue_code.clone(),
            other => {
                return Err(OddsError::ModelError(format!(
                    "unknown categorical feature '{other}'"
                )))
            }
        };
        let categories = params
            .ohe_categories
            .get(name)
            .ok_or_else(|| OddsError::ModelError(format!("no category list for '{name}'")))?;
        for category in categories {
            vector.push(if *category == value { 1.0 } else { 0.0 });
        }
    }

    Ok(vector)
}
