/// Runner ranking over model scores
use tracing::warn;

use crate::error::Result;
use crate::predict::{feature_vector, PreprocessingParams};
use crate::refdata::ReferenceData;
use crate::types::{Race, RaceMeeting};

/// A scoring model. The score is a predicted finishing position, so lower
/// is better.
pub trait RankModel: Send + Sync {
    fn predict(&self, features: &[f64]) -> Result<f64>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRunner {
    pub runner_no: u32,
    pub horse_id: String,
    pub score: f64,
    pub predicted_rank: usize,
}

/// Score every runner in the race and rank them ascending by score. A
/// runner whose scoring fails is skipped with a warning rather than sinking
/// the whole race.
pub fn rank_runners(
    model: &dyn RankModel,
    race: &Race,
    meeting: &RaceMeeting,
    refdata: &ReferenceData,
    params: &PreprocessingParams,
) -> Vec<ScoredRunner> {
    let mut scored: Vec<ScoredRunner> = Vec::with_capacity(race.runners.len());
    for runner in &race.runners {
        let features = match feature_vector(runner, race, meeting, refdata, params) {
            Ok(features) => features,
            Err(e) => {
                warn!("Skipping runner {} in race {}: {}", runner.no, race.no, e);
                continue;
            }
        };
        match model.predict(&features) {
            Ok(score) => scored.push(ScoredRunner {
                runner_no: runner.no,
                horse_id: runner.horse.id.clone(),
                score,
                predicted_rank: 0,
            }),
            Err(e) => warn!("Model failed on runner {}: {}", runner.no, e),
        }
    }

    scored.sort_by(|a, b| a.score.total_cmp(&b.score));
    for (index, entry) in scored.iter_mut().enumerate() {
        entry.predicted_rank = index + 1;
    }
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OddsError;
    use crate::types::{Horse, Jockey, Runner, Trainer};

    /// Scores by barrier draw: the feature vector's second entry.
    struct BarrierModel;

    impl RankModel for BarrierModel {
        fn predict(&self, features: &[f64]) -> Result<f64> {
            features
                .get(1)
                .copied()
                .ok_or_else(|| OddsError::ModelError("short feature vector".to_string()))
        }
    }

    fn params() -> PreprocessingParams {
        serde_json::from_str(
            r#"{
                "numerical_features": ["win_odds", "barrier"],
                "categorical_features": [],
                "scaler_mean": [0.0, 0.0],
                "scaler_scale": [1.0, 1.0],
                "ohe_categories": {}
            }"#,
        )
        .unwrap()
    }

    fn runner(no: u32, barrier: u32) -> Runner {
        Runner {
            id: format!("RN{no}"),
            no,
            name_en: String::new(),
            name_ch: String::new(),
            barrier_draw_number: barrier,
            handicap_weight: 120.0,
            win_odds: Some(5.0),
            place_odds: None,
            jockey: Jockey {
                code: "J01".to_string(),
                name_en: String::new(),
                name_ch: String::new(),
            },
            trainer: Trainer {
                code: "T01".to_string(),
                name_en: String::new(),
                name_ch: String::new(),
            },
            horse: Horse {
                id: format!("H{no:03}"),
                code: format!("H{no:03}"),
            },
            current_rating: None,
            current_weight: None,
            last6_run: None,
            gear_info: None,
        }
    }

    #[test]
    fn test_ranks_ascending_by_score() {
        let race = Race {
            id: "R1".to_string(),
            no: 1,
            race_name_en: String::new(),
            race_name_ch: String::new(),
            distance: 1200,
            go_en: "Good".to_string(),
            go_ch: String::new(),
            runners: vec![runner(1, 8), runner(2, 2), runner(3, 5)],
        };
        let meeting = RaceMeeting {
            id: "M1".to_string(),
            venue_code: "ST".to_string(),
            date: "2025-09-21".to_string(),
            total_number_of_race: 1,
            races: vec![],
        };

        let ranked = rank_runners(
            &BarrierModel,
            &race,
            &meeting,
            &ReferenceData::default(),
            &params(),
        );

        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].runner_no, 2);
        assert_eq!(ranked[0].predicted_rank, 1);
        assert_eq!(ranked[1].runner_no, 3);
        assert_eq!(ranked[2].runner_no, 1);
        assert_eq!(ranked[2].predicted_rank, 3);
    }
}
