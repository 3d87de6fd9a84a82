pub mod features;
pub mod params;
pub mod rank;

pub use features::feature_vector;
pub use params::PreprocessingParams;
pub use rank::{rank_runners, RankModel, ScoredRunner};
