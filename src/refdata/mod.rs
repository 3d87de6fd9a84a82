pub mod tables;

pub use tables::{HorseStats, JockeyStats, ReferenceData, TrainerStats};
