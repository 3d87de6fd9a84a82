pub mod store;
pub mod merge;

pub use store::HistoryStore;
pub use merge::merge_history_into_meeting;
