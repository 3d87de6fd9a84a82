pub mod substrate;
pub mod settings;

pub use substrate::{FileStore, KeyValueStore, MemoryStore};
pub use settings::SettingsStore;
