/// Miscellaneous persisted settings: last-used source URL and the
/// auto-refresh flag. Substrate failures are absorbed here and degrade to
/// absent values; settings are never worth failing a session over.
use std::sync::Arc;

use tracing::warn;

use super::KeyValueStore;

const LAST_URL_KEY: &str = "LastUrl";
const AUTO_REFRESH_KEY: &str = "AutoRefresh";

pub struct SettingsStore {
    store: Arc<dyn KeyValueStore>,
}

impl SettingsStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        SettingsStore { store }
    }

    pub async fn save_last_url(&self, url: &str) {
        if let Err(e) = self.store.set(LAST_URL_KEY, url).await {
            warn!("Failed to save last URL: {}", e);
        }
    }

    pub async fn load_last_url(&self) -> Option<String> {
        match self.store.get(LAST_URL_KEY).await {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to load last URL: {}", e);
                None
            }
        }
    }

    pub async fn save_auto_refresh(&self, enabled: bool) {
        if let Err(e) = self.store.set(AUTO_REFRESH_KEY, &enabled.to_string()).await {
            warn!("Failed to save auto refresh setting: {}", e);
        }
    }

    pub async fn load_auto_refresh(&self) -> Option<bool> {
        match self.store.get(AUTO_REFRESH_KEY).await {
            Ok(Some(value)) => value.parse().ok(),
            Ok(None) => None,
            Err(e) => {
                warn!("Failed to load auto refresh setting: {}", e);
                None
            }
        }
    }
}
