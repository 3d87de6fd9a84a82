/// Main entry point for the odds tracker
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{error, info, warn};
use tracing_subscriber;

use paddock::{
    aggregate::{bucket_ohlc, filter_by_window, paginate},
    config::load_config,
    error::Result,
    history::{merge_history_into_meeting, HistoryStore},
    ingest::IngestionCoordinator,
    predict::PreprocessingParams,
    refdata::ReferenceData,
    source::{OddsSource, RacingApiClient},
    storage::{FileStore, KeyValueStore, SettingsStore},
    utils::{hk_time_string, parse_meeting_url},
    Config, MeetingOddsHistory, Race, RaceMeeting,
};

/// Application state
pub struct OddsApp {
    config: Arc<Config>,
    settings: SettingsStore,
    history: Arc<HistoryStore>,
    coordinator: IngestionCoordinator,
    source: Arc<dyn OddsSource>,
    refdata: Option<ReferenceData>,
    meeting: RwLock<Option<(RaceMeeting, MeetingOddsHistory)>>,
}

impl OddsApp {
    pub fn new(config_path: &str) -> Result<Self> {
        let config = Arc::new(load_config(config_path)?);

        // Initialize logging at the configured level
        tracing_subscriber::fmt()
            .with_env_filter(config.log_filter())
            .init();

        info!("Starting odds tracker...");
        info!("Configuration loaded");

        let substrate: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(config.data_dir.clone()));
        let history = Arc::new(HistoryStore::new(Arc::clone(&substrate)));
        let settings = SettingsStore::new(Arc::clone(&substrate));

        let source: Arc<dyn OddsSource> = Arc::new(RacingApiClient::new(
            config.api_url.clone(),
            config.fetch_timeout_sec,
        )?);
        let coordinator = IngestionCoordinator::new(Arc::clone(&source), Arc::clone(&history));

        // Reference data and model parameters are optional: without them the
        // tracker still records and charts odds, it just can't enrich reports
        let refdata = match ReferenceData::load(
            &config.horse_csv,
            &config.jockey_csv,
            &config.trainer_csv,
        ) {
            Ok(data) => Some(data),
            Err(e) => {
                warn!("Reference data unavailable: {}", e);
                None
            }
        };
        match PreprocessingParams::from_file(&config.model_params_path) {
            Ok(params) => info!(
                "Model preprocessing ready: {} features",
                params.feature_len()
            ),
            Err(e) => warn!("Model preprocessing unavailable: {}", e),
        }

        Ok(OddsApp {
            config,
            settings,
            history,
            coordinator,
            source,
            refdata,
            meeting: RwLock::new(None),
        })
    }

    pub async fn run(&self) -> Result<()> {
        let (date, venue) = self.initialize_session().await?;

        // Persisted preference wins over the config default
        let auto_refresh = self
            .settings
            .load_auto_refresh()
            .await
            .unwrap_or(self.config.auto_refresh);
        if !auto_refresh {
            info!("Auto refresh disabled - exiting after initial load");
            return Ok(());
        }

        let mut ticker = tokio::time::interval(tokio::time::Duration::from_secs(
            self.config.refresh_interval_sec,
        ));

        // The first tick fires immediately, so odds load right after the card
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.refresh(&date, &venue).await {
                        // Keep the last good snapshot and try again next tick
                        error!("Refresh failed: {} ({})", e, e.error_code());
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Ctrl+C received - shutting down");
                    break;
                }
            }
        }

        Ok(())
    }

    /// Resolve the meeting to track, restore any cached state for it, then
    /// fetch a fresh race card.
    async fn initialize_session(&self) -> Result<(String, String)> {
        info!("Initializing session...");

        let url = match self.settings.load_last_url().await {
            Some(url) => {
                info!("Resuming last meeting URL");
                url
            }
            None => self.config.meeting_url.clone(),
        };
        let (date, venue) = parse_meeting_url(&url).ok_or_else(|| {
            paddock::OddsError::ConfigError(format!("Cannot extract meeting from URL: {}", url))
        })?;
        info!("Tracking meeting {} at {}", date, venue);

        // Show cached state straight away; the network fetch can take a while
        let cached_history = self.history.load(&date, &venue).await;
        if let Some(cached) = self.history.load_meeting(&date, &venue).await {
            let restored = merge_history_into_meeting(&cached, &cached_history);
            info!(
                "Restored cached meeting with {} stored points",
                cached_history.point_count()
            );
            *self.meeting.write().await = Some((restored, cached_history));
        }

        let card = self.source.fetch_race_card(&date, &venue).await?;
        info!("Race card loaded: {} races", card.races.len());
        self.history.save_meeting(&card).await?;
        self.settings.save_last_url(&url).await;

        let history = self.history.load(&date, &venue).await;
        let merged = merge_history_into_meeting(&card, &history);
        *self.meeting.write().await = Some((merged, history));

        info!("Session initialized successfully");
        Ok((date, venue))
    }

    /// Run one refresh cycle: fetch odds for every race, commit, and report
    /// on the current favourite.
    async fn refresh(&self, date: &str, venue: &str) -> Result<()> {
        let snapshot = {
            let state = self.meeting.read().await;
            match &*state {
                Some((meeting, _)) => meeting.clone(),
                None => {
                    warn!("No meeting loaded - skipping refresh");
                    return Ok(());
                }
            }
        };

        let (updated, history) = self.coordinator.ingest_all(&snapshot).await?;
        self.report_favourite(&updated, &history);
        *self.meeting.write().await = Some((updated, history));
        Ok(())
    }

    fn report_favourite(&self, meeting: &RaceMeeting, history: &MeetingOddsHistory) {
        let Some(race) = meeting.races.first() else {
            return;
        };
        if let Some(summary) = favourite_summary(
            race,
            history,
            self.config.chart_bucket_ms,
            self.config.table_page_size,
            self.refdata.as_ref(),
        ) {
            info!("🏇 {}", summary);
        }
    }
}

/// One-line report on the race favourite: current odds, 30-minute movement
/// from the candle chart, and the first table page of its series.
fn favourite_summary(
    race: &Race,
    history: &MeetingOddsHistory,
    chart_bucket_ms: i64,
    table_page_size: usize,
    refdata: Option<&ReferenceData>,
) -> Option<String> {
    let (runner, odds) = race
        .runners
        .iter()
        .filter_map(|r| r.win_odds.map(|odds| (r, odds)))
        .min_by(|a, b| a.1.total_cmp(&b.1))?;

    let series = history.series(race.no, &runner.horse.id).unwrap_or_default();
    let recent = filter_by_window(series, Some(30 * 60 * 1000));
    let candles = bucket_ohlc(&recent, chart_bucket_ms);
    let movement = match (candles.first(), candles.last()) {
        (Some(first), Some(last)) => format!("{:.1} -> {:.1}", first.open, last.close),
        _ => format!("{:.1}", odds),
    };
    let (page, total) = paginate(series, 0, table_page_size);
    let form = refdata
        .and_then(|data| data.horses.get(&runner.horse.id))
        .and_then(|stats| stats.win_rate)
        .map(|rate| format!(", career win rate {:.0}%", rate * 100.0))
        .unwrap_or_default();

    Some(format!(
        "Race {} favourite: {} @ {:.1} (last 30m: {}, table page 1 shows {} of {} points, as of {}{})",
        race.no,
        runner.name_en,
        odds,
        movement,
        page.len(),
        total,
        series
            .last()
            .map(|p| hk_time_string(p.timestamp))
            .unwrap_or_else(|| "-".to_string()),
        form,
    ))
}


#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let app = OddsApp::new(&config_path)?;
    app.run().await?;

    info!("Odds tracker stopped");
    Ok(())
}
