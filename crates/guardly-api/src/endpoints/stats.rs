use serde_json::json;
use tracing::debug;

use super::paths;
use crate::client::HomeClient;
use crate::error::Error;
use crate::models::{Stats, StatsConfig};

impl HomeClient {
    /// `GET /control/stats`
    pub async fn stats(&self) -> Result<Stats, Error> {
        self.get(paths::STATS).await
    }

    /// Wipe all collected statistics.
    ///
    /// `POST /control/stats_reset`
    pub async fn reset_stats(&self) -> Result<(), Error> {
        debug!("resetting statistics");
        self.post(paths::STATS_RESET, &json!({})).await?;
        Ok(())
    }

    /// `GET /control/stats/config` (gated)
    pub async fn stats_config(&self) -> Result<StatsConfig, Error> {
        self.get(paths::STATS_CONFIG).await
    }

    /// `PUT /control/stats/config/update` (gated)
    pub async fn set_stats_config(&self, config: &StatsConfig) -> Result<(), Error> {
        debug!(enabled = ?config.enabled, interval = ?config.interval, "writing stats config");
        self.put(paths::STATS_CONFIG_UPDATE, config).await?;
        Ok(())
    }
}
