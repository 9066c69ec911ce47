// Server status, protection, and the global safety toggles.

use tracing::debug;

use super::paths;
use crate::client::HomeClient;
use crate::error::Error;
use crate::models::{EnabledStatus, ProtectionRequest, SafeSearchSettings, ServerStatus};

impl HomeClient {
    /// Server version, run state and protection state.
    ///
    /// `GET /control/status`
    pub async fn status(&self) -> Result<ServerStatus, Error> {
        self.get(paths::STATUS).await
    }

    /// Enable or disable protection. `pause_ms` auto-resumes after the
    /// given number of milliseconds and is ignored when enabling.
    ///
    /// `POST /control/protection`
    pub async fn set_protection(&self, enabled: bool, pause_ms: Option<u64>) -> Result<(), Error> {
        debug!(enabled, ?pause_ms, "setting protection");
        let body = ProtectionRequest {
            enabled,
            duration: if enabled { None } else { pause_ms },
        };
        self.post(paths::PROTECTION, &body).await?;
        Ok(())
    }

    /// `GET /control/safebrowsing/status`
    pub async fn safebrowsing_status(&self) -> Result<EnabledStatus, Error> {
        self.get(paths::SAFEBROWSING_STATUS).await
    }

    /// `POST /control/safebrowsing/{enable,disable}` with no body.
    pub async fn set_safebrowsing(&self, enabled: bool) -> Result<(), Error> {
        debug!(enabled, "setting safe browsing");
        let endpoint = if enabled {
            paths::SAFEBROWSING_ENABLE
        } else {
            paths::SAFEBROWSING_DISABLE
        };
        self.post_empty(endpoint).await
    }

    /// `GET /control/parental/status`
    pub async fn parental_status(&self) -> Result<EnabledStatus, Error> {
        self.get(paths::PARENTAL_STATUS).await
    }

    /// `POST /control/parental/{enable,disable}` with no body.
    pub async fn set_parental(&self, enabled: bool) -> Result<(), Error> {
        debug!(enabled, "setting parental control");
        let endpoint = if enabled {
            paths::PARENTAL_ENABLE
        } else {
            paths::PARENTAL_DISABLE
        };
        self.post_empty(endpoint).await
    }

    /// Safe search settings including per-engine switches.
    ///
    /// `GET /control/safesearch/status` (`settings` is PUT-only)
    pub async fn safesearch_settings(&self) -> Result<SafeSearchSettings, Error> {
        self.get(paths::SAFESEARCH_STATUS).await
    }

    /// Replace the safe search settings.
    ///
    /// `PUT /control/safesearch/settings`
    pub async fn set_safesearch_settings(&self, settings: &SafeSearchSettings) -> Result<(), Error> {
        debug!(enabled = ?settings.enabled, "writing safe search settings");
        self.put(paths::SAFESEARCH_SETTINGS, settings).await?;
        Ok(())
    }
}
