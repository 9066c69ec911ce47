use serde_json::json;
use tracing::debug;

use super::paths;
use crate::client::HomeClient;
use crate::error::Error;
use crate::models::{QueryLogConfig, QueryLogPage, QueryLogParams};

impl HomeClient {
    /// One page of the query log, newest first.
    ///
    /// `GET /control/querylog?limit=&offset=[&search=][&response_status=]`
    pub async fn query_log(&self, params: &QueryLogParams) -> Result<QueryLogPage, Error> {
        self.get_with_query(paths::QUERYLOG, &params.to_query()).await
    }

    /// `POST /control/querylog_clear`
    pub async fn clear_query_log(&self) -> Result<(), Error> {
        debug!("clearing query log");
        self.post(paths::QUERYLOG_CLEAR, &json!({})).await?;
        Ok(())
    }

    /// `GET /control/querylog/config` (gated)
    pub async fn query_log_config(&self) -> Result<QueryLogConfig, Error> {
        self.get(paths::QUERYLOG_CONFIG).await
    }

    /// `PUT /control/querylog/config/update` (gated)
    pub async fn set_query_log_config(&self, config: &QueryLogConfig) -> Result<(), Error> {
        debug!(enabled = ?config.enabled, "writing query log config");
        self.put(paths::QUERYLOG_CONFIG_UPDATE, config).await?;
        Ok(())
    }
}
