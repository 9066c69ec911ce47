use tracing::debug;

use super::paths;
use crate::client::HomeClient;
use crate::error::Error;
use crate::models::{DnsConfig, DnsConfigUpdate};

impl HomeClient {
    /// `GET /control/dns_info`
    pub async fn dns_info(&self) -> Result<DnsConfig, Error> {
        self.get(paths::DNS_INFO).await
    }

    /// Apply the fields present in `update`; the server leaves the rest.
    ///
    /// `POST /control/dns_config`
    pub async fn set_dns_config(&self, update: &DnsConfigUpdate) -> Result<(), Error> {
        debug!(?update, "updating DNS config");
        self.post(paths::DNS_CONFIG, update).await?;
        Ok(())
    }
}
