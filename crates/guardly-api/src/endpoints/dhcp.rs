use super::paths;
use crate::client::HomeClient;
use crate::error::Error;
use crate::models::DhcpStatus;

impl HomeClient {
    /// DHCP server state with dynamic and static leases.
    ///
    /// `GET /control/dhcp/status`
    pub async fn dhcp_status(&self) -> Result<DhcpStatus, Error> {
        self.get(paths::DHCP_STATUS).await
    }
}
