// Globally blocked services.
//
// Older servers expose `list`/`set` with a bare id array; newer ones add
// `get`/`update` carrying a schedule. Both shapes decode into
// `BlockedServicesSet`.

use serde::Serialize;
use tracing::debug;

use super::paths;
use crate::client::HomeClient;
use crate::error::Error;
use crate::models::{
    BlockableService, BlockedServicesResponse, BlockedServicesSet, Schedule, ServiceCatalog,
};

#[derive(Serialize)]
struct BlockedServicesWrite<'a> {
    ids: Vec<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    schedule: Option<&'a Schedule>,
}

impl HomeClient {
    /// Every service the server knows how to block.
    ///
    /// `GET /control/blocked_services/all`
    pub async fn service_catalog(&self) -> Result<Vec<BlockableService>, Error> {
        let catalog: ServiceCatalog = self.get(paths::BLOCKED_SERVICES_ALL).await?;
        Ok(catalog.blocked_services)
    }

    /// `GET /control/blocked_services/list`
    pub async fn blocked_services_legacy(&self) -> Result<BlockedServicesSet, Error> {
        let resp: BlockedServicesResponse = self.get(paths::BLOCKED_SERVICES_LIST).await?;
        Ok(resp.into())
    }

    /// Replace the blocked id list. Schedules are not understood here.
    ///
    /// `POST /control/blocked_services/set`
    pub async fn set_blocked_services_legacy(&self, ids: &[&str]) -> Result<(), Error> {
        debug!(count = ids.len(), "replacing blocked services (legacy)");
        self.post(paths::BLOCKED_SERVICES_SET, &ids).await?;
        Ok(())
    }

    /// `GET /control/blocked_services/get` (gated)
    pub async fn blocked_services(&self) -> Result<BlockedServicesSet, Error> {
        let resp: BlockedServicesResponse = self.get(paths::BLOCKED_SERVICES_GET).await?;
        Ok(resp.into())
    }

    /// Replace the blocked set. A `None` schedule is left out of the
    /// payload, which clears any schedule on the server.
    ///
    /// `PUT /control/blocked_services/update` (gated)
    pub async fn set_blocked_services(&self, set: &BlockedServicesSet) -> Result<(), Error> {
        debug!(
            count = set.ids.len(),
            scheduled = set.schedule.is_some(),
            "replacing blocked services"
        );
        let body = BlockedServicesWrite {
            ids: set.ids.iter().map(String::as_str).collect(),
            schedule: set.schedule.as_ref(),
        };
        self.put(paths::BLOCKED_SERVICES_UPDATE, &body).await?;
        Ok(())
    }
}
