// Persistent client records.

use serde_json::json;
use tracing::debug;

use super::paths;
use crate::client::HomeClient;
use crate::error::Error;
use crate::models::{ClientConfig, ClientSearchHit, ClientUpdate, ClientsResponse};

impl HomeClient {
    /// All persistent clients.
    ///
    /// `GET /control/clients`
    pub async fn clients(&self) -> Result<Vec<ClientConfig>, Error> {
        let resp: ClientsResponse = self.get(paths::CLIENTS).await?;
        Ok(resp.clients)
    }

    /// `POST /control/clients/add`
    pub async fn add_client(&self, client: &ClientConfig) -> Result<(), Error> {
        debug!(name = %client.name, "adding client");
        self.post(paths::CLIENTS_ADD, client).await?;
        Ok(())
    }

    /// Replace the record named `name` with `data`.
    ///
    /// `data` must be the complete record: fields left out are reset by
    /// the server.
    ///
    /// `POST /control/clients/update`
    pub async fn update_client(&self, name: &str, data: &ClientConfig) -> Result<(), Error> {
        debug!(name, "updating client");
        self.post(paths::CLIENTS_UPDATE, &ClientUpdate { name, data })
            .await?;
        Ok(())
    }

    /// `POST /control/clients/delete`
    pub async fn delete_client(&self, name: &str) -> Result<(), Error> {
        debug!(name, "deleting client");
        self.post(paths::CLIENTS_DELETE, &json!({ "name": name }))
            .await?;
        Ok(())
    }

    /// Look up clients (persistent or runtime) by IP, CIDR, MAC or ClientID.
    ///
    /// `POST /control/clients/search` (gated)
    pub async fn search_clients(&self, ids: &[String]) -> Result<Vec<ClientSearchHit>, Error> {
        let clients: Vec<_> = ids.iter().map(|id| json!({ "id": id })).collect();
        self.post(paths::CLIENTS_SEARCH, &json!({ "clients": clients }))
            .await?
            .decode()
    }
}
