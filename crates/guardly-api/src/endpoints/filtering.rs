// Filter list subscriptions and host checks.

use serde_json::json;
use tracing::debug;

use super::paths;
use crate::client::HomeClient;
use crate::error::Error;
use crate::models::{CheckHostResult, FilterList, FilteringConfig, FilteringStatus, SetFilterUrl};

impl HomeClient {
    /// Filtering state with block- and allowlists. Lists read from
    /// `whitelist_filters` come back with `allowlist` set.
    ///
    /// `GET /control/filtering/status`
    pub async fn filtering_status(&self) -> Result<FilteringStatus, Error> {
        let status: FilteringStatus = self.get(paths::FILTERING_STATUS).await?;
        Ok(status.with_allowlists_marked())
    }

    /// `POST /control/filtering/config`
    pub async fn set_filtering_config(&self, config: FilteringConfig) -> Result<(), Error> {
        debug!(enabled = config.enabled, interval = config.interval, "setting filtering");
        self.post(paths::FILTERING_CONFIG, &config).await?;
        Ok(())
    }

    /// Subscribe to a new list.
    ///
    /// `POST /control/filtering/add_url`
    pub async fn add_filter_url(&self, name: &str, url: &str, allowlist: bool) -> Result<(), Error> {
        debug!(name, url, allowlist, "adding filter list");
        let body = json!({ "name": name, "url": url, "whitelist": allowlist });
        self.post(paths::FILTERING_ADD_URL, &body).await?;
        Ok(())
    }

    /// `POST /control/filtering/remove_url`
    pub async fn remove_filter_url(&self, url: &str, allowlist: bool) -> Result<(), Error> {
        debug!(url, allowlist, "removing filter list");
        let body = json!({ "url": url, "whitelist": allowlist });
        self.post(paths::FILTERING_REMOVE_URL, &body).await?;
        Ok(())
    }

    /// Replace the list addressed by `target_url` with `list`.
    ///
    /// The server treats `data` as a full record, so `list` must carry the
    /// name it already has.
    ///
    /// `POST /control/filtering/set_url`
    pub async fn set_filter_url(&self, target_url: &str, list: &FilterList) -> Result<(), Error> {
        debug!(url = target_url, enabled = list.enabled, "updating filter list");
        self.post(paths::FILTERING_SET_URL, &SetFilterUrl::new(target_url, list))
            .await?;
        Ok(())
    }

    /// Trigger a list update check.
    ///
    /// `POST /control/filtering/refresh`
    pub async fn refresh_filters(&self, allowlist: bool) -> Result<(), Error> {
        debug!(allowlist, "refreshing filter lists");
        self.post(paths::FILTERING_REFRESH, &json!({ "whitelist": allowlist }))
            .await?;
        Ok(())
    }

    /// How `name` would be filtered. `client` and `qtype` are only
    /// understood by newer servers.
    ///
    /// `GET /control/filtering/check_host?name=[&client=][&qtype=]`
    pub async fn check_host(
        &self,
        name: &str,
        client: Option<&str>,
        qtype: Option<&str>,
    ) -> Result<CheckHostResult, Error> {
        let mut query = vec![("name", name.to_owned())];
        if let Some(client) = client {
            query.push(("client", client.to_owned()));
        }
        if let Some(qtype) = qtype {
            query.push(("qtype", qtype.to_owned()));
        }
        self.get_with_query(paths::CHECK_HOST, &query).await
    }
}
