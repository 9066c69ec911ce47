use serde_json::json;
use tracing::debug;

use super::paths;
use crate::client::HomeClient;
use crate::error::Error;
use crate::models::{RewriteRule, RewriteTarget, RewriteUpdate};

impl HomeClient {
    /// `GET /control/rewrite/list`
    pub async fn rewrites(&self) -> Result<Vec<RewriteRule>, Error> {
        self.get(paths::REWRITE_LIST).await
    }

    /// `POST /control/rewrite/add`
    pub async fn add_rewrite(&self, domain: &str, answer: &str) -> Result<(), Error> {
        debug!(domain, "adding rewrite");
        self.post(paths::REWRITE_ADD, &json!({ "domain": domain, "answer": answer }))
            .await?;
        Ok(())
    }

    /// `POST /control/rewrite/delete`
    pub async fn delete_rewrite(&self, domain: &str, answer: &str) -> Result<(), Error> {
        debug!(domain, "deleting rewrite");
        self.post(paths::REWRITE_DELETE, &json!({ "domain": domain, "answer": answer }))
            .await?;
        Ok(())
    }

    /// Replace the rule identified by `(domain, answer)` with `update`.
    ///
    /// `PUT /control/rewrite/update`
    pub async fn update_rewrite(
        &self,
        domain: &str,
        answer: &str,
        update: &RewriteRule,
    ) -> Result<(), Error> {
        debug!(domain, new_domain = %update.domain, enabled = ?update.enabled, "updating rewrite");
        let body = RewriteUpdate {
            target: RewriteTarget { domain, answer },
            update,
        };
        self.put(paths::REWRITE_UPDATE, &body).await?;
        Ok(())
    }
}
