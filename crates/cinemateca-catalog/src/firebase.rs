//! Firebase Realtime Database catalog.
//!
//! Records are pushed under `/movies`; the database mints the push key and
//! returns it as `{"name": "-Nxyz..."}`.

use async_trait::async_trait;
use cinemateca_core::CatalogRecord;
use serde::Deserialize;

use crate::traits::{Catalog, CatalogError, CatalogResult, RecordId};

const MOVIES_PATH: &str = "movies";

/// Firebase RTDB catalog implementation
#[derive(Clone)]
pub struct FirebaseCatalog {
    base_url: String,
    auth_token: Option<String>,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct PushResponse {
    name: String,
}

impl FirebaseCatalog {
    /// # Arguments
    /// * `base_url` - Database root URL (e.g., "https://my-project-default-rtdb.firebaseio.com")
    /// * `auth_token` - Optional database secret or OAuth token
    pub fn new(base_url: String, auth_token: Option<String>) -> Self {
        FirebaseCatalog {
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token,
            client: reqwest::Client::new(),
        }
    }

    fn collection_url(&self) -> String {
        format!("{}/{}.json", self.base_url, MOVIES_PATH)
    }
}

#[async_trait]
impl Catalog for FirebaseCatalog {
    async fn create_record(&self, record: &CatalogRecord) -> CatalogResult<RecordId> {
        let mut request = self.client.post(self.collection_url()).json(record);
        if let Some(token) = &self.auth_token {
            request = request.query(&[("auth", token)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| CatalogError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let push: PushResponse = response
            .json()
            .await
            .map_err(|e| CatalogError::MalformedResponse(e.to_string()))?;

        tracing::info!(
            record_id = %push.name,
            title = %record.title,
            "Catalog record created"
        );

        Ok(RecordId(push.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_url_is_rooted_at_movies() {
        let catalog = FirebaseCatalog::new(
            "https://proj-default-rtdb.firebaseio.com/".to_string(),
            None,
        );
        assert_eq!(
            catalog.collection_url(),
            "https://proj-default-rtdb.firebaseio.com/movies.json"
        );
    }
}
