//! REST client for the hosted table store (PostgREST interface under `/rest/v1`).
//!
//! Authenticates every call with the service key, passed both as `apikey` and
//! as a bearer token. No retries: a failed call is reported to the caller as is.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::{Filter, StoreError, TableStore};

const REST_PATH: &str = "rest/v1/";

#[derive(Debug, Deserialize)]
struct PostgrestError {
    message: String,
    #[serde(default)]
    details: Option<String>,
}

#[derive(Clone)]
pub struct PostgrestStore {
    client: Client,
    base_url: Url,
    service_key: String,
}

impl PostgrestStore {
    pub fn new(base_url: Url, service_key: String, timeout: Duration) -> Result<Self, StoreError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url,
            service_key,
        })
    }

    fn table_url(&self, table: &str) -> Result<Url, StoreError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Url::parse(&format!("{base}/{REST_PATH}{table}")).map_err(|e| StoreError::Api {
            status: 0,
            message: format!("invalid table URL for '{table}': {e}"),
        })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .header("accept", "application/json")
    }

    /// Turns a response into rows, mapping non-2xx statuses to `StoreError::Api`.
    async fn rows(response: Response) -> Result<Vec<Value>, StoreError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<PostgrestError>(&body)
                .map(|e| match e.details {
                    Some(details) => format!("{} ({details})", e.message),
                    None => e.message,
                })
                .unwrap_or(body);
            return Err(StoreError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl TableStore for PostgrestStore {
    async fn select(
        &self,
        table: &str,
        filters: &[Filter],
        limit: usize,
    ) -> Result<Vec<Value>, StoreError> {
        let mut query: Vec<(String, String)> = vec![("select".to_string(), "*".to_string())];
        query.extend(
            filters
                .iter()
                .map(|f| (f.column.clone(), format!("eq.{}", f.value))),
        );
        query.push(("limit".to_string(), limit.to_string()));

        let response = self
            .authorized(self.client.get(self.table_url(table)?))
            .query(&query)
            .send()
            .await?;

        let rows = Self::rows(response).await?;
        debug!("select on {table} returned {} row(s)", rows.len());
        Ok(rows)
    }

    async fn insert(&self, table: &str, rows: Vec<Value>) -> Result<Vec<Value>, StoreError> {
        let response = self
            .authorized(self.client.post(self.table_url(table)?))
            .header("prefer", "return=representation")
            .json(&rows)
            .send()
            .await?;

        let inserted = Self::rows(response).await?;
        debug!("insert on {table} returned {} row(s)", inserted.len());
        Ok(inserted)
    }
}
