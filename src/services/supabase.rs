use async_trait::async_trait;

use crate::error::{ConfigError, FetchError, FetchResult};
use crate::models::{BackendSettings, CallRecord, FetchOrder, RecordQuery};
use crate::services::record_store::RecordSource;

/// Reads the transcriptions table through Supabase's PostgREST endpoint.
#[derive(Debug, Clone)]
pub struct SupabaseSource {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    table: String,
}

impl SupabaseSource {
    pub fn new(base_url: &str, api_key: &str, table: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            api_key: api_key.trim().to_string(),
            table: table.trim().to_string(),
        }
    }

    pub fn from_settings(backend: &BackendSettings) -> Result<Self, ConfigError> {
        if backend.url.trim().is_empty() {
            return Err(ConfigError::Missing("backend.url (SUPABASE_URL)"));
        }
        if backend.anon_key.trim().is_empty() {
            return Err(ConfigError::Missing("backend.anon_key (SUPABASE_ANON_KEY)"));
        }
        if backend.table.trim().is_empty() {
            return Err(ConfigError::Missing("backend.table"));
        }
        Ok(Self::new(&backend.url, &backend.anon_key, &backend.table))
    }

    pub fn endpoint(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    pub fn query_params(query: &RecordQuery) -> Vec<(&'static str, String)> {
        let mut params = vec![("select", "*".to_string())];
        if let Some(start) = query.range.start {
            params.push(("created_at", format!("gte.{}", start.format("%Y-%m-%d"))));
        }
        if let Some(end) = query.range.exclusive_end() {
            params.push(("created_at", format!("lt.{}", end.format("%Y-%m-%d"))));
        }
        let order = match query.order {
            FetchOrder::Ascending => "created_at.asc",
            FetchOrder::Descending => "created_at.desc",
        };
        params.push(("order", order.to_string()));
        params
    }
}

pub fn decode_rows(body: &str) -> FetchResult<Vec<CallRecord>> {
    Ok(serde_json::from_str(body)?)
}

#[async_trait]
impl RecordSource for SupabaseSource {
    async fn fetch(&self, query: &RecordQuery) -> FetchResult<Vec<CallRecord>> {
        let response = self
            .client
            .get(self.endpoint())
            .query(&Self::query_params(query))
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        decode_rows(&text)
    }

    fn describe(&self) -> String {
        self.endpoint()
    }
}
