//! HTTP knowledge source for a PostgREST-style remote store.
//!
//! Each collection lives in its own table (`drug_interactions`,
//! `contraindications`, `allergy_mappings`) and is read whole, ordered by its
//! leading name column so "first match wins" is stable across fetches.

use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::debug;

use rxguard_contracts::{
    error::{SafetyError, SafetyResult},
    knowledge::{AllergyMapping, CollectionKind, ContraindicationEntry, InteractionEntry},
};

use crate::source::{decode_rows, KnowledgeSource};

/// Column each table is ordered by.
fn order_column(kind: CollectionKind) -> &'static str {
    match kind {
        CollectionKind::Interactions => "drug1",
        CollectionKind::Contraindications => "drug",
        CollectionKind::AllergyMappings => "allergy",
    }
}

/// Blocking HTTP client for the remote knowledge store.
pub struct HttpKnowledgeSource {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl HttpKnowledgeSource {
    /// Build a source for `base_url` (e.g. `https://x.supabase.co/rest/v1`).
    ///
    /// When `api_key` is set it is sent both as the `apikey` header and as a
    /// bearer token, which is what PostgREST gateways expect.
    pub fn new(base_url: &str, api_key: Option<String>, timeout_secs: u64) -> SafetyResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| SafetyError::ConfigError {
                reason: format!("failed to build knowledge-base HTTP client: {}", e),
            })?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client,
            timeout_secs,
        })
    }

    /// URL that selects every row of `kind`'s table.
    pub fn collection_url(&self, kind: CollectionKind) -> String {
        format!(
            "{}/{}?select=*&order={}.asc",
            self.base_url,
            kind.table_name(),
            order_column(kind)
        )
    }

    fn fetch_error(&self, reason: String) -> SafetyError {
        SafetyError::KnowledgeFetch {
            source_name: self.base_url.clone(),
            reason,
        }
    }

    fn fetch_collection<T: DeserializeOwned>(&self, kind: CollectionKind) -> SafetyResult<Vec<T>> {
        let url = self.collection_url(kind);
        debug!(url = %url, collection = %kind, "fetching knowledge collection");

        let mut request = self.client.get(&url);
        if let Some(key) = &self.api_key {
            request = request.header("apikey", key).bearer_auth(key);
        }

        let response = request.send().map_err(|e| {
            if e.is_timeout() {
                self.fetch_error(format!("request timed out after {}s", self.timeout_secs))
            } else {
                self.fetch_error(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(self.fetch_error(format!("HTTP {}: {}", status.as_u16(), body)));
        }

        let rows: Vec<serde_json::Value> = response
            .json()
            .map_err(|e| self.fetch_error(format!("invalid JSON body: {}", e)))?;

        Ok(decode_rows(&self.base_url, kind, rows))
    }
}

impl KnowledgeSource for HttpKnowledgeSource {
    fn name(&self) -> &str {
        &self.base_url
    }

    fn fetch_interactions(&self) -> SafetyResult<Vec<InteractionEntry>> {
        self.fetch_collection(CollectionKind::Interactions)
    }

    fn fetch_contraindications(&self) -> SafetyResult<Vec<ContraindicationEntry>> {
        self.fetch_collection(CollectionKind::Contraindications)
    }

    fn fetch_allergy_mappings(&self) -> SafetyResult<Vec<AllergyMapping>> {
        self.fetch_collection(CollectionKind::AllergyMappings)
    }
}
