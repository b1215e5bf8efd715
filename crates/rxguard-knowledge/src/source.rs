//! The `KnowledgeSource` seam and lenient record decoding.
//!
//! A source hands back whole collections. It never merges with other
//! sources and never caches; both are the provider's job.

use serde::de::DeserializeOwned;
use tracing::warn;

use rxguard_contracts::{
    error::SafetyResult,
    knowledge::{AllergyMapping, CollectionKind, ContraindicationEntry, InteractionEntry},
};

/// Something that can deliver the three knowledge-base collections.
///
/// Implementations may perform I/O. An `Err` or an empty collection both mean
/// "not available from this source" to the provider.
pub trait KnowledgeSource: Send + Sync {
    /// Short name used in logs and error messages.
    fn name(&self) -> &str;

    fn fetch_interactions(&self) -> SafetyResult<Vec<InteractionEntry>>;

    fn fetch_contraindications(&self) -> SafetyResult<Vec<ContraindicationEntry>>;

    fn fetch_allergy_mappings(&self) -> SafetyResult<Vec<AllergyMapping>>;
}

/// Decode raw rows into typed entries, skipping rows that do not fit.
///
/// A row with an unknown severity or a missing column is a data-quality
/// defect upstream. It is dropped with a warning so the rest of the
/// collection stays usable.
pub fn decode_rows<T: DeserializeOwned>(
    source_name: &str,
    kind: CollectionKind,
    rows: Vec<serde_json::Value>,
) -> Vec<T> {
    let total = rows.len();
    let decoded: Vec<T> = rows
        .into_iter()
        .enumerate()
        .filter_map(|(index, row)| match serde_json::from_value::<T>(row) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(
                    source = %source_name,
                    collection = %kind,
                    index,
                    error = %e,
                    "skipping malformed knowledge entry"
                );
                None
            }
        })
        .collect();

    if decoded.len() < total {
        warn!(
            source = %source_name,
            collection = %kind,
            kept = decoded.len(),
            skipped = total - decoded.len(),
            "knowledge collection contained malformed entries"
        );
    }
    decoded
}
