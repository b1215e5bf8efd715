//! The knowledge-base provider: cache, single-flight fetch, fallback.
//!
//! Resolution order per collection:
//!
//! 1. a previously cached, non-empty collection;
//! 2. a fetch from the remote source, cached and returned if non-empty;
//! 3. the embedded fallback dataset (never cached, so the next call retries
//!    the remote).
//!
//! Whichever step yields a non-empty collection wins entirely; sources are
//! never merged.
//!
//! Concurrent callers that find the cache cold queue behind a single fetch
//! gate. Whoever gets the gate first performs the fetch; the rest observe its
//! outcome instead of fetching again. A warm cache is read under an
//! uncontended `RwLock` read guard and handed out as a shared `Arc`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use serde::Serialize;
use tracing::{debug, info, warn};

use rxguard_contracts::{
    error::SafetyResult,
    knowledge::{AllergyMapping, CollectionKind, ContraindicationEntry, InteractionEntry},
};

use crate::{
    config::KnowledgeBaseConfig,
    fallback::{FallbackDataset, StaticKnowledgeSource},
    remote::HttpKnowledgeSource,
    source::KnowledgeSource,
};

// ── Origins ───────────────────────────────────────────────────────────────────

/// Where a resolved collection came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KnowledgeOrigin {
    Cache,
    Remote,
    Fallback,
}

/// A resolved collection and its origin.
#[derive(Debug, Clone)]
pub struct Resolved<T> {
    pub entries: Arc<Vec<T>>,
    pub origin: KnowledgeOrigin,
}

/// Origin of each collection in a `KnowledgeBase` snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KnowledgeOrigins {
    pub interactions: KnowledgeOrigin,
    pub contraindications: KnowledgeOrigin,
    pub allergy_mappings: KnowledgeOrigin,
}

impl Default for KnowledgeOrigins {
    fn default() -> Self {
        Self {
            interactions: KnowledgeOrigin::Fallback,
            contraindications: KnowledgeOrigin::Fallback,
            allergy_mappings: KnowledgeOrigin::Fallback,
        }
    }
}

// ── Snapshot ──────────────────────────────────────────────────────────────────

/// An immutable view of all three collections, taken at one point in time.
///
/// The enrichment pipeline runs against a snapshot so it never performs I/O
/// itself.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    pub interactions: Arc<Vec<InteractionEntry>>,
    pub contraindications: Arc<Vec<ContraindicationEntry>>,
    pub allergy_mappings: Arc<Vec<AllergyMapping>>,
    pub origins: KnowledgeOrigins,
}

impl KnowledgeBase {
    pub fn new(
        interactions: Vec<InteractionEntry>,
        contraindications: Vec<ContraindicationEntry>,
        allergy_mappings: Vec<AllergyMapping>,
    ) -> Self {
        Self {
            interactions: Arc::new(interactions),
            contraindications: Arc::new(contraindications),
            allergy_mappings: Arc::new(allergy_mappings),
            origins: KnowledgeOrigins::default(),
        }
    }

    /// A snapshot with no records at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The embedded dataset as a snapshot, bypassing any provider.
    pub fn embedded() -> SafetyResult<Self> {
        let dataset = FallbackDataset::embedded()?;
        Ok(Self::new(
            dataset.interactions,
            dataset.contraindications,
            dataset.allergy_mappings,
        ))
    }
}

/// Collection sizes and origins, as reported to operators.
#[derive(Debug, Clone, Serialize)]
pub struct KnowledgeStats {
    pub interactions: usize,
    pub contraindications: usize,
    pub allergy_mappings: usize,
    pub remote_configured: bool,
    pub origins: KnowledgeOrigins,
}

// ── Cache slot ────────────────────────────────────────────────────────────────

/// Cache state for one collection.
struct CacheSlot<T> {
    entries: RwLock<Option<Arc<Vec<T>>>>,
    /// Serializes fetches for this collection.
    fetch_gate: Mutex<()>,
    /// Number of fetches that have completed, successful or not.
    completed_fetches: AtomicU64,
}

impl<T> CacheSlot<T> {
    fn new() -> Self {
        Self {
            entries: RwLock::new(None),
            fetch_gate: Mutex::new(()),
            completed_fetches: AtomicU64::new(0),
        }
    }

    fn cached(&self) -> Option<Arc<Vec<T>>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn invalidate(&self) {
        *self.entries.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Return the cached collection, or run `fetch` once on behalf of every
    /// caller currently waiting. `None` means the caller should fall back.
    fn resolve<F>(&self, kind: CollectionKind, source_name: &str, fetch: F) -> Option<Resolved<T>>
    where
        F: FnOnce() -> SafetyResult<Vec<T>>,
    {
        if let Some(entries) = self.cached() {
            return Some(Resolved {
                entries,
                origin: KnowledgeOrigin::Cache,
            });
        }

        let observed = self.completed_fetches.load(Ordering::Acquire);
        let _gate = self.fetch_gate.lock().unwrap_or_else(PoisonError::into_inner);

        // Another caller may have populated the cache while we waited.
        if let Some(entries) = self.cached() {
            return Some(Resolved {
                entries,
                origin: KnowledgeOrigin::Cache,
            });
        }

        // A fetch finished while we waited and left the cache empty; share
        // its outcome rather than issuing a duplicate request.
        if self.completed_fetches.load(Ordering::Acquire) != observed {
            debug!(collection = %kind, "joined a fetch that produced nothing");
            return None;
        }

        let outcome = fetch();
        self.completed_fetches.fetch_add(1, Ordering::AcqRel);

        match outcome {
            Ok(entries) if !entries.is_empty() => {
                info!(
                    collection = %kind,
                    source = %source_name,
                    count = entries.len(),
                    "knowledge collection cached"
                );
                let entries = Arc::new(entries);
                *self.entries.write().unwrap_or_else(PoisonError::into_inner) =
                    Some(Arc::clone(&entries));
                Some(Resolved {
                    entries,
                    origin: KnowledgeOrigin::Remote,
                })
            }
            Ok(_) => {
                warn!(
                    collection = %kind,
                    source = %source_name,
                    "remote collection is empty; using embedded fallback"
                );
                None
            }
            Err(e) => {
                warn!(
                    collection = %kind,
                    source = %source_name,
                    error = %e,
                    "remote collection unavailable; using embedded fallback"
                );
                None
            }
        }
    }
}

// ── Provider ──────────────────────────────────────────────────────────────────

/// Supplies the three knowledge-base collections to the enrichment engine.
///
/// Construct once and share behind an `Arc`; every method takes `&self`.
pub struct KnowledgeBaseProvider {
    remote: Option<Box<dyn KnowledgeSource>>,
    /// Shared with every fallback read, never copied.
    fallback: KnowledgeBase,
    interactions: CacheSlot<InteractionEntry>,
    contraindications: CacheSlot<ContraindicationEntry>,
    allergy_mappings: CacheSlot<AllergyMapping>,
}

impl KnowledgeBaseProvider {
    /// A provider over `remote` (if any) with `fallback` as the last resort.
    pub fn new(remote: Option<Box<dyn KnowledgeSource>>, fallback: FallbackDataset) -> Self {
        Self {
            remote,
            fallback: KnowledgeBase::new(
                fallback.interactions,
                fallback.contraindications,
                fallback.allergy_mappings,
            ),
            interactions: CacheSlot::new(),
            contraindications: CacheSlot::new(),
            allergy_mappings: CacheSlot::new(),
        }
    }

    /// A provider that only ever serves the embedded dataset.
    pub fn embedded_only() -> SafetyResult<Self> {
        Ok(Self::new(None, FallbackDataset::embedded()?))
    }

    /// Build a provider from configuration.
    ///
    /// `remote_url` takes precedence over `dataset_file`. With neither, the
    /// provider serves the embedded dataset only.
    pub fn from_config(config: &KnowledgeBaseConfig) -> SafetyResult<Self> {
        let fallback = FallbackDataset::embedded()?;

        let remote: Option<Box<dyn KnowledgeSource>> =
            match (&config.remote_url, &config.dataset_file) {
                (Some(url), _) => {
                    info!(url = %url, "remote knowledge store configured");
                    Some(Box::new(HttpKnowledgeSource::new(
                        url,
                        config.api_key(),
                        config.timeout_secs,
                    )?))
                }
                (None, Some(path)) => {
                    info!(path = %path.display(), "local knowledge dataset configured");
                    Some(Box::new(StaticKnowledgeSource::new(
                        path.display().to_string(),
                        FallbackDataset::from_file(path)?,
                    )))
                }
                (None, None) => {
                    info!("no knowledge source configured; serving embedded dataset");
                    None
                }
            };

        Ok(Self::new(remote, fallback))
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    fn source_name(&self) -> &str {
        self.remote.as_deref().map_or("none", |r| r.name())
    }

    pub fn interactions(&self) -> Resolved<InteractionEntry> {
        let kind = CollectionKind::Interactions;
        let resolved = match &self.remote {
            Some(remote) => self
                .interactions
                .resolve(kind, self.source_name(), || remote.fetch_interactions()),
            None => None,
        };
        resolved.unwrap_or_else(|| fallback(&self.fallback.interactions))
    }

    pub fn contraindications(&self) -> Resolved<ContraindicationEntry> {
        let kind = CollectionKind::Contraindications;
        let resolved = match &self.remote {
            Some(remote) => self
                .contraindications
                .resolve(kind, self.source_name(), || remote.fetch_contraindications()),
            None => None,
        };
        resolved.unwrap_or_else(|| fallback(&self.fallback.contraindications))
    }

    pub fn allergy_mappings(&self) -> Resolved<AllergyMapping> {
        let kind = CollectionKind::AllergyMappings;
        let resolved = match &self.remote {
            Some(remote) => self
                .allergy_mappings
                .resolve(kind, self.source_name(), || remote.fetch_allergy_mappings()),
            None => None,
        };
        resolved.unwrap_or_else(|| fallback(&self.fallback.allergy_mappings))
    }

    /// Resolve all three collections into one immutable snapshot.
    pub fn snapshot(&self) -> KnowledgeBase {
        let interactions = self.interactions();
        let contraindications = self.contraindications();
        let allergy_mappings = self.allergy_mappings();

        KnowledgeBase {
            interactions: interactions.entries,
            contraindications: contraindications.entries,
            allergy_mappings: allergy_mappings.entries,
            origins: KnowledgeOrigins {
                interactions: interactions.origin,
                contraindications: contraindications.origin,
                allergy_mappings: allergy_mappings.origin,
            },
        }
    }

    /// Drop the cached copy of one collection. The next read refetches.
    pub fn invalidate(&self, kind: CollectionKind) {
        debug!(collection = %kind, "invalidating cached knowledge collection");
        match kind {
            CollectionKind::Interactions => self.interactions.invalidate(),
            CollectionKind::Contraindications => self.contraindications.invalidate(),
            CollectionKind::AllergyMappings => self.allergy_mappings.invalidate(),
        }
    }

    pub fn invalidate_all(&self) {
        for kind in CollectionKind::ALL {
            self.invalidate(kind);
        }
    }

    /// Sizes of the collections the provider would serve right now.
    pub fn stats(&self) -> KnowledgeStats {
        let kb = self.snapshot();
        KnowledgeStats {
            interactions: kb.interactions.len(),
            contraindications: kb.contraindications.len(),
            allergy_mappings: kb.allergy_mappings.len(),
            remote_configured: self.has_remote(),
            origins: kb.origins,
        }
    }
}

fn fallback<T>(entries: &Arc<Vec<T>>) -> Resolved<T> {
    Resolved {
        entries: Arc::clone(entries),
        origin: KnowledgeOrigin::Fallback,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
