//! # rxguard-engine
//!
//! Clinical safety enrichment for treatment drafts.
//!
//! This crate provides:
//! - Name normalization and the pluggable [`TermMatcher`]
//! - The three knowledge-base scans (interactions, contraindications,
//!   allergy conflicts) and their deduplication against the draft
//! - The monotonic risk escalator
//! - [`enrich`], the pure pipeline, and [`EnrichmentEngine`], which wires it
//!   to a shared [`KnowledgeBaseProvider`](rxguard_knowledge::KnowledgeBaseProvider)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use rxguard_engine::EnrichmentEngine;
//! use rxguard_knowledge::KnowledgeBaseProvider;
//!
//! let engine = EnrichmentEngine::new(Arc::new(KnowledgeBaseProvider::embedded_only()?));
//! let outcome = engine.run(draft, &patient);
//! ```

pub mod dedup;
pub mod engine;
pub mod escalator;
pub mod matcher;
pub mod normalize;
pub mod orchestrator;

pub use engine::{EnrichmentEngine, EnrichmentOutcome, EnrichmentReport, RiskSnapshot};
pub use escalator::{Escalation, EscalationPass};
pub use matcher::{SubstringMatcher, TermMatcher};
pub use orchestrator::{enrich, enrich_with_trace, EnrichmentTrace};
