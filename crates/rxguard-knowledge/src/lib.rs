//! # rxguard-knowledge
//!
//! The knowledge base the RXGUARD safety engine checks drafts against:
//! drug-drug interactions, drug-condition contraindications and allergy
//! cross-reactivity mappings.
//!
//! ## Overview
//!
//! [`KnowledgeBaseProvider`] resolves each collection from its cache, then a
//! remote [`KnowledgeSource`], then the embedded fallback dataset. It is an
//! explicit object, built once and shared by reference, never a global.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use rxguard_knowledge::{KnowledgeBaseProvider, RxguardConfig};
//!
//! let config = RxguardConfig::from_file(Path::new("rxguard.toml"))?;
//! let provider = Arc::new(KnowledgeBaseProvider::from_config(&config.knowledge_base)?);
//! let kb = provider.snapshot();
//! ```

pub mod config;
pub mod drug_class;
pub mod fallback;
pub mod provider;
pub mod remote;
pub mod source;

pub use config::{KnowledgeBaseConfig, RxguardConfig};
pub use drug_class::drug_class_of;
pub use fallback::{FallbackDataset, StaticKnowledgeSource};
pub use provider::{
    KnowledgeBase, KnowledgeBaseProvider, KnowledgeOrigin, KnowledgeOrigins, KnowledgeStats,
    Resolved,
};
pub use remote::HttpKnowledgeSource;
pub use source::KnowledgeSource;
