//! `EnrichmentEngine`: the provider-backed entry point for one enrichment run.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use rxguard_contracts::{
    analysis::{
        ContraindicationFinding, DraftRecommendation, DrugInteractionFinding, EnrichedAnalysis,
        RiskLevel,
    },
    patient::PatientProfile,
};
use rxguard_knowledge::{KnowledgeBaseProvider, KnowledgeOrigins};

use crate::escalator::Escalation;
use crate::matcher::{SubstringMatcher, TermMatcher};
use crate::orchestrator::enrich_with_trace;

/// Summary of one run, handed to the audit collaborator with the analysis.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichmentReport {
    pub run_id: Uuid,
    pub completed_at: DateTime<Utc>,
    pub proposed_medication: Option<String>,
    pub knowledge_origins: KnowledgeOrigins,
    pub risk_before: RiskSnapshot,
    pub risk_after: RiskSnapshot,
    pub appended_interactions: Vec<DrugInteractionFinding>,
    pub appended_contraindications: Vec<ContraindicationFinding>,
    pub suppressed_findings: usize,
    pub escalations: Vec<Escalation>,
    pub skipped: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskSnapshot {
    pub level: RiskLevel,
    pub score: f64,
}

impl RiskSnapshot {
    fn of(analysis: &DraftRecommendation) -> Self {
        Self {
            level: analysis.overall_risk_level,
            score: analysis.risk_score,
        }
    }
}

/// The enriched analysis together with its report.
#[derive(Debug, Clone)]
pub struct EnrichmentOutcome {
    pub analysis: EnrichedAnalysis,
    pub report: EnrichmentReport,
}

/// Runs the enrichment pipeline against a shared knowledge-base provider.
///
/// Cheap to clone the provider handle; construct one engine per process and
/// call [`run`](Self::run) from as many threads as needed.
pub struct EnrichmentEngine {
    provider: Arc<KnowledgeBaseProvider>,
    matcher: Box<dyn TermMatcher>,
}

impl EnrichmentEngine {
    pub fn new(provider: Arc<KnowledgeBaseProvider>) -> Self {
        Self {
            provider,
            matcher: Box::new(SubstringMatcher),
        }
    }

    /// Replace the default substring matcher.
    pub fn with_matcher(mut self, matcher: Box<dyn TermMatcher>) -> Self {
        self.matcher = matcher;
        self
    }

    pub fn provider(&self) -> &Arc<KnowledgeBaseProvider> {
        &self.provider
    }

    /// Enrich `draft` for `patient`.
    ///
    /// Resolves the knowledge base first (the only step that may touch the
    /// network), then runs the pure pipeline over that snapshot.
    pub fn run(&self, draft: DraftRecommendation, patient: &PatientProfile) -> EnrichmentOutcome {
        let run_id = Uuid::new_v4();
        let kb = self.provider.snapshot();
        let risk_before = RiskSnapshot::of(&draft);
        let proposed_medication = draft.proposed_medication().map(str::to_string);

        let (analysis, trace) = enrich_with_trace(draft, patient, &kb, self.matcher.as_ref());
        let risk_after = RiskSnapshot::of(&analysis);

        info!(
            run_id = %run_id,
            proposed = proposed_medication.as_deref().unwrap_or("<none>"),
            appended_interactions = trace.appended_interactions.len(),
            appended_contraindications = trace.appended_contraindications.len(),
            risk_before = %risk_before.level,
            risk_after = %risk_after.level,
            score_after = risk_after.score,
            "enrichment run complete"
        );

        let report = EnrichmentReport {
            run_id,
            completed_at: Utc::now(),
            proposed_medication,
            knowledge_origins: kb.origins,
            risk_before,
            risk_after,
            suppressed_findings: trace.suppressed_interactions
                + trace.suppressed_contraindications
                + trace.suppressed_allergy_conflicts,
            appended_interactions: trace.appended_interactions,
            appended_contraindications: trace.appended_contraindications,
            escalations: trace.escalations,
            skipped: trace.skipped,
        };

        EnrichmentOutcome { analysis, report }
    }
}
