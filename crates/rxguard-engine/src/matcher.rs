//! Matching patient and proposed terms against knowledge-base entries.
//!
//! Term comparison sits behind [`TermMatcher`] so the substring heuristic can
//! be replaced by a canonical drug dictionary without touching dedup,
//! escalation or orchestration. The three collection scans below only decide
//! which sides get compared and how they are normalized:
//!
//! - medication names from the patient or the draft go through
//!   [`normalize`] (first word, lowercased);
//! - curated knowledge-base names, conditions and allergies go through
//!   [`fold`] (whole phrase, lowercased).

use tracing::debug;

use rxguard_contracts::knowledge::{AllergyMapping, ContraindicationEntry, InteractionEntry};

use crate::normalize::{fold, normalize};

/// Decides whether two already-normalized terms refer to the same thing.
///
/// Implementations must be symmetric: `matches(a, b) == matches(b, a)`.
pub trait TermMatcher: Send + Sync {
    fn matches(&self, a: &str, b: &str) -> bool;
}

/// Bidirectional substring containment.
///
/// Known to over-match ("morphine" is contained in "dihydromorphine").
/// An empty term never matches, since every string contains "".
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstringMatcher;

impl TermMatcher for SubstringMatcher {
    fn matches(&self, a: &str, b: &str) -> bool {
        terms_match(a, b)
    }
}

/// `a` contains `b` or `b` contains `a`; false if either is empty.
pub fn terms_match(a: &str, b: &str) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a.contains(b) || b.contains(a)
}

// ── Interaction match ─────────────────────────────────────────────────────────

/// An interaction entry matched to a specific pair of medications.
#[derive(Debug, Clone, Copy)]
pub struct InteractionMatch<'kb> {
    /// Indices of the pair in the medication list, `i < j`.
    pub pair: (usize, usize),
    pub entry: &'kb InteractionEntry,
}

/// Scan every unordered pair of `medications` for a known interaction.
///
/// `medications` is the patient's current list followed by the proposed
/// drug. For each pair `(i, j)` with `i < j`, entries are tried in stored
/// order and the first one matching in either orientation is returned. Later
/// entries that would also match the pair are not reported.
pub fn find_interactions<'kb, S: AsRef<str>>(
    matcher: &dyn TermMatcher,
    medications: &[S],
    entries: &'kb [InteractionEntry],
) -> Vec<InteractionMatch<'kb>> {
    let names: Vec<String> = medications.iter().map(|m| normalize(m.as_ref())).collect();
    let folded: Vec<(String, String)> = entries
        .iter()
        .map(|e| (fold(&e.drug_a), fold(&e.drug_b)))
        .collect();

    let mut found = Vec::new();
    for i in 0..names.len() {
        for j in (i + 1)..names.len() {
            let (first, second) = (&names[i], &names[j]);

            let hit = entries.iter().zip(&folded).find(|(_, (a, b))| {
                (matcher.matches(first, a) && matcher.matches(second, b))
                    || (matcher.matches(first, b) && matcher.matches(second, a))
            });

            if let Some((entry, _)) = hit {
                debug!(
                    drug_a = %entry.drug_a,
                    drug_b = %entry.drug_b,
                    first = %first,
                    second = %second,
                    "interaction entry matched"
                );
                found.push(InteractionMatch {
                    pair: (i, j),
                    entry,
                });
            }
        }
    }
    found
}

// ── Contraindication match ────────────────────────────────────────────────────

/// Every contraindication of `proposed` that applies to one of `conditions`.
pub fn find_contraindications<'kb, S: AsRef<str>>(
    matcher: &dyn TermMatcher,
    proposed: &str,
    conditions: &[S],
    entries: &'kb [ContraindicationEntry],
) -> Vec<&'kb ContraindicationEntry> {
    let drug = normalize(proposed);
    let conditions: Vec<String> = conditions.iter().map(|c| fold(c.as_ref())).collect();

    entries
        .iter()
        .filter(|entry| {
            let entry_condition = fold(&entry.condition);
            matcher.matches(&drug, &fold(&entry.drug))
                && conditions
                    .iter()
                    .any(|c| matcher.matches(c, &entry_condition))
        })
        .inspect(|entry| {
            debug!(
                drug = %entry.drug,
                condition = %entry.condition,
                "contraindication entry matched"
            )
        })
        .collect()
}

// ── Allergy conflict match ────────────────────────────────────────────────────

/// Every allergy mapping for which the patient has the allergy and `proposed`
/// is a listed cross-reactant.
pub fn find_allergy_conflicts<'kb, S: AsRef<str>>(
    matcher: &dyn TermMatcher,
    allergies: &[S],
    proposed: &str,
    mappings: &'kb [AllergyMapping],
) -> Vec<&'kb AllergyMapping> {
    let drug = normalize(proposed);
    let allergies: Vec<String> = allergies.iter().map(|a| fold(a.as_ref())).collect();

    mappings
        .iter()
        .filter(|mapping| {
            let allergy = fold(&mapping.allergy);
            allergies.iter().any(|a| matcher.matches(a, &allergy))
                && mapping
                    .cross_reactants
                    .iter()
                    .any(|r| matcher.matches(&drug, &fold(r)))
        })
        .inspect(|mapping| debug!(allergy = %mapping.allergy, "allergy conflict matched"))
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use rxguard_contracts::knowledge::{ContraindicationSeverity, InteractionSeverity};
    use rxguard_knowledge::KnowledgeBase;

    use super::*;

    fn kb() -> KnowledgeBase {
        KnowledgeBase::embedded().unwrap()
    }

    fn interaction(a: &str, b: &str, severity: InteractionSeverity) -> InteractionEntry {
        InteractionEntry {
            drug_a: a.to_string(),
            drug_b: b.to_string(),
            severity,
            description: format!("{a} with {b}"),
            mechanism: String::new(),
        }
    }

    // ── terms_match ──────────────────────────────────────────────────────────

    #[test]
    fn terms_match_is_symmetric() {
        let terms = [
            "warfarin",
            "aspirin",
            "morphine",
            "dihydromorphine",
            "contrast dye",
            "contrast",
            "",
        ];
        for a in terms {
            for b in terms {
                assert_eq!(
                    terms_match(a, b),
                    terms_match(b, a),
                    "asymmetric result for ({a:?}, {b:?})"
                );
            }
        }
    }

    #[test]
    fn terms_match_is_containment_either_way() {
        assert!(terms_match("contrast", "contrast dye"));
        assert!(terms_match("contrast dye", "contrast"));
        // The documented over-match.
        assert!(terms_match("morphine", "dihydromorphine"));
        assert!(!terms_match("warfarin", "aspirin"));
    }

    #[test]
    fn empty_terms_never_match() {
        assert!(!terms_match("", "warfarin"));
        assert!(!terms_match("warfarin", ""));
        assert!(!terms_match("", ""));
    }

    // ── Interactions ─────────────────────────────────────────────────────────

    #[test]
    fn finds_interaction_in_either_orientation() {
        let kb = kb();
        let forward =
            find_interactions(&SubstringMatcher, &["Warfarin 5mg", "Aspirin"], &kb.interactions);
        let reverse =
            find_interactions(&SubstringMatcher, &["Aspirin 81mg", "warfarin"], &kb.interactions);

        assert_eq!(forward.len(), 1);
        assert_eq!(reverse.len(), 1);
        assert_eq!(forward[0].entry.drug_a, "warfarin");
        assert_eq!(reverse[0].entry.drug_b, "aspirin");
        assert_eq!(reverse[0].pair, (0, 1));
    }

    #[test]
    fn every_pair_is_checked_including_current_medications() {
        let kb = kb();
        let meds = ["Simvastatin", "Gemfibrozil", "Clopidogrel", "Omeprazole 20mg"];
        let found = find_interactions(&SubstringMatcher, &meds, &kb.interactions);

        let pairs: Vec<(usize, usize)> = found.iter().map(|m| m.pair).collect();
        assert_eq!(pairs, vec![(0, 1), (2, 3)]);
    }

    #[test]
    fn first_stored_entry_wins_per_pair() {
        let entries = vec![
            interaction("warfarin", "aspirin", InteractionSeverity::Moderate),
            interaction("warfarin", "aspirin", InteractionSeverity::Major),
        ];
        let found = find_interactions(&SubstringMatcher, &["warfarin", "aspirin"], &entries);

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].entry.severity, InteractionSeverity::Moderate);
    }

    #[test]
    fn single_medication_has_no_pairs() {
        let kb = kb();
        assert!(find_interactions(&SubstringMatcher, &["Warfarin"], &kb.interactions).is_empty());
    }

    // ── Contraindications ────────────────────────────────────────────────────

    #[test]
    fn contraindication_needs_drug_and_condition() {
        let kb = kb();
        let found = find_contraindications(
            &SubstringMatcher,
            "Lisinopril 10mg",
            &["Pregnancy", "Asthma"],
            &kb.contraindications,
        );

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].condition, "pregnancy");
        assert_eq!(found[0].severity, ContraindicationSeverity::Absolute);

        let none = find_contraindications(
            &SubstringMatcher,
            "Amlodipine",
            &["Pregnancy"],
            &kb.contraindications,
        );
        assert!(none.is_empty());
    }

    #[test]
    fn condition_phrases_are_not_truncated_to_first_word() {
        let kb = kb();
        // "Severe bradycardia" must not match "severe heart failure".
        let found = find_contraindications(
            &SubstringMatcher,
            "Sildenafil",
            &["Severe bradycardia"],
            &kb.contraindications,
        );
        assert!(found.is_empty());
    }

    #[test]
    fn returns_every_matching_contraindication() {
        let kb = kb();
        let found = find_contraindications(
            &SubstringMatcher,
            "sildenafil",
            &["unstable angina", "severe heart failure"],
            &kb.contraindications,
        );
        assert_eq!(found.len(), 2);
    }

    // ── Allergy conflicts ────────────────────────────────────────────────────

    #[test]
    fn penicillin_allergy_conflicts_with_amoxicillin() {
        let kb = kb();
        let found = find_allergy_conflicts(
            &SubstringMatcher,
            &["penicillin"],
            "Amoxicillin",
            &kb.allergy_mappings,
        );

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].allergy, "penicillin");
    }

    #[test]
    fn allergy_without_cross_reactant_is_not_a_conflict() {
        let kb = kb();
        let found = find_allergy_conflicts(
            &SubstringMatcher,
            &["penicillin"],
            "Azithromycin",
            &kb.allergy_mappings,
        );
        assert!(found.is_empty());
    }

    #[test]
    fn one_drug_can_conflict_with_several_allergies() {
        let kb = kb();
        // Ibuprofen is a cross-reactant of both the aspirin and NSAID mappings.
        let found = find_allergy_conflicts(
            &SubstringMatcher,
            &["Aspirin", "NSAIDs"],
            "Ibuprofen 400mg",
            &kb.allergy_mappings,
        );

        let allergies: Vec<&str> = found.iter().map(|m| m.allergy.as_str()).collect();
        assert_eq!(allergies, vec!["aspirin", "nsaids"]);
    }
}
