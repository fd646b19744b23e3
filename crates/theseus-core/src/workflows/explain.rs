use super::evolve::VariantSummary;
use itertools::Itertools;
use thiserror::Error;

/// Failures of explainers backed by an outside service. The offline
/// [`TemplateExplainer`] never fails.
#[derive(Debug, Error)]
pub enum ExplainError {
    #[error("Explanation service unavailable: {0}")]
    Unavailable(String),
    #[error("Cannot explain variant {id}: {reason}")]
    Rejected { id: String, reason: String },
}

/// Turns a variant summary into prose for a reader.
///
/// The engine never calls an explainer itself. Callers pair its output with whichever
/// implementation they have, be it a language-model client or the offline
/// [`TemplateExplainer`].
pub trait Explainer {
    fn explain(&self, summary: &VariantSummary) -> Result<String, ExplainError>;
}

impl<E: Explainer + ?Sized> Explainer for &E {
    fn explain(&self, summary: &VariantSummary) -> Result<String, ExplainError> {
        (**self).explain(summary)
    }
}

/// Deterministic explanations assembled from descriptors and screening flags.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateExplainer;

impl Explainer for TemplateExplainer {
    fn explain(&self, summary: &VariantSummary) -> Result<String, ExplainError> {
        let d = &summary.descriptors;
        let f = &summary.fitness;
        let mut text = format!("Variant {} ({}) scores {:.3}", summary.id, d.formula, f.score);
        if f.confidence < 1.0 {
            text += &format!(" at {:.0}% descriptor confidence", f.confidence * 100.0);
        }
        text.push('.');

        if summary.mutations_this_step.is_empty() {
            text.push_str(" It is the unmodified seed.");
        } else {
            let parent = summary
                .parent_id
                .map_or_else(|| "its parent".to_string(), |id| id.to_string());
            text += &format!(
                " It differs from {parent} by {} ({} edits since the seed).",
                summary.mutations_this_step.iter().join(", "),
                summary.cumulative_mutation_count
            );
        }

        text += &format!(" MW {:.1}", d.molecular_weight);
        if let Some(logp) = d.logp {
            text += &format!(", logP {logp:.2}");
        }
        if let Some(tpsa) = d.tpsa {
            text += &format!(", TPSA {tpsa:.1}");
        }
        text += &format!(", {} donors, {} acceptors.", d.hbd, d.hba);

        let mut notes = Vec::new();
        if f.rule_of_five_compliant {
            notes.push("passes every rule-of-five threshold".to_string());
        } else {
            notes.push(format!("breaks {} rule-of-five threshold(s)", f.violations));
        }
        if f.toxicity_risk {
            notes.push("is flagged for toxicity risk".to_string());
        }
        if f.barrier_penetrant {
            notes.push("is likely to cross the blood-brain barrier".to_string());
        }
        notes.push(if f.oral_bioavailable {
            "looks orally bioavailable".to_string()
        } else {
            "is unlikely to be orally bioavailable".to_string()
        });
        if f.gi_absorption_high {
            notes.push("should be well absorbed".to_string());
        }
        text += &format!(
            " The structure {}; estimated synthetic accessibility {:.1}/10.",
            notes.iter().join("; "),
            f.synthetic_accessibility
        );

        if summary.novel_entity {
            text += &format!(
                " With a similarity of {:.2} to the seed it counts as a new chemical entity.",
                summary.similarity_to_seed
            );
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::smiles::SmilesAdapter;
    use crate::core::io::traits::StructureAdapter;
    use crate::core::scoring::FitnessWeights;
    use crate::engine::state::Variant;

    struct StubExplainer;

    impl Explainer for StubExplainer {
        fn explain(&self, summary: &VariantSummary) -> Result<String, ExplainError> {
            Ok(format!("stub for {}", summary.id))
        }
    }

    fn paracetamol() -> VariantSummary {
        let molecule = SmilesAdapter::default()
            .parse("CC(=O)Nc1ccc(O)cc1")
            .unwrap();
        VariantSummary::from(&Variant::seed(molecule, &FitnessWeights::default()))
    }

    fn explain_all<E: Explainer>(explainer: E, summaries: &[VariantSummary]) -> Vec<String> {
        summaries
            .iter()
            .map(|s| explainer.explain(s).unwrap())
            .collect()
    }

    #[test]
    fn stub_explainer_is_substitutable() {
        let texts = explain_all(&StubExplainer, &[paracetamol()]);
        assert_eq!(texts, vec!["stub for g0-0".to_string()]);
    }

    #[test]
    fn template_mentions_formula_flags_and_seed_status() {
        let text = TemplateExplainer.explain(&paracetamol()).unwrap();
        assert!(text.starts_with("Variant g0-0 (C8H9NO2)"));
        assert!(text.contains("unmodified seed"));
        assert!(text.contains("passes every rule-of-five threshold"));
        assert!(text.contains("TPSA 49.3"));
        assert!(!text.contains("new chemical entity"));
    }

    struct OfflineService;

    impl Explainer for OfflineService {
        fn explain(&self, _summary: &VariantSummary) -> Result<String, ExplainError> {
            Err(ExplainError::Unavailable("no network".into()))
        }
    }

    #[test]
    fn service_failures_surface_as_errors() {
        let err = OfflineService.explain(&paracetamol()).unwrap_err();
        assert_eq!(err.to_string(), "Explanation service unavailable: no network");

        let rejected = ExplainError::Rejected {
            id: "g1-4".into(),
            reason: "quota exceeded".into(),
        };
        assert_eq!(rejected.to_string(), "Cannot explain variant g1-4: quota exceeded");
    }

    #[test]
    fn template_is_deterministic() {
        let summary = paracetamol();
        assert_eq!(
            TemplateExplainer.explain(&summary).unwrap(),
            TemplateExplainer.explain(&summary).unwrap()
        );
    }
}
