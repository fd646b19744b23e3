use theseus::core::models::element::Element;
use theseus::engine::state::VariantId;
use theseus::workflows::evolve::VariantSummary;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unknown element symbol '{0}' in vocabulary. Use capitalised symbols such as 'C', 'N' or 'Cl'.")]
    UnknownElement(String),

    #[error("Component '{component}' cannot be empty in '{input}'.")]
    EmptyComponent {
        component: &'static str,
        input: String,
    },

    #[error("Rank {rank} is out of range; choose between 1 and {available}.")]
    RankOutOfRange { rank: usize, available: usize },

    #[error("Variant {0} is not among the listed candidates.")]
    UnlistedVariant(VariantId),

    #[error("Cannot understand '{0}'. Enter a rank, a variant id such as 'g2-17', or 'q' to stop.")]
    InvalidSelection(String),
}

/// Parses a comma-separated list of element symbols. An empty string is an empty
/// vocabulary; empty items between commas are rejected.
pub fn parse_vocabulary(input: &str) -> Result<Vec<Element>, ParseError> {
    if input.trim().is_empty() {
        return Ok(Vec::new());
    }
    input
        .split(',')
        .map(str::trim)
        .map(|symbol| {
            if symbol.is_empty() {
                return Err(ParseError::EmptyComponent {
                    component: "element symbol",
                    input: input.to_string(),
                });
            }
            Element::from_symbol(symbol).ok_or_else(|| ParseError::UnknownElement(symbol.to_string()))
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Variant(VariantId),
    Stop,
}

/// Interprets a reply to the selection prompt: a 1-based rank into `candidates`, a
/// variant id among them, or `q`/`quit` to stop.
pub fn parse_selection(input: &str, candidates: &[VariantSummary]) -> Result<Selection, ParseError> {
    let input = input.trim();
    if input.eq_ignore_ascii_case("q") || input.eq_ignore_ascii_case("quit") {
        return Ok(Selection::Stop);
    }
    if let Ok(rank) = input.parse::<usize>() {
        return match rank.checked_sub(1).and_then(|i| candidates.get(i)) {
            Some(candidate) => Ok(Selection::Variant(candidate.id)),
            None => Err(ParseError::RankOutOfRange {
                rank,
                available: candidates.len(),
            }),
        };
    }
    let id: VariantId = input
        .parse()
        .map_err(|_| ParseError::InvalidSelection(input.to_string()))?;
    if candidates.iter().any(|c| c.id == id) {
        Ok(Selection::Variant(id))
    } else {
        Err(ParseError::UnlistedVariant(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use theseus::core::io::smiles::SmilesAdapter;
    use theseus::core::io::traits::StructureAdapter;
    use theseus::core::scoring::FitnessWeights;
    use theseus::engine::state::Variant;

    fn candidates() -> Vec<VariantSummary> {
        let molecule = SmilesAdapter::default().parse("CCO").unwrap();
        let seed = Variant::seed(molecule, &FitnessWeights::default());
        (0..3)
            .map(|i| {
                let mut v = seed.clone();
                v.id = VariantId::new(2, i * 10);
                VariantSummary::from(&v)
            })
            .collect()
    }

    #[test]
    fn vocabulary_accepts_trimmed_symbols() {
        assert_eq!(
            parse_vocabulary(" C, N ,Cl").unwrap(),
            vec![Element::C, Element::N, Element::Cl]
        );
        assert!(parse_vocabulary("").unwrap().is_empty());
    }

    #[test]
    fn vocabulary_rejects_unknown_and_empty_symbols() {
        assert_eq!(
            parse_vocabulary("C,Xx"),
            Err(ParseError::UnknownElement("Xx".to_string()))
        );
        assert!(matches!(
            parse_vocabulary("C,,N"),
            Err(ParseError::EmptyComponent { .. })
        ));
        assert!(parse_vocabulary("cl").is_err());
    }

    #[test]
    fn selection_understands_ranks_ids_and_quit() {
        let candidates = candidates();
        assert_eq!(
            parse_selection("2", &candidates),
            Ok(Selection::Variant(VariantId::new(2, 10)))
        );
        assert_eq!(
            parse_selection(" g2-20 ", &candidates),
            Ok(Selection::Variant(VariantId::new(2, 20)))
        );
        assert_eq!(parse_selection("Q", &candidates), Ok(Selection::Stop));
    }

    #[test]
    fn selection_rejects_out_of_range_and_unlisted_choices() {
        let candidates = candidates();
        assert_eq!(
            parse_selection("0", &candidates),
            Err(ParseError::RankOutOfRange {
                rank: 0,
                available: 3
            })
        );
        assert_eq!(
            parse_selection("4", &candidates),
            Err(ParseError::RankOutOfRange {
                rank: 4,
                available: 3
            })
        );
        assert_eq!(
            parse_selection("g2-5", &candidates),
            Err(ParseError::UnlistedVariant(VariantId::new(2, 5)))
        );
        assert!(matches!(
            parse_selection("best one", &candidates),
            Err(ParseError::InvalidSelection(_))
        ));
    }
}
