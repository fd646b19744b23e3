use super::state::Variant;
use std::cmp::Ordering;

/// Ranking order: higher score first, then fewer cumulative mutations (closer to the
/// seed). Remaining ties compare equal.
pub fn compare(a: &Variant, b: &Variant) -> Ordering {
    b.fitness
        .score
        .total_cmp(&a.fitness.score)
        .then_with(|| a.cumulative_mutation_count.cmp(&b.cumulative_mutation_count))
}

/// The population in ranking order. The sort is stable, so fully tied variants keep
/// their population order; the input slice is left untouched.
pub fn rank(population: &[Variant]) -> Vec<&Variant> {
    let mut ranked: Vec<&Variant> = population.iter().collect();
    ranked.sort_by(|a, b| compare(a, b));
    ranked
}

/// The first `k` ranked variants, or all of them when the population is smaller.
pub fn top_k(population: &[Variant], k: usize) -> Vec<&Variant> {
    let mut ranked = rank(population);
    ranked.truncate(k);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::smiles::SmilesAdapter;
    use crate::core::io::traits::StructureAdapter;
    use crate::core::scoring::FitnessWeights;
    use crate::engine::state::VariantId;

    fn variant(index: usize, score: f64, cumulative: usize) -> Variant {
        let molecule = SmilesAdapter::default().parse("CCO").unwrap();
        let mut v = Variant::seed(molecule, &FitnessWeights::default());
        v.id = VariantId::new(1, index);
        v.fitness.score = score;
        v.cumulative_mutation_count = cumulative;
        v
    }

    fn ids(ranked: &[&Variant]) -> Vec<usize> {
        ranked.iter().map(|v| v.id.index).collect()
    }

    #[test]
    fn ranks_by_score_descending() {
        let population = vec![variant(0, 0.2, 3), variant(1, 0.9, 3), variant(2, 0.5, 3)];
        assert_eq!(ids(&rank(&population)), vec![1, 2, 0]);
    }

    #[test]
    fn equal_scores_prefer_fewer_mutations_then_population_order() {
        let population = vec![
            variant(0, 0.7, 5),
            variant(1, 0.7, 3),
            variant(2, 0.7, 5),
            variant(3, 0.7, 3),
        ];
        assert_eq!(ids(&rank(&population)), vec![1, 3, 0, 2]);
    }

    #[test]
    fn top_k_truncates_without_reordering_the_input() {
        let population: Vec<Variant> = (0..8)
            .map(|i| variant(i, i as f64 / 10.0, 3))
            .collect();
        let top = top_k(&population, 5);
        assert_eq!(ids(&top), vec![7, 6, 5, 4, 3]);
        assert!(top.windows(2).all(|w| w[0].fitness.score >= w[1].fitness.score));
        assert_eq!(population[0].id.index, 0);

        assert_eq!(top_k(&population[..2], 5).len(), 2);
        assert!(top_k(&[], 5).is_empty());
    }
}
