//! Node relevance prizes from embedding similarity

use rayon::prelude::*;

/// Cosine similarity of two vectors, 0.0 if either has zero norm
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// Prize of every node: cosine similarity to the query, clamped to `[0, 1]`
pub fn compute_node_prizes(node_embeddings: &[Vec<f64>], query_embedding: &[f64]) -> Vec<f64> {
    node_embeddings
        .par_iter()
        .map(|embedding| cosine_similarity(embedding, query_embedding).clamp(0.0, 1.0))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_cosine_basics() {
        let v = [1.0, 2.0, 3.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-12);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-12);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-12);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_random_high_dimensional_vectors_are_near_orthogonal() {
        let mut rng = StdRng::seed_from_u64(42);
        let a: Vec<f64> = (0..1536).map(|_| rng.gen_range(-1.0..1.0)).collect();
        let b: Vec<f64> = (0..1536).map(|_| rng.gen_range(-1.0..1.0)).collect();
        let sim = cosine_similarity(&a, &b);
        assert!((-1.0..=1.0).contains(&sim));
        assert!(sim.abs() < 0.15);
    }

    #[test]
    fn test_prizes_are_clamped() {
        let prizes = compute_node_prizes(&[vec![-1.0, 0.0], vec![0.0, 0.0], vec![2.0, 0.0]], &[1.0, 0.0]);
        assert_eq!(prizes.len(), 3);
        assert_eq!(prizes[0], 0.0);
        assert_eq!(prizes[1], 0.0);
        assert!((prizes[2] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_prizes_bounded_for_random_embeddings() {
        let mut rng = StdRng::seed_from_u64(99);
        let embeddings: Vec<Vec<f64>> = (0..50)
            .map(|_| (0..10).map(|_| rng.gen_range(-1.0..1.0)).collect())
            .collect();
        let query: Vec<f64> = (0..10).map(|_| rng.gen_range(-1.0..1.0)).collect();
        let prizes = compute_node_prizes(&embeddings, &query);
        assert!(prizes.iter().all(|p| (0.0..=1.0).contains(p)));
    }
}
