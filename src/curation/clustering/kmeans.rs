//! K-means over dense numeric vectors.
//!
//! Centroids are initialised with k-means++ driven by a fixed seed, so the
//! same points always produce the same assignments.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Parameters for a k-means run.
#[derive(Debug, Clone, PartialEq)]
pub struct KMeansSettings {
    /// Seed for centroid initialisation.
    pub seed: u64,
    /// Upper bound on assignment/update rounds.
    pub max_iterations: usize,
}

impl Default for KMeansSettings {
    fn default() -> Self {
        Self {
            seed: 42,
            max_iterations: 300,
        }
    }
}

/// Cluster `points` into `k` groups, returning the cluster index of each
/// point.
///
/// All points must have the same dimension. Some clusters may end up
/// empty when centroids collapse onto the same points.
pub fn kmeans(points: &[Vec<f64>], k: usize, settings: &KMeansSettings) -> Vec<usize> {
    if points.is_empty() || k == 0 {
        return vec![0; points.len()];
    }

    let mut rng = StdRng::seed_from_u64(settings.seed);
    let mut centroids = initialize_centroids(points, k, &mut rng);
    let mut assignments: Vec<usize> = points
        .iter()
        .map(|p| nearest_centroid(p, &centroids))
        .collect();

    let mut iteration = 0;
    loop {
        iteration += 1;
        if iteration > settings.max_iterations {
            break;
        }

        centroids = recompute_centroids(points, &assignments, &centroids);

        let mut changed = false;
        for (point, assignment) in points.iter().zip(assignments.iter_mut()) {
            let nearest = nearest_centroid(point, &centroids);
            if nearest != *assignment {
                *assignment = nearest;
                changed = true;
            }
        }

        if !changed {
            break;
        }
    }

    debug!(
        points = points.len(),
        k,
        iterations = iteration.min(settings.max_iterations),
        "K-means finished"
    );

    assignments
}

/// Squared Euclidean distance.
fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}

/// k-means++: first centroid uniform, the rest proportional to squared
/// distance from the closest centroid chosen so far.
fn initialize_centroids<R: Rng>(points: &[Vec<f64>], k: usize, rng: &mut R) -> Vec<Vec<f64>> {
    let mut centroids: Vec<Vec<f64>> = Vec::with_capacity(k);
    centroids.push(points[rng.random_range(0..points.len())].clone());

    while centroids.len() < k {
        let weights: Vec<f64> = points
            .iter()
            .map(|p| {
                centroids
                    .iter()
                    .map(|c| squared_distance(p, c))
                    .fold(f64::INFINITY, f64::min)
            })
            .collect();
        let total: f64 = weights.iter().sum();

        let chosen = if total > 0.0 {
            let mut target = rng.random::<f64>() * total;
            let mut chosen = points.len() - 1;
            for (i, weight) in weights.iter().enumerate() {
                if target < *weight {
                    chosen = i;
                    break;
                }
                target -= weight;
            }
            chosen
        } else {
            // Every point already coincides with a centroid
            0
        };
        centroids.push(points[chosen].clone());
    }

    centroids
}

/// Index of the closest centroid; ties go to the lowest index.
fn nearest_centroid(point: &[f64], centroids: &[Vec<f64>]) -> usize {
    let mut best_idx = 0;
    let mut best_distance = f64::INFINITY;
    for (i, centroid) in centroids.iter().enumerate() {
        let distance = squared_distance(point, centroid);
        if distance < best_distance {
            best_distance = distance;
            best_idx = i;
        }
    }
    best_idx
}

/// Mean of each cluster's members. Empty clusters keep their previous
/// centroid.
fn recompute_centroids(
    points: &[Vec<f64>],
    assignments: &[usize],
    previous: &[Vec<f64>],
) -> Vec<Vec<f64>> {
    let dim = points[0].len();
    let mut sums = vec![vec![0.0; dim]; previous.len()];
    let mut counts = vec![0_usize; previous.len()];

    for (point, &cluster) in points.iter().zip(assignments) {
        counts[cluster] += 1;
        for (sum, value) in sums[cluster].iter_mut().zip(point) {
            *sum += value;
        }
    }

    sums.into_iter()
        .zip(counts)
        .zip(previous)
        .map(|((sum, count), prev)| {
            if count == 0 {
                prev.clone()
            } else {
                sum.into_iter().map(|s| s / count as f64).collect()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blobs() -> Vec<Vec<f64>> {
        vec![
            vec![0.0, 0.0],
            vec![0.1, 0.0],
            vec![0.0, 0.1],
            vec![5.0, 5.0],
            vec![5.1, 5.0],
            vec![5.0, 5.1],
        ]
    }

    #[test]
    fn test_separates_obvious_groups() {
        let assignments = kmeans(&blobs(), 2, &KMeansSettings::default());
        assert_eq!(assignments[0], assignments[1]);
        assert_eq!(assignments[0], assignments[2]);
        assert_eq!(assignments[3], assignments[4]);
        assert_eq!(assignments[3], assignments[5]);
        assert_ne!(assignments[0], assignments[3]);
    }

    #[test]
    fn test_deterministic_for_fixed_seed() {
        let points: Vec<Vec<f64>> = (0..40)
            .map(|i| vec![(i % 7) as f64 * 0.13, (i % 5) as f64 * 0.21, (i % 3) as f64])
            .collect();
        let settings = KMeansSettings::default();
        assert_eq!(kmeans(&points, 4, &settings), kmeans(&points, 4, &settings));
    }

    #[test]
    fn test_assignments_in_range() {
        let assignments = kmeans(&blobs(), 3, &KMeansSettings::default());
        assert_eq!(assignments.len(), 6);
        assert!(assignments.iter().all(|a| *a < 3));
    }

    #[test]
    fn test_more_clusters_than_distinct_points() {
        let points = vec![vec![1.0, 1.0], vec![1.0, 1.0], vec![1.0, 1.0]];
        let assignments = kmeans(&points, 3, &KMeansSettings::default());
        assert!(assignments.iter().all(|a| *a == assignments[0]));
    }

    #[test]
    fn test_empty_input() {
        assert!(kmeans(&[], 3, &KMeansSettings::default()).is_empty());
    }
}
