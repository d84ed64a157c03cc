use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::core::Accumulator;
use crate::error::ClusterError;
use crate::Float;

/// A hard clustering algorithm.
///
/// Implementations assign each feature vector to exactly one cluster and
/// return the cluster ids in input order. Ids fall into `0..n_clusters()`,
/// though some clusters may end up without members. Implementations must be
/// deterministic, i.e., produce the same ids for the same inputs.
pub trait Clustering {
    /// Assign each feature vector to a cluster.
    ///
    /// The optional weights, one per vector, scale each vector's
    /// contribution.
    fn fit_predict(
        &self,
        data: &[Vec<Float>],
        weights: Option<&[Float]>,
    ) -> Result<Vec<usize>, ClusterError>;

    /// Get the number of clusters.
    fn n_clusters(&self) -> usize;

    /// Get the seed for randomized algorithms. Deterministic algorithms
    /// have none.
    fn seed(&self) -> Option<u64> {
        None
    }
}

// ====================================================================================================================

/// Weighted k-means clustering.
///
/// This implementation seeds centroids with k-means++, refines them with
/// Lloyd's algorithm, and keeps the best of several runs as measured by
/// inertia, i.e., the weighted sum of squared distances to the closest
/// centroid. A centroid that loses all its members is moved to the vector
/// farthest from its own centroid.
///
/// All randomness comes from a generator seeded with the configured seed.
/// Hence the same seed and inputs always produce the same clusters.
#[derive(Clone, Debug, PartialEq)]
pub struct KMeans {
    n_clusters: usize,
    seed: u64,
    n_init: usize,
    max_iter: usize,
    tolerance: Float,
}

impl KMeans {
    /// Create a new k-means instance with the given number of clusters and
    /// seed.
    ///
    /// The new instance performs 10 runs of up to 300 iterations each and
    /// stops a run once centroids move less than 1e-4 relative to the data's
    /// variance.
    pub fn new(n_clusters: usize, seed: u64) -> Self {
        Self {
            n_clusters,
            seed,
            n_init: 10,
            max_iter: 300,
            tolerance: 1e-4,
        }
    }

    /// Update the number of runs. At least one run is always performed.
    #[must_use = "method fluently returns updated instance and does not mutate original"]
    pub fn with_n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init;
        self
    }

    /// Update the maximum number of iterations per run.
    #[must_use = "method fluently returns updated instance and does not mutate original"]
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Update the convergence tolerance.
    #[must_use = "method fluently returns updated instance and does not mutate original"]
    pub fn with_tolerance(mut self, tolerance: Float) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Get the seed.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    fn validate(&self, data: &[Vec<Float>], weights: Option<&[Float]>) -> Result<(), ClusterError> {
        let Some(first) = data.first() else {
            return Err(ClusterError::NoData);
        };

        if self.n_clusters == 0 {
            return Err(ClusterError::NoClusters);
        } else if data.len() < self.n_clusters {
            return Err(ClusterError::TooManyClusters {
                clusters: self.n_clusters,
                points: data.len(),
            });
        }

        for (index, vector) in data.iter().enumerate() {
            if vector.len() != first.len() {
                return Err(ClusterError::RaggedData { index });
            } else if !vector.iter().all(|v| v.is_finite()) {
                return Err(ClusterError::NonFinite { index });
            }
        }

        if let Some(weights) = weights {
            if weights.len() != data.len() {
                return Err(ClusterError::WeightMismatch {
                    weights: weights.len(),
                    points: data.len(),
                });
            }
            if let Some(index) = weights.iter().position(|w| !w.is_finite() || *w < 0.0) {
                return Err(ClusterError::NonFinite { index });
            }
        }

        Ok(())
    }

    /// Perform one run, returning ids and inertia.
    fn run_once(
        &self,
        data: &[Vec<Float>],
        weights: &[Float],
        threshold: Float,
        rng: &mut StdRng,
    ) -> (Vec<usize>, Float) {
        let mut centroids = seed_centroids(data, weights, self.n_clusters, rng);
        let mut ids = vec![0; data.len()];

        for iteration in 0..self.max_iter {
            assign(data, &centroids, &mut ids);
            let updated = update_centroids(data, weights, &centroids, &mut ids);

            let shift: Float = centroids
                .iter()
                .zip(updated.iter())
                .map(|(c1, c2)| squared_distance(c1, c2))
                .sum();
            centroids = updated;

            if shift <= threshold {
                log::trace!("k-means converged after {} iterations", iteration + 1);
                break;
            }
        }

        let distances = assign(data, &centroids, &mut ids);
        let mut inertia = Accumulator::default();
        for (distance, weight) in distances.iter().zip(weights.iter()) {
            inertia += weight * distance;
        }

        (ids, inertia.total())
    }
}

impl Clustering for KMeans {
    fn fit_predict(
        &self,
        data: &[Vec<Float>],
        weights: Option<&[Float]>,
    ) -> Result<Vec<usize>, ClusterError> {
        self.validate(data, weights)?;

        let weights = weights.map_or_else(|| vec![1.0; data.len()], <[Float]>::to_vec);
        let threshold = self.tolerance * mean_variance(data);
        let mut rng = StdRng::seed_from_u64(self.seed);

        let mut best: Option<(Vec<usize>, Float)> = None;
        for run in 0..self.n_init.max(1) {
            let (ids, inertia) = self.run_once(data, &weights, threshold, &mut rng);
            log::trace!("k-means run {} has inertia {}", run + 1, inertia);

            let is_better = best
                .as_ref()
                .map_or(true, |&(_, best_inertia)| inertia < best_inertia);
            if is_better {
                best = Some((ids, inertia));
            }
        }

        let (ids, inertia) = best.ok_or(ClusterError::NoData)?;
        log::debug!(
            "k-means grouped {} vectors into {} clusters with inertia {:.3}",
            data.len(),
            self.n_clusters,
            inertia
        );
        Ok(ids)
    }

    fn n_clusters(&self) -> usize {
        self.n_clusters
    }

    fn seed(&self) -> Option<u64> {
        Some(self.seed)
    }
}

// --------------------------------------------------------------------------------------------------------------------

fn squared_distance(v1: &[Float], v2: &[Float]) -> Float {
    v1.iter()
        .zip(v2.iter())
        .map(|(c1, c2)| {
            let d = c1 - c2;
            d * d
        })
        .sum()
}

/// Compute the mean of the per-dimension variances.
fn mean_variance(data: &[Vec<Float>]) -> Float {
    let dimensions = data.first().map_or(0, Vec::len);
    if dimensions == 0 {
        return 0.0;
    }

    let n = data.len() as Float;
    let mut total = Accumulator::default();
    for dimension in 0..dimensions {
        let mut sum = Accumulator::default();
        for vector in data {
            sum += vector[dimension];
        }
        let mean = sum.total() / n;

        let mut squares = Accumulator::default();
        for vector in data {
            let d = vector[dimension] - mean;
            squares += d * d;
        }
        total += squares.total() / n;
    }

    total.total() / dimensions as Float
}

/// Choose an index with probability proportional to its weight.
///
/// This function returns `None` if the weights do not sum to a positive
/// number.
fn choose_weighted(rng: &mut StdRng, weights: &[Float]) -> Option<usize> {
    let mut total = Accumulator::default();
    for &weight in weights {
        total += weight;
    }
    let total = total.total();
    if total.is_nan() || total <= 0.0 {
        return None;
    }

    let target = rng.random::<Float>() * total;
    let mut cumulative = 0.0;
    let mut last = None;
    for (index, &weight) in weights.iter().enumerate() {
        if weight <= 0.0 {
            continue;
        }
        cumulative += weight;
        last = Some(index);
        if target < cumulative {
            return last;
        }
    }

    last
}

/// Pick initial centroids with k-means++.
fn seed_centroids(
    data: &[Vec<Float>],
    weights: &[Float],
    count: usize,
    rng: &mut StdRng,
) -> Vec<Vec<Float>> {
    let first = choose_weighted(rng, weights).unwrap_or_else(|| rng.random_range(0..data.len()));
    let mut centroids = Vec::with_capacity(count);
    centroids.push(data[first].clone());

    let mut distances: Vec<Float> = data
        .iter()
        .map(|vector| squared_distance(vector, &data[first]))
        .collect();

    while centroids.len() < count {
        let scores: Vec<Float> = distances
            .iter()
            .zip(weights.iter())
            .map(|(d, w)| d * w)
            .collect();
        let next = choose_weighted(rng, &scores).unwrap_or_else(|| rng.random_range(0..data.len()));

        let centroid = data[next].clone();
        for (distance, vector) in distances.iter_mut().zip(data.iter()) {
            *distance = distance.min(squared_distance(vector, &centroid));
        }
        centroids.push(centroid);
    }

    centroids
}

/// Assign every vector to its closest centroid.
///
/// This function returns the squared distance of each vector to its
/// centroid. Ties go to the centroid with the smaller index.
fn assign(data: &[Vec<Float>], centroids: &[Vec<Float>], ids: &mut [usize]) -> Vec<Float> {
    let mut distances = Vec::with_capacity(data.len());

    for (vector, id) in data.iter().zip(ids.iter_mut()) {
        let mut min_distance = Float::INFINITY;
        for (index, centroid) in centroids.iter().enumerate() {
            let distance = squared_distance(vector, centroid);
            if distance < min_distance {
                min_distance = distance;
                *id = index;
            }
        }
        distances.push(min_distance);
    }

    distances
}

/// Compute the weighted means of the current clusters.
///
/// A cluster without members is moved onto the vector farthest from its own
/// centroid, which then joins that cluster. A cluster whose members all have
/// zero weight keeps its centroid.
fn update_centroids(
    data: &[Vec<Float>],
    weights: &[Float],
    centroids: &[Vec<Float>],
    ids: &mut [usize],
) -> Vec<Vec<Float>> {
    let dimensions = centroids.first().map_or(0, Vec::len);
    let mut sums = vec![vec![Accumulator::default(); dimensions]; centroids.len()];
    let mut mass = vec![Accumulator::default(); centroids.len()];
    let mut sizes = vec![0_usize; centroids.len()];

    for ((vector, &weight), &id) in data.iter().zip(weights.iter()).zip(ids.iter()) {
        for (sum, value) in sums[id].iter_mut().zip(vector.iter()) {
            *sum += weight * value;
        }
        mass[id] += weight;
        sizes[id] += 1;
    }

    let mut updated: Vec<Vec<Float>> = centroids
        .iter()
        .enumerate()
        .map(|(id, centroid)| {
            let mass = mass[id].total();
            if 0.0 < mass {
                sums[id].iter().map(|sum| sum.total() / mass).collect()
            } else {
                centroid.clone()
            }
        })
        .collect();

    let empty: Vec<usize> = sizes
        .iter()
        .enumerate()
        .filter(|&(_, &size)| size == 0)
        .map(|(id, _)| id)
        .collect();
    if !empty.is_empty() {
        let mut farthest: Vec<(usize, Float)> = data
            .iter()
            .zip(ids.iter())
            .enumerate()
            .map(|(index, (vector, &id))| (index, squared_distance(vector, &centroids[id])))
            .collect();
        // Stable sort keeps the lower index first among equal distances.
        farthest.sort_by(|(_, d1), (_, d2)| d2.total_cmp(d1));

        for (id, (index, _)) in empty.into_iter().zip(farthest.into_iter()) {
            log::trace!("relocating empty cluster {} to vector {}", id, index);
            updated[id].clone_from(&data[index]);
            ids[index] = id;
        }
    }

    updated
}

// ====================================================================================================================
