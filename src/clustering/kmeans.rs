use super::histogram::Histogram;
use super::metric::Metric;
use crate::Energy;
use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::rngs::SmallRng;
use rand::Rng;
use rayon::prelude::*;

/// how the first k centroids are chosen
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum Init {
    /// a uniform sample of the points, without replacement
    Random,
    /// k-means++: each next seed drawn proportional to its
    /// squared distance from the seeds so far
    PlusPlus,
}

/// k-means over equity distributions under a configurable metric.
///
/// assignment is embarrassingly parallel and shards across all
/// cores; ties go to the lowest centroid index. the update step
/// takes the componentwise arithmetic mean of assigned histograms
/// (EMD barycenters have no closed form, so the Euclidean
/// centroid is the standard approximation). clusters that go
/// empty keep their previous centroid. terminates after the fixed
/// iteration budget or as soon as the assignment vector stops
/// moving, tracking the sum of squared nearest-centroid distances
/// per iteration as the loss.
pub struct KMeans {
    pub k: usize,
    pub iterations: usize,
    pub metric: Metric,
    pub init: Init,
    pub points: Vec<Histogram>,
}

pub struct Clusters {
    pub centroids: Vec<Histogram>,
    pub assignments: Vec<usize>,
    pub losses: Vec<Energy>,
}

impl KMeans {
    pub fn cluster(&self, rng: &mut SmallRng) -> Clusters {
        assert!(self.k > 0);
        assert!(self.k <= self.points.len());
        let mut centroids = self.seeds(rng);
        let mut assignments = vec![usize::MAX; self.points.len()];
        let mut losses = Vec::with_capacity(self.iterations);
        for t in 0..self.iterations {
            let nearest = self
                .points
                .par_iter()
                .map(|p| self.nearest(&centroids, p))
                .collect::<Vec<(usize, Energy)>>();
            let loss = nearest.iter().map(|(_, d)| d * d).sum::<Energy>();
            let stable = nearest
                .iter()
                .map(|(j, _)| *j)
                .eq(assignments.iter().copied());
            assignments = nearest.into_iter().map(|(j, _)| j).collect();
            losses.push(loss);
            log::debug!("{:<16}{:<8}{:<16}", "kmeans", t, loss);
            if stable {
                break;
            }
            centroids = self.update(centroids, &assignments);
        }
        Clusters {
            centroids,
            assignments,
            losses,
        }
    }

    fn seeds(&self, rng: &mut SmallRng) -> Vec<Histogram> {
        match self.init {
            Init::Random => rand::seq::index::sample(rng, self.points.len(), self.k)
                .into_iter()
                .map(|i| self.points[i].clone())
                .collect(),
            Init::PlusPlus => self.plusplus(rng),
        }
    }

    fn plusplus(&self, rng: &mut SmallRng) -> Vec<Histogram> {
        let first = rng.random_range(0..self.points.len());
        let mut seeds = vec![self.points[first].clone()];
        while seeds.len() < self.k {
            let weights = self
                .points
                .par_iter()
                .map(|p| self.nearest(&seeds, p).1)
                .map(|d| d * d)
                .collect::<Vec<Energy>>();
            let next = match WeightedIndex::new(&weights) {
                Ok(distribution) => distribution.sample(rng),
                // every point already coincides with a seed
                Err(_) => rng.random_range(0..self.points.len()),
            };
            seeds.push(self.points[next].clone());
        }
        seeds
    }

    /// min_by keeps the first minimum, so ties break low
    fn nearest(&self, centroids: &[Histogram], point: &Histogram) -> (usize, Energy) {
        centroids
            .iter()
            .enumerate()
            .map(|(j, c)| (j, self.metric.distance(point, c)))
            .min_by(|(_, a), (_, b)| a.partial_cmp(b).expect("finite distance"))
            .expect("at least one centroid")
    }

    fn update(&self, previous: Vec<Histogram>, assignments: &[usize]) -> Vec<Histogram> {
        let bins = self.points[0].bins();
        let mut sums = vec![vec![0f32; bins]; self.k];
        let mut counts = vec![0usize; self.k];
        for (point, &j) in self.points.iter().zip(assignments.iter()) {
            for (cell, density) in point.densities().into_iter().enumerate() {
                sums[j][cell] += density;
            }
            counts[j] += 1;
        }
        sums.into_iter()
            .zip(counts)
            .zip(previous)
            .map(|((sum, count), old)| {
                if count == 0 {
                    old
                } else {
                    Histogram::from(
                        sum.into_iter()
                            .map(|mass| mass / count as f32)
                            .collect::<Vec<f32>>(),
                    )
                }
            })
            .collect()
    }
}
