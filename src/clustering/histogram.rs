use crate::Arbitrary;
use crate::Energy;
use crate::Equity;

/// a fixed-width histogram over the [0, 1] equity interval.
///
/// cell k holds the weight of equities in [k/bins, (k+1)/bins),
/// with equity exactly 1.0 landing in the top cell. weights are
/// raw counts until read; density() divides by the total, so
/// absorbing histograms into one another yields their weighted
/// mean for free, which is what the k-means update step wants.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    mass: Vec<f32>,
    norm: f32,
}

impl Histogram {
    pub fn new(bins: usize) -> Self {
        Self {
            mass: vec![0.; bins],
            norm: 0.,
        }
    }
    pub fn bins(&self) -> usize {
        self.mass.len()
    }
    pub fn is_empty(&self) -> bool {
        self.norm == 0.
    }
    /// count one observed equity value
    pub fn witness(&mut self, equity: Equity) {
        let bins = self.bins();
        let cell = ((equity * bins as f32) as usize).min(bins - 1);
        self.mass[cell] += 1.;
        self.norm += 1.;
    }
    pub fn density(&self, cell: usize) -> Energy {
        if self.norm == 0. {
            0.
        } else {
            self.mass[cell] / self.norm
        }
    }
    /// L1-normalized view
    pub fn densities(&self) -> Vec<f32> {
        (0..self.bins()).map(|i| self.density(i)).collect()
    }
    /// expected equity under the histogram, by cell midpoint
    pub fn mean(&self) -> Equity {
        let bins = self.bins() as f32;
        (0..self.bins())
            .map(|i| self.density(i) * (i as f32 + 0.5) / bins)
            .sum()
    }
    /// merge the other histogram's observations into this one
    pub fn absorb(&mut self, other: &Self) {
        assert!(self.bins() == other.bins());
        for (cell, mass) in other.mass.iter().enumerate() {
            self.mass[cell] += mass;
        }
        self.norm += other.norm;
    }
}

/// already-normalized densities, e.g. loaded from disk
impl From<Vec<f32>> for Histogram {
    fn from(mass: Vec<f32>) -> Self {
        let norm = mass.iter().sum();
        Self { mass, norm }
    }
}

impl Arbitrary for Histogram {
    fn random() -> Self {
        use rand::Rng;
        let ref mut rng = rand::rng();
        let mut histogram = Self::new(crate::EQUITY_BINS);
        for _ in 0..64 {
            histogram.witness(rng.random::<f32>());
        }
        histogram
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn densities_sum_to_one() {
        let histogram = Histogram::random();
        let total = histogram.densities().iter().sum::<f32>();
        assert!((total - 1.).abs() < 1e-5);
        assert!(histogram.densities().iter().all(|&d| d >= 0.));
    }

    #[test]
    fn top_edge_lands_in_last_cell() {
        let mut histogram = Histogram::new(50);
        histogram.witness(1.0);
        assert!(histogram.density(49) == 1.);
    }

    #[test]
    fn absorb_is_weighted_mean() {
        let mut a = Histogram::new(4);
        let mut b = Histogram::new(4);
        a.witness(0.1);
        b.witness(0.9);
        b.witness(0.9);
        b.witness(0.9);
        a.absorb(&b);
        assert!((a.density(0) - 0.25).abs() < 1e-6);
        assert!((a.density(3) - 0.75).abs() < 1e-6);
    }

    #[test]
    fn mean_tracks_mass() {
        let mut histogram = Histogram::new(50);
        histogram.witness(1.0);
        assert!(histogram.mean() > 0.95);
        let mut histogram = Histogram::new(50);
        histogram.witness(0.0);
        assert!(histogram.mean() < 0.05);
    }
}
