use super::histogram::Histogram;
use crate::Energy;

/// distance between equity distributions.
///
/// EMD is the default: it is the Wasserstein-1 distance on the
/// [0, 1] interval, which in one dimension reduces to the area
/// between the CDFs. it respects ordinal closeness of equity
/// values, which is exactly what bucketing wants. Euclidean is an
/// explicit fallback parameter, never an implicit bail-out.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum Metric {
    Emd,
    Euclidean,
}

impl Metric {
    pub fn distance(&self, x: &Histogram, y: &Histogram) -> Energy {
        assert!(x.bins() == y.bins());
        match self {
            Self::Emd => Self::variation(x, y),
            Self::Euclidean => Self::euclidean(x, y),
        }
    }

    /// area between CDFs, i.e. Wasserstein-1 on the unit interval
    fn variation(x: &Histogram, y: &Histogram) -> Energy {
        let mut total = 0.;
        let mut cdf_x = 0.;
        let mut cdf_y = 0.;
        for cell in 0..x.bins() {
            cdf_x += x.density(cell);
            cdf_y += y.density(cell);
            total += (cdf_x - cdf_y).abs();
        }
        total / x.bins() as Energy
    }

    fn euclidean(x: &Histogram, y: &Histogram) -> Energy {
        (0..x.bins())
            .map(|cell| x.density(cell) - y.density(cell))
            .map(|delta| delta * delta)
            .sum::<Energy>()
            .sqrt()
    }
}

impl From<Metric> for u8 {
    fn from(metric: Metric) -> u8 {
        match metric {
            Metric::Emd => 0,
            Metric::Euclidean => 1,
        }
    }
}
impl From<u8> for Metric {
    fn from(n: u8) -> Self {
        match n {
            0 => Self::Emd,
            1 => Self::Euclidean,
            _ => panic!("no other metrics"),
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Emd => write!(f, "emd"),
            Self::Euclidean => write!(f, "euclidean"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Arbitrary;

    fn spike(bins: usize, cell: usize) -> Histogram {
        let mut histogram = Histogram::new(bins);
        histogram.witness((cell as f32 + 0.5) / bins as f32);
        histogram
    }

    #[test]
    fn self_distance_is_zero() {
        for metric in [Metric::Emd, Metric::Euclidean] {
            let h = Histogram::random();
            assert!(metric.distance(&h, &h) == 0.);
        }
    }

    #[test]
    fn symmetric() {
        for metric in [Metric::Emd, Metric::Euclidean] {
            let x = Histogram::random();
            let y = Histogram::random();
            assert!(metric.distance(&x, &y) == metric.distance(&y, &x));
        }
    }

    #[test]
    fn positive_between_distinct() {
        let x = spike(50, 0);
        let y = spike(50, 49);
        for metric in [Metric::Emd, Metric::Euclidean] {
            assert!(metric.distance(&x, &y) > 0.);
        }
    }

    #[test]
    fn triangle_inequality() {
        for _ in 0..100 {
            let x = Histogram::random();
            let y = Histogram::random();
            let z = Histogram::random();
            let xy = Metric::Emd.distance(&x, &y);
            let yz = Metric::Emd.distance(&y, &z);
            let xz = Metric::Emd.distance(&x, &z);
            assert!(xy + yz >= xz - 1e-6);
        }
    }

    /// EMD respects ordinal closeness of equity; Euclidean does not
    #[test]
    fn emd_is_ordinal() {
        let lo = spike(50, 0);
        let mid = spike(50, 10);
        let hi = spike(50, 40);
        assert!(Metric::Emd.distance(&lo, &mid) < Metric::Emd.distance(&lo, &hi));
        let near = Metric::Euclidean.distance(&lo, &mid);
        let far = Metric::Euclidean.distance(&lo, &hi);
        assert!((near - far).abs() < 1e-6);
    }
}
