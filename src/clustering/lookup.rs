use super::histogram::Histogram;
use super::metric::Metric;
use crate::cards::archetype::Archetype;
use crate::cards::street::Street;
use crate::error::Result;
use crate::save::Artifact;
use crate::save::Header;
use byteorder::ReadBytesExt;
use byteorder::WriteBytesExt;
use byteorder::BE;
use rustc_hash::FxHashMap;
use std::path::Path;

/// the learned abstraction table for one street: canonical hand
/// to cluster index, plus the centroids the clusters came from.
///
/// flop and turn tables are total over their archetype space, so
/// lookups hit the map. the river table covers a sampled subset;
/// hands outside it assign to the nearest centroid by EMD over
/// their freshly estimated equity distribution. immutable after
/// construction and shared across trainer threads without
/// synchronization.
pub struct Lookup {
    street: Street,
    metric: Metric,
    buckets: FxHashMap<u64, u16>,
    centroids: Vec<Histogram>,
}

impl Lookup {
    pub fn new(
        street: Street,
        metric: Metric,
        buckets: FxHashMap<u64, u16>,
        centroids: Vec<Histogram>,
    ) -> Self {
        Self {
            street,
            metric,
            buckets,
            centroids,
        }
    }

    /// a table with nothing learned in it; every lookup will miss
    /// and callers degrade to quantized equity
    pub fn empty(street: Street) -> Self {
        Self {
            street,
            metric: Metric::Emd,
            buckets: FxHashMap::default(),
            centroids: Vec::new(),
        }
    }

    pub fn street(&self) -> Street {
        self.street
    }
    pub fn len(&self) -> usize {
        self.buckets.len()
    }
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
    pub fn k(&self) -> usize {
        self.centroids.len()
    }

    pub fn bucket(&self, archetype: &Archetype) -> Option<u16> {
        self.buckets.get(&u64::from(*archetype)).copied()
    }

    /// nearest-centroid assignment for hands outside the map
    pub fn nearest(&self, histogram: &Histogram) -> Option<u16> {
        self.centroids
            .iter()
            .enumerate()
            .map(|(j, c)| (j, self.metric.distance(histogram, c)))
            .min_by(|(_, a), (_, b)| a.partial_cmp(b).expect("finite distance"))
            .map(|(j, _)| j as u16)
    }

    //

    fn header(fingerprint: u64) -> Header {
        Header {
            kind: Artifact::Lookup,
            fingerprint,
        }
    }

    pub fn save(&self, path: &Path, fingerprint: u64) -> Result<()> {
        log::info!("{:<32}{:<32}", "saving lookup", path.display());
        let mut file = Self::header(fingerprint).create(path)?;
        file.write_u8(self.street as u8)?;
        file.write_u8(u8::from(self.metric))?;
        file.write_u16::<BE>(self.centroids.len() as u16)?;
        let bins = self.centroids.first().map(|c| c.bins()).unwrap_or(0);
        file.write_u16::<BE>(bins as u16)?;
        for centroid in self.centroids.iter() {
            for density in centroid.densities() {
                file.write_f32::<BE>(density)?;
            }
        }
        file.write_u32::<BE>(self.buckets.len() as u32)?;
        let mut entries = self.buckets.iter().collect::<Vec<_>>();
        entries.sort();
        for (hand, bucket) in entries {
            file.write_u64::<BE>(*hand)?;
            file.write_u16::<BE>(*bucket)?;
        }
        Ok(())
    }

    pub fn load(path: &Path, fingerprint: u64) -> Result<Self> {
        log::info!("{:<32}{:<32}", "loading lookup", path.display());
        let mut file = Self::header(fingerprint).open(path)?;
        let street = Street::from(file.read_u8()? as usize);
        let metric = Metric::from(file.read_u8()?);
        let k = file.read_u16::<BE>()? as usize;
        let bins = file.read_u16::<BE>()? as usize;
        let mut centroids = Vec::with_capacity(k);
        for _ in 0..k {
            let mut mass = Vec::with_capacity(bins);
            for _ in 0..bins {
                mass.push(file.read_f32::<BE>()?);
            }
            centroids.push(Histogram::from(mass));
        }
        let n = file.read_u32::<BE>()? as usize;
        let mut buckets = FxHashMap::default();
        buckets.reserve(n);
        for _ in 0..n {
            let hand = file.read_u64::<BE>()?;
            let bucket = file.read_u16::<BE>()?;
            buckets.insert(hand, bucket);
        }
        Ok(Self {
            street,
            metric,
            buckets,
            centroids,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::hand::Hand;
    use crate::Arbitrary;

    #[test]
    fn roundtrip() {
        let mut buckets = FxHashMap::default();
        let mut centroids = Vec::new();
        for i in 0..32u16 {
            buckets.insert(u64::from(Archetype::random()), i % 4);
        }
        for _ in 0..4 {
            centroids.push(Histogram::random());
        }
        let lookup = Lookup::new(Street::Flop, Metric::Emd, buckets, centroids);
        let dir = std::env::temp_dir().join("hupoker-lookup-test");
        let path = dir.join("flop.lookup");
        lookup.save(&path, 42).unwrap();
        let loaded = Lookup::load(&path, 42).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert!(loaded.street() == Street::Flop);
        assert!(loaded.len() == lookup.len());
        for (hand, bucket) in lookup.buckets.iter() {
            assert!(loaded.buckets.get(hand) == Some(bucket));
        }
        for (a, b) in lookup.centroids.iter().zip(loaded.centroids.iter()) {
            for (x, y) in a.densities().into_iter().zip(b.densities()) {
                assert!((x - y).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn stale_fingerprint_is_rejected() {
        let lookup = Lookup::empty(Street::Turn);
        let dir = std::env::temp_dir().join("hupoker-lookup-test");
        let path = dir.join("turn.lookup");
        lookup.save(&path, 1).unwrap();
        assert!(Lookup::load(&path, 2).is_err());
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn nearest_assigns_by_distance() {
        let mut low = Histogram::new(50);
        low.witness(0.1);
        let mut high = Histogram::new(50);
        high.witness(0.9);
        let lookup = Lookup::new(
            Street::Rive,
            Metric::Emd,
            FxHashMap::default(),
            vec![low, high],
        );
        let mut probe = Histogram::new(50);
        probe.witness(0.85);
        assert!(lookup.nearest(&probe) == Some(1));
        assert!(lookup.bucket(&Archetype::from(Hand::random())).is_none());
    }
}
