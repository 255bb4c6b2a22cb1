use super::archetypes;
use super::equity::Sampler;
use super::histogram::Histogram;
use super::kmeans::Clusters;
use super::kmeans::Init;
use super::kmeans::KMeans;
use super::lookup::Lookup;
use super::metric::Metric;
use crate::cards::archetype::Archetype;
use crate::cards::street::Street;
use crate::error::Result;
use crate::save::disk;
use crate::save::Artifact;
use crate::save::Header;
use byteorder::ReadBytesExt;
use byteorder::WriteBytesExt;
use byteorder::BE;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use std::path::Path;
use std::path::PathBuf;

/// one street's abstraction build: enumerate archetypes, estimate
/// their equity distributions, cluster, and freeze the mapping.
///
/// every stage persists under a fingerprint of exactly the
/// parameters that shaped it: archetype lists don't depend on the
/// sampler, equity arrays don't depend on the cluster count, so a
/// k change re-clusters without repeating the expensive rollouts.
/// a stale cache fails its fingerprint check and is rebuilt.
/// preflop never comes through here since its 169 classes need no
/// learning.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct Layer {
    pub street: Street,
    pub buckets: usize,
    pub iterations: usize,
    pub metric: Metric,
    pub init: Init,
    pub sampler: Sampler,
    pub river_samples: usize,
    pub seed: u64,
}

impl Layer {
    pub fn flop(seed: u64) -> Self {
        Self {
            street: Street::Flop,
            buckets: crate::KMEANS_FLOP_CLUSTER_COUNT,
            iterations: crate::KMEANS_TRAINING_ITERATIONS,
            metric: Metric::Emd,
            init: Init::Random,
            sampler: Sampler::default(),
            river_samples: 0,
            seed,
        }
    }
    pub fn turn(seed: u64) -> Self {
        Self {
            street: Street::Turn,
            buckets: crate::KMEANS_TURN_CLUSTER_COUNT,
            ..Self::flop(seed)
        }
    }
    pub fn river(seed: u64) -> Self {
        Self {
            street: Street::Rive,
            buckets: crate::KMEANS_RIVE_CLUSTER_COUNT,
            river_samples: crate::RIVER_ARCHETYPE_SAMPLES,
            ..Self::flop(seed)
        }
    }

    pub fn fingerprint(&self) -> u64 {
        disk::fingerprint(self)
    }

    pub fn load_or_build(&self, dir: &Path) -> Lookup {
        let ref path = self.lookup_path(dir);
        match Lookup::load(path, self.fingerprint()) {
            Ok(lookup) => lookup,
            Err(_) => {
                let archetypes = self.cached_archetypes(dir);
                let points = self.cached_points(dir, &archetypes);
                let lookup = self.cluster(&archetypes, points);
                if let Err(e) = lookup.save(path, self.fingerprint()) {
                    log::warn!("could not cache {} lookup: {}", self.street, e);
                }
                lookup
            }
        }
    }

    /// the full two-stage build, in memory
    pub fn learn(&self) -> Lookup {
        let archetypes = self.enumerate();
        let points = self.distributions(&archetypes);
        self.cluster(&archetypes, points)
    }

    //

    fn enumerate(&self) -> Vec<Archetype> {
        assert!(matches!(
            self.street,
            Street::Flop | Street::Turn | Street::Rive
        ));
        log::info!("{:<32}{:<32}", "enumerating archetypes", self.street);
        archetypes::enumerate(self.street, self.river_samples, self.seed)
    }

    /// equity distribution per archetype, sharded across cores.
    /// each archetype seeds its own rng from (layer seed, hand),
    /// so the estimate is independent of scheduling order.
    fn distributions(&self, archetypes: &[Archetype]) -> Vec<Histogram> {
        log::info!(
            "{:<32}{:<32}",
            format!("estimating {} distributions", archetypes.len()),
            self.street
        );
        let progress = crate::progress(archetypes.len());
        let points = archetypes
            .par_iter()
            .map(|archetype| {
                let cards = archetype.hand().cards();
                let ref mut rng = SmallRng::seed_from_u64(disk::fingerprint(&(
                    self.seed,
                    u64::from(*archetype),
                )));
                let histogram = self.sampler.distribution(&cards[..2], &cards[2..], rng);
                progress.inc(1);
                histogram
            })
            .collect();
        progress.finish_and_clear();
        points
    }

    fn cluster(&self, archetypes: &[Archetype], points: Vec<Histogram>) -> Lookup {
        log::info!("{:<32}{:<32}", "clustering", self.street);
        let ref mut rng = SmallRng::seed_from_u64(self.seed);
        let kmeans = KMeans {
            k: self.buckets.min(points.len()),
            iterations: self.iterations,
            metric: self.metric,
            init: self.init,
            points,
        };
        let Clusters {
            centroids,
            assignments,
            losses,
        } = kmeans.cluster(rng);
        if let Some(loss) = losses.last() {
            log::info!("{:<32}{:<32.4}", "final clustering loss", loss);
        }
        let buckets = archetypes
            .iter()
            .zip(assignments)
            .map(|(archetype, bucket)| (u64::from(*archetype), bucket as u16))
            .collect::<FxHashMap<u64, u16>>();
        Lookup::new(self.street, self.metric, buckets, centroids)
    }

    // stage caching. each stage is keyed by only the parameters
    // upstream of it.

    fn lookup_path(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}.lookup", self.street))
    }
    fn archetypes_path(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}.archetypes", self.street))
    }
    fn equities_path(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}.equity", self.street))
    }
    fn archetypes_fingerprint(&self) -> u64 {
        disk::fingerprint(&(self.street, self.river_samples, self.seed))
    }
    fn equities_fingerprint(&self) -> u64 {
        disk::fingerprint(&(self.street, self.river_samples, self.seed, self.sampler))
    }

    fn cached_archetypes(&self, dir: &Path) -> Vec<Archetype> {
        let ref path = self.archetypes_path(dir);
        match self.read_archetypes(path) {
            Ok(archetypes) => archetypes,
            Err(_) => {
                let archetypes = self.enumerate();
                if let Err(e) = self.write_archetypes(path, &archetypes) {
                    log::warn!("could not cache {} archetypes: {}", self.street, e);
                }
                archetypes
            }
        }
    }

    fn cached_points(&self, dir: &Path, archetypes: &[Archetype]) -> Vec<Histogram> {
        let ref path = self.equities_path(dir);
        match self.read_points(path, archetypes.len()) {
            Ok(points) => points,
            Err(_) => {
                let points = self.distributions(archetypes);
                if let Err(e) = self.write_points(path, &points) {
                    log::warn!("could not cache {} equities: {}", self.street, e);
                }
                points
            }
        }
    }

    fn write_archetypes(&self, path: &Path, archetypes: &[Archetype]) -> Result<()> {
        let header = Header {
            kind: Artifact::Archetypes,
            fingerprint: self.archetypes_fingerprint(),
        };
        let mut file = header.create(path)?;
        file.write_u32::<BE>(archetypes.len() as u32)?;
        for archetype in archetypes {
            file.write_u64::<BE>(u64::from(*archetype))?;
        }
        Ok(())
    }

    fn read_archetypes(&self, path: &Path) -> Result<Vec<Archetype>> {
        let header = Header {
            kind: Artifact::Archetypes,
            fingerprint: self.archetypes_fingerprint(),
        };
        let mut file = header.open(path)?;
        let n = file.read_u32::<BE>()? as usize;
        let mut archetypes = Vec::with_capacity(n);
        for _ in 0..n {
            archetypes.push(Archetype::from(file.read_u64::<BE>()?));
        }
        Ok(archetypes)
    }

    fn write_points(&self, path: &Path, points: &[Histogram]) -> Result<()> {
        let header = Header {
            kind: Artifact::Equities,
            fingerprint: self.equities_fingerprint(),
        };
        let mut file = header.create(path)?;
        file.write_u32::<BE>(points.len() as u32)?;
        file.write_u16::<BE>(self.sampler.bins as u16)?;
        for point in points {
            for density in point.densities() {
                file.write_f32::<BE>(density)?;
            }
        }
        Ok(())
    }

    fn read_points(&self, path: &Path, expected: usize) -> Result<Vec<Histogram>> {
        let header = Header {
            kind: Artifact::Equities,
            fingerprint: self.equities_fingerprint(),
        };
        let mut file = header.open(path)?;
        let n = file.read_u32::<BE>()? as usize;
        if n != expected {
            return Err(crate::error::Error::Corrupt(format!(
                "{} equity rows, expected {}",
                n, expected
            )));
        }
        let bins = file.read_u16::<BE>()? as usize;
        let mut points = Vec::with_capacity(n);
        for _ in 0..n {
            let mut mass = Vec::with_capacity(bins);
            for _ in 0..bins {
                mass.push(file.read_f32::<BE>()?);
            }
            points.push(Histogram::from(mass));
        }
        Ok(points)
    }
}
