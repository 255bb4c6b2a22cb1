use crate::error::Error;
use crate::error::Result;
use byteorder::ReadBytesExt;
use byteorder::WriteBytesExt;
use byteorder::BE;
use std::hash::Hash;
use std::hash::Hasher;
use std::io::BufReader;
use std::io::BufWriter;
use std::io::Read;
use std::io::Write;
use std::path::Path;

/// 4-byte signature at the start of every artifact we persist
const MAGIC: &[u8; 4] = b"HUPB";
/// bump when any on-disk layout changes
const VERSION: u16 = 1;

/// what kind of artifact lives in a file. written into the
/// header so a strength table can never be deserialized as a
/// blueprint by accident.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    Strengths = 1,
    Archetypes = 2,
    Equities = 3,
    Lookup = 4,
    Blueprint = 5,
}

impl Artifact {
    fn tag(&self) -> u16 {
        *self as u16
    }
    fn from_tag(tag: u16) -> Result<Self> {
        match tag {
            1 => Ok(Self::Strengths),
            2 => Ok(Self::Archetypes),
            3 => Ok(Self::Equities),
            4 => Ok(Self::Lookup),
            5 => Ok(Self::Blueprint),
            n => Err(Error::Corrupt(format!("unknown artifact tag {}", n))),
        }
    }
}

/// versioned artifact header: magic, layout version, artifact
/// kind, and the fingerprint of the parameters that produced the
/// contents. a stale cache (same path, different parameters)
/// fails the fingerprint check and gets rebuilt instead of
/// silently poisoning downstream stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub kind: Artifact,
    pub fingerprint: u64,
}

impl Header {
    pub fn write<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_all(MAGIC)?;
        w.write_u16::<BE>(VERSION)?;
        w.write_u16::<BE>(self.kind.tag())?;
        w.write_u64::<BE>(self.fingerprint)?;
        Ok(())
    }
    pub fn read<R: Read>(r: &mut R) -> Result<Self> {
        let mut magic = [0u8; 4];
        r.read_exact(&mut magic)?;
        if &magic != MAGIC {
            return Err(Error::Corrupt("bad magic".to_string()));
        }
        let version = r.read_u16::<BE>()?;
        if version != VERSION {
            return Err(Error::Corrupt(format!("layout version {}", version)));
        }
        let kind = Artifact::from_tag(r.read_u16::<BE>()?)?;
        let fingerprint = r.read_u64::<BE>()?;
        Ok(Self { kind, fingerprint })
    }

    /// open a file for writing and stamp the header
    pub fn create(&self, path: &Path) -> Result<BufWriter<std::fs::File>> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let mut file = BufWriter::new(std::fs::File::create(path)?);
        self.write(&mut file)?;
        Ok(file)
    }

    /// open a file for reading, validating magic, version, kind,
    /// and parameter fingerprint before handing bytes downstream
    pub fn open(&self, path: &Path) -> Result<BufReader<std::fs::File>> {
        let mut file = BufReader::new(std::fs::File::open(path)?);
        let found = Self::read(&mut file)?;
        if found.kind != self.kind {
            return Err(Error::Corrupt(format!(
                "expected {:?} found {:?}",
                self.kind, found.kind
            )));
        }
        if found.fingerprint != self.fingerprint {
            return Err(Error::Corrupt(format!(
                "fingerprint {:016x} does not match {:016x}",
                found.fingerprint, self.fingerprint
            )));
        }
        Ok(file)
    }
}

/// deterministic fingerprint of whatever parameters produced an
/// artifact. FxHasher carries no random state, so the value is
/// stable across processes, which is the whole point.
pub fn fingerprint<H: Hash>(params: &H) -> u64 {
    let mut hasher = rustc_hash::FxHasher::default();
    params.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_roundtrip() {
        let header = Header {
            kind: Artifact::Lookup,
            fingerprint: 0xdead_beef_cafe_f00d,
        };
        let mut bytes = Vec::new();
        header.write(&mut bytes).unwrap();
        let read = Header::read(&mut bytes.as_slice()).unwrap();
        assert!(header == read);
    }

    #[test]
    fn header_rejects_wrong_magic() {
        let header = Header {
            kind: Artifact::Strengths,
            fingerprint: 0,
        };
        let mut bytes = Vec::new();
        header.write(&mut bytes).unwrap();
        bytes[0] = b'X';
        assert!(Header::read(&mut bytes.as_slice()).is_err());
    }

    #[test]
    fn fingerprint_is_stable() {
        let a = fingerprint(&(50usize, 100usize, "flop"));
        let b = fingerprint(&(50usize, 100usize, "flop"));
        let c = fingerprint(&(50usize, 101usize, "flop"));
        assert!(a == b);
        assert!(a != c);
    }
}
