use super::strength::Strength;
use crate::cards::card::Card;
use crate::error::Error;
use crate::error::Result;
use crate::save::disk;
use crate::save::Artifact;
use crate::save::Header;
use byteorder::ReadBytesExt;
use byteorder::WriteBytesExt;
use byteorder::BE;
use rayon::prelude::*;
use std::path::Path;

/// C(n, k) for n ≤ 52, k ≤ 5, filled at compile time
const fn binomials() -> [[u32; 6]; 53] {
    let mut table = [[0u32; 6]; 53];
    let mut n = 0;
    while n <= 52 {
        table[n][0] = 1;
        let mut k = 1;
        while k <= 5 {
            table[n][k] = if n == 0 {
                0
            } else {
                table[n - 1][k - 1] + table[n - 1][k]
            };
            k += 1;
        }
        n += 1;
    }
    table
}
const CHOOSE: [[u32; 6]; 53] = binomials();

/// the number of distinct 5-card hands, C(52, 5)
const N_FIVE_CARD_HANDS: usize = 2_598_960;

/// dense strength table over every 5-card combination.
///
/// combinations index by the combinatorial number system: with
/// card ids c0 < c1 < .. < c4, the slot is Σ C(ci, i+1). built
/// once from the bitwise evaluator (a couple million evaluations,
/// parallelized), then cached to disk and loaded at startup. after
/// construction, lookups cannot fail; all input validation
/// happens here at the boundary.
pub struct HandTable(Vec<u32>);

impl HandTable {
    /// colex index of 5 ascending card ids
    fn index(ids: &[u8; 5]) -> usize {
        ids.iter()
            .enumerate()
            .map(|(i, &c)| CHOOSE[c as usize][i + 1])
            .sum::<u32>() as usize
    }

    /// evaluate all C(52, 5) hands, sharded over the top card
    pub fn build() -> Self {
        log::info!("{:<32}", "building hand strength table");
        let mut strengths = (4..52usize)
            .into_par_iter()
            .map(|c4| {
                let mut shard = Vec::with_capacity(CHOOSE[c4][4] as usize);
                for c3 in 3..c4 {
                    for c2 in 2..c3 {
                        for c1 in 1..c2 {
                            for c0 in 0..c1 {
                                let cards = [c0, c1, c2, c3, c4].map(|c| Card::from(c as u8));
                                shard.push(u32::from(Strength::from(&cards[..])));
                            }
                        }
                    }
                }
                shard
            })
            .collect::<Vec<Vec<u32>>>();
        let mut table = Vec::with_capacity(N_FIVE_CARD_HANDS);
        for shard in strengths.iter_mut() {
            table.append(shard);
        }
        assert!(table.len() == N_FIVE_CARD_HANDS);
        Self(table)
    }

    /// total-order strength of a 5, 6, or 7 card hand.
    ///
    /// larger hands take the max over their 5-card subsets, which
    /// is exactly the showdown rule.
    pub fn strength(&self, cards: &[Card]) -> Result<u32> {
        if !(5..=7).contains(&cards.len()) {
            return Err(Error::InvalidCard(format!(
                "{} cards, need 5 to 7",
                cards.len()
            )));
        }
        for (i, card) in cards.iter().enumerate() {
            if cards[..i].contains(card) {
                return Err(Error::DuplicateCard(card.to_string()));
            }
        }
        let mut ids = cards.iter().map(|c| u8::from(*c)).collect::<Vec<u8>>();
        ids.sort_unstable();
        let n = ids.len();
        let mut best = 0u32;
        let mut five = [0u8; 5];
        for skip in Self::exclusions(n) {
            let mut k = 0;
            for (i, &id) in ids.iter().enumerate() {
                if !skip.contains(&(i as u8)) {
                    five[k] = id;
                    k += 1;
                }
            }
            best = best.max(self.0[Self::index(&five)]);
        }
        Ok(best)
    }

    /// index pairs to drop when reducing n cards to 5
    fn exclusions(n: usize) -> Vec<[u8; 2]> {
        match n {
            5 => vec![[u8::MAX, u8::MAX]],
            6 => (0..6u8).map(|i| [i, u8::MAX]).collect(),
            7 => (0..7u8)
                .flat_map(|i| (i + 1..7u8).map(move |j| [i, j]))
                .collect(),
            _ => unreachable!("validated length"),
        }
    }

    //

    fn header() -> Header {
        Header {
            kind: Artifact::Strengths,
            fingerprint: disk::fingerprint(&N_FIVE_CARD_HANDS),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        log::info!("{:<32}{:<32}", "saving hand strength table", path.display());
        let mut file = Self::header().create(path)?;
        file.write_u32::<BE>(self.0.len() as u32)?;
        for strength in self.0.iter() {
            file.write_u32::<BE>(*strength)?;
        }
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        log::info!("{:<32}{:<32}", "loading hand strength table", path.display());
        let mut file = Self::header().open(path)?;
        let n = file.read_u32::<BE>()? as usize;
        if n != N_FIVE_CARD_HANDS {
            return Err(Error::Corrupt(format!("{} table entries", n)));
        }
        let mut table = Vec::with_capacity(n);
        for _ in 0..n {
            table.push(file.read_u32::<BE>()?);
        }
        Ok(Self(table))
    }

    pub fn load_or_build(path: &Path) -> Self {
        match Self::load(path) {
            Ok(table) => table,
            Err(_) => {
                let table = Self::build();
                if let Err(e) = table.save(path) {
                    log::warn!("could not cache strength table: {}", e);
                }
                table
            }
        }
    }
}
