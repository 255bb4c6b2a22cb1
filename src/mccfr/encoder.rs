use super::infoset::Info;
use crate::cards::archetype::Archetype;
use crate::cards::card::Card;
use crate::cards::street::Street;
use crate::clustering::abstraction::Abstraction;
use crate::clustering::equity::Sampler;
use crate::clustering::lookup::Lookup;
use crate::evaluator::strength::Strength;
use crate::evaluator::table::HandTable;
use crate::gameplay::deal::Deal;
use crate::gameplay::history::History;
use crate::save::disk;
use crate::Utility;
use rand::rngs::SmallRng;
use rand::SeedableRng;

/// translates concrete game states into abstract infosets.
///
/// bundles the immutable handles the trainer and query paths
/// need: the learned per-street lookups, the equity sampler, and
/// the strength table. built once, then shared read-only across
/// all trainer threads with no synchronization. bucket dispatch
/// by street:
///
/// - preflop: the direct 169-class hash
/// - flop / turn: learned table lookup over the canonical hand
/// - river: learned table, or nearest centroid over a freshly
///   estimated equity distribution for hands outside the sampled
///   clustering subset
///
/// a hand missing everywhere degrades to its quantized expected
/// equity, the same last-resort path the online query uses.
pub struct Encoder {
    flop: Lookup,
    turn: Lookup,
    river: Lookup,
    sampler: Sampler,
    table: Option<HandTable>,
    seed: u64,
}

impl Encoder {
    pub fn new(
        flop: Lookup,
        turn: Lookup,
        river: Lookup,
        sampler: Sampler,
        table: Option<HandTable>,
        seed: u64,
    ) -> Self {
        assert!(flop.street() == Street::Flop);
        assert!(turn.street() == Street::Turn);
        assert!(river.street() == Street::Rive);
        Self {
            flop,
            turn,
            river,
            sampler,
            table,
            seed,
        }
    }

    /// an encoder with no learned abstraction: every postflop
    /// hand falls back to quantized equity. exists for tests and
    /// for tiny training runs without a clustering pass.
    pub fn untrained(seed: u64) -> Self {
        Self {
            flop: Lookup::empty(Street::Flop),
            turn: Lookup::empty(Street::Turn),
            river: Lookup::empty(Street::Rive),
            sampler: Sampler {
                opponents: 8,
                rollouts: 4,
                bins: crate::EQUITY_BINS,
            },
            table: None,
            seed,
        }
    }

    pub fn info(&self, deal: &Deal, history: &History) -> Info {
        Info::new(self.abstraction(deal, history), history.clone())
    }

    pub fn abstraction(&self, deal: &Deal, history: &History) -> Abstraction {
        let street = history.street();
        let player = history.whose_turn();
        match street {
            Street::Pref => Abstraction::preflop(deal.hole(player)),
            Street::Flop => self.learned(&self.flop, deal, player, street),
            Street::Turn => self.learned(&self.turn, deal, player, street),
            Street::Rive => self.learned(&self.river, deal, player, street),
            Street::Over => unreachable!("no decisions after the river closes"),
        }
    }

    fn learned(
        &self,
        lookup: &Lookup,
        deal: &Deal,
        player: usize,
        street: Street,
    ) -> Abstraction {
        let observed = deal.observed(player, street);
        let archetype = Archetype::from(observed);
        if let Some(bucket) = lookup.bucket(&archetype) {
            return Abstraction::Learned(bucket);
        }
        // estimate the equity distribution the same way the
        // clustering stage would have, so nearest-centroid
        // assignment is consistent with training data
        let cards = archetype.hand().cards();
        let ref mut rng =
            SmallRng::seed_from_u64(disk::fingerprint(&(self.seed, u64::from(archetype))));
        let histogram = self.sampler.distribution(&cards[..2], &cards[2..], rng);
        match lookup.nearest(&histogram) {
            Some(bucket) => Abstraction::Learned(bucket),
            None => Abstraction::percent(histogram.mean()),
        }
    }

    /// showdown strength through the dense table when present
    pub fn strength(&self, cards: &[Card]) -> u32 {
        match &self.table {
            Some(table) => table.strength(cards).expect("distinct cards off a deal"),
            None => u32::from(Strength::from(cards)),
        }
    }

    /// terminal utility from `player`'s perspective. a fold hands
    /// the folder's commitment to the other seat; otherwise the
    /// board runs out and the showdown winner takes the pot, with
    /// ties splitting to zero.
    pub fn utility(&self, deal: &Deal, history: &History, player: usize) -> Utility {
        assert!(history.hand_over());
        let ledger = history.ledger().expect("consistent terminal history");
        let villain = 1 - player;
        match ledger.folder {
            Some(folder) if folder == player => -(ledger.contributions[player] as Utility),
            Some(folder) => ledger.contributions[folder] as Utility,
            None => {
                let hero = self.strength(&deal.showdown(player));
                let oppo = self.strength(&deal.showdown(villain));
                match hero.cmp(&oppo) {
                    std::cmp::Ordering::Greater => ledger.contributions[villain] as Utility,
                    std::cmp::Ordering::Less => -(ledger.contributions[player] as Utility),
                    std::cmp::Ordering::Equal => 0.,
                }
            }
        }
    }
}
