use crate::cards::archetype::Archetype;
use crate::cards::card::Card;
use crate::cards::hand::Hand;
use crate::cards::street::Street;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use std::collections::HashSet;

/// enumerate the distinct archetypal (hole, board) hands of a
/// street. flop and turn iterate every combination and dedup
/// through canonicalization, sharded over hole pairs; the river's
/// 2.4B archetypes are far too many, so it gets a uniformly
/// sampled subset as the clustering seed instead. results are
/// sorted so enumeration order never depends on thread schedule.
pub fn enumerate(street: Street, river_samples: usize, seed: u64) -> Vec<Archetype> {
    let mut archetypes = match street {
        Street::Pref => preflop(),
        Street::Flop => exhaustive(3),
        Street::Turn => exhaustive(4),
        Street::Rive => sampled(5, river_samples, seed),
        Street::Over => unreachable!("no archetypes for terminal street"),
    }
    .into_iter()
    .collect::<Vec<Archetype>>();
    archetypes.sort();
    archetypes
}

fn preflop() -> HashSet<Archetype> {
    let mut archetypes = HashSet::new();
    for i in 0..52u8 {
        for j in (i + 1)..52u8 {
            let cards = [Card::from(i), Card::from(j)];
            archetypes.insert(Archetype::from(Hand::from(&cards[..])));
        }
    }
    archetypes
}

/// all (hole, n-card board) combinations, canonicalized
fn exhaustive(board: usize) -> HashSet<Archetype> {
    holes()
        .into_par_iter()
        .map(|hole| {
            let live = (0..52u8)
                .map(Card::from)
                .filter(|c| !hole.contains(c))
                .collect::<Vec<Card>>();
            let mut shard = HashSet::new();
            for_each_combination(&live, board, &mut |cards| {
                let hand = Hand::from(&hole[..]).extend(cards);
                shard.insert(Archetype::from(hand));
            });
            shard
        })
        .reduce(HashSet::new, |mut a, b| {
            a.extend(b);
            a
        })
}

fn sampled(board: usize, samples: usize, seed: u64) -> HashSet<Archetype> {
    let ref mut rng = SmallRng::seed_from_u64(seed);
    let mut deck = (0..52u8).map(Card::from).collect::<Vec<Card>>();
    let mut archetypes = HashSet::with_capacity(samples);
    for _ in 0..samples {
        deck.shuffle(rng);
        let hand = Hand::from(&deck[..2 + board]);
        archetypes.insert(Archetype::from(hand));
    }
    archetypes
}

fn holes() -> Vec<[Card; 2]> {
    let mut holes = Vec::with_capacity(1326);
    for i in 0..52u8 {
        for j in (i + 1)..52u8 {
            holes.push([Card::from(i), Card::from(j)]);
        }
    }
    holes
}

fn for_each_combination(cards: &[Card], k: usize, f: &mut impl FnMut(&[Card])) {
    fn recurse(
        cards: &[Card],
        k: usize,
        from: usize,
        head: &mut Vec<Card>,
        f: &mut impl FnMut(&[Card]),
    ) {
        if head.len() == k {
            f(head);
            return;
        }
        for i in from..cards.len() {
            head.push(cards[i]);
            recurse(cards, k, i + 1, head, f);
            head.pop();
        }
    }
    recurse(cards, k, 0, &mut Vec::with_capacity(k), f);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preflop_has_169_archetypes() {
        let archetypes = enumerate(Street::Pref, 0, 0);
        assert!(archetypes.len() == 169);
    }

    #[test]
    fn archetypes_are_canonical_fixed_points() {
        for archetype in enumerate(Street::Pref, 0, 0) {
            assert!(Archetype::from(*archetype.hand()) == archetype);
        }
    }

    #[test]
    fn river_sampling_dedups() {
        let archetypes = enumerate(Street::Rive, 1000, 7);
        assert!(archetypes.len() <= 1000);
        assert!(archetypes.len() > 900); // collisions are rare in 2.4B
        assert!(archetypes.iter().all(|a| a.hand().len() == 7));
    }

    #[test]
    fn sorted_and_distinct() {
        let archetypes = enumerate(Street::Pref, 0, 0);
        assert!(archetypes.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    #[ignore] // exhausts all 26M flop combinations
    fn flop_archetype_count() {
        let archetypes = enumerate(Street::Flop, 0, 0);
        assert!((1_200_000..1_400_000).contains(&archetypes.len()));
    }
}
