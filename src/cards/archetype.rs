use super::card::Card;
use super::hand::Hand;
use super::suit::Suit;
use crate::Arbitrary;

/// canonical representative of a hand's equivalence class under
/// suit permutation and within-street reordering.
///
/// the hand layout is [hole1 hole2 | flop1 flop2 flop3 | turn | river]
/// truncated to however many cards have been dealt. hole and flop
/// segments are order-free and get sorted; suits are relabeled onto
/// the palette [s h d c] so that strategically identical hands
/// collapse to one key. flush structure survives because the
/// relabeling is a bijection on suits.
///
/// this runs billions of times during abstraction builds, so it is
/// all fixed-size array work with no allocation beyond the output.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Archetype(Hand);

impl Archetype {
    pub fn hand(&self) -> &Hand {
        &self.0
    }

    /// street segments of a ≤7 card (hole + board) layout
    fn segments(n: usize) -> [(usize, usize); 4] {
        [
            (0, 2.min(n)),
            (2.min(n), 5.min(n)),
            (5.min(n), 6.min(n)),
            (6.min(n), 7.min(n)),
        ]
    }

    /// suits sort ascending by palette position, i.e. s < h < d < c
    fn colex(suit: &Suit) -> u8 {
        3 - u8::from(*suit)
    }

    fn sort(cards: &mut [Card]) {
        let n = cards.len();
        for (lo, hi) in Self::segments(n) {
            cards[lo..hi].sort_by_key(|c| (c.rank(), Self::colex(&c.suit())));
        }
    }
}

impl From<Hand> for Archetype {
    fn from(hand: Hand) -> Self {
        let permutation = Permutation::from(&hand);
        let mut cards = hand
            .cards()
            .iter()
            .map(|c| c.with_suit(permutation.map(&c.suit())))
            .collect::<Vec<Card>>();
        Self::sort(&mut cards);
        Self(Hand::from(&cards[..]))
    }
}

/// u64 isomorphism through the underlying Hand
impl From<Archetype> for u64 {
    fn from(archetype: Archetype) -> u64 {
        u64::from(archetype.0)
    }
}
impl From<u64> for Archetype {
    fn from(bits: u64) -> Self {
        Self(Hand::from(bits))
    }
}

impl std::fmt::Display for Archetype {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Arbitrary for Archetype {
    fn random() -> Self {
        Self::from(Hand::random())
    }
}

/// an assignment of the 4 suits onto the canonical palette.
///
/// suits are ordered by how strongly they are represented,
/// segment by segment: rank-set size first, then the rank set
/// itself, hole cards before board cards. two suits that compare
/// equal everywhere are interchangeable by an automorphism of the
/// hand, so breaking the tie by enum order is harmless. this is
/// what makes the canonical form invariant under any suit
/// permutation of the input, which a naive first-occurrence scan
/// is not when equal ranks straddle suits.
struct Permutation([Suit; 4]);

impl Permutation {
    fn map(&self, suit: &Suit) -> Suit {
        self.0[*suit as usize]
    }

    /// per-suit, per-segment (cardinality, rank mask) signature
    fn signature(hand: &Hand, suit: &Suit) -> [(u8, u16); 4] {
        let cards = hand.cards();
        let mut signature = [(0u8, 0u16); 4];
        for (i, (lo, hi)) in Archetype::segments(cards.len()).into_iter().enumerate() {
            for card in &cards[lo..hi] {
                if card.suit() == *suit {
                    signature[i].0 += 1;
                    signature[i].1 |= u16::from(card.rank());
                }
            }
        }
        signature
    }
}

impl From<&Hand> for Permutation {
    fn from(hand: &Hand) -> Self {
        let mut suits = Suit::all()
            .into_iter()
            .map(|suit| (Self::signature(hand, &suit), suit))
            .collect::<Vec<_>>();
        suits.sort_by(|a, b| b.cmp(a)); // strongest representation first
        let mut permutation = Suit::all();
        for (i, (_, suit)) in suits.into_iter().enumerate() {
            permutation[suit as usize] = Suit::palette()[i];
        }
        Self(permutation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::seq::SliceRandom;
    use rand::Rng;

    fn hand(cards: &[&str]) -> Hand {
        Hand::from(
            &cards
                .iter()
                .map(|c| c.parse::<Card>().unwrap())
                .collect::<Vec<Card>>()[..],
        )
    }

    fn permute(hand: &Hand, permutation: &[Suit; 4]) -> Hand {
        Hand::from(
            &hand
                .cards()
                .iter()
                .map(|c| c.with_suit(permutation[c.suit() as usize]))
                .collect::<Vec<Card>>()[..],
        )
    }

    #[test]
    fn idempotent() {
        for _ in 0..1000 {
            let archetype = Archetype::random();
            assert!(Archetype::from(*archetype.hand()) == archetype);
        }
    }

    #[test]
    fn idempotent_on_tied_ranks() {
        // a pair whose suits reappear later is the hard case
        let tricky = hand(&["Ah", "Kh", "2c", "2d", "9d"]);
        let archetype = Archetype::from(tricky);
        assert!(Archetype::from(*archetype.hand()) == archetype);
    }

    #[test]
    fn invariant_under_suit_permutation() {
        let ref mut rng = rand::rng();
        for _ in 0..1000 {
            let original = Hand::random();
            let mut permutation = Suit::all();
            permutation.shuffle(rng);
            let permuted = permute(&original, &permutation);
            assert!(
                Archetype::from(original) == Archetype::from(permuted),
                "{} vs {}",
                original,
                permuted,
            );
        }
    }

    #[test]
    fn invariant_under_tied_suit_permutation() {
        let original = hand(&["Ah", "Kh", "2c", "2d", "9d"]);
        let swapped = hand(&["Ah", "Kh", "2d", "2c", "9c"]);
        assert!(Archetype::from(original) == Archetype::from(swapped));
    }

    #[test]
    fn invariant_under_street_reorder() {
        let ref mut rng = rand::rng();
        for _ in 0..1000 {
            let original = Hand::random();
            let mut cards = original.cards().to_vec();
            if rng.random::<bool>() {
                cards.swap(0, 1);
            }
            cards[2..5].shuffle(rng);
            let reordered = Hand::from(&cards[..]);
            assert!(Archetype::from(original) == Archetype::from(reordered));
        }
    }

    #[test]
    fn pocket_aces_collapse() {
        let a = hand(&["Ac", "Ad"]);
        let b = hand(&["Ah", "As"]);
        let c = hand(&["Kc", "Kd"]);
        assert!(Archetype::from(a) == Archetype::from(b));
        assert!(Archetype::from(a) != Archetype::from(c));
    }

    #[test]
    fn flush_structure_preserved() {
        let suited = hand(&["Ah", "Kh"]);
        let offsuit = hand(&["Ah", "Ks"]);
        assert!(Archetype::from(suited) != Archetype::from(offsuit));
    }
}
