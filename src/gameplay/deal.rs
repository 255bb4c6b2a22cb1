use crate::cards::card::Card;
use crate::cards::deck::Deck;
use crate::cards::hand::Hand;
use crate::cards::street::Street;
use crate::Arbitrary;
use rand::Rng;

/// the chance outcome of one hand: nine cards off a shuffled
/// deck, in the positional convention
/// [hero1 hero2 villain1 villain2 flop1 flop2 flop3 turn river].
///
/// all cards are fixed up front; streets reveal prefixes of the
/// board as the hand progresses. this is what makes traversal
/// deterministic given the deal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deal([Card; 9]);

impl Deal {
    pub fn new<R: Rng>(rng: &mut R) -> Self {
        let mut deck = Deck::new();
        deck.shuffle(rng);
        let mut cards = [Card::from(0u8); 9];
        for slot in cards.iter_mut() {
            *slot = deck.draw().expect("52 > 9");
        }
        Self(cards)
    }

    pub fn hole(&self, player: usize) -> &[Card] {
        assert!(player < crate::N);
        &self.0[2 * player..2 * player + 2]
    }

    /// board cards revealed by the given street
    pub fn board(&self, street: Street) -> &[Card] {
        &self.0[4..4 + street.n_observed()]
    }

    /// what one player can see: their hole plus the board so far
    pub fn observed(&self, player: usize, street: Street) -> Hand {
        Hand::from(self.hole(player)).extend(self.board(street))
    }

    /// the player's 7 showdown cards
    pub fn showdown(&self, player: usize) -> [Card; 7] {
        let hole = self.hole(player);
        let board = self.board(Street::Rive);
        [
            hole[0], hole[1], board[0], board[1], board[2], board[3], board[4],
        ]
    }
}

impl From<[Card; 9]> for Deal {
    fn from(cards: [Card; 9]) -> Self {
        Self(cards)
    }
}

impl Arbitrary for Deal {
    fn random() -> Self {
        Self::new(&mut rand::rng())
    }
}

impl std::fmt::Display for Deal {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} vs {} on {}",
            Hand::from(self.hole(0)),
            Hand::from(self.hole(1)),
            Hand::from(self.board(Street::Rive)),
        )
    }
}
