use super::card::Card;
use super::hand::Hand;
use rand::seq::SliceRandom;
use rand::Rng;

#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// the 52 cards in canonical (rank-major) order
    pub fn new() -> Deck {
        Deck {
            cards: (0..52).map(Card::from).collect(),
        }
    }
    /// the deck minus any cards already exposed
    pub fn without(dead: &Hand) -> Deck {
        Deck {
            cards: (0..52)
                .map(Card::from)
                .filter(|c| !dead.contains(c))
                .collect(),
        }
    }
    pub fn shuffle<R: Rng>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }
    pub fn draw(&mut self) -> Option<Card> {
        self.cards.pop()
    }
    pub fn len(&self) -> usize {
        self.cards.len()
    }
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_deck() {
        let deck = Deck::new();
        assert!(deck.len() == 52);
    }

    #[test]
    fn without_dead_cards() {
        let dead = Hand::from(&(0..9).map(Card::from).collect::<Vec<_>>()[..]);
        let deck = Deck::without(&dead);
        assert!(deck.len() == 43);
        assert!(deck.cards().iter().all(|c| !dead.contains(c)));
    }
}
