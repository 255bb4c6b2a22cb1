use super::card::Card;
use crate::error::Error;
use crate::error::Result;
use crate::Arbitrary;

/// an ordered sequence of up to 9 distinct cards.
///
/// the positional convention for a full deal is
/// [hero1 hero2 villain1 villain2 flop1 flop2 flop3 turn river];
/// a player's observed hand is the ≤7-card prefix layout
/// [hole1 hole2 flop1 flop2 flop3 turn river]. order is
/// significant, which is why this is an array and not a bitset.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Hand {
    n: u8,
    cards: [Card; 9],
}

impl Hand {
    pub fn empty() -> Self {
        Self {
            n: 0,
            cards: [Card::from(0u8); 9],
        }
    }
    pub fn len(&self) -> usize {
        self.n as usize
    }
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }
    pub fn cards(&self) -> &[Card] {
        &self.cards[..self.n as usize]
    }
    pub fn contains(&self, card: &Card) -> bool {
        self.cards().contains(card)
    }
    pub fn push(&mut self, card: Card) {
        assert!(self.n < 9, "hand overflow");
        self.cards[self.n as usize] = card;
        self.n += 1;
    }
    pub fn extend(mut self, cards: &[Card]) -> Self {
        for card in cards {
            self.push(*card);
        }
        self
    }

    /// boundary constructor: validates distinctness
    pub fn try_from_cards(cards: &[Card]) -> Result<Self> {
        if cards.len() > 9 {
            return Err(Error::InvalidCard(format!("{} cards", cards.len())));
        }
        for (i, card) in cards.iter().enumerate() {
            if cards[..i].contains(card) {
                return Err(Error::DuplicateCard(card.to_string()));
            }
        }
        Ok(Self::from(cards))
    }
}

impl From<&[Card]> for Hand {
    fn from(cards: &[Card]) -> Self {
        let mut hand = Self::empty();
        for card in cards {
            hand.push(*card);
        }
        hand
    }
}

/// u64 isomorphism.
///
/// cards pack into 6 bits each, offset by one so that 0b000000
/// terminates the sequence. 9 cards * 6 bits = 54 bits.
impl From<Hand> for u64 {
    fn from(hand: Hand) -> u64 {
        hand.cards()
            .iter()
            .rev()
            .fold(0u64, |acc, c| acc << 6 | (u8::from(*c) as u64 + 1))
    }
}
impl From<u64> for Hand {
    fn from(mut bits: u64) -> Self {
        let mut hand = Self::empty();
        while bits & 0x3F != 0 {
            hand.push(Card::from((bits & 0x3F) as u8 - 1));
            bits >>= 6;
        }
        hand
    }
}

impl std::fmt::Display for Hand {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for (i, card) in self.cards().iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", card)?;
        }
        Ok(())
    }
}

impl Arbitrary for Hand {
    fn random() -> Self {
        use rand::seq::SliceRandom;
        let mut deck = (0..52u8).map(Card::from).collect::<Vec<Card>>();
        deck.shuffle(&mut rand::rng());
        Self::from(&deck[..7])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bijective_u64() {
        for _ in 0..100 {
            let hand = Hand::random();
            assert!(hand == Hand::from(u64::from(hand)));
        }
    }

    #[test]
    fn preserves_order() {
        let a: Card = "As".parse().unwrap();
        let b: Card = "2c".parse().unwrap();
        let hand = Hand::from(&[a, b][..]);
        assert!(hand.cards() == &[a, b]);
        assert!(hand != Hand::from(&[b, a][..]));
    }

    #[test]
    fn rejects_duplicates() {
        let a: Card = "As".parse().unwrap();
        assert!(Hand::try_from_cards(&[a, a]).is_err());
    }
}
