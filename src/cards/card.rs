use super::rank::Rank;
use super::suit::Suit;
use crate::error::Error;
use crate::Arbitrary;

/// one of 52 cards, ordered by rank first so that sorting a
/// street segment is a plain sort
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Card {
    rank: Rank,
    suit: Suit,
}

impl Card {
    pub fn rank(&self) -> Rank {
        self.rank
    }
    pub fn suit(&self) -> Suit {
        self.suit
    }
    pub fn with_suit(&self, suit: Suit) -> Self {
        Self {
            rank: self.rank,
            suit,
        }
    }
}

impl From<(Rank, Suit)> for Card {
    fn from((rank, suit): (Rank, Suit)) -> Self {
        Self { rank, suit }
    }
}

/// u8 isomorphism, rank-major
impl From<Card> for u8 {
    fn from(c: Card) -> u8 {
        (c.rank as u8) * 4 + (c.suit as u8)
    }
}
impl From<u8> for Card {
    fn from(n: u8) -> Self {
        Self {
            rank: Rank::from(n / 4),
            suit: Suit::from(n % 4),
        }
    }
}

/// boundary parsing of "Ah"-style strings
impl std::str::FromStr for Card {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let rank = chars.next().and_then(Rank::parse);
        let suit = chars.next().and_then(Suit::parse);
        match (rank, suit, chars.next()) {
            (Some(rank), Some(suit), None) => Ok(Self { rank, suit }),
            _ => Err(Error::InvalidCard(s.to_string())),
        }
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}

impl Arbitrary for Card {
    fn random() -> Self {
        use rand::Rng;
        Self::from(rand::rng().random_range(0..52u8))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bijective_u8() {
        assert!((0..52u8).all(|n| n == u8::from(Card::from(n))));
    }

    #[test]
    fn parse_roundtrip() {
        for n in 0..52u8 {
            let card = Card::from(n);
            let text = card.to_string();
            assert!(text.parse::<Card>().unwrap() == card);
        }
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("Xx".parse::<Card>().is_err());
        assert!("A".parse::<Card>().is_err());
        assert!("Ahh".parse::<Card>().is_err());
        assert!("1c".parse::<Card>().is_err());
    }

    #[test]
    fn ordered_by_rank() {
        let low: Card = "2s".parse().unwrap();
        let high: Card = "3c".parse().unwrap();
        assert!(low < high);
    }
}
