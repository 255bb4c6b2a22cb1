use super::evaluator::Evaluator;
use super::kicks::Kickers;
use super::ranking::Ranking;
use crate::cards::card::Card;

/// a hand's strength: category plus kickers, totally ordered.
///
/// two hands compare exactly as they would at showdown, including
/// full kicker comparison. the packed u32 form preserves that
/// order and is what the dense strength table stores.
#[derive(Debug, Clone, Copy, Eq, PartialEq, PartialOrd, Ord)]
pub struct Strength {
    ranking: Ranking,
    kicks: Kickers,
}

impl Strength {
    pub fn ranking(&self) -> Ranking {
        self.ranking
    }
    pub fn kicks(&self) -> Kickers {
        self.kicks
    }
}

impl From<&[Card]> for Strength {
    fn from(cards: &[Card]) -> Self {
        Self::from(Evaluator::from(cards))
    }
}

impl From<Evaluator> for Strength {
    fn from(evaluator: Evaluator) -> Self {
        let ranking = evaluator.find_ranking();
        let kicks = evaluator.find_kickers(ranking);
        Self { ranking, kicks }
    }
}

/// u32 isomorphism.
///
/// [ category:4 | high rank:4 | low rank:4 | kicker mask:13 ]
/// numeric order on the packed value equals Ord on Strength.
impl From<Strength> for u32 {
    fn from(strength: Strength) -> u32 {
        let (category, hi, lo) = match strength.ranking {
            Ranking::HighCard(r) => (0u32, r as u32, 0u32),
            Ranking::OnePair(r) => (1, r as u32, 0),
            Ranking::TwoPair(hi, lo) => (2, hi as u32, lo as u32),
            Ranking::ThreeOAK(r) => (3, r as u32, 0),
            Ranking::Straight(r) => (4, r as u32, 0),
            Ranking::Flush(r) => (5, r as u32, 0),
            Ranking::FullHouse(hi, lo) => (6, hi as u32, lo as u32),
            Ranking::FourOAK(r) => (7, r as u32, 0),
            Ranking::StraightFlush(r) => (8, r as u32, 0),
        };
        category << 21 | hi << 17 | lo << 13 | u16::from(strength.kicks) as u32
    }
}

impl std::fmt::Display for Strength {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:<18}{:>5}", self.ranking, self.kicks)
    }
}
