use super::kicks::Kickers;
use super::ranking::Ranking;
use crate::cards::card::Card;
use crate::cards::rank::Rank;
use crate::cards::suit::Suit;

/// finds the best 5-card ranking hiding inside a 5-7 card set.
///
/// the card list collapses into three compact views: per-rank
/// counts, per-suit rank masks, and the union rank mask. every
/// category check is then a handful of bit and count operations,
/// searched in descending category order so the first hit wins.
/// note that in 7 cards a flush cannot coexist with a full house
/// or quads, so checking the flush family first is safe.
pub struct Evaluator {
    rank_counts: [u8; 13],
    suit_masks: [u16; 4],
    rank_mask: u16,
}

impl From<&[Card]> for Evaluator {
    fn from(cards: &[Card]) -> Self {
        let mut rank_counts = [0u8; 13];
        let mut suit_masks = [0u16; 4];
        let mut rank_mask = 0u16;
        for card in cards {
            let rank = u8::from(card.rank());
            let suit = u8::from(card.suit());
            rank_counts[rank as usize] += 1;
            suit_masks[suit as usize] |= u16::from(card.rank());
            rank_mask |= u16::from(card.rank());
        }
        Self {
            rank_counts,
            suit_masks,
            rank_mask,
        }
    }
}

impl Evaluator {
    pub fn find_ranking(&self) -> Ranking {
        None.or_else(|| self.find_flush())
            .or_else(|| self.find_4_oak())
            .or_else(|| self.find_3_oak_2_oak())
            .or_else(|| self.find_straight())
            .or_else(|| self.find_3_oak())
            .or_else(|| self.find_2_oak_2_oak())
            .or_else(|| self.find_2_oak())
            .or_else(|| self.find_1_oak())
            .expect("at least one card")
    }

    pub fn find_kickers(&self, ranking: Ranking) -> Kickers {
        let n = ranking.n_kickers();
        if n == 0 {
            return Kickers::default();
        }
        let mut bits = match ranking {
            Ranking::TwoPair(hi, lo) => self.rank_mask & !(u16::from(hi) | u16::from(lo)),
            Ranking::HighCard(hi)
            | Ranking::OnePair(hi)
            | Ranking::ThreeOAK(hi)
            | Ranking::FourOAK(hi) => self.rank_mask & !u16::from(hi),
            Ranking::Flush(hi) => {
                let suit = self.find_suit_of_flush().expect("flush was found");
                self.suit_masks[suit as usize] & !u16::from(hi)
            }
            _ => unreachable!("no kickers"),
        };
        while bits.count_ones() as usize > n {
            bits &= !(1 << bits.trailing_zeros());
        }
        Kickers::from(bits)
    }

    //

    fn find_1_oak(&self) -> Option<Ranking> {
        self.find_rank_of_n_oak(1, None).map(Ranking::HighCard)
    }
    fn find_2_oak(&self) -> Option<Ranking> {
        self.find_rank_of_n_oak(2, None).map(Ranking::OnePair)
    }
    fn find_3_oak(&self) -> Option<Ranking> {
        self.find_rank_of_n_oak(3, None).map(Ranking::ThreeOAK)
    }
    fn find_4_oak(&self) -> Option<Ranking> {
        self.find_rank_of_n_oak(4, None).map(Ranking::FourOAK)
    }
    fn find_2_oak_2_oak(&self) -> Option<Ranking> {
        self.find_rank_of_n_oak(2, None).and_then(|hi| {
            self.find_rank_of_n_oak(2, Some(hi))
                .map(|lo| Ranking::TwoPair(hi, lo))
        })
    }
    fn find_3_oak_2_oak(&self) -> Option<Ranking> {
        self.find_rank_of_n_oak(3, None).and_then(|trips| {
            self.find_rank_of_n_oak(2, Some(trips))
                .map(|pairs| Ranking::FullHouse(trips, pairs))
        })
    }
    fn find_straight(&self) -> Option<Ranking> {
        self.find_rank_of_straight(self.rank_mask)
            .map(Ranking::Straight)
    }
    fn find_flush(&self) -> Option<Ranking> {
        self.find_suit_of_flush().map(|suit| {
            let bits = self.suit_masks[suit as usize];
            match self.find_rank_of_straight(bits) {
                Some(rank) => Ranking::StraightFlush(rank),
                None => Ranking::Flush(Rank::from(bits)),
            }
        })
    }

    //

    fn find_rank_of_straight(&self, mask: u16) -> Option<Rank> {
        const WHEEL: u16 = 0b_1000000001111;
        let mut bits = mask;
        bits &= bits << 1;
        bits &= bits << 1;
        bits &= bits << 1;
        bits &= bits << 1;
        if bits > 0 {
            Some(Rank::from(bits))
        } else if WHEEL == (WHEEL & mask) {
            Some(Rank::Five)
        } else {
            None
        }
    }
    fn find_suit_of_flush(&self) -> Option<Suit> {
        self.suit_masks
            .iter()
            .position(|mask| mask.count_ones() >= 5)
            .map(|i| Suit::from(i as u8))
    }
    /// highest rank strictly below the cap held at least n times
    fn find_rank_of_n_oak(&self, n: u8, below: Option<Rank>) -> Option<Rank> {
        let cap = below.map(|r| r as usize).unwrap_or(13);
        (0..cap)
            .rev()
            .find(|&r| self.rank_counts[r] >= n)
            .map(|r| Rank::from(r as u8))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranking(cards: &[&str]) -> Ranking {
        let cards = cards
            .iter()
            .map(|c| c.parse::<Card>().unwrap())
            .collect::<Vec<Card>>();
        Evaluator::from(&cards[..]).find_ranking()
    }

    #[test]
    fn high_card() {
        assert_eq!(
            ranking(&["As", "Kh", "Qd", "Jc", "9s"]),
            Ranking::HighCard(Rank::Ace)
        );
    }

    #[test]
    fn one_pair() {
        assert_eq!(
            ranking(&["As", "Ah", "Kd", "Qc", "Js"]),
            Ranking::OnePair(Rank::Ace)
        );
    }

    #[test]
    fn two_pair() {
        assert_eq!(
            ranking(&["As", "Ah", "Kd", "Kc", "Qs"]),
            Ranking::TwoPair(Rank::Ace, Rank::King)
        );
    }

    #[test]
    fn three_oak() {
        assert_eq!(
            ranking(&["As", "Ah", "Ad", "Kc", "Qs"]),
            Ranking::ThreeOAK(Rank::Ace)
        );
    }

    #[test]
    fn broadway_straight() {
        assert_eq!(
            ranking(&["Ts", "Jh", "Qd", "Kc", "As"]),
            Ranking::Straight(Rank::Ace)
        );
    }

    #[test]
    fn wheel_straight() {
        assert_eq!(
            ranking(&["As", "2h", "3d", "4c", "5s"]),
            Ranking::Straight(Rank::Five)
        );
    }

    #[test]
    fn flush() {
        assert_eq!(
            ranking(&["As", "Ks", "Qs", "Js", "9s"]),
            Ranking::Flush(Rank::Ace)
        );
    }

    #[test]
    fn full_house() {
        assert_eq!(
            ranking(&["As", "Ah", "Ad", "Kc", "Ks"]),
            Ranking::FullHouse(Rank::Ace, Rank::King)
        );
    }

    #[test]
    fn four_oak() {
        assert_eq!(
            ranking(&["As", "Ah", "Ad", "Ac", "Ks"]),
            Ranking::FourOAK(Rank::Ace)
        );
    }

    #[test]
    fn royal_flush() {
        assert_eq!(
            ranking(&["Ts", "Js", "Qs", "Ks", "As"]),
            Ranking::StraightFlush(Rank::Ace)
        );
    }

    #[test]
    fn wheel_straight_flush() {
        assert_eq!(
            ranking(&["As", "2s", "3s", "4s", "5s"]),
            Ranking::StraightFlush(Rank::Five)
        );
    }

    #[test]
    fn flush_beats_straight_in_seven() {
        assert_eq!(
            ranking(&["4h", "6h", "7h", "8h", "9h", "Ts"]),
            Ranking::Flush(Rank::Nine)
        );
    }

    #[test]
    fn full_house_from_two_trips() {
        assert_eq!(
            ranking(&["As", "Ah", "Ad", "Kc", "Ks", "Kh", "Qd"]),
            Ranking::FullHouse(Rank::Ace, Rank::King)
        );
    }

    #[test]
    fn four_oak_over_full_house() {
        assert_eq!(
            ranking(&["As", "Ah", "Ad", "Ac", "Ks", "Kh", "Qd"]),
            Ranking::FourOAK(Rank::Ace)
        );
    }

    #[test]
    fn straight_flush_over_four_oak() {
        assert_eq!(
            ranking(&["Ts", "Js", "Qs", "Ks", "As", "Ah", "Ad"]),
            Ranking::StraightFlush(Rank::Ace)
        );
    }

    #[test]
    fn three_pairs_is_two_pair() {
        assert_eq!(
            ranking(&["As", "Ah", "Kd", "Kc", "Qs", "Qh", "Jd"]),
            Ranking::TwoPair(Rank::Ace, Rank::King)
        );
    }

    #[test]
    fn six_card_low_straight() {
        assert_eq!(
            ranking(&["As", "2s", "3h", "4d", "5c", "6s"]),
            Ranking::Straight(Rank::Six)
        );
    }

    #[test]
    fn kickers_trim_to_top() {
        let cards = ["As", "Ah", "Kd", "Qc", "Js", "9h", "2d"]
            .iter()
            .map(|c| c.parse::<Card>().unwrap())
            .collect::<Vec<Card>>();
        let evaluator = Evaluator::from(&cards[..]);
        let ranking = evaluator.find_ranking();
        let kickers = evaluator.find_kickers(ranking);
        assert_eq!(ranking, Ranking::OnePair(Rank::Ace));
        assert_eq!(kickers.ranks(), vec![Rank::King, Rank::Queen, Rank::Jack]);
    }

    #[test]
    fn flush_kickers_stay_in_suit() {
        let cards = ["As", "9s", "8s", "7s", "2s", "Kh", "Qd"]
            .iter()
            .map(|c| c.parse::<Card>().unwrap())
            .collect::<Vec<Card>>();
        let evaluator = Evaluator::from(&cards[..]);
        let ranking = evaluator.find_ranking();
        let kickers = evaluator.find_kickers(ranking);
        assert_eq!(ranking, Ranking::Flush(Rank::Ace));
        assert_eq!(
            kickers.ranks(),
            vec![Rank::Nine, Rank::Eight, Rank::Seven, Rank::Two]
        );
    }
}
