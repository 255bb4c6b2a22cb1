use super::histogram::Histogram;
use crate::cards::card::Card;
use crate::cards::deck::Deck;
use crate::cards::hand::Hand;
use crate::evaluator::strength::Strength;
use crate::Equity;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

/// Monte-Carlo estimator of a hand's equity distribution against
/// a uniform opponent range.
///
/// the outer loop runs over sampled opponent holes, the inner
/// loop over board runouts. each opponent contributes a single
/// averaged equity value that lands in one histogram cell; this
/// inside-out ordering is what makes the *distribution* (rather
/// than its expectation) informative. opponent hands are sampled
/// without replacement, runouts without duplicates, and all
/// randomness comes from the caller's rng so estimates are
/// reproducible by seed.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct Sampler {
    pub opponents: usize,
    pub rollouts: usize,
    pub bins: usize,
}

impl Default for Sampler {
    fn default() -> Self {
        Self {
            opponents: crate::OPPONENT_SAMPLES,
            rollouts: crate::ROLLOUT_SAMPLES,
            bins: crate::EQUITY_BINS,
        }
    }
}

impl Sampler {
    pub fn distribution(&self, hole: &[Card], board: &[Card], rng: &mut SmallRng) -> Histogram {
        let dead = Hand::from(hole).extend(board);
        let deck = Deck::without(&dead);
        let mut histogram = Histogram::new(self.bins);
        for villain in self.villains(deck.cards(), rng) {
            histogram.witness(self.equity(hole, board, &villain, deck.cards(), rng));
        }
        histogram
    }

    /// hero's equity against one opponent hand, averaged over
    /// unique runouts of the remaining board
    pub fn equity(
        &self,
        hole: &[Card],
        board: &[Card],
        villain: &[Card; 2],
        deck: &[Card],
        rng: &mut SmallRng,
    ) -> Equity {
        let live = deck
            .iter()
            .filter(|c| !villain.contains(*c))
            .copied()
            .collect::<Vec<Card>>();
        let need = 5 - board.len();
        if need == 0 {
            return Self::showdown(hole, board, villain, &[]);
        }
        let runouts = Self::completions(&live, need, self.rollouts, rng);
        let total = runouts
            .iter()
            .map(|runout| Self::showdown(hole, board, villain, runout))
            .sum::<Equity>();
        total / runouts.len() as Equity
    }

    /// win = 1, tie = 1/2, loss = 0
    fn showdown(hole: &[Card], board: &[Card], villain: &[Card; 2], runout: &[Card]) -> Equity {
        let mut hero = Vec::with_capacity(7);
        let mut oppo = Vec::with_capacity(7);
        hero.extend_from_slice(hole);
        hero.extend_from_slice(board);
        hero.extend_from_slice(runout);
        oppo.extend_from_slice(villain);
        oppo.extend_from_slice(board);
        oppo.extend_from_slice(runout);
        match Strength::from(&hero[..]).cmp(&Strength::from(&oppo[..])) {
            std::cmp::Ordering::Greater => 1.,
            std::cmp::Ordering::Equal => 0.5,
            std::cmp::Ordering::Less => 0.,
        }
    }

    /// distinct two-card opponent hands, uniform without replacement
    fn villains(&self, deck: &[Card], rng: &mut SmallRng) -> Vec<[Card; 2]> {
        let n = deck.len();
        let total = n * (n - 1) / 2;
        if self.opponents >= total {
            let mut pairs = Vec::with_capacity(total);
            for i in 0..n {
                for j in i + 1..n {
                    pairs.push([deck[i], deck[j]]);
                }
            }
            pairs
        } else {
            let mut seen = HashSet::with_capacity(self.opponents);
            let mut pairs = Vec::with_capacity(self.opponents);
            while pairs.len() < self.opponents {
                let i = rng.random_range(0..n);
                let j = rng.random_range(0..n);
                if i == j {
                    continue;
                }
                let key = (i.min(j), i.max(j));
                if seen.insert(key) {
                    pairs.push([deck[key.0], deck[key.1]]);
                }
            }
            pairs
        }
    }

    /// up to `want` unique k-card completions of the board.
    /// when the deck can't supply that many, enumerate them all
    /// instead of rejection-sampling forever.
    fn completions(live: &[Card], k: usize, want: usize, rng: &mut SmallRng) -> Vec<Vec<Card>> {
        let total = Self::choose(live.len(), k);
        if want >= total {
            Self::combinations(live, k)
        } else if want * 2 >= total {
            let mut all = Self::combinations(live, k);
            all.shuffle(rng);
            all.truncate(want);
            all
        } else {
            let mut seen = HashSet::with_capacity(want);
            let mut runouts = Vec::with_capacity(want);
            while runouts.len() < want {
                let mut ids = rand::seq::index::sample(rng, live.len(), k).into_vec();
                ids.sort_unstable();
                let key = ids.iter().fold(0u64, |acc, &i| acc << 6 | (i as u64 + 1));
                if seen.insert(key) {
                    runouts.push(ids.into_iter().map(|i| live[i]).collect());
                }
            }
            runouts
        }
    }

    fn combinations(cards: &[Card], k: usize) -> Vec<Vec<Card>> {
        fn recurse(cards: &[Card], k: usize, from: usize, head: &mut Vec<Card>, out: &mut Vec<Vec<Card>>) {
            if head.len() == k {
                out.push(head.clone());
                return;
            }
            for i in from..cards.len() {
                head.push(cards[i]);
                recurse(cards, k, i + 1, head, out);
                head.pop();
            }
        }
        let mut out = Vec::new();
        recurse(cards, k, 0, &mut Vec::with_capacity(k), &mut out);
        out
    }

    fn choose(n: usize, k: usize) -> usize {
        (0..k).fold(1, |acc, i| acc * (n - i) / (i + 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn cards(names: &[&str]) -> Vec<Card> {
        names.iter().map(|c| c.parse::<Card>().unwrap()).collect()
    }

    fn sampler() -> Sampler {
        Sampler {
            opponents: 50,
            rollouts: 25,
            bins: 50,
        }
    }

    #[test]
    fn distribution_is_normalized() {
        let ref mut rng = SmallRng::seed_from_u64(0);
        let hole = cards(&["Ah", "Kh"]);
        let board = cards(&["2c", "7d", "Ts"]);
        let histogram = sampler().distribution(&hole, &board, rng);
        let total = histogram.densities().iter().sum::<f32>();
        assert!((total - 1.).abs() < 1e-5);
        assert!(histogram.densities().iter().all(|&d| d >= 0.));
    }

    #[test]
    fn the_nuts_have_equity_one() {
        // hero holds a royal flush on the river
        let ref mut rng = SmallRng::seed_from_u64(0);
        let hole = cards(&["As", "Js"]);
        let board = cards(&["Ts", "Qs", "Ks", "2h", "7d"]);
        let histogram = sampler().distribution(&hole, &board, rng);
        assert!(histogram.density(49) == 1.);
        assert!(histogram.mean() > 0.95);
    }

    #[test]
    fn trash_has_low_equity() {
        let ref mut rng = SmallRng::seed_from_u64(0);
        let hole = cards(&["2h", "7c"]);
        let board = cards(&["As", "Ks", "Qd", "Jc", "9h"]);
        let histogram = sampler().distribution(&hole, &board, rng);
        assert!(histogram.mean() < 0.25);
    }

    #[test]
    fn deterministic_by_seed() {
        let hole = cards(&["Ah", "Kh"]);
        let board = cards(&["2c", "7d", "Ts"]);
        let a = sampler().distribution(&hole, &board, &mut SmallRng::seed_from_u64(42));
        let b = sampler().distribution(&hole, &board, &mut SmallRng::seed_from_u64(42));
        assert!(a == b);
    }

    #[test]
    fn river_enumerates_all_opponents() {
        // 45 live cards -> 990 opponent hands, fewer than requested
        let ref mut rng = SmallRng::seed_from_u64(0);
        let hole = cards(&["As", "Js"]);
        let board = cards(&["Ts", "Qs", "Ks", "2h", "7d"]);
        let histogram = Sampler {
            opponents: usize::MAX,
            rollouts: 1,
            bins: 50,
        }
        .distribution(&hole, &board, rng);
        assert!(!histogram.is_empty());
    }

    #[test]
    fn runouts_cap_at_deck_size() {
        // turn: only 44 one-card runouts exist, ask for 100
        let ref mut rng = SmallRng::seed_from_u64(0);
        let live = (0..44u8).map(Card::from).collect::<Vec<Card>>();
        let runouts = Sampler::completions(&live, 1, 100, rng);
        assert!(runouts.len() == 44);
    }

    /// strategically near-identical hands have nearby equity
    /// distributions; different hands are farther apart
    #[test]
    fn emd_separates_hands() {
        use crate::clustering::metric::Metric;
        let near1 = (cards(&["Ac", "Ad"]), cards(&["5d", "3s", "7c"]));
        let near2 = (cards(&["Ac", "Ad"]), cards(&["5d", "3s", "8c"]));
        let far = (cards(&["Ts", "3c"]), cards(&["5c", "Jd", "7d"]));
        let ref mut rng = SmallRng::seed_from_u64(1);
        let h1 = sampler().distribution(&near1.0, &near1.1, rng);
        let ref mut rng = SmallRng::seed_from_u64(2);
        let h2 = sampler().distribution(&near2.0, &near2.1, rng);
        let ref mut rng = SmallRng::seed_from_u64(3);
        let h3 = sampler().distribution(&far.0, &far.1, rng);
        let near = Metric::Emd.distance(&h1, &h2);
        let far = Metric::Emd.distance(&h1, &h3);
        assert!(near < far, "{} < {}", near, far);
    }
}
