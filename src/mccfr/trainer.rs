use super::discount::Discount;
use super::discount::Phase;
use super::encoder::Encoder;
use super::exploit;
use super::profile::Profile;
use crate::gameplay::deal::Deal;
use crate::gameplay::history::History;
use crate::Probability;
use crate::Utility;
use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rayon::prelude::*;
use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

/// the CFR+ trainer: repeatedly deals a hand and walks the
/// abstracted betting tree once per seat.
///
/// the traversal is external sampling on the opponent and full
/// enumeration on the walker: opponent decisions sample exactly
/// one action from the current strategy, while every legal walker
/// action is explored and regret-updated against the node's
/// expected utility, weighted by the opponent's reach. recursion
/// depth is bounded by the betting tree (≈ two dozen actions), so
/// plain recursion is fine.
pub struct Trainer {
    profile: Profile,
    encoder: Arc<Encoder>,
    rng: SmallRng,
    delay: usize,
    discount: Option<Discount>,
}

impl Trainer {
    pub fn new(encoder: Arc<Encoder>, seed: u64, delay: usize) -> Self {
        Self::with_profile(Profile::default(), encoder, seed, delay)
    }

    pub fn with_profile(
        profile: Profile,
        encoder: Arc<Encoder>,
        seed: u64,
        delay: usize,
    ) -> Self {
        Self {
            profile,
            encoder,
            rng: SmallRng::seed_from_u64(seed),
            delay,
            discount: None,
        }
    }

    /// opt into DCFR discounting during the warmup phase
    pub fn discounted(mut self, discount: Option<Discount>) -> Self {
        self.discount = discount;
        self
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }
    pub fn into_profile(self) -> Profile {
        self.profile
    }

    /// the single-threaded training loop. the budget is a pair of
    /// limits: an iteration count and an optional wall clock; on
    /// exhaustion the current iteration completes and control
    /// returns, with no partial-iteration state anywhere.
    pub fn train(&mut self, iterations: usize, checkpoint: usize, budget: Option<Duration>) {
        log::info!("{:<32}{:<32}", "training blueprint", iterations);
        let start = Instant::now();
        for i in 1..=iterations {
            self.run_iteration();
            if i % checkpoint == 0 {
                let ref mut probe = SmallRng::seed_from_u64(i as u64);
                let exploit = exploit::exploitability(
                    &self.profile,
                    &self.encoder,
                    crate::CFR_EXPLOIT_SAMPLES.min(64),
                    probe,
                );
                log::info!(
                    "{:<16}{:<16}{:<16}{:<16.2}",
                    "checkpoint",
                    i,
                    self.profile.len(),
                    exploit,
                );
            }
            if let Some(budget) = budget {
                if start.elapsed() > budget {
                    log::warn!("wall clock budget exhausted after {} iterations", i);
                    break;
                }
            }
        }
    }

    /// one epoch: shuffle, then walk the tree once per seat
    pub fn run_iteration(&mut self) {
        let deal = Deal::new(&mut self.rng);
        for walker in 0..crate::N {
            self.iterate(walker, &deal, History::default(), 1., 1.);
        }
        self.profile.next();
    }

    /// returns the walker's expected utility at this history.
    /// regret updates at a node happen only after all of its
    /// child utilities are computed, which is the CFR recurrence.
    fn iterate(
        &mut self,
        walker: usize,
        deal: &Deal,
        history: History,
        p0: Probability,
        p1: Probability,
    ) -> Utility {
        if history.hand_over() {
            return self.encoder.utility(deal, &history, walker);
        }
        let player = history.whose_turn();
        let actions = history.legal_actions();
        let info = self.encoder.info(deal, &history);
        let reach = if player == 0 { p0 } else { p1 };
        let delay = self.delay;
        let discount = self.discount;
        let epoch = self.profile.iterations();
        let phase = Phase::from(epoch);
        let node = self.profile.witness(&info, &actions);
        if let (Some(discount), Phase::Discount) = (discount, phase) {
            node.decay_policy(discount.policy(epoch));
        }
        let strategy = node.current_strategy(reach, delay);
        if player != walker {
            // sample exactly one opponent action from the current
            // strategy and pass its reach weight down
            let weights = strategy.values().copied().collect::<Vec<Probability>>();
            let choice = WeightedIndex::new(weights)
                .expect("strategy sums to one")
                .sample(&mut self.rng);
            let (action, probability) = strategy.into_iter().nth(choice).expect("sampled index");
            let child = history.extend(action).expect("legal continuation");
            let (q0, q1) = match player {
                0 => (p0 * probability, p1),
                _ => (p0, p1 * probability),
            };
            return self.iterate(walker, deal, child, q0, q1);
        }
        // walker: explore every action, then settle regrets
        let mut utilities = Vec::with_capacity(strategy.len());
        let mut expected = 0.;
        for (action, probability) in strategy {
            let child = history.extend(action).expect("legal continuation");
            let (q0, q1) = match player {
                0 => (p0 * probability, p1),
                _ => (p0, p1 * probability),
            };
            let utility = self.iterate(walker, deal, child, q0, q1);
            expected += probability * utility;
            utilities.push((action, utility));
        }
        let counterfactual = if walker == 0 { p1 } else { p0 };
        let node = self
            .profile
            .node_mut(&info)
            .expect("witnessed before recursion");
        for (action, utility) in utilities {
            let delta = counterfactual * (utility - expected);
            match (discount, phase) {
                (Some(discount), Phase::Discount) => {
                    node.add_regret_discounted(&action, delta, discount.regret(epoch, delta));
                }
                _ => node.add_regret(&action, delta),
            }
        }
        expected
    }
}

/// data-parallel training over private shards of the node table.
///
/// each round, every worker clones the merged master, trains a
/// batch of iterations on its private copy, and hands back the
/// componentwise increment it accumulated. the round boundary is
/// the only write-write interaction: a barrier where increments
/// fold into the master with the CFR+ clamp reapplied. workers
/// necessarily act on counterparts that go stale within a round;
/// CFR convergence tolerates that bounded perturbation.
pub fn train_parallel(
    encoder: &Arc<Encoder>,
    seed: u64,
    delay: usize,
    discount: Option<Discount>,
    threads: usize,
    rounds: usize,
    batch: usize,
) -> Profile {
    log::info!(
        "{:<32}{} threads x {} rounds x {} iterations",
        "training blueprint",
        threads,
        rounds,
        batch,
    );
    let mut master = Profile::default();
    for round in 0..rounds {
        let shards = (0..threads)
            .into_par_iter()
            .map(|thread| {
                let worker = crate::save::disk::fingerprint(&(seed, round, thread));
                let mut trainer =
                    Trainer::with_profile(master.clone(), encoder.clone(), worker, delay)
                        .discounted(discount);
                for _ in 0..batch {
                    trainer.run_iteration();
                }
                trainer.into_profile().delta(&master)
            })
            .collect::<Vec<Profile>>();
        for shard in shards.iter() {
            master.absorb(shard);
        }
        log::debug!("{:<16}{:<16}{:<16}", "merged round", round, master.len());
    }
    master
}
