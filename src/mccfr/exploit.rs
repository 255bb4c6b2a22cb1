use super::encoder::Encoder;
use super::profile::Profile;
use crate::gameplay::deal::Deal;
use crate::gameplay::history::History;
use crate::Probability;
use crate::Utility;
use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::rngs::SmallRng;

/// sampled best-response probe of the average strategy.
///
/// over a sample of deals, a best responder enumerates its own
/// actions and takes the max, while the average-strategy player
/// samples one action per node. averaged over deals and seats
/// this is a noisy upper-bound flavor of exploitability: it
/// trends toward zero as the average strategy approaches
/// equilibrium, which is all the convergence indicator needs.
pub fn exploitability(
    profile: &Profile,
    encoder: &Encoder,
    samples: usize,
    rng: &mut SmallRng,
) -> Utility {
    let mut total = 0.;
    for _ in 0..samples {
        let deal = Deal::new(rng);
        for responder in 0..crate::N {
            total += response(profile, encoder, responder, &deal, History::default(), rng);
        }
    }
    total / samples as Utility / crate::N as Utility
}

fn response(
    profile: &Profile,
    encoder: &Encoder,
    responder: usize,
    deal: &Deal,
    history: History,
    rng: &mut SmallRng,
) -> Utility {
    if history.hand_over() {
        return encoder.utility(deal, &history, responder);
    }
    let player = history.whose_turn();
    let actions = history.legal_actions();
    if player == responder {
        actions
            .into_iter()
            .map(|action| history.extend(action).expect("legal continuation"))
            .map(|child| response(profile, encoder, responder, deal, child, rng))
            .fold(Utility::MIN, Utility::max)
    } else {
        let info = encoder.info(deal, &history);
        let policy = profile.policy(&info, &actions);
        let weights = policy.values().copied().collect::<Vec<Probability>>();
        let choice = WeightedIndex::new(weights)
            .expect("policy sums to one")
            .sample(rng);
        let (action, _) = policy.into_iter().nth(choice).expect("sampled index");
        let child = history.extend(action).expect("legal continuation");
        response(profile, encoder, responder, deal, child, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::trainer::Trainer;
    use rand::SeedableRng;
    use std::sync::Arc;

    #[test]
    fn probe_runs_on_an_untrained_profile() {
        let encoder = Encoder::untrained(0);
        let profile = Profile::default();
        let ref mut rng = SmallRng::seed_from_u64(0);
        let value = exploitability(&profile, &encoder, 2, rng);
        assert!(value.is_finite());
        // the best responder can always at least fold the hand away
        assert!(value >= -(crate::STACK as Utility));
    }

    #[test]
    #[ignore] // slow statistical check of the O(1/sqrt(N)) trend
    fn training_reduces_exploitability() {
        let encoder = Arc::new(Encoder::untrained(5));
        let mut trainer = Trainer::new(encoder.clone(), 5, 0);
        let ref mut rng = SmallRng::seed_from_u64(5);
        let before = exploitability(trainer.profile(), &encoder, 64, rng);
        for _ in 0..2000 {
            trainer.run_iteration();
        }
        let ref mut rng = SmallRng::seed_from_u64(5);
        let after = exploitability(trainer.profile(), &encoder, 64, rng);
        assert!(
            after < before,
            "exploitability did not shrink: {} -> {}",
            before,
            after,
        );
    }
}
