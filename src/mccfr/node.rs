use crate::gameplay::action::Action;
use crate::Probability;
use crate::Utility;
use std::collections::BTreeMap;

/// what we remember about one action at one infoset
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Memory {
    regret: Utility,
    policy: Probability,
}

impl Memory {
    pub fn regret(&self) -> Utility {
        self.regret
    }
    pub fn policy(&self) -> Probability {
        self.policy
    }
}

/// the regret-minimization state of one infoset: cumulative
/// counterfactual regret and weighted strategy sum per legal
/// action, plus a visit counter.
///
/// created on first visit, updated on every traversal through it,
/// read when the blueprint is frozen. CFR+ clamps cumulative
/// regrets at zero, which is the whole variant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Node {
    decisions: BTreeMap<Action, Memory>,
    t: usize,
}

impl Node {
    pub fn new(actions: &[Action]) -> Self {
        Self {
            decisions: actions
                .iter()
                .map(|a| (*a, Memory::default()))
                .collect(),
            t: 0,
        }
    }

    pub fn t(&self) -> usize {
        self.t
    }
    pub fn actions(&self) -> Vec<Action> {
        self.decisions.keys().copied().collect()
    }
    pub fn memory(&self, action: &Action) -> Option<&Memory> {
        self.decisions.get(action)
    }

    /// positive-part regret matching. uniform over legal actions
    /// when no positive regret has accumulated. accumulates the
    /// reach-weighted strategy sum as a side effect; under the
    /// delayed-averaging schedule the first `delay` visits don't
    /// count and later ones count linearly, which washes out the
    /// junk strategies of early iterations.
    pub fn current_strategy(
        &mut self,
        reach: Probability,
        delay: usize,
    ) -> BTreeMap<Action, Probability> {
        let positive = self
            .decisions
            .iter()
            .map(|(a, m)| (*a, m.regret.max(0.)))
            .collect::<BTreeMap<Action, Utility>>();
        let sum = positive.values().sum::<Utility>();
        let n = self.decisions.len() as Probability;
        let strategy = positive
            .into_iter()
            .map(|(a, r)| (a, if sum > 0. { r / sum } else { 1. / n }))
            .collect::<BTreeMap<Action, Probability>>();
        let weight = match delay {
            0 => 1.,
            delay => self.t.saturating_sub(delay) as Probability,
        };
        for (action, probability) in strategy.iter() {
            self.decisions
                .get_mut(action)
                .expect("strategy keys are decision keys")
                .policy += weight * reach * probability;
        }
        if reach > 0. {
            self.t += 1;
        }
        strategy
    }

    /// normalized strategy sum; uniform if nothing accumulated yet
    pub fn average_strategy(&self) -> BTreeMap<Action, Probability> {
        let sum = self.decisions.values().map(|m| m.policy).sum::<Probability>();
        let n = self.decisions.len() as Probability;
        self.decisions
            .iter()
            .map(|(a, m)| (*a, if sum > 0. { m.policy / sum } else { 1. / n }))
            .collect()
    }

    /// CFR+ update: cumulative regret never goes negative
    pub fn add_regret(&mut self, action: &Action, delta: Utility) {
        self.add_regret_discounted(action, delta, 1.);
    }

    /// DCFR update: the running total decays by the schedule's
    /// factor before the new regret lands, still clamped
    pub fn add_regret_discounted(&mut self, action: &Action, delta: Utility, factor: f32) {
        let memory = self
            .decisions
            .get_mut(action)
            .expect("regret for a legal action");
        memory.regret = (memory.regret * factor + delta).max(0.);
    }

    /// DCFR decay of the accumulated strategy weight
    pub fn decay_policy(&mut self, factor: f32) {
        for memory in self.decisions.values_mut() {
            memory.policy *= factor;
        }
    }

    /// componentwise difference against the snapshot this node
    /// was cloned from, for shard merging
    pub fn delta(&self, base: Option<&Node>) -> Node {
        match base {
            None => self.clone(),
            Some(base) => Self {
                t: self.t - base.t,
                decisions: self
                    .decisions
                    .iter()
                    .map(|(a, m)| {
                        let b = base.memory(a).copied().unwrap_or_default();
                        (
                            *a,
                            Memory {
                                regret: m.regret - b.regret,
                                policy: m.policy - b.policy,
                            },
                        )
                    })
                    .collect(),
            },
        }
    }

    /// accumulate another shard's increments, re-clamping regrets
    pub fn absorb(&mut self, other: &Node) {
        self.t += other.t;
        for (action, delta) in other.decisions.iter() {
            let memory = self.decisions.entry(*action).or_default();
            memory.regret = (memory.regret + delta.regret).max(0.);
            memory.policy += delta.policy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actions() -> Vec<Action> {
        vec![Action::Fold, Action::Call, Action::Raise]
    }

    #[test]
    fn fresh_node_is_uniform() {
        let mut node = Node::new(&actions());
        let strategy = node.current_strategy(1., 0);
        for p in strategy.values() {
            assert!((p - 1. / 3.).abs() < 1e-6);
        }
    }

    #[test]
    fn regret_matching_is_proportional() {
        let mut node = Node::new(&actions());
        node.add_regret(&Action::Call, 30.);
        node.add_regret(&Action::Raise, 10.);
        let strategy = node.current_strategy(1., 0);
        assert!((strategy[&Action::Call] - 0.75).abs() < 1e-6);
        assert!((strategy[&Action::Raise] - 0.25).abs() < 1e-6);
        assert!(strategy[&Action::Fold] == 0.);
    }

    #[test]
    fn regrets_clamp_at_zero() {
        let mut node = Node::new(&actions());
        node.add_regret(&Action::Fold, -100.);
        assert!(node.memory(&Action::Fold).unwrap().regret() == 0.);
        node.add_regret(&Action::Fold, 5.);
        node.add_regret(&Action::Fold, -3.);
        assert!(node.memory(&Action::Fold).unwrap().regret() == 2.);
    }

    #[test]
    fn average_strategy_normalizes() {
        let mut node = Node::new(&actions());
        node.add_regret(&Action::Call, 1.);
        for _ in 0..10 {
            node.current_strategy(0.5, 0);
        }
        let average = node.average_strategy();
        let total = average.values().sum::<Probability>();
        assert!((total - 1.).abs() < 1e-6);
        assert!(average.values().all(|p| (0. ..=1.).contains(p)));
        assert!(average[&Action::Call] == 1.);
    }

    #[test]
    fn delayed_averaging_skips_early_visits() {
        let mut node = Node::new(&actions());
        for _ in 0..3 {
            node.current_strategy(1., 5);
        }
        // t < delay: nothing accumulated, average falls back to uniform
        let average = node.average_strategy();
        for p in average.values() {
            assert!((p - 1. / 3.).abs() < 1e-6);
        }
    }

    #[test]
    fn delta_and_absorb_roundtrip() {
        let mut base = Node::new(&actions());
        base.add_regret(&Action::Call, 10.);
        base.current_strategy(1., 0);
        let mut branch = base.clone();
        branch.add_regret(&Action::Raise, 4.);
        branch.current_strategy(0.5, 0);
        let delta = branch.delta(Some(&base));
        let mut merged = base.clone();
        merged.absorb(&delta);
        assert!(merged == branch);
    }
}
