use super::infoset::Info;
use super::node::Node;
use crate::gameplay::action::Action;
use crate::Probability;
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;

/// the node table: everything learned so far, keyed by infoset.
///
/// grows monotonically during training, frozen into a Blueprint
/// at the end. in parallel mode each worker trains a private
/// clone and the round barrier merges increments back in
/// componentwise; CFR tolerates the staleness this introduces.
#[derive(Debug, Clone, Default)]
pub struct Profile {
    iterations: usize,
    nodes: FxHashMap<Info, Node>,
}

impl Profile {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
    pub fn iterations(&self) -> usize {
        self.iterations
    }
    /// bump the epoch counter, returning the new count
    pub fn next(&mut self) -> usize {
        self.iterations += 1;
        self.iterations
    }

    /// idempotent node creation on first visit
    pub fn witness(&mut self, info: &Info, actions: &[Action]) -> &mut Node {
        self.nodes
            .entry(info.clone())
            .or_insert_with(|| Node::new(actions))
    }

    pub fn node(&self, info: &Info) -> Option<&Node> {
        self.nodes.get(info)
    }
    pub fn node_mut(&mut self, info: &Info) -> Option<&mut Node> {
        self.nodes.get_mut(info)
    }
    pub fn nodes(&self) -> impl Iterator<Item = (&Info, &Node)> {
        self.nodes.iter()
    }

    /// the average strategy at an infoset, uniform over the given
    /// legal actions when the infoset was never visited
    pub fn policy(&self, info: &Info, actions: &[Action]) -> BTreeMap<Action, Probability> {
        match self.nodes.get(info) {
            Some(node) => node.average_strategy(),
            None => {
                let p = 1. / actions.len() as Probability;
                actions.iter().map(|a| (*a, p)).collect()
            }
        }
    }

    /// componentwise difference against a snapshot: the increment
    /// a worker accumulated since it cloned the master
    pub fn delta(&self, base: &Profile) -> Profile {
        Profile {
            iterations: self.iterations - base.iterations,
            nodes: self
                .nodes
                .iter()
                .map(|(info, node)| (info.clone(), node.delta(base.nodes.get(info))))
                .collect(),
        }
    }

    /// the round barrier: accumulate one shard's increments
    pub fn absorb(&mut self, shard: &Profile) {
        self.iterations += shard.iterations;
        for (info, delta) in shard.nodes.iter() {
            self.nodes
                .entry(info.clone())
                .or_default()
                .absorb(delta);
        }
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mut nodes = self.nodes.iter().collect::<Vec<_>>();
        nodes.sort_by(|a, b| a.0.cmp(b.0));
        for (info, node) in nodes {
            writeln!(f, "{}", info)?;
            for (action, probability) in node.average_strategy() {
                writeln!(f, " ├─{}: {:.2}", action, probability)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clustering::abstraction::Abstraction;
    use crate::gameplay::history::History;

    fn info(bucket: u16) -> Info {
        Info::new(Abstraction::Pocket(bucket), History::default())
    }
    fn actions() -> Vec<Action> {
        vec![Action::Fold, Action::Limp, Action::Raise]
    }

    #[test]
    fn witness_is_idempotent() {
        let mut profile = Profile::default();
        profile.witness(&info(1), &actions()).add_regret(&Action::Limp, 5.);
        profile.witness(&info(1), &actions());
        assert!(profile.len() == 1);
        assert!(
            profile
                .node(&info(1))
                .unwrap()
                .memory(&Action::Limp)
                .unwrap()
                .regret()
                == 5.
        );
    }

    #[test]
    fn unseen_infosets_are_uniform() {
        let profile = Profile::default();
        let policy = profile.policy(&info(9), &actions());
        assert!((policy.values().sum::<Probability>() - 1.).abs() < 1e-6);
        assert!(policy.values().all(|&p| (p - 1. / 3.).abs() < 1e-6));
    }

    #[test]
    fn shard_merge_accumulates() {
        let mut master = Profile::default();
        master.witness(&info(1), &actions()).add_regret(&Action::Raise, 2.);
        let mut worker = master.clone();
        worker.next();
        worker.witness(&info(1), &actions()).add_regret(&Action::Raise, 3.);
        worker.witness(&info(2), &actions()).add_regret(&Action::Fold, 1.);
        let delta = worker.delta(&master);
        master.absorb(&delta);
        assert!(master.iterations() == 1);
        assert!(master.len() == 2);
        assert!(
            master
                .node(&info(1))
                .unwrap()
                .memory(&Action::Raise)
                .unwrap()
                .regret()
                == 5.
        );
    }
}
