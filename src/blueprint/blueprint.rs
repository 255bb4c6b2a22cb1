use super::translate;
use super::translate::WireHistory;
use crate::cards::card::Card;
use crate::cards::deck::Deck;
use crate::cards::hand::Hand;
use crate::error::Error;
use crate::error::Result;
use crate::gameplay::action::Action;
use crate::gameplay::deal::Deal;
use crate::mccfr::encoder::Encoder;
use crate::mccfr::infoset::Info;
use crate::mccfr::profile::Profile;
use crate::save::Artifact;
use crate::save::Header;
use crate::Chips;
use crate::Probability;
use byteorder::ReadBytesExt;
use byteorder::WriteBytesExt;
use byteorder::BE;
use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::rngs::SmallRng;
use serde::Deserialize;
use serde::Serialize;
use std::path::Path;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

/// what the query API hands back: an abstract action name and the
/// concrete chips it decodes to at the queried state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reply {
    pub action: String,
    pub amount: Chips,
}

/// the frozen average strategy, indexed for online queries.
///
/// a flat array of (action, probability) records plus a
/// fingerprint-sorted index mapping infosets to their slice.
/// no per-node allocation, no pointers, trivially serializable.
/// the query path never aborts: an infoset the blueprint has
/// never seen falls back to the uniform distribution over legal
/// actions, counted and logged but not fatal.
pub struct Blueprint {
    index: Vec<(u64, u32, u8)>,
    records: Vec<(Action, Probability)>,
    misses: AtomicUsize,
}

impl From<&Profile> for Blueprint {
    fn from(profile: &Profile) -> Self {
        let mut frozen = profile
            .nodes()
            .map(|(info, node)| (info.fingerprint(), node.average_strategy()))
            .collect::<Vec<_>>();
        frozen.sort_by_key(|(fingerprint, _)| *fingerprint);
        let mut index = Vec::with_capacity(frozen.len());
        let mut records = Vec::new();
        for (fingerprint, strategy) in frozen {
            index.push((fingerprint, records.len() as u32, strategy.len() as u8));
            records.extend(strategy);
        }
        debug_assert!(index.windows(2).all(|w| w[0].0 != w[1].0));
        Self {
            index,
            records,
            misses: AtomicUsize::new(0),
        }
    }
}

impl Blueprint {
    pub fn len(&self) -> usize {
        self.index.len()
    }
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
    /// how many queries fell through to the uniform fallback
    pub fn misses(&self) -> usize {
        self.misses.load(Ordering::Relaxed)
    }

    /// the stored average strategy for an infoset, if trained
    pub fn policy(&self, info: &Info) -> Option<Vec<(Action, Probability)>> {
        let fingerprint = info.fingerprint();
        self.index
            .binary_search_by_key(&fingerprint, |(f, _, _)| *f)
            .ok()
            .map(|i| {
                let (_, offset, n) = self.index[i];
                self.records[offset as usize..offset as usize + n as usize].to_vec()
            })
    }

    /// answer a live query: translate the observed history onto
    /// the tree, form the infoset, sample from the stored average
    /// strategy, and decode the chips.
    pub fn query(
        &self,
        encoder: &Encoder,
        hole: &[Card],
        community: &[Card],
        wire: &WireHistory,
        rng: &mut SmallRng,
    ) -> Result<Reply> {
        if hole.len() != 2 {
            return Err(Error::InvalidCard(format!("{} hole cards", hole.len())));
        }
        let known = hole
            .iter()
            .chain(community.iter())
            .copied()
            .collect::<Vec<Card>>();
        Hand::try_from_cards(&known)?;
        let history = translate::history(wire, rng)?;
        if history.hand_over() {
            return Ok(Reply {
                action: Action::Fold.to_string(),
                amount: 0,
            });
        }
        if history.street().n_observed() != community.len() {
            return Err(Error::IllegalAction(format!(
                "{} community cards on the {}",
                community.len(),
                history.street()
            )));
        }
        let player = history.whose_turn();
        let deal = Self::pseudo_deal(hole, community, player);
        let info = encoder.info(&deal, &history);
        let legal = history.legal_actions();
        let strategy = match self.policy(&info) {
            Some(strategy) => strategy,
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                log::debug!("blueprint miss at {}", info);
                let p = 1. / legal.len() as Probability;
                legal.iter().map(|a| (*a, p)).collect()
            }
        };
        let weights = strategy.iter().map(|(_, p)| *p).collect::<Vec<_>>();
        let choice = WeightedIndex::new(weights)
            .map_err(|_| Error::UnknownInfoSet(info.to_string()))?
            .sample(rng);
        let (action, _) = strategy[choice];
        let amount = match action {
            Action::Fold | Action::Check => 0,
            action => translate::amount_of(&history, action),
        };
        Ok(Reply {
            action: action.to_string(),
            amount,
        })
    }

    /// the never-fails wrapper the interactive collaborators use:
    /// any unrecoverable error degrades to a fold so the game can
    /// continue
    pub fn respond(
        &self,
        encoder: &Encoder,
        hole: &[Card],
        community: &[Card],
        wire: &WireHistory,
        rng: &mut SmallRng,
    ) -> Reply {
        match self.query(encoder, hole, community, wire, rng) {
            Ok(reply) => reply,
            Err(e) => {
                log::warn!("query degraded to fold: {}", e);
                Reply {
                    action: Action::Fold.to_string(),
                    amount: 0,
                }
            }
        }
    }

    /// the hero's cards are all a query knows; the rest of the
    /// deal is irrelevant padding, since bucket dispatch only ever
    /// reads the acting player's hole and the revealed board
    fn pseudo_deal(hole: &[Card], community: &[Card], player: usize) -> Deal {
        let dead = Hand::from(hole).extend(community);
        let mut filler = Deck::without(&dead);
        let mut cards = [Card::from(0u8); 9];
        cards[2 * player] = hole[0];
        cards[2 * player + 1] = hole[1];
        for (i, card) in community.iter().enumerate() {
            cards[4 + i] = *card;
        }
        let villain = 2 * (1 - player);
        cards[villain] = filler.draw().expect("cards remain");
        cards[villain + 1] = filler.draw().expect("cards remain");
        for slot in 4 + community.len()..9 {
            cards[slot] = filler.draw().expect("cards remain");
        }
        Deal::from(cards)
    }

    //

    fn header() -> Header {
        Header {
            kind: Artifact::Blueprint,
            fingerprint: 0,
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        log::info!("{:<32}{:<32}", "saving blueprint", path.display());
        let mut file = Self::header().create(path)?;
        file.write_u32::<BE>(self.index.len() as u32)?;
        for (fingerprint, offset, n) in self.index.iter() {
            file.write_u64::<BE>(*fingerprint)?;
            file.write_u8(*n)?;
            let slice = &self.records[*offset as usize..*offset as usize + *n as usize];
            for (action, probability) in slice {
                file.write_u8(u8::from(*action))?;
                file.write_f32::<BE>(*probability)?;
            }
        }
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        log::info!("{:<32}{:<32}", "loading blueprint", path.display());
        let mut file = Self::header().open(path)?;
        let n = file.read_u32::<BE>()? as usize;
        let mut index = Vec::with_capacity(n);
        let mut records = Vec::new();
        for _ in 0..n {
            let fingerprint = file.read_u64::<BE>()?;
            let count = file.read_u8()?;
            index.push((fingerprint, records.len() as u32, count));
            for _ in 0..count {
                let action = Action::from(file.read_u8()?);
                let probability = file.read_f32::<BE>()?;
                records.push((action, probability));
            }
        }
        Ok(Self {
            index,
            records,
            misses: AtomicUsize::new(0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mccfr::trainer::Trainer;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn cards(names: &[&str]) -> Vec<Card> {
        names.iter().map(|c| c.parse::<Card>().unwrap()).collect()
    }

    fn trained() -> (Arc<Encoder>, Blueprint) {
        let encoder = Arc::new(Encoder::untrained(11));
        let mut trainer = Trainer::new(encoder.clone(), 11, 0);
        for _ in 0..30 {
            trainer.run_iteration();
        }
        (encoder, Blueprint::from(trainer.profile()))
    }

    #[test]
    fn serialization_roundtrips_distributions() {
        let (_, blueprint) = trained();
        let dir = std::env::temp_dir().join("hupoker-blueprint-test");
        let path = dir.join("blueprint");
        blueprint.save(&path).unwrap();
        let loaded = Blueprint::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert!(loaded.len() == blueprint.len());
        assert!(loaded.index == blueprint.index);
        assert!(loaded.records.len() == blueprint.records.len());
        for ((a, p), (b, q)) in blueprint.records.iter().zip(loaded.records.iter()) {
            assert!(a == b);
            assert!((p - q).abs() < 1e-6);
        }
    }

    #[test]
    fn preflop_query_answers_from_the_alphabet() {
        let (encoder, blueprint) = trained();
        let ref mut rng = SmallRng::seed_from_u64(0);
        let reply = blueprint
            .query(
                &encoder,
                &cards(&["As", "Ad"]),
                &[],
                &WireHistory::default(),
                rng,
            )
            .unwrap();
        assert!(["fold", "limp", "raise"].contains(&reply.action.as_str()));
        match reply.action.as_str() {
            "fold" => assert!(reply.amount == 0),
            "limp" => assert!(reply.amount == crate::B_BLIND),
            _ => assert!(reply.amount == 3 * crate::B_BLIND),
        }
    }

    #[test]
    fn query_rejects_malformed_input() {
        let (encoder, blueprint) = trained();
        let ref mut rng = SmallRng::seed_from_u64(0);
        // one hole card
        assert!(blueprint
            .query(&encoder, &cards(&["As"]), &[], &WireHistory::default(), rng)
            .is_err());
        // duplicate between hole and board
        assert!(blueprint
            .query(
                &encoder,
                &cards(&["As", "Ad"]),
                &cards(&["As", "Kh", "Qd"]),
                &WireHistory::default(),
                rng,
            )
            .is_err());
        // board size does not match the translated street
        assert!(blueprint
            .query(
                &encoder,
                &cards(&["As", "Ad"]),
                &cards(&["2c", "7h", "Td"]),
                &WireHistory::default(),
                rng,
            )
            .is_err());
    }

    #[test]
    fn respond_never_fails() {
        let (encoder, blueprint) = trained();
        let ref mut rng = SmallRng::seed_from_u64(0);
        let reply = blueprint.respond(&encoder, &cards(&["As"]), &[], &WireHistory::default(), rng);
        assert!(reply.action == "fold");
        assert!(reply.amount == 0);
    }

    #[test]
    fn unseen_infosets_fall_back_to_uniform() {
        let encoder = Arc::new(Encoder::untrained(12));
        let blueprint = Blueprint::from(&Profile::default());
        let ref mut rng = SmallRng::seed_from_u64(0);
        let reply = blueprint
            .query(
                &encoder,
                &cards(&["As", "Ad"]),
                &[],
                &WireHistory::default(),
                rng,
            )
            .unwrap();
        assert!(blueprint.misses() == 1);
        assert!(["fold", "limp", "raise"].contains(&reply.action.as_str()));
    }
}
