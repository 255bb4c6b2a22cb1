use super::action::Action;
use crate::cards::street::Street;
use crate::error::Error;
use crate::error::Result;
use crate::Chips;
use crate::B_BLIND;
use crate::STACK;

/// chip accounting derived from a betting history.
///
/// contributions are everything a player has put in the pot over
/// the whole hand; the blind arithmetic is folded into the limp
/// and call decodings, so an empty history carries an empty pot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ledger {
    pub pot: Chips,
    pub stacks: [Chips; 2],
    pub contributions: [Chips; 2],
    pub folder: Option<usize>,
}

/// the immutable betting history of one hand: four ordered
/// per-street action lists.
///
/// everything else is derived by folding over the lists with the
/// bet-size decoding rules: pot, stacks, current street, whose
/// turn, legal continuations, terminality. extending returns a
/// fresh value, which keeps CFR traversal free to share histories
/// by reference. player 0 is the dealer and acts first on every
/// street, alternating within a street.
#[derive(Debug, Clone, Default, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct History {
    streets: [Vec<Action>; 4],
}

impl History {
    pub fn streets(&self) -> &[Vec<Action>; 4] {
        &self.streets
    }

    /// append an action after checking it is legal here
    pub fn extend(&self, action: Action) -> Result<Self> {
        if self.legal_actions().contains(&action) {
            Ok(self.with(action))
        } else {
            Err(Error::IllegalAction(format!("{} at {}", action, self)))
        }
    }

    /// unchecked functional append onto the current street
    fn with(&self, action: Action) -> Self {
        let mut child = self.clone();
        child.streets[self.street() as usize].push(action);
        child
    }

    /// fold over all four streets applying the decoding rules.
    /// an OverStack here means the caller constructed an illegal
    /// line, since legal_actions() filters by stack feasibility.
    pub fn ledger(&self) -> Result<Ledger> {
        let mut contributions = [0 as Chips; 2];
        let mut folder = None;
        'hand: for street in self.streets.iter() {
            let mut actor = 0;
            let mut prev_bet: Chips = 0;
            let mut street_put = [0 as Chips; 2];
            for action in street {
                let pot = contributions[0] + contributions[1];
                let amount = match action {
                    Action::Fold => 0,
                    Action::Check => 0,
                    Action::Limp => B_BLIND,
                    Action::Call => street_put[1 - actor] - street_put[actor],
                    Action::Raise => 3 * B_BLIND,
                    Action::ThreeBet | Action::FourBet => 3 * prev_bet,
                    Action::HalfPot => pot / 2,
                    Action::FullPot => pot,
                    Action::MinRaise => 2 * prev_bet,
                    Action::Shove => STACK - contributions[actor],
                };
                let stack = STACK - contributions[actor];
                if amount > stack {
                    return Err(Error::OverStack {
                        bet: amount,
                        stack,
                    });
                }
                contributions[actor] += amount;
                street_put[actor] += amount;
                if action.is_aggressive() {
                    prev_bet = amount;
                }
                if let Action::Fold = action {
                    folder = Some(actor);
                    break 'hand;
                }
                actor = 1 - actor;
            }
        }
        Ok(Ledger {
            pot: contributions[0] + contributions[1],
            stacks: [STACK - contributions[0], STACK - contributions[1]],
            contributions,
            folder,
        })
    }

    pub fn pot(&self) -> Result<Chips> {
        Ok(self.ledger()?.pot)
    }
    pub fn stacks(&self) -> Result<[Chips; 2]> {
        Ok(self.ledger()?.stacks)
    }

    /// a street closes when its list ends in a call, or in two
    /// consecutive checks. once the river closes the hand is over.
    pub fn street(&self) -> Street {
        let mut street = 0;
        for list in self.streets.iter() {
            if Self::closed(list) {
                street += 1;
            } else {
                break;
            }
        }
        Street::from(street)
    }

    fn closed(list: &[Action]) -> bool {
        match list.last() {
            Some(Action::Call) => true,
            Some(Action::Check) => list.len() >= 2 && list[list.len() - 2] == Action::Check,
            _ => false,
        }
    }

    /// next player to act: the dealer opens every street,
    /// alternating within the street
    pub fn whose_turn(&self) -> usize {
        match self.street() {
            Street::Over => 0,
            street => self.streets[street as usize].len() % 2,
        }
    }

    /// terminal iff someone folded, both stacks are in the middle,
    /// or the river closed with a call or double-check
    pub fn hand_over(&self) -> bool {
        if self.street() == Street::Over {
            return true;
        }
        let ledger = self.ledger().expect("consistent history");
        ledger.folder.is_some() || ledger.stacks == [0, 0]
    }

    /// the closed decision table keyed by (street, previous
    /// action), filtered by stack feasibility
    pub fn legal_actions(&self) -> Vec<Action> {
        if self.hand_over() {
            return Vec::new();
        }
        let street = self.street();
        let list = &self.streets[street as usize];
        let candidates: &[Action] = if street == Street::Pref {
            match list.last() {
                None => &[Action::Fold, Action::Limp, Action::Raise],
                Some(Action::Limp) => &[Action::Fold, Action::Call, Action::Raise],
                Some(Action::Raise) => &[Action::Fold, Action::Call, Action::ThreeBet],
                Some(Action::ThreeBet) => {
                    &[Action::Fold, Action::Call, Action::FourBet, Action::Shove]
                }
                Some(Action::FourBet) => &[Action::Fold, Action::Call, Action::Shove],
                Some(Action::Shove) => &[Action::Fold, Action::Call],
                _ => unreachable!("call closes the street, fold ends the hand"),
            }
        } else {
            match list.last() {
                None | Some(Action::Check) => &[
                    Action::Check,
                    Action::HalfPot,
                    Action::FullPot,
                    Action::Shove,
                ],
                Some(Action::HalfPot) | Some(Action::FullPot) | Some(Action::MinRaise) => &[
                    Action::Fold,
                    Action::Call,
                    Action::MinRaise,
                    Action::Shove,
                ],
                Some(Action::Shove) => &[Action::Fold, Action::Call],
                _ => unreachable!("call closes the street, fold ends the hand"),
            }
        };
        candidates
            .iter()
            .copied()
            .filter(|action| self.with(*action).ledger().is_ok())
            .collect()
    }
}

impl std::fmt::Display for History {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for (i, street) in self.streets.iter().enumerate() {
            if i > 0 {
                write!(f, " |")?;
            }
            for action in street {
                write!(f, " {}", action)?;
            }
        }
        Ok(())
    }
}
