use crate::error::Error;
use crate::error::Result;
use crate::gameplay::action::Action;
use crate::gameplay::history::History;
use crate::Chips;
use crate::Probability;
use rand::rngs::SmallRng;
use rand::Rng;
use serde::Deserialize;
use serde::Serialize;

/// one observed action on the wire: either a symbol from the
/// abstracted alphabet, or a generic bet/raise with its chip
/// amount that still needs translating onto the tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wire {
    pub action: String,
    #[serde(default)]
    pub amount: Option<Chips>,
}

/// the four-list betting history as external collaborators see it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WireHistory {
    #[serde(default)]
    pub preflop: Vec<Wire>,
    #[serde(default)]
    pub flop: Vec<Wire>,
    #[serde(default)]
    pub turn: Vec<Wire>,
    #[serde(default)]
    pub river: Vec<Wire>,
}

impl WireHistory {
    /// the HTTP and CLI collaborators speak JSON
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::IllegalAction(e.to_string()))
    }
}

/// replay an observed history onto the abstracted tree.
///
/// each entry must continue legally from where the previous ones
/// left off; symbols that already live in the alphabet pass
/// through, and raw bet sizes map to the nearest legal abstracted
/// bet by the pseudo-harmonic rule. streets that fail to chain
/// legally surface as IllegalAction rather than silently warping
/// the line.
pub fn history(wire: &WireHistory, rng: &mut SmallRng) -> Result<History> {
    let mut history = History::default();
    for street in [&wire.preflop, &wire.flop, &wire.turn, &wire.river] {
        for entry in street {
            let action = resolve(&history, entry, rng)?;
            history = history.extend(action)?;
        }
    }
    Ok(history)
}

fn resolve(history: &History, entry: &Wire, rng: &mut SmallRng) -> Result<Action> {
    let legal = history.legal_actions();
    if let Ok(action) = entry.action.parse::<Action>() {
        if legal.contains(&action) {
            return Ok(action);
        }
        // a call that opens the preflop is our limp
        if action == Action::Call && legal.contains(&Action::Limp) {
            return Ok(Action::Limp);
        }
    }
    match (entry.action.as_str(), entry.amount) {
        ("fold", _) => Ok(Action::Fold),
        ("check", _) if legal.contains(&Action::Check) => Ok(Action::Check),
        ("bet" | "raise" | "3-bet" | "4-bet" | "all-in" | "all_in", Some(amount)) => {
            Ok(nearest(history, &legal, amount, rng))
        }
        // a sizeless jam maps to the biggest bet the tree offers
        ("all-in" | "all_in", None) => Ok(nearest(history, &legal, Chips::MAX, rng)),
        // a sizeless raise only resolves when one continuation fits
        ("bet" | "raise", None) => {
            let mut aggressive = legal.iter().filter(|a| a.is_aggressive() && **a != Action::Limp);
            match (aggressive.next(), aggressive.next()) {
                (Some(action), None) => Ok(*action),
                _ => Err(Error::IllegalAction(format!(
                    "ambiguous sizeless raise at {}",
                    history
                ))),
            }
        }
        _ => Err(Error::IllegalAction(format!(
            "{} at {}",
            entry.action, history
        ))),
    }
}

/// translate an off-tree bet size onto the closest legal
/// aggressive action
fn nearest(history: &History, legal: &[Action], amount: Chips, rng: &mut SmallRng) -> Action {
    let pot = history.pot().expect("consistent history");
    let mut sizes = legal
        .iter()
        .filter(|a| a.is_aggressive())
        .map(|a| (*a, amount_of(history, *a)))
        .collect::<Vec<(Action, Chips)>>();
    sizes.sort_by_key(|(_, chips)| *chips);
    if sizes.is_empty() {
        // facing an all-in there is nothing aggressive left;
        // an observed bet can only mean a call
        return legal
            .iter()
            .copied()
            .find(|a| *a == Action::Call)
            .unwrap_or(Action::Fold);
    }
    let below = sizes.iter().rev().find(|(_, chips)| *chips <= amount);
    let above = sizes.iter().find(|(_, chips)| *chips >= amount);
    match (below, above) {
        (None, Some((action, _))) => *action,
        (Some((action, _)), None) => *action,
        (Some((small, a)), Some((_, b))) if a == b => *small,
        (Some((small, a)), Some((large, b))) => {
            if pot == 0 {
                // no pot to take fractions of: nearest chips wins
                if amount - a <= b - amount {
                    *small
                } else {
                    *large
                }
            } else {
                let f = amount as Probability / pot as Probability;
                let a = *a as Probability / pot as Probability;
                let b = *b as Probability / pot as Probability;
                if rng.random::<Probability>() < pseudo_harmonic(f, a, b) {
                    *large
                } else {
                    *small
                }
            }
        }
        (None, None) => unreachable!("sizes is nonempty"),
    }
}

/// probability of rounding an off-tree pot fraction f up to b
/// rather than down to a, for on-tree fractions a < f < b
fn pseudo_harmonic(f: Probability, a: Probability, b: Probability) -> Probability {
    (f - a) * (1. + a) / ((b - f) * (1. + a) + (f - a) * (1. + b))
}

/// the chips an action would add to the pot if played here
pub fn amount_of(history: &History, action: Action) -> Chips {
    let before = history.pot().expect("consistent history");
    let after = history
        .extend(action)
        .expect("legal action")
        .pot()
        .expect("consistent extension");
    after - before
}
