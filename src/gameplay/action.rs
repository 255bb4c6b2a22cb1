use crate::error::Error;
use serde::Deserialize;
use serde::Serialize;

/// the closed action alphabet of the abstracted betting tree.
///
/// preflop speaks {fold, limp, call, raise, 3-bet, 4-bet, all-in};
/// postflop speaks {fold, check, call, half-pot, pot, min-raise,
/// all-in}. each symbol decodes to a concrete chip amount from the
/// pot and stack state where it is played; the encoding is lossy
/// but finite, which is the entire point of the bet abstraction.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Action {
    #[serde(rename = "fold")]
    Fold,
    #[serde(rename = "check")]
    Check,
    #[serde(rename = "limp")]
    Limp,
    #[serde(rename = "call")]
    Call,
    #[serde(rename = "raise")]
    Raise,
    #[serde(rename = "3-bet", alias = "3_bet", alias = "three_bet")]
    ThreeBet,
    #[serde(rename = "4-bet", alias = "4_bet", alias = "four_bet")]
    FourBet,
    #[serde(rename = "half_pot", alias = "half-pot")]
    HalfPot,
    #[serde(rename = "pot")]
    FullPot,
    #[serde(rename = "min_raise", alias = "min-raise")]
    MinRaise,
    #[serde(rename = "all-in", alias = "all_in", alias = "shove")]
    Shove,
}

impl Action {
    pub const fn all() -> &'static [Self] {
        &[
            Self::Fold,
            Self::Check,
            Self::Limp,
            Self::Call,
            Self::Raise,
            Self::ThreeBet,
            Self::FourBet,
            Self::HalfPot,
            Self::FullPot,
            Self::MinRaise,
            Self::Shove,
        ]
    }
    /// does playing this symbol put chips in the pot as a bet or
    /// raise that later symbols scale from?
    pub fn is_aggressive(&self) -> bool {
        matches!(
            self,
            Self::Limp
                | Self::Raise
                | Self::ThreeBet
                | Self::FourBet
                | Self::HalfPot
                | Self::FullPot
                | Self::MinRaise
                | Self::Shove
        )
    }
}

/// u8 tag isomorphism for disk
impl From<Action> for u8 {
    fn from(action: Action) -> u8 {
        match action {
            Action::Fold => 0,
            Action::Check => 1,
            Action::Limp => 2,
            Action::Call => 3,
            Action::Raise => 4,
            Action::ThreeBet => 5,
            Action::FourBet => 6,
            Action::HalfPot => 7,
            Action::FullPot => 8,
            Action::MinRaise => 9,
            Action::Shove => 10,
        }
    }
}
impl From<u8> for Action {
    fn from(n: u8) -> Self {
        match n {
            0 => Action::Fold,
            1 => Action::Check,
            2 => Action::Limp,
            3 => Action::Call,
            4 => Action::Raise,
            5 => Action::ThreeBet,
            6 => Action::FourBet,
            7 => Action::HalfPot,
            8 => Action::FullPot,
            9 => Action::MinRaise,
            10 => Action::Shove,
            _ => panic!("no other actions"),
        }
    }
}

impl std::str::FromStr for Action {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fold" => Ok(Self::Fold),
            "check" => Ok(Self::Check),
            "limp" => Ok(Self::Limp),
            "call" => Ok(Self::Call),
            "raise" => Ok(Self::Raise),
            "3-bet" | "3_bet" | "three_bet" => Ok(Self::ThreeBet),
            "4-bet" | "4_bet" | "four_bet" => Ok(Self::FourBet),
            "half_pot" | "half-pot" => Ok(Self::HalfPot),
            "pot" => Ok(Self::FullPot),
            "min_raise" | "min-raise" => Ok(Self::MinRaise),
            "all-in" | "all_in" | "shove" => Ok(Self::Shove),
            _ => Err(Error::IllegalAction(s.to_string())),
        }
    }
}

/// Display mirrors the wire names
impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Action::Fold => "fold",
                Action::Check => "check",
                Action::Limp => "limp",
                Action::Call => "call",
                Action::Raise => "raise",
                Action::ThreeBet => "3-bet",
                Action::FourBet => "4-bet",
                Action::HalfPot => "half_pot",
                Action::FullPot => "pot",
                Action::MinRaise => "min_raise",
                Action::Shove => "all-in",
            }
        )
    }
}
