use crate::Chips;

/// the error kinds the solver distinguishes.
///
/// input validation happens once at the API boundary, so the
/// deep loops (clustering, traversal) never see malformed cards.
/// an OverStack observed *inside* CFR traversal is an abstraction
/// tree bug and is treated as fatal by the trainer rather than
/// propagated, since skipping a subtree would corrupt the
/// regret integrals.
#[derive(Debug)]
pub enum Error {
    InvalidCard(String),
    DuplicateCard(String),
    IllegalAction(String),
    OverStack { bet: Chips, stack: Chips },
    UnknownInfoSet(String),
    Io(std::io::Error),
    Corrupt(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::InvalidCard(s) => write!(f, "invalid card: {}", s),
            Self::DuplicateCard(s) => write!(f, "duplicate card: {}", s),
            Self::IllegalAction(s) => write!(f, "illegal action: {}", s),
            Self::OverStack { bet, stack } => {
                write!(f, "bet of {} exceeds remaining stack of {}", bet, stack)
            }
            Self::UnknownInfoSet(s) => write!(f, "unknown infoset: {}", s),
            Self::Io(e) => write!(f, "io: {}", e),
            Self::Corrupt(s) => write!(f, "corrupt artifact: {}", s),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
