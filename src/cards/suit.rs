#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum Suit {
    C = 0,
    D = 1,
    H = 2,
    S = 3,
}

impl Suit {
    pub const fn all() -> [Self; 4] {
        [Suit::C, Suit::D, Suit::H, Suit::S]
    }
    /// relabeling palette for canonicalization, assigned in
    /// first-occurrence order
    pub const fn palette() -> [Self; 4] {
        [Suit::S, Suit::H, Suit::D, Suit::C]
    }
    pub fn parse(c: char) -> Option<Self> {
        match c {
            'c' => Some(Suit::C),
            'd' => Some(Suit::D),
            'h' => Some(Suit::H),
            's' => Some(Suit::S),
            _ => None,
        }
    }
}

impl From<u8> for Suit {
    fn from(n: u8) -> Suit {
        match n {
            0 => Suit::C,
            1 => Suit::D,
            2 => Suit::H,
            3 => Suit::S,
            _ => panic!("invalid suit"),
        }
    }
}
impl From<Suit> for u8 {
    fn from(s: Suit) -> u8 {
        s as u8
    }
}

impl std::fmt::Display for Suit {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Suit::C => "c",
                Suit::D => "d",
                Suit::H => "h",
                Suit::S => "s",
            }
        )
    }
}
