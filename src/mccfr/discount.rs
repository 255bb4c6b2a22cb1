use crate::Utility;

/// which regime the trainer is in, derived from the epoch count.
/// early epochs apply DCFR discounting to wash out the garbage
/// strategies of a cold start; after that, updates run plain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Discount,
    Explore,
}

impl From<usize> for Phase {
    fn from(epochs: usize) -> Self {
        match epochs {
            e if e < crate::CFR_DISCOUNT_PHASE => Phase::Discount,
            _ => Phase::Explore,
        }
    }
}

/// the DCFR discounting schedule.
///
/// positive cumulative regrets decay by t^α/(t^α+1), negative by
/// t^ω/(t^ω+1), and accumulated strategy weight by (t/(t+1))^γ.
/// the (1.5, 0.5, 2) defaults are the usual ones and empirically
/// dominate plain CFR+ early; the baseline trainer runs without
/// any of this.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Discount {
    period: usize,
    alpha: f32,
    omega: f32,
    gamma: f32,
}

impl Default for Discount {
    fn default() -> Self {
        Self {
            period: 1,
            alpha: 1.5,
            omega: 0.5,
            gamma: 2.0,
        }
    }
}

impl Discount {
    /// decay factor for the accumulated strategy sum at epoch t
    pub fn policy(&self, t: usize) -> f32 {
        (t as f32 / (t as f32 + 1.)).powf(self.gamma)
    }

    /// decay factor for a cumulative regret at epoch t, keyed by
    /// its sign
    pub fn regret(&self, t: usize, regret: Utility) -> f32 {
        if t % self.period != 0 {
            1.
        } else if regret > 0. {
            let x = (t as f32 / self.period as f32).powf(self.alpha);
            x / (x + 1.)
        } else if regret < 0. {
            let x = (t as f32 / self.period as f32).powf(self.omega);
            x / (x + 1.)
        } else {
            1.
        }
    }
}
