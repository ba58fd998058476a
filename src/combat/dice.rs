//! Initiative rolls
//!
//! Players who join without a rolled value get a d20 plus their modifier.

use rand::Rng;

/// Roll a single d20
pub fn roll_d20() -> u32 {
    rand::rng().random_range(1..=20)
}

/// An initiative roll: the die result and the modifier applied to it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitiativeRoll {
    /// Natural d20 result
    pub d20: u32,
    /// Initiative modifier
    pub modifier: i32,
}

impl InitiativeRoll {
    /// Build a roll from a known die result
    pub fn new(d20: u32, modifier: i32) -> Self {
        Self { d20, modifier }
    }

    /// Roll d20 + modifier
    pub fn roll(modifier: i32) -> Self {
        Self::new(roll_d20(), modifier)
    }

    /// Initiative score
    pub fn total(&self) -> i32 {
        (self.d20 as i32).saturating_add(self.modifier)
    }

    /// Natural 20
    pub fn is_critical(&self) -> bool {
        self.d20 == 20
    }
}

impl std::fmt::Display for InitiativeRoll {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.modifier < 0 {
            write!(
                f,
                "{} (rolled {} - {})",
                self.total(),
                self.d20,
                self.modifier.unsigned_abs()
            )
        } else {
            write!(f, "{} (rolled {} + {})", self.total(), self.d20, self.modifier)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roll_bounds() {
        for _ in 0..100 {
            let roll = InitiativeRoll::roll(3);
            assert!((1..=20).contains(&roll.d20));
            assert_eq!(roll.total(), roll.d20 as i32 + 3);
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(InitiativeRoll::new(14, 2).to_string(), "16 (rolled 14 + 2)");
        assert_eq!(InitiativeRoll::new(5, -1).to_string(), "4 (rolled 5 - 1)");
    }

    #[test]
    fn test_extreme_modifiers_saturate() {
        assert_eq!(InitiativeRoll::new(5, i32::MAX).total(), i32::MAX);
        assert_eq!(InitiativeRoll::new(5, i32::MIN).total(), i32::MIN + 5);
        assert_eq!(
            InitiativeRoll::new(5, i32::MIN).to_string(),
            format!("{} (rolled 5 - 2147483648)", i32::MIN + 5)
        );
    }

    #[test]
    fn test_critical() {
        assert!(InitiativeRoll::new(20, 0).is_critical());
        assert!(!InitiativeRoll::new(19, 5).is_critical());
    }
}
