//! Bounded retry counters.

/// Render attempts per run (initial render plus repairs).
pub const RENDER_ATTEMPTS_MAX: u32 = 4;

/// Raw model calls per `generate_with_retry` invocation.
pub const GENERATION_ATTEMPTS_MAX: u32 = 3;

/// Syntax repair rounds after the reviewed draft.
pub const SYNTAX_REPAIR_ROUNDS_MAX: u32 = 5;

/// Fixed-size attempt counter.
///
/// The maximum is set at construction. Each `consume` hands out the next
/// 1-based attempt index until the budget runs dry. There is no reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryBudget {
    max: u32,
    used: u32,
}

impl RetryBudget {
    #[must_use]
    pub fn new(max: u32) -> Self {
        debug_assert!(max > 0, "Budget must allow at least one attempt");
        Self { max, used: 0 }
    }

    /// Take the next attempt, returning its 1-based index.
    pub fn consume(&mut self) -> Option<u32> {
        if self.used >= self.max {
            return None;
        }
        self.used += 1;
        debug_assert!(self.used <= self.max);
        Some(self.used)
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn used(&self) -> u32 {
        self.used
    }

    pub fn remaining(&self) -> u32 {
        self.max - self.used
    }

    pub fn is_exhausted(&self) -> bool {
        self.used >= self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consume_hands_out_one_based_indices() {
        let mut budget = RetryBudget::new(3);
        assert_eq!(budget.consume(), Some(1));
        assert_eq!(budget.consume(), Some(2));
        assert!(!budget.is_exhausted());
        assert_eq!(budget.consume(), Some(3));
        assert!(budget.is_exhausted());
        assert_eq!(budget.consume(), None);
        assert_eq!(budget.consume(), None);
        assert_eq!(budget.used(), 3);
        assert_eq!(budget.remaining(), 0);
    }

    #[test]
    fn test_default_limits() {
        assert_eq!(RENDER_ATTEMPTS_MAX, 4);
        assert_eq!(GENERATION_ATTEMPTS_MAX, 3);
        assert_eq!(SYNTAX_REPAIR_ROUNDS_MAX, 5);
    }
}
