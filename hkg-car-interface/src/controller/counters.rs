//! Rolling message counters
//!
//! Receiving ECUs check that message counters advance by one. The counters
//! are therefore seeded exactly once from the last value the car itself put
//! on the bus, so the first frame we send continues that sequence.

/// Modular counter seeded lazily from an observed value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollingCounter {
    modulus: u8,
    value: Option<u8>,
}

impl RollingCounter {
    /// Create an unseeded counter
    pub fn new(modulus: u8) -> Self {
        debug_assert!(modulus > 0);
        Self { modulus, value: None }
    }

    /// Seed from the last value observed on the bus
    ///
    /// Only the first call has any effect.
    pub fn seed(&mut self, observed: f64) {
        if self.value.is_none() {
            let observed = observed.max(0.0) as u64 % self.modulus as u64;
            self.value = Some(observed as u8);
        }
    }

    pub fn is_seeded(&self) -> bool {
        self.value.is_some()
    }

    /// Step to the next value and return it
    pub fn advance(&mut self) -> u8 {
        let next = (self.value.unwrap_or(0) as u16 + 1) % self.modulus as u16;
        self.value = Some(next as u8);
        next as u8
    }

    /// Current value (0 before seeding)
    pub fn value(&self) -> u8 {
        self.value.unwrap_or(0)
    }

    pub fn modulus(&self) -> u8 {
        self.modulus
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_only_once() {
        let mut counter = RollingCounter::new(16);
        assert!(!counter.is_seeded());
        counter.seed(9.0);
        counter.seed(2.0);
        assert_eq!(counter.value(), 9);
    }

    #[test]
    fn test_sequence_continues_from_observed() {
        let mut counter = RollingCounter::new(16);
        counter.seed(13.0);
        let values: Vec<u8> = (0..5).map(|_| counter.advance()).collect();
        assert_eq!(values, vec![14, 15, 0, 1, 2]);
    }

    #[test]
    fn test_mod_15_wraps_and_reduces_seed() {
        let mut counter = RollingCounter::new(15);
        counter.seed(15.0);
        assert_eq!(counter.value(), 0);
        assert_eq!(counter.advance(), 1);

        let mut counter = RollingCounter::new(15);
        counter.seed(14.0);
        assert_eq!(counter.advance(), 0);
    }

    #[test]
    fn test_values_stay_within_modulus() {
        let mut counter = RollingCounter::new(15);
        counter.seed(200.0);
        for _ in 0..100 {
            assert!(counter.advance() < counter.modulus());
        }
    }
}
