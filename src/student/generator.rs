//! Credential generation
//!
//! This module contains the random generator for student passcodes and scan
//! codes. Uniqueness against existing students is the directory's concern.

use chrono::{DateTime, Utc};
use rand::Rng;
use std::fmt;

/// Generator for passcodes and scan codes
pub struct CredentialGenerator {
    rng: Box<dyn rand::RngCore + Send>,
}

impl fmt::Debug for CredentialGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialGenerator").finish()
    }
}

impl Default for CredentialGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialGenerator {
    /// Create a generator seeded from the operating system
    pub fn new() -> Self {
        use rand::SeedableRng;
        Self { rng: Box::new(rand::rngs::StdRng::from_entropy()) }
    }

    /// Create a generator with a specific seed for reproducible credentials
    pub fn with_seed(seed: u64) -> Self {
        use rand::SeedableRng;
        Self { rng: Box::new(rand::rngs::StdRng::seed_from_u64(seed)) }
    }

    /// Random string of ASCII digits whose length is drawn from `min_digits..=max_digits`
    pub fn generate_passcode(&mut self, min_digits: usize, max_digits: usize) -> String {
        let length = if min_digits >= max_digits {
            min_digits
        } else {
            self.rng.gen_range(min_digits..=max_digits)
        };

        (0..length)
            .map(|_| char::from(b'0' + self.rng.gen_range(0..10u8)))
            .collect()
    }

    /// Scan code of the form `{prefix}{millis}-{n}` with `n` in `0..1000`
    pub fn generate_scan_code(&mut self, prefix: &str, now: DateTime<Utc>) -> String {
        let suffix: u16 = self.rng.gen_range(0..1000);
        format!("{}{}-{}", prefix, now.timestamp_millis(), suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_passcode_length_and_digits() {
        let mut generator = CredentialGenerator::with_seed(7);
        for _ in 0..200 {
            let passcode = generator.generate_passcode(4, 6);
            assert!((4..=6).contains(&passcode.len()), "bad length: {}", passcode);
            assert!(passcode.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_fixed_length_passcode() {
        let mut generator = CredentialGenerator::with_seed(1);
        assert_eq!(generator.generate_passcode(5, 5).len(), 5);
    }

    #[test]
    fn test_seeded_generators_agree() {
        let mut a = CredentialGenerator::with_seed(42);
        let mut b = CredentialGenerator::with_seed(42);
        assert_eq!(a.generate_passcode(4, 6), b.generate_passcode(4, 6));
    }

    #[test]
    fn test_scan_code_format() {
        let mut generator = CredentialGenerator::with_seed(3);
        let now = Utc.timestamp_millis_opt(1_683_709_200_000).unwrap();
        let code = generator.generate_scan_code("QR-", now);

        let rest = code.strip_prefix("QR-1683709200000-").expect("prefix and millis");
        let suffix: u16 = rest.parse().unwrap();
        assert!(suffix < 1000);
    }
}
