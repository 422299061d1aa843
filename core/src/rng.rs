//! Deterministic random number generation for sample data.
//!
//! RULE: sample generation never calls a platform RNG.
//! Every dataset draws from its own stream, seeded from
//! (master_seed XOR slot index), so adding a dataset never shifts the
//! rows of the existing ones.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// A deterministic RNG for one dataset.
pub struct SampleRng {
    inner: Pcg64Mcg,
}

impl SampleRng {
    /// The slot index must never change once assigned.
    pub fn new(master_seed: u64, slot_index: u64) -> Self {
        let derived_seed = master_seed ^ (slot_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll a u64 in [0, n). `n` must be non-zero.
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    /// Roll a float in [lo, hi).
    pub fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Uniform pick from a non-empty slice.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.next_u64_below(items.len() as u64) as usize]
    }

    /// Simplified Pareto draw. Higher alpha means less skew.
    pub fn pareto(&mut self, x_min: f64, alpha: f64) -> f64 {
        let u = self.next_f64().max(1e-10);
        x_min * u.powf(-1.0 / alpha)
    }
}

/// All dataset RNGs for one generation run, indexed by stable slot.
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn for_slot(&self, slot: DatasetSlot) -> SampleRng {
        log::debug!("rng: seeding {} stream", slot.name());
        SampleRng::new(self.master_seed, slot as u64)
    }
}

/// Stable slot assignments.
/// NEVER reorder or remove entries, only append.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum DatasetSlot {
    Campaign = 0,
    Customer = 1,
    Product = 2,
    Lead = 3,
    Feature = 4,
    LearningCurve = 5,
    Geographic = 6,
    Attribution = 7,
    Funnel = 8,
    Journey = 9,
}

impl DatasetSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Campaign => "campaign",
            Self::Customer => "customer",
            Self::Product => "product",
            Self::Lead => "lead",
            Self::Feature => "feature",
            Self::LearningCurve => "learning_curve",
            Self::Geographic => "geographic",
            Self::Attribution => "attribution",
            Self::Funnel => "funnel",
            Self::Journey => "journey",
        }
    }
}
