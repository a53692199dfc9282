//! DST - Deterministic Simulation Testing primitives
//!
//! Seeded randomness, controllable time, and seed management shared by every
//! Leibniz simulator.
//!
//! Run with an explicit seed for reproducibility:
//! ```bash
//! DST_SEED=12345 cargo test
//! ```

mod clock;
mod config;
mod rng;

pub use clock::SimClock;
pub use config::{SimConfig, DST_SEED_ENV};
pub use rng::{text_seed, DeterministicRng};
