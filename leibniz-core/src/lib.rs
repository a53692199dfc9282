//! Leibniz Core - Deterministic Simulation Primitives
//!
//! TigerStyle simulation-first building blocks for the Leibniz service layer.
//!
//! # Philosophy
//!
//! Every simulated service in Leibniz must produce the same output for the
//! same input on every run. This crate owns the pieces that make that true:
//! 1. A seeded RNG that all synthetic data flows through
//! 2. A controllable clock for TTL and time-dependent behaviour
//! 3. Seed management (`DST_SEED`) for replaying a run
//! 4. A generator of synthetic research papers for seeding and tests
//!
//! # Usage
//!
//! ```rust
//! use leibniz_core::dst::{DeterministicRng, SimClock};
//! use leibniz_core::fixtures::PaperGenerator;
//!
//! let clock = SimClock::new();
//! clock.advance_secs(5);
//! assert_eq!(clock.now_secs(), 5);
//!
//! let papers = PaperGenerator::with_seed(42).generate_dataset(3);
//! assert_eq!(papers.len(), 3);
//!
//! let mut rng = DeterministicRng::from_text("sparse attention");
//! let _ = rng.next_float();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

pub mod constants;
pub mod dst;
pub mod fixtures;

pub use constants::*;
pub use dst::{text_seed, DeterministicRng, SimClock, SimConfig};
pub use fixtures::{ClaimRecord, PaperGenerator, SynthesizedPaper};
