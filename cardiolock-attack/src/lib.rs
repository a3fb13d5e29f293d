//! Adversarial evaluation for the cardiolock cipher variants: a grid-search
//! attack simulator modelling a structurally informed adversary, and a
//! harness that drives the attack across a signal batch and aggregates
//! per-variant resistance statistics.

pub mod attack;
pub mod errors;
pub mod grid;
pub mod harness;
pub mod report;

pub use attack::{AttackResult, AttackSimulator};
pub use errors::{EvalError, EvalResult};
pub use grid::AttackGridConfig;
pub use harness::{classical_key_schedule, EvaluationHarness, HarnessConfig};
pub use report::{EvaluationReport, TrialRecord, VariantSummary};
