use cardiolock_cipher::CipherVariant;
use serde::{Deserialize, Serialize};

use crate::attack::AttackResult;

/// One row of the tabular report: a single (signal, variant) experiment.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrialRecord {
    pub signal_id: String,
    pub variant: CipherVariant,
    pub success: bool,
    pub attempts: u32,
    pub best_match: f64,
    pub success_rate: f64,
}

impl TrialRecord {
    pub fn new(signal_id: String, variant: CipherVariant, outcome: &AttackResult) -> Self {
        Self {
            signal_id,
            variant,
            success: outcome.success,
            attempts: outcome.attempts,
            best_match: outcome.best_match,
            success_rate: outcome.success_rate,
        }
    }
}

/// Arithmetic means over every trial of one variant, plus the derived
/// security score (1 - mean success rate).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VariantSummary {
    pub variant: CipherVariant,
    pub trials: u32,
    pub mean_success_rate: f64,
    pub mean_best_match: f64,
    pub mean_attempts: f64,
    pub security_score: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub records: Vec<TrialRecord>,
    pub summaries: Vec<VariantSummary>,
}

impl EvaluationReport {
    pub fn from_records(records: Vec<TrialRecord>) -> Self {
        let summaries = CipherVariant::ALL
            .iter()
            .filter_map(|&variant| {
                let rows: Vec<&TrialRecord> =
                    records.iter().filter(|record| record.variant == variant).collect();
                if rows.is_empty() {
                    return None;
                }
                let count = rows.len() as f64;
                let mean_success_rate =
                    rows.iter().map(|record| record.success_rate).sum::<f64>() / count;
                let mean_best_match =
                    rows.iter().map(|record| record.best_match).sum::<f64>() / count;
                let mean_attempts =
                    rows.iter().map(|record| f64::from(record.attempts)).sum::<f64>() / count;
                Some(VariantSummary {
                    variant,
                    trials: rows.len() as u32,
                    mean_success_rate,
                    mean_best_match,
                    mean_attempts,
                    security_score: 1.0 - mean_success_rate,
                })
            })
            .collect();
        Self { records, summaries }
    }

    pub fn summary_for(&self, variant: CipherVariant) -> Option<&VariantSummary> {
        self.summaries.iter().find(|summary| summary.variant == variant)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
