use cardiolock_attack::{EvaluationHarness, HarnessConfig};
use cardiolock_cipher::{synthetic_corpus, KeyPredictor, PredictorConfig, Signal};

fn main() -> anyhow::Result<()> {
    let base = synthetic_corpus(8, 160, "cardiolock/attack-sim")?;
    // shift the batch into the mid-band of the key-derivation moduli
    let signals = base
        .iter()
        .enumerate()
        .map(|(index, signal)| {
            let shifted = signal.samples().iter().map(|v| 0.4 + 1.18 * v).collect();
            Signal::with_id(format!("ECG_{:03}", index + 1), shifted)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let rows: Vec<Vec<f64>> = signals.iter().map(|s| s.samples().to_vec()).collect();
    let config = PredictorConfig {
        epochs: 600,
        learning_rate: 0.01,
        // the demo batch is small; fit it whole
        holdout_fraction: 0.0,
        seed_label: "cardiolock/attack-sim".into(),
        ..PredictorConfig::default()
    };
    let predictor = KeyPredictor::train(&rows, &config)?;

    let harness = EvaluationHarness::new(HarnessConfig::default());
    let report = harness.evaluate(&signals, &predictor)?;

    println!("{:<12} {:>8} {:>14} {:>12} {:>10}", "variant", "trials", "success_rate", "best_match", "security");
    for summary in &report.summaries {
        println!(
            "{:<12} {:>8} {:>14.4} {:>12.4} {:>10.4}",
            summary.variant.label(),
            summary.trials,
            summary.mean_success_rate,
            summary.mean_best_match,
            summary.security_score
        );
    }

    println!("\nper-signal rows:");
    for record in &report.records {
        println!(
            "  {} {:<12} success={} attempts={} best_match={:.4} success_rate={:.4}",
            record.signal_id,
            record.variant.label(),
            record.success,
            record.attempts,
            record.best_match,
            record.success_rate
        );
    }
    Ok(())
}
