use cardiolock_cipher::{
    derive_biometric_key, shannon_entropy, synthetic_corpus, CipherEngine, CipherVariant,
    KeyParams, KeyPredictor, PredictorConfig, Signal,
};

fn main() -> anyhow::Result<()> {
    let base = synthetic_corpus(20, 200, "cardiolock/walkthrough")?;
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
        ..PredictorConfig::default()
    };
    let predictor = KeyPredictor::train(&rows, &config)?;
    println!("predictor fitted on {} signals of dimension {}", rows.len(), predictor.input_dimension());

    let signal = &signals[0];
    let features = signal.features();
    println!(
        "signal {}: mean={:.4} std={:.4} entropy={:.2} bits peaks={}",
        signal.id().unwrap_or("unnamed"),
        features.mean,
        features.std_dev,
        features.entropy,
        features.peak_count
    );

    for variant in CipherVariant::ALL {
        let key = match variant {
            CipherVariant::Classical => KeyParams::new(3.7, 0.3)?,
            CipherVariant::Biometric => derive_biometric_key(signal.samples()),
            CipherVariant::MlEnhanced => predictor.predict(signal.samples())?,
        };
        let engine = CipherEngine::new(variant);
        let (ciphertext, sidecar) = engine.encrypt(signal, &key)?;
        let decrypted = engine.decrypt(&ciphertext, &key, &sidecar)?;
        let max_error = signal
            .samples()
            .iter()
            .zip(&decrypted)
            .map(|(original, restored)| (original - restored).abs())
            .fold(0.0f64, f64::max);
        let cipher_bytes: Vec<f64> = ciphertext.bytes.iter().map(|&b| f64::from(b)).collect();
        println!(
            "{:<12} r={:.4} x0={:.4} cipher_entropy={:.2} bits round_trip_err={:.5}",
            variant.label(),
            key.r,
            key.x0,
            shannon_entropy(&cipher_bytes),
            max_error
        );
    }

    let classical = CipherEngine::new(CipherVariant::Classical);
    let (_, sidecar) = classical.encrypt(signal, &KeyParams::new(3.7, 0.3)?)?;
    println!("classical sidecar: {}", serde_json::to_string(&sidecar)?);
    Ok(())
}
