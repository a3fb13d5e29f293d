use approx::{assert_abs_diff_eq, assert_relative_eq};
use cardiolock_cipher::{
    apply_permutation, derive_biometric_key, diffusion_permutation, invert_permutation,
    keystream_mask, logistic_sequence, pearson_correlation, shannon_entropy, synthetic_corpus,
    synthetic_signal, CipherEngine, CipherError, CipherVariant, KeyParams, Signal,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

#[test]
fn logistic_first_iterate_matches_closed_form() {
    let key = KeyParams { r: 3.847, x0: 0.623 };
    let sequence = logistic_sequence(&key, 1).expect("sequence");
    assert_relative_eq!(sequence[0], 3.847 * 0.623 * (1.0 - 0.623), max_relative = 1e-12);
}

#[test]
fn logistic_sequence_is_reproducible() {
    let key = KeyParams { r: 3.91, x0: 0.37 };
    let first = logistic_sequence(&key, 256).expect("sequence");
    let second = logistic_sequence(&key, 256).expect("sequence");
    assert_eq!(first, second);
    assert_eq!(first.len(), 256);
}

#[test]
fn logistic_iterates_stay_bounded() {
    for &r in &[3.5, 3.7, 3.847, 3.9, 4.0] {
        for &x0 in &[0.1, 0.3, 0.5, 0.7, 0.9] {
            let sequence = logistic_sequence(&KeyParams { r, x0 }, 50).expect("sequence");
            assert!(sequence.iter().all(|x| (0.0..=1.0).contains(x)), "r={r} x0={x0}");
        }
    }
}

#[test]
fn rejects_out_of_domain_keys() {
    for (r, x0) in [(0.0, 0.5), (4.1, 0.5), (-1.0, 0.5), (3.7, 0.0), (3.7, 1.0), (3.7, 1.4)] {
        let err = logistic_sequence(&KeyParams { r, x0 }, 8).unwrap_err();
        assert!(matches!(err, CipherError::InvalidKeyDomain { .. }), "r={r} x0={x0}");
    }
    assert!(KeyParams::new(3.7, 0.3).is_ok());
    assert!(KeyParams::new(4.0, 0.999).is_ok());
}

#[test]
fn derived_permutation_round_trips() {
    let key = KeyParams { r: 3.91, x0: 0.37 };
    let sequence = logistic_sequence(&key, 64).expect("sequence");
    let permutation = diffusion_permutation(&sequence);
    let values: Vec<f64> = (0..64).map(|i| i as f64).collect();
    let shuffled = apply_permutation(&values, &permutation);
    let restored = apply_permutation(&shuffled, &invert_permutation(&permutation));
    assert_eq!(values, restored);
}

#[test]
fn classical_concrete_scenario() {
    let signal = Signal::new(vec![1.0, 2.0, 3.0, 4.0, 5.0]).expect("signal");
    let key = KeyParams { r: 3.7, x0: 0.3 };
    let sequence = logistic_sequence(&key, 5).expect("sequence");
    assert_relative_eq!(sequence[0], 0.777, max_relative = 1e-12);
    let mask = keystream_mask(&sequence);
    assert_eq!(mask[0], 198);

    let engine = CipherEngine::new(CipherVariant::Classical);
    let (ciphertext, sidecar) = engine.encrypt(&signal, &key).expect("encrypt");
    assert_eq!(ciphertext.bytes.len(), 5);
    assert_eq!(ciphertext.bytes[0], 198);
    assert_eq!(sidecar.range(), (1.0, 5.0));
    assert!(sidecar.permutation.is_none());

    let scaled: Vec<u8> = ciphertext
        .bytes
        .iter()
        .zip(&mask)
        .map(|(byte, mask_byte)| byte ^ mask_byte)
        .collect();
    assert_eq!(scaled, vec![0, 64, 128, 191, 255]);
}

#[test]
fn round_trip_stays_within_quantization_step() {
    let signal = synthetic_signal(0, 240, "cardiolock/round-trip").expect("signal");
    let key = derive_biometric_key(signal.samples());
    let samples = signal.samples();
    let min = samples.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = samples.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let tolerance = (max - min) / 255.0;

    for variant in CipherVariant::ALL {
        let engine = CipherEngine::new(variant);
        let (ciphertext, sidecar) = engine.encrypt(&signal, &key).expect("encrypt");
        let decrypted = engine.decrypt(&ciphertext, &key, &sidecar).expect("decrypt");
        assert_eq!(decrypted.len(), signal.len());
        for (original, restored) in samples.iter().zip(&decrypted) {
            assert!(
                (original - restored).abs() <= tolerance + 1e-12,
                "{} deviated by {}",
                variant.label(),
                (original - restored).abs()
            );
        }
    }
}

#[test]
fn degenerate_constant_signal_round_trips_exactly() {
    let signal = Signal::new(vec![5.0; 32]).expect("signal");
    let key = derive_biometric_key(signal.samples());
    assert_eq!(key.r, 3.6);
    assert_abs_diff_eq!(key.x0, 0.3, epsilon = 1e-9);

    for variant in CipherVariant::ALL {
        let engine = CipherEngine::new(variant);
        let (ciphertext, sidecar) = engine.encrypt(&signal, &key).expect("encrypt");
        assert_eq!(sidecar.range(), (5.0, 5.0));
        let decrypted = engine.decrypt(&ciphertext, &key, &sidecar).expect("decrypt");
        assert!(decrypted.iter().all(|&value| value == 5.0), "{}", variant.label());
    }
}

#[test]
fn wrong_key_reconstruction_stays_uncorrelated() {
    let corpus = synthetic_corpus(10, 200, "cardiolock/wrong-key").expect("corpus");
    let engine = CipherEngine::new(CipherVariant::Biometric);
    let mut uncorrelated = 0;
    for signal in &corpus {
        let key = derive_biometric_key(signal.samples());
        let (ciphertext, sidecar) = engine.encrypt(signal, &key).expect("encrypt");
        let wrong = KeyParams {
            r: 3.6 + (key.r - 3.6 + 0.173).rem_euclid(0.4),
            x0: 0.1 + (key.x0 - 0.1 + 0.271).rem_euclid(0.8),
        };
        let reconstruction = engine.decrypt(&ciphertext, &wrong, &sidecar).expect("decrypt");
        match pearson_correlation(signal.samples(), &reconstruction) {
            Some(correlation) if correlation.abs() >= 0.5 => {}
            _ => uncorrelated += 1,
        }
    }
    assert!(uncorrelated >= 6, "only {uncorrelated} of 10 reconstructions decorrelated");
}

#[test]
fn sidecar_permutation_length_is_checked() {
    let signal = synthetic_signal(2, 64, "cardiolock/sidecar").expect("signal");
    let key = derive_biometric_key(signal.samples());
    let engine = CipherEngine::new(CipherVariant::Biometric);
    let (ciphertext, mut sidecar) = engine.encrypt(&signal, &key).expect("encrypt");
    sidecar.permutation = Some(vec![0, 1]);
    let err = engine.decrypt(&ciphertext, &key, &sidecar).unwrap_err();
    assert!(matches!(err, CipherError::SidecarMismatch { expected: 64, actual: 2 }));
}

#[test]
fn permuted_decrypt_rederives_missing_sidecar_permutation() {
    let signal = synthetic_signal(4, 96, "cardiolock/sidecar").expect("signal");
    let key = derive_biometric_key(signal.samples());
    let engine = CipherEngine::new(CipherVariant::MlEnhanced);
    let (ciphertext, sidecar) = engine.encrypt(&signal, &key).expect("encrypt");
    let stored = engine.decrypt(&ciphertext, &key, &sidecar).expect("decrypt");

    let stripped = cardiolock_cipher::Sidecar {
        min: sidecar.min,
        max: sidecar.max,
        permutation: None,
    };
    let rederived = engine.decrypt(&ciphertext, &key, &stripped).expect("decrypt");
    assert_eq!(stored, rederived);
}

#[test]
fn sidecar_serializes_for_transport() {
    let signal = synthetic_signal(1, 48, "cardiolock/sidecar").expect("signal");
    let key = derive_biometric_key(signal.samples());
    let engine = CipherEngine::new(CipherVariant::Biometric);
    let (ciphertext, sidecar) = engine.encrypt(&signal, &key).expect("encrypt");

    let json = serde_json::to_string(&sidecar).expect("serialize");
    let restored: cardiolock_cipher::Sidecar = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(restored.range(), sidecar.range());
    assert_eq!(restored.permutation, sidecar.permutation);
    let decrypted = engine.decrypt(&ciphertext, &key, &restored).expect("decrypt");
    assert_eq!(decrypted.len(), signal.len());
}

#[test]
fn derived_keys_land_in_the_chaotic_band() {
    let corpus = synthetic_corpus(16, 120, "cardiolock/key-band").expect("corpus");
    for signal in &corpus {
        let key = derive_biometric_key(signal.samples());
        assert!(key.validate().is_ok());
        assert!((3.6..4.0).contains(&key.r), "r={}", key.r);
        assert!((0.1..0.9).contains(&key.x0), "x0={}", key.x0);
    }
}

#[test]
fn signal_construction_is_validated() {
    assert!(matches!(Signal::new(vec![]).unwrap_err(), CipherError::EmptySignal));
    let err = Signal::new(vec![1.0, f64::NAN, 2.0]).unwrap_err();
    assert!(matches!(err, CipherError::NonFiniteSample { index: 1 }));
    let err = Signal::new(vec![1.0, 2.0, f64::INFINITY]).unwrap_err();
    assert!(matches!(err, CipherError::NonFiniteSample { index: 2 }));
}

#[test]
fn peak_detection_finds_strict_local_maxima() {
    let signal = Signal::new(vec![0.0, 1.0, 0.0, 2.0, 0.0, 3.0, 0.0]).expect("signal");
    assert_eq!(signal.peaks(0.5), vec![1, 3, 5]);
    assert_eq!(signal.peaks(2.5), vec![5]);
}

#[test]
fn entropy_orders_random_above_constant() {
    let constant = vec![1.0; 100];
    assert_eq!(shannon_entropy(&constant), 0.0);

    let mut rng = ChaCha20Rng::from_seed([7u8; 32]);
    let random: Vec<f64> = (0..100).map(|_| rng.gen::<f64>()).collect();
    assert!(shannon_entropy(&random) > 3.0);
}

#[test]
fn keystream_whitening_raises_entropy_of_a_coarse_tone() {
    // period-8 tone: a handful of distinct amplitudes, far below keystream entropy
    let samples: Vec<f64> = (0..256)
        .map(|i| (2.0 * std::f64::consts::PI * i as f64 / 8.0).sin())
        .collect();
    let signal = Signal::new(samples).expect("signal");
    let plain_entropy = shannon_entropy(signal.samples());

    let engine = CipherEngine::new(CipherVariant::Classical);
    let key = KeyParams { r: 3.93, x0: 0.41 };
    let (ciphertext, _) = engine.encrypt(&signal, &key).expect("encrypt");
    let cipher_bytes: Vec<f64> = ciphertext.bytes.iter().map(|&b| f64::from(b)).collect();
    let cipher_entropy = shannon_entropy(&cipher_bytes);

    assert!(plain_entropy < 4.0, "tone entropy {plain_entropy}");
    assert!(cipher_entropy > plain_entropy, "cipher entropy {cipher_entropy}");
}

#[test]
fn correlation_is_undefined_for_constant_vectors() {
    assert!(pearson_correlation(&[1.0; 16], &[0.5; 16]).is_none());
    assert!(pearson_correlation(&[1.0, 2.0], &[1.0, 2.0, 3.0]).is_none());
    let a: Vec<f64> = (0..32).map(|i| i as f64).collect();
    let correlation = pearson_correlation(&a, &a).expect("correlation");
    assert_relative_eq!(correlation, 1.0, max_relative = 1e-9);
}
