use cardiolock_cipher::{
    synthetic_corpus, CipherError, KeyPredictor, MeanImputer, MinMaxScaler, PredictorConfig,
};

fn training_rows() -> Vec<Vec<f64>> {
    synthetic_corpus(24, 64, "cardiolock/predictor-tests")
        .expect("corpus")
        .iter()
        .map(|signal| signal.samples().to_vec())
        .collect()
}

fn test_config() -> PredictorConfig {
    PredictorConfig {
        hidden_layers: vec![16],
        epochs: 600,
        learning_rate: 0.01,
        seed_label: "cardiolock/predictor-tests".into(),
        ..PredictorConfig::default()
    }
}

#[test]
fn training_is_deterministic() {
    let rows = training_rows();
    let config = test_config();
    let first = KeyPredictor::train(&rows, &config).expect("train");
    let second = KeyPredictor::train(&rows, &config).expect("train");

    let probe = &rows[0];
    let key_a = first.predict(probe).expect("predict");
    let key_b = second.predict(probe).expect("predict");
    assert_eq!(key_a.r.to_bits(), key_b.r.to_bits());
    assert_eq!(key_a.x0.to_bits(), key_b.x0.to_bits());
}

#[test]
fn predictions_are_finite_and_reported_with_holdout_error() {
    let rows = training_rows();
    let predictor = KeyPredictor::train(&rows, &test_config()).expect("train");
    assert_eq!(predictor.input_dimension(), 64);

    let mse = predictor.holdout_mse().expect("holdout");
    assert!(mse.is_finite() && mse >= 0.0);

    for row in rows.iter().take(5) {
        let key = predictor.predict(row).expect("predict");
        assert!(key.r.is_finite() && key.x0.is_finite());
    }
}

#[test]
fn predict_rejects_mismatched_dimension() {
    let predictor = KeyPredictor::train(&training_rows(), &test_config()).expect("train");
    let err = predictor.predict(&[0.0; 10]).unwrap_err();
    assert!(matches!(
        err,
        CipherError::DimensionMismatch { expected: 64, actual: 10 }
    ));
}

#[test]
fn training_rejects_ragged_and_empty_corpora() {
    let err = KeyPredictor::train(&[], &test_config()).unwrap_err();
    assert!(matches!(err, CipherError::EmptyCorpus));

    let ragged = vec![vec![0.0; 8], vec![0.0; 9]];
    let err = KeyPredictor::train(&ragged, &test_config()).unwrap_err();
    assert!(matches!(
        err,
        CipherError::DimensionMismatch { expected: 8, actual: 9 }
    ));
}

#[test]
fn nan_holes_are_imputed_before_prediction() {
    let rows = training_rows();
    let predictor = KeyPredictor::train(&rows, &test_config()).expect("train");

    let mut holed = rows[3].clone();
    holed[5] = f64::NAN;
    holed[40] = f64::NAN;
    let key = predictor.predict(&holed).expect("predict");
    assert!(key.r.is_finite() && key.x0.is_finite());
}

#[test]
fn imputer_fills_with_column_means() {
    let rows = vec![vec![1.0, f64::NAN, 3.0], vec![3.0, 4.0, f64::NAN]];
    let imputer = MeanImputer::fit(&rows);
    assert_eq!(imputer.transform(&rows[0]), vec![1.0, 4.0, 3.0]);
    assert_eq!(imputer.transform(&rows[1]), vec![3.0, 4.0, 3.0]);
}

#[test]
fn scaler_maps_fitted_extremes_to_unit_range() {
    let rows = vec![vec![0.0, 10.0], vec![5.0, 10.0], vec![10.0, 10.0]];
    let scaler = MinMaxScaler::fit(&rows);
    assert_eq!(scaler.transform(&[0.0, 10.0]), vec![0.0, 0.0]);
    assert_eq!(scaler.transform(&[5.0, 10.0]), vec![0.5, 0.0]);
    assert_eq!(scaler.transform(&[10.0, 10.0]), vec![1.0, 0.0]);
}
