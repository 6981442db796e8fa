use phish_verdict::*;

// --- FusionPolicy ---

#[test]
fn test_default_policy_is_valid() {
    let policy = FusionPolicy::default();

    assert!(policy.validate().is_ok());
    assert_eq!(policy.override_phishing_prob, 95.0);
    assert_eq!(policy.special_floors[&SpecialCategory::StorageQuota], 60.0);
}

#[test]
fn test_band_floor() {
    let policy = FusionPolicy::default();

    assert_eq!(policy.band_floor(0), None);
    assert_eq!(policy.band_floor(1), None);
    assert_eq!(policy.band_floor(2), Some(45.0));
    assert_eq!(policy.band_floor(4), Some(60.0));
    assert_eq!(policy.band_floor(7), Some(85.0));
    assert_eq!(policy.band_floor(u32::MAX), Some(85.0));
}

#[test]
fn test_builder() {
    let policy = FusionPolicy::new()
        .override_phishing_prob(99.0)
        .special_floor(SpecialCategory::PredatoryJournal, 50.0)
        .bands(
            ScoreBand::new(1, 40.0),
            ScoreBand::new(3, 55.0),
            ScoreBand::new(5, 90.0),
        );

    assert!(policy.validate().is_ok());
    assert_eq!(policy.band_floor(3), Some(55.0));
    assert_eq!(policy.special_floors[&SpecialCategory::PredatoryJournal], 50.0);
}

#[test]
fn test_thresholds_must_ascend() {
    let policy = FusionPolicy::new().bands(
        ScoreBand::new(4, 45.0),
        ScoreBand::new(4, 60.0),
        ScoreBand::new(7, 85.0),
    );

    assert!(matches!(policy.validate(), Err(ClassifyError::InvalidPolicy(_))));
}

#[test]
fn test_floors_must_not_descend() {
    let policy = FusionPolicy::new().bands(
        ScoreBand::new(2, 70.0),
        ScoreBand::new(4, 60.0),
        ScoreBand::new(7, 85.0),
    );

    assert!(matches!(policy.validate(), Err(ClassifyError::InvalidPolicy(_))));
}

#[test]
fn test_override_must_dominate() {
    let below_label = FusionPolicy::new()
        .override_phishing_prob(70.0)
        .bands(
            ScoreBand::new(2, 10.0),
            ScoreBand::new(4, 20.0),
            ScoreBand::new(7, 30.0),
        );
    assert!(below_label.validate().is_err());

    let below_band = FusionPolicy::new().bands(
        ScoreBand::new(2, 45.0),
        ScoreBand::new(4, 60.0),
        ScoreBand::new(7, 97.0),
    );
    assert!(below_band.validate().is_err());

    let below_special = FusionPolicy::new().special_floor(SpecialCategory::StorageQuota, 96.0);
    assert!(below_special.validate().is_err());
}

#[test]
fn test_percent_range() {
    assert!(FusionPolicy::new().override_phishing_prob(101.0).validate().is_err());
    assert!(FusionPolicy::new().override_phishing_prob(f64::NAN).validate().is_err());
    assert!(
        FusionPolicy::new()
            .special_floor(SpecialCategory::StorageQuota, -1.0)
            .validate()
            .is_err()
    );
}

#[test]
fn test_engine_rejects_invalid_policy() {
    let policy = FusionPolicy::new().override_phishing_prob(50.0);
    assert!(FusionEngine::new(policy).is_err());
}

// --- DetectorConfig ---

#[test]
fn test_config_from_empty_json() {
    let config = DetectorConfig::from_json("{}").unwrap();
    assert_eq!(config, DetectorConfig::default());
    assert!(config.fold_homoglyphs);
}

#[test]
fn test_config_partial_override() {
    let config = DetectorConfig::from_json(
        r#"{
            "fold_homoglyphs": false,
            "policy": {
                "override_phishing_prob": 97.5,
                "high_band": { "threshold": 9, "floor": 88.0 }
            }
        }"#,
    )
    .unwrap();

    assert!(!config.fold_homoglyphs);
    assert_eq!(config.policy.override_phishing_prob, 97.5);
    assert_eq!(config.policy.high_band, ScoreBand::new(9, 88.0));
    assert_eq!(config.policy.mid_band, FusionPolicy::default().mid_band);
}

#[test]
fn test_config_special_floors_by_name() {
    let config = DetectorConfig::from_json(
        r#"{"policy": {"special_floors": {"storage_quota": 70.0}}}"#,
    )
    .unwrap();

    assert_eq!(config.policy.special_floors.len(), 1);
    assert_eq!(
        config.policy.special_floors[&SpecialCategory::StorageQuota],
        70.0
    );
}

#[test]
fn test_config_unknown_field() {
    let err = DetectorConfig::from_json(r#"{"threshold": 3}"#).unwrap_err();
    assert!(matches!(err, ClassifyError::Json(_)));
}

#[test]
fn test_config_invalid_policy() {
    let err =
        DetectorConfig::from_json(r#"{"policy": {"override_phishing_prob": 10.0}}"#).unwrap_err();
    assert!(matches!(err, ClassifyError::InvalidPolicy(_)));
}

#[test]
fn test_config_round_trips_through_json() {
    let config = DetectorConfig::default();
    let json = serde_json::to_string(&config).unwrap();

    assert_eq!(DetectorConfig::from_json(&json).unwrap(), config);
}
