//! Tunable detector configuration

use crate::error::{ClassifyError, Result};
use crate::lexicon::SpecialCategory;
use crate::types::PHISHING_LABEL_FLOOR;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Manual-score threshold and the phishing floor (percent) it imposes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScoreBand {
    pub threshold: u32,
    pub floor: f64,
}

impl ScoreBand {
    #[must_use]
    pub const fn new(threshold: u32, floor: f64) -> Self {
        Self { threshold, floor }
    }
}

/// Numeric constants of the fusion policy.
///
/// Every probability here is a percentage in [0, 100].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FusionPolicy {
    /// Phishing probability forced when sensitive and action terms co-occur
    pub override_phishing_prob: f64,

    /// Floor per special category; categories without an entry impose none
    pub special_floors: BTreeMap<SpecialCategory, f64>,

    pub low_band: ScoreBand,
    pub mid_band: ScoreBand,
    pub high_band: ScoreBand,
}

impl Default for FusionPolicy {
    fn default() -> Self {
        Self {
            override_phishing_prob: 95.0,
            special_floors: BTreeMap::from([
                (SpecialCategory::StorageQuota, 60.0),
                (SpecialCategory::PredatoryJournal, 60.0),
            ]),
            low_band: ScoreBand::new(2, 45.0),
            mid_band: ScoreBand::new(4, 60.0),
            high_band: ScoreBand::new(7, 85.0),
        }
    }
}

impl FusionPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn override_phishing_prob(mut self, prob: f64) -> Self {
        self.override_phishing_prob = prob;
        self
    }

    #[must_use]
    pub fn special_floor(mut self, category: SpecialCategory, floor: f64) -> Self {
        self.special_floors.insert(category, floor);
        self
    }

    #[must_use]
    pub fn bands(mut self, low: ScoreBand, mid: ScoreBand, high: ScoreBand) -> Self {
        self.low_band = low;
        self.mid_band = mid;
        self.high_band = high;
        self
    }

    /// Floor imposed by the strongest band the score reaches
    #[must_use]
    pub const fn band_floor(&self, manual_score: u32) -> Option<f64> {
        if manual_score >= self.high_band.threshold {
            Some(self.high_band.floor)
        } else if manual_score >= self.mid_band.threshold {
            Some(self.mid_band.floor)
        } else if manual_score >= self.low_band.threshold {
            Some(self.low_band.floor)
        } else {
            None
        }
    }

    /// Check the constants are usable.
    ///
    /// Thresholds must ascend strictly and floors must not descend, so a
    /// higher score can never yield a lower floor. The override probability
    /// must sit at or above every other floor and in the phishing label band.
    pub fn validate(&self) -> Result<()> {
        check_percent("override_phishing_prob", self.override_phishing_prob)?;
        for (name, band) in [
            ("low_band", self.low_band),
            ("mid_band", self.mid_band),
            ("high_band", self.high_band),
        ] {
            check_percent(name, band.floor)?;
        }
        for (category, floor) in &self.special_floors {
            check_percent(category.as_str(), *floor)?;
        }

        if !(self.low_band.threshold < self.mid_band.threshold
            && self.mid_band.threshold < self.high_band.threshold)
        {
            return Err(ClassifyError::InvalidPolicy(format!(
                "band thresholds must ascend strictly, got {} / {} / {}",
                self.low_band.threshold, self.mid_band.threshold, self.high_band.threshold
            )));
        }
        if !(self.low_band.floor <= self.mid_band.floor
            && self.mid_band.floor <= self.high_band.floor)
        {
            return Err(ClassifyError::InvalidPolicy(format!(
                "band floors must not descend, got {} / {} / {}",
                self.low_band.floor, self.mid_band.floor, self.high_band.floor
            )));
        }

        let strongest_floor = self
            .special_floors
            .values()
            .copied()
            .fold(self.high_band.floor.max(PHISHING_LABEL_FLOOR), f64::max);
        if self.override_phishing_prob < strongest_floor {
            return Err(ClassifyError::InvalidPolicy(format!(
                "override_phishing_prob {} is below floor {strongest_floor}",
                self.override_phishing_prob
            )));
        }

        Ok(())
    }
}

fn check_percent(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(ClassifyError::InvalidPolicy(format!(
            "{name} must be within [0, 100], got {value}"
        )))
    }
}

/// Detector settings, loadable from JSON with every field optional
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DetectorConfig {
    /// Fold Cyrillic/Greek/fullwidth lookalikes before matching
    pub fold_homoglyphs: bool,

    pub policy: FusionPolicy,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            fold_homoglyphs: true,
            policy: FusionPolicy::default(),
        }
    }
}

impl DetectorConfig {
    /// Parse and validate a JSON configuration document
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.policy.validate()
    }
}
