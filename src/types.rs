//! Core result types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowest phishing probability (percent) labelled `phishing`
pub const PHISHING_LABEL_FLOOR: f64 = 80.0;

/// Lowest phishing probability (percent) labelled `suspicious`
pub const SUSPICIOUS_LABEL_FLOOR: f64 = 40.0;

/// Risk tier assigned to an email
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Safe,
    Suspicious,
    Phishing,
}

impl Label {
    /// Band a phishing probability in percent.
    ///
    /// Each band is closed on its lower end: 80.0 is `Phishing` and 40.0 is
    /// `Suspicious`.
    #[must_use]
    pub fn from_phishing_prob(phishing_prob: f64) -> Self {
        if phishing_prob >= PHISHING_LABEL_FLOOR {
            Self::Phishing
        } else if phishing_prob >= SUSPICIOUS_LABEL_FLOOR {
            Self::Suspicious
        } else {
            Self::Safe
        }
    }

    /// Numeric prediction code: 0 safe, -1 suspicious, 1 phishing
    #[must_use]
    pub const fn prediction_code(self) -> i8 {
        match self {
            Self::Safe => 0,
            Self::Suspicious => -1,
            Self::Phishing => 1,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Safe => "safe",
            Self::Suspicious => "suspicious",
            Self::Phishing => "phishing",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final verdict for one email
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ClassificationResult {
    /// 0 = safe, -1 = suspicious, 1 = phishing
    pub prediction: i8,

    /// Risk tier
    pub label: Label,

    /// Probability (percent) the email is legitimate
    pub safe_prob: f64,

    /// Probability (percent) the email is phishing
    pub phishing_prob: f64,
}

impl ClassificationResult {
    /// Build a result from an unrounded phishing probability in percent.
    ///
    /// Rounds to two decimals, derives `safe_prob` from the rounded value so
    /// the pair sums to 100, and labels from the rounded value so label and
    /// probability never disagree.
    #[must_use]
    pub fn from_phishing_prob(phishing_prob: f64) -> Self {
        let phishing_prob = round2(phishing_prob.clamp(0.0, 100.0));
        let safe_prob = round2(100.0 - phishing_prob);
        let label = Label::from_phishing_prob(phishing_prob);

        Self {
            prediction: label.prediction_code(),
            label,
            safe_prob,
            phishing_prob,
        }
    }

    /// Verdict for blank input
    #[must_use]
    pub fn blank() -> Self {
        Self::from_phishing_prob(0.0)
    }

    #[must_use]
    pub fn is_phishing(&self) -> bool {
        self.label == Label::Phishing
    }
}

impl fmt::Display for ClassificationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (safe {:.2}%, phishing {:.2}%)",
            self.label, self.safe_prob, self.phishing_prob
        )
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
