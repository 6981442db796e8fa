//! Statistical classifier boundary
//!
//! The fusion policy consumes a [`ProbabilityPair`]; anything able to produce
//! one implements [`ProbabilityModel`]. [`LinearModel`] is a serialized
//! logistic-regression model over TF-IDF term weights, the shape exported by
//! the usual bag-of-words phishing classifiers.

use crate::error::{ClassifyError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Read;
use std::sync::Arc;

/// Class label of legitimate mail in model outputs
pub const SAFE_CLASS: &str = "safe";

/// Class label of phishing mail in model outputs
pub const PHISHING_CLASS: &str = "phishing";

const SUM_TOLERANCE: f64 = 1e-6;

static TOKEN_REGEX: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"\b\w\w+\b").unwrap());

/// Validated (P(safe), P(phishing)) pair, each in [0, 1], summing to 1
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct ProbabilityPair {
    safe: f64,
    phishing: f64,
}

impl ProbabilityPair {
    /// Certain-safe pair
    pub const SAFE: Self = Self {
        safe: 1.0,
        phishing: 0.0,
    };

    /// Validate a pair produced by a model.
    ///
    /// Out-of-range, non-finite, or non-complementary values are rejected
    /// rather than clamped.
    pub fn new(safe: f64, phishing: f64) -> Result<Self> {
        for (name, value) in [("safe", safe), ("phishing", phishing)] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ClassifyError::InvalidProbability(format!(
                    "{name} probability {value} outside [0, 1]"
                )));
            }
        }
        if (safe + phishing - 1.0).abs() > SUM_TOLERANCE {
            return Err(ClassifyError::InvalidProbability(format!(
                "safe {safe} + phishing {phishing} does not sum to 1"
            )));
        }
        Ok(Self { safe, phishing })
    }

    pub fn from_phishing(phishing: f64) -> Result<Self> {
        Self::new(1.0 - phishing, phishing)
    }

    /// Pick the safe/phishing scores out of a model's class-ordered output.
    ///
    /// Models list classes in arbitrary order, so positions are resolved by
    /// label rather than assumed.
    pub fn from_class_scores<S: AsRef<str>>(classes: &[S], scores: &[f64]) -> Result<Self> {
        if classes.len() != scores.len() {
            return Err(ClassifyError::InvalidProbability(format!(
                "{} classes but {} scores",
                classes.len(),
                scores.len()
            )));
        }
        let position = |label: &str| {
            classes
                .iter()
                .position(|c| c.as_ref() == label)
                .ok_or_else(|| ClassifyError::MissingClass(label.to_string()))
        };
        let safe = scores[position(SAFE_CLASS)?];
        let phishing = scores[position(PHISHING_CLASS)?];
        Self::new(safe, phishing)
    }

    #[must_use]
    pub const fn safe(&self) -> f64 {
        self.safe
    }

    #[must_use]
    pub const fn phishing(&self) -> f64 {
        self.phishing
    }
}

/// Source of statistical phishing probabilities.
///
/// Implementations own model loading and feature extraction and must be
/// safe to call concurrently; a model that is not must serialize access
/// internally.
pub trait ProbabilityModel: Send + Sync {
    fn predict_proba(&self, text: &str) -> Result<ProbabilityPair>;
}

impl<M: ProbabilityModel + ?Sized> ProbabilityModel for Box<M> {
    fn predict_proba(&self, text: &str) -> Result<ProbabilityPair> {
        (**self).predict_proba(text)
    }
}

impl<M: ProbabilityModel + ?Sized> ProbabilityModel for Arc<M> {
    fn predict_proba(&self, text: &str) -> Result<ProbabilityPair> {
        (**self).predict_proba(text)
    }
}

/// Coefficient and inverse document frequency of one vocabulary term
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TermWeight {
    pub coef: f64,
    #[serde(default = "default_idf")]
    pub idf: f64,
}

const fn default_idf() -> f64 {
    1.0
}

const fn default_l2_normalize() -> bool {
    true
}

/// Binary logistic regression over TF-IDF features.
///
/// The sigmoid of the decision value is the probability of `classes[1]`,
/// matching how binary linear classifiers order their outputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinearModel {
    classes: Vec<String>,
    intercept: f64,
    #[serde(default)]
    vocabulary: HashMap<String, TermWeight>,
    #[serde(default = "default_l2_normalize")]
    l2_normalize: bool,
}

impl LinearModel {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str::<Self>(json)?.validated()
    }

    pub fn from_reader(reader: impl Read) -> Result<Self> {
        serde_json::from_reader::<_, Self>(reader)?.validated()
    }

    fn validated(self) -> Result<Self> {
        if self.classes.len() != 2 {
            return Err(ClassifyError::Model(format!(
                "expected 2 classes, found {}",
                self.classes.len()
            )));
        }
        for label in [SAFE_CLASS, PHISHING_CLASS] {
            if !self.classes.iter().any(|c| c == label) {
                return Err(ClassifyError::MissingClass(label.to_string()));
            }
        }
        if !self.intercept.is_finite() {
            return Err(ClassifyError::Model("intercept is not finite".into()));
        }
        if let Some((term, _)) = self
            .vocabulary
            .iter()
            .find(|(_, w)| !w.coef.is_finite() || !w.idf.is_finite() || w.idf <= 0.0)
        {
            return Err(ClassifyError::Model(format!("invalid weight for term {term:?}")));
        }
        Ok(self)
    }

    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    #[must_use]
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Raw decision value (log-odds of `classes[1]`)
    #[must_use]
    pub fn decision_function(&self, text: &str) -> f64 {
        let lower = text.to_lowercase();
        let mut counts: HashMap<&str, u32> = HashMap::new();
        for token in TOKEN_REGEX.find_iter(&lower) {
            if self.vocabulary.contains_key(token.as_str()) {
                *counts.entry(token.as_str()).or_default() += 1;
            }
        }

        let features: Vec<(f64, f64)> = counts
            .iter()
            .filter_map(|(term, count)| {
                self.vocabulary
                    .get(*term)
                    .map(|w| (w.coef, f64::from(*count) * w.idf))
            })
            .collect();
        if features.is_empty() {
            return self.intercept;
        }

        // idf > 0 and count >= 1, so the norm is positive here
        let norm = if self.l2_normalize {
            features.iter().map(|(_, x)| x * x).sum::<f64>().sqrt()
        } else {
            1.0
        };

        self.intercept + features.iter().map(|(coef, x)| coef * x / norm).sum::<f64>()
    }
}

impl ProbabilityModel for LinearModel {
    fn predict_proba(&self, text: &str) -> Result<ProbabilityPair> {
        let positive = sigmoid(self.decision_function(text));
        ProbabilityPair::from_class_scores(self.classes.as_slice(), &[1.0 - positive, positive])
    }
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}
