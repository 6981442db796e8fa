//! Classification entry point

use crate::classifier::{ProbabilityModel, ProbabilityPair};
use crate::config::DetectorConfig;
use crate::error::Result;
use crate::fusion::{FusionEngine, PolicyStep, Signals};
use crate::lexicon::Lexicon;
use crate::matcher::{RuleMatch, RuleMatcher};
use crate::normalize::Normalizer;
use crate::types::ClassificationResult;
use serde::Serialize;
use tracing::debug;

/// Verdict with the evidence behind it
#[derive(Debug, Clone, Serialize)]
pub struct Assessment {
    pub result: ClassificationResult,

    /// Rule hits on the normalized text (empty for blank input)
    pub rule_match: RuleMatch,

    /// Model output before fusion (certain-safe for blank input)
    pub statistical: ProbabilityPair,

    /// Policy steps that changed the probability, in order
    pub applied: Vec<PolicyStep>,
}

/// Hybrid phishing detector.
///
/// Built once at startup from an immutable lexicon, a model and a policy,
/// then shared freely: classification takes `&self` and keeps no state
/// between calls.
#[derive(Debug)]
pub struct Detector<M> {
    normalizer: Normalizer,
    matcher: RuleMatcher,
    engine: FusionEngine,
    model: M,
    lexicon_version: String,
}

impl<M: ProbabilityModel> Detector<M> {
    pub fn new(lexicon: &Lexicon, model: M, config: DetectorConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            normalizer: Normalizer::new(config.fold_homoglyphs),
            matcher: RuleMatcher::new(lexicon)?,
            engine: FusionEngine::new(config.policy)?,
            model,
            lexicon_version: lexicon.version().to_string(),
        })
    }

    /// Detector over the built-in lexicon with default settings
    pub fn with_builtin_lexicon(model: M) -> Result<Self> {
        Self::new(&Lexicon::builtin()?, model, DetectorConfig::default())
    }

    /// Classify a block of email text
    pub fn classify_email(&self, raw: &str) -> Result<ClassificationResult> {
        self.assess(raw).map(|assessment| assessment.result)
    }

    /// Classify and keep the rule evidence and model output
    pub fn assess(&self, raw: &str) -> Result<Assessment> {
        let normalized = self.normalizer.normalize(raw);

        let assessment = if normalized.is_empty() {
            let fusion = self.engine.fuse_traced(&Signals::blank());
            Assessment {
                result: fusion.result,
                rule_match: RuleMatch::default(),
                statistical: ProbabilityPair::SAFE,
                applied: fusion.applied,
            }
        } else {
            let rule_match = self.matcher.scan(&normalized);
            let statistical = self.model.predict_proba(&normalized)?;
            let fusion = self
                .engine
                .fuse_traced(&Signals::new(statistical, &rule_match));
            Assessment {
                result: fusion.result,
                rule_match,
                statistical,
                applied: fusion.applied,
            }
        };

        debug!(
            lexicon = %self.lexicon_version,
            chars = raw.chars().count(),
            manual_score = assessment.rule_match.manual_score,
            hard_override = assessment.rule_match.hard_override,
            label = %assessment.result.label,
            phishing_prob = assessment.result.phishing_prob,
            "Classified email"
        );

        Ok(assessment)
    }

    #[must_use]
    pub const fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    #[must_use]
    pub const fn engine(&self) -> &FusionEngine {
        &self.engine
    }

    #[must_use]
    pub const fn model(&self) -> &M {
        &self.model
    }

    #[must_use]
    pub fn lexicon_version(&self) -> &str {
        &self.lexicon_version
    }
}
