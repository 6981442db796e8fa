//! Fusion of the model probability with rule-derived signals
//!
//! The policy is an ordered list of [`PolicyStep`]s, each a pure function
//! from one [`FusionState`] to the next. A step may settle the state, which
//! ends the sequence. Otherwise steps only raise the phishing probability
//! through `max`, so a later, weaker rule never undoes an earlier one.
//! Rounding happens once, when the final state becomes a
//! [`ClassificationResult`].

use crate::classifier::ProbabilityPair;
use crate::config::FusionPolicy;
use crate::error::Result;
use crate::lexicon::SpecialCategory;
use crate::matcher::RuleMatch;
use crate::types::ClassificationResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use tracing::trace;

static NO_SPECIAL_HITS: BTreeSet<SpecialCategory> = BTreeSet::new();

/// One rule of the fusion policy
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PolicyStep {
    /// Blank input is safe, unconditionally
    BlankInput,
    /// Sensitive term plus action term forces a phishing verdict
    HardOverride,
    /// Special categories raise the probability to their floors
    SpecialFloors,
    /// The manual score band raises the probability to its floor
    ScoreBands,
}

/// Precedence order in which the steps run
pub const POLICY_ORDER: [PolicyStep; 4] = [
    PolicyStep::BlankInput,
    PolicyStep::HardOverride,
    PolicyStep::SpecialFloors,
    PolicyStep::ScoreBands,
];

impl fmt::Display for PolicyStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::BlankInput => "blank_input",
            Self::HardOverride => "hard_override",
            Self::SpecialFloors => "special_floors",
            Self::ScoreBands => "score_bands",
        };
        f.write_str(name)
    }
}

/// Inputs to the fusion policy for one email
#[derive(Debug, Clone, Copy)]
pub struct Signals<'a> {
    pub blank_input: bool,
    pub statistical: ProbabilityPair,
    pub manual_score: u32,
    pub hard_override: bool,
    pub special_hits: &'a BTreeSet<SpecialCategory>,
}

impl<'a> Signals<'a> {
    #[must_use]
    pub const fn new(statistical: ProbabilityPair, rule_match: &'a RuleMatch) -> Self {
        Self {
            blank_input: false,
            statistical,
            manual_score: rule_match.manual_score,
            hard_override: rule_match.hard_override,
            special_hits: &rule_match.special_hits,
        }
    }
}

impl Signals<'static> {
    /// Signals for input with no visible content
    #[must_use]
    pub fn blank() -> Self {
        Self {
            blank_input: true,
            statistical: ProbabilityPair::SAFE,
            manual_score: 0,
            hard_override: false,
            special_hits: &NO_SPECIAL_HITS,
        }
    }
}

/// Intermediate, unrounded probability carried between steps
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusionState {
    /// Phishing probability in percent
    pub phishing_prob: f64,

    /// No further step may change the state
    pub settled: bool,
}

impl FusionState {
    #[must_use]
    pub fn from_statistical(pair: ProbabilityPair) -> Self {
        Self {
            phishing_prob: pair.phishing() * 100.0,
            settled: false,
        }
    }

    /// Complement of the phishing probability, in percent
    #[must_use]
    pub fn safe_prob(&self) -> f64 {
        100.0 - self.phishing_prob
    }

    #[must_use]
    fn raised_to(self, floor: f64) -> Self {
        Self {
            phishing_prob: self.phishing_prob.max(floor),
            settled: self.settled,
        }
    }

    #[must_use]
    const fn settle(self) -> Self {
        Self {
            phishing_prob: self.phishing_prob,
            settled: true,
        }
    }
}

impl PolicyStep {
    /// Apply this rule to the state
    #[must_use]
    pub fn apply(
        self,
        policy: &FusionPolicy,
        signals: &Signals<'_>,
        state: FusionState,
    ) -> FusionState {
        match self {
            Self::BlankInput if signals.blank_input => FusionState {
                phishing_prob: 0.0,
                settled: true,
            },
            Self::HardOverride if signals.hard_override => {
                state.raised_to(policy.override_phishing_prob).settle()
            }
            Self::SpecialFloors => signals
                .special_hits
                .iter()
                .filter_map(|category| policy.special_floors.get(category))
                .fold(state, |state, floor| state.raised_to(*floor)),
            Self::ScoreBands => match policy.band_floor(signals.manual_score) {
                Some(floor) => state.raised_to(floor),
                None => state,
            },
            Self::BlankInput | Self::HardOverride => state,
        }
    }
}

/// Outcome of a fusion run with the steps that changed the state
#[derive(Debug, Clone, PartialEq)]
pub struct Fusion {
    pub result: ClassificationResult,
    pub applied: Vec<PolicyStep>,
}

/// Runs the fusion policy over validated signals
#[derive(Debug, Clone)]
pub struct FusionEngine {
    policy: FusionPolicy,
}

impl FusionEngine {
    pub fn new(policy: FusionPolicy) -> Result<Self> {
        policy.validate()?;
        Ok(Self { policy })
    }

    #[must_use]
    pub const fn policy(&self) -> &FusionPolicy {
        &self.policy
    }

    /// Final verdict for the signals
    #[must_use]
    pub fn fuse(&self, signals: &Signals<'_>) -> ClassificationResult {
        self.fuse_traced(signals).result
    }

    /// Final verdict plus the steps that changed the probability
    #[must_use]
    pub fn fuse_traced(&self, signals: &Signals<'_>) -> Fusion {
        let mut state = FusionState::from_statistical(signals.statistical);
        let mut applied = Vec::new();

        for step in POLICY_ORDER {
            let next = step.apply(&self.policy, signals, state);
            if next != state {
                trace!(
                    step = %step,
                    from = state.phishing_prob,
                    to = next.phishing_prob,
                    "Policy step applied"
                );
                applied.push(step);
            }
            state = next;
            if state.settled {
                break;
            }
        }

        Fusion {
            result: ClassificationResult::from_phishing_prob(state.phishing_prob),
            applied,
        }
    }
}
