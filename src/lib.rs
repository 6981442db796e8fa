// Enforce at crate level
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! Hybrid Phishing Verdicts
//!
//! Classifies a block of email text as safe, suspicious or phishing by fusing
//! a statistical model's probability with a deterministic lexical rule
//! engine.
//!
//! # Features
//!
//! - Versioned, weighted phrase lexicon loaded from JSON
//! - Homoglyph and zero-width obfuscation tolerant normalization
//! - Sensitive-term / action-term hard override
//! - Targeted floors for storage-quota and predatory-journal lures
//! - Ordered, auditable fusion policy with configurable constants
//! - Serialized logistic-regression model adapter
//!
//! # Example
//!
//! ```rust
//! use phish_verdict::{Detector, Label, ProbabilityModel, ProbabilityPair, Result};
//!
//! struct Neutral;
//!
//! impl ProbabilityModel for Neutral {
//!     fn predict_proba(&self, _text: &str) -> Result<ProbabilityPair> {
//!         ProbabilityPair::new(0.9, 0.1)
//!     }
//! }
//!
//! let detector = Detector::with_builtin_lexicon(Neutral).unwrap();
//! let result = detector
//!     .classify_email("Please reply with your bank account number immediately.")
//!     .unwrap();
//!
//! assert_eq!(result.label, Label::Phishing);
//! println!("{result}");
//! ```

mod classifier;
mod config;
mod detector;
mod error;
mod fusion;
mod lexicon;
mod matcher;
mod normalize;
mod types;

pub use classifier::*;
pub use config::{DetectorConfig, FusionPolicy, ScoreBand};
pub use detector::{Assessment, Detector};
pub use error::{ClassifyError, Result};
pub use fusion::*;
pub use lexicon::{LEXICON_SCHEMA_VERSION, Lexicon, PhraseEntry, SpecialCategory, Tier};
pub use matcher::{PhraseHit, RuleMatch, RuleMatcher};
pub use normalize::{Normalizer, normalize};
pub use types::*;
