//! Lexical rule matching over normalized text

use crate::error::{ClassifyError, Result};
use crate::lexicon::{Lexicon, SpecialCategory, Tier};
use aho_corasick::AhoCorasick;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// What a pattern means; one pattern string may carry several roles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Weighted { tier: Tier, weight: u32 },
    Sensitive,
    Action,
    Special(SpecialCategory),
}

/// A weighted phrase found in the text
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PhraseHit {
    pub tier: Tier,
    pub phrase: String,
    pub weight: u32,
}

/// Everything the rules found in one text
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleMatch {
    /// Sum of weights of every distinct tier phrase present
    pub manual_score: u32,

    /// A sensitive term and an action term are both present
    pub hard_override: bool,

    /// Special categories with at least one phrase present
    pub special_hits: BTreeSet<SpecialCategory>,

    /// Weighted phrases that contributed to `manual_score`
    pub phrase_hits: Vec<PhraseHit>,

    /// Sensitive-data terms present
    pub sensitive_hits: Vec<String>,

    /// Action/request terms present
    pub action_hits: Vec<String>,
}

impl RuleMatch {
    /// No rule fired at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.phrase_hits.is_empty()
            && self.sensitive_hits.is_empty()
            && self.action_hits.is_empty()
            && self.special_hits.is_empty()
    }
}

/// Scans text for every lexicon phrase in a single pass.
///
/// Matching is plain substring containment on normalized text, with no word
/// boundaries: `"password"` matches inside `"passwords"`. Each distinct
/// phrase counts once no matter how often it occurs. A phrase listed in
/// several tiers contributes every tier's weight.
#[derive(Debug, Clone)]
pub struct RuleMatcher {
    automaton: AhoCorasick,
    patterns: Vec<String>,
    roles: Vec<Vec<Role>>,
}

impl RuleMatcher {
    pub fn new(lexicon: &Lexicon) -> Result<Self> {
        let mut index: BTreeMap<String, usize> = BTreeMap::new();
        let mut patterns: Vec<String> = Vec::new();
        let mut roles: Vec<Vec<Role>> = Vec::new();

        let mut add = |phrase: &str, role: Role| {
            let id = *index.entry(phrase.to_string()).or_insert_with(|| {
                patterns.push(phrase.to_string());
                roles.push(Vec::new());
                patterns.len() - 1
            });
            roles[id].push(role);
        };

        for tier in Tier::ALL {
            for entry in lexicon.tier(tier) {
                add(
                    &entry.phrase,
                    Role::Weighted {
                        tier,
                        weight: entry.weight,
                    },
                );
            }
        }
        for term in lexicon.sensitive_terms() {
            add(term, Role::Sensitive);
        }
        for term in lexicon.action_terms() {
            add(term, Role::Action);
        }
        for category in lexicon.special_categories() {
            for phrase in lexicon.special(category) {
                add(phrase, Role::Special(category));
            }
        }

        let automaton =
            AhoCorasick::new(&patterns).map_err(|e| ClassifyError::Matcher(e.to_string()))?;

        Ok(Self {
            automaton,
            patterns,
            roles,
        })
    }

    /// Number of distinct pattern strings in the automaton
    #[must_use]
    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// Match already-normalized text against the lexicon
    #[must_use]
    pub fn scan(&self, normalized: &str) -> RuleMatch {
        let found: BTreeSet<usize> = self
            .automaton
            .find_overlapping_iter(normalized)
            .map(|m| m.pattern().as_usize())
            .collect();

        let mut result = RuleMatch::default();

        for id in found {
            let phrase = &self.patterns[id];
            for role in &self.roles[id] {
                match *role {
                    Role::Weighted { tier, weight } => {
                        result.manual_score = result.manual_score.saturating_add(weight);
                        result.phrase_hits.push(PhraseHit {
                            tier,
                            phrase: phrase.clone(),
                            weight,
                        });
                    }
                    Role::Sensitive => result.sensitive_hits.push(phrase.clone()),
                    Role::Action => result.action_hits.push(phrase.clone()),
                    Role::Special(category) => {
                        result.special_hits.insert(category);
                    }
                }
            }
        }

        result.hard_override = !result.sensitive_hits.is_empty() && !result.action_hits.is_empty();
        result
    }
}
