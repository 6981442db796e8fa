//! Versioned phrase dictionaries used by the rule matcher

use crate::error::{ClassifyError, Result};
use crate::normalize::Normalizer;
use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::io::Read;
use std::marker::PhantomData;
use tracing::{debug, warn};

/// Lexicon document schema this crate reads
pub const LEXICON_SCHEMA_VERSION: u32 = 1;

static BUILTIN_LEXICON: &str = include_str!("../data/lexicon.json");

/// Severity bucket for weighted phrases
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    High,
    Medium,
    Low,
}

impl Tier {
    pub const ALL: [Self; 3] = [Self::High, Self::Medium, Self::Low];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Narrow phrase families that get their own probability floor
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SpecialCategory {
    /// Fake "mailbox full" / quota-exceeded notices
    StorageQuota,
    /// Predatory journal and conference solicitations
    PredatoryJournal,
}

impl SpecialCategory {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StorageQuota => "storage_quota",
            Self::PredatoryJournal => "predatory_journal",
        }
    }
}

impl fmt::Display for SpecialCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized phrase with its severity weight
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PhraseEntry {
    pub phrase: String,
    pub weight: u32,
}

/// Immutable phrase store, loaded once and shared across classifications
#[derive(Debug, Clone)]
pub struct Lexicon {
    version: String,
    tiers: BTreeMap<Tier, Vec<PhraseEntry>>,
    sensitive_terms: Vec<String>,
    action_terms: Vec<String>,
    special: BTreeMap<SpecialCategory, Vec<String>>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct LexiconDocument {
    schema_version: u32,
    #[serde(default)]
    version: String,
    #[serde(default)]
    tiers: UniqueMap<Tier, UniqueMap<String, i64>>,
    #[serde(default)]
    sensitive_terms: Vec<String>,
    #[serde(default)]
    action_terms: Vec<String>,
    #[serde(default)]
    special: UniqueMap<SpecialCategory, Vec<String>>,
}

impl Lexicon {
    /// The canonical lexicon shipped with the crate
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_LEXICON)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_document(serde_json::from_str(json)?)
    }

    pub fn from_reader(reader: impl Read) -> Result<Self> {
        Self::from_document(serde_json::from_reader(reader)?)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        Self::from_document(serde_json::from_value(value)?)
    }

    fn from_document(doc: LexiconDocument) -> Result<Self> {
        if doc.schema_version != LEXICON_SCHEMA_VERSION {
            return Err(ClassifyError::UnsupportedSchema {
                found: doc.schema_version,
                supported: LEXICON_SCHEMA_VERSION,
            });
        }

        // Phrases are folded the same way request text is, independent of
        // the detector's folding setting.
        let normalizer = Normalizer::new(true);

        let mut tiers = BTreeMap::new();
        for (tier, table) in doc.tiers.0 {
            let set = format!("tier {tier}");
            let mut seen = BTreeSet::new();
            let mut entries = Vec::with_capacity(table.0.len());

            for (raw, weight) in table.0 {
                let phrase = normalize_phrase(&normalizer, &set, &raw)?;
                let weight = u32::try_from(weight)
                    .ok()
                    .filter(|w| *w > 0)
                    .ok_or_else(|| ClassifyError::InvalidPhrase {
                        set: set.clone(),
                        details: format!("weight for {raw:?} must be a positive integer, got {weight}"),
                    })?;
                if !seen.insert(phrase.clone()) {
                    return Err(duplicate(&set, &raw));
                }
                entries.push(PhraseEntry { phrase, weight });
            }
            tiers.insert(tier, entries);
        }

        let sensitive_terms = normalize_list(&normalizer, "sensitive_terms", doc.sensitive_terms)?;
        let action_terms = normalize_list(&normalizer, "action_terms", doc.action_terms)?;

        let mut special = BTreeMap::new();
        for (category, phrases) in doc.special.0 {
            let set = format!("special {category}");
            special.insert(category, normalize_list(&normalizer, &set, phrases)?);
        }

        let lexicon = Self {
            version: doc.version,
            tiers,
            sensitive_terms,
            action_terms,
            special,
        };

        if lexicon.sensitive_terms.is_empty() || lexicon.action_terms.is_empty() {
            warn!(
                version = %lexicon.version,
                "Lexicon lacks sensitive or action terms; hard override can never fire"
            );
        }
        debug!(
            version = %lexicon.version,
            phrases = lexicon.phrase_count(),
            "Loaded lexicon"
        );

        Ok(lexicon)
    }

    /// Free-form version tag of the loaded document
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Weighted phrases of one tier (empty if the tier is absent)
    #[must_use]
    pub fn tier(&self, tier: Tier) -> &[PhraseEntry] {
        self.tiers.get(&tier).map(Vec::as_slice).unwrap_or_default()
    }

    #[must_use]
    pub fn sensitive_terms(&self) -> &[String] {
        &self.sensitive_terms
    }

    #[must_use]
    pub fn action_terms(&self) -> &[String] {
        &self.action_terms
    }

    /// Phrases of one special category (empty if absent)
    #[must_use]
    pub fn special(&self, category: SpecialCategory) -> &[String] {
        self.special.get(&category).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn special_categories(&self) -> impl Iterator<Item = SpecialCategory> + '_ {
        self.special.keys().copied()
    }

    /// Total number of entries across every set
    #[must_use]
    pub fn phrase_count(&self) -> usize {
        self.tiers.values().map(Vec::len).sum::<usize>()
            + self.sensitive_terms.len()
            + self.action_terms.len()
            + self.special.values().map(Vec::len).sum::<usize>()
    }
}

fn normalize_phrase(normalizer: &Normalizer, set: &str, raw: &str) -> Result<String> {
    let phrase = normalizer.normalize(raw);
    if phrase.is_empty() {
        return Err(ClassifyError::InvalidPhrase {
            set: set.to_string(),
            details: "empty phrase".into(),
        });
    }
    Ok(phrase)
}

fn normalize_list(normalizer: &Normalizer, set: &str, raw: Vec<String>) -> Result<Vec<String>> {
    let mut seen = BTreeSet::new();
    let mut phrases = Vec::with_capacity(raw.len());

    for item in raw {
        let phrase = normalize_phrase(normalizer, set, &item)?;
        if !seen.insert(phrase.clone()) {
            return Err(duplicate(set, &item));
        }
        phrases.push(phrase);
    }

    Ok(phrases)
}

fn duplicate(set: &str, raw: &str) -> ClassifyError {
    ClassifyError::InvalidPhrase {
        set: set.to_string(),
        details: format!("duplicate phrase {raw:?}"),
    }
}

/// JSON object kept in document order, rejecting repeated keys
struct UniqueMap<K, V>(Vec<(K, V)>);

impl<K, V> Default for UniqueMap<K, V> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<'de, K, V> Deserialize<'de> for UniqueMap<K, V>
where
    K: Deserialize<'de> + Ord + Clone + fmt::Debug,
    V: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct UniqueMapVisitor<K, V>(PhantomData<(K, V)>);

        impl<'de, K, V> Visitor<'de> for UniqueMapVisitor<K, V>
        where
            K: Deserialize<'de> + Ord + Clone + fmt::Debug,
            V: Deserialize<'de>,
        {
            type Value = UniqueMap<K, V>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map without duplicate keys")
            }

            fn visit_map<A>(self, mut access: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut seen = BTreeSet::new();
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));

                while let Some((key, value)) = access.next_entry::<K, V>()? {
                    if !seen.insert(key.clone()) {
                        return Err(de::Error::custom(format_args!("duplicate key {key:?}")));
                    }
                    entries.push((key, value));
                }

                Ok(UniqueMap(entries))
            }
        }

        deserializer.deserialize_map(UniqueMapVisitor(PhantomData))
    }
}
