use phish_verdict::*;
use serde_json::json;

fn lexicon() -> Lexicon {
    Lexicon::from_value(json!({
        "schema_version": 1,
        "version": "test",
        "tiers": {
            "high": { "verify your password": 3, "urgent action required": 3 },
            "medium": { "unusual activity": 2, "wire transfer": 2, "action required": 2 },
            "low": { "urgent": 1 }
        },
        "sensitive_terms": ["password", "bank account"],
        "action_terms": ["reply with", "send your"],
        "special": {
            "storage_quota": ["mailbox is full"],
            "predatory_journal": ["call for papers"]
        }
    }))
    .unwrap()
}

fn scan(text: &str) -> RuleMatch {
    RuleMatcher::new(&lexicon()).unwrap().scan(&normalize(text))
}

// --- Manual score ---

#[test]
fn test_no_hits() {
    let result = scan("Lunch at noon?");

    assert!(result.is_empty());
    assert_eq!(result.manual_score, 0);
    assert!(!result.hard_override);
}

#[test]
fn test_score_sums_distinct_phrases() {
    let result = scan("URGENT: unusual activity on the wire transfer");

    assert_eq!(result.manual_score, 5);
    assert_eq!(result.phrase_hits.len(), 3);
}

#[test]
fn test_repeated_phrase_counts_once() {
    let result = scan("urgent urgent urgent");

    assert_eq!(result.manual_score, 1);
    assert_eq!(result.phrase_hits.len(), 1);
}

#[test]
fn test_substring_without_word_boundary() {
    let result = scan("This is superurgently needed");

    assert_eq!(result.manual_score, 1);
    assert_eq!(result.phrase_hits[0].phrase, "urgent");
    assert_eq!(result.phrase_hits[0].tier, Tier::Low);
}

#[test]
fn test_overlapping_phrases_all_count() {
    let result = scan("Urgent action required");

    // "urgent action required" (3) + "action required" (2) + "urgent" (1)
    assert_eq!(result.manual_score, 6);
    assert_eq!(result.phrase_hits.len(), 3);
}

#[test]
fn test_phrase_in_two_tiers_is_additive() {
    let lexicon = Lexicon::from_value(json!({
        "schema_version": 1,
        "tiers": { "high": { "urgent": 3 }, "low": { "urgent": 1 } }
    }))
    .unwrap();
    let matcher = RuleMatcher::new(&lexicon).unwrap();
    let result = matcher.scan("urgent");

    assert_eq!(matcher.pattern_count(), 1);
    assert_eq!(result.manual_score, 4);
    assert_eq!(result.phrase_hits.len(), 2);
}

// --- Hard override ---

#[test]
fn test_sensitive_alone_does_not_override() {
    let result = scan("Never share your password.");

    assert_eq!(result.sensitive_hits, vec!["password".to_string()]);
    assert!(result.action_hits.is_empty());
    assert!(!result.hard_override);
}

#[test]
fn test_action_alone_does_not_override() {
    let result = scan("Please reply with the meeting notes.");

    assert_eq!(result.action_hits, vec!["reply with".to_string()]);
    assert!(!result.hard_override);
}

#[test]
fn test_sensitive_and_action_override() {
    let result = scan("Reply with your bank account details");

    assert!(result.hard_override);
    assert_eq!(result.sensitive_hits, vec!["bank account".to_string()]);
}

#[test]
fn test_override_is_not_proximity_based() {
    let result = scan("Bank account review is scheduled. Unrelated: send your slides by Friday.");

    assert!(result.hard_override);
}

#[test]
fn test_weighted_phrase_can_hold_sensitive_term() {
    let result = scan("Verify your password");

    assert_eq!(result.manual_score, 3);
    assert_eq!(result.sensitive_hits, vec!["password".to_string()]);
    assert!(!result.hard_override);
}

#[test]
fn test_homoglyph_obfuscation_still_matches() {
    // Cyrillic а and о in "pаsswоrd", zero-width space inside "send"
    let result = scan("Se\u{200B}nd your p\u{0430}ssw\u{043E}rd");

    assert!(result.hard_override);
}

// --- Special hits ---

#[test]
fn test_special_hits() {
    let result = scan("Your mailbox is full. Also: call for papers!");

    assert!(result.special_hits.contains(&SpecialCategory::StorageQuota));
    assert!(result.special_hits.contains(&SpecialCategory::PredatoryJournal));
    assert_eq!(result.manual_score, 0);
}

#[test]
fn test_empty_lexicon_matches_nothing() {
    let lexicon = Lexicon::from_value(json!({ "schema_version": 1 })).unwrap();
    let matcher = RuleMatcher::new(&lexicon).unwrap();

    assert_eq!(matcher.pattern_count(), 0);
    assert!(matcher.scan("send your password").is_empty());
}
