//! Conservative extraction of durable-health-fact candidates from a
//! transcript.
//!
//! Only the closed category set {allergy, condition, medication,
//! preference, trigger} is extracted. One-time symptoms, hypothetical
//! diagnoses, and transient emotional state are excluded. The contract
//! favors false negatives over false positives: when uncertain, extract
//! nothing.

use std::sync::OnceLock;

use regex::Regex;

use crate::models::enums::{MemoryCategory, MemoryConfidence, MessageRole};
use crate::models::{MemoryCandidate, Message};

/// Closed list of chronic conditions recognized for the `condition`
/// category. A phrase match outside this list is never extracted.
const CHRONIC_CONDITIONS: &[&str] = &[
    "asthma",
    "diabetes",
    "hypertension",
    "high blood pressure",
    "epilepsy",
    "copd",
    "arthritis",
    "heart disease",
    "kidney disease",
    "thyroid condition",
    "celiac disease",
    "crohn's disease",
    "eczema",
    "psoriasis",
];

/// Sentence markers that make a statement transient or hypothetical —
/// such sentences are skipped entirely.
const EXCLUSION_MARKERS: &[&str] = &[
    "today",
    "right now",
    "this morning",
    "since yesterday",
    "at the moment",
    "maybe i have",
    "i think i might",
    "i might have",
    "could i have",
    "do i have",
    "i feel sad",
    "i feel anxious today",
];

/// Propose durable facts from a transcript. Pure: no persistence side
/// effect — every candidate still needs per-item user approval.
pub fn extract_candidates(transcript: &[Message]) -> Vec<MemoryCandidate> {
    let mut candidates: Vec<MemoryCandidate> = Vec::new();

    for msg in transcript.iter().filter(|m| m.role == MessageRole::User) {
        for sentence in split_sentences(&msg.text) {
            let lower = sentence.to_lowercase();
            if EXCLUSION_MARKERS.iter().any(|m| lower.contains(m)) {
                continue;
            }
            extract_allergy(&lower, &mut candidates);
            extract_medication(&lower, &mut candidates);
            extract_condition(&lower, &mut candidates);
            extract_preference(&lower, &mut candidates);
            extract_trigger(&lower, &mut candidates);
        }
    }

    dedup(candidates)
}

fn split_sentences(text: &str) -> impl Iterator<Item = &str> {
    text.split(['.', '!', '?', '\n']).map(str::trim).filter(|s| !s.is_empty())
}

fn extract_allergy(sentence: &str, out: &mut Vec<MemoryCandidate>) {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"\ballerg(?:ic|y)\s+to\s+([a-z][a-z\s-]{1,40})").expect("allergy regex")
    });
    if let Some(caps) = re.captures(sentence) {
        if let Some(value) = clean_value(caps.get(1).map(|m| m.as_str()).unwrap_or_default()) {
            out.push(MemoryCandidate {
                category: MemoryCategory::Allergy,
                label: "Allergy".into(),
                value,
                confidence: MemoryConfidence::High,
            });
        }
    }
}

fn extract_medication(sentence: &str, out: &mut Vec<MemoryCandidate>) {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"\bi(?:'m| am)?\s+(?:take|taking|on)\s+([a-z][a-z0-9\s-]{2,40})")
            .expect("medication regex")
    });
    if let Some(caps) = re.captures(sentence) {
        if let Some(value) = clean_value(caps.get(1).map(|m| m.as_str()).unwrap_or_default()) {
            out.push(MemoryCandidate {
                category: MemoryCategory::Medication,
                label: "Medication".into(),
                value,
                confidence: MemoryConfidence::Medium,
            });
        }
    }
}

fn extract_condition(sentence: &str, out: &mut Vec<MemoryCandidate>) {
    for condition in CHRONIC_CONDITIONS {
        let stated = sentence.contains(&format!("i have {condition}"))
            || sentence.contains(&format!("i've got {condition}"))
            || sentence.contains(&format!("my {condition}"));
        let diagnosed = sentence.contains(&format!("diagnosed with {condition}"));
        if stated || diagnosed {
            out.push(MemoryCandidate {
                category: MemoryCategory::Condition,
                label: "Condition".into(),
                value: (*condition).to_string(),
                confidence: if diagnosed {
                    MemoryConfidence::High
                } else {
                    MemoryConfidence::Medium
                },
            });
        }
    }
}

fn extract_preference(sentence: &str, out: &mut Vec<MemoryCandidate>) {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"\bi(?:'d)?\s+(?:prefer|would rather)\s+([a-z][a-z0-9\s-]{2,60})")
            .expect("preference regex")
    });
    if let Some(caps) = re.captures(sentence) {
        if let Some(value) = clean_value(caps.get(1).map(|m| m.as_str()).unwrap_or_default()) {
            out.push(MemoryCandidate {
                category: MemoryCategory::Preference,
                label: "Preference".into(),
                value,
                confidence: MemoryConfidence::Low,
            });
        }
    }
}

fn extract_trigger(sentence: &str, out: &mut Vec<MemoryCandidate>) {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(
            r"\b(?:every time|whenever)\s+i\s+([a-z][a-z0-9\s-]{2,50}?),?\s+(?:i|my)\s+(?:get|feel|have|start)",
        )
        .expect("trigger regex")
    });
    if let Some(caps) = re.captures(sentence) {
        if let Some(value) = clean_value(caps.get(1).map(|m| m.as_str()).unwrap_or_default()) {
            out.push(MemoryCandidate {
                category: MemoryCategory::Trigger,
                label: "Trigger".into(),
                value,
                confidence: MemoryConfidence::Medium,
            });
        }
    }
}

/// Trim, cap length, and reject captures that are too vague to be a
/// fact worth remembering.
fn clean_value(raw: &str) -> Option<String> {
    let stoplist = ["it", "them", "this", "that", "something", "a lot", "some"];
    let value = raw.trim().trim_end_matches(['-', ' ']).to_string();
    if value.len() < 3 || stoplist.contains(&value.as_str()) {
        return None;
    }
    Some(value)
}

fn dedup(candidates: Vec<MemoryCandidate>) -> Vec<MemoryCandidate> {
    let mut seen: Vec<(MemoryCategory, String)> = Vec::new();
    let mut out = Vec::new();
    for c in candidates {
        let key = (c.category, c.value.to_lowercase());
        if !seen.contains(&key) {
            seen.push(key);
            out.push(c);
        }
    }
    out
}
