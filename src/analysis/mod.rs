//! Rule-based email analysis engine.
//!
//! Deterministic, keyword-driven scoring over an email's subject and body:
//! - category + priority + confidence + tags (`classify`)
//! - summary, sentiment, suggested reply, action items (`analyze`)
//! - spam detection (`detect_spam`)
//!
//! Every function is a pure function of the email and a reference time — no
//! hidden state, no I/O. The recency check in priority scoring is the only
//! time-dependent input, so the reference clock is an explicit parameter
//! (`classify_at` / `analyze_at`); the plain variants pass `Utc::now()`.

pub mod keywords;

use chrono::{DateTime, Utc};
use regex::Regex;
use tracing::debug;

use crate::model::{
    Category, EmailAnalysis, EmailClassification, EmailMessage, Priority, Sentiment, Tag,
};

use self::keywords::{
    CATEGORY_KEYWORDS, NEGATIVE_WORDS, POSITIVE_WORDS, SPAM_PHRASES, URGENT_KEYWORDS,
};

/// One-hour window for the "recent" priority boost.
const RECENT_SECS: i64 = 3600;

/// Directive phrases that introduce an action item, in extraction order.
const ACTION_DIRECTIVES: &[&str] = &["please", "could you", "can you", "need to", "should"];

/// Keyword-driven analysis engine.
///
/// Compiles its regexes once at construction; cheap to share behind an `Arc`
/// and safe to call from concurrent request handlers.
pub struct AnalysisEngine {
    /// One pattern per directive phrase, capturing up to the next sentence
    /// terminator (non-greedy) or end of input.
    action_patterns: Vec<Regex>,
    /// Sentence boundary for the extractive summary.
    sentence_split: Regex,
}

impl Default for AnalysisEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisEngine {
    pub fn new() -> Self {
        let action_patterns = ACTION_DIRECTIVES
            .iter()
            .map(|directive| Regex::new(&format!(r"{directive}\s+(.+?)(?:[.!?]|$)")).unwrap())
            .collect();

        Self {
            action_patterns,
            sentence_split: Regex::new(r"[.!?]+").unwrap(),
        }
    }

    // ── Classification ──────────────────────────────────────────────

    /// Classify an email into category, priority, confidence and tags.
    pub fn classify(&self, email: &EmailMessage) -> EmailClassification {
        self.classify_at(email, Utc::now())
    }

    /// Classify with an explicit reference time for the recency check.
    pub fn classify_at(&self, email: &EmailMessage, now: DateTime<Utc>) -> EmailClassification {
        let blob = blob(email);

        // Score each category by how many of its keywords appear in the
        // blob. Each keyword contributes at most 1 no matter how often it
        // repeats. First category in table order wins score ties.
        let mut category = Category::General;
        let mut max_score = 0usize;
        for (candidate, words) in CATEGORY_KEYWORDS {
            let score = words.iter().filter(|w| blob.contains(*w)).count();
            if score > max_score {
                category = *candidate;
                max_score = score;
            }
        }

        let confidence = if max_score == 0 {
            0.5
        } else {
            (max_score as f64 / 10.0).min(1.0)
        };

        let priority = priority(email, &blob, now);
        let tags = extract_tags(&blob);

        debug!(
            email_id = %email.id,
            category = %category,
            score = max_score,
            priority = %priority,
            "Email classified"
        );

        EmailClassification {
            category,
            priority,
            confidence,
            tags,
        }
    }

    // ── Full analysis ───────────────────────────────────────────────

    /// Run the complete analysis: classification, summary, sentiment,
    /// suggested reply and action items.
    pub fn analyze(&self, email: &EmailMessage) -> EmailAnalysis {
        self.analyze_at(email, Utc::now())
    }

    /// Full analysis with an explicit reference time.
    pub fn analyze_at(&self, email: &EmailMessage, now: DateTime<Utc>) -> EmailAnalysis {
        let classification = self.classify_at(email, now);
        let summary = self.summarize(email);
        let sentiment = sentiment(email);
        let suggested_response = suggest_response(email, &classification);
        let action_required = classification.tags.contains(&Tag::ActionRequired)
            || classification.priority == Priority::High;
        let action_items = self.extract_action_items(email);

        EmailAnalysis {
            email_id: email.id.clone(),
            classification,
            summary,
            sentiment,
            suggested_response,
            action_required,
            action_items,
        }
    }

    // ── Summary ─────────────────────────────────────────────────────

    /// Extractive summary: the first two non-empty sentences of the body,
    /// capped at 200 chars. Falls back to a "from X regarding Y" line when
    /// the body has no usable sentences.
    fn summarize(&self, email: &EmailMessage) -> String {
        let body = email.body.trim();
        let sentences: Vec<&str> = self
            .sentence_split
            .split(body)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .take(2)
            .collect();

        if sentences.is_empty() {
            return format!(
                "Email from {} regarding: {}",
                email.sender.email, email.subject
            );
        }

        let summary = format!("{}.", sentences.join(". "));
        if summary.chars().count() > 200 {
            let truncated: String = summary.chars().take(197).collect();
            format!("{truncated}...")
        } else {
            summary
        }
    }

    // ── Action items ────────────────────────────────────────────────

    /// Extract up to 5 imperative phrases from the body.
    ///
    /// Each directive pattern contributes its first 3 matches, filtered to
    /// trimmed phrases of strictly 11..=99 chars; the combined list is then
    /// truncated to 5 in pattern order.
    fn extract_action_items(&self, email: &EmailMessage) -> Vec<String> {
        let text = email.body.to_lowercase();
        let mut items = Vec::new();

        for pattern in &self.action_patterns {
            for caps in pattern.captures_iter(&text).take(3) {
                let phrase = caps[1].trim();
                let len = phrase.chars().count();
                if len > 10 && len < 100 {
                    items.push(phrase.to_string());
                }
            }
        }

        items.truncate(5);
        items
    }

    // ── Spam detection ──────────────────────────────────────────────

    /// Heuristic spam check: true when at least 3 indicators fire.
    pub fn detect_spam(&self, email: &EmailMessage) -> bool {
        let blob = blob(email);

        let mut indicators = SPAM_PHRASES.iter().filter(|p| blob.contains(*p)).count();

        // Excessive punctuation is a single combined indicator, even when
        // both "!" and "?" exceed the limit.
        if blob.matches('!').count() > 3 || blob.matches('?').count() > 3 {
            indicators += 1;
        }

        // Shouty subject: all-caps (at least one letter, none lowercase) and
        // longer than 10 chars. Checked against the raw subject.
        if is_all_caps(&email.subject) && email.subject.chars().count() > 10 {
            indicators += 1;
        }

        if blob.matches("http").count() > 3 {
            indicators += 1;
        }

        if indicators >= 3 {
            debug!(email_id = %email.id, indicators, "Email flagged as spam");
        }
        indicators >= 3
    }
}

// ── Scoring helpers ─────────────────────────────────────────────────

/// The uniform scoring surface: lowercased "subject body".
fn blob(email: &EmailMessage) -> String {
    format!("{} {}", email.subject, email.body).to_lowercase()
}

fn priority(email: &EmailMessage, blob: &str, now: DateTime<Utc>) -> Priority {
    let urgent_count = URGENT_KEYWORDS.iter().filter(|k| blob.contains(*k)).count();

    let is_reply = blob.starts_with("re:") || blob.starts_with("fwd:");

    // Missing date means "not recent".
    let is_recent = email
        .date
        .is_some_and(|d| now.signed_duration_since(d).num_seconds() < RECENT_SECS);

    if urgent_count >= 2 || (urgent_count >= 1 && is_recent) {
        Priority::High
    } else if is_reply || urgent_count == 1 {
        Priority::Medium
    } else {
        Priority::Low
    }
}

/// Tag checks in fixed vocabulary order; each tag added at most once.
fn extract_tags(blob: &str) -> Vec<Tag> {
    let mut tags = Vec::new();

    if ["meeting", "schedule", "calendar"].iter().any(|w| blob.contains(w)) {
        tags.push(Tag::Meeting);
    }
    if ["deadline", "due", "submit"].iter().any(|w| blob.contains(w)) {
        tags.push(Tag::ActionRequired);
    }
    if ["invoice", "payment", "pay"].iter().any(|w| blob.contains(w)) {
        tags.push(Tag::Payment);
    }
    if ["question", "?", "help", "assist"].iter().any(|w| blob.contains(w)) {
        tags.push(Tag::NeedsResponse);
    }

    tags
}

fn sentiment(email: &EmailMessage) -> Sentiment {
    let blob = blob(email);

    let positive = POSITIVE_WORDS.iter().filter(|w| blob.contains(*w)).count();
    let negative = NEGATIVE_WORDS.iter().filter(|w| blob.contains(*w)).count();

    if positive > negative {
        Sentiment::Positive
    } else if negative > positive {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}

/// Pick a canned reply from the first matching tag template; fall back to a
/// generic acknowledgement referencing the subject.
fn suggest_response(email: &EmailMessage, classification: &EmailClassification) -> String {
    for tag in &classification.tags {
        let template = match tag {
            Tag::Meeting => {
                "Thank you for your email. I'm available for a meeting. \
                 Could you please share some time slots that work for you?"
            }
            Tag::ActionRequired => {
                "Thank you for bringing this to my attention. \
                 I'll review this and get back to you soon."
            }
            Tag::Payment => {
                "Thank you for the invoice. I'll process the payment and confirm once complete."
            }
            Tag::NeedsResponse => {
                "Thank you for your question. Let me look into this and \
                 I'll get back to you with more details."
            }
        };
        return template.to_string();
    }

    format!(
        "Thank you for your email regarding '{}'. I'll review this and respond accordingly.",
        email.subject
    )
}

/// Python `str.isupper` semantics: at least one cased character and no
/// lowercase ones.
fn is_all_caps(s: &str) -> bool {
    s.chars().any(char::is_uppercase) && !s.chars().any(char::is_lowercase)
}

// ── Tests ───────────────────────────────────────────────────────────
