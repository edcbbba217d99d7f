//! Data model for email messages and analysis results.
//!
//! These are the wire types: everything here is serde-derived and crosses the
//! HTTP boundary as JSON. Classification/analysis results are constructed
//! fresh per request and never mutated afterwards.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Addresses and messages ──────────────────────────────────────────

/// An email address with an optional display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailAddress {
    /// Display name, if the header carried one.
    #[serde(default)]
    pub name: Option<String>,
    /// The address itself.
    pub email: String,
}

impl EmailAddress {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            name: None,
            email: email.into(),
        }
    }

    pub fn with_name(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            email: email.into(),
        }
    }
}

/// A normalized email message.
///
/// `id`, `subject`, `sender` and `body` are required; everything else has a
/// sensible default so partially-populated messages (e.g. hand-built analysis
/// requests) still deserialize. A missing `date` is treated as "not recent"
/// by the priority scorer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailMessage {
    /// Opaque identifier (IMAP sequence number or generated).
    pub id: String,
    pub subject: String,
    pub sender: EmailAddress,
    #[serde(default)]
    pub recipients: Vec<EmailAddress>,
    #[serde(default)]
    pub cc: Vec<EmailAddress>,
    #[serde(default)]
    pub bcc: Vec<EmailAddress>,
    pub body: String,
    #[serde(default)]
    pub html_body: Option<String>,
    /// When the message was sent. `None` when the Date header is missing or
    /// unparseable.
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    /// Attachment filenames.
    #[serde(default)]
    pub attachments: Vec<String>,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub is_starred: bool,
    #[serde(default = "default_folder")]
    pub folder: String,
}

fn default_folder() -> String {
    "inbox".to_string()
}

// ── Classification labels ───────────────────────────────────────────

/// Coarse topic label. Exactly one per email; `General` when no keyword list
/// scored a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Work,
    Personal,
    Finance,
    Promotions,
    Newsletters,
    Social,
    Spam,
    General,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Category::Work => "work",
            Category::Personal => "personal",
            Category::Finance => "finance",
            Category::Promotions => "promotions",
            Category::Newsletters => "newsletters",
            Category::Social => "social",
            Category::Spam => "spam",
            Category::General => "general",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

/// Secondary descriptive label; multiple allowed per email.
///
/// Serialized kebab-case ("action-required" etc.) to match the tag
/// vocabulary on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tag {
    Meeting,
    ActionRequired,
    Payment,
    NeedsResponse,
}

// ── Results ─────────────────────────────────────────────────────────

/// Result of classifying a single email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailClassification {
    pub category: Category,
    pub priority: Priority,
    /// Confidence in the category choice, in `[0, 1]`.
    pub confidence: f64,
    /// Tags in vocabulary-check order, each at most once.
    pub tags: Vec<Tag>,
}

/// Complete analysis of a single email: classification plus derived text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailAnalysis {
    pub email_id: String,
    pub classification: EmailClassification,
    /// Extractive summary, at most 200 chars.
    pub summary: String,
    pub sentiment: Sentiment,
    /// Canned reply text chosen from the tag templates.
    pub suggested_response: String,
    pub action_required: bool,
    /// Extracted imperative phrases, at most 5.
    pub action_items: Vec<String>,
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_address_with_and_without_name() {
        let named = EmailAddress::with_name("John Doe", "john@example.com");
        assert_eq!(named.name.as_deref(), Some("John Doe"));
        assert_eq!(named.email, "john@example.com");

        let bare = EmailAddress::new("test@example.com");
        assert!(bare.name.is_none());
    }

    #[test]
    fn email_message_defaults_from_minimal_json() {
        let json = serde_json::json!({
            "id": "1",
            "subject": "Test Subject",
            "sender": {"email": "sender@example.com"},
            "body": "Test body",
        });
        let msg: EmailMessage = serde_json::from_value(json).unwrap();
        assert_eq!(msg.id, "1");
        assert!(!msg.is_read);
        assert!(!msg.is_starred);
        assert_eq!(msg.folder, "inbox");
        assert!(msg.recipients.is_empty());
        assert!(msg.date.is_none());
    }

    #[test]
    fn email_message_rejects_missing_required_fields() {
        // No body — must fail at the boundary, not inside scoring.
        let json = serde_json::json!({
            "id": "1",
            "subject": "Test",
            "sender": {"email": "sender@example.com"},
        });
        assert!(serde_json::from_value::<EmailMessage>(json).is_err());
    }

    #[test]
    fn category_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(Category::Newsletters).unwrap(),
            serde_json::json!("newsletters")
        );
        assert_eq!(Category::Work.to_string(), "work");
    }

    #[test]
    fn tag_serializes_kebab_case() {
        assert_eq!(
            serde_json::to_value(Tag::ActionRequired).unwrap(),
            serde_json::json!("action-required")
        );
        assert_eq!(
            serde_json::to_value(Tag::NeedsResponse).unwrap(),
            serde_json::json!("needs-response")
        );
    }

    #[test]
    fn classification_round_trips() {
        let c = EmailClassification {
            category: Category::Work,
            priority: Priority::High,
            confidence: 0.95,
            tags: vec![Tag::Meeting, Tag::ActionRequired],
        };
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["category"], "work");
        assert_eq!(json["priority"], "high");
        let back: EmailClassification = serde_json::from_value(json).unwrap();
        assert_eq!(back.tags.len(), 2);
    }
}
