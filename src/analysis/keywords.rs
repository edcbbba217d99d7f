//! Fixed keyword tables driving the classification heuristics.
//!
//! Immutable static data — loaded at compile time, never mutated. Category
//! order doubles as the tie-break order: on equal scores the first category
//! in `CATEGORY_KEYWORDS` wins.

use crate::model::Category;

/// Category keyword lists, in tie-break order.
pub const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::Work,
        &["meeting", "project", "deadline", "presentation", "report", "task"],
    ),
    (
        Category::Personal,
        &["family", "friend", "birthday", "invitation", "party"],
    ),
    (
        Category::Finance,
        &["invoice", "payment", "bank", "transaction", "billing", "receipt"],
    ),
    (
        Category::Promotions,
        &["sale", "discount", "offer", "deal", "promo", "advertise"],
    ),
    (
        Category::Newsletters,
        &["newsletter", "digest", "update", "subscription"],
    ),
    (
        Category::Social,
        &["facebook", "twitter", "linkedin", "instagram", "notification"],
    ),
    (
        Category::Spam,
        &["unsubscribe", "click here", "act now", "limited time", "winner"],
    ),
];

/// Keywords that raise priority.
pub const URGENT_KEYWORDS: &[&str] = &[
    "urgent",
    "asap",
    "immediately",
    "critical",
    "emergency",
    "important",
    "deadline",
    "today",
    "now",
    "priority",
];

pub const POSITIVE_WORDS: &[&str] = &[
    "thank",
    "appreciate",
    "great",
    "excellent",
    "good",
    "happy",
    "pleased",
    "wonderful",
    "amazing",
    "love",
];

pub const NEGATIVE_WORDS: &[&str] = &[
    "unfortunately",
    "sorry",
    "apologize",
    "issue",
    "problem",
    "concern",
    "disappointed",
    "frustrated",
    "urgent",
    "critical",
];

/// Phrases that each add one spam indicator when present.
pub const SPAM_PHRASES: &[&str] = &[
    "congratulations you've won",
    "click here now",
    "act now",
    "limited time offer",
    "100% free",
    "no credit card",
    "dear friend",
    "nigerian prince",
];
