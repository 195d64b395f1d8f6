//! Wire types shared by the gateway, the analysis view and the server.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A bibliographic record under moderation and analysis.
///
/// Every field except `_id` is optional on the wire so partially populated
/// documents still deserialize.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Article {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub journal: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(default)]
    pub sections: String,
    #[serde(default)]
    pub content: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_approved: Option<bool>,
    #[serde(
        default,
        with = "timestamp::rfc3339",
        skip_serializing_if = "Option::is_none"
    )]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<String>,

    #[serde(default)]
    pub rating_sum: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_ratings: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_check_pass: Option<bool>,
    #[serde(
        default,
        with = "timestamp::rfc3339",
        skip_serializing_if = "Option::is_none"
    )]
    pub quality_checked_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_checked_by: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_analysed: Option<bool>,
    /// Misspelt flag kept by older documents, sometimes next to `is_analysed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_analused: Option<bool>,
    #[serde(
        default,
        with = "timestamp::rfc3339",
        skip_serializing_if = "Option::is_none"
    )]
    pub analysed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moderation_comments: Option<String>,

    /// Attached claim ids in attach order. `None` means the document has no
    /// claims field at all, which is not the same as an empty list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claims: Option<Vec<String>>,
}

impl Article {
    /// Whether a moderator already marked the analysis as done.
    pub fn is_analysis_complete(&self) -> bool {
        self.is_analysed == Some(true)
            || self.is_analused == Some(true)
            || self.analysed_at.is_some()
    }

    /// Authors joined for display, e.g. `"A. Smith, B. Jones"`.
    pub fn author_line(&self) -> String {
        self.authors.join(", ")
    }

    /// Attached claim ids, treating a missing field as empty.
    pub fn claim_ids(&self) -> &[String] {
        self.claims.as_deref().unwrap_or(&[])
    }

    /// Apply the fields present in `update`; absent fields are left alone.
    pub fn apply(&mut self, update: &ArticleUpdate) {
        if let Some(claims) = &update.claims {
            self.claims = Some(claims.clone());
        }
        if let Some(is_analysed) = update.is_analysed {
            self.is_analysed = Some(is_analysed);
        }
        if let Some(at) = update.analysed_at {
            self.analysed_at = Some(at);
        }
    }
}

/// A short factual statement that can be attached to articles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
}

impl Claim {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Case-insensitive keyword match: every whitespace-separated word of
    /// `query` must appear in the name. A blank query matches nothing.
    pub fn matches_query(&self, query: &str) -> bool {
        let name = self.name.to_lowercase();
        let mut words = query.split_whitespace().peekable();
        if words.peek().is_none() {
            return false;
        }
        words.all(|w| name.contains(&w.to_lowercase()))
    }
}

/// Partial update sent to `/api/article/update`.
///
/// Only the fields that are `Some` are serialized, so the server treats the
/// payload as a patch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleUpdate {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claims: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_analysed: Option<bool>,
    #[serde(
        default,
        with = "timestamp::millis",
        skip_serializing_if = "Option::is_none"
    )]
    pub analysed_at: Option<DateTime<Utc>>,
}

impl ArticleUpdate {
    /// Replace the article's claim list.
    pub fn set_claims(id: impl Into<String>, claims: Vec<String>) -> Self {
        Self {
            id: id.into(),
            claims: Some(claims),
            ..Default::default()
        }
    }

    /// Flag the article as analysed at `at`.
    pub fn mark_analysed(id: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            is_analysed: Some(true),
            analysed_at: Some(at),
            ..Default::default()
        }
    }
}

/// Body returned by `/api/article/update`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateResponse {
    #[serde(default)]
    pub error: Option<String>,
}

/// Body of `/api/article/` lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleLookup {
    #[serde(rename = "_id")]
    pub id: String,
}

/// Serde adapters for timestamps that arrive either as RFC 3339 strings or
/// as epoch milliseconds.
pub(crate) mod timestamp {
    use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Wire {
        Millis(i64),
        Text(String),
    }

    fn from_wire<E: serde::de::Error>(wire: Wire) -> Result<DateTime<Utc>, E> {
        match wire {
            Wire::Millis(ms) => Utc
                .timestamp_millis_opt(ms)
                .single()
                .ok_or_else(|| E::custom(format!("timestamp out of range: {ms}"))),
            Wire::Text(s) => DateTime::parse_from_rfc3339(&s)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| E::custom(format!("invalid timestamp {s:?}: {e}"))),
        }
    }

    fn deserialize_any<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        match Option::<Wire>::deserialize(d)? {
            Some(wire) => from_wire(wire).map(Some),
            None => Ok(None),
        }
    }

    pub mod rfc3339 {
        use super::*;

        pub fn serialize<S: Serializer>(
            value: &Option<DateTime<Utc>>,
            s: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(dt) => s.serialize_some(&dt.to_rfc3339_opts(SecondsFormat::Millis, true)),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            d: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            deserialize_any(d)
        }
    }

    pub mod millis {
        use super::*;

        pub fn serialize<S: Serializer>(
            value: &Option<DateTime<Utc>>,
            s: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(dt) => s.serialize_some(&dt.timestamp_millis()),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            d: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            deserialize_any(d)
        }
    }
}
