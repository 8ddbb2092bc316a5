// Domain types shared by the directory client, the source adapters and the
// snapshot pipeline. Everything here serializes to the snapshot JSON.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::directory::Group;
use crate::sources::feed::FeedActivity;

/// What kind of source a declared service points at.
///
/// Round-trips through the directory's `type` string; unknown types are kept
/// verbatim as `Other` and never fetched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ServiceKind {
    Feed,
    MailingList,
    Wiki,
    Repository,
    Other(String),
}

impl ServiceKind {
    pub fn as_str(&self) -> &str {
        match self {
            ServiceKind::Feed => "rss",
            ServiceKind::MailingList => "lists",
            ServiceKind::Wiki => "wiki",
            ServiceKind::Repository => "repository",
            ServiceKind::Other(raw) => raw,
        }
    }
}

impl From<String> for ServiceKind {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "rss" => ServiceKind::Feed,
            "lists" => ServiceKind::MailingList,
            "wiki" => ServiceKind::Wiki,
            "repository" => ServiceKind::Repository,
            _ => ServiceKind::Other(raw),
        }
    }
}

impl From<ServiceKind> for String {
    fn from(kind: ServiceKind) -> Self {
        kind.as_str().to_string()
    }
}

impl std::fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A service declared by a community group (feed, list archive, wiki, repository...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    #[serde(rename = "type")]
    pub kind: ServiceKind,
    #[serde(default)]
    pub link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortdesc: Option<String>,
}

impl ServiceDescriptor {
    pub fn new(kind: ServiceKind, link: &str) -> Self {
        Self {
            kind,
            link: link.to_string(),
            shortdesc: None,
        }
    }
}

/// Normalized activity for one service. Serialized untagged, so the JSON
/// shape follows the source kind; placeholders serialize as plain strings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ActivityData {
    Feed(FeedActivity),
    /// Message counts keyed by `YYYY-MM`.
    MonthlyMessages(BTreeMap<String, u64>),
    /// Issues and pull requests, flattened.
    Items { items: Vec<Value> },
    /// The service was deliberately not fetched.
    Skipped(String),
    /// Fetching or decoding failed.
    Error(String),
}

impl ActivityData {
    pub fn is_error(&self) -> bool {
        matches!(self, ActivityData::Error(_))
    }
}

/// One declared service and what was collected for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityRecord {
    pub service: ServiceDescriptor,
    pub data: ActivityData,
}

/// A snapshot branch: either loaded, or an error placeholder.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Fragment<T> {
    Loaded(T),
    Failed(String),
}

impl<T> Fragment<T> {
    pub fn is_failed(&self) -> bool {
        matches!(self, Fragment::Failed(_))
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            Fragment::Loaded(value) => Some(value),
            Fragment::Failed(_) => None,
        }
    }
}

/// Everything collected for one community group in one run.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub id: u64,
    pub group: Group,
    pub chairs: Fragment<Vec<Value>>,
    pub activities: Fragment<Vec<ActivityRecord>>,
    pub participations: Fragment<Vec<Value>>,
    pub fetched_at: DateTime<Utc>,
}

impl Snapshot {
    /// True when any branch failed or any service came back as an error.
    pub fn is_degraded(&self) -> bool {
        self.chairs.is_failed()
            || self.participations.is_failed()
            || match &self.activities {
                Fragment::Loaded(records) => records.iter().any(|r| r.data.is_error()),
                Fragment::Failed(_) => true,
            }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn service_kind_maps_directory_types() {
        let services: Vec<ServiceDescriptor> = serde_json::from_value(json!([
            {"type": "rss", "link": "https://example.org/feed"},
            {"type": "lists", "link": "https://lists.w3.org/Archives/Public/public-x/"},
            {"type": "wiki", "link": "/community/x/wiki"},
            {"type": "repository", "link": "https://github.com/w3c/x"},
            {"type": "blog", "link": "https://example.org/blog", "shortdesc": "Blog"}
        ]))
        .unwrap();

        let kinds: Vec<_> = services.iter().map(|s| s.kind.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                ServiceKind::Feed,
                ServiceKind::MailingList,
                ServiceKind::Wiki,
                ServiceKind::Repository,
                ServiceKind::Other("blog".to_string()),
            ]
        );
        assert_eq!(services[4].shortdesc.as_deref(), Some("Blog"));
    }

    #[test]
    fn descriptor_serializes_original_type() {
        let service = ServiceDescriptor::new(ServiceKind::MailingList, "https://lists.example/a");
        let value = serde_json::to_value(&service).unwrap();
        assert_eq!(value, json!({"type": "lists", "link": "https://lists.example/a"}));
    }

    #[test]
    fn activity_placeholders_serialize_as_strings() {
        let error = ActivityData::Error("Error fetching x: boom".to_string());
        assert_eq!(serde_json::to_value(&error).unwrap(), json!("Error fetching x: boom"));

        let items = ActivityData::Items {
            items: vec![json!({"number": 1})],
        };
        assert_eq!(
            serde_json::to_value(&items).unwrap(),
            json!({"items": [{"number": 1}]})
        );

        let months = ActivityData::MonthlyMessages(BTreeMap::from([("2024-01".to_string(), 5)]));
        assert_eq!(serde_json::to_value(&months).unwrap(), json!({"2024-01": 5}));
    }

    #[test]
    fn failed_fragment_serializes_as_placeholder() {
        let chairs: Fragment<Vec<Value>> = Fragment::Failed("Error fetching chairs".to_string());
        assert_eq!(serde_json::to_value(&chairs).unwrap(), json!("Error fetching chairs"));
        assert!(chairs.is_failed());
        assert!(chairs.loaded().is_none());
    }
}
