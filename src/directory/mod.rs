// Community directory client: the read-only API listing community groups
// and, per group, its chairs, declared services and participations.
//
// The directory is HAL-shaped: list endpoints embed their items under
// `_embedded.<collection>` and link the next page at `_links.next.href`.
// All calls go through the shared paginator, so they share the queue's
// concurrency cap with every other fetch in the run.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::fetch::{FetchResult, HalCollection, Paginator};
use crate::model::ServiceDescriptor;

/// Default directory endpoint.
pub const DEFAULT_DIRECTORY_API_URL: &str = "https://api.w3.org";

/// The group type this system monitors.
pub const COMMUNITY_GROUP_TYPE: &str = "community group";

/// Page size requested from every directory list endpoint.
const PAGE_SIZE: u32 = 100;

/// A group entry from the directory listing. Fields beyond the ones used for
/// filtering are kept as-is and written into the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(rename = "is_closed", alias = "is-closed", default)]
    pub is_closed: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Group {
    pub fn is_open_community_group(&self) -> bool {
        self.kind == COMMUNITY_GROUP_TYPE && !self.is_closed
    }
}

/// Client for the community directory.
#[derive(Clone)]
pub struct DirectoryClient {
    pages: Paginator,
    base_url: String,
}

impl DirectoryClient {
    pub fn new(pages: Paginator, base_url: &str) -> Self {
        Self {
            pages,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn groups_url(&self) -> String {
        format!("{}/groups?embed=1&items={PAGE_SIZE}", self.base_url)
    }

    pub fn group_url(&self, id: u64, collection: &str) -> String {
        format!(
            "{}/groups/{id}/{collection}?embed=1&items={PAGE_SIZE}",
            self.base_url
        )
    }

    /// Every group in the directory, all types, open and closed.
    pub async fn groups(&self) -> FetchResult<Vec<Group>> {
        let groups: Vec<Group> = self
            .pages
            .walk(&self.groups_url(), &HalCollection::new("groups"))
            .await?;
        debug!(count = groups.len(), "Fetched directory group list");
        Ok(groups)
    }

    pub async fn chairs(&self, id: u64) -> FetchResult<Vec<Value>> {
        self.collection(id, "chairs").await
    }

    pub async fn services(&self, id: u64) -> FetchResult<Vec<ServiceDescriptor>> {
        self.collection(id, "services").await
    }

    pub async fn participations(&self, id: u64) -> FetchResult<Vec<Value>> {
        self.collection(id, "participations").await
    }

    async fn collection<T: serde::de::DeserializeOwned>(
        &self,
        id: u64,
        collection: &str,
    ) -> FetchResult<Vec<T>> {
        self.pages
            .walk(
                &self.group_url(id, collection),
                &HalCollection::new(collection),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn filters_open_community_groups() {
        let groups: Vec<Group> = serde_json::from_value(json!([
            {"id": 1, "name": "Open CG", "type": "community group", "is_closed": false},
            {"id": 2, "name": "Closed CG", "type": "community group", "is-closed": true},
            {"id": 3, "name": "A WG", "type": "working group"},
            {"id": 4, "name": "Defaults open", "type": "community group"}
        ]))
        .unwrap();

        let open: Vec<u64> = groups
            .iter()
            .filter(|g| g.is_open_community_group())
            .map(|g| g.id)
            .collect();
        assert_eq!(open, vec![1, 4]);
    }

    #[test]
    fn keeps_unknown_fields() {
        let group: Group = serde_json::from_value(json!({
            "id": 7,
            "name": "X",
            "type": "community group",
            "shortname": "x",
            "_links": {"self": {"href": "https://api.w3.org/groups/7"}}
        }))
        .unwrap();
        assert_eq!(group.extra.get("shortname"), Some(&json!("x")));

        let back = serde_json::to_value(&group).unwrap();
        assert_eq!(back["shortname"], json!("x"));
        assert_eq!(back["type"], json!("community group"));
    }
}
