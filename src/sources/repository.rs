// Code-hosting adapter: issues and pull requests for a repository, or for
// every repository of an organization.
//
// Addresses look like `https://github.com/<owner>` (organization) or
// `https://github.com/<owner>/<repo>`. Every list endpoint is walked to
// the end with `state=all&per_page=100`; an organization's repositories
// are fetched concurrently and their items flattened into one list.

use std::sync::LazyLock;

use async_trait::async_trait;
use futures::future::try_join_all;
use regex_lite::Regex;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use super::SourceAdapter;
use crate::fetch::{FetchError, FetchResult, LinkHeader, Paginator};
use crate::model::{ActivityData, ServiceKind};

/// Default code-hosting API endpoint.
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

static REPOSITORY_ADDRESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"github\.com/([^/]*)(/([^/]*)/?)?$").expect("repository address pattern is valid")
});

/// What a repository service address points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryTarget {
    Organization(String),
    Repository { owner: String, name: String },
}

/// Parse a repository service address. `None` when it isn't a recognizable
/// organization or repository address.
pub fn parse_repository_address(link: &str) -> Option<RepositoryTarget> {
    let captures = REPOSITORY_ADDRESS.captures(link)?;
    let owner = captures.get(1)?.as_str();
    if owner.is_empty() {
        return None;
    }

    match captures.get(3).map(|m| m.as_str()).filter(|name| !name.is_empty()) {
        Some(name) => Some(RepositoryTarget::Repository {
            owner: owner.to_string(),
            name: name.to_string(),
        }),
        None => Some(RepositoryTarget::Organization(owner.to_string())),
    }
}

#[derive(Debug, Deserialize)]
struct RepositoryRef {
    name: String,
    owner: Owner,
}

#[derive(Debug, Deserialize)]
struct Owner {
    login: String,
}

pub struct RepositoryAdapter {
    pages: Paginator,
    api_base: String,
}

impl RepositoryAdapter {
    pub fn new(pages: Paginator, api_base: &str) -> Self {
        Self {
            pages,
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    /// All issues and pull requests of every repository in `org`.
    pub async fn organization_items(&self, org: &str) -> FetchResult<Vec<Value>> {
        let url = format!("{}/orgs/{org}/repos?per_page=100", self.api_base);
        let repos: Vec<RepositoryRef> = self.pages.walk(&url, &LinkHeader).await?;
        info!(org, repositories = repos.len(), "Fetching organization repositories");

        let per_repo = try_join_all(
            repos
                .iter()
                .map(|repo| self.repository_items(&repo.owner.login, &repo.name)),
        )
        .await?;

        Ok(per_repo.into_iter().flatten().collect())
    }

    /// Issues followed by pull requests of one repository.
    pub async fn repository_items(&self, owner: &str, name: &str) -> FetchResult<Vec<Value>> {
        let issues_url = format!(
            "{}/repos/{owner}/{name}/issues?state=all&per_page=100",
            self.api_base
        );
        let pulls_url = format!(
            "{}/repos/{owner}/{name}/pulls?state=all&per_page=100",
            self.api_base
        );

        let (issues, pulls) = futures::try_join!(
            self.pages.walk::<Value>(&issues_url, &LinkHeader),
            self.pages.walk::<Value>(&pulls_url, &LinkHeader),
        )?;
        debug!(owner, name, issues = issues.len(), pulls = pulls.len(), "Fetched repository activity");

        Ok(issues.into_iter().chain(pulls).collect())
    }
}

#[async_trait]
impl SourceAdapter for RepositoryAdapter {
    fn kind(&self) -> ServiceKind {
        ServiceKind::Repository
    }

    async fn collect(&self, link: &str) -> FetchResult<ActivityData> {
        let items = match parse_repository_address(link) {
            Some(RepositoryTarget::Organization(org)) => self.organization_items(&org).await?,
            Some(RepositoryTarget::Repository { owner, name }) => {
                self.repository_items(&owner, &name).await?
            }
            None => {
                return Err(FetchError::AddressShape {
                    kind: "repository",
                    address: link.to_string(),
                })
            }
        };
        Ok(ActivityData::Items { items })
    }
}
