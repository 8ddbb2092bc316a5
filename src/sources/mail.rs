// Mailing-list archive adapter.
//
// Public archives publish an index page with one table row per month:
// the first cell names the month, the last cell holds the message count.
// Only addresses under the public archive prefix are fetched; anything
// else (private lists, external list hosts) is skipped without a request.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use super::SourceAdapter;
use crate::fetch::{FetchResult, Fetcher};
use crate::model::{ActivityData, ServiceKind};

/// Prefix of the public mailing-list archives.
pub const DEFAULT_ARCHIVE_PREFIX: &str = "https://lists.w3.org/Archives/Public";

/// Result of parsing an archive index page.
#[derive(Debug, Default, PartialEq)]
pub struct MonthlyCounts {
    /// Message counts keyed by `YYYY-MM`.
    pub counts: BTreeMap<String, u64>,
    /// Text of rows that could not be parsed.
    pub skipped: Vec<String>,
}

/// Parse every `<tbody>` row of an archive index into month → count.
pub fn parse_archive_index(html: &str) -> MonthlyCounts {
    let document = Html::parse_document(html);
    let rows = selector("tbody tr");
    let cells = selector("td");

    let mut parsed = MonthlyCounts::default();
    for row in document.select(&rows) {
        let row_cells: Vec<ElementRef> = row.select(&cells).collect();
        // Header rows made of <th> only carry no data.
        let (Some(first), Some(last)) = (row_cells.first(), row_cells.last()) else {
            continue;
        };

        let month_text = cell_text(first);
        let count_text = cell_text(last);

        match (parse_month(&month_text), count_text.parse::<u64>()) {
            (Some(month), Ok(count)) => {
                parsed.counts.insert(month, count);
            }
            _ => parsed.skipped.push(format!("{month_text} | {count_text}")),
        }
    }
    parsed
}

/// Normalize a month cell to `YYYY-MM`.
///
/// Accepts `2024-01` and the archive's own `January 2024` form (trailing
/// words after the year are ignored).
pub fn parse_month(text: &str) -> Option<String> {
    let text = text.trim();

    if let Ok(date) = NaiveDate::parse_from_str(&format!("{text}-01"), "%Y-%m-%d") {
        return Some(date.format("%Y-%m").to_string());
    }

    let mut words = text.split_whitespace();
    let (month, year) = (words.next()?, words.next()?);
    NaiveDate::parse_from_str(&format!("1 {month} {year}"), "%d %B %Y")
        .ok()
        .map(|date| date.format("%Y-%m").to_string())
}

/// Archives are served over https; older directory entries still say http.
pub fn upgrade_scheme(link: &str) -> String {
    match link.strip_prefix("http://") {
        Some(rest) => format!("https://{rest}"),
        None => link.to_string(),
    }
}

fn cell_text(cell: &ElementRef) -> String {
    cell.text().collect::<String>().trim().to_string()
}

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector is valid CSS")
}

pub struct MailingListAdapter {
    fetcher: Fetcher,
    archive_prefix: String,
}

impl MailingListAdapter {
    pub fn new(fetcher: Fetcher, archive_prefix: &str) -> Self {
        Self {
            fetcher,
            archive_prefix: archive_prefix.to_string(),
        }
    }
}

#[async_trait]
impl SourceAdapter for MailingListAdapter {
    fn kind(&self) -> ServiceKind {
        ServiceKind::MailingList
    }

    async fn collect(&self, link: &str) -> FetchResult<ActivityData> {
        let url = upgrade_scheme(link);
        if !url.starts_with(&self.archive_prefix) {
            debug!(link, "Mailing list outside the public archive, not fetching");
            return Ok(ActivityData::Skipped(format!("Did not fetch {link}")));
        }

        let html = self.fetcher.get_text(&url).await?;
        let parsed = parse_archive_index(&html);
        for row in &parsed.skipped {
            warn!(url = %url, row = %row, "Could not parse mailing-list archive row, skipping");
        }

        Ok(ActivityData::MonthlyMessages(parsed.counts))
    }
}
