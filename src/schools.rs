// src/schools.rs

use crate::domain::{SchoolRecord, SearchQuery};
use crate::errors::PipelineError;
use crate::normalize::absolute_url;
use crate::sources::{ListingSource, PageOutcome, RawRecord};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

const SCHOOL_ORIGIN: &str = "https://www.greatschools.org";

// schools.schools[]
//  ├── name
//  ├── gs_rating        number, numeric string or "NR"
//  ├── is_elementary / is_middle / is_high
//  ├── is_public / is_private
//  ├── link
//  └── attendance_zones, is_charter, school_id, location   (ignored)

#[derive(Debug, Deserialize)]
struct RawSchool {
    name: Option<String>,
    #[serde(rename = "gs_rating")]
    rating: Option<Value>,
    is_elementary: Option<bool>,
    is_middle: Option<bool>,
    is_high: Option<bool>,
    is_public: Option<bool>,
    is_private: Option<bool>,
    link: Option<String>,
}

impl RawSchool {
    fn into_record(self) -> Option<SchoolRecord> {
        let name = self.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())?;

        let rating = match self.rating {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
            _ => None,
        };

        Some(SchoolRecord {
            name,
            rating,
            is_elementary: self.is_elementary.unwrap_or(false),
            is_middle: self.is_middle.unwrap_or(false),
            is_high: self.is_high.unwrap_or(false),
            is_public: self.is_public.unwrap_or(false),
            is_private: self.is_private.unwrap_or(false),
            website: self
                .link
                .and_then(|link| absolute_url(&link, Some(SCHOOL_ORIGIN))),
        })
    }
}

/// Normalizes school entries; anything without a usable name is skipped.
pub fn normalize_schools(entries: &[RawRecord]) -> Vec<SchoolRecord> {
    let schools: Vec<SchoolRecord> = entries
        .iter()
        .filter_map(|entry| match RawSchool::deserialize(entry) {
            Ok(raw) => raw.into_record(),
            Err(e) => {
                debug!(error = %e, "skipping malformed school entry");
                None
            }
        })
        .collect();

    if schools.len() < entries.len() {
        debug!(
            skipped = entries.len() - schools.len(),
            "dropped unusable school entries"
        );
    }

    schools
}

/// Looks up the schools bundled with a listing search.
pub struct SchoolEnricher<'a> {
    source: &'a dyn ListingSource,
}

impl<'a> SchoolEnricher<'a> {
    pub fn new(source: &'a dyn ListingSource) -> Self {
        Self { source }
    }

    /// One page-1 request over `[0, max_price]`; a dry source just means no schools.
    pub fn fetch(&self, query: &SearchQuery) -> Result<Vec<SchoolRecord>, PipelineError> {
        let query = query.with_band(0, query.max_price);

        match self.source.fetch(&query, 1)? {
            PageOutcome::Page(page) => {
                let schools = normalize_schools(page.schools.as_deref().unwrap_or_default());
                info!(source = %self.source.source(), schools = schools.len(), "🏫 schools fetched");
                Ok(schools)
            }
            PageOutcome::Exhausted(reason) => {
                warn!(source = %self.source.source(), %reason, "no school data available");
                Ok(Vec::new())
            }
        }
    }

    /// Always makes the one extra school request. Entries captured while
    /// paging are used only when that request brings back no schools.
    pub fn enrich(
        &self,
        query: &SearchQuery,
        captured: Option<&[RawRecord]>,
    ) -> Result<Vec<SchoolRecord>, PipelineError> {
        let fetched = self.fetch(query)?;

        match captured {
            Some(entries) if fetched.is_empty() => {
                let schools = normalize_schools(entries);
                info!(schools = schools.len(), "🏫 schools taken from listing pages");
                Ok(schools)
            }
            _ => Ok(fetched),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn entries_are_normalized() {
        let entries = vec![
            json!({
                "name": "Lincoln Elementary",
                "gs_rating": 8,
                "is_elementary": true,
                "is_public": true,
                "link": "/illinois/springfield/123-Lincoln-Elementary/",
                "school_id": 123
            }),
            json!({"name": "St. Agnes", "gs_rating": "NR", "is_private": true,
                   "link": "https://example.org/st-agnes"}),
        ];

        let schools = normalize_schools(&entries);
        assert_eq!(schools.len(), 2);

        assert_eq!(schools[0].rating, Some(8.0));
        assert!(schools[0].is_elementary && schools[0].is_public);
        assert!(!schools[0].is_high);
        assert_eq!(
            schools[0].website.as_deref(),
            Some("https://www.greatschools.org/illinois/springfield/123-Lincoln-Elementary/")
        );

        assert_eq!(schools[1].rating, None);
        assert_eq!(schools[1].website.as_deref(), Some("https://example.org/st-agnes"));
    }

    #[test]
    fn malformed_entries_are_skipped() {
        let entries = vec![
            json!({"name": ""}),
            json!({"gs_rating": 5}),
            json!({"name": "Central High", "is_high": "yes"}),
            json!("not an object"),
            json!({"name": "Central High", "is_high": true, "gs_rating": "6"}),
        ];

        let schools = normalize_schools(&entries);
        assert_eq!(schools.len(), 1);
        assert_eq!(schools[0].rating, Some(6.0));
    }
}
