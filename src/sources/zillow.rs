// zillow.rs
use super::{take_listings, ListingSource, PageOutcome, RapidApiClient, RawPage};
use crate::config::SourceSettings;
use crate::domain::{HomeType, SearchQuery, Source, TransactionStatus};
use crate::errors::PipelineError;
use serde_json::Value;

pub const ZILLOW_HOST: &str = "zillow-com1.p.rapidapi.com";
pub const ZILLOW_BASE_URL: &str = "https://zillow-com1.p.rapidapi.com";
const SEARCH_PATH: &str = "/propertyExtendedSearch";

// props[]
//  ├── zpid
//  ├── address            "123 Main St, Springfield, IL 62701"
//  ├── price
//  ├── bedrooms / bathrooms / livingArea
//  ├── daysOnZillow
//  ├── dateSold           epoch millis (sold searches only)
//  ├── zestimate / rentZestimate
//  └── detailUrl          "/homedetails/..."
// schools.schools[]
// totalPages

pub struct ZillowClient {
    api: RapidApiClient,
}

impl ZillowClient {
    pub fn new(settings: &SourceSettings) -> Result<Self, PipelineError> {
        Ok(Self {
            api: RapidApiClient::new(ZILLOW_HOST, settings)?,
        })
    }

    pub fn status_param(status: TransactionStatus) -> &'static str {
        match status {
            TransactionStatus::Sold => "RecentlySold",
            TransactionStatus::ForSale => "ForSale",
            TransactionStatus::ForRent => "ForRent",
        }
    }

    pub fn home_type_param(home_type: &HomeType) -> Option<&'static str> {
        match home_type {
            HomeType::SingleFamily => Some("Houses"),
            HomeType::Townhomes => Some("Townhomes"),
            HomeType::Apartments => Some("Apartments"),
            HomeType::Other(_) => None,
        }
    }

    pub fn query_params(query: &SearchQuery, page: u32) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("location", query.location.clone()),
            ("schools", "elementary,middle,high".to_string()),
            ("page", page.to_string()),
            ("minPrice", query.min_price.to_string()),
            ("maxPrice", query.max_price.to_string()),
            ("status_type", Self::status_param(query.status).to_string()),
        ];

        if query.status.is_sold() {
            params.push(("sort", "RecentlySold".to_string()));
        }

        if let Some(home_type) = Self::home_type_param(&query.home_type) {
            params.push(("home_type", home_type.to_string()));
        }

        params
    }

    pub fn parse_page(mut body: Value) -> PageOutcome {
        let total_pages = body
            .get("totalPages")
            .and_then(Value::as_u64)
            .map(|n| n as u32);

        let schools = body
            .pointer_mut("/schools/schools")
            .map(Value::take)
            .and_then(|v| match v {
                Value::Array(items) => Some(items),
                _ => None,
            });

        match take_listings(&mut body, "/props") {
            Ok(records) => PageOutcome::Page(RawPage {
                records,
                total_pages,
                schools,
            }),
            Err(reason) => PageOutcome::Exhausted(reason),
        }
    }
}

impl ListingSource for ZillowClient {
    fn source(&self) -> Source {
        Source::Zillow
    }

    fn fetch(&self, query: &SearchQuery, page: u32) -> Result<PageOutcome, PipelineError> {
        query.validate()?;

        let params = Self::query_params(query, page);
        match self.api.get_json(SEARCH_PATH, &params) {
            Ok(body) => Ok(Self::parse_page(body)),
            Err(reason) => Ok(PageOutcome::Exhausted(reason)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Exhaustion;
    use serde_json::json;
    use std::time::Duration;

    fn query(location: &str) -> SearchQuery {
        SearchQuery {
            location: location.to_string(),
            home_type: HomeType::Townhomes,
            status: TransactionStatus::Sold,
            min_price: 0,
            max_price: 400_000,
        }
    }

    #[test]
    fn short_zip_fails_before_any_request() {
        // Port 9 (discard) on localhost: a request would come back as Transport exhaustion.
        let settings = SourceSettings {
            api_key: "test".to_string(),
            base_url: "http://127.0.0.1:9".to_string(),
            timeout: Duration::from_millis(200),
        };
        let client = ZillowClient::new(&settings).unwrap();

        let result = client.fetch(&query("1234"), 1);
        assert!(matches!(result, Err(PipelineError::InvalidQuery(_))));
    }

    #[test]
    fn sold_query_params_include_sort_and_type() {
        let params = ZillowClient::query_params(&query("62701"), 3);
        let get = |k: &str| params.iter().find(|(name, _)| *name == k).map(|(_, v)| v.as_str());

        assert_eq!(get("status_type"), Some("RecentlySold"));
        assert_eq!(get("sort"), Some("RecentlySold"));
        assert_eq!(get("home_type"), Some("Townhomes"));
        assert_eq!(get("page"), Some("3"));
    }

    #[test]
    fn unknown_home_type_sends_no_filter() {
        let mut q = query("62701");
        q.home_type = HomeType::Other("Yurt".to_string());
        let params = ZillowClient::query_params(&q, 1);
        assert!(params.iter().all(|(name, _)| *name != "home_type"));
    }

    #[test]
    fn page_with_props_and_schools() {
        let body = json!({
            "props": [{"address": "1 Main St"}, {"address": "2 Main St"}],
            "totalPages": 4,
            "schools": {"schools": [{"name": "Lincoln Elementary"}]}
        });

        match ZillowClient::parse_page(body) {
            PageOutcome::Page(page) => {
                assert_eq!(page.records.len(), 2);
                assert_eq!(page.total_pages, Some(4));
                assert_eq!(page.schools.map(|s| s.len()), Some(1));
            }
            other => panic!("expected a page, got {other:?}"),
        }
    }

    #[test]
    fn missing_props_is_exhaustion() {
        let outcome = ZillowClient::parse_page(json!({"message": "quota exceeded"}));
        assert!(matches!(
            outcome,
            PageOutcome::Exhausted(Exhaustion::MissingListingsKey)
        ));

        let outcome = ZillowClient::parse_page(json!({"props": []}));
        assert!(matches!(outcome, PageOutcome::Exhausted(Exhaustion::EmptyPage)));
    }
}
