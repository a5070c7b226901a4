// realtor.rs
use super::{take_listings, ListingSource, PageOutcome, RapidApiClient, RawPage};
use crate::config::SourceSettings;
use crate::domain::{HomeType, SearchQuery, Source, TransactionStatus};
use crate::errors::PipelineError;
use serde_json::Value;

pub const REALTOR_HOST: &str = "realty-in-us.p.rapidapi.com";
pub const REALTOR_BASE_URL: &str = "https://realty-in-us.p.rapidapi.com";
const LIST_PATH: &str = "/properties/v3/list";
const PAGE_SIZE: u32 = 42;

// data.home_search
//  ├── total
//  └── results[]
//       ├── property_id
//       ├── list_price
//       ├── list_date          "2024-02-14T18:31:05.000000Z"
//       ├── permalink          relative to /realestateandhomes-detail/
//       ├── location.address   line / city / state_code / postal_code
//       ├── description        beds / baths / sqft / sold_price / sold_date ("2024-03-01")
//       └── estimate.estimate

pub struct RealtorClient {
    api: RapidApiClient,
}

impl RealtorClient {
    pub fn new(settings: &SourceSettings) -> Result<Self, PipelineError> {
        Ok(Self {
            api: RapidApiClient::new(REALTOR_HOST, settings)?,
        })
    }

    pub fn status_param(status: TransactionStatus) -> &'static str {
        match status {
            TransactionStatus::Sold => "sold",
            TransactionStatus::ForSale => "for_sale",
            TransactionStatus::ForRent => "for_rent",
        }
    }

    pub fn home_type_param(home_type: &HomeType) -> Option<&'static str> {
        match home_type {
            HomeType::SingleFamily => Some("single_family"),
            HomeType::Townhomes => Some("townhomes"),
            HomeType::Apartments => Some("apartment"),
            HomeType::Other(_) => None,
        }
    }

    pub fn query_params(query: &SearchQuery, page: u32) -> Vec<(&'static str, String)> {
        let offset = page.saturating_sub(1) * PAGE_SIZE;

        let mut params = vec![
            ("postal_code", query.location.clone()),
            ("status", Self::status_param(query.status).to_string()),
            ("list_price_min", query.min_price.to_string()),
            ("list_price_max", query.max_price.to_string()),
            ("limit", PAGE_SIZE.to_string()),
            ("offset", offset.to_string()),
        ];

        if query.status.is_sold() {
            params.push(("sort", "sold_date".to_string()));
        }

        if let Some(home_type) = Self::home_type_param(&query.home_type) {
            params.push(("type", home_type.to_string()));
        }

        params
    }

    pub fn parse_page(mut body: Value) -> PageOutcome {
        let total_pages = body
            .pointer("/data/home_search/total")
            .and_then(Value::as_u64)
            .map(|total| total.div_ceil(PAGE_SIZE as u64) as u32);

        match take_listings(&mut body, "/data/home_search/results") {
            Ok(records) => PageOutcome::Page(RawPage {
                records,
                total_pages,
                schools: None,
            }),
            Err(reason) => PageOutcome::Exhausted(reason),
        }
    }
}

impl ListingSource for RealtorClient {
    fn source(&self) -> Source {
        Source::Realtor
    }

    fn fetch(&self, query: &SearchQuery, page: u32) -> Result<PageOutcome, PipelineError> {
        query.validate()?;

        let params = Self::query_params(query, page);
        match self.api.get_json(LIST_PATH, &params) {
            Ok(body) => Ok(Self::parse_page(body)),
            Err(reason) => Ok(PageOutcome::Exhausted(reason)),
        }
    }
}
