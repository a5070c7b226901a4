mod rapidapi;
mod realtor;
mod zillow;

pub use rapidapi::RapidApiClient;
pub use realtor::{RealtorClient, REALTOR_BASE_URL};
pub use zillow::{ZillowClient, ZILLOW_BASE_URL};

use crate::domain::{SearchQuery, Source};
use crate::errors::{Exhaustion, PipelineError};
use serde_json::Value;

/// A single listing exactly as a source returned it.
pub type RawRecord = Value;

/// One successful page from a source.
#[derive(Debug, Clone, Default)]
pub struct RawPage {
    pub records: Vec<RawRecord>,
    /// How many pages the source claims to have for this query, if it says.
    pub total_pages: Option<u32>,
    /// School entries bundled with the listings, when the source sends them.
    pub schools: Option<Vec<RawRecord>>,
}

#[derive(Debug, Clone)]
pub enum PageOutcome {
    Page(RawPage),
    Exhausted(Exhaustion),
}

/// A paginated marketplace search.
///
/// `fetch` issues at most one request and keeps no state between calls.
/// Only an invalid query is an error; every upstream problem comes back as
/// [`PageOutcome::Exhausted`].
pub trait ListingSource {
    fn source(&self) -> Source;

    fn fetch(&self, query: &SearchQuery, page: u32) -> Result<PageOutcome, PipelineError>;
}

/// Pulls the listing array at `pointer` out of a response body.
pub(crate) fn take_listings(body: &mut Value, pointer: &str) -> Result<Vec<RawRecord>, Exhaustion> {
    let listings = match body.pointer_mut(pointer).map(Value::take) {
        Some(Value::Array(items)) => items,
        _ => return Err(Exhaustion::MissingListingsKey),
    };

    if listings.is_empty() {
        return Err(Exhaustion::EmptyPage);
    }

    Ok(listings)
}
