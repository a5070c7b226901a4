// src/tests/fakes.rs

use crate::domain::{SearchQuery, Source};
use crate::errors::{Exhaustion, PipelineError};
use crate::sources::{ListingSource, PageOutcome, RawPage};
use serde_json::{json, Value};
use std::cell::RefCell;
use std::collections::VecDeque;

/// A listing source that replays canned pages and remembers what it was asked.
///
/// Once the script runs out every further page is an empty page.
pub struct ScriptedSource {
    source: Source,
    script: RefCell<VecDeque<PageOutcome>>,
    calls: RefCell<Vec<(u32, i64, i64)>>,
}

impl ScriptedSource {
    pub fn new(source: Source, script: Vec<PageOutcome>) -> Self {
        Self {
            source,
            script: RefCell::new(script.into()),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// `(page, min_price, max_price)` for every request made.
    pub fn calls(&self) -> Vec<(u32, i64, i64)> {
        self.calls.borrow().clone()
    }

    pub fn pages_requested(&self) -> Vec<u32> {
        self.calls().into_iter().map(|(page, _, _)| page).collect()
    }
}

impl ListingSource for ScriptedSource {
    fn source(&self) -> Source {
        self.source
    }

    fn fetch(&self, query: &SearchQuery, page: u32) -> Result<PageOutcome, PipelineError> {
        query.validate()?;
        self.calls
            .borrow_mut()
            .push((page, query.min_price, query.max_price));

        Ok(self
            .script
            .borrow_mut()
            .pop_front()
            .unwrap_or(PageOutcome::Exhausted(Exhaustion::EmptyPage)))
    }
}

pub fn page(records: Vec<Value>) -> PageOutcome {
    PageOutcome::Page(RawPage {
        records,
        total_pages: None,
        schools: None,
    })
}

pub fn page_of(records: Vec<Value>, total_pages: u32) -> PageOutcome {
    PageOutcome::Page(RawPage {
        records,
        total_pages: Some(total_pages),
        schools: None,
    })
}

pub fn page_with_schools(records: Vec<Value>, schools: Vec<Value>) -> PageOutcome {
    PageOutcome::Page(RawPage {
        records,
        total_pages: None,
        schools: Some(schools),
    })
}

pub fn exhausted(reason: Exhaustion) -> PageOutcome {
    PageOutcome::Exhausted(reason)
}

/// A sold Zillow `props[]` entry.
pub fn zillow_sold(address: &str, price: Value, living_area: Value, sold_ms: i64) -> Value {
    json!({
        "zpid": address.len().to_string(),
        "address": address,
        "price": price,
        "bedrooms": 3,
        "bathrooms": 2,
        "livingArea": living_area,
        "daysOnZillow": 21,
        "dateSold": sold_ms,
        "detailUrl": format!("/homedetails/{}/", address.replace(' ', "-")),
    })
}

/// A sold Realtor `results[]` entry.
pub fn realtor_sold(line: &str, city: &str, price: Value, sold_date: &str) -> Value {
    json!({
        "property_id": format!("R{}", line.len()),
        "list_date": "2024-01-02T10:00:00.000000Z",
        "permalink": format!("{}_{}", line.replace(' ', "-"), city),
        "location": {"address": {
            "line": line, "city": city, "state_code": "IL", "postal_code": "62701"
        }},
        "description": {
            "beds": 4, "baths": 3, "sqft": 2100,
            "sold_price": price, "sold_date": sold_date
        }
    })
}

pub fn school(name: &str, rating: i64) -> Value {
    json!({
        "name": name,
        "gs_rating": rating,
        "is_elementary": true,
        "is_public": true,
        "link": "/illinois/springfield/"
    })
}
