// src/normalize/mod.rs

pub mod dates;
pub mod field_map;

pub use field_map::{field_map, FieldMap, RecordSchema};

use crate::domain::{ListingKind, ListingRecord, Source, TransactionStatus};
use crate::errors::ParseFailure;
use chrono::{Duration, NaiveDate};
use dates::{days_between, parse_date};
use field_map::{AddressSpec, DateSpec, ProvenanceSpec, TimeOnMarketSpec};
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

static NULL: Value = Value::Null;

/// Query-level facts every record of a batch shares.
#[derive(Debug, Clone)]
pub struct NormalizeContext {
    pub status: TransactionStatus,
    /// Label written to every record's property type.
    pub property_type: String,
    /// "Now" for still-active listings.
    pub today: NaiveDate,
}

#[derive(Debug, Default)]
pub struct NormalizedBatch {
    pub records: Vec<ListingRecord>,
    pub dropped: usize,
}

/// Maps one raw record onto the canonical shape, or says why it can't.
pub fn normalize(
    raw: &Value,
    map: &FieldMap,
    ctx: &NormalizeContext,
) -> Result<ListingRecord, ParseFailure> {
    let source = match map.provenance {
        ProvenanceSpec::Fixed(source) => source,
        ProvenanceSpec::Field(pointer) => text_at(raw, pointer)
            .and_then(|s| s.parse::<Source>().ok())
            .ok_or(ParseFailure::MissingField("source"))?,
    };

    let address = address(raw, &map.address).ok_or(ParseFailure::MissingAddress)?;

    // A listing without a usable living area is dropped. Price only has to be
    // present; an explicit null is left for the imputer.
    let price = required_number(raw, map.price, "price")?.map(round);
    let living_area =
        number_at(raw, map.living_area).ok_or(ParseFailure::MissingField("livingArea"))?;

    let transaction_date = resolve_date(raw, &map.transaction_date, ctx.today).map_err(|value| {
        ParseFailure::UnparseableDate {
            field: "transactionDate",
            value,
        }
    })?;

    let time_on_market = match map.time_on_market {
        TimeOnMarketSpec::Field(pointer) => number_at(raw, pointer).map(|n| round(n).saturating_abs()),
        TimeOnMarketSpec::SinceListDate(spec) => resolve_date(raw, &spec, ctx.today)
            .ok()
            .map(|listed| {
                let until = if ctx.status.is_sold() {
                    transaction_date
                } else {
                    ctx.today
                };
                days_between(listed, until)
            }),
    };

    let website = text_at(raw, map.website).and_then(|link| absolute_url(&link, map.web_origin));

    let kind = if ctx.status.is_sold() {
        ListingKind::Sold
    } else {
        ListingKind::Active {
            estimate: map.estimate.and_then(|p| number_at(raw, p)).map(round),
            rent_estimate: map.rent_estimate.and_then(|p| number_at(raw, p)).map(round),
        }
    };

    Ok(ListingRecord {
        address,
        price,
        bedrooms: number_at(raw, map.bedrooms),
        bathrooms: number_at(raw, map.bathrooms),
        living_area: Some(living_area),
        property_type: ctx.property_type.clone(),
        time_on_market,
        website,
        source,
        listing_id: text_at(raw, map.listing_id),
        transaction_date,
        kind,
    })
}

/// Normalizes a whole batch, counting what had to be dropped.
pub fn normalize_batch(raws: &[Value], schema: RecordSchema, ctx: &NormalizeContext) -> NormalizedBatch {
    let map = field_map(schema, ctx.status);
    let mut batch = NormalizedBatch::default();

    for raw in raws {
        match normalize(raw, map, ctx) {
            Ok(record) => batch.records.push(record),
            Err(reason) => {
                debug!(?schema, %reason, "dropping record");
                batch.dropped += 1;
            }
        }
    }

    info!(
        ?schema,
        kept = batch.records.len(),
        dropped = batch.dropped,
        "normalized batch"
    );

    batch
}

/// Rewrites a relative link against `origin`; absolute links pass through untouched.
pub fn absolute_url(link: &str, origin: Option<&str>) -> Option<String> {
    let link = link.trim();
    if link.is_empty() {
        return None;
    }

    if Url::parse(link).is_ok() {
        return Some(link.to_string());
    }

    match origin {
        Some(origin) => Url::parse(origin)
            .and_then(|base| base.join(link))
            .ok()
            .map(String::from),
        None => Some(link.to_string()),
    }
}

fn address(raw: &Value, spec: &AddressSpec) -> Option<String> {
    match *spec {
        AddressSpec::Single(pointer) => text_at(raw, pointer),
        AddressSpec::Parts {
            line,
            city,
            state,
            postal,
        } => {
            let line = text_at(raw, line)?;
            let region = [text_at(raw, state), text_at(raw, postal)]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join(" ");

            let parts: Vec<String> = [Some(line), text_at(raw, city), Some(region)]
                .into_iter()
                .flatten()
                .filter(|s| !s.is_empty())
                .collect();

            Some(parts.join(", "))
        }
    }
}

/// Resolves a date spec; on failure returns the offending raw text.
fn resolve_date(raw: &Value, spec: &DateSpec, today: NaiveDate) -> Result<NaiveDate, String> {
    match *spec {
        DateSpec::Field { pointer, encoding } => {
            let value = raw.pointer(pointer).unwrap_or(&NULL);
            parse_date(value, encoding).ok_or_else(|| describe(value))
        }
        DateSpec::DaysBeforeToday(pointer) => {
            let value = raw.pointer(pointer).unwrap_or(&NULL);
            number_value(value)
                .and_then(|days| Duration::try_days(round(days).saturating_abs()))
                .and_then(|back| today.checked_sub_signed(back))
                .ok_or_else(|| describe(value))
        }
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "<missing>".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `Err` when the key is absent, `Ok(None)` when it is null or not a number.
fn required_number(
    raw: &Value,
    pointer: &str,
    field: &'static str,
) -> Result<Option<f64>, ParseFailure> {
    raw.pointer(pointer)
        .map(number_value)
        .ok_or(ParseFailure::MissingField(field))
}

fn number_at(raw: &Value, pointer: &str) -> Option<f64> {
    raw.pointer(pointer).and_then(number_value)
}

/// Accepts JSON numbers and strings such as "$1,250" or "2.5".
fn number_value(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned: String = s
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
                .collect();
            cleaned.parse::<f64>().ok()
        }
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

fn text_at(raw: &Value, pointer: &str) -> Option<String> {
    match raw.pointer(pointer)? {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn round(n: f64) -> i64 {
    n.round() as i64
}
