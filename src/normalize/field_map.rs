// src/normalize/field_map.rs

//! Where each canonical field lives in each record shape.
//!
//! Every (schema, status) pairing is a plain [`FieldMap`] value; the
//! generic routine in `normalize` is the only code that reads them.

use super::dates::DateEncoding;
use crate::domain::{Source, TransactionStatus};

/// The shapes a record can arrive in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordSchema {
    Zillow,
    Realtor,
    /// A row of our own exported listing sheet, keyed by column header.
    Canonical,
}

impl From<Source> for RecordSchema {
    fn from(source: Source) -> Self {
        match source {
            Source::Zillow => RecordSchema::Zillow,
            Source::Realtor => RecordSchema::Realtor,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProvenanceSpec {
    Fixed(Source),
    Field(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AddressSpec {
    /// Already a one-line address.
    Single(&'static str),
    /// Assembled as "line, city, ST 12345".
    Parts {
        line: &'static str,
        city: &'static str,
        state: &'static str,
        postal: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DateSpec {
    Field {
        pointer: &'static str,
        encoding: DateEncoding,
    },
    /// A day count back from the run date.
    DaysBeforeToday(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeOnMarketSpec {
    /// The source reports a day count directly.
    Field(&'static str),
    /// Days from the list date to the sale (sold) or to today (active).
    SinceListDate(DateSpec),
}

/// JSON pointers for every canonical field of one record shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldMap {
    pub provenance: ProvenanceSpec,
    pub address: AddressSpec,
    pub price: &'static str,
    pub bedrooms: &'static str,
    pub bathrooms: &'static str,
    pub living_area: &'static str,
    pub transaction_date: DateSpec,
    pub time_on_market: TimeOnMarketSpec,
    pub website: &'static str,
    /// Prefix for relative links.
    pub web_origin: Option<&'static str>,
    pub listing_id: &'static str,
    /// Only read for active listings.
    pub estimate: Option<&'static str>,
    pub rent_estimate: Option<&'static str>,
}

const ZILLOW_ORIGIN: &str = "https://www.zillow.com";
const REALTOR_ORIGIN: &str = "https://www.realtor.com/realestateandhomes-detail/";

const ZILLOW_SOLD: FieldMap = FieldMap {
    provenance: ProvenanceSpec::Fixed(Source::Zillow),
    address: AddressSpec::Single("/address"),
    price: "/price",
    bedrooms: "/bedrooms",
    bathrooms: "/bathrooms",
    living_area: "/livingArea",
    transaction_date: DateSpec::Field {
        pointer: "/dateSold",
        encoding: DateEncoding::EpochMillis,
    },
    time_on_market: TimeOnMarketSpec::Field("/daysOnZillow"),
    website: "/detailUrl",
    web_origin: Some(ZILLOW_ORIGIN),
    listing_id: "/zpid",
    estimate: None,
    rent_estimate: None,
};

const ZILLOW_ACTIVE: FieldMap = FieldMap {
    transaction_date: DateSpec::DaysBeforeToday("/daysOnZillow"),
    estimate: Some("/zestimate"),
    rent_estimate: Some("/rentZestimate"),
    ..ZILLOW_SOLD
};

const REALTOR_LIST_DATE: DateSpec = DateSpec::Field {
    pointer: "/list_date",
    encoding: DateEncoding::Iso8601,
};

const REALTOR_SOLD: FieldMap = FieldMap {
    provenance: ProvenanceSpec::Fixed(Source::Realtor),
    address: AddressSpec::Parts {
        line: "/location/address/line",
        city: "/location/address/city",
        state: "/location/address/state_code",
        postal: "/location/address/postal_code",
    },
    price: "/description/sold_price",
    bedrooms: "/description/beds",
    bathrooms: "/description/baths",
    living_area: "/description/sqft",
    transaction_date: DateSpec::Field {
        pointer: "/description/sold_date",
        encoding: DateEncoding::YearMonthDay,
    },
    time_on_market: TimeOnMarketSpec::SinceListDate(REALTOR_LIST_DATE),
    website: "/permalink",
    web_origin: Some(REALTOR_ORIGIN),
    listing_id: "/property_id",
    estimate: None,
    rent_estimate: None,
};

const REALTOR_ACTIVE: FieldMap = FieldMap {
    price: "/list_price",
    transaction_date: REALTOR_LIST_DATE,
    estimate: Some("/estimate/estimate"),
    ..REALTOR_SOLD
};

// Pointers here are "/" + the exported column header.
const CANONICAL_SOLD: FieldMap = FieldMap {
    provenance: ProvenanceSpec::Field("/Source"),
    address: AddressSpec::Single("/Address"),
    price: "/Sold Price",
    bedrooms: "/Bedrooms",
    bathrooms: "/Bathrooms",
    living_area: "/Living Area",
    transaction_date: DateSpec::Field {
        pointer: "/Sold Date",
        encoding: DateEncoding::MonthDayYear,
    },
    time_on_market: TimeOnMarketSpec::Field("/Time On Market"),
    website: "/Website",
    web_origin: None,
    listing_id: "/Listing ID",
    estimate: None,
    rent_estimate: None,
};

const CANONICAL_ACTIVE: FieldMap = FieldMap {
    price: "/Listed Price",
    transaction_date: DateSpec::Field {
        pointer: "/List Date",
        encoding: DateEncoding::MonthDayYear,
    },
    estimate: Some("/Estimate"),
    rent_estimate: Some("/Rent Estimate"),
    ..CANONICAL_SOLD
};

pub fn field_map(schema: RecordSchema, status: TransactionStatus) -> &'static FieldMap {
    match (schema, status.is_sold()) {
        (RecordSchema::Zillow, true) => &ZILLOW_SOLD,
        (RecordSchema::Zillow, false) => &ZILLOW_ACTIVE,
        (RecordSchema::Realtor, true) => &REALTOR_SOLD,
        (RecordSchema::Realtor, false) => &REALTOR_ACTIVE,
        (RecordSchema::Canonical, true) => &CANONICAL_SOLD,
        (RecordSchema::Canonical, false) => &CANONICAL_ACTIVE,
    }
}
