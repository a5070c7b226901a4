// src/domain/listing.rs

use crate::errors::PipelineError;
use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

/// Which marketplace produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    Zillow,
    Realtor,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Zillow => "Zillow",
            Source::Realtor => "Realtor",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zillow" => Ok(Source::Zillow),
            "realtor" => Ok(Source::Realtor),
            other => Err(format!("unknown source '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionStatus {
    Sold,
    ForSale,
    ForRent,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Sold => "Sold",
            TransactionStatus::ForSale => "ForSale",
            TransactionStatus::ForRent => "ForRent",
        }
    }

    pub fn is_sold(&self) -> bool {
        matches!(self, TransactionStatus::Sold)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        match folded.as_str() {
            "sold" | "recentlysold" => Ok(TransactionStatus::Sold),
            "forsale" => Ok(TransactionStatus::ForSale),
            "forrent" => Ok(TransactionStatus::ForRent),
            _ => Err(format!(
                "unknown status '{s}' (expected Sold, ForSale or ForRent)"
            )),
        }
    }
}

/// The home-type filter of a query.
///
/// Anything outside the known vocabulary is kept verbatim and searched
/// without a type filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HomeType {
    SingleFamily,
    Townhomes,
    Apartments,
    Other(String),
}

impl HomeType {
    pub fn label(&self) -> &str {
        match self {
            HomeType::SingleFamily => "Single Family",
            HomeType::Townhomes => "Townhomes",
            HomeType::Apartments => "Apartments",
            HomeType::Other(raw) => raw,
        }
    }
}

impl fmt::Display for HomeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for HomeType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        Ok(match folded.as_str() {
            "singlefamily" | "houses" | "house" => HomeType::SingleFamily,
            "townhomes" | "townhome" | "townhouse" | "townhouses" => HomeType::Townhomes,
            "apartments" | "apartment" => HomeType::Apartments,
            _ => HomeType::Other(s.trim().to_string()),
        })
    }
}

/// One price-filtered search, as sent to every source.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub location: String,
    pub home_type: HomeType,
    pub status: TransactionStatus,
    pub min_price: i64,
    pub max_price: i64,
}

impl SearchQuery {
    /// Rejects queries no source should ever see.
    pub fn validate(&self) -> Result<(), PipelineError> {
        let loc = self.location.as_str();
        if loc.len() != 5 || !loc.chars().all(|c| c.is_ascii_digit()) {
            return Err(PipelineError::InvalidQuery(format!(
                "'{loc}' is not a valid 5 digit zip code"
            )));
        }

        if self.max_price < 0 {
            return Err(PipelineError::InvalidQuery(format!(
                "max price must be a non-negative integer, got {}",
                self.max_price
            )));
        }

        if self.min_price < 0 {
            return Err(PipelineError::InvalidQuery(format!(
                "min price must be a non-negative integer, got {}",
                self.min_price
            )));
        }

        Ok(())
    }

    pub fn with_band(&self, min_price: i64, max_price: i64) -> SearchQuery {
        SearchQuery {
            min_price,
            max_price,
            ..self.clone()
        }
    }
}

/// The status-specific part of a canonical listing.
#[derive(Debug, Clone, PartialEq)]
pub enum ListingKind {
    /// `price` is the sold price and `transaction_date` the sale date.
    Sold,
    /// `price` is the asking price and `transaction_date` the list date.
    Active {
        estimate: Option<i64>,
        rent_estimate: Option<i64>,
    },
}

/// Canonical listing shared by every source.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingRecord {
    pub address: String,
    pub price: Option<i64>,
    pub bedrooms: Option<f64>,
    pub bathrooms: Option<f64>,
    pub living_area: Option<f64>,
    pub property_type: String,
    pub time_on_market: Option<i64>,
    pub website: Option<String>,
    pub source: Source,
    pub listing_id: Option<String>,
    pub transaction_date: NaiveDate,
    pub kind: ListingKind,
}

impl ListingRecord {
    /// True once every imputable field has a value.
    #[cfg(test)]
    pub fn is_complete(&self) -> bool {
        self.price.is_some()
            && self.bedrooms.is_some()
            && self.bathrooms.is_some()
            && self.living_area.is_some()
            && self.time_on_market.is_some()
    }

    pub fn transaction_date_display(&self) -> String {
        self.transaction_date.format("%m/%d/%Y").to_string()
    }
}
