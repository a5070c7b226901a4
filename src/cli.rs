use crate::domain::{HomeType, SearchQuery, TransactionStatus};
use crate::impute::PriceFill;
use crate::merge::AddressMatch;
use crate::pagination::{PagingMode, MAX_PAGES};
use crate::pipeline::{PipelineOptions, DEFAULT_PRICE_BANDS};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "listing_harvest")]
#[command(about = "Fetch, merge and export real estate listings from Zillow and Realtor")]
pub struct Cli {
    /// Zip code of the property location (5 digits)
    #[arg(long)]
    pub zip_code: String,

    /// Type of the home: "Single Family", "Townhomes" or "Apartments"
    #[arg(long, default_value = "Single Family")]
    pub home_type: HomeType,

    /// Status type: Sold, ForSale or ForRent
    #[arg(long)]
    pub status_type: TransactionStatus,

    /// Max price to search
    #[arg(long, allow_negative_numbers = true)]
    pub max_price: i64,

    /// Pages to request per source and price band (at most 20)
    #[arg(long, default_value_t = MAX_PAGES)]
    pub pages: u32,

    /// How many price bands to split the search into
    #[arg(long, default_value_t = DEFAULT_PRICE_BANDS)]
    pub price_bands: u32,

    /// Directory the spreadsheet is written to
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Seconds to wait around each request (overrides REQUEST_DELAY_SECS)
    #[arg(long)]
    pub delay_secs: Option<u64>,

    /// Keep paging a source after the other one runs dry
    #[arg(long)]
    pub independent: bool,

    /// Treat spelling variants of an address ("Street"/"St", case, punctuation) as one property
    #[arg(long)]
    pub normalize_addresses: bool,

    /// How to fill missing prices: forward-fill or median
    #[arg(long, default_value = "forward-fill")]
    pub price_fill: PriceFill,
}

impl Cli {
    pub fn query(&self) -> SearchQuery {
        SearchQuery {
            location: self.zip_code.trim().to_string(),
            home_type: self.home_type.clone(),
            status: self.status_type,
            min_price: 0,
            max_price: self.max_price,
        }
    }

    pub fn options(&self, configured_delay: Duration) -> PipelineOptions {
        PipelineOptions {
            pages: self.pages,
            price_bands: self.price_bands,
            paging: if self.independent {
                PagingMode::Independent
            } else {
                PagingMode::Lockstep
            },
            address_match: if self.normalize_addresses {
                AddressMatch::Normalized
            } else {
                AddressMatch::Exact
            },
            price_fill: self.price_fill,
            request_delay: self
                .delay_secs
                .map(Duration::from_secs)
                .unwrap_or(configured_delay),
            output_dir: self.output_dir.clone(),
            today: None,
        }
    }
}
