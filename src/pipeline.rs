// src/pipeline.rs

use crate::domain::{ListingRecord, SchoolRecord, SearchQuery};
use crate::errors::PipelineError;
use crate::impute::{ImputeSummary, Imputer, PriceFill};
use crate::merge::{merge, AddressMatch};
use crate::normalize::{normalize_batch, NormalizeContext};
use crate::pagination::{PaginationDriver, PagingMode, RateLimiter};
use crate::schools::SchoolEnricher;
use crate::sources::{ListingSource, RawRecord};
use crate::spreadsheets::export_report;
use chrono::{Local, NaiveDate};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, info_span, warn};

pub const DEFAULT_PRICE_BANDS: u32 = 4;

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub pages: u32,
    pub price_bands: u32,
    pub paging: PagingMode,
    pub address_match: AddressMatch,
    pub price_fill: PriceFill,
    pub request_delay: Duration,
    pub output_dir: PathBuf,
    /// Reference date for active listings; `None` means the local date at run time.
    pub today: Option<NaiveDate>,
}

#[derive(Debug)]
pub struct RunReport {
    /// `None` when nothing survived to be exported.
    pub output: Option<PathBuf>,
    pub listings: Vec<ListingRecord>,
    pub schools: Vec<SchoolRecord>,
    pub dropped: usize,
    pub imputed: ImputeSummary,
}

/// Splits `[0, max_price]` into contiguous inclusive bands.
///
/// `price_bands(400, 4)` gives `(0,100) (101,200) (201,300) (301,400)`;
/// empty bands are left out.
pub fn price_bands(max_price: i64, bands: u32) -> Vec<(i64, i64)> {
    let bands = i64::from(bands.max(1));
    let step = max_price / bands;

    (0..bands)
        .map(|i| {
            let min = if i == 0 { 0 } else { i * step + 1 };
            let max = if i == bands - 1 { max_price } else { (i + 1) * step };
            (min, max)
        })
        .filter(|(min, max)| min <= max)
        .collect()
}

pub struct Pipeline {
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(options: PipelineOptions) -> Self {
        Self { options }
    }

    /// Fetch, normalize, merge, impute and export one query.
    ///
    /// `primary` wins address ties and answers the one extra school request.
    pub fn run(
        &self,
        primary: &dyn ListingSource,
        secondary: &dyn ListingSource,
        query: &SearchQuery,
    ) -> Result<RunReport, PipelineError> {
        query.validate()?;
        if query.max_price <= 0 {
            return Err(PipelineError::InvalidQuery(
                "max price must be a positive value".into(),
            ));
        }

        let driver = PaginationDriver::new(
            self.options.paging,
            self.options.pages,
            RateLimiter::new(self.options.request_delay),
        );

        let mut primary_raw: Vec<RawRecord> = Vec::new();
        let mut secondary_raw: Vec<RawRecord> = Vec::new();
        let mut captured_schools: Option<Vec<RawRecord>> = None;

        for (min_price, max_price) in price_bands(query.max_price, self.options.price_bands) {
            let span = info_span!("band", min_price, max_price);
            let _enter = span.enter();

            let harvest = driver.run(primary, secondary, &query.with_band(min_price, max_price))?;

            primary_raw.extend(harvest.primary.records);
            secondary_raw.extend(harvest.secondary.records);
            if captured_schools.is_none() {
                captured_schools = harvest.schools;
            }
        }

        let ctx = NormalizeContext {
            status: query.status,
            property_type: query.home_type.label().to_string(),
            today: self.options.today.unwrap_or_else(|| Local::now().date_naive()),
        };

        let primary_batch = normalize_batch(&primary_raw, primary.source().into(), &ctx);
        let secondary_batch = normalize_batch(&secondary_raw, secondary.source().into(), &ctx);
        let dropped = primary_batch.dropped + secondary_batch.dropped;

        let mut listings = merge(
            primary_batch.records,
            secondary_batch.records,
            self.options.address_match,
        );

        let imputed = Imputer::new(self.options.price_fill).impute(
            &mut listings,
            query.status,
            query.home_type.label(),
        );

        if listings.is_empty() {
            warn!("No properties found for the given criteria, nothing exported");
            return Ok(RunReport {
                output: None,
                listings,
                schools: Vec::new(),
                dropped,
                imputed,
            });
        }

        let schools = SchoolEnricher::new(primary).enrich(query, captured_schools.as_deref())?;

        let output = export_report(&self.options.output_dir, query, &listings, &schools)?;
        info!(path = %output.display(), "✅ run complete");

        Ok(RunReport {
            output: Some(output),
            listings,
            schools,
            dropped,
            imputed,
        })
    }
}
