// src/impute.rs

use crate::domain::{ListingRecord, TransactionStatus};
use std::cmp::Reverse;
use tracing::{info, warn};

/// How missing prices are filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PriceFill {
    /// Last price seen earlier in the current order. Leading gaps use the median.
    #[default]
    ForwardFill,
    /// Dataset median; independent of record order.
    Median,
}

impl std::str::FromStr for PriceFill {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "median" => Ok(PriceFill::Median),
            "forward-fill" | "ffill" | "forward" => Ok(PriceFill::ForwardFill),
            other => Err(format!("unknown price fill '{other}' (median | forward-fill)")),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ImputeSummary {
    pub bedrooms: usize,
    pub bathrooms: usize,
    pub living_area: usize,
    pub price: usize,
    pub time_on_market: usize,
}

pub struct Imputer {
    price_fill: PriceFill,
}

impl Imputer {
    pub fn new(price_fill: PriceFill) -> Self {
        Self { price_fill }
    }

    /// Fills every imputable field across the merged set, then orders it.
    ///
    /// Statistics are taken over the whole set as passed in. Sold sets come
    /// back newest sale first; active sets keep their fetch order.
    pub fn impute(
        &self,
        records: &mut [ListingRecord],
        status: TransactionStatus,
        property_type: &str,
    ) -> ImputeSummary {
        let mut summary = ImputeSummary::default();

        // Fills one f64 column with its median.
        macro_rules! fill_median {
            ($field:ident) => {{
                let known: Vec<f64> = records.iter().filter_map(|r| r.$field).collect();
                let fill = median(&known).unwrap_or_else(|| {
                    if !records.is_empty() {
                        warn!(field = stringify!($field), "no known values, filling with 0");
                    }
                    0.0
                });
                for record in records.iter_mut().filter(|r| r.$field.is_none()) {
                    record.$field = Some(fill);
                    summary.$field += 1;
                }
            }};
        }

        fill_median!(bedrooms);
        fill_median!(bathrooms);
        fill_median!(living_area);

        summary.price = self.fill_price(records);

        let known_days: Vec<f64> = records
            .iter()
            .filter_map(|r| r.time_on_market)
            .map(|d| d as f64)
            .collect();
        let fill_days = median(&known_days).map(|m| m.round() as i64).unwrap_or(0);
        for record in records.iter_mut() {
            if record.time_on_market.is_none() {
                summary.time_on_market += 1;
            }
            record.time_on_market = Some(record.time_on_market.unwrap_or(fill_days).saturating_abs());
        }

        for record in records.iter_mut() {
            record.property_type = property_type.to_string();
        }

        if status.is_sold() {
            records.sort_by_key(|r| Reverse(r.transaction_date));
        }

        info!(
            records = records.len(),
            ?summary,
            price_fill = ?self.price_fill,
            "imputed missing values"
        );

        summary
    }

    fn fill_price(&self, records: &mut [ListingRecord]) -> usize {
        let known: Vec<f64> = records
            .iter()
            .filter_map(|r| r.price)
            .map(|p| p as f64)
            .collect();
        let median_price = median(&known).map(|m| m.round() as i64).unwrap_or_else(|| {
            if !records.is_empty() {
                warn!(field = "price", "no known values, filling with 0");
            }
            0
        });

        let mut filled = 0;
        let mut last_seen: Option<i64> = None;

        for record in records.iter_mut() {
            match record.price {
                Some(price) => last_seen = Some(price),
                None => {
                    let fill = match self.price_fill {
                        PriceFill::Median => median_price,
                        PriceFill::ForwardFill => last_seen.unwrap_or(median_price),
                    };
                    record.price = Some(fill);
                    filled += 1;
                }
            }
        }

        filled
    }
}

pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ListingKind, Source};
    use chrono::NaiveDate;

    fn record(address: &str, day: u32) -> ListingRecord {
        ListingRecord {
            address: address.to_string(),
            price: Some(300_000),
            bedrooms: Some(3.0),
            bathrooms: Some(2.0),
            living_area: Some(1500.0),
            property_type: "CONDO".to_string(),
            time_on_market: Some(20),
            website: None,
            source: Source::Zillow,
            listing_id: None,
            transaction_date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            kind: ListingKind::Sold,
        }
    }

    #[test]
    fn living_area_gap_takes_median_of_known() {
        let mut records = vec![record("a", 1), record("b", 2), record("c", 3)];
        records[0].living_area = Some(1000.0);
        records[1].living_area = None;
        records[2].living_area = Some(1400.0);

        let summary = Imputer::new(PriceFill::Median).impute(
            &mut records,
            TransactionStatus::ForSale,
            "Single Family",
        );

        assert_eq!(records[1].living_area, Some(1200.0));
        assert_eq!(summary.living_area, 1);
    }

    #[test]
    fn nothing_is_left_empty() {
        let mut records = vec![record("a", 1), record("b", 2), record("c", 3)];
        records[0].price = None;
        records[1].bedrooms = None;
        records[1].bathrooms = None;
        records[2].time_on_market = None;
        records[0].time_on_market = Some(-8);

        Imputer::new(PriceFill::Median).impute(&mut records, TransactionStatus::Sold, "Townhomes");

        for r in &records {
            assert!(r.is_complete(), "{r:?} still has gaps");
            assert!(r.time_on_market.unwrap() >= 0);
            assert_eq!(r.property_type, "Townhomes");
        }
    }

    #[test]
    fn forward_fill_uses_previous_price() {
        let mut records = vec![record("a", 1), record("b", 2), record("c", 3), record("d", 4)];
        records[0].price = None;
        records[1].price = Some(100);
        records[2].price = None;
        records[3].price = Some(400);

        Imputer::new(PriceFill::ForwardFill).impute(
            &mut records,
            TransactionStatus::ForRent,
            "Apartments",
        );

        let prices: Vec<_> = records.iter().map(|r| r.price.unwrap()).collect();
        // Leading gap falls back to the median of 100 and 400.
        assert_eq!(prices, vec![250, 100, 100, 400]);
    }

    #[test]
    fn prices_forward_fill_unless_told_otherwise() {
        assert_eq!(PriceFill::default(), PriceFill::ForwardFill);
        assert_eq!("median".parse::<PriceFill>(), Ok(PriceFill::Median));

        let mut records = vec![record("a", 1), record("b", 2), record("c", 3)];
        records[0].price = Some(100);
        records[1].price = None;
        records[2].price = Some(900);

        Imputer::new(PriceFill::default()).impute(
            &mut records,
            TransactionStatus::ForSale,
            "Single Family",
        );
        assert_eq!(records[1].price, Some(100));
    }

    #[test]
    fn median_fill_ignores_order() {
        let mut forward = vec![record("a", 1), record("b", 2), record("c", 3)];
        forward[0].price = Some(100);
        forward[1].price = None;
        forward[2].price = Some(900);
        let mut backward: Vec<_> = forward.iter().rev().cloned().collect();

        let imputer = Imputer::new(PriceFill::Median);
        imputer.impute(&mut forward, TransactionStatus::ForSale, "Single Family");
        imputer.impute(&mut backward, TransactionStatus::ForSale, "Single Family");

        assert_eq!(forward[1].price, Some(500));
        assert_eq!(backward[1].price, Some(500));
    }

    #[test]
    fn sold_sets_are_sorted_newest_first() {
        let mut records = vec![record("a", 3), record("b", 9), record("c", 5)];
        Imputer::new(PriceFill::Median).impute(&mut records, TransactionStatus::Sold, "Single Family");

        let order: Vec<_> = records.iter().map(|r| r.address.as_str()).collect();
        assert_eq!(order, vec!["b", "c", "a"]);
    }

    #[test]
    fn active_sets_keep_fetch_order() {
        let mut records = vec![record("a", 3), record("b", 9), record("c", 5)];
        Imputer::new(PriceFill::Median).impute(
            &mut records,
            TransactionStatus::ForSale,
            "Single Family",
        );

        let order: Vec<_> = records.iter().map(|r| r.address.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn median_of_even_and_odd() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }
}
