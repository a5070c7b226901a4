use crate::domain::{ListingKind, ListingRecord, SchoolRecord, SearchQuery, TransactionStatus};
use crate::errors::PipelineError;
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::path::{Path, PathBuf};
use tracing::info;

pub const LISTINGS_SHEET: &str = "Combined Properties";
pub const SCHOOLS_SHEET: &str = "Schools";

const SCHOOL_HEADERS: [&str; 8] = [
    "Name",
    "Rating",
    "Elementary",
    "Middle",
    "High",
    "Public",
    "Private",
    "Website",
];

/// One spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Bool(bool),
    Blank,
}

impl Cell {
    fn text(value: Option<&str>) -> Cell {
        value.map_or(Cell::Blank, |s| Cell::Text(s.to_string()))
    }

    fn number<T: Into<f64>>(value: Option<T>) -> Cell {
        value.map_or(Cell::Blank, |n| Cell::Number(n.into()))
    }

    fn int(value: Option<i64>) -> Cell {
        value.map_or(Cell::Blank, |n| Cell::Number(n as f64))
    }
}

/// Listing column headers, in export order, for one status.
pub fn listing_headers(status: TransactionStatus) -> Vec<&'static str> {
    let (date, price) = if status.is_sold() {
        ("Sold Date", "Sold Price")
    } else {
        ("List Date", "Listed Price")
    };

    let mut headers = vec![
        date,
        "Property Type",
        "Address",
        "Bedrooms",
        "Bathrooms",
        "Living Area",
        "Time On Market",
        price,
    ];
    if !status.is_sold() {
        headers.extend(["Estimate", "Rent Estimate"]);
    }
    headers.extend(["Website", "Source", "Listing ID"]);
    headers
}

/// Cells for each listing, lined up with [`listing_headers`].
pub fn listing_rows(records: &[ListingRecord], status: TransactionStatus) -> Vec<Vec<Cell>> {
    records
        .iter()
        .map(|r| {
            let mut row = vec![
                Cell::Text(r.transaction_date_display()),
                Cell::Text(r.property_type.clone()),
                Cell::Text(r.address.clone()),
                Cell::number(r.bedrooms),
                Cell::number(r.bathrooms),
                Cell::number(r.living_area),
                Cell::int(r.time_on_market),
                Cell::int(r.price),
            ];

            if !status.is_sold() {
                let (estimate, rent_estimate) = match r.kind {
                    ListingKind::Active {
                        estimate,
                        rent_estimate,
                    } => (estimate, rent_estimate),
                    ListingKind::Sold => (None, None),
                };
                row.push(Cell::int(estimate));
                row.push(Cell::int(rent_estimate));
            }

            row.push(Cell::text(r.website.as_deref()));
            row.push(Cell::Text(r.source.to_string()));
            row.push(Cell::text(r.listing_id.as_deref()));
            row
        })
        .collect()
}

pub fn school_rows(schools: &[SchoolRecord]) -> Vec<Vec<Cell>> {
    schools
        .iter()
        .map(|s| {
            vec![
                Cell::Text(s.name.clone()),
                Cell::number(s.rating),
                Cell::Bool(s.is_elementary),
                Cell::Bool(s.is_middle),
                Cell::Bool(s.is_high),
                Cell::Bool(s.is_public),
                Cell::Bool(s.is_private),
                Cell::text(s.website.as_deref()),
            ]
        })
        .collect()
}

/// `<zip>_<status>.xlsx`
pub fn report_file_name(query: &SearchQuery) -> String {
    format!("{}_{}.xlsx", query.location, query.status)
}

fn write_sheet(
    worksheet: &mut Worksheet,
    name: &str,
    headers: &[&str],
    rows: &[Vec<Cell>],
) -> Result<(), PipelineError> {
    let bold = Format::new().set_bold();

    worksheet.set_name(name).map_err(|e| {
        PipelineError::Xlsx(format!("Failed to name sheet '{}': {}", name, e))
    })?;

    for (col, header) in headers.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, *header, &bold)
            .map_err(|e| {
                PipelineError::Xlsx(format!("Failed to write header '{}': {}", header, e))
            })?;
    }

    for (i, row) in rows.iter().enumerate() {
        let r = (i + 1) as u32;

        for (col, cell) in row.iter().enumerate() {
            let c = col as u16;
            let written = match cell {
                Cell::Text(s) => worksheet.write_string(r, c, s).map(|_| ()),
                Cell::Number(n) => worksheet.write_number(r, c, *n).map(|_| ()),
                Cell::Bool(b) => worksheet.write_boolean(r, c, *b).map(|_| ()),
                Cell::Blank => Ok(()),
            };

            written.map_err(|e| {
                PipelineError::Xlsx(format!(
                    "Failed to write '{}' in row {}: {}",
                    headers.get(col).unwrap_or(&"?"),
                    r,
                    e
                ))
            })?;
        }
    }

    worksheet.autofit();
    Ok(())
}

/// Builds the two-sheet workbook in memory.
pub fn build_report(
    listings: &[ListingRecord],
    schools: &[SchoolRecord],
    status: TransactionStatus,
) -> Result<Vec<u8>, PipelineError> {
    let mut workbook = Workbook::new();

    write_sheet(
        workbook.add_worksheet(),
        LISTINGS_SHEET,
        &listing_headers(status),
        &listing_rows(listings, status),
    )?;

    write_sheet(
        workbook.add_worksheet(),
        SCHOOLS_SHEET,
        &SCHOOL_HEADERS,
        &school_rows(schools),
    )?;

    workbook
        .save_to_buffer()
        .map_err(|e| PipelineError::Xlsx(format!("Failed to save workbook: {}", e)))
}

/// Writes the report into `dir` in a single write; nothing is left behind on failure to build.
pub fn export_report(
    dir: &Path,
    query: &SearchQuery,
    listings: &[ListingRecord],
    schools: &[SchoolRecord],
) -> Result<PathBuf, PipelineError> {
    let buffer = build_report(listings, schools, query.status)?;

    let path = dir.join(report_file_name(query));
    std::fs::write(&path, buffer)?;

    info!(
        path = %path.display(),
        listings = listings.len(),
        schools = schools.len(),
        "📊 report written"
    );

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{HomeType, Source};
    use chrono::NaiveDate;

    fn listing(kind: ListingKind) -> ListingRecord {
        ListingRecord {
            address: "1 Main St".to_string(),
            price: Some(450_000),
            bedrooms: Some(3.0),
            bathrooms: Some(2.5),
            living_area: Some(1800.0),
            property_type: "Single Family".to_string(),
            time_on_market: Some(14),
            website: Some("https://www.zillow.com/homedetails/1".to_string()),
            source: Source::Zillow,
            listing_id: Some("1".to_string()),
            transaction_date: NaiveDate::from_ymd_opt(2024, 4, 9).unwrap(),
            kind,
        }
    }

    fn query(status: TransactionStatus) -> SearchQuery {
        SearchQuery {
            location: "62701".to_string(),
            home_type: HomeType::SingleFamily,
            status,
            min_price: 0,
            max_price: 500_000,
        }
    }

    #[test]
    fn sold_and_active_headers_differ() {
        let sold = listing_headers(TransactionStatus::Sold);
        assert_eq!(sold[0], "Sold Date");
        assert!(sold.contains(&"Sold Price"));
        assert!(!sold.contains(&"Estimate"));

        let active = listing_headers(TransactionStatus::ForRent);
        assert_eq!(active[0], "List Date");
        assert!(active.contains(&"Listed Price"));
        assert!(active.contains(&"Rent Estimate"));
    }

    #[test]
    fn rows_line_up_with_headers() {
        let active = listing(ListingKind::Active {
            estimate: Some(455_000),
            rent_estimate: None,
        });
        let status = TransactionStatus::ForSale;
        let headers = listing_headers(status);
        let rows = listing_rows(&[active], status);

        assert_eq!(rows[0].len(), headers.len());
        let col = |h: &str| headers.iter().position(|x| *x == h).unwrap();
        assert_eq!(rows[0][col("List Date")], Cell::Text("04/09/2024".to_string()));
        assert_eq!(rows[0][col("Estimate")], Cell::Number(455_000.0));
        assert_eq!(rows[0][col("Rent Estimate")], Cell::Blank);
        assert_eq!(rows[0][col("Source")], Cell::Text("Zillow".to_string()));
    }

    #[test]
    fn report_is_written_under_query_name() {
        let dir = tempfile::tempdir().unwrap();
        let q = query(TransactionStatus::Sold);

        let path = export_report(dir.path(), &q, &[listing(ListingKind::Sold)], &[]).unwrap();

        assert_eq!(path.file_name().unwrap(), "62701_Sold.xlsx");
        let bytes = std::fs::read(&path).unwrap();
        // xlsx is a zip archive
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn unwritable_destination_is_an_io_failure() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does").join("not").join("exist");

        let err = export_report(&missing, &query(TransactionStatus::ForSale), &[], &[]).unwrap_err();
        assert!(matches!(err, PipelineError::Io(_)));
        assert!(!missing.exists());
    }
}
