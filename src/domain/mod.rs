pub mod listing;
pub mod school;

pub use listing::{HomeType, ListingKind, ListingRecord, SearchQuery, Source, TransactionStatus};
pub use school::SchoolRecord;
