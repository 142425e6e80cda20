/// CSV export of replay records.
pub mod export;
