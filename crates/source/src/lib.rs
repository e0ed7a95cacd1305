//! Data source adapter: paged, read-only retrieval of raw inventory rows.

pub mod inventory;

pub use inventory::{connect, fetch_all_inventory, PagedInventoryQuery, SourceError};
