//! Paged retrieval of batch/expiry rows from PostgreSQL.
//!
//! The query joins current stock batches against the item master, the batch
//! lot-date table, and the item group table. Lot dates are legacy text
//! columns carried over from an ERP import, so all date parsing and
//! validation happens downstream in the pipeline; the adapter only promises
//! rows with a positive quantity and a non-null expiry string.

use shelfwatch_core::config::DatabaseConfig;
use shelfwatch_core::record::InventoryRecord;
use sqlx::postgres::{PgPool, PgPoolOptions};
use thiserror::Error;
use tracing::{debug, info};

/// Errors from the data source boundary. All of them are fatal to the run:
/// without source rows there is nothing to alert on.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Open a connection pool against the configured database.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, SourceError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.connection_string())
        .await?;
    info!(host = %config.host, database = %config.database, "database connected");
    Ok(pool)
}

const INVENTORY_PAGE_SQL: &str = "\
SELECT b.item_code,
       b.warehouse_code,
       b.batch_no,
       b.quantity::float8 AS quantity,
       i.item_name,
       i.spec,
       i.group_code,
       l.inbound_date,
       l.production_date,
       l.expiry_date,
       g.group_desc,
       g.shelf_life_days
FROM stock_batches b
LEFT JOIN items i ON b.item_code = i.item_code
LEFT JOIN batch_lots l ON b.item_code = l.item_code AND b.batch_no = l.batch_no
LEFT JOIN item_groups g ON i.group_code = g.group_code
WHERE b.quantity > 0
  AND l.expiry_date IS NOT NULL
ORDER BY b.item_code, b.batch_no, b.warehouse_code
LIMIT $1 OFFSET $2";

/// Row struct matching `INVENTORY_PAGE_SQL` column for column.
#[derive(Debug, sqlx::FromRow)]
struct InventoryRow {
    item_code: String,
    warehouse_code: String,
    batch_no: String,
    quantity: f64,
    item_name: Option<String>,
    spec: Option<String>,
    group_code: Option<String>,
    inbound_date: Option<String>,
    production_date: Option<String>,
    expiry_date: Option<String>,
    group_desc: Option<String>,
    shelf_life_days: Option<i32>,
}

impl From<InventoryRow> for InventoryRecord {
    fn from(row: InventoryRow) -> Self {
        InventoryRecord {
            item_code: row.item_code,
            warehouse_code: row.warehouse_code,
            batch_no: row.batch_no,
            quantity: row.quantity,
            item_name: row.item_name,
            spec: row.spec,
            group_code: row.group_code,
            inbound_date: row.inbound_date,
            production_date: row.production_date,
            expiry_date: row.expiry_date,
            group_desc: row.group_desc,
            shelf_life_days: row.shelf_life_days,
        }
    }
}

/// Lazy pull-based page cursor over the inventory query.
///
/// Each [`next_page`](PagedInventoryQuery::next_page) call fetches at most
/// `page_size` rows. The cursor reports exhaustion with `Ok(None)` after the
/// first short page, so consumers can stream pages without materializing the
/// full result set.
pub struct PagedInventoryQuery {
    page_size: i64,
    offset: i64,
    done: bool,
}

impl PagedInventoryQuery {
    pub fn new(page_size: i64) -> Self {
        Self {
            page_size: page_size.max(1),
            offset: 0,
            done: false,
        }
    }

    /// Fetch the next page, or `None` once the query is exhausted.
    pub async fn next_page(
        &mut self,
        pool: &PgPool,
    ) -> Result<Option<Vec<InventoryRecord>>, SourceError> {
        if self.done {
            return Ok(None);
        }

        let rows: Vec<InventoryRow> = sqlx::query_as(INVENTORY_PAGE_SQL)
            .bind(self.page_size)
            .bind(self.offset)
            .fetch_all(pool)
            .await?;

        if rows.is_empty() {
            self.done = true;
            return Ok(None);
        }

        if (rows.len() as i64) < self.page_size {
            self.done = true;
        }
        self.offset += rows.len() as i64;

        debug!(
            page_rows = rows.len(),
            next_offset = self.offset,
            "inventory page fetched"
        );

        Ok(Some(rows.into_iter().map(InventoryRecord::from).collect()))
    }
}

/// Fetch the complete inventory result set, page by page.
///
/// Pages are accumulated into one in-memory vector; the job is a bounded
/// batch, so this is acceptable at expected volumes.
pub async fn fetch_all_inventory(
    pool: &PgPool,
    page_size: i64,
) -> Result<Vec<InventoryRecord>, SourceError> {
    let mut cursor = PagedInventoryQuery::new(page_size);
    let mut records = Vec::new();
    let mut page_count = 0u32;

    while let Some(page) = cursor.next_page(pool).await? {
        page_count += 1;
        records.extend(page);
        info!(page = page_count, total_rows = records.len(), "inventory page read");
    }

    info!(rows = records.len(), pages = page_count, "inventory fetch complete");
    Ok(records)
}
