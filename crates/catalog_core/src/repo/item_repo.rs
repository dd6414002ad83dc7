//! Item repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Create items atomically together with their category.
//! - Materialize by-id, list and search projections.
//! - Keep SQL details inside core persistence boundary.
//!
//! # Invariants
//! - Write paths call `NewItem::validate()` before SQL mutations.
//! - `create_item` resolves the category and inserts the item in one
//!   IMMEDIATE transaction; any failure rolls the whole unit back.
//! - Read paths reject invalid persisted state instead of masking it.
//! - List/search return rows in ascending id (insertion) order.
//! - Search is an ASCII case-insensitive substring match.

use crate::blob::is_content_address;
use crate::db::{DbError, DbPool};
use crate::model::category::Category;
use crate::model::item::{Item, ItemId, ItemSummary, ItemValidationError, NewItem};
use crate::repo::category_registry::{list_categories, resolve_or_create_category};
use log::error;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

const ITEM_DETAIL_SQL: &str = "SELECT
    items.id AS id,
    items.name AS name,
    categories.name AS category,
    items.image_name AS image_name
FROM items
INNER JOIN categories ON categories.id = items.category_id";

const ITEM_SUMMARY_SQL: &str = "SELECT
    items.name AS name,
    categories.name AS category
FROM items
INNER JOIN categories ON categories.id = items.category_id";

const LIKE_ESCAPE: char = '\\';

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for catalog persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ItemValidationError),
    Db(DbError),
    NotFound(ItemId),
    InvalidData(String),
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "item not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted item data: {message}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` is missing; run migrations first")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) | Self::MissingRequiredTable(_) => None,
        }
    }
}

impl From<ItemValidationError> for RepoError {
    fn from(value: ItemValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<r2d2::Error> for RepoError {
    fn from(value: r2d2::Error) -> Self {
        Self::Db(DbError::Pool(value))
    }
}

/// Repository interface for item persistence and queries.
pub trait ItemRepository {
    /// Creates one item, creating its category on first use.
    fn create_item(&self, item: &NewItem) -> RepoResult<ItemId>;
    /// Gets one item joined with its category name.
    fn get_item(&self, id: ItemId) -> RepoResult<Item>;
    /// Lists every item.
    fn list_items(&self) -> RepoResult<Vec<ItemSummary>>;
    /// Lists items whose name contains `keyword`.
    fn search_items(&self, keyword: &str) -> RepoResult<Vec<ItemSummary>>;
    /// Lists every known category.
    fn list_categories(&self) -> RepoResult<Vec<Category>>;
}

impl<R: ItemRepository + ?Sized> ItemRepository for &R {
    fn create_item(&self, item: &NewItem) -> RepoResult<ItemId> {
        (**self).create_item(item)
    }

    fn get_item(&self, id: ItemId) -> RepoResult<Item> {
        (**self).get_item(id)
    }

    fn list_items(&self) -> RepoResult<Vec<ItemSummary>> {
        (**self).list_items()
    }

    fn search_items(&self, keyword: &str) -> RepoResult<Vec<ItemSummary>> {
        (**self).search_items(keyword)
    }

    fn list_categories(&self) -> RepoResult<Vec<Category>> {
        (**self).list_categories()
    }
}

impl<R: ItemRepository + ?Sized> ItemRepository for Arc<R> {
    fn create_item(&self, item: &NewItem) -> RepoResult<ItemId> {
        (**self).create_item(item)
    }

    fn get_item(&self, id: ItemId) -> RepoResult<Item> {
        (**self).get_item(id)
    }

    fn list_items(&self) -> RepoResult<Vec<ItemSummary>> {
        (**self).list_items()
    }

    fn search_items(&self, keyword: &str) -> RepoResult<Vec<ItemSummary>> {
        (**self).search_items(keyword)
    }

    fn list_categories(&self) -> RepoResult<Vec<Category>> {
        (**self).list_categories()
    }
}

/// SQLite-backed item repository over a shared connection pool.
///
/// Each call checks out its own connection, so concurrent callers never
/// share a transaction.
#[derive(Clone)]
pub struct SqliteItemRepository {
    pool: DbPool,
}

impl SqliteItemRepository {
    /// Constructs a repository from a migrated pool.
    ///
    /// # Errors
    /// - `MissingRequiredTable` when the schema has not been applied.
    pub fn try_new(pool: DbPool) -> RepoResult<Self> {
        {
            let conn = pool.get()?;
            for table in ["categories", "items"] {
                if !table_exists(&conn, table)? {
                    return Err(RepoError::MissingRequiredTable(table));
                }
            }
        }
        Ok(Self { pool })
    }

    fn query_summaries(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> RepoResult<Vec<ItemSummary>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(ItemSummary {
                name: row.get("name")?,
                category: row.get("category")?,
            });
        }
        Ok(items)
    }
}

impl ItemRepository for SqliteItemRepository {
    fn create_item(&self, item: &NewItem) -> RepoResult<ItemId> {
        item.validate()?;

        let mut conn = self.pool.get()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        match insert_item(&tx, item) {
            Ok(id) => {
                tx.commit()?;
                Ok(id)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback() {
                    error!(
                        "event=item_create module=repo status=error error_code=rollback_failed error={}",
                        rollback_err
                    );
                }
                Err(err)
            }
        }
    }

    fn get_item(&self, id: ItemId) -> RepoResult<Item> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!("{ITEM_DETAIL_SQL} WHERE items.id = ?1;"))?;
        let item = stmt
            .query_row([id], |row| Ok(parse_item_row(row)))
            .optional()?;

        match item {
            Some(parsed) => parsed,
            None => Err(RepoError::NotFound(id)),
        }
    }

    fn list_items(&self) -> RepoResult<Vec<ItemSummary>> {
        self.query_summaries(&format!("{ITEM_SUMMARY_SQL} ORDER BY items.id ASC;"), [])
    }

    fn search_items(&self, keyword: &str) -> RepoResult<Vec<ItemSummary>> {
        self.query_summaries(
            &format!(
                "{ITEM_SUMMARY_SQL}
                 WHERE items.name LIKE ?1 ESCAPE '{LIKE_ESCAPE}'
                 ORDER BY items.id ASC;"
            ),
            [contains_pattern(keyword)],
        )
    }

    fn list_categories(&self) -> RepoResult<Vec<Category>> {
        let conn = self.pool.get()?;
        list_categories(&conn)
    }
}

fn insert_item(conn: &Connection, item: &NewItem) -> RepoResult<ItemId> {
    let category_id = resolve_or_create_category(conn, item.category.as_str())?;
    conn.execute(
        "INSERT INTO items (name, image_name, category_id) VALUES (?1, ?2, ?3);",
        params![item.name.as_str(), item.image_ref.as_deref(), category_id],
    )?;
    Ok(conn.last_insert_rowid())
}

fn parse_item_row(row: &Row<'_>) -> RepoResult<Item> {
    let image_ref: Option<String> = row.get("image_name")?;
    if let Some(value) = image_ref.as_deref() {
        if !is_content_address(value) {
            return Err(RepoError::InvalidData(format!(
                "invalid image reference `{value}` in items.image_name"
            )));
        }
    }

    Ok(Item {
        id: row.get("id")?,
        name: row.get("name")?,
        category: row.get("category")?,
        image_ref,
    })
}

/// Builds a `LIKE` pattern matching any value that contains `keyword`.
fn contains_pattern(keyword: &str) -> String {
    let mut pattern = String::with_capacity(keyword.len() + 2);
    pattern.push('%');
    for ch in keyword.chars() {
        if matches!(ch, '%' | '_') || ch == LIKE_ESCAPE {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
