//! Category resolution with create-if-missing semantics.
//!
//! # Responsibility
//! - Map a category name to its stable id, inserting the row on first use.
//! - Recover from the concurrent-create race without duplicate rows.
//!
//! # Invariants
//! - Functions take `&Connection` so they run inside the caller's
//!   transaction (`&Transaction` derefs to `&Connection`).
//! - A uniqueness violation on insert is never surfaced; the winning row
//!   is re-read instead.
//! - Names are matched exactly (case-sensitive, untrimmed).

use crate::db::is_constraint_violation;
use crate::model::category::{Category, CategoryId};
use crate::repo::item_repo::{RepoError, RepoResult};
use log::debug;
use rusqlite::{Connection, OptionalExtension};

/// Returns the id of category `name`, creating it when absent.
///
/// # Errors
/// - `RepoError::Db` for any storage failure other than the create race.
/// - `RepoError::InvalidData` if the row vanished between the failed
///   insert and the re-read.
pub fn resolve_or_create_category(conn: &Connection, name: &str) -> RepoResult<CategoryId> {
    if let Some(id) = find_category_id(conn, name)? {
        return Ok(id);
    }
    create_or_reread(conn, name)
}

/// Looks up one category by exact name.
pub fn find_category_by_name(conn: &Connection, name: &str) -> RepoResult<Option<Category>> {
    let category = conn
        .query_row(
            "SELECT id, name FROM categories WHERE name = ?1;",
            [name],
            |row| {
                Ok(Category {
                    id: row.get("id")?,
                    name: row.get("name")?,
                })
            },
        )
        .optional()?;
    Ok(category)
}

/// Lists all categories in creation order.
pub fn list_categories(conn: &Connection) -> RepoResult<Vec<Category>> {
    let mut stmt = conn.prepare("SELECT id, name FROM categories ORDER BY id ASC;")?;
    let mut rows = stmt.query([])?;
    let mut categories = Vec::new();
    while let Some(row) = rows.next()? {
        categories.push(Category {
            id: row.get("id")?,
            name: row.get("name")?,
        });
    }
    Ok(categories)
}

fn find_category_id(conn: &Connection, name: &str) -> RepoResult<Option<CategoryId>> {
    let id = conn
        .query_row(
            "SELECT id FROM categories WHERE name = ?1;",
            [name],
            |row| row.get(0),
        )
        .optional()?;
    Ok(id)
}

fn create_or_reread(conn: &Connection, name: &str) -> RepoResult<CategoryId> {
    match conn.execute("INSERT INTO categories (name) VALUES (?1);", [name]) {
        Ok(_) => Ok(conn.last_insert_rowid()),
        Err(err) if is_constraint_violation(&err) => {
            debug!("event=category_resolve module=repo status=race_recovered");
            find_category_id(conn, name)?.ok_or_else(|| {
                RepoError::InvalidData(format!(
                    "category `{name}` reported as duplicate but not found on re-read"
                ))
            })
        }
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        create_or_reread, find_category_by_name, list_categories, resolve_or_create_category,
    };
    use crate::db::open_db_in_memory;

    #[test]
    fn resolve_twice_returns_same_id_and_one_row() {
        let conn = open_db_in_memory().unwrap();

        let first = resolve_or_create_category(&conn, "fashion").unwrap();
        let second = resolve_or_create_category(&conn, "fashion").unwrap();
        assert_eq!(first, second);

        let rows: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM categories WHERE name = 'fashion';",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn lost_create_race_rereads_existing_row() {
        let conn = open_db_in_memory().unwrap();
        conn.execute("INSERT INTO categories (name) VALUES ('fashion');", [])
            .unwrap();
        let winner = conn.last_insert_rowid();

        // Same state a caller sees when its lookup missed and a concurrent
        // writer committed the row before this insert.
        let resolved = create_or_reread(&conn, "fashion").unwrap();
        assert_eq!(resolved, winner);
    }

    #[test]
    fn race_recovery_keeps_enclosing_transaction_usable() {
        let mut conn = open_db_in_memory().unwrap();
        conn.execute("INSERT INTO categories (name) VALUES ('fashion');", [])
            .unwrap();

        let tx = conn.transaction().unwrap();
        create_or_reread(&tx, "fashion").unwrap();
        let books = resolve_or_create_category(&tx, "books").unwrap();
        tx.commit().unwrap();

        let found = find_category_by_name(&conn, "books").unwrap().unwrap();
        assert_eq!(found.id, books);
    }

    #[test]
    fn names_match_exactly() {
        let conn = open_db_in_memory().unwrap();
        let lower = resolve_or_create_category(&conn, "fashion").unwrap();
        let upper = resolve_or_create_category(&conn, "Fashion").unwrap();
        assert_ne!(lower, upper);

        let names = list_categories(&conn)
            .unwrap()
            .into_iter()
            .map(|category| category.name)
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["fashion".to_string(), "Fashion".to_string()]);
    }

    #[test]
    fn find_missing_category_returns_none() {
        let conn = open_db_in_memory().unwrap();
        assert!(find_category_by_name(&conn, "absent").unwrap().is_none());
    }
}
