use crate::Database;
use crate::models::{ItemCounts, ItemFilter, ItemRow, UserRow};
use anyhow::Result;
use rusqlite::{Connection, Row};

const ITEM_COLUMNS: &str = "i.id, i.body, i.done, i.author_id, u.username";

impl Database {
    // -- Users --

    /// Inserts a user and returns its id. A taken username fails the UNIQUE
    /// constraint; see [`crate::is_constraint_violation`].
    pub fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        locale: Option<&str>,
    ) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (username, password_hash, locale) VALUES (?1, ?2, ?3)",
                rusqlite::params![username, password_hash, locale],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, username, locale, password_hash FROM users WHERE username = ?1",
                [username],
                map_user,
            )
            .optional()
        })
    }

    pub fn get_user_by_id(&self, id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, username, locale, password_hash FROM users WHERE id = ?1",
                [id],
                map_user,
            )
            .optional()
        })
    }

    /// Removes a user; their items go with them through the foreign key.
    pub fn delete_user(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| Ok(conn.execute("DELETE FROM users WHERE id = ?1", [id])? > 0))
    }

    // -- Items --

    pub fn create_item(&self, author_id: i64, body: &str) -> Result<ItemRow> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO items (body, author_id) VALUES (?1, ?2)",
                rusqlite::params![body, author_id],
            )?;
            let id = conn.last_insert_rowid();
            query_item(conn, id)?.ok_or_else(|| anyhow::anyhow!("Item {} vanished after insert", id))
        })
    }

    pub fn get_item(&self, id: i64) -> Result<Option<ItemRow>> {
        self.with_conn(|conn| query_item(conn, id))
    }

    pub fn update_item_body(&self, id: i64, body: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let changed =
                conn.execute("UPDATE items SET body = ?1 WHERE id = ?2", rusqlite::params![body, id])?;
            Ok(changed > 0)
        })
    }

    /// Flips `done` in a single statement.
    /// Returns the new value, or `None` when the item does not exist.
    pub fn toggle_item(&self, id: i64) -> Result<Option<bool>> {
        self.with_conn(|conn| {
            conn.query_row(
                "UPDATE items SET done = NOT done WHERE id = ?1 RETURNING done",
                [id],
                |row| row.get(0),
            )
            .optional()
        })
    }

    pub fn delete_item(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| Ok(conn.execute("DELETE FROM items WHERE id = ?1", [id])? > 0))
    }

    /// Number of items of `author_id` matching `filter`.
    pub fn count_items(&self, author_id: i64, filter: ItemFilter) -> Result<i64> {
        self.with_conn(|conn| {
            let count = conn.query_row(
                "SELECT COUNT(*) FROM items WHERE author_id = ?1 AND (?2 IS NULL OR done = ?2)",
                rusqlite::params![author_id, filter.done()],
                |row| row.get(0),
            )?;
            Ok(count)
        })
    }

    /// One slice of `author_id`'s items, oldest first.
    pub fn list_items(
        &self,
        author_id: i64,
        filter: ItemFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ItemRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {ITEM_COLUMNS}
                 FROM items i
                 JOIN users u ON i.author_id = u.id
                 WHERE i.author_id = ?1 AND (?2 IS NULL OR i.done = ?2)
                 ORDER BY i.id ASC
                 LIMIT ?3 OFFSET ?4"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(
                    rusqlite::params![author_id, filter.done(), limit, offset],
                    map_item,
                )?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// All, active and completed counts in one pass.
    pub fn item_counts(&self, author_id: i64) -> Result<ItemCounts> {
        self.with_conn(|conn| {
            let counts = conn.query_row(
                "SELECT COUNT(*),
                        COALESCE(SUM(CASE WHEN done = 0 THEN 1 ELSE 0 END), 0),
                        COALESCE(SUM(CASE WHEN done = 1 THEN 1 ELSE 0 END), 0)
                 FROM items WHERE author_id = ?1",
                [author_id],
                |row| {
                    Ok(ItemCounts {
                        all: row.get(0)?,
                        active: row.get(1)?,
                        completed: row.get(2)?,
                    })
                },
            )?;
            Ok(counts)
        })
    }

    /// Deletes every completed item of `author_id`, returning how many went.
    pub fn delete_completed_items(&self, author_id: i64) -> Result<usize> {
        self.with_conn(|conn| {
            let deleted =
                conn.execute("DELETE FROM items WHERE author_id = ?1 AND done = 1", [author_id])?;
            Ok(deleted)
        })
    }
}

fn query_item(conn: &Connection, id: i64) -> Result<Option<ItemRow>> {
    let sql = format!(
        "SELECT {ITEM_COLUMNS} FROM items i JOIN users u ON i.author_id = u.id WHERE i.id = ?1"
    );
    conn.query_row(&sql, [id], map_item).optional()
}

fn map_user(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        locale: row.get(2)?,
        password_hash: row.get(3)?,
    })
}

fn map_item(row: &Row<'_>) -> rusqlite::Result<ItemRow> {
    Ok(ItemRow {
        id: row.get(0)?,
        body: row.get(1)?,
        done: row.get(2)?,
        author_id: row.get(3)?,
        author_username: row.get(4)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db_with_user(name: &str) -> (Database, i64) {
        let db = Database::open_in_memory().unwrap();
        let id = db.create_user(name, "hash", None).unwrap();
        (db, id)
    }

    #[test]
    fn user_lookup_by_name_and_id() {
        let (db, id) = db_with_user("grey");

        let by_name = db.get_user_by_username("grey").unwrap().unwrap();
        assert_eq!(by_name.id, id);
        assert_eq!(by_name.password_hash, "hash");

        assert!(db.get_user_by_id(id + 1).unwrap().is_none());
        assert!(db.get_user_by_username("nobody").unwrap().is_none());
    }

    #[test]
    fn duplicate_username_is_rejected() {
        let (db, _) = db_with_user("grey");
        let err = db.create_user("grey", "other", None).unwrap_err();
        assert!(crate::is_constraint_violation(&err));
    }

    #[test]
    fn other_failures_are_not_constraint_violations() {
        let db = Database::open_in_memory().unwrap();
        let err = db
            .with_conn(|conn| Ok(conn.execute("INSERT INTO nowhere VALUES (1)", [])?))
            .unwrap_err();
        assert!(!crate::is_constraint_violation(&err));
        assert!(!crate::is_constraint_violation(&anyhow::anyhow!("plain")));
    }

    #[test]
    fn created_item_carries_author_username() {
        let (db, id) = db_with_user("grey");
        let item = db.create_item(id, "buy milk").unwrap();

        assert_eq!(item.body, "buy milk");
        assert!(!item.done);
        assert_eq!(item.author_id, id);
        assert_eq!(item.author_username, "grey");
    }

    #[test]
    fn toggle_flips_and_reports_missing_items() {
        let (db, id) = db_with_user("grey");
        let item = db.create_item(id, "a").unwrap();

        assert_eq!(db.toggle_item(item.id).unwrap(), Some(true));
        assert_eq!(db.toggle_item(item.id).unwrap(), Some(false));
        assert_eq!(db.toggle_item(item.id + 100).unwrap(), None);
    }

    #[test]
    fn list_is_ordered_filtered_and_sliced() {
        let (db, id) = db_with_user("grey");
        let other = db.create_user("li", "hash", None).unwrap();
        for i in 0..5 {
            let item = db.create_item(id, &format!("item {i}")).unwrap();
            if i % 2 == 0 {
                db.toggle_item(item.id).unwrap();
            }
        }
        db.create_item(other, "not mine").unwrap();

        let all = db.list_items(id, ItemFilter::All, 10, 0).unwrap();
        let bodies: Vec<_> = all.iter().map(|i| i.body.as_str()).collect();
        assert_eq!(bodies, ["item 0", "item 1", "item 2", "item 3", "item 4"]);

        let slice = db.list_items(id, ItemFilter::All, 2, 2).unwrap();
        assert_eq!(slice[0].body, "item 2");
        assert_eq!(slice.len(), 2);

        assert_eq!(db.count_items(id, ItemFilter::Completed).unwrap(), 3);
        assert_eq!(db.count_items(id, ItemFilter::Active).unwrap(), 2);
        assert!(db.list_items(id, ItemFilter::Active, 10, 0).unwrap().iter().all(|i| !i.done));

        let counts = db.item_counts(id).unwrap();
        assert_eq!(counts, ItemCounts { all: 5, active: 2, completed: 3 });
    }

    #[test]
    fn counts_for_user_without_items_are_zero() {
        let (db, id) = db_with_user("grey");
        assert_eq!(db.item_counts(id).unwrap(), ItemCounts::default());
    }

    #[test]
    fn delete_completed_only_touches_own_done_items() {
        let (db, id) = db_with_user("grey");
        let other = db.create_user("li", "hash", None).unwrap();

        let done = db.create_item(id, "done").unwrap();
        db.toggle_item(done.id).unwrap();
        db.create_item(id, "open").unwrap();
        let theirs = db.create_item(other, "theirs").unwrap();
        db.toggle_item(theirs.id).unwrap();

        assert_eq!(db.delete_completed_items(id).unwrap(), 1);
        assert_eq!(db.item_counts(id).unwrap(), ItemCounts { all: 1, active: 1, completed: 0 });
        assert_eq!(db.count_items(other, ItemFilter::Completed).unwrap(), 1);
    }

    #[test]
    fn deleting_a_user_cascades_to_items() {
        let (db, id) = db_with_user("grey");
        let item = db.create_item(id, "a").unwrap();

        assert!(db.delete_user(id).unwrap());
        assert!(db.get_item(item.id).unwrap().is_none());
    }
}
