use rusqlite::{Connection, ErrorCode, OptionalExtension};

use crate::models::UserRow;
use crate::{Database, DbError, Result};

impl Database {
    // -- Users --

    pub fn create_user(
        &self,
        id: &str,
        username: &str,
        email: &str,
        password_hash: &str,
        salt: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, username, email, password_hash, salt) VALUES (?1, ?2, ?3, ?4, ?5)",
                (id, username, email, password_hash, salt),
            )
            .map_err(|e| match e {
                rusqlite::Error::SqliteFailure(ref err, _)
                    if err.code == ErrorCode::ConstraintViolation =>
                {
                    DbError::EmailTaken
                }
                other => DbError::Sqlite(other),
            })?;
            Ok(())
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_email(conn, email))
    }

    // -- Key-value --

    pub fn kv_get(&self, key: &str) -> Result<Option<String>> {
        self.with_conn(|conn| query_kv(conn, key))
    }

    #[cfg(test)]
    pub(crate) fn kv_put(&self, key: &str, value: &str) -> Result<()> {
        self.with_conn(|conn| upsert_kv(conn, key, value))
    }

    /// Read-modify-write of a single key inside one transaction.
    ///
    /// `f` receives the current value (if any) and returns the value to
    /// store. Holding the connection lock for the whole cycle means two
    /// concurrent updates of the same key apply one after the other.
    pub fn kv_update<F>(&self, key: &str, f: F) -> Result<()>
    where
        F: FnOnce(Option<String>) -> Result<String>,
    {
        self.with_conn(|conn| {
            let tx = conn.unchecked_transaction()?;
            let current = query_kv(&tx, key)?;
            let next = f(current)?;
            upsert_kv(&tx, key, &next)?;
            tx.commit()?;
            Ok(())
        })
    }
}

fn query_user_by_email(conn: &Connection, email: &str) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, username, email, password_hash, salt, created_at FROM users WHERE email = ?1",
    )?;

    let row = stmt
        .query_row([email], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                username: row.get(1)?,
                email: row.get(2)?,
                password_hash: row.get(3)?,
                salt: row.get(4)?,
                created_at: row.get(5)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn query_kv(conn: &Connection, key: &str) -> Result<Option<String>> {
    let value = conn
        .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get(0))
        .optional()?;
    Ok(value)
}

fn upsert_kv(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO kv (key, value) VALUES (?1, ?2)
         ON CONFLICT (key) DO UPDATE SET value = excluded.value, updated_at = datetime('now')",
        (key, value),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_and_fetch_user() {
        let db = Database::open_in_memory().unwrap();
        db.create_user("u1", "alice", "a@x.com", "hash", "salt").unwrap();

        let user = db.get_user_by_email("a@x.com").unwrap().unwrap();
        assert_eq!(user.id, "u1");
        assert_eq!(user.username, "alice");
        assert_eq!(user.password_hash, "hash");
        assert_eq!(user.salt, "salt");

        assert!(db.get_user_by_email("nobody@x.com").unwrap().is_none());
    }

    #[test]
    fn duplicate_email_is_reported() {
        let db = Database::open_in_memory().unwrap();
        db.create_user("u1", "alice", "a@x.com", "h", "s").unwrap();
        let err = db.create_user("u2", "alice2", "a@x.com", "h", "s").unwrap_err();
        assert!(matches!(err, DbError::EmailTaken));
    }

    #[test]
    fn kv_put_overwrites() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.kv_get("k").unwrap(), None);

        db.kv_put("k", "one").unwrap();
        db.kv_put("k", "two").unwrap();
        assert_eq!(db.kv_get("k").unwrap().as_deref(), Some("two"));
    }

    #[test]
    fn kv_update_sees_current_value() {
        let db = Database::open_in_memory().unwrap();
        db.kv_update("n", |cur| {
            assert!(cur.is_none());
            Ok("1".into())
        })
        .unwrap();
        db.kv_update("n", |cur| {
            let n: i32 = cur.unwrap().parse().unwrap();
            Ok((n + 1).to_string())
        })
        .unwrap();
        assert_eq!(db.kv_get("n").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn failed_update_leaves_value_untouched() {
        let db = Database::open_in_memory().unwrap();
        db.kv_put("k", "keep").unwrap();

        let result = db.kv_update("k", |_| Err(DbError::LockPoisoned("boom".into())));
        assert!(result.is_err());
        assert_eq!(db.kv_get("k").unwrap().as_deref(), Some("keep"));
    }
}
