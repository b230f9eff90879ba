//! Session repository implementation

use crate::error::{Error, Result};
use crate::models::Session;
use libsql::Connection;

const KEY_USER_ID: &str = "user_id";
const KEY_USER_NAME: &str = "user_name";
const KEY_LOGGED_IN: &str = "logged_in";
const KEY_LAST_USER_ID: &str = "last_user_id";

/// Trait for session storage operations (async)
#[allow(async_fn_in_trait)]
pub trait SessionStore {
    /// Load the session; missing keys read as logged out
    async fn load(&self) -> Result<Session>;

    /// Remember a successful login
    async fn save_login(&self, user_id: i64, user_name: &str) -> Result<()>;

    /// Forget the current user but keep `last_user_id`
    async fn clear(&self) -> Result<()>;
}

/// libSQL implementation of `SessionStore`
pub struct LibSqlSessionStore<'a> {
    conn: &'a Connection,
}

impl<'a> LibSqlSessionStore<'a> {
    /// Create a new store with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl SessionStore for LibSqlSessionStore<'_> {
    async fn load(&self) -> Result<Session> {
        let mut session = Session::default();

        if let Ok(value) = self.get_value(KEY_USER_ID).await {
            session.user_id = value.parse().ok();
        }

        if let Ok(value) = self.get_value(KEY_USER_NAME).await {
            session.user_name = Some(value);
        }

        if let Ok(value) = self.get_value(KEY_LOGGED_IN).await {
            session.logged_in = matches!(
                value.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }

        if let Ok(value) = self.get_value(KEY_LAST_USER_ID).await {
            session.last_user_id = value.parse().ok();
        }

        Ok(session)
    }

    async fn save_login(&self, user_id: i64, user_name: &str) -> Result<()> {
        let user_id = user_id.to_string();
        self.set_value(KEY_USER_ID, &user_id).await?;
        self.set_value(KEY_USER_NAME, user_name).await?;
        self.set_value(KEY_LOGGED_IN, "true").await?;
        self.set_value(KEY_LAST_USER_ID, &user_id).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        for key in [KEY_USER_ID, KEY_USER_NAME] {
            self.conn
                .execute("DELETE FROM session WHERE key = ?", [key])
                .await?;
        }
        self.set_value(KEY_LOGGED_IN, "false").await
    }
}

impl LibSqlSessionStore<'_> {
    async fn get_value(&self, key: &str) -> Result<String> {
        let mut rows = self
            .conn
            .query("SELECT value FROM session WHERE key = ?", [key])
            .await?;

        if let Some(row) = rows.next().await? {
            let value: String = row.get(0)?;
            Ok(value)
        } else {
            Err(Error::NotFound(key.to_string()))
        }
    }

    async fn set_value(&self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO session (key, value) VALUES (?, ?)",
                [key, value],
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use pretty_assertions::assert_eq;

    async fn setup() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_load_default_session() {
        let db = setup().await;
        let store = LibSqlSessionStore::new(db.connection());

        assert_eq!(store.load().await.unwrap(), Session::default());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_save_login_and_load() {
        let db = setup().await;
        let store = LibSqlSessionStore::new(db.connection());

        store.save_login(42, "Ana").await.unwrap();

        let session = store.load().await.unwrap();
        assert_eq!(
            session,
            Session {
                user_id: Some(42),
                user_name: Some("Ana".to_string()),
                logged_in: true,
                last_user_id: Some(42),
            }
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_clear_keeps_last_user() {
        let db = setup().await;
        let store = LibSqlSessionStore::new(db.connection());

        store.save_login(42, "Ana").await.unwrap();
        store.clear().await.unwrap();

        let session = store.load().await.unwrap();
        assert!(!session.logged_in);
        assert_eq!(session.user_id, None);
        assert_eq!(session.user_name, None);
        assert_eq!(session.last_user_id, Some(42));
    }
}
