//! SQLite connection pool shared by the web server and the worker.

use std::time::Duration;

use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PoolError, PooledConnection};
use diesel::sqlite::SqliteConnection;

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;
pub type DbConnection = PooledConnection<ConnectionManager<SqliteConnection>>;

/// Pragmas applied to every connection handed out by the pool.
#[derive(Debug, Clone)]
pub struct ConnectionOptions {
    pub enable_wal: bool,
    /// Tenant cleanup relies on `ON DELETE CASCADE`, which SQLite only honours with this on.
    pub enable_foreign_keys: bool,
    pub busy_timeout: Option<Duration>,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            enable_wal: true,
            enable_foreign_keys: true,
            busy_timeout: Some(Duration::from_secs(30)),
        }
    }
}

impl ConnectionOptions {
    fn pragmas(&self) -> String {
        let mut sql = String::new();
        if self.enable_wal {
            sql.push_str("PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL; ");
        }
        if self.enable_foreign_keys {
            sql.push_str("PRAGMA foreign_keys = ON; ");
        }
        if let Some(timeout) = self.busy_timeout {
            sql.push_str(&format!("PRAGMA busy_timeout = {};", timeout.as_millis()));
        }
        sql
    }
}

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        let pragmas = self.pragmas();
        if pragmas.is_empty() {
            return Ok(());
        }
        conn.batch_execute(&pragmas)
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Builds a pool for `database_url` with [`ConnectionOptions::default`].
pub fn establish_connection_pool(database_url: &str) -> Result<DbPool, PoolError> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    Pool::builder()
        .connection_customizer(Box::new(ConnectionOptions::default()))
        .build(manager)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pragmas_follow_options() {
        let options = ConnectionOptions {
            enable_wal: false,
            enable_foreign_keys: true,
            busy_timeout: Some(Duration::from_millis(250)),
        };
        assert_eq!(
            options.pragmas(),
            "PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 250;"
        );

        let none = ConnectionOptions {
            enable_wal: false,
            enable_foreign_keys: false,
            busy_timeout: None,
        };
        assert!(none.pragmas().is_empty());
    }
}
