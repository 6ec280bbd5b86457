#![allow(dead_code)]

use std::path::PathBuf;

use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tempfile::TempDir;

use outreach_crm::auth::AuthenticatedUser;
use outreach_crm::db::{DbPool, establish_connection_pool};
use outreach_crm::repository::DieselRepository;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Migrated SQLite database removed together with its temporary directory.
pub struct TestDb {
    _dir: TempDir,
    path: PathBuf,
    pool: DbPool,
}

impl TestDb {
    pub fn new(name: &str) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join(name);
        let pool = establish_connection_pool(path.to_str().expect("Non UTF-8 temp path"))
            .expect("Failed to build connection pool");

        let mut conn = pool.get().expect("Failed to get connection");
        conn.run_pending_migrations(MIGRATIONS)
            .expect("Failed to run migrations");

        Self {
            _dir: dir,
            path,
            pool,
        }
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }

    pub fn repo(&self) -> DieselRepository {
        DieselRepository::new(self.pool())
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

/// Signed-in user without an organization yet.
pub fn user(sub: &str, email: &str) -> AuthenticatedUser {
    let mut user = AuthenticatedUser {
        sub: sub.to_string(),
        email: email.to_string(),
        name: String::new(),
        organization_id: None,
        role: None,
        branding: None,
        exp: 0,
    };
    user.set_expiration(1);
    user
}
