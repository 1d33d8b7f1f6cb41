//! Shared database handle.

use std::fmt;
use std::sync::Arc;

use quarry_db::Database;
use tokio::sync::{Mutex, MutexGuard};

/// A cloneable handle to one [`Database`], shared by every record that
/// uses it.
///
/// Each Active Record operation locks the database for its whole
/// statement-and-fetch sequence.
#[derive(Clone)]
pub struct Db(Arc<Mutex<Database>>);

impl Db {
    /// Wraps a database.
    #[must_use]
    pub fn new(database: Database) -> Self {
        Self(Arc::new(Mutex::new(database)))
    }

    /// Locks the database.
    pub async fn lock(&self) -> MutexGuard<'_, Database> {
        self.0.lock().await
    }
}

impl From<Database> for Db {
    fn from(database: Database) -> Self {
        Self::new(database)
    }
}

impl PartialEq for Db {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Db {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Db(..)")
    }
}
