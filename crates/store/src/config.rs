/// Configuration for the embedded SQLite-backed store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Filesystem path to the SQLite database file (e.g. `./data/edon.db`).
    /// `:memory:` is accepted for tests.
    pub database_path: String,

    /// Maximum number of connections in the `sqlx` connection pool.
    pub pool_size: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: String::from("edon.db"),
            pool_size: 5,
        }
    }
}

impl StoreConfig {
    /// Build the `sqlx` connection string, enabling create-if-missing for
    /// on-disk databases.
    #[must_use]
    pub fn connect_string(&self) -> String {
        if self.database_path == ":memory:" {
            "sqlite::memory:".to_owned()
        } else {
            format!("sqlite://{}?mode=rwc", self.database_path)
        }
    }
}
