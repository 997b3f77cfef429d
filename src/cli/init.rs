use std::fs;
use std::path::Path;

use anyhow::bail;

use crate::config::DB_FILE_NAME;
use crate::store::{SqliteStore, Store};

/// Creates the data directory and an empty database.
pub fn run_init(data_dir: &Path) -> anyhow::Result<()> {
    fs::create_dir_all(data_dir)?;

    let db_path = data_dir.join(DB_FILE_NAME);
    if db_path.exists() {
        bail!("Already initialized. Database exists at: {}", db_path.display());
    }

    let store = SqliteStore::new(&db_path)?;
    store.initialize()?;

    tracing::info!("created database at {}", db_path.display());
    println!("Initialized habitual database at {}", db_path.display());

    Ok(())
}
