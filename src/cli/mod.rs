mod init;
mod report;

pub use init::run_init;
pub use report::{run_progress, run_today};

use std::path::Path;

use crate::config::DB_FILE_NAME;
use crate::store::SqliteStore;

/// Initialize store from data directory, checking it exists
pub fn init_store(data_dir: &Path) -> anyhow::Result<SqliteStore> {
    let db_path = data_dir.join(DB_FILE_NAME);

    if !db_path.exists() {
        anyhow::bail!(
            "Database not found at {}. Run 'habitual init' first.",
            db_path.display()
        );
    }

    SqliteStore::new(&db_path).map_err(Into::into)
}
