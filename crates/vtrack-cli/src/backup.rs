//! Backup command handlers.

use std::path::PathBuf;

use clap::Subcommand;
use vtrack_db::Store;

/// Sub-commands available under `backup`.
#[derive(Debug, Subcommand)]
pub enum BackupCommands {
    /// Snapshot the database now
    Create,
    /// List backups, newest first
    List,
    /// Replace the database with a backup
    Restore {
        /// Backup file to restore; a bare name from `backup list` is looked
        /// up in the backup directory
        path: PathBuf,
    },
}

/// # Errors
///
/// Returns an error if the backup directory cannot be read, the snapshot
/// cannot be written, or the restore fails.
pub(crate) async fn run_backup(store: &mut Store, command: BackupCommands) -> anyhow::Result<()> {
    match command {
        BackupCommands::Create => {
            let path = store.backup().await?;
            println!("backup written to {}", path.display());
        }
        BackupCommands::List => {
            let backups = store.list_backups().await?;
            if backups.is_empty() {
                println!(
                    "no backups found in {}; run `backup create` or ingest a snapshot first",
                    store.config().backup_dir.display()
                );
                return Ok(());
            }
            println!("{:<45}{:>12}", "FILE", "SIZE (KB)");
            for backup in &backups {
                println!("{:<45}{:>12}", backup.file_name, backup.size_bytes.div_ceil(1024));
            }
        }
        BackupCommands::Restore { path } => {
            // A bare file name refers to the backup directory.
            let path = if path.components().count() == 1 && !path.exists() {
                store.config().backup_dir.join(path)
            } else {
                path
            };
            store.restore(&path).await?;
            println!("database restored from {}", path.display());
        }
    }
    Ok(())
}
