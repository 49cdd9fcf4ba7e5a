use anyhow::Result;
use shared::ChangeEvent;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex, MutexGuard};
use tracing::info;

use super::budget_repository::BudgetRepository;
use super::expense_repository::ExpenseRepository;
use crate::storage::change_feed::ChangeFeed;
use crate::storage::traits::Connection;

const EXPENSES_FILE: &str = "expenses.csv";
const BUDGETS_FILE: &str = "budgets.yaml";

/// CsvConnection owns the data directory, serializes writes and publishes
/// change events for every committed write.
#[derive(Clone)]
pub struct CsvConnection {
    base_directory: PathBuf,
    write_lock: Arc<Mutex<()>>,
    change_feed: ChangeFeed,
}

impl CsvConnection {
    /// Create a new CSV connection with a base directory
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path)?;
            info!("Created data directory: {}", base_path.display());
        }

        Ok(Self {
            base_directory: base_path,
            write_lock: Arc::new(Mutex::new(())),
            change_feed: ChangeFeed::new(),
        })
    }

    pub fn expenses_file_path(&self) -> PathBuf {
        self.base_directory.join(EXPENSES_FILE)
    }

    pub fn budgets_file_path(&self) -> PathBuf {
        self.base_directory.join(BUDGETS_FILE)
    }

    /// Held for the whole read-modify-write cycle of a repository
    pub async fn lock_for_write(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().await
    }

    pub fn change_feed(&self) -> &ChangeFeed {
        &self.change_feed
    }
}

impl Connection for CsvConnection {
    type ExpenseRepository = ExpenseRepository;
    type BudgetRepository = BudgetRepository;

    fn create_expense_repository(&self) -> Self::ExpenseRepository {
        ExpenseRepository::new(self.clone())
    }

    fn create_budget_repository(&self) -> Self::BudgetRepository {
        BudgetRepository::new(self.clone())
    }

    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.change_feed.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_new_creates_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a").join("b");

        let connection = CsvConnection::new(&nested).unwrap();

        assert!(nested.exists());
        assert_eq!(connection.expenses_file_path(), nested.join("expenses.csv"));
        assert_eq!(connection.budgets_file_path(), nested.join("budgets.yaml"));
    }

    #[test]
    fn test_clones_share_change_feed() {
        let temp_dir = TempDir::new().unwrap();
        let connection = CsvConnection::new(temp_dir.path()).unwrap();
        let _receiver = connection.clone().subscribe();

        assert_eq!(connection.change_feed().subscriber_count(), 1);
    }
}
