//! Process-wide memoization of the two record collections.
//!
//! Each entity kind has one slot: the first access performs the full
//! synchronous load and every later access returns the same `Arc` without
//! touching the file system. `OnceLock::get_or_init` blocks concurrent
//! first callers behind the one doing the load, so a slot is only ever
//! observed empty or fully populated, never half-loaded.

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use anyhow::{anyhow, Result};

use crate::loader::load_records;
use crate::schema::{Order, User};

// OnceLock wants the stored value to be constructible in one shot and
// anyhow::Error is not Clone, so a failed load is kept as its rendered
// message. The failure is memoized like a success: fatal at first access,
// re-reported verbatim on every later access, never retried.
type Slot<T> = OnceLock<Result<Arc<Vec<T>>, String>>;

pub struct DataStore {
    users_path: PathBuf,
    orders_path: PathBuf,
    users: Slot<User>,
    orders: Slot<Order>,
}

impl DataStore {
    pub fn new(users_path: impl Into<PathBuf>, orders_path: impl Into<PathBuf>) -> Self {
        Self {
            users_path: users_path.into(),
            orders_path: orders_path.into(),
            users: OnceLock::new(),
            orders: OnceLock::new(),
        }
    }

    pub fn users(&self) -> Result<Arc<Vec<User>>> {
        Self::get_or_load(&self.users, &self.users_path, User::from_row)
    }

    pub fn orders(&self) -> Result<Arc<Vec<Order>>> {
        Self::get_or_load(&self.orders, &self.orders_path, Order::from_row)
    }

    fn get_or_load<T>(
        slot: &Slot<T>,
        path: &Path,
        project: impl Fn(&[String]) -> T,
    ) -> Result<Arc<Vec<T>>> {
        let loaded = slot.get_or_init(|| {
            load_records(path, project)
                .map(Arc::new)
                .map_err(|e| format!("{e:#}"))
        });

        match loaded {
            Ok(records) => Ok(Arc::clone(records)),
            Err(message) => Err(anyhow!("{message}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const USERS_HEADER: &str = "id,first_name,last_name,email,age,gender,c6,c7,c8,c9,country,c11,c12,traffic_source,created_at";

    fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    fn user_row(id: u32) -> String {
        format!("{id},A,B,a@b.c,30,F,,,,,Japan,,,Search,2023-05-01")
    }

    #[test]
    fn test_load_is_memoized() {
        let dir = tempfile::tempdir().unwrap();
        let users = write_file(
            &dir,
            "users.csv",
            &format!("{USERS_HEADER}\n{}\n", user_row(1)),
        );
        let orders = write_file(&dir, "orders.csv", "h\n1,1,Complete,F,2023-01-01,,,,2\n");
        let store = DataStore::new(&users, orders);

        let first = store.users().unwrap();
        assert_eq!(first.len(), 1);

        // Removing the file proves the second access never re-reads it.
        std::fs::remove_file(&users).unwrap();
        let second = store.users().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_missing_file_fails_on_every_access() {
        let dir = tempfile::tempdir().unwrap();
        let store = DataStore::new(dir.path().join("nope.csv"), dir.path().join("also_nope.csv"));

        assert!(store.users().is_err());
        // The memoized failure is reported again, not retried.
        let err = store.users().unwrap_err();
        assert!(format!("{err:#}").contains("nope.csv"));
    }

    #[test]
    fn test_failure_is_not_retried_after_file_appears() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("late.csv");
        let store = DataStore::new(&path, dir.path().join("orders.csv"));

        assert!(store.users().is_err());
        write_file(&dir, "late.csv", &format!("{USERS_HEADER}\n{}\n", user_row(1)));
        assert!(store.users().is_err());
    }

    #[test]
    fn test_concurrent_first_access_is_single_flight() {
        let dir = tempfile::tempdir().unwrap();
        let rows: String = (1..=50).map(|i| user_row(i) + "\n").collect();
        let users = write_file(&dir, "users.csv", &format!("{USERS_HEADER}\n{rows}"));
        let orders = write_file(&dir, "orders.csv", "h\n");
        let store = Arc::new(DataStore::new(&users, &orders));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || store.users().unwrap())
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for result in &results[1..] {
            assert!(Arc::ptr_eq(&results[0], result));
        }
        assert_eq!(results[0].len(), 50);
    }

    #[test]
    fn test_orders_slot_is_independent() {
        let dir = tempfile::tempdir().unwrap();
        let users = dir.path().join("missing_users.csv");
        let orders = write_file(&dir, "orders.csv", "h\n1,1,Complete,F,2023-01-01,,,,2\n");
        let store = DataStore::new(&users, &orders);

        assert!(store.users().is_err());
        let orders = store.orders().unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].status, "Complete");
    }
}
