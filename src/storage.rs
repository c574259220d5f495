use crate::errors::Result;

pub mod sqlite;

/// Trait hiding where the local key/value data lives
///
/// Everything the client remembers between runs (cached sheets, carts,
/// customer details) goes through this, so tests can run on the in-memory
/// mock and the binary on SQLite.
pub trait Storage {
    /// Value stored under `key`, if any
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Forget `key`. Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<()>;
}

impl<S: Storage + ?Sized> Storage for &mut S {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

pub mod mock {

    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    pub struct MemoryStorage(HashMap<String, String>);

    impl MemoryStorage {
        pub fn new() -> Self {
            MemoryStorage(HashMap::new())
        }

        pub fn len(&self) -> usize {
            self.0.len()
        }

        pub fn is_empty(&self) -> bool {
            self.0.is_empty()
        }
    }

    impl Storage for MemoryStorage {
        fn get(&self, key: &str) -> Result<Option<String>> {
            Ok(self.0.get(key).cloned())
        }

        fn set(&mut self, key: &str, value: &str) -> Result<()> {
            self.0.insert(key.to_string(), value.to_string());
            Ok(())
        }

        fn remove(&mut self, key: &str) -> Result<()> {
            self.0.remove(key);
            Ok(())
        }
    }

    #[cfg(test)]
    mod test {
        use super::*;

        #[test]
        fn test_memory_storage() {
            let mut storage = MemoryStorage::new();
            assert_eq!(storage.get("restaurants").unwrap(), None);

            storage.set("restaurants", "[]").unwrap();
            storage.set("customerName", "Ada").unwrap();
            assert_eq!(storage.get("restaurants").unwrap().as_deref(), Some("[]"));

            storage.set("restaurants", "[1]").unwrap();
            assert_eq!(storage.get("restaurants").unwrap().as_deref(), Some("[1]"));
            assert_eq!(storage.len(), 2);

            storage.remove("restaurants").unwrap();
            storage.remove("restaurants").unwrap();
            assert_eq!(storage.get("restaurants").unwrap(), None);
            assert_eq!(storage.len(), 1);
        }
    }
}
