use crate::error::StoreError;

/// Minimal key-value contract the slot cache persists through.
///
/// Every backend enforces a single global byte ceiling shared by all keys and
/// reports overflow as [`StoreError::Capacity`]. Writes are all-or-nothing: a
/// failed write leaves the previous value for that key untouched.
pub trait DurableStore: Send + Sync {
    /// Returns the serialized bytes stored at `key`, if any.
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Replaces the value at `key` with `bytes`.
    fn write(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError>;

    /// Removes `key`. Removing an absent key is not an error.
    fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Lists every stored key.
    fn keys(&self) -> Vec<String>;

    /// Bytes currently in use.
    fn usage(&self) -> usize;

    /// Global ceiling in bytes.
    fn capacity(&self) -> usize;

    /// Whether `key` has a stored value. Backends with an index should
    /// answer without reading the value.
    fn contains(&self, key: &str) -> bool {
        matches!(self.read(key), Ok(Some(_)))
    }

    /// Longest key in bytes this backend can address, if it has a limit.
    fn max_key_len(&self) -> Option<usize> {
        None
    }
}

/// Checks whether replacing a value of `old_len` bytes with `new_len` bytes
/// keeps usage within `capacity`.
pub(crate) fn check_capacity(
    key: &str,
    used: usize,
    old_len: usize,
    new_len: usize,
    capacity: usize,
) -> Result<(), StoreError> {
    let available = capacity.saturating_sub(used - old_len);
    if new_len > available {
        return Err(StoreError::Capacity {
            key: key.to_string(),
            required: new_len,
            available,
        });
    }
    Ok(())
}
