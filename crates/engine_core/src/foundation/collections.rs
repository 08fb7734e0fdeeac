//! Specialized collection types

/// Marks a sparse slot with no dense counterpart.
const VACANT: u32 = u32::MAX;

/// Sparse set mapping small integer keys to densely packed values
///
/// The sparse array resolves a key to its dense position in constant time,
/// while values stay contiguous so iteration only touches live data. Removal
/// swaps the last value into the vacated slot, so dense order is not stable
/// across removals.
///
/// Keys must be below `u32::MAX`; that value marks vacant sparse slots.
#[derive(Debug, Clone)]
pub struct SparseSet<T> {
    sparse: Vec<u32>,
    dense_keys: Vec<u32>,
    dense_values: Vec<T>,
}

impl<T> SparseSet<T> {
    /// Create an empty set
    pub fn new() -> Self {
        Self {
            sparse: Vec::new(),
            dense_keys: Vec::new(),
            dense_values: Vec::new(),
        }
    }

    /// Create an empty set with room for `capacity` keys
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            sparse: Vec::with_capacity(capacity),
            dense_keys: Vec::with_capacity(capacity),
            dense_values: Vec::with_capacity(capacity),
        }
    }

    /// Number of stored values
    pub fn len(&self) -> usize {
        self.dense_values.len()
    }

    /// Whether the set holds no values
    pub fn is_empty(&self) -> bool {
        self.dense_values.is_empty()
    }

    /// Whether a value is stored under `key`
    pub fn contains(&self, key: u32) -> bool {
        self.dense_index(key).is_some()
    }

    /// Insert or replace the value stored under `key`
    ///
    /// Returns the replaced value, if any.
    pub fn insert(&mut self, key: u32, value: T) -> Option<T> {
        debug_assert!(key != VACANT, "sparse set key out of range");

        if let Some(index) = self.dense_index(key) {
            return Some(std::mem::replace(&mut self.dense_values[index], value));
        }

        let slot = key as usize;
        if slot >= self.sparse.len() {
            self.sparse.resize(slot + 1, VACANT);
        }
        self.sparse[slot] = self.dense_values.len() as u32;
        self.dense_keys.push(key);
        self.dense_values.push(value);
        None
    }

    /// Value stored under `key`
    pub fn get(&self, key: u32) -> Option<&T> {
        self.dense_index(key).map(|index| &self.dense_values[index])
    }

    /// Mutable value stored under `key`
    pub fn get_mut(&mut self, key: u32) -> Option<&mut T> {
        self.dense_index(key).map(move |index| &mut self.dense_values[index])
    }

    /// Remove and return the value stored under `key`
    pub fn remove(&mut self, key: u32) -> Option<T> {
        let index = self.dense_index(key)?;
        let last = self.dense_keys.len() - 1;

        if index != last {
            let moved_key = self.dense_keys[last];
            self.sparse[moved_key as usize] = index as u32;
        }
        self.sparse[key as usize] = VACANT;
        self.dense_keys.swap_remove(index);
        Some(self.dense_values.swap_remove(index))
    }

    /// Remove every value, keeping allocations
    pub fn clear(&mut self) {
        self.sparse.clear();
        self.dense_keys.clear();
        self.dense_values.clear();
    }

    /// Keys in dense order
    pub fn keys(&self) -> &[u32] {
        &self.dense_keys
    }

    /// Values in dense order
    pub fn values(&self) -> &[T] {
        &self.dense_values
    }

    /// Mutable values in dense order
    pub fn values_mut(&mut self) -> &mut [T] {
        &mut self.dense_values
    }

    /// Iterate `(key, value)` pairs in dense order
    pub fn iter(&self) -> impl Iterator<Item = (u32, &T)> + '_ {
        self.dense_keys.iter().copied().zip(self.dense_values.iter())
    }

    /// Iterate `(key, value)` pairs mutably in dense order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (u32, &mut T)> + '_ {
        self.dense_keys.iter().copied().zip(self.dense_values.iter_mut())
    }

    fn dense_index(&self, key: u32) -> Option<usize> {
        match self.sparse.get(key as usize) {
            Some(&slot) if slot != VACANT => Some(slot as usize),
            _ => None,
        }
    }
}

impl<T> Default for SparseSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_replaces_existing_value() {
        let mut set = SparseSet::new();
        assert_eq!(set.insert(7, "a"), None);
        assert_eq!(set.insert(7, "b"), Some("a"));
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(7), Some(&"b"));
    }

    #[test]
    fn remove_swaps_last_value_into_hole() {
        let mut set = SparseSet::new();
        set.insert(1, 10);
        set.insert(5, 50);
        set.insert(3, 30);

        assert_eq!(set.remove(1), Some(10));

        // 3 was last and now lives where 1 used to
        assert_eq!(set.keys(), &[3, 5]);
        assert_eq!(set.get(3), Some(&30));
        assert_eq!(set.get(5), Some(&50));
        assert!(!set.contains(1));
    }

    #[test]
    fn removing_last_element_keeps_others_addressable() {
        let mut set = SparseSet::new();
        set.insert(0, 'x');
        set.insert(2, 'y');

        assert_eq!(set.remove(2), Some('y'));
        assert_eq!(set.remove(2), None);
        assert_eq!(set.get(0), Some(&'x'));
    }

    #[test]
    fn missing_keys_are_absent() {
        let mut set: SparseSet<u8> = SparseSet::with_capacity(4);
        assert!(set.get(100).is_none());
        assert!(set.get_mut(0).is_none());
        assert!(set.remove(42).is_none());
        assert!(set.is_empty());
    }

    #[test]
    fn values_mut_updates_in_place() {
        let mut set = SparseSet::new();
        set.insert(4, 1);
        set.insert(9, 2);
        for value in set.values_mut() {
            *value *= 10;
        }
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![(4, &10), (9, &20)]);
    }
}
