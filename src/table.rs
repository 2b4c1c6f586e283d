use std::cmp::min;
use std::ops::Index;

use crate::utils::MyHash;

#[derive(Debug, Clone)]
struct Entry<T> {
    value: T,
    next: usize,
}

/// Hash-consing table: every distinct value is stored exactly once.
///
/// Values live in an append-only vector. Cell 0 is a sentry, so index `0`
/// doubles as the "end of chain" marker in the bucket lists.
pub struct Table<T> {
    data: Vec<Entry<T>>,
    buckets: Vec<usize>,
    bitmask: u64,
}

impl<T> Table<T>
where
    T: Default,
{
    /// Create a new table with `2^min(bits, 16)` buckets.
    pub fn new(bits: usize) -> Self {
        assert!(bits <= 31, "Storage bits should be in the range 0..=31");

        let buckets_bits = min(bits, 16);
        let buckets_size = 1 << buckets_bits;

        Self {
            data: vec![Entry {
                value: T::default(),
                next: 0,
            }],
            buckets: vec![0; buckets_size],
            bitmask: (buckets_size - 1) as u64,
        }
    }
}

impl<T> Table<T> {
    /// Number of stored values (the sentry is not counted).
    pub fn len(&self) -> usize {
        self.data.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the reference to the value at the given index.
    pub fn value(&self, index: usize) -> &T {
        assert_ne!(index, 0, "Index is 0");
        &self.data[index].value
    }

    /// Get the index of the next cell in the same bucket.
    pub fn next(&self, index: usize) -> usize {
        assert_ne!(index, 0, "Index is 0");
        self.data[index].next
    }

    /// Append a value without hash-consing and return its index.
    pub fn add(&mut self, value: T) -> usize {
        self.data.push(Entry { value, next: 0 });
        self.data.len() - 1
    }
}

impl<T> Table<T>
where
    T: MyHash + Eq,
{
    fn bucket_index(&self, value: &T) -> usize {
        (value.hash() & self.bitmask) as usize
    }

    /// Put a value into the table and return its index.
    ///
    /// If an equal value is already stored, its index is returned instead.
    pub fn put(&mut self, value: T) -> usize {
        let bucket_index = self.bucket_index(&value);
        let mut index = self.buckets[bucket_index];

        if index == 0 {
            let i = self.add(value);
            self.buckets[bucket_index] = i;
            return i;
        }

        loop {
            if &value == self.value(index) {
                return index;
            }

            let next = self.next(index);
            if next == 0 {
                let i = self.add(value);
                self.data[index].next = i;
                return i;
            }
            index = next;
        }
    }
}

impl<T> Index<usize> for Table<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        self.value(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
    struct Item(i32);

    impl MyHash for Item {
        fn hash(&self) -> u64 {
            self.0.unsigned_abs() as u64
        }
    }

    #[test]
    fn test_add() {
        let mut table = Table::<Item>::new(2);
        assert!(table.is_empty());
        let index = table.add(Item(42));
        assert_eq!(index, 1);
        assert_eq!(table[index], Item(42));
        assert_eq!(table.next(index), 0);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_put_dedup() {
        let mut table = Table::new(2);
        let a = table.put(Item(7));
        let b = table.put(Item(7));
        assert_eq!(a, b);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_put_chains_collisions() {
        let mut table = Table::new(2);
        let index1 = table.put(Item(5));
        let index2 = table.put(Item(-5));
        assert_ne!(index1, index2);
        assert_eq!(table[index1], Item(5));
        assert_eq!(table[index2], Item(-5));
        assert_eq!(table.next(index1), index2);
    }

    #[test]
    fn test_grows_past_bucket_count() {
        let mut table = Table::new(1);
        for i in 0..100 {
            table.put(Item(i));
        }
        assert_eq!(table.len(), 100);
        assert_eq!(table.put(Item(50)), 51);
    }
}
