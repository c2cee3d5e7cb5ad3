use smol_str::SmolStr;
use std::{collections::HashMap, fmt};

/// Identifies one storage slot: a name at the loop depth it was declared.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SlotKey {
    pub name: SmolStr,
    pub depth: u32,
}

impl SlotKey {
    pub fn new(name: impl Into<SmolStr>, depth: u32) -> Self {
        Self {
            name: name.into(),
            depth,
        }
    }

    /// Slot used when a name could not be resolved.
    #[inline]
    pub fn global(name: impl Into<SmolStr>) -> Self {
        Self::new(name, 0)
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "var={}, scope={}", self.name, self.depth)
    }
}

/// Allocated memory word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub key: SlotKey,
    /// Data label in the generated listing.
    pub label: SmolStr,
}

/// Mapping of slot keys to uniquely labelled memory words.
///
/// Slots are only ever added. They are not reused when the
/// scope that declared them closes.
#[derive(Debug, Default)]
pub struct StorageMap {
    slots: Vec<Slot>,
    lookup: HashMap<SlotKey, usize>,
}

impl StorageMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Label of the slot, if it has been allocated.
    pub fn get(&self, key: &SlotKey) -> Option<&str> {
        self.lookup.get(key).map(|index| self.slots[*index].label.as_str())
    }

    /// Label of the slot, allocating it on first use.
    pub fn alloc(&mut self, key: &SlotKey) -> SmolStr {
        if let Some(index) = self.lookup.get(key) {
            return self.slots[*index].label.clone();
        }

        let index = self.slots.len();
        let label = SmolStr::from(format!("V{index}"));
        log::trace!("allocate {label} for {key}");

        self.slots.push(Slot {
            key: key.clone(),
            label: label.clone(),
        });
        self.lookup.insert(key.clone(), index);

        label
    }

    /// Slots in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = &Slot> {
        self.slots.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_alloc_once_per_key() {
        let mut storage = StorageMap::new();
        assert_eq!(storage.alloc(&SlotKey::new("x", 0)), "V0");
        assert_eq!(storage.alloc(&SlotKey::new("i", 1)), "V1");
        assert_eq!(storage.alloc(&SlotKey::new("x", 0)), "V0");
        assert_eq!(storage.alloc(&SlotKey::new("x", 1)), "V2");
        assert_eq!(storage.len(), 3);

        assert_eq!(storage.get(&SlotKey::new("i", 1)), Some("V1"));
        assert_eq!(storage.get(&SlotKey::new("i", 0)), None);
    }

    #[test]
    fn test_iter_in_allocation_order() {
        let mut storage = StorageMap::new();
        storage.alloc(&SlotKey::new("b", 0));
        storage.alloc(&SlotKey::new("a", 2));

        let keys = storage.iter().map(|s| s.key.to_string()).collect::<Vec<_>>();
        assert_eq!(keys, vec!["var=b, scope=0", "var=a, scope=2"]);
    }
}
