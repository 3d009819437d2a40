/// Append-only buffer with an explicit amortization policy.
///
/// When an append would exceed capacity the buffer grows to
/// `capacity * 3 / 2 + 1`, repeated until the append fits. The policy is
/// spelled out here rather than left to `Vec`'s doubling because tapes are
/// routinely held in memory by the thousand and the flatter growth curve
/// wastes less tail capacity on logs that have stopped growing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Column<T> {
    items: Vec<T>,
}

impl<T> Column<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    /// Take ownership of an exact-length buffer, e.g. one rebuilt from a
    /// serialized tape. No slack is added.
    pub fn from_vec(items: Vec<T>) -> Self {
        Self { items }
    }

    pub fn push(&mut self, item: T) {
        self.reserve_for(1);
        self.items.push(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.items.capacity()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn last(&self) -> Option<&T> {
        self.items.last()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    fn reserve_for(&mut self, additional: usize) {
        let needed = self.items.len() + additional;
        let capacity = self.items.capacity();
        if needed <= capacity {
            return;
        }
        let mut target = capacity.max(1);
        while target < needed {
            target = target * 3 / 2 + 1;
        }
        self.items.reserve_exact(target - self.items.len());
    }
}

impl<T: Copy> Column<T> {
    pub fn get_copied(&self, index: usize) -> Option<T> {
        self.items.get(index).copied()
    }
}

impl<T: Clone> Column<T> {
    pub fn extend_from_slice(&mut self, items: &[T]) {
        self.reserve_for(items.len());
        self.items.extend_from_slice(items);
    }
}
