//! Fixed-capacity slot pool.
//!
//! Entries live in one arena allocated up front. Each entry is threaded onto
//! exactly one of two index-linked lists: the free list or the used list.
//! `acquire` pops the free head and pushes it onto the used head; `release`
//! does the reverse. Both are O(1) and never allocate.
//!
//! Walking the used list while releasing the visited entry goes through
//! [`Cursor`], which reads the successor before handing out the current
//! index, so a release of the current entry never disturbs the walk.

/// Index of an entry inside a [`SlotPool`].
pub type SlotIndex = usize;

#[derive(Debug, Clone)]
struct Entry<T> {
    prev: Option<SlotIndex>,
    next: Option<SlotIndex>,
    used: bool,
    value: T,
}

#[derive(Debug, Clone)]
pub struct SlotPool<T> {
    entries: Vec<Entry<T>>,
    free_head: Option<SlotIndex>,
    used_head: Option<SlotIndex>,
    used_count: usize,
}

impl<T: Default> SlotPool<T> {
    /// Pool with `capacity` idle entries, all on the free list in index order.
    pub fn new(capacity: usize) -> Self {
        let entries = (0..capacity)
            .map(|i| Entry {
                prev: i.checked_sub(1),
                next: (i + 1 < capacity).then_some(i + 1),
                used: false,
                value: T::default(),
            })
            .collect();
        Self {
            entries,
            free_head: (capacity > 0).then_some(0),
            used_head: None,
            used_count: 0,
        }
    }
}

impl<T> SlotPool<T> {
    #[inline]
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn used_count(&self) -> usize {
        self.used_count
    }

    #[inline]
    pub fn free_count(&self) -> usize {
        self.entries.len() - self.used_count
    }

    /// True when no entry is left to acquire.
    #[inline]
    pub fn is_dry(&self) -> bool {
        self.free_head.is_none()
    }

    pub fn is_used(&self, index: SlotIndex) -> bool {
        self.entries.get(index).is_some_and(|e| e.used)
    }

    /// Move the free head onto the used list. `None` means the pool is exhausted.
    pub fn acquire(&mut self) -> Option<SlotIndex> {
        let index = self.free_head?;
        detach(&mut self.entries, &mut self.free_head, index);
        push_front(&mut self.entries, &mut self.used_head, index);
        self.entries[index].used = true;
        self.used_count += 1;
        Some(index)
    }

    /// Return a used entry to the free list. Returns false (and changes nothing)
    /// when `index` is out of range or not currently in use.
    pub fn release(&mut self, index: SlotIndex) -> bool {
        if !self.is_used(index) {
            return false;
        }
        detach(&mut self.entries, &mut self.used_head, index);
        push_front(&mut self.entries, &mut self.free_head, index);
        self.entries[index].used = false;
        self.used_count -= 1;
        true
    }

    pub fn get(&self, index: SlotIndex) -> Option<&T> {
        self.entries
            .get(index)
            .filter(|e| e.used)
            .map(|e| &e.value)
    }

    pub fn get_mut(&mut self, index: SlotIndex) -> Option<&mut T> {
        self.entries
            .get_mut(index)
            .filter(|e| e.used)
            .map(|e| &mut e.value)
    }

    /// Used entries from head (most recently acquired) to tail.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            pool: self,
            next: self.used_head,
        }
    }

    /// Detached walk over the used list that tolerates releasing the visited entry.
    pub fn cursor(&self) -> Cursor {
        Cursor {
            next: self.used_head,
        }
    }

    /// Release every used entry.
    pub fn clear(&mut self) {
        let mut cursor = self.cursor();
        while let Some(index) = cursor.advance(self) {
            self.release(index);
        }
    }
}

fn detach<T>(entries: &mut [Entry<T>], head: &mut Option<SlotIndex>, index: SlotIndex) {
    let (prev, next) = (entries[index].prev, entries[index].next);
    match prev {
        Some(p) => entries[p].next = next,
        None => *head = next,
    }
    if let Some(n) = next {
        entries[n].prev = prev;
    }
    entries[index].prev = None;
    entries[index].next = None;
}

fn push_front<T>(entries: &mut [Entry<T>], head: &mut Option<SlotIndex>, index: SlotIndex) {
    entries[index].prev = None;
    entries[index].next = *head;
    if let Some(h) = *head {
        entries[h].prev = Some(index);
    }
    *head = Some(index);
}

/// Borrowing iterator over the used list.
pub struct Iter<'a, T> {
    pool: &'a SlotPool<T>,
    next: Option<SlotIndex>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (SlotIndex, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.next?;
        let entry = &self.pool.entries[index];
        self.next = entry.next;
        Some((index, &entry.value))
    }
}

/// Position in the used list that does not borrow the pool.
///
/// `advance` captures the successor of the entry it returns, so the caller
/// may release the returned index before calling `advance` again. Releasing
/// any *other* entry mid-walk is not supported.
#[derive(Debug, Clone, Copy)]
pub struct Cursor {
    next: Option<SlotIndex>,
}

impl Cursor {
    pub fn advance<T>(&mut self, pool: &SlotPool<T>) -> Option<SlotIndex> {
        let index = self.next?;
        self.next = pool.entries.get(index).and_then(|e| e.next);
        Some(index)
    }
}
