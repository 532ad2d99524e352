//! LRU List Module
//!
//! Slot-indexed doubly linked list holding items in recency order.

// == Node ==
#[derive(Debug)]
struct Node<T> {
    item: T,
    prev: Option<usize>,
    next: Option<usize>,
}

// == LRU List ==
/// Recency-ordered list with O(1) push, promote and remove.
///
/// Items live in a slot arena and are linked where:
/// - Front (head) = Most recently used
/// - Back (tail) = Least recently used
///
/// A slot index stays valid for an item until that item is removed, so
/// callers can keep `key -> slot` lookups beside the list.
#[derive(Debug)]
pub struct LruList<T> {
    slots: Vec<Option<Node<T>>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl<T> Default for LruList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LruList<T> {
    // == Constructor ==
    /// Creates a new empty list.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    // == Push Front ==
    /// Inserts an item at the most recently used position.
    ///
    /// Returns the slot the item occupies.
    pub fn push_front(&mut self, item: T) -> usize {
        let node = Node {
            item,
            prev: None,
            next: None,
        };
        let slot = match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(node);
                slot
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        };
        self.link_front(slot);
        self.len += 1;
        slot
    }

    // == Move To Front ==
    /// Marks the item in `slot` as most recently used.
    ///
    /// Returns false if the slot is vacant.
    pub fn move_to_front(&mut self, slot: usize) -> bool {
        if !self.is_occupied(slot) {
            return false;
        }
        if self.head != Some(slot) {
            self.unlink(slot);
            self.link_front(slot);
        }
        true
    }

    // == Remove ==
    /// Removes and returns the item in `slot`.
    pub fn remove(&mut self, slot: usize) -> Option<T> {
        if !self.is_occupied(slot) {
            return None;
        }
        self.unlink(slot);
        let node = self.slots[slot].take()?;
        self.free.push(slot);
        self.len -= 1;
        Some(node.item)
    }

    // == Pop Back ==
    /// Removes and returns the least recently used item.
    pub fn pop_back(&mut self) -> Option<T> {
        let tail = self.tail?;
        self.remove(tail)
    }

    pub fn get(&self, slot: usize) -> Option<&T> {
        self.slots
            .get(slot)
            .and_then(Option::as_ref)
            .map(|node| &node.item)
    }

    pub fn get_mut(&mut self, slot: usize) -> Option<&mut T> {
        self.slots
            .get_mut(slot)
            .and_then(Option::as_mut)
            .map(|node| &mut node.item)
    }

    /// Iterates `(slot, item)` pairs from most to least recently used.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cursor: self.head,
        }
    }

    // == Length ==
    /// Returns the number of items in the list.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drops every item and releases the slot arena.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    fn is_occupied(&self, slot: usize) -> bool {
        matches!(self.slots.get(slot), Some(Some(_)))
    }

    fn link_front(&mut self, slot: usize) {
        let old_head = self.head;
        if let Some(node) = self.slots[slot].as_mut() {
            node.prev = None;
            node.next = old_head;
        }
        match old_head {
            Some(head) => self.set_prev(head, Some(slot)),
            None => self.tail = Some(slot),
        }
        self.head = Some(slot);
    }

    fn unlink(&mut self, slot: usize) {
        let (prev, next) = match self.slots[slot].as_ref() {
            Some(node) => (node.prev, node.next),
            None => return,
        };
        match prev {
            Some(prev) => self.set_next(prev, next),
            None => self.head = next,
        }
        match next {
            Some(next) => self.set_prev(next, prev),
            None => self.tail = prev,
        }
    }

    fn set_prev(&mut self, slot: usize, prev: Option<usize>) {
        if let Some(node) = self.slots[slot].as_mut() {
            node.prev = prev;
        }
    }

    fn set_next(&mut self, slot: usize, next: Option<usize>) {
        if let Some(node) = self.slots[slot].as_mut() {
            node.next = next;
        }
    }
}

// == Iterator ==
/// Front-to-back iterator over an [`LruList`].
pub struct Iter<'a, T> {
    list: &'a LruList<T>,
    cursor: Option<usize>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (usize, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.cursor?;
        let node = self.list.slots.get(slot)?.as_ref()?;
        self.cursor = node.next;
        Some((slot, &node.item))
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn order(list: &LruList<&'static str>) -> Vec<&'static str> {
        list.iter().map(|(_, item)| *item).collect()
    }

    #[test]
    fn test_lru_new() {
        let list: LruList<String> = LruList::new();
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);
        assert_eq!(list.iter().count(), 0);
    }

    #[test]
    fn test_push_front_orders_newest_first() {
        let mut list = LruList::new();
        list.push_front("key1");
        list.push_front("key2");
        list.push_front("key3");

        assert_eq!(list.len(), 3);
        assert_eq!(order(&list), vec!["key3", "key2", "key1"]);
    }

    #[test]
    fn test_move_to_front() {
        let mut list = LruList::new();
        let a = list.push_front("a");
        list.push_front("b");
        list.push_front("c");

        assert!(list.move_to_front(a));

        assert_eq!(order(&list), vec!["a", "c", "b"]);
        assert_eq!(list.pop_back(), Some("b"));
    }

    #[test]
    fn test_move_head_is_noop() {
        let mut list = LruList::new();
        list.push_front("a");
        let b = list.push_front("b");

        assert!(list.move_to_front(b));
        assert_eq!(order(&list), vec!["b", "a"]);
    }

    #[test]
    fn test_pop_back() {
        let mut list = LruList::new();
        list.push_front("key1");
        list.push_front("key2");
        list.push_front("key3");

        assert_eq!(list.pop_back(), Some("key1"));
        assert_eq!(list.len(), 2);
        assert_eq!(list.pop_back(), Some("key2"));
        assert_eq!(list.pop_back(), Some("key3"));
        assert_eq!(list.pop_back(), None);
        assert!(list.is_empty());
    }

    #[test]
    fn test_remove_middle() {
        let mut list = LruList::new();
        list.push_front("key1");
        let key2 = list.push_front("key2");
        list.push_front("key3");

        assert_eq!(list.remove(key2), Some("key2"));
        assert_eq!(list.len(), 2);
        assert_eq!(order(&list), vec!["key3", "key1"]);
        assert_eq!(list.remove(key2), None, "Vacant slot removes nothing");
        assert!(!list.move_to_front(key2));
    }

    #[test]
    fn test_freed_slots_are_reused() {
        let mut list = LruList::new();
        let a = list.push_front("a");
        list.push_front("b");
        list.remove(a);

        let c = list.push_front("c");
        assert_eq!(c, a);
        assert_eq!(list.get(c), Some(&"c"));
        assert_eq!(order(&list), vec!["c", "b"]);
    }

    #[test]
    fn test_order_after_multiple_touches() {
        let mut list = LruList::new();
        let a = list.push_front("a");
        let b = list.push_front("b");
        let c = list.push_front("c");

        list.move_to_front(a);
        list.move_to_front(c);
        list.move_to_front(b);

        // front=[b, c, a]=back
        assert_eq!(list.pop_back(), Some("a"));
        assert_eq!(list.pop_back(), Some("c"));
        assert_eq!(list.pop_back(), Some("b"));
    }

    #[test]
    fn test_get_mut() {
        let mut list = LruList::new();
        let slot = list.push_front(1);
        if let Some(item) = list.get_mut(slot) {
            *item = 42;
        }
        assert_eq!(list.get(slot), Some(&42));
    }

    #[test]
    fn test_clear() {
        let mut list = LruList::new();
        list.push_front("a");
        list.push_front("b");
        list.clear();

        assert!(list.is_empty());
        assert_eq!(list.iter().count(), 0);
        assert_eq!(list.pop_back(), None);
    }
}
