//! Generational slot storage for cursors.
//!
//! A `CursorId` stays valid until its cursor is removed; afterwards the slot
//! may be reused but the bumped generation makes the stale id miss. Removing
//! one cursor therefore never renumbers the others.

use std::ops::{Index, IndexMut};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CursorId {
    slot: u32,
    generation: u32,
}

impl std::fmt::Display for CursorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}v{}", self.slot, self.generation)
    }
}

#[derive(Debug)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

#[derive(Debug)]
pub struct CursorArena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    len: usize,
}

impl<T> Default for CursorArena<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }
}

impl<T> CursorArena<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn insert(&mut self, value: T) -> CursorId {
        self.len += 1;
        if let Some(slot) = self.free.pop() {
            let entry = &mut self.slots[slot as usize];
            entry.value = Some(value);
            return CursorId {
                slot,
                generation: entry.generation,
            };
        }
        let slot = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            value: Some(value),
        });
        CursorId {
            slot,
            generation: 0,
        }
    }

    pub fn remove(&mut self, id: CursorId) -> Option<T> {
        let entry = self.slots.get_mut(id.slot as usize)?;
        if entry.generation != id.generation {
            return None;
        }
        let value = entry.value.take()?;
        entry.generation = entry.generation.wrapping_add(1);
        self.free.push(id.slot);
        self.len -= 1;
        Some(value)
    }

    pub fn contains(&self, id: CursorId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: CursorId) -> Option<&T> {
        self.slots
            .get(id.slot as usize)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.value.as_ref())
    }

    pub fn get_mut(&mut self, id: CursorId) -> Option<&mut T> {
        self.slots
            .get_mut(id.slot as usize)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.value.as_mut())
    }
}

impl<T> Index<CursorId> for CursorArena<T> {
    type Output = T;

    fn index(&self, id: CursorId) -> &T {
        match self.get(id) {
            Some(v) => v,
            None => panic!("stale cursor id {id}"),
        }
    }
}

impl<T> IndexMut<CursorId> for CursorArena<T> {
    fn index_mut(&mut self, id: CursorId) -> &mut T {
        match self.get_mut(id) {
            Some(v) => v,
            None => panic!("stale cursor id {id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removed_ids_go_stale_and_slots_are_reused() {
        let mut arena = CursorArena::new();
        let a = arena.insert("a");
        let b = arena.insert("b");
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.remove(a), Some("a"));
        assert!(!arena.contains(a));
        assert_eq!(arena.remove(a), None);
        let c = arena.insert("c");
        assert_ne!(a, c);
        assert_eq!(arena[c], "c");
        assert_eq!(arena[b], "b");
        assert_eq!(arena.len(), 2);
    }

    #[test]
    #[should_panic(expected = "stale cursor id")]
    fn indexing_with_stale_id_panics() {
        let mut arena = CursorArena::new();
        let a = arena.insert(1);
        arena.remove(a);
        let _ = arena[a];
    }
}
