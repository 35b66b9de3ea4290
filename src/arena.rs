//! Chunked, index-based storage that owns every node of a module.
//!
//! Nodes are appended into fixed-size chunks and referenced through typed
//! [`Id`]s instead of addresses, so a tree can later grow parent or back
//! references without aliasing hazards. Nothing is freed individually: all
//! storage is released when the arena is dropped.

use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    marker::PhantomData,
    mem,
    ops::{Index, IndexMut},
};

use educe::Educe;
use tracing::trace;

/// Chunk size in bytes used when no configuration is given.
pub const DEFAULT_CHUNK_SIZE: usize = 10_000;

/// Every slot is rounded up to this many bytes.
const SLOT_ALIGN: usize = 8;

/// A typed index into an [`Arena`].
pub struct Id<T> {
    index: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Id<T> {
    fn new(index: u32) -> Self {
        Self {
            index,
            _marker: PhantomData,
        }
    }

    /// The allocation position of this id, starting at 0.
    pub fn to_idx(self) -> usize {
        self.index as usize
    }
}

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Id<T> {}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<T> Eq for Id<T> {}

impl<T> PartialOrd for Id<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Id<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.index.cmp(&other.index)
    }
}

impl<T> Hash for Id<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.index)
    }
}

/// Append-only storage split into chunks of `chunk_size` bytes.
#[derive(Educe)]
#[educe(Debug)]
pub struct Arena<T> {
    chunk_size: usize,
    len: usize,
    #[educe(Debug(ignore))]
    chunks: Vec<Vec<T>>,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self::with_chunk_size(DEFAULT_CHUNK_SIZE)
    }

    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self {
            chunk_size,
            len: 0,
            chunks: Vec::new(),
        }
    }

    /// Bytes reserved for one `T`, rounded up to the slot alignment.
    pub const fn slot_size() -> usize {
        let size = (mem::size_of::<T>() + SLOT_ALIGN - 1) & !(SLOT_ALIGN - 1);
        if size == 0 { SLOT_ALIGN } else { size }
    }

    fn slots_per_chunk(&self) -> usize {
        self.chunk_size / Self::slot_size()
    }

    /// Moves `value` into the arena and returns its id.
    ///
    /// Panics if a single slot does not fit in a chunk: that is a
    /// configuration error, not something a caller can recover from.
    pub fn alloc(&mut self, value: T) -> Id<T> {
        let slot = Self::slot_size();
        assert!(
            slot <= self.chunk_size,
            "arena slot of {slot} bytes exceeds the chunk size of {} bytes",
            self.chunk_size
        );
        assert!(self.len < u32::MAX as usize, "arena is full");

        let per_chunk = self.slots_per_chunk();
        let needs_chunk = self
            .chunks
            .last()
            .is_none_or(|chunk| chunk.len() == per_chunk);
        if needs_chunk {
            self.chunks.push(Vec::with_capacity(per_chunk));
            trace!(
                chunks = self.chunks.len(),
                slots = per_chunk,
                "arena grew a chunk"
            );
        }

        let id = Id::new(self.len as u32);
        if let Some(chunk) = self.chunks.last_mut() {
            chunk.push(value);
        }
        self.len += 1;
        id
    }

    pub fn get(&self, id: Id<T>) -> Option<&T> {
        let per_chunk = self.slots_per_chunk();
        self.chunks
            .get(id.to_idx().checked_div(per_chunk)?)
            .and_then(|chunk| chunk.get(id.to_idx().checked_rem(per_chunk)?))
    }

    pub fn get_mut(&mut self, id: Id<T>) -> Option<&mut T> {
        let per_chunk = self.slots_per_chunk();
        self.chunks
            .get_mut(id.to_idx().checked_div(per_chunk)?)
            .and_then(|chunk| chunk.get_mut(id.to_idx().checked_rem(per_chunk)?))
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Iterates in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (Id<T>, &T)> {
        self.chunks
            .iter()
            .flatten()
            .enumerate()
            .map(|(index, value)| (Id::new(index as u32), value))
    }
}

impl<T> Index<Id<T>> for Arena<T> {
    type Output = T;

    fn index(&self, id: Id<T>) -> &T {
        match self.get(id) {
            Some(value) => value,
            None => panic!("{id:?} does not belong to this arena"),
        }
    }
}

impl<T> IndexMut<Id<T>> for Arena<T> {
    fn index_mut(&mut self, id: Id<T>) -> &mut T {
        match self.get_mut(id) {
            Some(value) => value,
            None => panic!("{id:?} does not belong to this arena"),
        }
    }
}
