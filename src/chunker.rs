//! Splitting inputs into provider-sized batches.

use crate::table::Table;

/// Default number of items per chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 50;

/// Something that can be cut into contiguous pieces by position.
pub trait Chunkable {
    type Chunk;

    fn item_count(&self) -> usize;

    /// Copies items `start..end` (clamped) into a new chunk.
    fn slice_items(&self, start: usize, end: usize) -> Self::Chunk;
}

impl<T: Clone> Chunkable for [T] {
    type Chunk = Vec<T>;

    fn item_count(&self) -> usize {
        self.len()
    }

    fn slice_items(&self, start: usize, end: usize) -> Vec<T> {
        let end = end.min(self.len());
        self[start.min(end)..end].to_vec()
    }
}

impl<T: Clone> Chunkable for Vec<T> {
    type Chunk = Vec<T>;

    fn item_count(&self) -> usize {
        self.len()
    }

    fn slice_items(&self, start: usize, end: usize) -> Vec<T> {
        self.as_slice().slice_items(start, end)
    }
}

impl Chunkable for Table {
    type Chunk = Table;

    fn item_count(&self) -> usize {
        self.len()
    }

    fn slice_items(&self, start: usize, end: usize) -> Table {
        self.slice(start..end)
    }
}

/// Splits `input` into chunks of at most `size` items, in order.
///
/// An input that already fits (including an empty one) comes back as a single
/// chunk. A `size` of zero is treated as one.
pub fn chunks<C>(input: &C, size: usize) -> Vec<C::Chunk>
where
    C: Chunkable + ?Sized,
{
    let size = size.max(1);
    let total = input.item_count();
    if total <= size {
        return vec![input.slice_items(0, total)];
    }

    (0..total)
        .step_by(size)
        .map(|start| input.slice_items(start, start + size))
        .collect()
}
