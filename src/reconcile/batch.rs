//! Splitting update lists into request-sized batches.

use std::num::NonZeroUsize;
use std::slice::Chunks;

/// Builds a batch size at compile time.
///
/// Panics during const evaluation when `n` is zero.
pub const fn batch_size(n: usize) -> NonZeroUsize {
    match NonZeroUsize::new(n) {
        Some(size) => size,
        None => panic!("batch size must be non-zero"),
    }
}

/// Lazily splits `items` into consecutive batches of `size`.
///
/// Every batch holds exactly `size` items except the last, which holds the
/// remainder. An empty slice yields no batches. The input is only borrowed;
/// call again to restart.
pub fn batches<T>(items: &[T], size: NonZeroUsize) -> Chunks<'_, T> {
    items.chunks(size.get())
}

/// Number of batches `batches` yields for `len` items.
pub fn batch_count(len: usize, size: NonZeroUsize) -> usize {
    len.div_ceil(size.get())
}
