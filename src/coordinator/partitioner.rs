//! Byte-range partitioning: a file of length L divides into exactly N
//! contiguous shards of `ceil(L / N)` bytes, the last one short and any
//! shard starting at or past L empty.

use std::ops::Range;

/// Splits `len` bytes into `shards` contiguous index-ordered ranges.
pub fn split(len: usize, shards: usize) -> Vec<Range<usize>> {
    assert!(shards > 0, "shard count must be non-zero");
    let part_size = len.div_ceil(shards);
    (0..shards)
        .map(|i| {
            let start = (i * part_size).min(len);
            let end = (start + part_size).min(len);
            start..end
        })
        .collect()
}

/// Concatenates the shards that are present, in index order.
///
/// This is the left-inverse of [`split`] only when every shard is present.
/// If an interior shard is missing the result is silently shorter than the
/// original — the caller sees a truncated, corrupted byte stream, not an
/// error.
pub fn reassemble(parts: Vec<Option<Vec<u8>>>) -> Vec<u8> {
    let mut out = Vec::new();
    for part in parts.into_iter().flatten() {
        out.extend_from_slice(&part);
    }
    out
}
