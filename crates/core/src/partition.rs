//! Identifier partitioning into fixed-size batches.

/// Splits `ids` into ordered chunks of at most `batch_size`.
///
/// Concatenating the chunks yields `ids` unchanged. A `batch_size` of zero
/// is treated as one.
pub fn partition_ids(ids: &[u64], batch_size: usize) -> Vec<Vec<u64>> {
    ids.chunks(batch_size.max(1)).map(<[u64]>::to_vec).collect()
}
