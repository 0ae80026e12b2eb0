// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Scanwerk — Buckets: the unit of transfer between the pump's workers.

use scanwerk_core::context::Context;
use scanwerk_core::error::{Result, ScanwerkError};
use scanwerk_core::marker::Marker;

/// One unit of transfer through the brigade: a chunk of raw image data,
/// or a marker with the context in force at the boundary.
///
/// A bucket is owned by exactly one side at a time; pushing transfers
/// ownership to the brigade, popping transfers it to the processor.
#[derive(Debug)]
pub enum Bucket {
    Data(Vec<u8>),
    Mark(Marker, Context),
}

impl Bucket {
    /// Allocate a data bucket holding a copy of `payload`.
    ///
    /// Allocation is checked rather than aborting, so the acquirer can
    /// wait for outstanding buckets to drain under memory pressure.
    pub fn data(payload: &[u8]) -> Result<Bucket> {
        let mut chunk = Vec::new();
        chunk
            .try_reserve_exact(payload.len())
            .map_err(|err| ScanwerkError::BucketAllocation(err.to_string()))?;
        chunk.extend_from_slice(payload);
        Ok(Bucket::Data(chunk))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A data bucket owns an independent copy of its payload.
    #[test]
    fn data_bucket_copies_payload() {
        let mut payload = vec![1u8, 2, 3];
        let bucket = Bucket::data(&payload).expect("allocate");
        payload[0] = 99;

        match bucket {
            Bucket::Data(chunk) => assert_eq!(chunk, vec![1, 2, 3]),
            Bucket::Mark(..) => panic!("expected a data bucket"),
        }
    }
}
