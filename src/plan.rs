//! Object addressing and part planning.
//!
//! A transfer splits `[0, total_size)` into fixed-size parts that are fetched
//! independently and written back at their own offsets.
use std::fmt;

/// Identifies one remote object: the bucket it lives in and its key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectLocator {
    pub bucket: String,
    pub key: String,
}

impl ObjectLocator {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for ObjectLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

/// A half-open byte range `[start, start + len)` of the remote object.
///
/// `len` is never zero for parts produced by [`plan_parts`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Part {
    /// Position of the part in the plan (0-based).
    pub index: usize,
    /// The starting byte offset.
    pub start: u64,
    /// Number of bytes in the part.
    pub len: u64,
}

impl Part {
    /// One past the last byte of the part.
    pub fn end(&self) -> u64 {
        self.start + self.len
    }

    /// Value for an HTTP `Range` header. HTTP ranges are inclusive on both ends,
    /// so the part must not be empty.
    pub fn http_range(&self) -> String {
        debug_assert!(self.len > 0, "empty {self} has no HTTP range");
        format!("bytes={}-{}", self.start, self.end() - 1)
    }
}

impl fmt::Display for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "part {} [{}, {})", self.index, self.start, self.end())
    }
}

/// Divides `total_size` bytes into parts of at most `part_size` bytes.
///
/// Every part is exactly `part_size` long except the last, which takes the
/// remainder. A zero-length object yields no parts.
///
/// `part_size` must be non-zero; callers validate it through
/// [`TransferConfig::validate`](crate::config::TransferConfig::validate).
pub fn plan_parts(total_size: u64, part_size: u64) -> Vec<Part> {
    let count = total_size.div_ceil(part_size);
    let mut parts = Vec::with_capacity(count as usize);
    let mut start = 0;

    while start < total_size {
        let len = part_size.min(total_size - start);
        parts.push(Part {
            index: parts.len(),
            start,
            len,
        });
        start += len;
    }

    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_partition(parts: &[Part], total_size: u64, part_size: u64) {
        let mut expected_start = 0;
        for (i, part) in parts.iter().enumerate() {
            assert_eq!(part.index, i);
            assert_eq!(part.start, expected_start, "gap or overlap at {}", part);
            assert!(part.len > 0);
            assert!(part.len <= part_size);
            if i + 1 < parts.len() {
                assert_eq!(part.len, part_size);
            }
            expected_start = part.end();
        }
        assert_eq!(expected_start, total_size);
        assert_eq!(parts.iter().map(|p| p.len).sum::<u64>(), total_size);
    }

    #[test]
    fn test_plan_even_split() {
        // 100 bytes, 25 byte parts -> 4 parts
        let parts = plan_parts(100, 25);
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0].start, 0);
        assert_eq!(parts[3].start, 75);
        assert_eq!(parts[3].len, 25);
    }

    #[test]
    fn test_plan_remainder_goes_to_last_part() {
        // 100 bytes, 30 byte parts -> 30, 30, 30, 10
        let parts = plan_parts(100, 30);
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[3].start, 90);
        assert_eq!(parts[3].len, 10);
        assert_eq!(parts[3].end(), 100);
    }

    #[test]
    fn test_plan_zero_length_object() {
        assert!(plan_parts(0, 64).is_empty());
    }

    #[test]
    fn test_plan_part_larger_than_object() {
        let parts = plan_parts(10, 64);
        assert_eq!(parts, vec![Part { index: 0, start: 0, len: 10 }]);
    }

    #[test]
    fn test_plan_partitions_exactly() {
        for total_size in [0, 1, 2, 7, 63, 64, 65, 1000, 4097] {
            for part_size in [1, 2, 3, 64, 100, 4096] {
                let parts = plan_parts(total_size, part_size);
                assert_eq!(parts.len() as u64, total_size.div_ceil(part_size));
                assert_partition(&parts, total_size, part_size);
            }
        }
    }

    #[test]
    fn test_plan_is_deterministic() {
        assert_eq!(plan_parts(12_345, 1000), plan_parts(12_345, 1000));
    }

    #[test]
    fn test_http_range_is_inclusive() {
        let part = Part { index: 1, start: 5, len: 5 };
        assert_eq!(part.http_range(), "bytes=5-9");
    }

    #[test]
    #[should_panic(expected = "has no HTTP range")]
    #[cfg(debug_assertions)]
    fn test_http_range_rejects_empty_part() {
        Part { index: 0, start: 10, len: 0 }.http_range();
    }

    #[test]
    fn test_locator_display() {
        let locator = ObjectLocator::new("bucket", "dir/file.bin");
        assert_eq!(locator.to_string(), "s3://bucket/dir/file.bin");
    }
}
