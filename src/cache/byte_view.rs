//! Byte View Module
//!
//! Immutable view over cached bytes.

use std::fmt;

use bytes::Bytes;

use crate::cache::CacheValue;

// == Byte View ==
/// Read-only view of a cached value.
///
/// Backed by [`Bytes`], so clones share the same buffer and nobody holding a
/// view can mutate the memory the cache owns. Use [`ByteView::to_vec`] for
/// an independent, mutable copy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ByteView {
    bytes: Bytes,
}

impl ByteView {
    // == Constructors ==
    /// Wraps an existing buffer without copying.
    pub fn new(bytes: Bytes) -> Self {
        Self { bytes }
    }

    /// Creates a view over a private copy of `data`.
    pub fn copy_from_slice(data: &[u8]) -> Self {
        Self {
            bytes: Bytes::copy_from_slice(data),
        }
    }

    // == Accessors ==
    /// Returns the length of the value in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Borrows the underlying bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns an owned copy of the bytes.
    pub fn to_vec(&self) -> Vec<u8> {
        self.bytes.to_vec()
    }

    /// Returns a shared handle to the buffer (no copy).
    pub fn bytes(&self) -> Bytes {
        self.bytes.clone()
    }
}

impl CacheValue for ByteView {
    fn byte_len(&self) -> usize {
        self.len()
    }
}

impl AsRef<[u8]> for ByteView {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl From<Bytes> for ByteView {
    fn from(bytes: Bytes) -> Self {
        Self::new(bytes)
    }
}

impl From<Vec<u8>> for ByteView {
    fn from(data: Vec<u8>) -> Self {
        Self::new(Bytes::from(data))
    }
}

impl From<String> for ByteView {
    fn from(data: String) -> Self {
        Self::new(Bytes::from(data))
    }
}

impl From<&str> for ByteView {
    fn from(data: &str) -> Self {
        Self::copy_from_slice(data.as_bytes())
    }
}

impl fmt::Display for ByteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.bytes))
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_len_and_string() {
        let view = ByteView::from("630");
        assert_eq!(view.len(), 3);
        assert_eq!(view.byte_len(), 3);
        assert_eq!(view.to_string(), "630");
        assert!(!view.is_empty());
    }

    #[test]
    fn test_to_vec_is_independent_copy() {
        let view = ByteView::from(vec![1u8, 2, 3]);

        let mut copy = view.to_vec();
        copy[0] = 42;

        assert_eq!(view.as_slice(), &[1, 2, 3]);
    }

    #[test]
    fn test_copy_from_slice_detaches_source() {
        let mut source = vec![b'a', b'b'];
        let view = ByteView::copy_from_slice(&source);
        source[0] = b'z';

        assert_eq!(view.to_string(), "ab");
    }

    #[test]
    fn test_clones_share_buffer() {
        let view = ByteView::from("shared");
        let clone = view.clone();
        assert_eq!(view.as_slice().as_ptr(), clone.as_slice().as_ptr());
    }

    #[test]
    fn test_default_is_empty() {
        assert!(ByteView::default().is_empty());
    }
}
