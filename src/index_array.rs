//! Triangle and line index arrays in their serialized byte form.
//!
//! Indices are `u16` tuples packed tightly in native byte order, ready to
//! upload as an element buffer. The byte storage can be relinquished once
//! uploaded; a relinquished array no longer yields bytes.

/// A source of index bytes for an index buffer upload.
pub trait IndexSource {
    /// The serialized bytes, or `None` once they have been released.
    fn index_bytes(&self) -> Option<&[u8]>;

    /// Relinquish ownership of the bytes. Later calls return `None`.
    fn release(&mut self) -> Option<Vec<u8>>;
}

/// Growable array of `N`-tuples of `u16` indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexArray<const N: usize> {
    bytes: Option<Vec<u8>>,
    length: usize,
}

/// Three indices per element.
pub type TriangleIndexArray = IndexArray<3>;
/// Two indices per element.
pub type LineIndexArray = IndexArray<2>;

impl<const N: usize> Default for IndexArray<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> IndexArray<N> {
    /// Bytes per element.
    pub const BYTES_PER_ELEMENT: usize = N * size_of::<u16>();

    /// Empty array.
    #[must_use]
    pub fn new() -> Self {
        Self {
            bytes: Some(Vec::new()),
            length: 0,
        }
    }

    /// Array holding `elements` in order.
    #[must_use]
    pub fn from_elements(elements: &[[u16; N]]) -> Self {
        Self {
            bytes: Some(bytemuck::cast_slice::<[u16; N], u8>(elements).to_vec()),
            length: elements.len(),
        }
    }

    /// Append one element and return its index. Appending to a released
    /// array starts a fresh buffer.
    pub fn emplace_back(&mut self, element: [u16; N]) -> usize {
        if self.bytes.is_none() {
            self.length = 0;
        }
        self.bytes
            .get_or_insert_with(Vec::new)
            .extend_from_slice(bytemuck::bytes_of(&element));
        self.length += 1;
        self.length - 1
    }

    /// Element at `index`, if present and not released.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<[u16; N]> {
        let start = index.checked_mul(Self::BYTES_PER_ELEMENT)?;
        let end = start.checked_add(Self::BYTES_PER_ELEMENT)?;
        let chunk = self.bytes.as_ref()?.get(start..end)?;
        Some(bytemuck::pod_read_unaligned(chunk))
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.length
    }

    /// Whether the array holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Whether the byte storage has been relinquished.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.bytes.is_none()
    }

    /// Move the bytes out into a transferable form, releasing this array.
    pub fn serialize(&mut self) -> SerializedIndexArray {
        SerializedIndexArray {
            bytes: self.bytes.take(),
            length: self.length,
        }
    }

    /// Rebuild an array from its serialized form.
    ///
    /// Returns `None` if the byte count is not `length` whole elements.
    #[must_use]
    pub fn deserialize(serialized: SerializedIndexArray) -> Option<Self> {
        let bytes = serialized.bytes?;
        (bytes.len() == serialized.length * Self::BYTES_PER_ELEMENT).then_some(
            Self {
                bytes: Some(bytes),
                length: serialized.length,
            },
        )
    }
}

impl<const N: usize> IndexSource for IndexArray<N> {
    fn index_bytes(&self) -> Option<&[u8]> {
        self.bytes.as_deref()
    }

    fn release(&mut self) -> Option<Vec<u8>> {
        self.bytes.take()
    }
}

/// Transferable index data: raw bytes plus element count, as handed from
/// a tile worker to the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializedIndexArray {
    /// Packed index bytes, `None` once released.
    pub bytes: Option<Vec<u8>>,
    /// Number of elements.
    pub length: usize,
}

impl IndexSource for SerializedIndexArray {
    fn index_bytes(&self) -> Option<&[u8]> {
        self.bytes.as_deref()
    }

    fn release(&mut self) -> Option<Vec<u8>> {
        self.bytes.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triangle_bytes_are_packed_u16() {
        let array = TriangleIndexArray::from_elements(&[[0, 1, 2]]);
        let mut expected = Vec::new();
        for i in [0u16, 1, 2] {
            expected.extend_from_slice(&i.to_ne_bytes());
        }
        assert_eq!(array.index_bytes(), Some(expected.as_slice()));
        assert_eq!(array.len(), 1);
    }

    #[test]
    fn emplace_back_then_get() {
        let mut lines = LineIndexArray::new();
        assert_eq!(lines.emplace_back([0, 1]), 0);
        assert_eq!(lines.emplace_back([1, 2]), 1);
        assert_eq!(lines.get(1), Some([1, 2]));
        assert_eq!(lines.get(2), None);
        assert_eq!(lines.index_bytes().map(<[u8]>::len), Some(8));
    }

    #[test]
    fn get_far_past_the_end_is_none() {
        let array = TriangleIndexArray::from_elements(&[[0, 1, 2]]);
        assert_eq!(array.get(usize::MAX / 6), None);
        assert_eq!(array.get(usize::MAX), None);
    }

    #[test]
    fn release_relinquishes_bytes() {
        let mut array = TriangleIndexArray::from_elements(&[[0, 1, 2]]);
        let bytes = array.release().unwrap();
        assert_eq!(bytes.len(), 6);
        assert!(array.is_released());
        assert_eq!(array.index_bytes(), None);
        assert_eq!(array.release(), None);
        assert_eq!(array.get(0), None);
    }

    #[test]
    fn serialize_moves_bytes_and_deserializes() {
        let mut array = TriangleIndexArray::from_elements(&[[0, 1, 2], [2, 3, 0]]);
        let serialized = array.serialize();
        assert!(array.is_released());
        assert_eq!(serialized.length, 2);

        let restored = TriangleIndexArray::deserialize(serialized).unwrap();
        assert_eq!(restored.get(1), Some([2, 3, 0]));
    }

    #[test]
    fn deserialize_rejects_ragged_bytes() {
        let serialized = SerializedIndexArray {
            bytes: Some(vec![0; 5]),
            length: 1,
        };
        assert!(TriangleIndexArray::deserialize(serialized).is_none());
    }
}
