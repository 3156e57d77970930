//! Driver-level primitives consumed by the binding cache and index buffers.

use std::fmt;

/// Errors raised by the underlying graphics device.
///
/// These are fatal to the current rendering session; nothing in this crate
/// retries them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// The driver refused to allocate a new buffer object.
    AllocationFailed(String),
    /// The device was lost (GPU reset, context loss).
    ContextLost,
    /// An upload targeted the element binding point while nothing was bound.
    NothingBound,
    /// The driver reported an error code with no more specific variant,
    /// e.g. `GL_INVALID_VALUE`.
    Driver(u32),
    /// A patch would write past the end of the bound buffer.
    OutOfBounds {
        /// Byte offset of the patch.
        offset: usize,
        /// Byte length of the patch.
        len: usize,
        /// Size of the bound buffer in bytes.
        size: usize,
    },
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllocationFailed(msg) => {
                write!(f, "buffer allocation failed: {msg}")
            }
            Self::ContextLost => write!(f, "graphics context lost"),
            Self::NothingBound => {
                write!(f, "no buffer bound to the element binding point")
            }
            Self::Driver(code) => write!(f, "driver error 0x{code:04x}"),
            Self::OutOfBounds { offset, len, size } => write!(
                f,
                "patch of {len} bytes at offset {offset} exceeds buffer size {size}"
            ),
        }
    }
}

impl std::error::Error for DeviceError {}

/// Usage hint attached to an upload. Purely a performance hint for the
/// driver; both classes accept later patches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferUsage {
    /// Content is uploaded once and never rewritten.
    StaticDraw,
    /// Content is rewritten in place over the buffer's lifetime.
    DynamicDraw,
}

impl BufferUsage {
    /// Usage class for the given dynamic-draw flag.
    #[must_use]
    pub const fn from_dynamic(dynamic_draw: bool) -> Self {
        if dynamic_draw {
            Self::DynamicDraw
        } else {
            Self::StaticDraw
        }
    }
}

/// A graphics device exposing immediate-mode buffer binding.
///
/// Implementations issue the driver call unconditionally; deduplication is
/// the job of [`crate::gpu::Context`]. Code that holds a `Context` must not
/// call the binding methods here directly, or the cached binding records
/// drift from the real driver state.
pub trait GpuDevice {
    /// Opaque buffer object handle.
    type Buffer: Copy + Eq + fmt::Debug;
    /// Opaque vertex array object handle.
    type VertexArray: Copy + Eq + fmt::Debug;

    /// Allocate a new, empty buffer object.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError`] if the driver cannot allocate or the context
    /// is lost.
    fn create_buffer(&mut self) -> Result<Self::Buffer, DeviceError>;

    /// Release a buffer object. If it is currently bound, the driver unbinds
    /// it.
    fn delete_buffer(&mut self, buffer: Self::Buffer);

    /// Bind `buffer` (or nothing) to the element/index binding point.
    fn bind_element_buffer(&mut self, buffer: Option<Self::Buffer>);

    /// Bind `vao` (or the default vertex array) as the active vertex array.
    fn bind_vertex_array(&mut self, vao: Option<Self::VertexArray>);

    /// Replace the full content of the bound element buffer.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError`] if nothing is bound or the context is lost.
    fn element_buffer_data(
        &mut self,
        data: &[u8],
        usage: BufferUsage,
    ) -> Result<(), DeviceError>;

    /// Overwrite bytes of the bound element buffer starting at `offset`,
    /// without reallocating it.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError`] if nothing is bound or the context is lost.
    fn element_buffer_sub_data(
        &mut self,
        offset: usize,
        data: &[u8],
    ) -> Result<(), DeviceError>;

    /// Whether the vertex array object extension (or core feature) is
    /// available.
    fn has_vertex_array_objects(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_follows_dynamic_flag() {
        assert_eq!(BufferUsage::from_dynamic(false), BufferUsage::StaticDraw);
        assert_eq!(BufferUsage::from_dynamic(true), BufferUsage::DynamicDraw);
    }

    #[test]
    fn driver_error_shows_hex_code() {
        assert_eq!(DeviceError::Driver(0x0501).to_string(), "driver error 0x0501");
    }
}
