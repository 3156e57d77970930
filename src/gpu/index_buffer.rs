//! GPU-resident triangle/line index buffers.
//!
//! Every binding goes through the [`Context`] binding cache. Creation
//! deselects the active vertex array first, because the element binding is
//! part of vertex array state: binding a fresh buffer while some vertex
//! array is active would overwrite that vertex array's index buffer.

use std::fmt;

use super::context::Context;
use super::device::{BufferUsage, DeviceError, GpuDevice};
use crate::index_array::IndexSource;

/// Errors from index buffer operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexBufferError {
    /// The device failed an allocation or upload.
    Device(DeviceError),
    /// The buffer was already destroyed.
    Destroyed,
    /// `update_data` on a buffer created without dynamic draw.
    NotDynamic,
    /// The index source's bytes were already released.
    ReleasedSource,
    /// Replacement data is larger than the buffer's initial allocation.
    Oversized {
        /// Bytes allocated at creation.
        capacity: usize,
        /// Bytes in the replacement.
        requested: usize,
    },
}

impl fmt::Display for IndexBufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Device(e) => write!(f, "device error: {e}"),
            Self::Destroyed => write!(f, "index buffer already destroyed"),
            Self::NotDynamic => {
                write!(f, "update_data requires a dynamic-draw index buffer")
            }
            Self::ReleasedSource => {
                write!(f, "index data was already released")
            }
            Self::Oversized {
                capacity,
                requested,
            } => write!(
                f,
                "replacement of {requested} bytes exceeds buffer capacity of {capacity} bytes"
            ),
        }
    }
}

impl std::error::Error for IndexBufferError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Device(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DeviceError> for IndexBufferError {
    fn from(e: DeviceError) -> Self {
        Self::Device(e)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BufferState<H> {
    Live(H),
    Destroyed,
}

/// One GPU buffer object holding index data.
///
/// The buffer does not hold its context; every operation takes the context
/// that created it.
pub struct IndexBuffer<D: GpuDevice> {
    state: BufferState<D::Buffer>,
    dynamic_draw: bool,
    shadow: Option<Vec<u8>>,
    capacity: usize,
}

impl<D: GpuDevice> IndexBuffer<D> {
    /// Allocate a buffer and upload `array`'s bytes.
    ///
    /// Static buffers take ownership of the array's bytes and drop them
    /// after the upload. Dynamic buffers copy the bytes and keep the copy.
    ///
    /// # Errors
    ///
    /// Returns [`IndexBufferError::ReleasedSource`] if `array` has no bytes
    /// left, or [`IndexBufferError::Device`] if allocation or upload fails.
    pub fn new(
        ctx: &mut Context<D>,
        array: &mut impl IndexSource,
        dynamic_draw: bool,
    ) -> Result<Self, IndexBufferError> {
        if array.index_bytes().is_none() {
            return Err(IndexBufferError::ReleasedSource);
        }
        let handle = ctx.create_buffer()?;

        if ctx.has_vertex_array_objects() {
            ctx.bind_vertex_array(None);
        }
        ctx.bind_element_buffer(Some(handle));

        let usage = BufferUsage::from_dynamic(dynamic_draw);
        let (owned, shadow) = if dynamic_draw {
            (None, array.index_bytes().map(<[u8]>::to_vec))
        } else {
            (array.release(), None)
        };
        let upload = shadow.as_deref().or(owned.as_deref()).unwrap_or_default();
        let capacity = upload.len();

        if let Err(e) = ctx.device_mut().element_buffer_data(upload, usage) {
            ctx.delete_buffer(handle);
            return Err(e.into());
        }
        log::debug!(
            "created index buffer {handle:?}: {capacity} bytes, {usage:?}"
        );

        Ok(Self {
            state: BufferState::Live(handle),
            dynamic_draw,
            shadow,
            capacity,
        })
    }

    /// Make this buffer the element buffer for subsequent draws.
    ///
    /// # Errors
    ///
    /// Returns [`IndexBufferError::Destroyed`] after [`Self::destroy`].
    pub fn bind(&self, ctx: &mut Context<D>) -> Result<(), IndexBufferError> {
        let handle = self.live_handle()?;
        ctx.bind_element_buffer(Some(handle));
        Ok(())
    }

    /// Overwrite the buffer's content in place with `array`'s bytes.
    ///
    /// The handle and GPU allocation are unchanged. The replacement may be
    /// shorter than the original upload but not longer; bytes past its end
    /// keep their previous content, on the GPU and in
    /// [`Self::retained_bytes`]. Like creation, the patch deselects the
    /// active vertex array before binding.
    ///
    /// # Errors
    ///
    /// Returns [`IndexBufferError::NotDynamic`] for static buffers,
    /// [`IndexBufferError::Oversized`] for replacements past capacity,
    /// [`IndexBufferError::Destroyed`] after destruction,
    /// [`IndexBufferError::ReleasedSource`] for a released source, or a
    /// device error from the patch.
    pub fn update_data(
        &mut self,
        ctx: &mut Context<D>,
        array: &impl IndexSource,
    ) -> Result<(), IndexBufferError> {
        let handle = self.live_handle()?;
        if !self.dynamic_draw {
            log::error!("update_data called on static index buffer {handle:?}");
            return Err(IndexBufferError::NotDynamic);
        }
        let bytes = array
            .index_bytes()
            .ok_or(IndexBufferError::ReleasedSource)?;
        if bytes.len() > self.capacity {
            log::error!(
                "index buffer {handle:?}: replacement of {} bytes exceeds capacity {}",
                bytes.len(),
                self.capacity
            );
            return Err(IndexBufferError::Oversized {
                capacity: self.capacity,
                requested: bytes.len(),
            });
        }

        if ctx.has_vertex_array_objects() {
            ctx.bind_vertex_array(None);
        }
        ctx.bind_element_buffer(Some(handle));
        ctx.device_mut().element_buffer_sub_data(0, bytes)?;
        if let Some(prefix) = self
            .shadow
            .as_mut()
            .and_then(|shadow| shadow.get_mut(..bytes.len()))
        {
            prefix.copy_from_slice(bytes);
        }
        Ok(())
    }

    /// Release the GPU buffer. Calling this again is a no-op.
    pub fn destroy(&mut self, ctx: &mut Context<D>) {
        if let BufferState::Live(handle) = self.state {
            ctx.delete_buffer(handle);
            self.state = BufferState::Destroyed;
            self.shadow = None;
            log::debug!("destroyed index buffer {handle:?}");
        }
    }

    /// The GPU handle, or `None` once destroyed.
    #[must_use]
    pub fn handle(&self) -> Option<D::Buffer> {
        match self.state {
            BufferState::Live(handle) => Some(handle),
            BufferState::Destroyed => None,
        }
    }

    /// Whether the buffer was created for in-place updates.
    #[must_use]
    pub fn is_dynamic(&self) -> bool {
        self.dynamic_draw
    }

    /// Whether [`Self::destroy`] has run.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        matches!(self.state, BufferState::Destroyed)
    }

    /// CPU-side copy of the GPU contents. Present only for live dynamic
    /// buffers, and always [`Self::capacity`] bytes long.
    #[must_use]
    pub fn retained_bytes(&self) -> Option<&[u8]> {
        self.shadow.as_deref()
    }

    /// Size of the GPU allocation in bytes.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn live_handle(&self) -> Result<D::Buffer, IndexBufferError> {
        self.handle().ok_or(IndexBufferError::Destroyed)
    }
}

impl<D: GpuDevice> fmt::Debug for IndexBuffer<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexBuffer")
            .field("handle", &self.handle())
            .field("dynamic_draw", &self.dynamic_draw)
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

impl<D: GpuDevice> Drop for IndexBuffer<D> {
    fn drop(&mut self) {
        if let BufferState::Live(handle) = self.state {
            log::warn!(
                "index buffer {handle:?} dropped without destroy(); GPU handle leaked"
            );
        }
    }
}
