//! In-memory device that records every driver call.
//!
//! Stands in for a real GPU in tests and benches. Element buffer bindings
//! are tracked per vertex array, the way GL does it, so tests can observe
//! the corruption a missing vertex-array deselect would cause.

use rustc_hash::FxHashMap;

use super::device::{BufferUsage, DeviceError, GpuDevice};

/// Buffer handle issued by [`RecordingDevice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordedBuffer(pub u32);

/// Vertex array handle issued by [`RecordingDevice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordedVertexArray(pub u32);

/// One driver call as seen by the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverCall {
    /// A buffer object was allocated.
    CreateBuffer(RecordedBuffer),
    /// A buffer object was released.
    DeleteBuffer(RecordedBuffer),
    /// The element binding point was set.
    BindElementBuffer(Option<RecordedBuffer>),
    /// The active vertex array was set.
    BindVertexArray(Option<RecordedVertexArray>),
    /// Full upload into the bound element buffer.
    BufferData {
        /// Buffer that received the upload.
        buffer: RecordedBuffer,
        /// Uploaded bytes.
        bytes: Vec<u8>,
        /// Usage hint passed with the upload.
        usage: BufferUsage,
    },
    /// Patch of the bound element buffer.
    BufferSubData {
        /// Buffer that received the patch.
        buffer: RecordedBuffer,
        /// Byte offset of the patch.
        offset: usize,
        /// Patched bytes.
        bytes: Vec<u8>,
    },
}

/// Fake [`GpuDevice`] with call recording and fault injection.
#[derive(Debug, Default)]
pub struct RecordingDevice {
    next_id: u32,
    contents: FxHashMap<RecordedBuffer, Vec<u8>>,
    element_bindings: FxHashMap<Option<RecordedVertexArray>, RecordedBuffer>,
    current_vao: Option<RecordedVertexArray>,
    no_vertex_array_objects: bool,
    fail_next_allocation: Option<String>,
    context_lost: bool,
    calls: Vec<DriverCall>,
}

impl RecordingDevice {
    /// Device that supports vertex array objects.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Device without vertex array object support. The element binding is
    /// then a single global binding point.
    #[must_use]
    pub fn without_vertex_array_objects() -> Self {
        Self {
            no_vertex_array_objects: true,
            ..Self::default()
        }
    }

    /// Allocate a vertex array handle. Not a recorded call; vertex array
    /// setup is owned by the renderer.
    pub fn create_vertex_array(&mut self) -> RecordedVertexArray {
        RecordedVertexArray(self.next_handle())
    }

    /// Make the next [`GpuDevice::create_buffer`] fail with `reason`.
    pub fn fail_next_allocation(&mut self, reason: &str) {
        self.fail_next_allocation = Some(reason.to_owned());
    }

    /// Simulate context loss. Every later allocation and upload fails.
    pub fn lose_context(&mut self) {
        self.context_lost = true;
    }

    /// Calls recorded since creation or the last [`Self::clear_calls`].
    #[must_use]
    pub fn calls(&self) -> &[DriverCall] {
        &self.calls
    }

    /// Drop the recorded call log.
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Take the recorded call log, leaving it empty.
    pub fn take_calls(&mut self) -> Vec<DriverCall> {
        std::mem::take(&mut self.calls)
    }

    /// The buffer really bound to the element binding point of the active
    /// vertex array.
    #[must_use]
    pub fn bound_element_buffer(&self) -> Option<RecordedBuffer> {
        self.element_bindings.get(&self.binding_key()).copied()
    }

    /// The element buffer captured by `vao` (or the default vertex array).
    #[must_use]
    pub fn element_buffer_of(
        &self,
        vao: Option<RecordedVertexArray>,
    ) -> Option<RecordedBuffer> {
        self.element_bindings.get(&vao).copied()
    }

    /// The active vertex array.
    #[must_use]
    pub fn bound_vertex_array(&self) -> Option<RecordedVertexArray> {
        self.current_vao
    }

    /// GPU-side bytes of a live buffer.
    #[must_use]
    pub fn buffer_contents(&self, buffer: RecordedBuffer) -> Option<&[u8]> {
        self.contents.get(&buffer).map(Vec::as_slice)
    }

    /// Whether `buffer` has been created and not yet deleted.
    #[must_use]
    pub fn is_live(&self, buffer: RecordedBuffer) -> bool {
        self.contents.contains_key(&buffer)
    }

    /// Number of live buffer objects.
    #[must_use]
    pub fn live_buffer_count(&self) -> usize {
        self.contents.len()
    }

    fn next_handle(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    fn binding_key(&self) -> Option<RecordedVertexArray> {
        if self.no_vertex_array_objects {
            None
        } else {
            self.current_vao
        }
    }

    fn bound_for_upload(&self) -> Result<RecordedBuffer, DeviceError> {
        if self.context_lost {
            return Err(DeviceError::ContextLost);
        }
        self.bound_element_buffer()
            .filter(|b| self.contents.contains_key(b))
            .ok_or(DeviceError::NothingBound)
    }
}

impl GpuDevice for RecordingDevice {
    type Buffer = RecordedBuffer;
    type VertexArray = RecordedVertexArray;

    fn create_buffer(&mut self) -> Result<RecordedBuffer, DeviceError> {
        if self.context_lost {
            return Err(DeviceError::ContextLost);
        }
        if let Some(reason) = self.fail_next_allocation.take() {
            return Err(DeviceError::AllocationFailed(reason));
        }
        let buffer = RecordedBuffer(self.next_handle());
        let _ = self.contents.insert(buffer, Vec::new());
        self.calls.push(DriverCall::CreateBuffer(buffer));
        Ok(buffer)
    }

    fn delete_buffer(&mut self, buffer: RecordedBuffer) {
        let _ = self.contents.remove(&buffer);
        let key = self.binding_key();
        if self.element_bindings.get(&key) == Some(&buffer) {
            let _ = self.element_bindings.remove(&key);
        }
        self.calls.push(DriverCall::DeleteBuffer(buffer));
    }

    fn bind_element_buffer(&mut self, buffer: Option<RecordedBuffer>) {
        let key = self.binding_key();
        match buffer {
            Some(b) => {
                let _ = self.element_bindings.insert(key, b);
            }
            None => {
                let _ = self.element_bindings.remove(&key);
            }
        }
        self.calls.push(DriverCall::BindElementBuffer(buffer));
    }

    fn bind_vertex_array(&mut self, vao: Option<RecordedVertexArray>) {
        self.current_vao = vao;
        self.calls.push(DriverCall::BindVertexArray(vao));
    }

    fn element_buffer_data(
        &mut self,
        data: &[u8],
        usage: BufferUsage,
    ) -> Result<(), DeviceError> {
        let buffer = self.bound_for_upload()?;
        let _ = self.contents.insert(buffer, data.to_vec());
        self.calls.push(DriverCall::BufferData {
            buffer,
            bytes: data.to_vec(),
            usage,
        });
        Ok(())
    }

    fn element_buffer_sub_data(
        &mut self,
        offset: usize,
        data: &[u8],
    ) -> Result<(), DeviceError> {
        let buffer = self.bound_for_upload()?;
        let contents = self
            .contents
            .get_mut(&buffer)
            .ok_or(DeviceError::NothingBound)?;
        let end = offset + data.len();
        if end > contents.len() {
            return Err(DeviceError::OutOfBounds {
                offset,
                len: data.len(),
                size: contents.len(),
            });
        }
        contents[offset..end].copy_from_slice(data);
        self.calls.push(DriverCall::BufferSubData {
            buffer,
            offset,
            bytes: data.to_vec(),
        });
        Ok(())
    }

    fn has_vertex_array_objects(&self) -> bool {
        !self.no_vertex_array_objects
    }
}
