//! [`GpuDevice`] backed by wgpu.
//!
//! wgpu has no global binding points: index buffers are passed to each
//! render pass. This device models the element binding point as "the
//! buffer the next upload or draw uses", so the same index buffer code
//! can drive it. Buffer handles are allocated eagerly; the `wgpu::Buffer`
//! itself is created on the first full upload, sized to the data.

use std::convert::Infallible;

use rustc_hash::FxHashMap;
use wgpu::util::DeviceExt;

use super::device::{BufferUsage, DeviceError, GpuDevice};
use crate::error::TileGpuError;
use crate::options::ContextOptions;

/// Buffer handle issued by [`WgpuDevice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WgpuBuffer(u32);

struct Slot {
    buffer: Option<wgpu::Buffer>,
    len: usize,
    // CPU copy of the GPU contents, padded to the copy alignment.
    mirror: Vec<u8>,
}

/// wgpu device and queue with modeled element-buffer binding.
pub struct WgpuDevice {
    device: wgpu::Device,
    queue: wgpu::Queue,
    label: String,
    next_id: u32,
    slots: FxHashMap<WgpuBuffer, Slot>,
    bound: Option<WgpuBuffer>,
}

impl WgpuDevice {
    /// Request a headless adapter and device.
    ///
    /// # Errors
    ///
    /// Returns [`TileGpuError::AdapterRequest`] if no adapter or device is
    /// available.
    pub async fn request(options: &ContextOptions) -> Result<Self, TileGpuError> {
        let instance = wgpu::Instance::default();
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                ..Default::default()
            })
            .await
            .map_err(|e| TileGpuError::AdapterRequest(e.to_string()))?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some(options.label.as_str()),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults(),
                ..Default::default()
            })
            .await
            .map_err(|e| TileGpuError::AdapterRequest(e.to_string()))?;

        log::info!("opened wgpu adapter: {}", adapter.get_info().name);
        Ok(Self::from_device(device, queue, &options.label))
    }

    /// Wrap an externally-owned device and queue.
    #[must_use]
    pub fn from_device(
        device: wgpu::Device,
        queue: wgpu::Queue,
        label: &str,
    ) -> Self {
        Self {
            device,
            queue,
            label: label.to_owned(),
            next_id: 0,
            slots: FxHashMap::default(),
            bound: None,
        }
    }

    /// The wgpu buffer behind `handle`, once data has been uploaded.
    #[must_use]
    pub fn index_buffer(&self, handle: WgpuBuffer) -> Option<&wgpu::Buffer> {
        self.slots.get(&handle).and_then(|slot| slot.buffer.as_ref())
    }

    /// The wgpu buffer currently at the element binding point, for
    /// `RenderPass::set_index_buffer`.
    #[must_use]
    pub fn bound_index_buffer(&self) -> Option<&wgpu::Buffer> {
        self.bound.and_then(|handle| self.index_buffer(handle))
    }

    /// Index format of the buffers this device holds.
    #[must_use]
    pub fn index_format(&self) -> wgpu::IndexFormat {
        wgpu::IndexFormat::Uint16
    }

    /// Flush queued uploads to the GPU.
    pub fn submit(&self) {
        let _ = self.queue.submit(std::iter::empty());
    }

    fn bound_handle(&self) -> Result<WgpuBuffer, DeviceError> {
        self.bound
            .filter(|handle| self.slots.contains_key(handle))
            .ok_or(DeviceError::NothingBound)
    }
}

const ALIGN: usize = wgpu::COPY_BUFFER_ALIGNMENT as usize;

/// Pad `data` to the copy alignment required by `Queue::write_buffer`.
fn aligned(data: &[u8]) -> Vec<u8> {
    let mut padded = data.to_vec();
    padded.resize(data.len().next_multiple_of(ALIGN), 0);
    padded
}

/// Write `data` into `mirror` at `offset` and return the aligned range of
/// `mirror` covering it. Padding comes from the bytes already in `mirror`,
/// so a patch that ends mid-word leaves its neighbours intact.
///
/// `offset` must be aligned and `mirror` at least
/// `(offset + data.len())` rounded up to the alignment.
fn patch_mirror<'a>(
    mirror: &'a mut [u8],
    offset: usize,
    data: &[u8],
) -> Option<&'a [u8]> {
    let end = offset.checked_add(data.len())?;
    let padded_end = end.next_multiple_of(ALIGN);
    mirror.get_mut(offset..end)?.copy_from_slice(data);
    mirror.get(offset..padded_end)
}

impl GpuDevice for WgpuDevice {
    type Buffer = WgpuBuffer;
    type VertexArray = Infallible;

    fn create_buffer(&mut self) -> Result<WgpuBuffer, DeviceError> {
        self.next_id += 1;
        let handle = WgpuBuffer(self.next_id);
        let _ = self.slots.insert(
            handle,
            Slot {
                buffer: None,
                len: 0,
                mirror: Vec::new(),
            },
        );
        Ok(handle)
    }

    fn delete_buffer(&mut self, buffer: WgpuBuffer) {
        if let Some(slot) = self.slots.remove(&buffer) {
            if let Some(gpu) = slot.buffer {
                gpu.destroy();
            }
        }
        if self.bound == Some(buffer) {
            self.bound = None;
        }
    }

    fn bind_element_buffer(&mut self, buffer: Option<WgpuBuffer>) {
        self.bound = buffer;
    }

    fn bind_vertex_array(&mut self, _vao: Option<Infallible>) {}

    fn element_buffer_data(
        &mut self,
        data: &[u8],
        usage: BufferUsage,
    ) -> Result<(), DeviceError> {
        let handle = self.bound_handle()?;
        let label = format!("{} index buffer ({usage:?})", self.label);
        let mirror = aligned(data);
        let gpu = self.device.create_buffer_init(
            &wgpu::util::BufferInitDescriptor {
                label: Some(label.as_str()),
                contents: &mirror,
                usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
            },
        );
        let slot = self
            .slots
            .get_mut(&handle)
            .ok_or(DeviceError::NothingBound)?;
        if let Some(old) = slot.buffer.replace(gpu) {
            old.destroy();
        }
        slot.len = data.len();
        slot.mirror = mirror;
        Ok(())
    }

    fn element_buffer_sub_data(
        &mut self,
        offset: usize,
        data: &[u8],
    ) -> Result<(), DeviceError> {
        let handle = self.bound_handle()?;
        let slot = self
            .slots
            .get_mut(&handle)
            .ok_or(DeviceError::NothingBound)?;
        let size = slot.len;
        let out_of_bounds = DeviceError::OutOfBounds {
            offset,
            len: data.len(),
            size,
        };
        let in_bounds =
            matches!(offset.checked_add(data.len()), Some(end) if end <= size);
        if !in_bounds || offset % ALIGN != 0 {
            return Err(out_of_bounds);
        }
        let gpu = slot.buffer.as_ref().ok_or(DeviceError::NothingBound)?;
        let words =
            patch_mirror(&mut slot.mirror, offset, data).ok_or(out_of_bounds)?;
        self.queue.write_buffer(gpu, offset as u64, words);
        Ok(())
    }

    fn has_vertex_array_objects(&self) -> bool {
        false
    }
}
