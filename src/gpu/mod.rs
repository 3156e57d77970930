//! GPU resource management.
//!
//! A [`Context`] owns a [`GpuDevice`] and caches binding-point state;
//! [`IndexBuffer`] builds the index buffer lifecycle on top of it.

/// Cached state of a single binding point.
pub mod binding;
/// Shared device handle plus binding caches.
pub mod context;
/// Driver primitives and device errors.
pub mod device;
/// OpenGL / WebGL device via glow.
#[cfg(feature = "glow")]
pub mod glow_device;
/// Index buffer lifecycle.
pub mod index_buffer;
/// Call-recording fake device for tests.
pub mod recording;
/// wgpu-backed device.
pub mod wgpu_device;

pub use binding::Binding;
pub use context::Context;
pub use device::{BufferUsage, DeviceError, GpuDevice};
pub use index_buffer::{IndexBuffer, IndexBufferError};
