//! The shared GPU context: device handle plus binding caches.

use super::binding::Binding;
use super::device::{DeviceError, GpuDevice};
use crate::options::ContextOptions;

/// Owns the graphics device and the cached state of every binding point.
///
/// One context is shared (by `&mut`) between every GPU resource created
/// against it, and must outlive all of them. All binding-point mutations go
/// through [`Context::bind_element_buffer`] and
/// [`Context::bind_vertex_array`]; binding through the raw device instead
/// leaves the cache describing the wrong object.
pub struct Context<D: GpuDevice> {
    device: D,
    element_buffer: Binding<Option<D::Buffer>>,
    vertex_array: Binding<Option<D::VertexArray>>,
    ext_vertex_array_object: bool,
}

impl<D: GpuDevice> Context<D> {
    /// Context with default options.
    #[must_use]
    pub fn new(device: D) -> Self {
        Self::with_options(device, &ContextOptions::default())
    }

    /// Context configured from `options`.
    #[must_use]
    pub fn with_options(device: D, options: &ContextOptions) -> Self {
        let ext_vertex_array_object = device.has_vertex_array_objects()
            && options.use_vertex_array_objects;
        let elide = options.elide_redundant_bindings;
        log::debug!(
            "context '{}': vertex array objects {}, binding elision {}",
            options.label,
            if ext_vertex_array_object { "on" } else { "off" },
            if elide { "on" } else { "off" },
        );
        Self {
            device,
            element_buffer: Binding::new("element buffer", None)
                .with_elision(elide),
            vertex_array: Binding::new("vertex array", None)
                .with_elision(elide),
            ext_vertex_array_object,
        }
    }

    /// The underlying device.
    #[must_use]
    pub fn device(&self) -> &D {
        &self.device
    }

    /// Mutable access to the device, for calls outside binding state
    /// (uploads, draws).
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// Whether vertex array objects are in use on this context.
    #[must_use]
    pub fn has_vertex_array_objects(&self) -> bool {
        self.ext_vertex_array_object
    }

    /// Cached element buffer binding; `None` when the record is unknown.
    #[must_use]
    pub fn element_buffer(&self) -> Option<Option<D::Buffer>> {
        self.element_buffer.recorded()
    }

    /// Cached vertex array binding; `None` when the record is unknown.
    #[must_use]
    pub fn vertex_array(&self) -> Option<Option<D::VertexArray>> {
        self.vertex_array.recorded()
    }

    /// Bind `buffer` to the element binding point unless already bound.
    pub fn bind_element_buffer(&mut self, buffer: Option<D::Buffer>) {
        let device = &mut self.device;
        self.element_buffer
            .set(buffer, |b| device.bind_element_buffer(b));
    }

    /// Make `vao` the active vertex array unless it already is.
    ///
    /// The element binding is part of vertex array state, so switching
    /// vertex arrays leaves the element record unknown.
    pub fn bind_vertex_array(&mut self, vao: Option<D::VertexArray>) {
        let device = &mut self.device;
        let mut switched = false;
        self.vertex_array.set(vao, |v| {
            device.bind_vertex_array(v);
            switched = true;
        });
        if switched && self.ext_vertex_array_object {
            self.element_buffer.invalidate();
        }
    }

    /// Allocate a buffer object on the device.
    ///
    /// # Errors
    ///
    /// Propagates the device's allocation failure.
    pub fn create_buffer(&mut self) -> Result<D::Buffer, DeviceError> {
        self.device.create_buffer()
    }

    /// Delete a buffer object. Deleting a bound buffer unbinds it, and the
    /// element record follows.
    pub fn delete_buffer(&mut self, buffer: D::Buffer) {
        self.device.delete_buffer(buffer);
        self.element_buffer.forget(Some(buffer), None);
    }

    /// Forget every cached binding. Call after anything outside this
    /// context touched binding state (context restore, third-party GL
    /// code).
    pub fn invalidate_bindings(&mut self) {
        self.element_buffer.invalidate();
        self.vertex_array.invalidate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::recording::{DriverCall, RecordingDevice};

    #[test]
    fn redundant_element_bind_issues_one_call() {
        let mut ctx = Context::new(RecordingDevice::new());
        let a = ctx.create_buffer().unwrap();
        let b = ctx.create_buffer().unwrap();
        ctx.device_mut().clear_calls();

        ctx.bind_element_buffer(Some(a));
        ctx.bind_element_buffer(Some(a));
        assert_eq!(ctx.device().calls().len(), 1);
        ctx.bind_element_buffer(Some(b));
        assert_eq!(
            ctx.device().calls(),
            &[
                DriverCall::BindElementBuffer(Some(a)),
                DriverCall::BindElementBuffer(Some(b)),
            ]
        );
    }

    #[test]
    fn vao_support_follows_device_and_options() {
        let ctx = Context::new(RecordingDevice::new());
        assert!(ctx.has_vertex_array_objects());

        let ctx = Context::new(RecordingDevice::without_vertex_array_objects());
        assert!(!ctx.has_vertex_array_objects());

        let options = ContextOptions {
            use_vertex_array_objects: false,
            ..ContextOptions::default()
        };
        let ctx = Context::with_options(RecordingDevice::new(), &options);
        assert!(!ctx.has_vertex_array_objects());
    }

    #[test]
    fn switching_vao_invalidates_element_record() {
        let mut ctx = Context::new(RecordingDevice::new());
        let buffer = ctx.create_buffer().unwrap();
        let vao = ctx.device_mut().create_vertex_array();
        ctx.bind_element_buffer(Some(buffer));

        ctx.bind_vertex_array(Some(vao));
        assert_eq!(ctx.element_buffer(), None);
        assert_eq!(ctx.device().bound_element_buffer(), None);

        ctx.bind_element_buffer(Some(buffer));
        assert_eq!(ctx.element_buffer(), Some(Some(buffer)));
        assert_eq!(ctx.device().bound_element_buffer(), Some(buffer));
    }

    #[test]
    fn rebinding_same_vao_keeps_element_record() {
        let mut ctx = Context::new(RecordingDevice::new());
        let buffer = ctx.create_buffer().unwrap();
        ctx.bind_element_buffer(Some(buffer));
        ctx.bind_vertex_array(None);
        assert_eq!(ctx.element_buffer(), Some(Some(buffer)));
    }

    #[test]
    fn deleting_bound_buffer_clears_record() {
        let mut ctx = Context::new(RecordingDevice::new());
        let buffer = ctx.create_buffer().unwrap();
        ctx.bind_element_buffer(Some(buffer));
        ctx.delete_buffer(buffer);
        assert_eq!(ctx.element_buffer(), Some(None));
        assert_eq!(ctx.device().bound_element_buffer(), None);
    }

    #[test]
    fn disabled_elision_reaches_driver_every_time() {
        let options = ContextOptions {
            elide_redundant_bindings: false,
            ..ContextOptions::default()
        };
        let mut ctx = Context::with_options(RecordingDevice::new(), &options);
        let buffer = ctx.create_buffer().unwrap();
        ctx.device_mut().clear_calls();
        ctx.bind_element_buffer(Some(buffer));
        ctx.bind_element_buffer(Some(buffer));
        assert_eq!(ctx.device().calls().len(), 2);
    }

    #[test]
    fn invalidate_bindings_forces_rebind() {
        let mut ctx = Context::new(RecordingDevice::new());
        let buffer = ctx.create_buffer().unwrap();
        ctx.bind_element_buffer(Some(buffer));
        ctx.invalidate_bindings();
        ctx.device_mut().clear_calls();
        ctx.bind_element_buffer(Some(buffer));
        ctx.bind_vertex_array(None);
        assert_eq!(
            ctx.device().calls(),
            &[
                DriverCall::BindElementBuffer(Some(buffer)),
                DriverCall::BindVertexArray(None),
            ]
        );
    }
}
