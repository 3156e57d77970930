//! [`GpuDevice`] backed by OpenGL / WebGL through glow.

use std::rc::Rc;

use glow::HasContext;

use super::device::{BufferUsage, DeviceError, GpuDevice};

type GlBuffer = <glow::Context as HasContext>::Buffer;
type GlVertexArray = <glow::Context as HasContext>::VertexArray;

/// A shared glow context.
pub struct GlowDevice {
    gl: Rc<glow::Context>,
    vertex_array_objects: bool,
}

impl GlowDevice {
    /// Wrap `gl`, detecting vertex array object support from the context
    /// version or the `OES_vertex_array_object` / `ARB_vertex_array_object`
    /// extensions.
    #[must_use]
    pub fn new(gl: Rc<glow::Context>) -> Self {
        let version = gl.version();
        let extensions = gl.supported_extensions();
        let vertex_array_objects = version.major >= 3
            || extensions.contains("OES_vertex_array_object")
            || extensions.contains("GL_OES_vertex_array_object")
            || extensions.contains("GL_ARB_vertex_array_object");
        log::debug!(
            "glow context {}.{}: vertex array objects {}",
            version.major,
            version.minor,
            if vertex_array_objects { "available" } else { "unavailable" },
        );
        Self {
            gl,
            vertex_array_objects,
        }
    }

    /// The wrapped context, for draw calls and state this crate does not
    /// cache.
    #[must_use]
    pub fn gl(&self) -> &glow::Context {
        &self.gl
    }

    /// Discard errors left behind by earlier calls outside this device.
    fn drain_errors(&self) {
        for _ in 0..MAX_STALE_ERRORS {
            let code = unsafe { self.gl.get_error() };
            if code == glow::NO_ERROR {
                return;
            }
            log::warn!("discarding stale GL error 0x{code:04x}");
        }
    }

    fn check_error(&self) -> Result<(), DeviceError> {
        gl_error(unsafe { self.gl.get_error() })
    }
}

// GL keeps at most one pending flag per error code.
const MAX_STALE_ERRORS: usize = 8;

fn gl_error(code: u32) -> Result<(), DeviceError> {
    match code {
        glow::NO_ERROR => Ok(()),
        glow::OUT_OF_MEMORY => Err(DeviceError::AllocationFailed(
            "GL_OUT_OF_MEMORY".to_owned(),
        )),
        glow::INVALID_OPERATION => Err(DeviceError::NothingBound),
        glow::CONTEXT_LOST => Err(DeviceError::ContextLost),
        code => Err(DeviceError::Driver(code)),
    }
}

const fn gl_usage(usage: BufferUsage) -> u32 {
    match usage {
        BufferUsage::StaticDraw => glow::STATIC_DRAW,
        BufferUsage::DynamicDraw => glow::DYNAMIC_DRAW,
    }
}

impl GpuDevice for GlowDevice {
    type Buffer = GlBuffer;
    type VertexArray = GlVertexArray;

    fn create_buffer(&mut self) -> Result<GlBuffer, DeviceError> {
        unsafe { self.gl.create_buffer() }.map_err(DeviceError::AllocationFailed)
    }

    fn delete_buffer(&mut self, buffer: GlBuffer) {
        unsafe { self.gl.delete_buffer(buffer) };
    }

    fn bind_element_buffer(&mut self, buffer: Option<GlBuffer>) {
        unsafe { self.gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, buffer) };
    }

    fn bind_vertex_array(&mut self, vao: Option<GlVertexArray>) {
        unsafe { self.gl.bind_vertex_array(vao) };
    }

    fn element_buffer_data(
        &mut self,
        data: &[u8],
        usage: BufferUsage,
    ) -> Result<(), DeviceError> {
        self.drain_errors();
        unsafe {
            self.gl.buffer_data_u8_slice(
                glow::ELEMENT_ARRAY_BUFFER,
                data,
                gl_usage(usage),
            );
        }
        self.check_error()
    }

    fn element_buffer_sub_data(
        &mut self,
        offset: usize,
        data: &[u8],
    ) -> Result<(), DeviceError> {
        self.drain_errors();
        unsafe {
            self.gl.buffer_sub_data_u8_slice(
                glow::ELEMENT_ARRAY_BUFFER,
                offset as i32,
                data,
            );
        }
        self.check_error()
    }

    fn has_vertex_array_objects(&self) -> bool {
        self.vertex_array_objects
    }
}
