//! Query-by-identifier access to driver objects.
//!
//! Every `clGet*Info` entry point has the same shape: pass a parameter
//! identifier and either no buffer (to learn the required byte size) or a
//! buffer to fill. [`InfoSource`] is that shape, implemented once per entity
//! kind on top of the raw `cl-sys` bindings.

use crate::{cl_try, ClError};
use opencl3::{context::Context, device::Device, platform::Platform, program::Program};
use opencl3::types::cl_uint;
use std::ptr;

/// Something that answers capability queries.
///
/// `value == None` asks only for the size of the property in bytes.
/// `value == Some(buf)` fills `buf`, which must be at least that large.
/// The returned `usize` is the size the driver reports for the property.
pub trait InfoSource {
    fn query(&self, param: cl_uint, value: Option<&mut [u8]>) -> Result<usize, ClError>;
}

/// Splits an optional output buffer into the (size, pointer) pair the C API
/// expects.
#[inline]
fn raw_parts(value: Option<&mut [u8]>) -> (usize, *mut cl_sys::c_void) {
    match value {
        Some(buf) => (buf.len(), buf.as_mut_ptr().cast()),
        None => (0, ptr::null_mut()),
    }
}

// ─── Platform ─────────────────────────────────────────────────────────
pub struct PlatformSource(cl_sys::cl_platform_id);

impl PlatformSource {
    pub fn new(platform: &Platform) -> Self {
        Self(platform.id().cast())
    }
}

impl InfoSource for PlatformSource {
    fn query(&self, param: cl_uint, value: Option<&mut [u8]>) -> Result<usize, ClError> {
        let (len, data) = raw_parts(value);
        let mut size_ret = 0usize;
        // Safety: `data` is null or points to `len` writable bytes.
        cl_try!(cl_sys::clGetPlatformInfo(self.0, param, len, data, &mut size_ret));
        Ok(size_ret)
    }
}

// ─── Device ───────────────────────────────────────────────────────────
pub struct DeviceSource(cl_sys::cl_device_id);

impl DeviceSource {
    pub fn new(device: &Device) -> Self {
        Self(device.id().cast())
    }
}

impl InfoSource for DeviceSource {
    fn query(&self, param: cl_uint, value: Option<&mut [u8]>) -> Result<usize, ClError> {
        let (len, data) = raw_parts(value);
        let mut size_ret = 0usize;
        cl_try!(cl_sys::clGetDeviceInfo(self.0, param, len, data, &mut size_ret));
        Ok(size_ret)
    }
}

// ─── Context ──────────────────────────────────────────────────────────
pub struct ContextSource(cl_sys::cl_context);

impl ContextSource {
    pub fn new(context: &Context) -> Self {
        Self(context.get().cast())
    }
}

impl InfoSource for ContextSource {
    fn query(&self, param: cl_uint, value: Option<&mut [u8]>) -> Result<usize, ClError> {
        let (len, data) = raw_parts(value);
        let mut size_ret = 0usize;
        cl_try!(cl_sys::clGetContextInfo(self.0, param, len, data, &mut size_ret));
        Ok(size_ret)
    }
}

// ─── Program ──────────────────────────────────────────────────────────
pub struct ProgramSource(cl_sys::cl_program);

impl ProgramSource {
    pub fn new(program: &Program) -> Self {
        Self(program.get().cast())
    }
}

impl InfoSource for ProgramSource {
    fn query(&self, param: cl_uint, value: Option<&mut [u8]>) -> Result<usize, ClError> {
        let (len, data) = raw_parts(value);
        let mut size_ret = 0usize;
        cl_try!(cl_sys::clGetProgramInfo(self.0, param, len, data, &mut size_ret));
        Ok(size_ret)
    }
}

// ─── Program build (relative to one device) ───────────────────────────
pub struct ProgramBuildSource {
    program: cl_sys::cl_program,
    device: cl_sys::cl_device_id,
}

impl ProgramBuildSource {
    pub fn new(program: &Program, device: &Device) -> Self {
        Self {
            program: program.get().cast(),
            device: device.id().cast(),
        }
    }
}

impl InfoSource for ProgramBuildSource {
    fn query(&self, param: cl_uint, value: Option<&mut [u8]>) -> Result<usize, ClError> {
        let (len, data) = raw_parts(value);
        let mut size_ret = 0usize;
        cl_try!(cl_sys::clGetProgramBuildInfo(
            self.program,
            self.device,
            param,
            len,
            data,
            &mut size_ret
        ));
        Ok(size_ret)
    }
}
