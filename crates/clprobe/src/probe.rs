//! Platform and device enumeration.

use crate::consts::{CL_DEVICE_NOT_FOUND, CL_INVALID_PLATFORM};
use crate::registry::{describe_device, describe_platform};
use crate::ClError;
use opencl3::context::Context;
use opencl3::device::Device;
use opencl3::platform::{get_platforms, Platform};
use opencl3::types::cl_device_type;
use std::ffi::{c_char, c_void, CStr};
use std::io::Write;
use std::ptr;
use tracing::{info, warn};

/// All platforms of the installed ICDs. No platform at all is an error.
pub fn platforms() -> Result<Vec<Platform>, ClError> {
    let platforms = get_platforms()?;
    if platforms.is_empty() {
        return Err(ClError::Api(CL_INVALID_PLATFORM));
    }
    info!(count = platforms.len(), "found platform(s)");
    Ok(platforms)
}

/// Devices of `platform` matching `device_type`. No device is an error.
pub fn devices(platform: &Platform, device_type: cl_device_type) -> Result<Vec<Device>, ClError> {
    let ids = platform.get_devices(device_type)?;
    if ids.is_empty() {
        return Err(ClError::Api(CL_DEVICE_NOT_FOUND));
    }
    info!(count = ids.len(), "found device(s)");
    Ok(ids.into_iter().map(Device::new).collect())
}

pub fn first_platform() -> Result<Platform, ClError> {
    Ok(platforms()?.remove(0))
}

pub fn first_device(platform: &Platform, device_type: cl_device_type) -> Result<Device, ClError> {
    Ok(devices(platform, device_type)?.remove(0))
}

/// Picks the first platform and its first matching device and reports both
/// to `out`. An incomplete report is logged, not fatal.
pub fn select_first<W: Write + ?Sized>(
    device_type: cl_device_type,
    indent: u32,
    out: &mut W,
) -> Result<(Platform, Device), ClError> {
    let platform = first_platform()?;
    writeln!(out, "Selected Platform:")?;
    report(describe_platform(&platform, indent, out))?;
    writeln!(out)?;

    let device = first_device(&platform, device_type)?;
    writeln!(out, "Selected Device:")?;
    report(describe_device(&device, indent, out))?;
    writeln!(out)?;

    Ok((platform, device))
}

/// Context on `device` whose asynchronous driver errors go to the log.
pub fn create_context(device: &Device) -> Result<Context, ClError> {
    let context = Context::from_devices(&[device.id()], &[], Some(context_notify), ptr::null_mut())?;
    info!("created context");
    Ok(context)
}

/// Driver error callback; may run on a driver thread.
extern "C" fn context_notify(
    errinfo: *const c_char,
    _private_info: *const c_void,
    _cb: usize,
    _user_data: *mut c_void,
) {
    let message = if errinfo.is_null() {
        None
    } else {
        // the driver passes a NUL-terminated string that lives for the call
        Some(unsafe { CStr::from_ptr(errinfo) }.to_string_lossy())
    };
    warn!(message = message.as_deref().unwrap_or("<none>"), "context error");
}

/// Only output failures abort a selection report.
pub(crate) fn report(result: Result<(), ClError>) -> Result<(), ClError> {
    match result {
        Err(ClError::Io(err)) => Err(ClError::Io(err)),
        Err(err) => {
            warn!(error = %err, "incomplete capability report");
            Ok(())
        }
        Ok(()) => Ok(()),
    }
}
