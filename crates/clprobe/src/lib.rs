//! Capability introspection for OpenCL platforms, devices, contexts and
//! programs.
//!
//! Every entity kind owns a fixed table of capability descriptors. A
//! `describe_*` call walks that table in order, queries each property through
//! the driver and writes one `<indent><NAME>: <value>` line per descriptor.
//! A failing property prints a diagnostic in place of its value and the walk
//! carries on; the last error seen is handed back to the caller.

// ─── Module ───────────────────────────────────────────────────────────
pub mod config;
pub mod consts;
pub mod decoder;
pub mod kernel;
pub mod prefix_sum;
pub mod probe;
pub mod registry;
pub mod source;

pub use config::{init_tracing, ProbeConfig};
pub use decoder::{Decoder, Flag, Number, Scalar, Variant};
pub use registry::{
    describe, describe_context, describe_device, describe_platform, describe_program,
    describe_program_build, Capability, CONTEXT_CAPABILITIES, DEVICE_CAPABILITIES,
    PLATFORM_CAPABILITIES, PROGRAM_BUILD_CAPABILITIES, PROGRAM_CAPABILITIES,
};
pub use source::{
    ContextSource, DeviceSource, InfoSource, PlatformSource, ProgramBuildSource, ProgramSource,
};

use consts::{CL_INVALID_VALUE, CL_OUT_OF_HOST_MEMORY};
use opencl3::types::{cl_int, cl_uint};

// ─── Fehler‑Typ & cl_try! ─────────────────────────────────────────────
#[derive(thiserror::Error, Debug)]
pub enum ClError {
    /// Non-success status returned by the driver.
    #[error("OpenCL API error: {0}")]
    Api(cl_int),
    /// A size or count query succeeded but reported less than one.
    #[error("invalid size {size} reported for property {param:#06x}")]
    InvalidSize { param: cl_uint, size: usize },
    #[error("failed to allocate host buffer")]
    OutOfHostMemory,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("configuration error: {0}")]
    Config(String),
}

impl ClError {
    /// Driver-style status code for this error.
    pub fn code(&self) -> cl_int {
        match self {
            ClError::Api(code) => *code,
            ClError::OutOfHostMemory => CL_OUT_OF_HOST_MEMORY,
            ClError::InvalidSize { .. } | ClError::Io(_) | ClError::Config(_) => CL_INVALID_VALUE,
        }
    }
}

/// Makro: wandelt cl_int in Result
macro_rules! cl_try {
    ($expr:expr) => {
        let err = unsafe { $expr };
        if err != 0 {
            return Err(crate::ClError::Api(err));
        }
    };
}
pub(crate) use cl_try;

impl From<opencl3::error_codes::ClError> for ClError {
    #[inline]
    fn from(err: opencl3::error_codes::ClError) -> Self {
        ClError::Api(err.0)
    }
}

impl From<i32> for ClError {
    #[inline]
    fn from(code: i32) -> Self {
        ClError::Api(code)
    }
}
