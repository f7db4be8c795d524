// Scripted in-memory driver for the registry tests.
#![allow(dead_code)]

use clprobe::consts::CL_INVALID_VALUE;
use clprobe::{ClError, InfoSource};
use std::cell::RefCell;
use std::collections::HashMap;

/// One recorded query: which property and whether a buffer was passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Call {
    pub param: u32,
    pub fetch: bool,
}

#[derive(Default)]
pub struct MockSource {
    replies: HashMap<u32, Result<Vec<u8>, i32>>,
    calls: RefCell<Vec<Call>>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bytes(mut self, param: u32, bytes: Vec<u8>) -> Self {
        self.replies.insert(param, Ok(bytes));
        self
    }

    /// NUL-terminated string, the way the driver hands it out.
    pub fn text(self, param: u32, value: &str) -> Self {
        let mut bytes = value.as_bytes().to_vec();
        bytes.push(0);
        self.bytes(param, bytes)
    }

    pub fn u32(self, param: u32, value: u32) -> Self {
        self.bytes(param, value.to_ne_bytes().to_vec())
    }

    pub fn i32(self, param: u32, value: i32) -> Self {
        self.bytes(param, value.to_ne_bytes().to_vec())
    }

    pub fn u64(self, param: u32, value: u64) -> Self {
        self.bytes(param, value.to_ne_bytes().to_vec())
    }

    pub fn size(self, param: u32, value: usize) -> Self {
        self.bytes(param, value.to_ne_bytes().to_vec())
    }

    pub fn sizes(self, param: u32, values: &[usize]) -> Self {
        let bytes = values.iter().flat_map(|v| v.to_ne_bytes()).collect();
        self.bytes(param, bytes)
    }

    pub fn fail(mut self, param: u32, code: i32) -> Self {
        self.replies.insert(param, Err(code));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn calls_for(&self, param: u32) -> Vec<Call> {
        self.calls().into_iter().filter(|c| c.param == param).collect()
    }
}

impl InfoSource for MockSource {
    fn query(&self, param: u32, value: Option<&mut [u8]>) -> Result<usize, ClError> {
        self.calls.borrow_mut().push(Call { param, fetch: value.is_some() });
        let bytes = match self.replies.get(&param) {
            Some(Ok(bytes)) => bytes,
            Some(Err(code)) => return Err(ClError::Api(*code)),
            None => return Err(ClError::Api(CL_INVALID_VALUE)),
        };
        if let Some(buf) = value {
            // the driver rejects buffers that are too small
            if buf.len() < bytes.len() {
                return Err(ClError::Api(CL_INVALID_VALUE));
            }
            buf[..bytes.len()].copy_from_slice(bytes);
        }
        Ok(bytes.len())
    }
}

/// Output of one `describe` call as raw bytes.
pub fn render_bytes(
    table: &[clprobe::Capability],
    source: &MockSource,
    indent: u32,
) -> (Vec<u8>, Result<(), ClError>) {
    let mut out = Vec::new();
    let result = clprobe::describe(table, source, indent, &mut out);
    (out, result)
}

/// Output of one `describe` call as text.
pub fn render(
    table: &[clprobe::Capability],
    source: &MockSource,
    indent: u32,
) -> (String, Result<(), ClError>) {
    let (out, result) = render_bytes(table, source, indent);
    (String::from_utf8(out).unwrap(), result)
}

/// A device that answers every row of the device table.
pub fn healthy_device() -> MockSource {
    use clprobe::consts::*;
    MockSource::new()
        .text(CL_DEVICE_NAME, "Mock GPU")
        .text(CL_DEVICE_VENDOR, "Mock Vendor")
        .u32(CL_DEVICE_VENDOR_ID, 0x1002)
        .text(CL_DRIVER_VERSION, "1.0")
        .text(CL_DEVICE_VERSION, "OpenCL 1.2 Mock")
        .text(CL_DEVICE_OPENCL_C_VERSION, "OpenCL C 1.2")
        .u64(CL_DEVICE_TYPE, CL_DEVICE_TYPE_GPU)
        .u32(CL_DEVICE_AVAILABLE, CL_TRUE)
        .u32(CL_DEVICE_COMPILER_AVAILABLE, CL_TRUE)
        .u64(CL_DEVICE_SINGLE_FP_CONFIG, CL_FP_INF_NAN | CL_FP_ROUND_TO_NEAREST)
        .u64(CL_DEVICE_DOUBLE_FP_CONFIG, 0)
        .u32(CL_DEVICE_MAX_COMPUTE_UNITS, 16)
        .u32(CL_DEVICE_MAX_WORK_ITEM_DIMENSIONS, 3)
        .size(CL_DEVICE_MAX_WORK_GROUP_SIZE, 256)
        .sizes(CL_DEVICE_MAX_WORK_ITEM_SIZES, &[256, 256, 64])
        .u32(CL_DEVICE_MAX_CLOCK_FREQUENCY, 1500)
        .u32(CL_DEVICE_ADDRESS_BITS, 64)
        .u64(CL_DEVICE_MAX_MEM_ALLOC_SIZE, 1 << 30)
        .u32(CL_DEVICE_IMAGE_SUPPORT, CL_TRUE)
        .u32(CL_DEVICE_ENDIAN_LITTLE, CL_TRUE)
        .u32(CL_DEVICE_LINKER_AVAILABLE, CL_TRUE)
        .text(CL_DEVICE_BUILT_IN_KERNELS, "")
        .u32(CL_DEVICE_HOST_UNIFIED_MEMORY, CL_FALSE)
        .u32(CL_DEVICE_ERROR_CORRECTION_SUPPORT, CL_FALSE)
        .size(CL_DEVICE_MAX_PARAMETER_SIZE, 4096)
        .u32(CL_DEVICE_MEM_BASE_ADDR_ALIGN, 1024)
        .u64(CL_DEVICE_GLOBAL_MEM_SIZE, 4 << 30)
        .u64(CL_DEVICE_LOCAL_MEM_SIZE, 64 << 10)
        .text(CL_DEVICE_EXTENSIONS, "cl_khr_fp64 cl_khr_icd")
}
