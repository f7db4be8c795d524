//! Capability tables and the `describe` walk over them.

use crate::consts::*;
use crate::decoder::{flag, variant, Decoder, Flag, Scalar, Variant};
use crate::source::{
    ContextSource, DeviceSource, InfoSource, PlatformSource, ProgramBuildSource, ProgramSource,
};
use crate::ClError;
use once_cell::sync::Lazy;
use opencl3::{context::Context, device::Device, platform::Platform, program::Program};
use opencl3::types::cl_uint;
use std::io::Write;
use tracing::{debug, warn};

/// Static `(identifier, display name, decoder)` triple.
#[derive(Debug, Clone, Copy)]
pub struct Capability {
    pub param: cl_uint,
    pub name: &'static str,
    pub decoder: Decoder,
}

/// Builds a table, naming every row after its constant.
/// Rows may carry `#[cfg(...)]`.
macro_rules! table {
    ($( $(#[$meta:meta])* $param:ident => $decoder:expr ),* $(,)?) => {{
        let mut table = Vec::new();
        $(
            $(#[$meta])*
            table.push(Capability { param: $param, name: stringify!($param), decoder: $decoder });
        )*
        table
    }};
}

// ─── Known flag / enum values ─────────────────────────────────────────

static DEVICE_TYPES: &[Flag] = &[
    flag!(CL_DEVICE_TYPE_CPU),
    flag!(CL_DEVICE_TYPE_GPU),
    flag!(CL_DEVICE_TYPE_ACCELERATOR),
    flag!(CL_DEVICE_TYPE_DEFAULT),
    #[cfg(feature = "cl1-2")]
    flag!(CL_DEVICE_TYPE_CUSTOM),
];

static SINGLE_FP_CONFIG: &[Flag] = &[
    flag!(CL_FP_DENORM),
    flag!(CL_FP_INF_NAN),
    flag!(CL_FP_ROUND_TO_NEAREST),
    flag!(CL_FP_ROUND_TO_ZERO),
    flag!(CL_FP_ROUND_TO_INF),
    flag!(CL_FP_FMA),
    flag!(CL_FP_SOFT_FLOAT),
    #[cfg(feature = "cl1-2")]
    flag!(CL_FP_CORRECTLY_ROUNDED_DIVIDE_SQRT),
];

// correctly-rounded divide/sqrt only exists for single precision
static DOUBLE_FP_CONFIG: &[Flag] = &[
    flag!(CL_FP_DENORM),
    flag!(CL_FP_INF_NAN),
    flag!(CL_FP_ROUND_TO_NEAREST),
    flag!(CL_FP_ROUND_TO_ZERO),
    flag!(CL_FP_ROUND_TO_INF),
    flag!(CL_FP_FMA),
    flag!(CL_FP_SOFT_FLOAT),
];

static BUILD_STATUS: &[Variant] = &[
    variant!(CL_BUILD_NONE),
    variant!(CL_BUILD_ERROR),
    variant!(CL_BUILD_SUCCESS),
    variant!(CL_BUILD_IN_PROGRESS),
];

#[cfg(feature = "cl1-2")]
static BINARY_TYPE: &[Variant] = &[
    variant!(CL_PROGRAM_BINARY_TYPE_NONE),
    variant!(CL_PROGRAM_BINARY_TYPE_COMPILED_OBJECT),
    variant!(CL_PROGRAM_BINARY_TYPE_LIBRARY),
    variant!(CL_PROGRAM_BINARY_TYPE_EXECUTABLE),
];

// ─── Tables ───────────────────────────────────────────────────────────

pub static PLATFORM_CAPABILITIES: Lazy<Vec<Capability>> = Lazy::new(|| {
    table![
        CL_PLATFORM_PROFILE => Decoder::Text,
        CL_PLATFORM_VERSION => Decoder::Text,
        CL_PLATFORM_NAME => Decoder::Text,
        CL_PLATFORM_VENDOR => Decoder::Text,
        CL_PLATFORM_EXTENSIONS => Decoder::Text,
    ]
});

pub static DEVICE_CAPABILITIES: Lazy<Vec<Capability>> = Lazy::new(|| {
    table![
        CL_DEVICE_NAME => Decoder::Text,
        CL_DEVICE_VENDOR => Decoder::Text,
        CL_DEVICE_VENDOR_ID => Decoder::Scalar(Scalar::U32),
        CL_DRIVER_VERSION => Decoder::Text,
        CL_DEVICE_VERSION => Decoder::Text,
        CL_DEVICE_OPENCL_C_VERSION => Decoder::Text,
        CL_DEVICE_TYPE => Decoder::BitFlags(DEVICE_TYPES),
        CL_DEVICE_AVAILABLE => Decoder::Boolean,
        CL_DEVICE_COMPILER_AVAILABLE => Decoder::Boolean,
        CL_DEVICE_SINGLE_FP_CONFIG => Decoder::BitFlags(SINGLE_FP_CONFIG),
        CL_DEVICE_DOUBLE_FP_CONFIG => Decoder::BitFlags(DOUBLE_FP_CONFIG),
        CL_DEVICE_MAX_COMPUTE_UNITS => Decoder::Scalar(Scalar::U32),
        CL_DEVICE_MAX_WORK_ITEM_DIMENSIONS => Decoder::Scalar(Scalar::U32),
        CL_DEVICE_MAX_WORK_GROUP_SIZE => Decoder::Scalar(Scalar::Size),
        CL_DEVICE_MAX_WORK_ITEM_SIZES => Decoder::DimensionedArray {
            count_param: CL_DEVICE_MAX_WORK_ITEM_DIMENSIONS,
            count: Scalar::U32,
            element: Scalar::Size,
        },
        CL_DEVICE_MAX_CLOCK_FREQUENCY => Decoder::Scalar(Scalar::U32), // MHz
        CL_DEVICE_ADDRESS_BITS => Decoder::Scalar(Scalar::U32),
        CL_DEVICE_MAX_MEM_ALLOC_SIZE => Decoder::Scalar(Scalar::U64), // bytes
        CL_DEVICE_IMAGE_SUPPORT => Decoder::Boolean,
        CL_DEVICE_ENDIAN_LITTLE => Decoder::Boolean,
        #[cfg(feature = "cl1-2")]
        CL_DEVICE_LINKER_AVAILABLE => Decoder::Boolean,
        #[cfg(feature = "cl1-2")]
        CL_DEVICE_BUILT_IN_KERNELS => Decoder::Text,
        CL_DEVICE_HOST_UNIFIED_MEMORY => Decoder::Boolean,
        CL_DEVICE_ERROR_CORRECTION_SUPPORT => Decoder::Boolean,
        CL_DEVICE_MAX_PARAMETER_SIZE => Decoder::Scalar(Scalar::Size),
        CL_DEVICE_MEM_BASE_ADDR_ALIGN => Decoder::Scalar(Scalar::U32), // bits
        CL_DEVICE_GLOBAL_MEM_SIZE => Decoder::Scalar(Scalar::U64),
        CL_DEVICE_LOCAL_MEM_SIZE => Decoder::Scalar(Scalar::U64),
        CL_DEVICE_EXTENSIONS => Decoder::Text,
    ]
});

pub static CONTEXT_CAPABILITIES: Lazy<Vec<Capability>> = Lazy::new(|| {
    table![
        CL_CONTEXT_REFERENCE_COUNT => Decoder::Scalar(Scalar::U32),
        CL_CONTEXT_NUM_DEVICES => Decoder::Scalar(Scalar::U32),
    ]
});

pub static PROGRAM_CAPABILITIES: Lazy<Vec<Capability>> = Lazy::new(|| {
    table![
        CL_PROGRAM_REFERENCE_COUNT => Decoder::Scalar(Scalar::U32),
        #[cfg(feature = "cl1-2")]
        CL_PROGRAM_NUM_KERNELS => Decoder::Scalar(Scalar::Size),
        #[cfg(feature = "cl1-2")]
        CL_PROGRAM_KERNEL_NAMES => Decoder::Text,
        CL_PROGRAM_NUM_DEVICES => Decoder::Scalar(Scalar::U32),
        CL_PROGRAM_BINARY_SIZES => Decoder::DimensionedArray {
            count_param: CL_PROGRAM_NUM_DEVICES,
            count: Scalar::U32,
            element: Scalar::Size,
        },
    ]
});

pub static PROGRAM_BUILD_CAPABILITIES: Lazy<Vec<Capability>> = Lazy::new(|| {
    table![
        CL_PROGRAM_BUILD_STATUS => Decoder::Enumerated { width: Scalar::I32, values: BUILD_STATUS },
        CL_PROGRAM_BUILD_OPTIONS => Decoder::Text,
        #[cfg(feature = "cl1-2")]
        CL_PROGRAM_BINARY_TYPE => Decoder::Enumerated { width: Scalar::U32, values: BINARY_TYPE },
        CL_PROGRAM_BUILD_LOG => Decoder::Text,
    ]
});

// ─── describe ─────────────────────────────────────────────────────────

/// Writes one line per capability of `table`, in table order.
///
/// Every row is attempted exactly once. A row whose query fails is written
/// as a diagnostic instead of a value and does not stop the walk. The
/// return value is `Err` with the *last* property error if any row failed.
/// Only a failure to write to `out` aborts early.
pub fn describe<S, W>(
    table: &[Capability],
    source: &S,
    indent: u32,
    out: &mut W,
) -> Result<(), ClError>
where
    S: InfoSource + ?Sized,
    W: Write + ?Sized,
{
    let pad = " ".repeat(indent as usize);
    let mut last_error = None;

    for cap in table {
        debug!(param = cap.param, name = cap.name, "query");
        match cap.decoder.decode(source, cap.param) {
            Ok(value) => {
                write!(out, "{pad}{}: ", cap.name)?;
                out.write_all(&value)?;
                writeln!(out)?;
            }
            Err(err) => {
                warn!(name = cap.name, error = %err, "property query failed");
                writeln!(out, "{pad}{}: <query failed: {err}>", cap.name)?;
                last_error = Some(err);
            }
        }
    }

    match last_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

pub fn describe_platform<W: Write + ?Sized>(
    platform: &Platform,
    indent: u32,
    out: &mut W,
) -> Result<(), ClError> {
    describe(&PLATFORM_CAPABILITIES, &PlatformSource::new(platform), indent, out)
}

pub fn describe_device<W: Write + ?Sized>(
    device: &Device,
    indent: u32,
    out: &mut W,
) -> Result<(), ClError> {
    describe(&DEVICE_CAPABILITIES, &DeviceSource::new(device), indent, out)
}

pub fn describe_context<W: Write + ?Sized>(
    context: &Context,
    indent: u32,
    out: &mut W,
) -> Result<(), ClError> {
    describe(&CONTEXT_CAPABILITIES, &ContextSource::new(context), indent, out)
}

pub fn describe_program<W: Write + ?Sized>(
    program: &Program,
    indent: u32,
    out: &mut W,
) -> Result<(), ClError> {
    describe(&PROGRAM_CAPABILITIES, &ProgramSource::new(program), indent, out)
}

/// Build results of `program` for one `device`.
pub fn describe_program_build<W: Write + ?Sized>(
    program: &Program,
    device: &Device,
    indent: u32,
    out: &mut W,
) -> Result<(), ClError> {
    describe(
        &PROGRAM_BUILD_CAPABILITIES,
        &ProgramBuildSource::new(program, device),
        indent,
        out,
    )
}
