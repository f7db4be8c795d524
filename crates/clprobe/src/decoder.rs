//! Value decoders: one variant per shape of capability value.
//!
//! A decoder queries its property through an [`InfoSource`] and renders the
//! result to bytes. Text values are passed through as the driver returned
//! them, whatever their encoding. Nothing is written until the whole value
//! has been fetched, so a failing decoder never leaves half a value behind.

use crate::consts::{CL_FALSE, CL_TRUE};
use crate::source::InfoSource;
use crate::ClError;
use opencl3::types::{cl_bool, cl_int, cl_uint, cl_ulong};
use std::fmt;
use std::mem::size_of;
use tracing::debug;

/// Fixed-width numeric types a property can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scalar {
    U32,
    I32,
    U64,
    /// Host `size_t`.
    Size,
}

/// A decoded scalar, keeping its signedness for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Number {
    Unsigned(u64),
    Signed(i64),
}

impl Number {
    /// Raw bit pattern, used for flag masks and counts.
    pub fn bits(self) -> u64 {
        match self {
            Number::Unsigned(v) => v,
            Number::Signed(v) => v as u64,
        }
    }

    pub fn as_i64(self) -> i64 {
        match self {
            Number::Unsigned(v) => v as i64,
            Number::Signed(v) => v,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Unsigned(v) => write!(f, "{v}"),
            Number::Signed(v) => write!(f, "{v}"),
        }
    }
}

impl Scalar {
    pub const fn width(self) -> usize {
        match self {
            Scalar::U32 => size_of::<cl_uint>(),
            Scalar::I32 => size_of::<cl_int>(),
            Scalar::U64 => size_of::<cl_ulong>(),
            Scalar::Size => size_of::<usize>(),
        }
    }

    /// Reads one value from exactly `self.width()` bytes.
    pub fn read(self, bytes: &[u8]) -> Number {
        match self {
            Scalar::U32 => Number::Unsigned(bytemuck::pod_read_unaligned::<cl_uint>(bytes) as u64),
            Scalar::I32 => Number::Signed(bytemuck::pod_read_unaligned::<cl_int>(bytes) as i64),
            Scalar::U64 => Number::Unsigned(bytemuck::pod_read_unaligned::<cl_ulong>(bytes)),
            Scalar::Size => Number::Unsigned(bytemuck::pod_read_unaligned::<usize>(bytes) as u64),
        }
    }
}

/// One named bit of a flag mask.
#[derive(Debug, Clone, Copy)]
pub struct Flag {
    pub bits: u64,
    pub name: &'static str,
}

/// One named value of an enumerated status.
#[derive(Debug, Clone, Copy)]
pub struct Variant {
    pub value: i64,
    pub name: &'static str,
}

/// `flag!(CL_FP_FMA)` pairs the constant with its own name.
macro_rules! flag {
    ($name:ident) => {
        $crate::decoder::Flag { bits: $name as u64, name: stringify!($name) }
    };
}
pub(crate) use flag;

macro_rules! variant {
    ($name:ident) => {
        $crate::decoder::Variant { value: $name as i64, name: stringify!($name) }
    };
}
pub(crate) use variant;

/// How a property is fetched and rendered.
#[derive(Debug, Clone, Copy)]
pub enum Decoder {
    /// Size-then-fetch character data, printed up to its terminator.
    Text,
    /// `cl_bool`: `true`, `false` or `unknown-value`.
    Boolean,
    Scalar(Scalar),
    /// `cl_bitfield` mask, rendered as the names of all known bits that are
    /// set, in list order, each followed by a space.
    BitFlags(&'static [Flag]),
    /// Exact match against a list of known values; no match renders nothing.
    Enumerated { width: Scalar, values: &'static [Variant] },
    /// `[ a b c ]` with the element count read from `count_param` first.
    DimensionedArray { count_param: cl_uint, count: Scalar, element: Scalar },
}

impl Decoder {
    /// Fetches `param` and renders its display value.
    pub fn decode<S>(&self, source: &S, param: cl_uint) -> Result<Vec<u8>, ClError>
    where
        S: InfoSource + ?Sized,
    {
        let rendered = match *self {
            Decoder::Text => return Ok(render_text(fetch_sized(source, param)?)),
            Decoder::Boolean => {
                let value = fetch_scalar(source, param, Scalar::U32)?.bits();
                render_bool(value as cl_bool).to_owned()
            }
            Decoder::Scalar(kind) => fetch_scalar(source, param, kind)?.to_string(),
            Decoder::BitFlags(flags) => {
                let mask = fetch_scalar(source, param, Scalar::U64)?.bits();
                render_flags(param, mask, flags)
            }
            Decoder::Enumerated { width, values } => {
                let value = fetch_scalar(source, param, width)?.as_i64();
                render_variant(param, value, values).to_owned()
            }
            Decoder::DimensionedArray { count_param, count, element } => {
                let n = fetch_count(source, count_param, count)?;
                let len = n
                    .checked_mul(element.width())
                    .ok_or(ClError::InvalidSize { param, size: n })?;
                let bytes = fetch_exact(source, param, len)?;
                render_array(&bytes, element)
            }
        };
        Ok(rendered.into_bytes())
    }
}

// ─── Fetch ────────────────────────────────────────────────────────────

/// Zeroed scratch buffer; allocation failure is reported, not aborted on.
fn scratch(len: usize) -> Result<Vec<u8>, ClError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len).map_err(|_| ClError::OutOfHostMemory)?;
    buf.resize(len, 0);
    Ok(buf)
}

/// Two-step query: ask for the size, then fetch exactly that many bytes.
fn fetch_sized<S: InfoSource + ?Sized>(source: &S, param: cl_uint) -> Result<Vec<u8>, ClError> {
    let size = source.query(param, None)?;
    if size < 1 {
        return Err(ClError::InvalidSize { param, size });
    }
    fetch_exact(source, param, size)
}

fn fetch_exact<S: InfoSource + ?Sized>(
    source: &S,
    param: cl_uint,
    len: usize,
) -> Result<Vec<u8>, ClError> {
    let mut buf = scratch(len)?;
    source.query(param, Some(&mut buf))?;
    Ok(buf)
}

fn fetch_scalar<S: InfoSource + ?Sized>(
    source: &S,
    param: cl_uint,
    kind: Scalar,
) -> Result<Number, ClError> {
    let buf = fetch_exact(source, param, kind.width())?;
    Ok(kind.read(&buf))
}

/// Cardinality of an array property, itself a full scalar query.
fn fetch_count<S: InfoSource + ?Sized>(
    source: &S,
    param: cl_uint,
    kind: Scalar,
) -> Result<usize, ClError> {
    let n = fetch_scalar(source, param, kind)?.bits() as usize;
    if n < 1 {
        return Err(ClError::InvalidSize { param, size: n });
    }
    Ok(n)
}

// ─── Render ───────────────────────────────────────────────────────────

/// Character data up to the first NUL, bytes untouched.
fn render_text(mut bytes: Vec<u8>) -> Vec<u8> {
    if let Some(end) = bytes.iter().position(|&b| b == 0) {
        bytes.truncate(end);
    }
    bytes
}

fn render_bool(value: cl_bool) -> &'static str {
    match value {
        CL_TRUE => "true",
        CL_FALSE => "false",
        _ => "unknown-value",
    }
}

fn render_flags(param: cl_uint, mask: u64, flags: &[Flag]) -> String {
    let known = flags.iter().fold(0u64, |acc, f| acc | f.bits);
    if mask & !known != 0 {
        debug!(param, unknown = mask & !known, "dropping unknown flag bits");
    }
    flags
        .iter()
        .filter(|f| mask & f.bits != 0)
        .map(|f| format!("{} ", f.name))
        .collect()
}

fn render_variant(param: cl_uint, value: i64, values: &[Variant]) -> &'static str {
    match values.iter().find(|v| v.value == value) {
        Some(v) => v.name,
        None => {
            debug!(param, value, "no known name for value");
            ""
        }
    }
}

fn render_array(bytes: &[u8], element: Scalar) -> String {
    let mut out = String::from("[ ");
    for chunk in bytes.chunks_exact(element.width()) {
        out.push_str(&element.read(chunk).to_string());
        out.push(' ');
    }
    out.push(']');
    out
}
