//! Host side of the `prefix_sum` demo kernel.
//!
//! The kernel runs one work-group of `n` items and doubles its stride
//! `log2(n)` times, swapping source and destination after every pass. After
//! an odd number of passes the result sits in the second buffer.

use crate::ClError;
use opencl3::{
    command_queue::CommandQueue,
    context::Context,
    kernel::Kernel,
    memory::{Buffer, CL_MEM_COPY_HOST_PTR, CL_MEM_READ_WRITE},
    program::Program,
    types::{cl_int, CL_BLOCKING},
};
use std::ptr;
use tracing::debug;

pub const KERNEL_NAME: &str = "prefix_sum";

/// Largest accepted array length (one work-group).
pub const MAX_LEN: u32 = 256;

/// Which of the two ping-pong buffers holds the final result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    A,
    B,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefixSumPlan {
    len: u32,
    iterations: u32,
}

impl PrefixSumPlan {
    /// `len` must be a power of two no larger than [`MAX_LEN`].
    pub fn new(len: u32) -> Result<Self, ClError> {
        if !len.is_power_of_two() {
            return Err(ClError::Config(format!("array size must be a power of two, got {len}")));
        }
        if len > MAX_LEN {
            return Err(ClError::Config(format!("array size {len} exceeds {MAX_LEN}")));
        }
        Ok(Self { len, iterations: len.trailing_zeros() })
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of stride-doubling passes, `log2(len)`.
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn result_slot(&self) -> Slot {
        if self.iterations % 2 != 0 { Slot::B } else { Slot::A }
    }

    /// Input sequence `1..=len`.
    pub fn input(&self) -> Vec<cl_int> {
        (1..=self.len as cl_int).collect()
    }
}

/// Inclusive scan on the host, to check the device result against.
pub fn inclusive_scan(values: &[cl_int]) -> Vec<cl_int> {
    values
        .iter()
        .scan(0, |acc, &v| {
            *acc += v;
            Some(*acc)
        })
        .collect()
}

/// Runs the kernel once over `plan.input()` and reads back the result.
///
/// Both buffers and the kernel object are released when this returns.
pub fn run(
    context: &Context,
    queue: &CommandQueue,
    program: &Program,
    plan: &PrefixSumPlan,
) -> Result<Vec<cl_int>, ClError> {
    let n = plan.len();
    let mut host_a = plan.input();
    let mut host_b = vec![0 as cl_int; n];

    // both host slices hold `n` elements and are copied at creation
    let buf_a = Buffer::<cl_int>::create(
        context,
        CL_MEM_READ_WRITE | CL_MEM_COPY_HOST_PTR,
        n,
        host_a.as_mut_ptr().cast(),
    )?;
    let buf_b = Buffer::<cl_int>::create(
        context,
        CL_MEM_READ_WRITE | CL_MEM_COPY_HOST_PTR,
        n,
        host_b.as_mut_ptr().cast(),
    )?;

    let kernel = Kernel::create(program, KERNEL_NAME)?;
    let iterations = plan.iterations() as cl_int;
    kernel.set_arg(0, &buf_a)?;
    kernel.set_arg(1, &buf_b)?;
    kernel.set_arg(2, &iterations)?;

    let global = [n];
    let local = [n];
    debug!(n, iterations, "enqueue prefix_sum");
    let _evt = queue.enqueue_nd_range_kernel(
        kernel.get(),
        1,
        ptr::null(),
        global.as_ptr(),
        local.as_ptr(),
        &[],
    )?;

    let result = match plan.result_slot() {
        Slot::A => &buf_a,
        Slot::B => &buf_b,
    };
    let mut out = vec![0 as cl_int; n];
    queue.enqueue_read_buffer(result, CL_BLOCKING, 0, &mut out, &[])?;
    Ok(out)
}
