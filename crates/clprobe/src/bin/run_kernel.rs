//! Builds a kernel file on the first device and reports context, build
//! result and program capabilities.
//!
//! Usage: `run_kernel [kernel file]` (defaults to the bundled prefix sum).

use clprobe::{describe_context, describe_program, init_tracing, kernel, probe, ClError, ProbeConfig};
use std::io::{self, Write};

const DEFAULT_KERNEL: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/kernels/prefix_sum.cl");

fn main() -> Result<(), ClError> {
    init_tracing();
    let config = ProbeConfig::from_env()?;
    let path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_KERNEL.to_owned());

    let stdout = io::stdout();
    let mut out = stdout.lock();

    let src = kernel::load_source(&path)?;
    writeln!(out, "{path} loaded as string into memory.")?;

    // 1. Gerät & Kontext
    let (_platform, device) = probe::select_first(config.device_type, config.indent, &mut out)?;
    let context = probe::create_context(&device)?;
    writeln!(out, "Created context.")?;
    writeln!(out, "Context:")?;
    let context_report = describe_context(&context, config.indent, &mut out);
    writeln!(out)?;

    // 2. Kernel bauen
    writeln!(out, "Trying to compile & link kernel.")?;
    let program = match kernel::build_program(&context, &device, &src, "", config.indent, &mut out) {
        Ok(program) => program,
        Err(e) => {
            writeln!(out, "Build failed")?;
            return Err(e);
        }
    };
    describe_program(&program, config.indent, &mut out)?;

    context_report
}
