//! Runs the prefix sum kernel on the first device.
//!
//! Usage: `prefix_sum [kernel file] [array size]` (defaults: bundled kernel, 16).

use clprobe::prefix_sum::{self, PrefixSumPlan};
use clprobe::{describe_context, init_tracing, kernel, probe, ClError, ProbeConfig};
use opencl3::command_queue::CommandQueue;
use std::io::{self, Write};

const DEFAULT_KERNEL: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/kernels/prefix_sum.cl");
const DEFAULT_LEN: u32 = 16;

fn main() -> Result<(), ClError> {
    init_tracing();
    let config = ProbeConfig::from_env()?;

    let mut args = std::env::args().skip(1);
    let path = args.next().unwrap_or_else(|| DEFAULT_KERNEL.to_owned());
    let len = match args.next() {
        Some(raw) => raw
            .parse()
            .map_err(|_| ClError::Config(format!("array size is not a number: {raw:?}")))?,
        None => DEFAULT_LEN,
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();

    writeln!(out, "Using array size of {len}")?;
    let plan = PrefixSumPlan::new(len)?;
    writeln!(out, "Computed # of loop iterations: {}", plan.iterations())?;

    let src = kernel::load_source(&path)?;
    writeln!(out, "{path} loaded as string into memory.")?;

    // 1. Gerät, Kontext & Queue
    let (_platform, device) = probe::select_first(config.device_type, config.indent, &mut out)?;
    let context = probe::create_context(&device)?;
    writeln!(out, "Created context.")?;
    writeln!(out, "Context:")?;
    if let Err(e) = describe_context(&context, config.indent, &mut out) {
        tracing::warn!(error = %e, "incomplete context report");
    }
    writeln!(out)?;
    let queue = CommandQueue::create(&context, device.id(), 0)?;

    // 2. Kernel bauen
    writeln!(out, "Trying to compile & link kernel.")?;
    let program = kernel::build_program(&context, &device, &src, "", config.indent, &mut out)?;

    // 3. Ausführen & zurücklesen
    let input = plan.input();
    writeln!(out, "Created Array:")?;
    print_array(&mut out, &input)?;

    writeln!(out, "Enqueuing kernel.")?;
    let result = prefix_sum::run(&context, &queue, &program, &plan)?;

    writeln!(out, "\nReading back array:")?;
    print_array(&mut out, &result)?;

    let expected = prefix_sum::inclusive_scan(&input);
    if result != expected {
        return Err(ClError::Config(format!(
            "device result differs from host scan: {result:?} != {expected:?}"
        )));
    }
    writeln!(out, "prefix_sum OK, last element = {}", result[result.len() - 1])?;
    Ok(())
}

fn print_array(out: &mut impl Write, values: &[i32]) -> io::Result<()> {
    for (index, value) in values.iter().enumerate() {
        writeln!(out, "Array[{index}] = {value}")?;
    }
    Ok(())
}
