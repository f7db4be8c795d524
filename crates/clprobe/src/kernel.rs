//! Kernel source loading and program builds with a build report.

use crate::probe::report;
use crate::registry::describe_program_build;
use crate::ClError;
use opencl3::{context::Context, device::Device, program::Program};
use std::{fs, io::Write, path::Path};
use tracing::info;

/// Reads a kernel file. An empty file is rejected.
pub fn load_source(path: impl AsRef<Path>) -> Result<String, ClError> {
    let path = path.as_ref();
    let src = fs::read_to_string(path)?;
    if src.is_empty() {
        return Err(ClError::Config(format!("{}: kernel file is empty", path.display())));
    }
    info!(path = %path.display(), bytes = src.len(), "kernel source loaded");
    Ok(src)
}

/// Creates a program from `source` and builds it for `device`.
///
/// Build status, options and log are written to `out` before the build
/// result is returned, so a failed build still shows its log.
pub fn build_program<W: Write + ?Sized>(
    context: &Context,
    device: &Device,
    source: &str,
    options: &str,
    indent: u32,
    out: &mut W,
) -> Result<Program, ClError> {
    let mut program = Program::create_from_source(context, source)?;
    let built = program.build(&[device.id()], options);

    report(describe_program_build(&program, device, indent, out))?;

    built?;
    Ok(program)
}
