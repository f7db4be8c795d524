//! Lists every OpenCL platform with all of its devices and their capabilities.

use clprobe::consts::CL_DEVICE_NOT_FOUND;
use clprobe::{describe_device, describe_platform, init_tracing, probe, ClError, ProbeConfig};
use std::io::{self, Write};

fn main() -> Result<(), ClError> {
    init_tracing();
    let config = ProbeConfig::from_env()?;
    let base = config.indent;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    // 1. Plattformen
    let platforms = probe::platforms()?;
    writeln!(out, "Found {} platform(s)", platforms.len())?;

    let mut last_error = None;
    for (index, platform) in platforms.iter().enumerate() {
        writeln!(out, "Platform # {index}")?;
        if let Err(e) = describe_platform(platform, base + 2, &mut out) {
            last_error = Some(e);
        }

        // 2. Geräte der Plattform
        let devices = match probe::devices(platform, config.device_type) {
            Ok(devices) => devices,
            Err(ClError::Api(CL_DEVICE_NOT_FOUND)) => {
                writeln!(out, "Platform does not have any devices!")?;
                continue;
            }
            Err(e) => return Err(e),
        };
        writeln!(out, "# of devices: {}", devices.len())?;

        for (device_index, device) in devices.iter().enumerate() {
            writeln!(out, "{:indent$}Device :{device_index}", "", indent = (base + 4) as usize)?;
            if let Err(e) = describe_device(device, base + 6, &mut out) {
                last_error = Some(e);
            }
        }
        writeln!(out)?;
    }

    match last_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
