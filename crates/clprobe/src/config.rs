//! Runtime configuration and logging setup for the binaries.

use crate::consts::{
    CL_DEVICE_TYPE_ACCELERATOR, CL_DEVICE_TYPE_ALL, CL_DEVICE_TYPE_CPU, CL_DEVICE_TYPE_DEFAULT,
    CL_DEVICE_TYPE_GPU,
};
use crate::ClError;
use opencl3::types::cl_device_type;
use tracing_subscriber::EnvFilter;

pub const INDENT_VAR: &str = "CLPROBE_INDENT";
pub const DEVICE_TYPE_VAR: &str = "CLPROBE_DEVICE_TYPE";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Leading spaces before every report line.
    pub indent: u32,
    /// Which devices to enumerate.
    pub device_type: cl_device_type,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self { indent: 0, device_type: CL_DEVICE_TYPE_ALL }
    }
}

impl ProbeConfig {
    pub fn from_env() -> Result<Self, ClError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for the known keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ClError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(raw) = lookup(INDENT_VAR) {
            config.indent = raw
                .trim()
                .parse()
                .map_err(|_| ClError::Config(format!("{INDENT_VAR}: not a non-negative integer: {raw:?}")))?;
        }
        if let Some(raw) = lookup(DEVICE_TYPE_VAR) {
            config.device_type = parse_device_type(&raw)?;
        }
        Ok(config)
    }
}

pub fn parse_device_type(raw: &str) -> Result<cl_device_type, ClError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "all" => Ok(CL_DEVICE_TYPE_ALL),
        "cpu" => Ok(CL_DEVICE_TYPE_CPU),
        "gpu" => Ok(CL_DEVICE_TYPE_GPU),
        "accelerator" => Ok(CL_DEVICE_TYPE_ACCELERATOR),
        "default" => Ok(CL_DEVICE_TYPE_DEFAULT),
        other => Err(ClError::Config(format!("{DEVICE_TYPE_VAR}: unknown device type {other:?}"))),
    }
}

/// Logs go to stderr so the report on stdout stays clean. `RUST_LOG`
/// overrides the default `warn` level.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
