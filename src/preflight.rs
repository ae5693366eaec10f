//! Environment preflight validation.
//!
//! These checks run before any side effect so common installation mistakes
//! surface as actionable errors instead of failures halfway through a
//! session. Checks run in a fixed order and short-circuit on the first
//! failure: reachability, version floor, privilege requirement.

use crate::context::{Framework, FrameworkInfo};
use crate::error::PreflightError;

/// Oldest framework version this launcher drives.
pub const MINIMUM_FRAMEWORK_VERSION: &str = "1.0";

/// Validate that the installed framework can host a session.
pub fn validate(framework: &dyn Framework) -> Result<FrameworkInfo, PreflightError> {
    let info = framework
        .probe()
        .map_err(|e| PreflightError::EnvironmentUnavailable(e.to_string()))?;
    validate_info(&info, process_is_elevated())?;
    Ok(info)
}

/// Validate probe results against the version floor and privilege state.
fn validate_info(info: &FrameworkInfo, elevated: bool) -> Result<(), PreflightError> {
    ensure_version_supported(&info.version)?;
    if info.requires_elevated && !elevated {
        return Err(PreflightError::InsufficientPrivilege);
    }
    Ok(())
}

/// Compare a `major.minor[.patch]` version against the documented floor.
fn ensure_version_supported(version: &str) -> Result<(), PreflightError> {
    let unsupported = || PreflightError::UnsupportedRuntime {
        found: version.to_string(),
        minimum: MINIMUM_FRAMEWORK_VERSION.to_string(),
    };
    let found = parse_major_minor(version).ok_or_else(unsupported)?;
    let floor = parse_major_minor(MINIMUM_FRAMEWORK_VERSION)
        .expect("minimum version constant must parse");
    if found < floor {
        return Err(unsupported());
    }
    Ok(())
}

fn parse_major_minor(version: &str) -> Option<(u64, u64)> {
    let mut parts = version.trim().split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next().unwrap_or("0").parse().ok()?;
    Some((major, minor))
}

/// Whether the current process runs with elevated privileges.
///
/// Reads the effective uid from `/proc/self/status` where available; other
/// platforms conservatively report non-elevated.
#[cfg(target_os = "linux")]
fn process_is_elevated() -> bool {
    let Ok(status) = std::fs::read_to_string("/proc/self/status") else {
        return false;
    };
    status
        .lines()
        .find(|line| line.starts_with("Uid:"))
        .and_then(|line| line.split_whitespace().nth(2))
        .and_then(|euid| euid.parse::<u32>().ok())
        .is_some_and(|euid| euid == 0)
}

#[cfg(not(target_os = "linux"))]
fn process_is_elevated() -> bool {
    false
}
