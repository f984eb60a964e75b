//! Best-effort environment detection.
//!
//! Every probe returns `Option`: absence means the capability is unavailable
//! and the caller falls back to a default. Failures never abort the run.

use regex::Regex;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::LazyLock;
use tracing::debug;

/// "Screen 0: minimum 320 x 200, current 1920 x 1080, maximum ..."
static XRANDR_CURRENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"current\s+(\d+)\s*x\s*(\d+)").unwrap());

/// Linux distribution id from `/etc/os-release` (`ID=`, falling back to the
/// first entry of `ID_LIKE=`). `None` on other platforms or parse failure.
#[must_use]
pub fn distro() -> Option<String> {
    distro_from_file(Path::new("/etc/os-release"))
}

pub(crate) fn distro_from_file(path: &Path) -> Option<String> {
    let contents = std::fs::read_to_string(path).ok()?;
    let field = |key: &str| {
        contents.lines().find_map(|line| {
            line.strip_prefix(key)
                .and_then(|rest| rest.strip_prefix('='))
                .map(|v| v.trim().trim_matches('"').to_ascii_lowercase())
        })
    };
    if let Some(id) = field("ID").filter(|v| !v.is_empty()) {
        return Some(id);
    }
    field("ID_LIKE")?
        .split_whitespace()
        .next()
        .map(str::to_owned)
}

/// Current display resolution, probed through `xrandr`.
///
/// Returns `None` when xrandr is not installed, fails to run (headless
/// session), or prints nothing recognizable.
#[must_use]
pub fn display_geometry() -> Option<(u32, u32)> {
    let xrandr = which::which("xrandr").ok()?;
    let output = Command::new(xrandr).output().ok()?;
    if !output.status.success() {
        return None;
    }
    parse_xrandr(&String::from_utf8_lossy(&output.stdout))
}

pub(crate) fn parse_xrandr(stdout: &str) -> Option<(u32, u32)> {
    let caps = XRANDR_CURRENT.captures(stdout)?;
    let width = caps[1].parse().ok()?;
    let height = caps[2].parse().ok()?;
    debug!("detected display geometry {width}x{height}");
    Some((width, height))
}

/// Path to the git binary, if one is on PATH.
#[must_use]
pub fn git() -> Option<PathBuf> {
    which::which("git").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_xrandr_current_line() {
        let out = "Screen 0: minimum 320 x 200, current 2560 x 1440, maximum 16384 x 16384\n\
                   DP-1 connected primary 2560x1440+0+0\n";
        assert_eq!(parse_xrandr(out), Some((2560, 1440)));
    }

    #[test]
    fn test_parse_xrandr_no_match() {
        assert_eq!(parse_xrandr("xrandr: command not found"), None);
        assert_eq!(parse_xrandr(""), None);
    }

    #[test]
    fn test_distro_id_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("os-release");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "NAME=\"Arch Linux\"\nID=arch\nID_LIKE=archlinux").unwrap();
        assert_eq!(distro_from_file(&path), Some("arch".into()));
    }

    #[test]
    fn test_distro_falls_back_to_id_like() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("os-release");
        std::fs::write(&path, "NAME=Something\nID_LIKE=\"ubuntu debian\"\n").unwrap();
        assert_eq!(distro_from_file(&path), Some("ubuntu".into()));
    }

    #[test]
    fn test_distro_missing_file() {
        assert_eq!(distro_from_file(Path::new("/nonexistent/os-release")), None);
    }
}
