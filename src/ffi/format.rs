//! # Post-Emission Formatting
//!
//! Verifies that both emitted files exist and hands them to an external
//! source formatter. The formatter rewrites files in place and is expected
//! to be idempotent and semantics-preserving; any failure propagates as a
//! formatter error and the emitted content is left as-is.

use eyre::{ensure, Result, WrapErr};
use std::path::Path;
use std::process::Command;

/// Formats the emitted declaration/implementation pair with `clang-format`
/// using the project-local style configuration (`--style=file`).
pub fn validate_and_format<P: AsRef<Path>>(header_path: P, source_path: P) -> Result<()> {
    let header_path = header_path.as_ref();
    let source_path = source_path.as_ref();

    for path in [header_path, source_path] {
        ensure!(
            path.is_file(),
            "formatter input '{}' does not exist",
            path.display()
        );
    }

    let status = Command::new("clang-format")
        .arg("-i")
        .arg("--style=file")
        .arg(header_path)
        .arg(source_path)
        .status()
        .wrap_err("formatter failed: could not run clang-format")?;

    ensure!(status.success(), "formatter exited with {}", status);
    Ok(())
}
