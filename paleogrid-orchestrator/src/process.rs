//! Subprocess execution
//!
//! One place that actually spawns external tools. Stdout is discarded
//! (the tools write their results to files), stderr is captured so a
//! failing invocation carries its own diagnostics. A started process is
//! always waited on to completion; cancellation never kills it.

use anyhow::{Context, Result, bail};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Cap on retained stderr per invocation; anything longer is truncated
/// from the front so the most recent diagnostics survive.
const MAX_STDERR_CHARS: usize = 2048;

/// Runs `command` (program first) to completion.
///
/// `lower_priority` requests a reduced scheduling priority for the child on
/// Unix; it is best-effort and never a failure condition.
pub(crate) async fn run(command: &[String], lower_priority: bool) -> Result<()> {
    let (program, args) = command
        .split_first()
        .context("external command is empty")?;

    debug!(program = %program, args = args.len(), "spawning external tool");

    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped());

    // Batch runs should not starve interactive use of the host. The nice
    // result is deliberately ignored.
    #[cfg(unix)]
    if lower_priority {
        unsafe {
            cmd.pre_exec(|| {
                let _ = libc::nice(1);
                Ok(())
            });
        }
    }
    #[cfg(not(unix))]
    let _ = lower_priority;

    let output = cmd
        .output()
        .await
        .with_context(|| format!("failed to launch `{program}`"))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();
        let cut = stderr.len().saturating_sub(MAX_STDERR_CHARS);
        let cut = (cut..=stderr.len())
            .find(|i| stderr.is_char_boundary(*i))
            .unwrap_or(0);
        let tail = &stderr[cut..];
        bail!("`{program}` exited with {}: {tail}", output.status);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_successful_command() {
        run(&["true".to_string()], false).await.unwrap();
    }

    #[tokio::test]
    async fn test_nonzero_exit_reports_stderr() {
        let err = run(
            &[
                "sh".to_string(),
                "-c".to_string(),
                "echo boom >&2; exit 3".to_string(),
            ],
            false,
        )
        .await
        .unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("boom"));
        assert!(msg.contains("exit status: 3") || msg.contains("3"));
    }

    #[tokio::test]
    async fn test_missing_program_is_a_launch_error() {
        let err = run(&["paleogrid-no-such-tool".to_string()], false)
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("failed to launch"));
    }

    #[tokio::test]
    async fn test_lower_priority_does_not_fail() {
        run(&["true".to_string()], true).await.unwrap();
    }
}
