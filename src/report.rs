//! Fetching the volume-info report.
//!
//! The configured command (default `gluster volume info`) is split on
//! whitespace, its program resolved through `PATH`, and its stdout
//! captured. The report is the parser's only input, so anything suspicious
//! about how it was produced is fatal: stderr chatter or a non-zero exit
//! means the text cannot be trusted.

use std::process::ExitStatus;
use tokio::process::Command;

#[derive(thiserror::Error, Debug)]
pub enum ReportError {
    #[error("the volume info command is empty")]
    EmptyCommand,
    #[error("cannot find {program:?} on PATH: {source}")]
    ProgramNotFound { program: String, source: which::Error },
    #[error("failed to run {program:?}: {source}")]
    Launch {
        program: String,
        source: std::io::Error,
    },
    #[error("{program:?} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },
    #[error("{program:?} wrote to stderr, not trusting its report: {stderr}")]
    Stderr { program: String, stderr: String },
}

/// Runs the report command and returns its stdout.
pub async fn fetch(command: &str) -> Result<String, ReportError> {
    let mut parts = command.split_whitespace();
    let program = parts.next().ok_or(ReportError::EmptyCommand)?;
    let arguments: Vec<&str> = parts.collect();

    let resolved = which::which(program).map_err(|source| ReportError::ProgramNotFound {
        program: program.to_string(),
        source,
    })?;
    debug!(program = %resolved.display(), ?arguments, "Fetching the volume report");

    let output = Command::new(&resolved)
        .args(&arguments)
        .output()
        .await
        .map_err(|source| ReportError::Launch {
            program: program.to_string(),
            source,
        })?;

    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if !output.status.success() {
        return Err(ReportError::Failed {
            program: program.to_string(),
            status: output.status,
            stderr,
        });
    }
    if !stderr.is_empty() {
        return Err(ReportError::Stderr {
            program: program.to_string(),
            stderr,
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use temp_dir::TempDir;

    fn script(dir: &TempDir, name: &str, body: &str) -> String {
        let path = dir.path().join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.display().to_string()
    }

    #[tokio::test]
    async fn captures_stdout_of_a_clean_run() {
        let dir = TempDir::new().unwrap();
        let cmd = script(&dir, "report", "echo 'VolumeName: vol'");
        assert_eq!(fetch(&cmd).await.unwrap(), "VolumeName: vol\n");
    }

    #[tokio::test]
    async fn arguments_are_split_on_whitespace() {
        assert_eq!(fetch("echo volume info").await.unwrap(), "volume info\n");
    }

    #[tokio::test]
    async fn stderr_output_is_fatal() {
        let dir = TempDir::new().unwrap();
        let cmd = script(&dir, "report", "echo fine\necho 'cluster unwell' >&2");
        assert!(matches!(
            fetch(&cmd).await,
            Err(ReportError::Stderr { ref stderr, .. }) if stderr == "cluster unwell"
        ));
    }

    #[tokio::test]
    async fn non_zero_exit_is_fatal() {
        let dir = TempDir::new().unwrap();
        let cmd = script(&dir, "report", "exit 3");
        assert!(matches!(fetch(&cmd).await, Err(ReportError::Failed { .. })));
    }

    #[tokio::test]
    async fn unresolvable_program_is_reported() {
        assert!(matches!(
            fetch("definitely-not-a-real-binary-name").await,
            Err(ReportError::ProgramNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn empty_command_is_rejected() {
        assert!(matches!(fetch("   ").await, Err(ReportError::EmptyCommand)));
    }
}
