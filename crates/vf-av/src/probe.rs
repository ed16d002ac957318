//! Container duration probing via `ffprobe`.
//!
//! Asks ffprobe for nothing but `format=duration`, printed as bare decimal
//! text, and parses it into seconds.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::command::ToolCommand;
use crate::tools::ToolRegistry;

/// Build the ffprobe invocation that prints only the container duration.
pub fn duration_command(ffprobe: PathBuf, source: &Path, timeout: Duration) -> ToolCommand {
    let mut cmd = ToolCommand::new(ffprobe);
    cmd.timeout(timeout);
    cmd.args([
        "-v", "error",
        "-show_entries", "format=duration",
        "-of", "default=noprint_wrappers=1:nokey=1",
    ]);
    cmd.arg(source.to_string_lossy().as_ref());
    cmd
}

/// Parse ffprobe's duration output.
///
/// Returns `None` unless the trimmed text is a finite, strictly positive
/// number of seconds. ffprobe prints `N/A` for streams without a duration.
pub fn parse_duration(stdout: &str) -> Option<f64> {
    stdout
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|secs| secs.is_finite() && *secs > 0.0)
}

/// Probe the duration of `source` in seconds.
///
/// # Errors
///
/// Returns [`vf_core::Error::Probe`] when ffprobe is missing, cannot be
/// spawned, times out, exits non-zero, or prints something that is not a
/// usable duration. The raw stdout and stderr are kept on the error when the
/// process ran.
pub async fn probe_duration(
    tools: &ToolRegistry,
    source: &Path,
    timeout: Duration,
) -> vf_core::Result<f64> {
    let ffprobe = tools
        .require("ffprobe")
        .map_err(|e| vf_core::Error::probe(e.to_string()))?;

    tracing::debug!(source = %source.display(), "Probing duration");

    let output = duration_command(ffprobe.path.clone(), source, timeout)
        .output()
        .await
        .map_err(|e| vf_core::Error::probe(e.to_string()))?;

    if !output.status.success() {
        return Err(vf_core::Error::Probe {
            message: format!(
                "ffprobe exited with status {} for {}",
                output.status,
                source.display()
            ),
            stdout: output.stdout,
            stderr: output.stderr,
        });
    }

    match parse_duration(&output.stdout) {
        Some(secs) => Ok(secs),
        None => Err(vf_core::Error::Probe {
            message: format!(
                "unparseable duration {:?} for {}",
                output.stdout.trim(),
                source.display()
            ),
            stdout: output.stdout,
            stderr: output.stderr,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_plain_decimal() {
        assert_eq!(parse_duration("12.345\n"), Some(12.345));
        assert_eq!(parse_duration("  60 "), Some(60.0));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(parse_duration("N/A"), None);
        assert_eq!(parse_duration(""), None);
        assert_eq!(parse_duration("duration=12.3"), None);
    }

    #[test]
    fn parse_rejects_non_positive_and_non_finite() {
        assert_eq!(parse_duration("0"), None);
        assert_eq!(parse_duration("-1.5"), None);
        assert_eq!(parse_duration("inf"), None);
        assert_eq!(parse_duration("NaN"), None);
    }

    #[test]
    fn command_requests_bare_duration() {
        let cmd = duration_command(
            PathBuf::from("ffprobe"),
            Path::new("/uploads/a b.mp4"),
            Duration::from_secs(5),
        );
        let args = cmd.get_args();
        assert_eq!(args.last().map(String::as_str), Some("/uploads/a b.mp4"));
        assert!(args.windows(2).any(|w| w == ["-show_entries", "format=duration"]));
        assert!(args
            .windows(2)
            .any(|w| w == ["-of", "default=noprint_wrappers=1:nokey=1"]));
    }

    #[cfg(unix)]
    mod with_fake_ffprobe {
        use super::*;
        use std::os::unix::fs::PermissionsExt;
        use vf_core::config::ToolsConfig;

        fn registry_with_script(dir: &Path, body: &str) -> ToolRegistry {
            let script = dir.join("ffprobe");
            std::fs::write(&script, format!("#!/bin/sh\n{body}\n")).unwrap();
            std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
            ToolRegistry::discover(&ToolsConfig {
                ffmpeg_path: None,
                ffprobe_path: Some(script),
            })
        }

        #[tokio::test]
        async fn probe_reads_duration() {
            let dir = tempfile::tempdir().unwrap();
            let tools = registry_with_script(dir.path(), "echo 12.345");
            let secs = probe_duration(&tools, Path::new("/x.mp4"), Duration::from_secs(5))
                .await
                .unwrap();
            assert_eq!(secs, 12.345);
        }

        #[tokio::test]
        async fn probe_failure_keeps_stderr() {
            let dir = tempfile::tempdir().unwrap();
            let tools = registry_with_script(dir.path(), "echo 'moov atom not found' >&2; exit 1");
            let err = probe_duration(&tools, Path::new("/x.mp4"), Duration::from_secs(5))
                .await
                .unwrap_err();
            match err {
                vf_core::Error::Probe { stderr, .. } => {
                    assert!(stderr.contains("moov atom not found"))
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }

        #[tokio::test]
        async fn probe_unparseable_output() {
            let dir = tempfile::tempdir().unwrap();
            let tools = registry_with_script(dir.path(), "echo N/A");
            let err = probe_duration(&tools, Path::new("/x.mp4"), Duration::from_secs(5))
                .await
                .unwrap_err();
            match err {
                vf_core::Error::Probe { stdout, message, .. } => {
                    assert_eq!(stdout.trim(), "N/A");
                    assert!(message.contains("unparseable"));
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }

        #[tokio::test]
        async fn probe_timeout_is_probe_error() {
            let dir = tempfile::tempdir().unwrap();
            let tools = registry_with_script(dir.path(), "sleep 10");
            let err = probe_duration(&tools, Path::new("/x.mp4"), Duration::from_millis(100))
                .await
                .unwrap_err();
            assert_eq!(err.kind(), "probe");
            assert!(err.to_string().contains("timed out"));
        }
    }
}
