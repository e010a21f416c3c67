// File: src/generator/source.rs
//! Where word lists come from: an external process fed the prompt on stdin.

use crate::config::LexiconConfig;
use async_trait::async_trait;
use std::io;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, Command};
use tracing::{debug, warn};

/// Per-item failures. The batch generator recovers from all of them.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("I/O with generation process: {0}")]
    Io(#[from] io::Error),

    #[error("generation process exited with {status}: {stderr}")]
    Exit { status: ExitStatus, stderr: String },

    #[error("generation process timed out after {0:?}")]
    Timeout(Duration),

    #[error("output is not a JSON array of strings")]
    InvalidOutput,
}

/// Answers a prompt with raw text.
#[async_trait]
pub trait WordSource: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, GenerateError>;
}

/// Runs `program args..` once per prompt, bounded by a timeout.
#[derive(Debug, Clone)]
pub struct ProcessSource {
    program: String,
    args: Vec<String>,
    timeout: Duration,
    kill_grace: Duration,
}

impl ProcessSource {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            timeout: Duration::from_secs(crate::config::DEFAULT_TIMEOUT_SECS),
            kill_grace: Duration::from_secs(crate::config::DEFAULT_KILL_GRACE_SECS),
        }
    }

    pub fn from_config(config: &LexiconConfig) -> Self {
        Self::new(config.program.clone(), config.args.clone())
            .with_timeout(config.timeout(), config.kill_grace())
    }

    pub fn with_timeout(mut self, timeout: Duration, kill_grace: Duration) -> Self {
        self.timeout = timeout;
        self.kill_grace = kill_grace;
        self
    }
}

#[async_trait]
impl WordSource for ProcessSource {
    async fn complete(&self, prompt: &str) -> Result<String, GenerateError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| GenerateError::Spawn { program: self.program.clone(), source })?;

        let stdin = child.stdin.take();
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let exchange = async {
            let write = async move {
                if let Some(mut stdin) = stdin {
                    match stdin.write_all(prompt.as_bytes()).await {
                        // the process may exit without reading its input
                        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                            debug!("generation process closed stdin early")
                        }
                        other => other?,
                    }
                    // dropping stdin closes the pipe
                }
                Ok::<_, io::Error>(())
            };
            let (written, out, err) = tokio::join!(write, read_all(stdout), read_all(stderr));
            written?;
            let status = child.wait().await?;
            Ok::<_, io::Error>((out?, err?, status))
        };

        let outcome = tokio::time::timeout(self.timeout, exchange).await;
        match outcome {
            Ok(Ok((out, err, status))) => {
                if status.success() {
                    Ok(String::from_utf8_lossy(&out).into_owned())
                } else {
                    Err(GenerateError::Exit {
                        status,
                        stderr: String::from_utf8_lossy(&err).trim().to_string(),
                    })
                }
            }
            Ok(Err(e)) => Err(GenerateError::Io(e)),
            Err(_) => {
                terminate(&mut child, self.kill_grace).await;
                Err(GenerateError::Timeout(self.timeout))
            }
        }
    }
}

async fn read_all<R: AsyncRead + Unpin>(reader: Option<R>) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut reader) = reader {
        reader.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

/// SIGTERM, wait up to `grace`, then SIGKILL.
async fn terminate(child: &mut Child, grace: Duration) {
    if request_termination(child) {
        if let Ok(Ok(status)) = tokio::time::timeout(grace, child.wait()).await {
            debug!(%status, "generation process exited after SIGTERM");
            return;
        }
    }
    if let Err(e) = child.kill().await {
        warn!(error = %e, "failed to kill generation process");
    }
}

#[cfg(unix)]
fn request_termination(child: &Child) -> bool {
    match child.id() {
        // SAFETY: plain kill(2) on the pid of a child we have not reaped yet.
        Some(pid) => unsafe { libc::kill(pid as libc::pid_t, libc::SIGTERM) == 0 },
        None => false,
    }
}

#[cfg(not(unix))]
fn request_termination(_child: &Child) -> bool {
    false
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Instant;

    fn sh(script: &str) -> ProcessSource {
        ProcessSource::new("sh", vec!["-c".to_string(), script.to_string()])
    }

    #[tokio::test]
    async fn prompt_arrives_on_stdin() {
        let echoed = sh("cat").complete("describe 🎲").await.unwrap();
        assert_eq!(echoed, "describe 🎲");
    }

    #[tokio::test]
    async fn stdout_is_returned_on_success() {
        let out = sh(r#"cat >/dev/null; echo '["dice", "luck"]'"#).complete("x").await.unwrap();
        assert_eq!(out.trim(), r#"["dice", "luck"]"#);
    }

    #[tokio::test]
    async fn ignoring_stdin_is_not_an_error() {
        let out = sh("echo done").complete(&"p".repeat(1 << 20)).await.unwrap();
        assert_eq!(out.trim(), "done");
    }

    #[tokio::test]
    async fn non_zero_exit_is_reported() {
        let err = sh("echo boom >&2; exit 3").complete("x").await.unwrap_err();
        match err {
            GenerateError::Exit { status, stderr } => {
                assert_eq!(status.code(), Some(3));
                assert_eq!(stderr, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let source = ProcessSource::new("definitely-not-an-installed-program-7f3a", vec![]);
        assert!(matches!(source.complete("x").await, Err(GenerateError::Spawn { .. })));
    }

    #[tokio::test]
    async fn timeout_terminates_the_process() {
        let source = sh("sleep 5").with_timeout(Duration::from_millis(200), Duration::from_millis(200));
        let started = Instant::now();
        let err = source.complete("x").await.unwrap_err();
        assert!(matches!(err, GenerateError::Timeout(_)));
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test]
    async fn sigterm_ignored_falls_through_to_kill() {
        let source = sh("trap '' TERM; while true; do sleep 0.05; done")
            .with_timeout(Duration::from_millis(200), Duration::from_millis(200));
        let started = Instant::now();
        let err = source.complete("x").await.unwrap_err();
        assert!(matches!(err, GenerateError::Timeout(_)));
        assert!(started.elapsed() < Duration::from_secs(3));
    }
}
