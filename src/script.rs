use std::{
    io::Read,
    path::Path,
    process::{Command, Stdio},
};

use log::{debug, warn};

use crate::{
    failure::Failure,
    response::{Response, HTML},
};

/// Read at most `limit` bytes of `pipe`, then drain the rest so the child
/// never blocks on a full pipe.
fn capture_truncated<R: Read>(pipe: Option<R>, limit: u64) -> String {
    let Some(mut pipe) = pipe else {
        return String::new();
    };
    let mut buf = Vec::new();
    if let Err(e) = pipe.by_ref().take(limit).read_to_end(&mut buf) {
        debug!("Reading script stderr failed after {} bytes: {e}", buf.len());
    }
    if let Err(e) = std::io::copy(&mut pipe, &mut std::io::sink()) {
        debug!("Draining script stderr failed: {e}");
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Run `<interpreter> <script>` to completion and answer with its stdout.
///
/// Only the exit code decides success: a script that writes to stderr and
/// exits 0 still succeeds. Blocks until the child exits.
pub fn run(
    interpreter: &Path,
    script: &Path,
    request_path: &str,
    limit: u64,
) -> Result<Response, Failure> {
    let io_err = |source| Failure::ScriptIo {
        path: request_path.to_owned(),
        source,
    };

    debug!("Running {} {}", interpreter.display(), script.display());
    let mut child = Command::new(interpreter)
        .arg(script)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(io_err)?;

    let stderr = child.stderr.take();
    let stderr = std::thread::spawn(move || capture_truncated(stderr, limit));

    let mut stdout = Vec::new();
    let read = child.stdout.take().map_or(Ok(0), |pipe| {
        pipe.take(limit.saturating_add(1))
            .read_to_end(&mut stdout)
    });
    let failure = match read {
        Err(e) => Some(io_err(e)),
        Ok(_) if stdout.len() as u64 > limit => Some(Failure::ResourceLimitExceeded {
            path: request_path.to_owned(),
            limit,
        }),
        Ok(_) => None,
    };
    if let Some(failure) = failure {
        let _ = child.kill();
        let _ = child.wait();
        let _ = stderr.join();
        return Err(failure);
    }

    let status = child.wait().map_err(io_err)?;
    let stderr = stderr.join().unwrap_or_default();
    let stderr = stderr.trim_end();

    if !status.success() {
        return Err(Failure::Script {
            path: request_path.to_owned(),
            status,
            stderr: stderr.to_owned(),
        });
    }
    if !stderr.is_empty() {
        warn!("{request_path} succeeded with stderr output: {stderr}");
    }
    Ok(Response::ok(HTML, stdout))
}

#[cfg(all(test, unix))]
mod test {
    use super::*;
    use anyhow::Result;
    use tempfile::TempDir;

    use crate::status::Status;

    fn script(dir: &TempDir, body: &str) -> Result<std::path::PathBuf> {
        let path = dir.path().join("script.sh");
        std::fs::write(&path, body)?;
        Ok(path)
    }

    #[test]
    fn stdout_is_the_body_on_success() -> Result<()> {
        let dir = TempDir::new()?;
        let path = script(&dir, "printf '<p>hello</p>'\n")?;

        let resp = run(Path::new("sh"), &path, "/script.sh", 1024)?;

        assert_eq!(resp.status, Status::Ok);
        assert_eq!(resp.mime, "text/html");
        assert_eq!(resp.body.as_ref(), b"<p>hello</p>");
        Ok(())
    }

    #[test]
    fn a_nonzero_exit_fails_with_stderr() -> Result<()> {
        let dir = TempDir::new()?;
        let path = script(&dir, "echo partial\necho 'it broke' >&2\nexit 3\n")?;

        let err = run(Path::new("sh"), &path, "/script.sh", 1024).unwrap_err();

        assert!(matches!(&err, Failure::Script { stderr, .. } if stderr == "it broke"));
        assert!(err.to_string().contains("it broke"));
        assert_eq!(err.path(), "/script.sh");
        Ok(())
    }

    #[test]
    fn stderr_alone_is_not_fatal() -> Result<()> {
        let dir = TempDir::new()?;
        let path = script(&dir, "echo 'just a warning' >&2\nprintf ok\n")?;

        let resp = run(Path::new("sh"), &path, "/script.sh", 1024)?;

        assert_eq!(resp.body.as_ref(), b"ok");
        Ok(())
    }

    #[test]
    fn a_missing_interpreter_is_reported() -> Result<()> {
        let dir = TempDir::new()?;
        let path = script(&dir, "printf ok\n")?;

        let err = run(Path::new("/no/such/interpreter"), &path, "/script.sh", 1024).unwrap_err();

        assert!(matches!(err, Failure::ScriptIo { .. }));
        Ok(())
    }

    #[test]
    fn output_over_the_limit_is_refused() -> Result<()> {
        let dir = TempDir::new()?;
        let path = script(&dir, "printf 0123456789\n")?;

        assert!(run(Path::new("sh"), &path, "/script.sh", 10).is_ok());
        let err = run(Path::new("sh"), &path, "/script.sh", 9).unwrap_err();
        assert!(matches!(err, Failure::ResourceLimitExceeded { limit: 9, .. }));
        Ok(())
    }

    #[test]
    fn the_largest_limit_keeps_all_output() -> Result<()> {
        let dir = TempDir::new()?;
        let path = script(&dir, "printf 0123456789\n")?;

        let resp = run(Path::new("sh"), &path, "/script.sh", u64::MAX)?;

        assert_eq!(resp.body.as_ref(), b"0123456789");
        Ok(())
    }

    #[test]
    fn stderr_is_truncated_to_the_limit() -> Result<()> {
        let dir = TempDir::new()?;
        let path = script(&dir, "printf 0123456789 >&2\nexit 1\n")?;

        let err = run(Path::new("sh"), &path, "/script.sh", 4).unwrap_err();

        assert!(matches!(&err, Failure::Script { stderr, .. } if stderr == "0123"));
        Ok(())
    }
}
