use std::{fs::File, io::Read, path::Path};

use crate::{failure::Failure, response::Response};

pub const OCTET_STREAM: &str = "application/octet-stream";

#[rustfmt::skip]
static MIME_TYPES: &[(&str, &str)] = &[
    ("html", "text/html"),
    ("htm",  "text/html"),
    ("txt",  "text/plain"),
    ("py",   "text/plain"),
    ("css",  "text/css"),
    ("js",   "application/javascript"),
    ("json", "application/json"),
    ("jpg",  "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png",  "image/png"),
    ("gif",  "image/gif"),
    ("svg",  "image/svg+xml"),
    ("ico",  "image/x-icon"),
];

pub fn mime_type(path: &Path) -> &'static str {
    path.extension()
        .and_then(|s| s.to_str())
        .and_then(|ext| {
            MIME_TYPES
                .iter()
                .find(|(known, _)| known.eq_ignore_ascii_case(ext))
        })
        .map_or(OCTET_STREAM, |&(_, mime)| mime)
}

/// Read the whole of `file` into a response typed by its extension.
///
/// `request_path` is only used to name the request in failures; `limit`
/// bounds how much will be read, however large the file claims to be.
pub fn serve(file: &Path, request_path: &str, limit: u64) -> Result<Response, Failure> {
    let read_err = |source| Failure::Read {
        path: request_path.to_owned(),
        source,
    };
    let too_large = || Failure::ResourceLimitExceeded {
        path: request_path.to_owned(),
        limit,
    };

    let handle = File::open(file).map_err(read_err)?;
    let len = handle.metadata().map_err(read_err)?.len();
    if len > limit {
        return Err(too_large());
    }

    let mut body = Vec::with_capacity(len as usize);
    handle
        .take(limit.saturating_add(1))
        .read_to_end(&mut body)
        .map_err(read_err)?;
    if body.len() as u64 > limit {
        return Err(too_large());
    }
    Ok(Response::ok(mime_type(file), body))
}

#[cfg(test)]
mod test {
    use super::*;
    use anyhow::Result;
    use rstest::rstest;
    use tempfile::TempDir;

    use crate::status::Status;

    #[rstest]
    #[case("page.html", "text/html")]
    #[case("PHOTO.JPG", "image/jpeg")]
    #[case("notes.txt", "text/plain")]
    #[case("script.py", "text/plain")]
    #[case::unknown("archive.tar.zst", OCTET_STREAM)]
    #[case::none("Makefile", OCTET_STREAM)]
    #[case::dotfile(".bashrc", OCTET_STREAM)]
    fn content_type_follows_the_extension(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(mime_type(Path::new(name)), expected);
    }

    #[test]
    fn serves_the_exact_bytes() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("blob.png");
        let bytes: Vec<u8> = (0..=255).collect();
        std::fs::write(&path, &bytes)?;

        let resp = serve(&path, "/blob.png", 1024)?;

        assert_eq!(resp.status, Status::Ok);
        assert_eq!(resp.mime, "image/png");
        assert_eq!(resp.body.as_ref(), bytes.as_slice());
        Ok(())
    }

    #[test]
    fn serving_twice_gives_identical_responses() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "same every time")?;

        assert_eq!(serve(&path, "/a.txt", 1024)?, serve(&path, "/a.txt", 1024)?);
        Ok(())
    }

    #[test]
    fn a_missing_file_is_a_read_error() {
        let dir = TempDir::new().expect("tempdir");
        let result = serve(&dir.path().join("gone.txt"), "/gone.txt", 1024);
        assert!(matches!(result, Err(Failure::Read { path, .. }) if path == "/gone.txt"));
    }

    #[test]
    fn the_largest_limit_still_serves_the_whole_file() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "hello")?;

        let resp = serve(&path, "/a.txt", u64::MAX)?;

        assert_eq!(resp.body.as_ref(), b"hello");
        Ok(())
    }

    #[test]
    fn a_file_over_the_limit_is_refused() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("big.txt");
        std::fs::write(&path, "0123456789")?;

        assert!(serve(&path, "/big.txt", 10).is_ok());
        assert!(matches!(
            serve(&path, "/big.txt", 9),
            Err(Failure::ResourceLimitExceeded { limit: 9, .. })
        ));
        Ok(())
    }
}
