use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
    time::SystemTime,
};

use url::Url;

/// A GET request, resolved against the served root.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    path: String,
    resolved: PathBuf,
    client: SocketAddr,
    method: String,
    received: SystemTime,
}

#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("The request target must start with `/`.")]
    RelativeTarget,
    #[error("URI parse error: `{0:?}`.")]
    URIParseError(#[from] url::ParseError),
    #[error("The request path is not UTF-8 once decoded.")]
    NotUtf8(#[from] std::string::FromUtf8Error),
    #[error("The path segment `{0}` is not allowed.")]
    ForbiddenSegment(String),
}

impl Request {
    /// Decode `target` and join it onto `root`.
    ///
    /// Dot segments are normalised away before decoding, so `/../x` asks for
    /// `/x`. A segment which only turns into a separator or a dot segment
    /// after percent-decoding is refused rather than reinterpreted.
    pub fn resolve(
        target: &str,
        root: &Path,
        method: impl Into<String>,
        client: SocketAddr,
    ) -> Result<Self, RequestError> {
        if !target.starts_with('/') {
            return Err(RequestError::RelativeTarget);
        }
        let url = Url::parse(&format!("http://localhost{target}"))?;

        let mut segments = Vec::new();
        for raw in url.path().split('/').filter(|s| !s.is_empty()) {
            let segment = urlencoding::decode(raw)?.into_owned();
            if segment == ".."
                || segment == "."
                || segment.contains(['/', '\\', '\0'])
            {
                return Err(RequestError::ForbiddenSegment(segment));
            }
            segments.push(segment);
        }

        let mut path = format!("/{}", segments.join("/"));
        if !segments.is_empty() && url.path().ends_with('/') {
            path.push('/');
        }
        let resolved = segments.iter().fold(root.to_path_buf(), |p, s| p.join(s));

        Ok(Self {
            path,
            resolved,
            client,
            method: method.into(),
            received: SystemTime::now(),
        })
    }

    /// The decoded request path, always rooted at `/`.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn resolved(&self) -> &Path {
        &self.resolved
    }

    pub fn client(&self) -> SocketAddr {
        self.client
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn received(&self) -> SystemTime {
        self.received
    }
}

#[cfg(test)]
fn resolve(target: &str) -> Result<Request, RequestError> {
    let client = SocketAddr::from(([127, 0, 0, 1], 4000));
    Request::resolve(target, Path::new("/srv/www"), "GET", client)
}
