//! Everything that can stop a request from being answered with content, and
//! the single error page all of it is rendered as.

use crate::{
    html,
    response::{Response, HTML},
    status::Status,
};

/// Why dispatch stopped. Every variant names the request path that
/// triggered it; none of them are retried.
#[derive(Debug, thiserror::Error)]
pub enum Failure {
    #[error("'{path}' not found")]
    NotFound { path: String },
    #[error("'{path}' cannot be read: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("'{path}' cannot be listed: {source}")]
    List {
        path: String,
        source: std::io::Error,
    },
    #[error("Script '{path}' could not be run: {source}")]
    ScriptIo {
        path: String,
        source: std::io::Error,
    },
    #[error("Script '{path}' failed ({status}): {stderr}")]
    Script {
        path: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
    #[error("'{path}' exceeds the {limit} byte limit")]
    ResourceLimitExceeded { path: String, limit: u64 },
    #[error("Unknown object '{path}'")]
    UnknownCase { path: String },
}

impl Failure {
    pub fn path(&self) -> &str {
        match self {
            Failure::NotFound { path }
            | Failure::Read { path, .. }
            | Failure::List { path, .. }
            | Failure::ScriptIo { path, .. }
            | Failure::Script { path, .. }
            | Failure::ResourceLimitExceeded { path, .. }
            | Failure::UnknownCase { path } => path,
        }
    }

    /// Render as the error page. Always a 404.
    pub fn render(&self) -> Response {
        let body = format!(
            "<html>\n<body>\n<h1>Error accessing {}</h1>\n<p>{}</p>\n</body>\n</html>\n",
            html::escape(self.path()),
            html::escape(&self.to_string()),
        );
        Response {
            status: Status::NotFound,
            mime: HTML,
            body: body.into(),
        }
    }
}
