use std::io::Write;

use bytes::Bytes;

use crate::status::Status;

pub const HTML: &str = "text/html";
pub const PLAIN: &str = "text/plain";

/// A complete, in-memory response. Built by exactly one case and sent once.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: Status,
    pub mime: &'static str,
    pub body: Bytes,
}

impl Response {
    pub fn ok(mime: &'static str, body: impl Into<Bytes>) -> Self {
        Self {
            status: Status::Ok,
            mime,
            body: body.into(),
        }
    }

    /// A plain text response for failures the case chain never sees.
    pub fn from_status(status: Status, msg: impl std::fmt::Display) -> Self {
        Self {
            status,
            mime: PLAIN,
            body: format!("{msg}\n").into(),
        }
    }

    /// Send this response.
    pub fn send<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        write!(writer, "HTTP/1.1 {}\r\n", self.status)?;
        write!(writer, "Content-Type: {}\r\n", self.mime)?;
        write!(writer, "Content-Length: {}\r\n", self.body.len())?;
        write!(writer, "Connection: close\r\n\r\n")?;
        writer.write_all(&self.body)?;
        writer.flush()
    }
}
