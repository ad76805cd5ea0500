use std::{
    io::{BufRead, BufReader, Read, Write},
    net::{SocketAddr, TcpListener, ToSocketAddrs},
    path::Path,
    sync::Arc,
    thread,
};

use anyhow::Context;
use log::{debug, info, warn};

use crate::{
    cli,
    config::Settings,
    handler::{CaseChain, Handler},
    request::{Request, RequestError},
    response::Response,
    status::Status,
};

/// Largest request head (request line plus headers) we will read.
const MAX_HEAD_BYTES: usize = 8 * 1024;
const MAX_HEADERS: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO failed: `{0:?}`")]
    IO(#[from] std::io::Error),
    #[error("Connection closed before a request was sent")]
    Closed,
    #[error("Connection closed mid-request")]
    Truncated,
    #[error("The request head exceeded {MAX_HEAD_BYTES} bytes")]
    HeadTooLong,
    #[error("Malformed request: `{0}`")]
    Parse(#[from] httparse::Error),
    #[error("Invalid request: {0}")]
    Request(#[from] RequestError),
    #[error("Unsupported method `{0}`")]
    Method(String),
}

type Result<T> = std::result::Result<T, Error>;

impl From<&Error> for Response {
    fn from(value: &Error) -> Self {
        match value {
            Error::Method(_) => Response::from_status(Status::NotImplemented, value),
            _ => Response::from_status(Status::BadRequest, value),
        }
    }
}

/// Read up to and including the blank line ending the request head.
fn read_head<R: Read>(stream: R) -> Result<Vec<u8>> {
    let mut reader = BufReader::new(stream.take(MAX_HEAD_BYTES as u64 + 1));
    let mut head = Vec::with_capacity(1024);
    loop {
        let read = reader.read_until(b'\n', &mut head)?;
        if head.ends_with(b"\r\n\r\n") || head.ends_with(b"\n\n") {
            return Ok(head);
        }
        if head.len() > MAX_HEAD_BYTES {
            return Err(Error::HeadTooLong);
        }
        if read == 0 {
            return Err(if head.is_empty() {
                Error::Closed
            } else {
                Error::Truncated
            });
        }
    }
}

fn parse_head(head: &[u8], root: &Path, client: SocketAddr) -> Result<Request> {
    let mut headers = [httparse::EMPTY_HEADER; MAX_HEADERS];
    let mut req = httparse::Request::new(&mut headers);
    if req.parse(head)?.is_partial() {
        return Err(Error::Truncated);
    }
    let method = req.method.unwrap_or_default();
    if method != "GET" {
        return Err(Error::Method(method.to_owned()));
    }
    Ok(Request::resolve(
        req.path.unwrap_or("/"),
        root,
        method,
        client,
    )?)
}

pub struct Server<H> {
    handler: H,
    listener: TcpListener,
}

impl<H: Handler + 'static> Server<H> {
    pub fn new(addr: impl ToSocketAddrs, handler: H) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(addr).context("Binding listener")?;
        Ok(Self { handler, listener })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn root(&self) -> &Path {
        self.handler.root()
    }

    /// Answer exactly one request on `stream`.
    fn handle<S: Read + Write>(&self, mut stream: S, client: SocketAddr) {
        let resp = match read_head(&mut stream).and_then(|h| parse_head(&h, self.root(), client)) {
            Ok(request) => {
                let resp = self.handler.handle_request(&request);
                let elapsed = request.received().elapsed().unwrap_or_default();
                info!(
                    "{} {} {} -> {} ({elapsed:?})",
                    request.client(),
                    request.method(),
                    request.path(),
                    resp.status.code().as_u16(),
                );
                resp
            }
            Err(Error::Closed) => {
                debug!("{client} closed without a request");
                return;
            }
            Err(e) => {
                info!("{client} rejected: {e}");
                Response::from(&e)
            }
        };
        let _ = resp
            .send(&mut stream)
            .inspect_err(|e| warn!("Failed to send response to {client}: {e:?}"));
    }

    /// Accept forever, one thread per connection.
    pub fn run(self) -> anyhow::Result<()> {
        let server = Arc::new(self);
        loop {
            let (stream, client) = match server.listener.accept() {
                Ok(conn) => conn,
                Err(e) => {
                    warn!("Failed to accept connection: {e:?}");
                    continue;
                }
            };
            let server = server.clone();
            thread::Builder::new()
                .name(format!("conn-{client}"))
                .spawn(move || server.handle(stream, client))
                .context("Spawning connection thread")?;
        }
    }
}

impl TryFrom<&cli::Serve> for Server<CaseChain> {
    type Error = anyhow::Error;
    fn try_from(value: &cli::Serve) -> std::result::Result<Self, Self::Error> {
        let settings = Settings::try_from(value)?;
        Self::new((value.host.as_str(), value.port), CaseChain::new(settings))
    }
}
