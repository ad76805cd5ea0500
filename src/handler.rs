//! Request classification: an ordered chain of cases, the first of which to
//! match a request answers it.

use std::path::Path;

use log::{debug, warn};

use crate::{
    config::Settings, content, failure::Failure, listing, request::Request, response::Response,
    script,
};

pub trait Handler: Send + Sync {
    /// The directory request paths are resolved against.
    fn root(&self) -> &Path;
    fn handle_request(&self, request: &Request) -> Response;
}

/// One rule of the chain. Rules hold no state; which one answers a request
/// depends only on where it sits in [`CHAIN`] and on the filesystem.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Case {
    /// Nothing exists at the resolved path.
    NotFound,
    /// An existing file named like a script. Run it.
    Script,
    /// Any other existing file.
    File,
    /// A directory holding the index file. Serve that.
    DirIndex,
    /// A directory without one. List it.
    DirListing,
    /// Matches anything, answers nothing.
    Fallback,
}

/// The order is load bearing: everything after `NotFound` may assume the path
/// exists, and `Script` must be tried before `File`.
pub const CHAIN: [Case; 6] = [
    Case::NotFound,
    Case::Script,
    Case::File,
    Case::DirIndex,
    Case::DirListing,
    Case::Fallback,
];

impl Case {
    pub fn test(&self, request: &Request, settings: &Settings) -> bool {
        let path = request.resolved();
        match self {
            Case::NotFound => !path.exists(),
            Case::Script => {
                path.is_file()
                    && path
                        .file_name()
                        .and_then(|name| name.to_str())
                        .is_some_and(|name| name.ends_with(settings.script_suffix.as_str()))
            }
            Case::File => path.is_file(),
            Case::DirIndex => path.is_dir() && path.join(&settings.index_file).is_file(),
            Case::DirListing => path.is_dir() && !path.join(&settings.index_file).is_file(),
            Case::Fallback => true,
        }
    }

    pub fn act(&self, request: &Request, settings: &Settings) -> Result<Response, Failure> {
        let path = request.resolved();
        let limit = settings.max_body_bytes;
        match self {
            Case::NotFound => Err(Failure::NotFound {
                path: request.path().to_owned(),
            }),
            Case::Script => script::run(&settings.interpreter, path, request.path(), limit),
            Case::File => content::serve(path, request.path(), limit),
            Case::DirIndex => {
                content::serve(&path.join(&settings.index_file), request.path(), limit)
            }
            Case::DirListing => listing::list(path, request.path()),
            Case::Fallback => Err(Failure::UnknownCase {
                path: request.path().to_owned(),
            }),
        }
    }
}

/// The case chain, with the settings every case reads.
#[derive(Debug)]
pub struct CaseChain {
    settings: Settings,
}

impl CaseChain {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// The first case whose test passes. `Fallback` always does.
    pub fn select(&self, request: &Request) -> Case {
        CHAIN
            .into_iter()
            .find(|case| case.test(request, &self.settings))
            .unwrap_or(Case::Fallback)
    }

    /// Run exactly one case. A failing case is rendered, never retried
    /// further down the chain.
    pub fn dispatch(&self, request: &Request) -> Response {
        let case = self.select(request);
        debug!("{} handled as {case:?}", request.path());
        case.act(request, &self.settings).unwrap_or_else(|failure| {
            warn!("{failure}");
            failure.render()
        })
    }
}

impl Handler for CaseChain {
    fn root(&self) -> &Path {
        &self.settings.root
    }

    fn handle_request(&self, request: &Request) -> Response {
        self.dispatch(request)
    }
}
