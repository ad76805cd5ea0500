use std::path::Path;

use log::debug;

use crate::{
    failure::Failure,
    html,
    response::{Response, HTML},
};

/// Entries whose name starts with this are never listed. Neither are names
/// which are not UTF-8, since no request path can reach them.
pub const HIDDEN_MARKER: char = '.';

/// Link target for `name` inside the directory at `request_path`.
///
/// Built from the request path only, so the listing never shows where the
/// served root lives on disk.
fn href(request_path: &str, name: &str) -> String {
    let mut href = String::new();
    for segment in request_path.split('/').filter(|s| !s.is_empty()) {
        href.push('/');
        href.push_str(&urlencoding::encode(segment));
    }
    href.push('/');
    href.push_str(&urlencoding::encode(name));
    href
}

/// List the visible children of `dir`, sorted by name.
pub fn list(dir: &Path, request_path: &str) -> Result<Response, Failure> {
    let list_err = |source| Failure::List {
        path: request_path.to_owned(),
        source,
    };

    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(list_err)? {
        match entry.map_err(list_err)?.file_name().into_string() {
            Ok(name) if !name.starts_with(HIDDEN_MARKER) => names.push(name),
            Ok(_) => {}
            Err(raw) => debug!("Not listing non-UTF-8 entry {raw:?} in {request_path}"),
        }
    }
    names.sort();

    let items = names
        .iter()
        .map(|name| {
            format!(
                "<li><a href=\"{}\">{}</a></li>\n",
                html::escape(&href(request_path, name)),
                html::escape(name),
            )
        })
        .collect::<String>();
    let page = format!("<html>\n<head>\n</head>\n<body>\n<ul>\n{items}</ul>\n</body>\n</html>\n");
    Ok(Response::ok(HTML, page))
}
