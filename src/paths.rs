//! URL path helpers: normalizing segments, composing mount paths and
//! extracting `:param` placeholders.

use crate::type_spec::Parameter;

const ROOT: &str = "/";
const DOUBLE_ROOT: &str = "//";

fn is_root(path: &str) -> bool {
    path == ROOT || path == DOUBLE_ROOT
}

/// Strips one leading and one trailing `/` from a path segment.
///
/// The root sentinels `/` and `//` are returned unchanged.
pub fn normalize(path: &str) -> &str {
    if is_root(path) {
        return path;
    }

    let path = path.strip_prefix('/').unwrap_or(path);
    path.strip_suffix('/').unwrap_or(path)
}

/// Joins path segments left to right into one absolute path.
///
/// Every non-root segment is wrapped as `/segment/`, and runs of `/` are
/// collapsed, so `compose(&["owner", "/:ownerId/", "dog"])` gives
/// `/owner/:ownerId/dog/`.
pub fn compose<S: AsRef<str>>(segments: &[S]) -> String {
    let mut joined = String::new();
    for segment in segments {
        let segment = normalize(segment.as_ref());
        if is_root(segment) {
            joined.push_str(segment);
        } else {
            joined.push('/');
            joined.push_str(segment);
            joined.push('/');
        }
    }

    collapse_separators(&joined)
}

fn collapse_separators(path: &str) -> String {
    let mut collapsed = String::with_capacity(path.len());
    for ch in path.chars() {
        if ch == '/' && collapsed.ends_with('/') {
            continue;
        }
        collapsed.push(ch);
    }
    collapsed
}

/// Names of the `:param` segments of a path, in order of appearance.
pub fn param_names(path: &str) -> Vec<&str> {
    path.split('/')
        .filter_map(|part| part.strip_prefix(':'))
        .filter(|name| !name.is_empty())
        .collect()
}

/// URL parameters implied by the `:param` segments of a path.
///
/// Each one is a required parameter of the default type.
pub fn params_from_path(path: &str) -> Vec<Parameter> {
    param_names(path)
        .into_iter()
        .map(|name| Parameter::normalize(name, crate::type_spec::DEFAULT_TYPE, Some(true), None))
        .collect()
}

/// Converts `:param` segments to the `{param}` placeholder syntax.
pub fn to_placeholder_syntax(path: &str) -> String {
    path.split('/')
        .map(|part| match part.strip_prefix(':') {
            Some(name) if !name.is_empty() => format!("{{{}}}", name),
            _ => part.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/")
}
