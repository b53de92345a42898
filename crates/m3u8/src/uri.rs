use std::path::{Component, Path, PathBuf};

use url::Url;

use crate::error::{M3u8Error, M3u8Result};

/// An entity whose uri may be relative to a base location inherited from its playlist.
pub trait HasBaseUri {
    fn uri(&self) -> Option<&str>;

    fn set_uri(&mut self, uri: String);

    fn base_uri(&self) -> Option<&str>;

    fn set_base_uri(&mut self, base_uri: Option<String>);

    /// The uri joined with the base location, or the uri itself when it is already absolute.
    ///
    /// Returns `Ok(None)` for entities without a uri.
    fn absolute_uri(&self) -> M3u8Result<Option<String>> {
        self.uri()
            .map(|uri| absolute_uri(self.base_uri(), uri))
            .transpose()
    }

    /// Directory component of the uri.
    fn base_path(&self) -> Option<&str> {
        self.uri().map(dirname)
    }

    /// Moves the uri under `base_path`, replacing its current directory component.
    fn set_base_path(&mut self, base_path: &str) {
        if let Some(uri) = self.uri().map(|uri| rebase(uri, base_path)) {
            self.set_uri(uri);
        }
    }
}

pub fn is_absolute_url(s: &str) -> bool {
    s.starts_with("http://")
        || s.starts_with("https://")
        || s.starts_with("file://")
        || s.starts_with("ftp://")
}

pub fn absolute_uri(base_uri: Option<&str>, uri: &str) -> M3u8Result<String> {
    if is_absolute_url(uri) {
        return Ok(uri.to_string());
    }
    let base_uri = base_uri.ok_or(M3u8Error::MissingBaseUri)?;
    urijoin(base_uri, uri)
}

/// Joins `path` onto `base_uri`.
///
/// Network bases follow url join rules. Local bases are joined as paths, with leading and
/// trailing slashes of `path` ignored and `.`/`..` components resolved lexically.
pub fn urijoin(base_uri: &str, path: &str) -> M3u8Result<String> {
    if is_absolute_url(base_uri) {
        Ok(Url::parse(base_uri)?.join(path)?.to_string())
    } else {
        let joined = Path::new(base_uri).join(path.trim_matches('/'));
        Ok(normalize_path(&joined).to_string_lossy().into_owned())
    }
}

/// Directory part of a network url, with a trailing slash.
///
/// `http://example.com/path/index.m3u8` -> `http://example.com/path/`
pub fn parsed_url(url: &str) -> M3u8Result<String> {
    Ok(Url::parse(url)?.join(".")?.to_string())
}

/// Everything before the last `/`, or an empty string when there is none.
pub fn dirname(uri: &str) -> &str {
    match uri.rfind('/') {
        Some(index) => {
            let head = &uri[..=index];
            match head.trim_end_matches('/') {
                "" => head,
                trimmed => trimmed,
            }
        }
        None => "",
    }
}

pub fn rebase(uri: &str, base_path: &str) -> String {
    match dirname(uri) {
        "" => format!("{base_path}/{uri}"),
        // root-level uri
        dir if dir.ends_with('/') => {
            format!("{}/{}", base_path.trim_end_matches('/'), &uri[dir.len()..])
        }
        dir => uri.replacen(dir, base_path, 1),
    }
}

fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            component => normalized.push(component),
        }
    }

    if normalized.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        normalized
    }
}
