//! Relative path resolution
//!
//! A relative [`To`] resolves against a pathname segment by segment: `.` is
//! dropped, `..` removes one segment (never going above the root) and anything
//! else is appended. [`resolve_to`] adds route awareness: leading `..`
//! segments walk up matched route levels instead of URL segments.

use crate::location::{Path, To};

/// Resolve `to` against `from_pathname`.
///
/// # Example
///
/// ```
/// use nav_router::resolve_path;
///
/// assert_eq!(resolve_path("../login", "/auth/").pathname, "/login");
/// assert_eq!(resolve_path("settings?tab=2", "/account").pathname, "/account/settings");
/// assert_eq!(resolve_path("?tab=2", "/account").search, "?tab=2");
/// ```
pub fn resolve_path(to: impl Into<To>, from_pathname: &str) -> Path {
    let to = to.into();
    let pathname = match to.pathname.as_deref() {
        Some(pathname) if pathname.starts_with('/') => pathname.to_string(),
        Some(pathname) if !pathname.is_empty() => resolve_pathname(pathname, from_pathname),
        _ => from_pathname.to_string(),
    };

    Path {
        pathname,
        search: normalize_search(to.search.as_deref().unwrap_or("")),
        hash: normalize_hash(to.hash.as_deref().unwrap_or("")),
    }
}

fn resolve_pathname(relative_path: &str, from_pathname: &str) -> String {
    let mut segments: Vec<&str> = from_pathname.trim_end_matches('/').split('/').collect();

    for segment in relative_path.split('/') {
        match segment {
            ".." => {
                // The first segment is the empty root
                if segments.len() > 1 {
                    segments.pop();
                }
            }
            "." => {}
            _ => segments.push(segment),
        }
    }

    if segments.len() > 1 {
        segments.join("/")
    } else {
        "/".to_string()
    }
}

/// Resolve a navigation target in the context of matched routes.
///
/// `ancestor_pathnames` holds the pathname base of every matched route level,
/// outermost first. A target without a pathname resolves against
/// `location_pathname`; an empty target (`""`) counts as an empty pathname.
/// Otherwise it resolves against the innermost ancestor, one level further
/// out for each leading `..`; running out of levels falls back to `/`. A
/// trailing `/` on the requested pathname is kept.
///
/// # Example
///
/// ```
/// use nav_router::resolve_to;
///
/// let ancestors = ["/", "/users", "/users/42"];
///
/// assert_eq!(resolve_to("edit", &ancestors, "/users/42").pathname, "/users/42/edit");
/// assert_eq!(resolve_to("../7", &ancestors, "/users/42").pathname, "/users/7");
/// assert_eq!(resolve_to("?page=2", &ancestors, "/users/42/posts").pathname, "/users/42/posts");
/// ```
pub fn resolve_to<S: AsRef<str>>(
    to: impl Into<To>,
    ancestor_pathnames: &[S],
    location_pathname: &str,
) -> Path {
    let mut to = to.into();
    if to.is_empty() {
        to.pathname = Some(String::new());
    }
    let requested = to
        .pathname
        .as_deref()
        .map(|pathname| if pathname.is_empty() { "/" } else { pathname })
        .map(str::to_string);

    let from = match requested.as_deref() {
        None => location_pathname.to_string(),
        Some(requested) => {
            let mut level = ancestor_pathnames.len() as isize - 1;

            if requested.starts_with("..") {
                let mut segments: Vec<&str> = requested.split('/').collect();
                let ups = segments.iter().take_while(|s| **s == "..").count();
                segments.drain(..ups);
                level -= ups as isize;
                to.pathname = Some(segments.join("/"));
            }

            usize::try_from(level)
                .ok()
                .and_then(|level| ancestor_pathnames.get(level))
                .map_or_else(|| "/".to_string(), |p| p.as_ref().to_string())
        }
    };

    let mut path = resolve_path(to, &from);

    if let Some(requested) = requested {
        if requested != "/" && requested.ends_with('/') && !path.pathname.ends_with('/') {
            path.pathname.push('/');
        }
    }

    path
}

/// Join path pieces with `/` and collapse repeated slashes
pub fn join_paths<S: AsRef<str>>(paths: &[S]) -> String {
    let joined = paths
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("/");

    let mut out = String::with_capacity(joined.len());
    for c in joined.chars() {
        if c == '/' && out.ends_with('/') {
            continue;
        }
        out.push(c);
    }
    out
}

/// Remove trailing slashes and ensure exactly one leading slash
pub fn normalize_pathname(pathname: &str) -> String {
    format!(
        "/{}",
        pathname.trim_end_matches('/').trim_start_matches('/')
    )
}

/// `""` and `"?"` become empty; otherwise a leading `?` is ensured
pub fn normalize_search(search: &str) -> String {
    match search {
        "" | "?" => String::new(),
        s if s.starts_with('?') => s.to_string(),
        s => format!("?{s}"),
    }
}

/// `""` and `"#"` become empty; otherwise a leading `#` is ensured
pub fn normalize_hash(hash: &str) -> String {
    match hash {
        "" | "#" => String::new(),
        h if h.starts_with('#') => h.to_string(),
        h => format!("#{h}"),
    }
}

/// Remove `basename` from the front of `pathname`.
///
/// The comparison ignores case and the basename must be followed by `/` or
/// the end of the pathname. Returns `None` when the pathname lies outside the
/// basename.
///
/// # Example
///
/// ```
/// use nav_router::strip_basename;
///
/// assert_eq!(strip_basename("/app/users", "/app"), Some("/users".to_string()));
/// assert_eq!(strip_basename("/APP", "/app"), Some("/".to_string()));
/// assert_eq!(strip_basename("/application", "/app"), None);
/// ```
pub fn strip_basename(pathname: &str, basename: &str) -> Option<String> {
    if basename == "/" {
        return Some(pathname.to_string());
    }

    let prefix = pathname.get(..basename.len())?;
    if prefix.to_lowercase() != basename.to_lowercase() {
        return None;
    }

    let rest = &pathname[basename.len()..];
    if !rest.is_empty() && !rest.starts_with('/') {
        return None;
    }

    Some(if rest.is_empty() {
        "/".to_string()
    } else {
        rest.to_string()
    })
}
