//! Route definition
//!
//! A route tree is built by the caller out of [`RouteNode`]s. Every node
//! carries an opaque payload `T` that the matcher hands back untouched, so the
//! application decides what a route "is" (a view, a handler id, a name).

use crate::error::GeneratePathError;
use crate::params::Params;
use std::fmt;

// ============================================================================
// RouteNode
// ============================================================================

/// A node of a route tree
///
/// # Example
///
/// ```
/// use nav_router::RouteNode;
///
/// let routes = vec![
///     RouteNode::new("/", "home"),
///     RouteNode::new("/users", "users-layout")
///         .child(RouteNode::index("users-list"))
///         .child(RouteNode::new(":id", "user-detail")),
///     RouteNode::new("*", "not-found"),
/// ];
///
/// assert_eq!(routes[1].child_routes().len(), 2);
/// assert!(routes[1].child_routes()[0].is_index());
/// ```
#[derive(Clone)]
pub struct RouteNode<T> {
    path: Option<String>,
    index: bool,
    case_sensitive: bool,
    children: Vec<RouteNode<T>>,
    payload: T,
}

impl<T> RouteNode<T> {
    /// Create a route that matches `path`
    ///
    /// A path starting with `/` is absolute and must begin with the combined
    /// path of its parents; anything else is relative to the parent.
    pub fn new(path: impl Into<String>, payload: T) -> Self {
        Self {
            path: Some(path.into()),
            index: false,
            case_sensitive: false,
            children: Vec::new(),
            payload,
        }
    }

    /// Create an index route: it matches its parent's path exactly and may not
    /// have children
    pub fn index(payload: T) -> Self {
        Self {
            path: None,
            index: true,
            case_sensitive: false,
            children: Vec::new(),
            payload,
        }
    }

    /// Create a pathless layout route. It never matches on its own, only
    /// through its children.
    pub fn layout(payload: T) -> Self {
        Self {
            path: None,
            index: false,
            case_sensitive: false,
            children: Vec::new(),
            payload,
        }
    }

    /// Mark a path route as an index route as well
    pub fn with_index(mut self, index: bool) -> Self {
        self.index = index;
        self
    }

    /// Match this route's path case-sensitively
    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Add a child route
    pub fn child(mut self, child: RouteNode<T>) -> Self {
        self.children.push(child);
        self
    }

    /// Add several child routes
    pub fn children(mut self, children: impl IntoIterator<Item = RouteNode<T>>) -> Self {
        self.children.extend(children);
        self
    }

    /// The path pattern, if any
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn is_index(&self) -> bool {
        self.index
    }

    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Child routes in declaration order
    pub fn child_routes(&self) -> &[RouteNode<T>] {
        &self.children
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// The application payload
    pub fn payload(&self) -> &T {
        &self.payload
    }
}

impl<T: fmt::Debug> fmt::Debug for RouteNode<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteNode")
            .field("path", &self.path)
            .field("index", &self.index)
            .field("case_sensitive", &self.case_sensitive)
            .field("children", &self.children.len())
            .field("payload", &self.payload)
            .finish()
    }
}

// ============================================================================
// Path Generation
// ============================================================================

/// Build a pathname from a pattern by substituting parameters.
///
/// Every `:name` must have a value. A trailing `*` is replaced by the `"*"`
/// param (with exactly one leading `/`), or removed together with the slashes
/// before it when the param is absent.
///
/// # Example
///
/// ```
/// use nav_router::{generate_path, Params};
///
/// let params: Params = [("type", "img"), ("*", "cat.jpg")].into_iter().collect();
/// assert_eq!(generate_path("/files/:type/*", &params).unwrap(), "/files/img/cat.jpg");
///
/// assert!(generate_path("/users/:id", &Params::new()).is_err());
/// ```
pub fn generate_path(path: &str, params: &Params) -> Result<String, GeneratePathError> {
    let mut result = String::with_capacity(path.len());
    let mut rest = path;

    while let Some(colon) = rest.find(':') {
        let after = &rest[colon + 1..];
        let name_len = after
            .bytes()
            .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
            .count();

        result.push_str(&rest[..colon]);
        if name_len == 0 {
            result.push(':');
        } else {
            let name = &after[..name_len];
            let value = params
                .get(name)
                .ok_or_else(|| GeneratePathError::MissingParam {
                    name: name.to_string(),
                })?;
            result.push_str(value);
        }
        rest = &after[name_len..];
    }
    result.push_str(rest);

    if let Some(prefix) = result.strip_suffix('*') {
        let mut generated = prefix.trim_end_matches('/').to_string();
        if let Some(splat) = params.get("*") {
            generated.push('/');
            generated.push_str(splat.trim_start_matches('/'));
        }
        result = generated;
    }

    Ok(result)
}
