//! Route tree flattening, ranking and matching
//!
//! A route tree is flattened into branches, one per routable node, each
//! carrying the absolute path of the node and the chain of route metadata from
//! the root down to it. Branches are ranked by specificity and tried in order;
//! the first branch whose every level matches wins.

use crate::error::ConfigurationError;
use crate::location::To;
use crate::logging::Warning;
use crate::matcher::{PathMatcher, PathPattern};
use crate::params::Params;
use crate::resolve::{join_paths, strip_basename};
use crate::route::RouteNode;
use crate::{debug_log, trace_log};
use std::cmp::Ordering;
use std::fmt;

const DYNAMIC_SEGMENT_VALUE: i32 = 3;
const INDEX_ROUTE_VALUE: i32 = 2;
const EMPTY_SEGMENT_VALUE: i32 = 1;
const STATIC_SEGMENT_VALUE: i32 = 10;
const SPLAT_PENALTY: i32 = -2;

// ============================================================================
// Branches
// ============================================================================

/// One level of a branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMeta {
    /// Path of the route relative to its parent
    pub relative_path: String,
    pub case_sensitive: bool,
    /// Position of the route among its siblings
    pub child_index: usize,
}

/// A root-to-node path through the route tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteBranch {
    /// Absolute path of the node
    pub path: String,
    pub score: i32,
    /// Metadata for each level, root first
    pub routes_meta: Vec<RouteMeta>,
}

/// Flatten a route tree into branches.
///
/// Children are emitted before their parent. A node with neither a path nor
/// the index flag yields no branch of its own.
pub fn flatten_routes<T>(routes: &[RouteNode<T>]) -> Result<Vec<RouteBranch>, ConfigurationError> {
    let mut branches = Vec::new();
    flatten_into(routes, &mut branches, &[], "")?;
    Ok(branches)
}

fn flatten_into<T>(
    routes: &[RouteNode<T>],
    branches: &mut Vec<RouteBranch>,
    parents_meta: &[RouteMeta],
    parent_path: &str,
) -> Result<(), ConfigurationError> {
    for (child_index, route) in routes.iter().enumerate() {
        let declared = route.path().unwrap_or("");
        let relative_path = if declared.starts_with('/') {
            declared
                .strip_prefix(parent_path)
                .ok_or_else(|| ConfigurationError::AbsolutePathNotNested {
                    path: declared.to_string(),
                    parent: parent_path.to_string(),
                })?
        } else {
            declared
        };

        let path = join_paths(&[parent_path, relative_path]);
        let mut routes_meta = parents_meta.to_vec();
        routes_meta.push(RouteMeta {
            relative_path: relative_path.to_string(),
            case_sensitive: route.is_case_sensitive(),
            child_index,
        });

        if route.has_children() {
            if route.is_index() {
                return Err(ConfigurationError::IndexWithChildren { path });
            }
            flatten_into(route.child_routes(), branches, &routes_meta, &path)?;
        }

        if route.path().is_none() && !route.is_index() {
            continue;
        }

        let score = compute_score(&path, route.is_index());
        branches.push(RouteBranch {
            path,
            score,
            routes_meta,
        });
    }

    Ok(())
}

/// Specificity of a branch path. Static segments outrank dynamic ones, which
/// outrank splats.
pub fn compute_score(path: &str, index: bool) -> i32 {
    let segments: Vec<&str> = path.split('/').collect();
    let mut score = segments.len() as i32;

    if segments.iter().any(|s| *s == "*") {
        score += SPLAT_PENALTY;
    }
    if index {
        score += INDEX_ROUTE_VALUE;
    }

    segments
        .iter()
        .filter(|s| **s != "*")
        .fold(score, |score, segment| {
            score
                + if is_dynamic(segment) {
                    DYNAMIC_SEGMENT_VALUE
                } else if segment.is_empty() {
                    EMPTY_SEGMENT_VALUE
                } else {
                    STATIC_SEGMENT_VALUE
                }
        })
}

/// `:name` with a non-empty ASCII word name
fn is_dynamic(segment: &str) -> bool {
    segment.strip_prefix(':').is_some_and(|name| {
        !name.is_empty() && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
    })
}

/// Sort branches by score, highest first.
///
/// Equal scores fall back to tree order: siblings by declaration index, a
/// descendant before its ancestor. The sort is stable.
pub fn rank_route_branches(branches: &mut [RouteBranch]) {
    branches.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| compare_indexes(a, b)));
}

fn compare_indexes(a: &RouteBranch, b: &RouteBranch) -> Ordering {
    let a_indexes = a.routes_meta.iter().map(|m| m.child_index);
    let b_indexes = b.routes_meta.iter().map(|m| m.child_index);

    for (x, y) in a_indexes.zip(b_indexes) {
        if x != y {
            return x.cmp(&y);
        }
    }

    b.routes_meta.len().cmp(&a.routes_meta.len())
}

// ============================================================================
// Matches
// ============================================================================

/// A route that matched, with the portion of the pathname it consumed
pub struct RouteMatch<'a, T> {
    /// Parameters of the whole match, including those bound by deeper routes
    pub params: Params,
    /// Portion of the pathname matched up to and including this route
    pub pathname: String,
    /// `pathname` without a trailing splat
    pub pathname_base: String,
    /// The matched node of the caller's tree
    pub route: &'a RouteNode<T>,
}

impl<T> Clone for RouteMatch<'_, T> {
    fn clone(&self) -> Self {
        Self {
            params: self.params.clone(),
            pathname: self.pathname.clone(),
            pathname_base: self.pathname_base.clone(),
            route: self.route,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for RouteMatch<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteMatch")
            .field("params", &self.params)
            .field("pathname", &self.pathname)
            .field("pathname_base", &self.pathname_base)
            .field("route", &self.route)
            .finish()
    }
}

/// Match one branch against a pathname. Returns the matches root first, or
/// `None` if any level fails.
pub fn match_route_branch<'a, T>(
    matcher: &mut PathMatcher,
    branch: &RouteBranch,
    routes: &'a [RouteNode<T>],
    pathname: &str,
) -> Result<Option<Vec<RouteMatch<'a, T>>>, ConfigurationError> {
    let mut routes = routes;
    let mut matched_params = Params::new();
    let mut matched_pathname = String::from("/");
    let mut matches: Vec<RouteMatch<'a, T>> = Vec::with_capacity(branch.routes_meta.len());
    let last = branch.routes_meta.len().saturating_sub(1);

    for (i, meta) in branch.routes_meta.iter().enumerate() {
        let remaining = if matched_pathname == "/" {
            pathname
        } else {
            match pathname.get(matched_pathname.len()..) {
                Some(rest) if !rest.is_empty() => rest,
                _ => "/",
            }
        };

        let pattern = PathPattern::new(meta.relative_path.as_str())
            .case_sensitive(meta.case_sensitive)
            .end(i == last);
        let Some(m) = matcher.match_path(pattern, remaining)? else {
            return Ok(None);
        };
        let Some(route) = routes.get(meta.child_index) else {
            return Ok(None);
        };

        matched_params.extend(&m.params);
        matches.push(RouteMatch {
            params: Params::new(),
            pathname: join_paths(&[matched_pathname.as_str(), m.pathname.as_str()]),
            pathname_base: join_paths(&[matched_pathname.as_str(), m.pathname_base.as_str()]),
            route,
        });

        if m.pathname_base != "/" {
            matched_pathname = join_paths(&[matched_pathname.as_str(), m.pathname_base.as_str()]);
        }
        routes = route.child_routes();
    }

    // Every level shares the params of the full match
    for m in &mut matches {
        m.params = matched_params.clone();
    }

    Ok(Some(matches))
}

impl PathMatcher {
    /// Match a route tree against a location, reusing this matcher's warning
    /// set and pattern cache.
    ///
    /// Returns `None` if the pathname lies outside `basename` or no branch
    /// matches.
    pub fn match_routes<'a, T>(
        &mut self,
        routes: &'a [RouteNode<T>],
        location: impl Into<To>,
        basename: &str,
    ) -> Result<Option<Vec<RouteMatch<'a, T>>>, ConfigurationError> {
        let location = location.into();
        let pathname = location.pathname.as_deref().unwrap_or("/");

        let Some(pathname) = strip_basename(pathname, basename) else {
            debug_log!("Pathname '{}' is outside basename '{}'", pathname, basename);
            return Ok(None);
        };

        let mut branches = flatten_routes(routes)?;
        rank_route_branches(&mut branches);
        trace_log!("Matching '{}' against {} branches", pathname, branches.len());

        for branch in &branches {
            if let Some(matches) = match_route_branch(self, branch, routes, &pathname)? {
                trace_log!("Matched branch '{}' (score {})", branch.path, branch.score);
                return Ok(Some(matches));
            }
        }

        trace_log!("No branch matched '{}'", pathname);
        Ok(None)
    }

    /// Match a nested route tree below an already matched parent route.
    ///
    /// The tree sees only the part of `location` after the parent's
    /// `pathname_base`. The returned matches carry the parent's params and
    /// pathnames relative to the root.
    pub fn match_descendant_routes<'a, T, P>(
        &mut self,
        routes: &'a [RouteNode<T>],
        location: impl Into<To>,
        parent: Option<&RouteMatch<'_, P>>,
    ) -> Result<Option<Vec<RouteMatch<'a, T>>>, ConfigurationError> {
        let location = location.into();
        let pathname = location.pathname.as_deref().unwrap_or("/");
        let parent_base = parent.map_or("/", |p| p.pathname_base.as_str());

        if parent_base != "/" && !pathname.starts_with(parent_base) {
            self.warnings_mut().warn(Warning::LocationOutsideParent {
                pathname: pathname.to_string(),
                parent_base: parent_base.to_string(),
            });
        }

        let remaining = if parent_base == "/" {
            pathname
        } else {
            match pathname.get(parent_base.len()..) {
                Some(rest) if !rest.is_empty() => rest,
                _ => "/",
            }
        };

        let Some(matches) = self.match_routes(routes, remaining, "/")? else {
            return Ok(None);
        };

        Ok(Some(
            matches
                .into_iter()
                .map(|m| {
                    let mut params = parent.map(|p| p.params.clone()).unwrap_or_default();
                    params.extend(&m.params);
                    RouteMatch {
                        params,
                        pathname: join_paths(&[parent_base, m.pathname.as_str()]),
                        pathname_base: join_paths(&[parent_base, m.pathname_base.as_str()]),
                        route: m.route,
                    }
                })
                .collect(),
        ))
    }
}

/// Match a route tree against a location.
///
/// # Example
///
/// ```
/// use nav_router::{match_routes, RouteNode};
///
/// let routes = vec![
///     RouteNode::new("/users", "users")
///         .child(RouteNode::index("list"))
///         .child(RouteNode::new(":id", "detail")),
///     RouteNode::new("*", "not-found"),
/// ];
///
/// let matches = match_routes(&routes, "/users/42", "/").unwrap().unwrap();
/// let payloads: Vec<_> = matches.iter().map(|m| *m.route.payload()).collect();
/// assert_eq!(payloads, ["users", "detail"]);
/// assert_eq!(matches[1].params.get("id"), Some("42"));
/// ```
pub fn match_routes<'a, T>(
    routes: &'a [RouteNode<T>],
    location: impl Into<To>,
    basename: &str,
) -> Result<Option<Vec<RouteMatch<'a, T>>>, ConfigurationError> {
    PathMatcher::new().match_routes(routes, location, basename)
}

/// Match a nested route tree below `parent`. See
/// [`PathMatcher::match_descendant_routes`].
pub fn match_descendant_routes<'a, T, P>(
    routes: &'a [RouteNode<T>],
    location: impl Into<To>,
    parent: Option<&RouteMatch<'_, P>>,
) -> Result<Option<Vec<RouteMatch<'a, T>>>, ConfigurationError> {
    PathMatcher::new().match_descendant_routes(routes, location, parent)
}
