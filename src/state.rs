//! Router state management
//!
//! [`Router`] ties a route tree to a [`History`] under a basename. Relative
//! navigation needs to know which routes matched; that context is captured in
//! an owned [`RouteContext`] so the router stays free to mutate while the
//! caller holds on to it.

use crate::branch::RouteMatch;
use crate::error::ConfigurationError;
use crate::history::History;
use crate::location::{create_path, Location, Path, State, To};
use crate::logging::Warning;
use crate::matcher::{PathMatch, PathMatcher, PathPattern};
use crate::params::{Params, SearchParams};
use crate::platform::Platform;
use crate::resolve::{join_paths, normalize_pathname, resolve_to, strip_basename};
use crate::route::RouteNode;
use crate::{debug_log, warn_log};
use std::cell::RefCell;

/// Options for [`Router::navigate`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavigateOptions {
    /// Replace the current entry instead of pushing a new one
    pub replace: bool,
    /// State stored with the new entry
    pub state: State,
}

impl NavigateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(mut self, replace: bool) -> Self {
        self.replace = replace;
        self
    }

    pub fn state(mut self, state: State) -> Self {
        self.state = state;
        self
    }
}

/// The matched route chain a relative target is resolved against
///
/// Holds the `pathname_base` of every matched route, outermost first, and the
/// params of the match. The default context is the root.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteContext {
    pub pathname_bases: Vec<String>,
    pub params: Params,
}

impl RouteContext {
    /// Context of the innermost route in `matches`
    pub fn from_matches<T>(matches: &[RouteMatch<'_, T>]) -> Self {
        Self {
            pathname_bases: matches.iter().map(|m| m.pathname_base.clone()).collect(),
            params: matches.last().map(|m| m.params.clone()).unwrap_or_default(),
        }
    }

    /// Context of an outer route: the first `depth` levels
    pub fn ancestor(&self, depth: usize) -> Self {
        Self {
            pathname_bases: self.pathname_bases.iter().take(depth).cloned().collect(),
            params: self.params.clone(),
        }
    }
}

/// Router - a route tree, a history and a basename
///
/// # Example
///
/// ```
/// use nav_router::{History, MemoryPlatform, NavigateOptions, RouteContext, RouteNode, Router};
///
/// let routes = vec![
///     RouteNode::new("/users", "users").child(RouteNode::new(":id", "user")),
/// ];
/// let mut router = Router::new(routes, History::new(MemoryPlatform::new("/app/users/1")))
///     .with_basename("/app");
///
/// let context = RouteContext::from_matches(&router.matches().unwrap().unwrap());
/// router.navigate("../2", NavigateOptions::new(), &context);
///
/// assert_eq!(router.history().location().pathname, "/app/users/2");
/// ```
pub struct Router<T, P: Platform> {
    routes: Vec<RouteNode<T>>,
    history: History<P>,
    basename: String,
    matcher: RefCell<PathMatcher>,
}

impl<T, P: Platform> Router<T, P> {
    /// Create a router at basename `/`
    pub fn new(routes: Vec<RouteNode<T>>, history: History<P>) -> Self {
        Self {
            routes,
            history,
            basename: "/".to_string(),
            matcher: RefCell::new(PathMatcher::new()),
        }
    }

    /// Serve the app below `basename`
    pub fn with_basename(mut self, basename: &str) -> Self {
        self.basename = normalize_pathname(basename);
        self
    }

    pub fn basename(&self) -> &str {
        &self.basename
    }

    pub fn routes(&self) -> &[RouteNode<T>] {
        &self.routes
    }

    pub fn history(&self) -> &History<P> {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut History<P> {
        &mut self.history
    }

    /// The current location relative to the basename, or `None` if it lies
    /// outside the basename
    pub fn location(&self) -> Option<Location> {
        let location = self.history.location();
        let pathname = strip_basename(&location.pathname, &self.basename)?;
        Some(Location {
            pathname,
            ..location.clone()
        })
    }

    /// Match the route tree against the current location
    pub fn matches(&self) -> Result<Option<Vec<RouteMatch<'_, T>>>, ConfigurationError> {
        let location = self.history.location();
        self.matcher
            .borrow_mut()
            .match_routes(&self.routes, To::from(location.path()), &self.basename)
    }

    /// Context of the innermost matched route, or the root context when
    /// nothing matches
    pub fn context(&self) -> Result<RouteContext, ConfigurationError> {
        Ok(self
            .matches()?
            .map(|matches| RouteContext::from_matches(&matches))
            .unwrap_or_default())
    }

    /// Resolve a target against a route context and the current location
    pub fn resolved_path(&self, to: impl Into<To>, context: &RouteContext) -> Path {
        resolve_to(to, context.pathname_bases.as_slice(), &self.location_pathname())
    }

    /// Navigate to a target resolved against `context`
    pub fn navigate(&mut self, to: impl Into<To>, options: NavigateOptions, context: &RouteContext) {
        let mut path = self.resolved_path(to, context);
        if self.basename != "/" {
            path.pathname = join_paths(&[self.basename.as_str(), path.pathname.as_str()]);
        }

        debug_log!(
            "navigate to '{}'{}",
            path,
            if options.replace { " (replace)" } else { "" }
        );

        if options.replace {
            self.history.replace(path, options.state);
        } else {
            self.history.push(path, options.state);
        }
    }

    /// Move through the history stack
    pub fn navigate_delta(&mut self, delta: isize) {
        self.history.go(delta);
    }

    /// Follow a link: like [`navigate`](Self::navigate), but a link to the
    /// current location replaces instead of pushing a duplicate entry
    pub fn follow_link(&mut self, to: impl Into<To>, options: NavigateOptions, context: &RouteContext) {
        let to = to.into();
        let target = create_path(&To::from(self.resolved_path(to.clone(), context)));
        let current = self
            .location()
            .map(|location| location.href())
            .unwrap_or_default();

        let replace = options.replace || current == target;
        self.navigate(to, options.replace(replace), context);
    }

    /// The platform URL a link to `to` should carry
    pub fn href(&self, to: impl Into<To>, context: &RouteContext) -> String {
        let mut to = to.into();
        if to.is_empty() {
            to.pathname = Some(String::new());
        }
        let requested = to
            .pathname
            .as_deref()
            .map(|p| if p.is_empty() { "/" } else { p })
            .map(str::to_string);
        let mut path = self.resolved_path(to, context);

        if self.basename != "/" {
            path.pathname = if path.pathname == "/" {
                let trailing = requested.as_deref().is_some_and(|p| p.ends_with('/'));
                format!("{}{}", self.basename, if trailing { "/" } else { "" })
            } else {
                join_paths(&[self.basename.as_str(), path.pathname.as_str()])
            };
        }

        self.history.create_href(&To::from(path))
    }

    /// Match a single pattern against the current location
    pub fn match_current(
        &self,
        pattern: impl Into<PathPattern>,
    ) -> Result<Option<PathMatch>, ConfigurationError> {
        let pathname = self.location_pathname();
        self.matcher.borrow_mut().match_path(pattern, &pathname)
    }

    /// Whether a link to `to` should be shown as active.
    ///
    /// Active when the resolved pathname equals the current one or, unless
    /// `end` is set, when it is an ancestor of it.
    pub fn is_active(
        &self,
        to: impl Into<To>,
        context: &RouteContext,
        case_sensitive: bool,
        end: bool,
    ) -> bool {
        let mut location_pathname = self.location_pathname();
        let mut to_pathname = self.resolved_path(to, context).pathname;
        if !case_sensitive {
            location_pathname = location_pathname.to_lowercase();
            to_pathname = to_pathname.to_lowercase();
        }

        location_pathname == to_pathname
            || (!end
                && location_pathname
                    .strip_prefix(to_pathname.as_str())
                    .is_some_and(|rest| rest.starts_with('/')))
    }

    /// The current search params, with `defaults` filling in missing keys
    pub fn search_params(&self, defaults: &SearchParams) -> SearchParams {
        SearchParams::parse(&self.history.location().search).with_defaults(defaults)
    }

    /// Navigate to the current pathname with a new search string
    pub fn set_search_params(
        &mut self,
        params: &SearchParams,
        options: NavigateOptions,
        context: &RouteContext,
    ) {
        self.navigate(format!("?{params}"), options, context);
    }

    /// Warnings raised while matching
    pub fn match_warnings(&self) -> Vec<Warning> {
        self.matcher.borrow().warnings().emitted().to_vec()
    }

    fn location_pathname(&self) -> String {
        let pathname = &self.history.location().pathname;
        match strip_basename(pathname, &self.basename) {
            Some(stripped) => stripped,
            None => {
                warn_log!(
                    "Location '{}' is outside basename '{}'",
                    pathname,
                    self.basename
                );
                pathname.clone()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::{HistoryConfig, HrefStyle};
    use crate::platform::MemoryPlatform;

    fn routes() -> Vec<RouteNode<&'static str>> {
        vec![
            RouteNode::new("/", "home"),
            RouteNode::new("/users", "users")
                .child(RouteNode::index("users-index"))
                .child(RouteNode::new(":id", "user").child(RouteNode::new("edit", "user-edit"))),
            RouteNode::new("/files/*", "files"),
        ]
    }

    fn router(url: &str) -> Router<&'static str, MemoryPlatform> {
        Router::new(routes(), History::new(MemoryPlatform::new(url)))
    }

    #[test]
    fn test_matches_current_location() {
        let router = router("/users/7/edit");
        let matches = router.matches().unwrap().unwrap();
        let payloads: Vec<_> = matches.iter().map(|m| *m.route.payload()).collect();

        assert_eq!(payloads, ["users", "user", "user-edit"]);
        assert_eq!(matches[2].params.get("id"), Some("7"));
    }

    #[test]
    fn test_context_from_matches() {
        let router = router("/users/7/edit");
        let context = router.context().unwrap();

        assert_eq!(context.pathname_bases, ["/users", "/users/7", "/users/7/edit"]);
        assert_eq!(context.params.get("id"), Some("7"));
        assert_eq!(context.ancestor(1).pathname_bases, ["/users"]);
    }

    #[test]
    fn test_navigate_relative_to_route() {
        let mut router = router("/users/7/edit");
        let context = router.context().unwrap();

        router.navigate("..", NavigateOptions::new(), &context);
        assert_eq!(router.history().location().pathname, "/users/7");

        router.navigate("../../8", NavigateOptions::new(), &context);
        assert_eq!(router.history().location().pathname, "/users/8");
        assert_eq!(router.history().index(), 2);
    }

    #[test]
    fn test_navigate_replace_with_state() {
        let mut router = router("/");
        let options = NavigateOptions::new()
            .replace(true)
            .state(serde_json::json!({ "modal": true }));

        router.navigate("/users", options, &RouteContext::default());

        assert_eq!(router.history().index(), 0);
        assert_eq!(router.history().location().state["modal"], true);
    }

    #[test]
    fn test_navigate_delta() {
        let mut router = router("/");
        router.navigate("/users", NavigateOptions::new(), &RouteContext::default());
        router.navigate_delta(-1);
        assert_eq!(router.history().location().pathname, "/");
    }

    #[test]
    fn test_basename() {
        let mut router = router("/app/users/7").with_basename("app/");
        assert_eq!(router.basename(), "/app");
        assert_eq!(router.location().unwrap().pathname, "/users/7");

        let context = router.context().unwrap();
        router.navigate("..", NavigateOptions::new(), &context);
        assert_eq!(router.history().location().pathname, "/app/users");
    }

    #[test]
    fn test_outside_basename() {
        let router = router("/elsewhere").with_basename("/app");
        assert!(router.location().is_none());
        assert!(router.matches().unwrap().is_none());
    }

    #[test]
    fn test_href() {
        let router = router("/app/users").with_basename("/app");
        let root = RouteContext::default();

        assert_eq!(router.href("/users/7?tab=1", &root), "/app/users/7?tab=1");
        assert_eq!(router.href("/", &root), "/app/");
        assert_eq!(router.href("?page=2", &root), "/app/users?page=2");
        assert_eq!(router.href("/users/", &root), "/app/users/");
    }

    #[test]
    fn test_empty_target_resolves_against_route() {
        let mut router = router("/app/users/7/edit").with_basename("/app");
        let context = router.context().unwrap().ancestor(2);

        assert_eq!(router.href("", &context), "/app/users/7");
        assert!(router.is_active("", &context, false, false));
        assert!(!router.is_active("", &context, false, true));

        router.navigate("", NavigateOptions::new(), &context);
        assert_eq!(router.history().location().pathname, "/app/users/7");
    }

    #[test]
    fn test_href_hash_style() {
        let history = History::with_config(
            MemoryPlatform::new("#/users"),
            HistoryConfig::new().href_style(HrefStyle::Hash),
        );
        let router = Router::new(routes(), history);

        assert_eq!(router.href("/files/a.txt", &RouteContext::default()), "#/files/a.txt");
    }

    #[test]
    fn test_is_active() {
        let router = router("/users/7");
        let root = RouteContext::default();

        assert!(router.is_active("/users", &root, false, false));
        assert!(!router.is_active("/users", &root, false, true));
        assert!(router.is_active("/USERS/7", &root, false, true));
        assert!(!router.is_active("/USERS/7", &root, true, true));
        assert!(!router.is_active("/use", &root, false, false));
    }

    #[test]
    fn test_follow_link_to_current_location_replaces() {
        let mut router = router("/users");
        let root = RouteContext::default();

        router.follow_link("/users", NavigateOptions::new(), &root);
        assert_eq!(router.history().index(), 0);
        assert_eq!(router.history().platform().len(), 1);

        router.follow_link("/users/1", NavigateOptions::new(), &root);
        assert_eq!(router.history().index(), 1);
    }

    #[test]
    fn test_match_current() {
        let router = router("/users/42");
        let m = router.match_current("/users/:id").unwrap().unwrap();
        assert_eq!(m.params.get("id"), Some("42"));
        assert!(router.match_current("/files/*").unwrap().is_none());
    }

    #[test]
    fn test_search_params() {
        let mut router = router("/users?sort=name");
        let defaults = SearchParams::parse("sort=id&view=grid");

        let params = router.search_params(&defaults);
        assert_eq!(params.get("sort"), Some("name"));
        assert_eq!(params.get("view"), Some("grid"));

        let mut next = SearchParams::new();
        next.append("page", "2");
        router.set_search_params(&next, NavigateOptions::new(), &RouteContext::default());

        assert_eq!(router.history().location().pathname, "/users");
        assert_eq!(router.history().location().search, "?page=2");
    }

    #[test]
    fn test_match_warnings_are_collected() {
        let routes = vec![RouteNode::new("/tags/:tag", ())];
        let router = Router::new(routes, History::new(MemoryPlatform::new("/tags/%E0")));
        router.matches().unwrap();

        assert!(matches!(
            router.match_warnings().as_slice(),
            [Warning::MalformedParam { .. }]
        ));
    }
}
