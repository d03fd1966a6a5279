//! # nav-router
//!
//! A client-side navigation engine with support for:
//!
//! - **Route Matching** - `:param` and `*` patterns, nested route trees, ranking by specificity
//! - **Relative Resolution** - `.` / `..` targets resolved per route level
//! - **History** - push, replace and pop over a pluggable platform stack
//! - **Blocking** - intercept navigations and retry them later
//! - **Search Params** - ordered multi-map over the query string
//!
//! # Quick Start
//!
//! ```
//! use nav_router::*;
//!
//! let routes = vec![
//!     RouteNode::new("/", "home"),
//!     RouteNode::new("/users", "users")
//!         .child(RouteNode::index("user-list"))
//!         .child(RouteNode::new(":id", "user-detail")),
//!     RouteNode::new("*", "not-found"),
//! ];
//!
//! let matches = match_routes(&routes, "/users/42", "/").unwrap().unwrap();
//! assert_eq!(*matches[1].route.payload(), "user-detail");
//! assert_eq!(matches[1].params.get("id"), Some("42"));
//! ```
//!
//! # Navigation
//!
//! ```
//! use nav_router::*;
//!
//! let mut history = History::new(MemoryPlatform::new("/"));
//! history.push("/profile", State::Null);
//! history.replace("/login", State::Null);
//! history.back();
//!
//! assert_eq!(history.location().pathname, "/");
//! ```
//!
//! # Blocking
//!
//! A blocker receives the intercepted [`Transition`]. The application decides
//! later whether to [`History::retry`] it.
//!
//! ```
//! use nav_router::*;
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let mut history = History::new(MemoryPlatform::new("/editor"));
//! let pending = Rc::new(RefCell::new(None));
//! let sink = Rc::clone(&pending);
//! let blocker = history.block(move |tx| *sink.borrow_mut() = Some(tx.clone()));
//!
//! history.push("/elsewhere", State::Null);
//! assert_eq!(history.location().pathname, "/editor");
//!
//! // The user confirmed: drop the blocker and replay the navigation
//! history.unblock(blocker);
//! let transition = pending.borrow_mut().take().unwrap();
//! history.retry(&transition);
//! assert_eq!(history.location().pathname, "/elsewhere");
//! ```
//!
//! # Feature Flags
//!
//! - `log` (default) - Uses the standard `log` crate for logging
//! - `tracing` - Uses the `tracing` crate for structured logging (mutually exclusive with `log`)
//! - `cache` (default) - LRU cache of compiled path patterns

#![doc(html_root_url = "https://docs.rs/nav-router/0.1.0")]
#![cfg_attr(docsrs, feature(doc_cfg))]
// Lints are configured in Cargo.toml [lints] section

// Logging abstraction
pub mod logging;

// Cache (optional)
#[cfg(feature = "cache")]
pub mod cache;

// Location model
pub mod location;
pub mod params;

// Route matching
pub mod branch;
pub mod matcher;
pub mod resolve;
pub mod route;

// History
pub mod history;
pub mod platform;

// Router
pub mod state;

// Error handling
pub mod error;

// Re-export main types for convenient access
pub use branch::{
    compute_score, flatten_routes, match_descendant_routes, match_route_branch, match_routes,
    rank_route_branches, RouteBranch, RouteMatch, RouteMeta,
};
#[cfg(feature = "cache")]
pub use cache::{CacheStats, PatternCache};
pub use error::{ConfigurationError, GeneratePathError};
pub use history::{
    Action, History, HistoryConfig, HrefStyle, Retry, Subscription, Transition, Update,
};
pub use location::{create_path, Location, Path, State, To, DEFAULT_KEY};
pub use logging::{Warning, Warnings};
pub use matcher::{compile_path, match_path, CompiledPath, PathMatch, PathMatcher, PathPattern};
pub use params::{Params, SearchParams};
pub use platform::{MemoryPlatform, PersistedEntry, Platform, PlatformEntry};
pub use resolve::{
    join_paths, normalize_hash, normalize_pathname, normalize_search, resolve_path, resolve_to,
    strip_basename,
};
pub use route::{generate_path, RouteNode};
pub use state::{NavigateOptions, RouteContext, Router};
