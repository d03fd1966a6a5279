//! Navigation history management
//!
//! [`History`] drives a [`Platform`] stack and keeps the current
//! `{action, location, index}` triple in sync with it:
//! - `push` / `replace` create entries and notify listeners
//! - `go` / `back` / `forward` move the platform and reconcile the pop
//! - blockers intercept navigations; a blocked navigation is handed out as a
//!   [`Transition`] that can later be retried
//!
//! A pop cannot be prevented: by the time the engine hears of it the platform
//! has already moved. With a blocker registered the engine moves the platform
//! back by the same distance and only then hands the transition to the
//! blocker. Retrying it replays the move.

use crate::location::{create_key, create_path, Location, State, To, DEFAULT_KEY};
use crate::logging::{Warning, Warnings};
use crate::platform::{PersistedEntry, Platform, PlatformEntry};
use crate::{debug_log, trace_log};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Actions and Events
// ============================================================================

/// How the current location came about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// A change to an arbitrary index in the stack, or the initial location
    Pop,
    /// A new entry was added to the stack
    Push,
    /// The current entry was replaced
    Replace,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Pop => write!(f, "POP"),
            Action::Push => write!(f, "PUSH"),
            Action::Replace => write!(f, "REPLACE"),
        }
    }
}

/// Delivered to listeners after a navigation commits
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub action: Action,
    pub location: Location,
}

/// The operation a blocked navigation would have performed
#[derive(Debug, Clone, PartialEq)]
pub enum Retry {
    Push { to: To, state: State },
    Replace { to: To, state: State },
    Go { delta: isize },
}

/// A navigation intercepted by a blocker
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub action: Action,
    /// Where the navigation would have led
    pub location: Location,
    /// Pass to [`History::retry`] to perform the navigation
    pub retry: Retry,
}

/// Handle returned by `listen` and `block`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

type Listener = Box<dyn FnMut(&Update)>;
type Blocker = Box<dyn FnMut(&Transition)>;

// ============================================================================
// Configuration
// ============================================================================

/// How locations are written into platform URLs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HrefStyle {
    /// `/users/42?tab=1`
    #[default]
    Path,
    /// `#/users/42?tab=1`
    Hash,
}

/// History configuration
#[derive(Debug, Clone, Default)]
pub struct HistoryConfig {
    pub href_style: HrefStyle,
    /// Seed for location keys. Random when absent.
    pub seed: Option<u64>,
}

impl HistoryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn href_style(mut self, href_style: HrefStyle) -> Self {
        self.href_style = href_style;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

// ============================================================================
// History
// ============================================================================

/// Navigation history over a platform stack
///
/// # Example
///
/// ```
/// use nav_router::{Action, History, MemoryPlatform, State};
///
/// let mut history = History::new(MemoryPlatform::new("/"));
/// history.push("/users/42?tab=posts", State::Null);
///
/// assert_eq!(history.action(), Action::Push);
/// assert_eq!(history.location().pathname, "/users/42");
/// assert_eq!(history.index(), 1);
///
/// history.back();
/// assert_eq!(history.action(), Action::Pop);
/// assert_eq!(history.location().pathname, "/");
/// ```
pub struct History<P: Platform> {
    platform: P,
    href_style: HrefStyle,
    action: Action,
    index: usize,
    location: Location,
    listeners: Vec<(Subscription, Listener)>,
    blockers: Vec<(Subscription, Blocker)>,
    next_subscription: u64,
    blocked_pop: Option<Transition>,
    warnings: Warnings,
    rng: fastrand::Rng,
}

impl<P: Platform> History<P> {
    /// Create a history with the default configuration
    pub fn new(platform: P) -> Self {
        Self::with_config(platform, HistoryConfig::default())
    }

    /// Create a history. An initial platform entry the engine did not create
    /// is adopted in place as position 0.
    pub fn with_config(mut platform: P, config: HistoryConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };

        let current = platform.current();
        let index = match current.entry {
            Some(entry) => entry.index,
            None => {
                let entry = PersistedEntry {
                    state: State::Null,
                    key: DEFAULT_KEY.to_string(),
                    index: 0,
                };
                platform.replace_entry(entry, &current.url);
                0
            }
        };

        let location = read_location(&platform.current(), config.href_style);
        debug_log!("History initialised at '{}' (index {})", location.href(), index);

        Self {
            platform,
            href_style: config.href_style,
            action: Action::Pop,
            index,
            location,
            listeners: Vec::new(),
            blockers: Vec::new(),
            next_subscription: 0,
            blocked_pop: None,
            warnings: Warnings::new(),
            rng,
        }
    }

    /// The last action that changed the location
    pub fn action(&self) -> Action {
        self.action
    }

    /// The current location
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Position of the current entry
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn href_style(&self) -> HrefStyle {
        self.href_style
    }

    /// Warnings raised by this history
    pub fn warnings(&self) -> &Warnings {
        &self.warnings
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Direct access to the platform. Movement made through it is picked up
    /// by the next [`flush`](Self::flush).
    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    /// The platform URL for a target
    pub fn create_href(&self, to: &To) -> String {
        let path = create_path(to);
        match self.href_style {
            HrefStyle::Path => path,
            HrefStyle::Hash => format!("#{path}"),
        }
    }

    /// Add a new entry after the current one.
    ///
    /// Fields missing from `to` are taken from the current location.
    pub fn push(&mut self, to: impl Into<To>, state: State) {
        let to = to.into();
        let next = self.next_location(&to, state.clone());

        if !self.blockers.is_empty() {
            self.call_blocker(&Transition {
                action: Action::Push,
                location: next,
                retry: Retry::Push { to, state },
            });
            return;
        }

        let entry = self.persisted(&next, self.index + 1);
        let url = self.create_href(&To::from(next.path()));
        debug_log!("PUSH '{}'", url);
        self.platform.push_entry(entry, &url);
        self.apply(Action::Push);
    }

    /// Overwrite the current entry
    pub fn replace(&mut self, to: impl Into<To>, state: State) {
        let to = to.into();
        let next = self.next_location(&to, state.clone());

        if !self.blockers.is_empty() {
            self.call_blocker(&Transition {
                action: Action::Replace,
                location: next,
                retry: Retry::Replace { to, state },
            });
            return;
        }

        let entry = self.persisted(&next, self.index);
        let url = self.create_href(&To::from(next.path()));
        debug_log!("REPLACE '{}'", url);
        self.platform.replace_entry(entry, &url);
        self.apply(Action::Replace);
    }

    /// Move `delta` entries through the stack
    pub fn go(&mut self, delta: isize) {
        trace_log!("go({})", delta);
        self.platform.go(delta);
        self.flush();
    }

    pub fn back(&mut self) {
        self.go(-1);
    }

    pub fn forward(&mut self) {
        self.go(1);
    }

    /// Perform a navigation that was handed to a blocker
    pub fn retry(&mut self, transition: &Transition) {
        match &transition.retry {
            Retry::Push { to, state } => self.push(to.clone(), state.clone()),
            Retry::Replace { to, state } => self.replace(to.clone(), state.clone()),
            Retry::Go { delta } => self.go(*delta),
        }
    }

    /// Process every pop notification the platform has queued
    pub fn flush(&mut self) {
        while self.platform.take_pop_notification() {
            self.handle_pop();
        }
    }

    /// Reconcile one movement of the platform
    pub fn handle_pop(&mut self) {
        if let Some(transition) = self.blocked_pop.take() {
            // The platform is back where it was; the blocker decides now
            self.call_blocker(&transition);
            return;
        }

        let current = self.platform.current();
        let next_location = read_location(&current, self.href_style);

        if self.blockers.is_empty() {
            self.apply(Action::Pop);
            return;
        }

        match current.entry {
            Some(entry) => {
                let delta = self.index as isize - entry.index as isize;
                if delta != 0 {
                    trace_log!("Reverting blocked pop by {}", delta);
                    self.blocked_pop = Some(Transition {
                        action: Action::Pop,
                        location: next_location,
                        retry: Retry::Go { delta: -delta },
                    });
                    self.platform.go(delta);
                }
            }
            None => {
                self.warnings.warn(Warning::UnblockablePop {
                    pathname: next_location.pathname,
                });
                self.apply(Action::Pop);
            }
        }
    }

    /// Register a listener. Listeners run in registration order after every
    /// committed navigation.
    pub fn listen<F>(&mut self, listener: F) -> Subscription
    where
        F: FnMut(&Update) + 'static,
    {
        let id = self.next_id();
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns false if it was already removed.
    pub fn unlisten(&mut self, subscription: Subscription) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(id, _)| *id != subscription);
        self.listeners.len() != before
    }

    /// Register a blocker. While any blocker is registered navigations are
    /// handed to the first one instead of committing.
    pub fn block<F>(&mut self, blocker: F) -> Subscription
    where
        F: FnMut(&Transition) + 'static,
    {
        let id = self.next_id();
        self.blockers.push((id, Box::new(blocker)));
        if self.blockers.len() == 1 {
            self.platform.set_unload_prompt(true);
        }
        id
    }

    /// Remove a blocker. Returns false if it was already removed.
    pub fn unblock(&mut self, subscription: Subscription) -> bool {
        let before = self.blockers.len();
        self.blockers.retain(|(id, _)| *id != subscription);
        let removed = self.blockers.len() != before;
        if removed && self.blockers.is_empty() {
            self.platform.set_unload_prompt(false);
        }
        removed
    }

    /// Whether any blocker is registered
    pub fn is_blocked(&self) -> bool {
        !self.blockers.is_empty()
    }

    fn next_id(&mut self) -> Subscription {
        self.next_subscription += 1;
        Subscription(self.next_subscription)
    }

    fn next_location(&mut self, to: &To, state: State) -> Location {
        let key = create_key(&mut self.rng);
        let next = self.location.merged(to, state, key);
        if !next.pathname.starts_with('/') {
            self.warnings.warn(Warning::RelativePathname {
                pathname: next.pathname.clone(),
            });
        }
        next
    }

    fn persisted(&self, location: &Location, index: usize) -> PersistedEntry {
        PersistedEntry {
            state: location.state.clone(),
            key: location.key.clone(),
            index,
        }
    }

    fn call_blocker(&mut self, transition: &Transition) {
        if let Some((_, blocker)) = self.blockers.first_mut() {
            debug_log!("{} to '{}' blocked", transition.action, transition.location.href());
            blocker(transition);
        }
    }

    /// Adopt the platform's current entry and notify listeners
    fn apply(&mut self, action: Action) {
        let current = self.platform.current();
        if let Some(entry) = &current.entry {
            self.index = entry.index;
        }
        self.action = action;
        self.location = read_location(&current, self.href_style);
        debug_log!("{} '{}' (index {})", action, self.location.href(), self.index);

        let update = Update {
            action,
            location: self.location.clone(),
        };
        for (_, listener) in &mut self.listeners {
            listener(&update);
        }
    }
}

impl<P: Platform + fmt::Debug> fmt::Debug for History<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("History")
            .field("platform", &self.platform)
            .field("href_style", &self.href_style)
            .field("action", &self.action)
            .field("index", &self.index)
            .field("location", &self.location)
            .field("listeners", &self.listeners.len())
            .field("blockers", &self.blockers.len())
            .field("blocked_pop", &self.blocked_pop)
            .finish()
    }
}

/// Build the location a platform entry describes
fn read_location(current: &PlatformEntry, href_style: HrefStyle) -> Location {
    let url = match href_style {
        HrefStyle::Path => current.url.as_str(),
        HrefStyle::Hash => current.url.strip_prefix('#').unwrap_or(&current.url),
    };

    let mut location = Location::from_url(url);
    if let Some(entry) = &current.entry {
        location.state = entry.state.clone();
        location.key = entry.key.clone();
    }
    location
}
