//! Host navigation stack
//!
//! [`Platform`] is the seam between the history engine and whatever really
//! owns the navigation stack: a browser, a webview, a test harness. The
//! platform stores one URL and one optional [`PersistedEntry`] per position and
//! moves between positions when asked. Moving is irreversible from the
//! engine's point of view; the platform only reports that it happened, through
//! [`Platform::take_pop_notification`].
//!
//! [`MemoryPlatform`] keeps the stack in memory:
//! - Forward entries are truncated on push
//! - Movement is clamped to the ends of the stack
//! - An optional size limit drops the oldest entries

use crate::location::{create_key, State, DEFAULT_KEY};
use crate::trace_log;
use serde::{Deserialize, Serialize};

/// Data the history engine stores with every entry it creates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedEntry {
    /// Application state
    #[serde(rename = "usr")]
    pub state: State,
    /// Location key
    pub key: String,
    /// Position of the entry as counted by the engine
    #[serde(rename = "idx")]
    pub index: usize,
}

/// What the platform holds at one position
#[derive(Debug, Clone, PartialEq)]
pub struct PlatformEntry {
    /// URL of the entry, as produced by `create_href`
    pub url: String,
    /// `None` when the entry was not created by the engine
    pub entry: Option<PersistedEntry>,
}

/// A navigation stack the history engine can drive
pub trait Platform {
    /// The entry at the current position
    fn current(&self) -> PlatformEntry;

    /// Add an entry after the current position, discarding forward entries
    fn push_entry(&mut self, entry: PersistedEntry, url: &str);

    /// Overwrite the entry at the current position
    fn replace_entry(&mut self, entry: PersistedEntry, url: &str);

    /// Move by `delta` positions. A platform that moves must later report a
    /// pop notification.
    fn go(&mut self, delta: isize);

    /// Consume one pending pop notification, if any
    fn take_pop_notification(&mut self) -> bool {
        false
    }

    /// Ask the user before the host unloads the application
    fn set_unload_prompt(&mut self, _enabled: bool) {}
}

/// In-memory navigation stack
///
/// # Example
///
/// ```
/// use nav_router::{MemoryPlatform, Platform};
///
/// let mut platform = MemoryPlatform::with_entries(["/", "/users", "/users/42"], 2);
/// platform.go(-1);
///
/// assert_eq!(platform.current().url, "/users");
/// assert!(platform.take_pop_notification());
/// assert!(!platform.take_pop_notification());
/// ```
#[derive(Debug, Clone)]
pub struct MemoryPlatform {
    entries: Vec<PlatformEntry>,
    current: usize,
    /// Maximum stack size (0 = unlimited)
    max_size: usize,
    pending_pops: usize,
    unload_prompt: bool,
}

impl MemoryPlatform {
    /// A stack holding one entry the engine did not create
    pub fn new(initial_url: impl Into<String>) -> Self {
        Self {
            entries: vec![PlatformEntry {
                url: initial_url.into(),
                entry: None,
            }],
            current: 0,
            max_size: 0,
            pending_pops: 0,
            unload_prompt: false,
        }
    }

    /// A stack pre-populated with entries, positioned at `initial_index`
    /// (clamped). Each entry carries its position so pops between them can be
    /// blocked. The first entry has the default key, the others fresh keys.
    pub fn with_entries<I, S>(urls: I, initial_index: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_urls(urls, initial_index, fastrand::Rng::new())
    }

    /// Like [`with_entries`](Self::with_entries), with reproducible keys
    pub fn with_seeded_entries<I, S>(urls: I, initial_index: usize, seed: u64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_urls(urls, initial_index, fastrand::Rng::with_seed(seed))
    }

    fn from_urls<I, S>(urls: I, initial_index: usize, mut rng: fastrand::Rng) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut entries: Vec<PlatformEntry> = urls
            .into_iter()
            .enumerate()
            .map(|(index, url)| PlatformEntry {
                url: url.into(),
                entry: Some(PersistedEntry {
                    state: State::Null,
                    key: if index == 0 {
                        DEFAULT_KEY.to_string()
                    } else {
                        create_key(&mut rng)
                    },
                    index,
                }),
            })
            .collect();

        if entries.is_empty() {
            entries.push(PlatformEntry {
                url: "/".to_string(),
                entry: None,
            });
        }

        let current = initial_index.min(entries.len() - 1);
        Self {
            entries,
            current,
            max_size: 0,
            pending_pops: 0,
            unload_prompt: false,
        }
    }

    /// Limit the number of entries kept. The oldest are dropped first.
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self.enforce_size_limit();
        self
    }

    /// Push an entry the engine does not know about, like a page calling the
    /// host's navigation API directly
    pub fn push_foreign(&mut self, url: impl Into<String>) {
        self.entries.truncate(self.current + 1);
        self.entries.push(PlatformEntry {
            url: url.into(),
            entry: None,
        });
        self.current = self.entries.len() - 1;
        self.enforce_size_limit();
    }

    /// Number of entries in the stack
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false: the stack holds at least one entry
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current position
    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn can_go_back(&self) -> bool {
        self.current > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.current + 1 < self.entries.len()
    }

    /// All entries, oldest first
    pub fn entries(&self) -> &[PlatformEntry] {
        &self.entries
    }

    /// Whether the unload prompt is currently requested
    pub fn unload_prompt(&self) -> bool {
        self.unload_prompt
    }

    /// Pop notifications not yet consumed
    pub fn pending_pops(&self) -> usize {
        self.pending_pops
    }

    fn enforce_size_limit(&mut self) {
        if self.max_size > 0 && self.entries.len() > self.max_size {
            let excess = self.entries.len() - self.max_size;
            self.entries.drain(0..excess);
            self.current = self.current.saturating_sub(excess);
        }
    }
}

impl Default for MemoryPlatform {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Platform for MemoryPlatform {
    fn current(&self) -> PlatformEntry {
        self.entries[self.current].clone()
    }

    fn push_entry(&mut self, entry: PersistedEntry, url: &str) {
        self.entries.truncate(self.current + 1);
        self.entries.push(PlatformEntry {
            url: url.to_string(),
            entry: Some(entry),
        });
        self.current = self.entries.len() - 1;
        self.enforce_size_limit();
    }

    fn replace_entry(&mut self, entry: PersistedEntry, url: &str) {
        self.entries[self.current] = PlatformEntry {
            url: url.to_string(),
            entry: Some(entry),
        };
    }

    fn go(&mut self, delta: isize) {
        let last = self.entries.len() as isize - 1;
        let next = (self.current as isize + delta).clamp(0, last) as usize;

        if next != self.current {
            trace_log!("Memory platform moved {} -> {}", self.current, next);
            self.current = next;
            self.pending_pops += 1;
        }
    }

    fn take_pop_notification(&mut self) -> bool {
        if self.pending_pops == 0 {
            return false;
        }
        self.pending_pops -= 1;
        true
    }

    fn set_unload_prompt(&mut self, enabled: bool) {
        self.unload_prompt = enabled;
    }
}
