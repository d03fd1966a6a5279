//! Location data model
//!
//! [`Path`] is a complete URL path split into pathname, search and hash.
//! [`To`] is a partial path used as a navigation target. [`Location`] is an
//! immutable history entry: a path plus application state and a unique key.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Application state attached to a history entry. `Null` when absent.
pub type State = serde_json::Value;

/// Key of an entry this history did not create
pub const DEFAULT_KEY: &str = "default";

const KEY_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const KEY_LEN: usize = 8;

// ============================================================================
// Path
// ============================================================================

/// A URL path: pathname, search and hash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Path {
    /// A URL pathname, beginning with a `/`
    pub pathname: String,
    /// A URL search string, beginning with a `?` or empty
    pub search: String,
    /// A URL fragment identifier, beginning with a `#` or empty
    pub hash: String,
}

impl Path {
    /// Create a path with empty search and hash
    pub fn new(pathname: impl Into<String>) -> Self {
        Self {
            pathname: pathname.into(),
            search: String::new(),
            hash: String::new(),
        }
    }
}

impl Default for Path {
    fn default() -> Self {
        Self::new("/")
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.pathname, self.search, self.hash)
    }
}

// ============================================================================
// To
// ============================================================================

/// A navigation target. Absent fields are inherited or resolved by the caller.
///
/// # Example
///
/// ```
/// use nav_router::To;
///
/// let to = To::parse("/users/42?tab=posts#top");
/// assert_eq!(to.pathname.as_deref(), Some("/users/42"));
/// assert_eq!(to.search.as_deref(), Some("?tab=posts"));
/// assert_eq!(to.hash.as_deref(), Some("#top"));
///
/// assert_eq!(To::parse("?q=1").pathname, None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct To {
    /// Target pathname, absolute or relative
    pub pathname: Option<String>,
    /// Target search string
    pub search: Option<String>,
    /// Target fragment
    pub hash: Option<String>,
}

impl To {
    /// Parse a URL path string into its pathname, search and hash parts.
    ///
    /// The hash starts at the first `#`, the search at the first `?` before it.
    /// Empty parts are left absent.
    pub fn parse(path: &str) -> Self {
        let mut to = Self::default();
        let mut rest = path;

        if let Some(index) = rest.find('#') {
            to.hash = Some(rest[index..].to_string());
            rest = &rest[..index];
        }
        if let Some(index) = rest.find('?') {
            to.search = Some(rest[index..].to_string());
            rest = &rest[..index];
        }
        if !rest.is_empty() {
            to.pathname = Some(rest.to_string());
        }

        to
    }

    /// Set the pathname
    pub fn with_pathname(mut self, pathname: impl Into<String>) -> Self {
        self.pathname = Some(pathname.into());
        self
    }

    /// Set the search string
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Set the fragment
    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = Some(hash.into());
        self
    }

    /// True when no field is set, as for `To::parse("")`
    pub fn is_empty(&self) -> bool {
        self.pathname.is_none() && self.search.is_none() && self.hash.is_none()
    }
}

impl From<&str> for To {
    fn from(path: &str) -> Self {
        To::parse(path)
    }
}

impl From<String> for To {
    fn from(path: String) -> Self {
        To::parse(&path)
    }
}

impl From<&String> for To {
    fn from(path: &String) -> Self {
        To::parse(path)
    }
}

impl From<Path> for To {
    fn from(path: Path) -> Self {
        Self {
            pathname: Some(path.pathname),
            search: Some(path.search),
            hash: Some(path.hash),
        }
    }
}

impl From<&Path> for To {
    fn from(path: &Path) -> Self {
        To::from(path.clone())
    }
}

/// Join a partial path back into a string, defaulting the pathname to `/`.
///
/// # Example
///
/// ```
/// use nav_router::{create_path, To};
///
/// assert_eq!(create_path(&To::parse("?a=1")), "/?a=1");
/// assert_eq!(create_path(&To::parse("/basic/")), "/basic/");
/// ```
pub fn create_path(to: &To) -> String {
    format!(
        "{}{}{}",
        to.pathname.as_deref().unwrap_or("/"),
        to.search.as_deref().unwrap_or(""),
        to.hash.as_deref().unwrap_or("")
    )
}

// ============================================================================
// Location
// ============================================================================

/// An entry in the history stack. Never mutated once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// A URL pathname, beginning with a `/`
    pub pathname: String,
    /// A URL search string, beginning with a `?` or empty
    pub search: String,
    /// A URL fragment identifier, beginning with a `#` or empty
    pub hash: String,
    /// Application state stored with this entry
    pub state: State,
    /// Unique key of this entry
    pub key: String,
}

impl Location {
    /// Build a location from a URL string with default state and key
    pub fn from_url(url: &str) -> Self {
        Self::default().merged(&To::parse(url), State::Null, DEFAULT_KEY.to_string())
    }

    /// The path portion of this location
    pub fn path(&self) -> Path {
        Path {
            pathname: self.pathname.clone(),
            search: self.search.clone(),
            hash: self.hash.clone(),
        }
    }

    /// Pathname, search and hash joined back into a string
    pub fn href(&self) -> String {
        format!("{}{}{}", self.pathname, self.search, self.hash)
    }

    /// A new location with the fields present in `to` overriding this one's
    pub(crate) fn merged(&self, to: &To, state: State, key: String) -> Self {
        Self {
            pathname: to.pathname.clone().unwrap_or_else(|| self.pathname.clone()),
            search: to.search.clone().unwrap_or_else(|| self.search.clone()),
            hash: to.hash.clone().unwrap_or_else(|| self.hash.clone()),
            state,
            key,
        }
    }
}

impl Default for Location {
    fn default() -> Self {
        Self {
            pathname: "/".to_string(),
            search: String::new(),
            hash: String::new(),
            state: State::Null,
            key: DEFAULT_KEY.to_string(),
        }
    }
}

/// Generate a fresh base-36 entry key
pub(crate) fn create_key(rng: &mut fastrand::Rng) -> String {
    (0..KEY_LEN)
        .map(|_| char::from(KEY_ALPHABET[rng.usize(..KEY_ALPHABET.len())]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_path() {
        let to = To::parse("/a/b?x=1#frag");
        assert_eq!(to.pathname.as_deref(), Some("/a/b"));
        assert_eq!(to.search.as_deref(), Some("?x=1"));
        assert_eq!(to.hash.as_deref(), Some("#frag"));
    }

    #[test]
    fn test_parse_question_mark_inside_hash() {
        let to = To::parse("/a#b?c");
        assert_eq!(to.pathname.as_deref(), Some("/a"));
        assert_eq!(to.search, None);
        assert_eq!(to.hash.as_deref(), Some("#b?c"));
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(To::parse(""), To::default());
    }

    #[test]
    fn test_create_path_defaults_pathname() {
        assert_eq!(create_path(&To::default()), "/");
        assert_eq!(create_path(&To::parse("#top")), "/#top");
    }

    #[test]
    fn test_merged_keeps_missing_fields() {
        let current = Location::from_url("/inbox?page=2#latest");
        let next = current.merged(&To::parse("?page=3"), State::Null, "k".to_string());

        assert_eq!(next.pathname, "/inbox");
        assert_eq!(next.search, "?page=3");
        assert_eq!(next.hash, "#latest");
        assert_eq!(next.key, "k");
    }

    #[test]
    fn test_create_key_shape() {
        let mut rng = fastrand::Rng::with_seed(7);
        let key = create_key(&mut rng);
        assert_eq!(key.len(), KEY_LEN);
        assert!(key.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
        assert_ne!(key, create_key(&mut rng));
    }

    #[test]
    fn test_location_serde_round_trip() {
        let location = Location {
            state: serde_json::json!({ "from": "/login" }),
            ..Location::from_url("/dashboard")
        };
        let json = serde_json::to_string(&location).unwrap();
        let back: Location = serde_json::from_str(&json).unwrap();
        assert_eq!(back, location);
    }
}
