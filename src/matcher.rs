//! Path pattern compilation and matching
//!
//! A pattern such as `/users/:id/*` compiles to an anchored regular expression
//! plus the ordered list of parameter names it captures:
//!
//! - static text matches literally (case-insensitively unless requested)
//! - `:name` matches one or more characters other than `/`
//! - a trailing `*` captures the rest of the pathname under the name `"*"`
//! - with `end` the match must reach the end of the pathname, trailing slashes
//!   allowed; without it the match must stop at a word boundary so `/home`
//!   never matches `/home2`

use crate::error::ConfigurationError;
use crate::logging::{Warning, Warnings};
use crate::params::Params;
use crate::trace_log;
use percent_encoding::percent_decode_str;
use regex::bytes::{Regex, RegexBuilder};

/// A pattern to match a pathname against
///
/// # Example
///
/// ```
/// use nav_router::PathPattern;
///
/// let pattern = PathPattern::new("/users/:id").case_sensitive(true).end(false);
/// assert_eq!(pattern.path, "/users/:id");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathPattern {
    /// Pattern string, e.g. `/users/:id`
    pub path: String,
    /// Match static text case-sensitively
    pub case_sensitive: bool,
    /// Require the match to reach the end of the pathname
    pub end: bool,
}

impl PathPattern {
    /// A case-insensitive pattern that must match the whole pathname
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            case_sensitive: false,
            end: true,
        }
    }

    /// Set case sensitivity
    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Set whether the match must reach the end of the pathname
    pub fn end(mut self, end: bool) -> Self {
        self.end = end;
        self
    }
}

impl From<&str> for PathPattern {
    fn from(path: &str) -> Self {
        PathPattern::new(path)
    }
}

impl From<String> for PathPattern {
    fn from(path: String) -> Self {
        PathPattern::new(path)
    }
}

/// Information about how a pattern matched a pathname
#[derive(Debug, Clone, PartialEq)]
pub struct PathMatch {
    /// Decoded parameter values
    pub params: Params,
    /// The portion of the pathname that was matched
    pub pathname: String,
    /// The matched portion before any splat, without trailing slashes
    pub pathname_base: String,
    /// The pattern that was used
    pub pattern: PathPattern,
}

/// A compiled pattern
#[derive(Debug, Clone)]
pub struct CompiledPath {
    matcher: Regex,
    param_names: Vec<String>,
}

impl CompiledPath {
    /// The regex source this pattern compiled to
    pub fn source(&self) -> &str {
        self.matcher.as_str()
    }

    /// Parameter names in capture order; a splat is named `"*"`
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    /// Run the matcher against a pathname
    pub fn exec(
        &self,
        pattern: &PathPattern,
        pathname: &str,
        warnings: &mut Warnings,
    ) -> Option<PathMatch> {
        let captures = self.matcher.captures(pathname.as_bytes())?;
        let matched = captures
            .get(0)
            .map(|m| String::from_utf8_lossy(m.as_bytes()).into_owned())
            .unwrap_or_default();
        let mut pathname_base = trim_trailing_slashes(&matched).to_string();
        let mut params = Params::new();

        for (index, name) in self.param_names.iter().enumerate() {
            let value = captures
                .get(index + 1)
                .map(|m| String::from_utf8_lossy(m.as_bytes()).into_owned())
                .unwrap_or_default();

            if name == "*" {
                let prefix = matched
                    .get(..matched.len().saturating_sub(value.len()))
                    .unwrap_or(&matched);
                pathname_base = trim_trailing_slashes(prefix).to_string();
            }

            params.insert(name.clone(), safely_decode(&value, name, warnings));
        }

        Some(PathMatch {
            params,
            pathname: matched,
            pathname_base,
            pattern: pattern.clone(),
        })
    }
}

/// Compile a pattern into a matcher and its parameter names.
///
/// # Example
///
/// ```
/// use nav_router::{compile_path, Warnings};
///
/// let mut warnings = Warnings::new();
/// let compiled = compile_path("/files/:type/*", false, true, &mut warnings).unwrap();
/// assert_eq!(compiled.param_names(), ["type", "*"]);
/// ```
pub fn compile_path(
    path: &str,
    case_sensitive: bool,
    end: bool,
    warnings: &mut Warnings,
) -> Result<CompiledPath, ConfigurationError> {
    if path != "*" && path.ends_with('*') && !path.ends_with("/*") {
        warnings.warn(Warning::SplatWithoutSlash {
            path: path.to_string(),
        });
    }

    let mut param_names = Vec::new();
    let trimmed = path.strip_suffix('*').unwrap_or(path).trim_end_matches('/');
    let normalized = format!("/{}", trimmed.trim_start_matches('/'));

    let mut source = String::from("^");
    push_segments(&normalized, &mut source, &mut param_names);

    if path.ends_with('*') {
        param_names.push("*".to_string());
        if path == "*" || path == "/*" {
            // The leading `/` is already matched; the splat is everything after it
            source.push_str("(.*)$");
        } else {
            // The splat value never includes its leading `/`
            source.push_str("(?:/(.+)|/*)$");
        }
    } else if end {
        source.push_str("/*$");
    } else {
        source.push_str(r"(?:(?-u:\b)|$)");
    }

    trace_log!("Compiled route path '{}' to '{}'", path, source);

    let matcher = RegexBuilder::new(&source)
        .case_insensitive(!case_sensitive)
        .build()
        .map_err(|e| ConfigurationError::InvalidPattern {
            path: path.to_string(),
            message: e.to_string(),
        })?;

    Ok(CompiledPath {
        matcher,
        param_names,
    })
}

/// Escape static text and turn each `:name` into a capture group
fn push_segments(path: &str, source: &mut String, param_names: &mut Vec<String>) {
    let mut rest = path;

    while let Some(colon) = rest.find(':') {
        let after = &rest[colon + 1..];
        let name_len = after
            .bytes()
            .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
            .count();

        if name_len == 0 {
            source.push_str(&regex::escape(&rest[..=colon]));
            rest = after;
            continue;
        }

        source.push_str(&regex::escape(&rest[..colon]));
        source.push_str("([^/]+)");
        param_names.push(after[..name_len].to_string());
        rest = &after[name_len..];
    }

    source.push_str(&regex::escape(rest));
}

/// Strip trailing slashes, keeping the first character of the input
fn trim_trailing_slashes(s: &str) -> &str {
    let trimmed = s.trim_end_matches('/');
    if trimmed.is_empty() && !s.is_empty() {
        &s[..1]
    } else {
        trimmed
    }
}

/// Percent-decode a parameter value, keeping it raw if it is malformed
fn safely_decode(value: &str, param: &str, warnings: &mut Warnings) -> String {
    let decoded = if has_valid_escapes(value) {
        percent_decode_str(value).decode_utf8().ok()
    } else {
        None
    };

    match decoded {
        Some(decoded) => decoded.into_owned(),
        None => {
            warnings.warn(Warning::MalformedParam {
                param: param.to_string(),
                value: value.to_string(),
            });
            value.to_string()
        }
    }
}

/// Every `%` must introduce two hex digits
fn has_valid_escapes(value: &str) -> bool {
    let bytes = value.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes.len() > i + 2
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit();
            if !valid {
                return false;
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    true
}

// ============================================================================
// PathMatcher
// ============================================================================

/// Matching context: owns the warning set and, with the `cache` feature, a
/// cache of compiled patterns.
///
/// Results never depend on the cache.
#[derive(Debug, Default)]
pub struct PathMatcher {
    warnings: Warnings,
    #[cfg(feature = "cache")]
    cache: crate::cache::PatternCache,
}

impl PathMatcher {
    /// Create a matcher with an empty warning set
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile a pattern, reusing a cached compilation when available
    pub fn compile(&mut self, pattern: &PathPattern) -> Result<CompiledPath, ConfigurationError> {
        #[cfg(feature = "cache")]
        if let Some(compiled) = self.cache.get(pattern) {
            return Ok(compiled);
        }

        let compiled = compile_path(
            &pattern.path,
            pattern.case_sensitive,
            pattern.end,
            &mut self.warnings,
        )?;

        #[cfg(feature = "cache")]
        self.cache.insert(pattern.clone(), compiled.clone());

        Ok(compiled)
    }

    /// Match a pattern against a pathname
    pub fn match_path(
        &mut self,
        pattern: impl Into<PathPattern>,
        pathname: &str,
    ) -> Result<Option<PathMatch>, ConfigurationError> {
        let pattern = pattern.into();
        let compiled = self.compile(&pattern)?;
        Ok(compiled.exec(&pattern, pathname, &mut self.warnings))
    }

    /// Warnings raised by this matcher
    pub fn warnings(&self) -> &Warnings {
        &self.warnings
    }

    /// Mutable access to the warning set
    pub fn warnings_mut(&mut self) -> &mut Warnings {
        &mut self.warnings
    }

    /// Compiled-pattern cache statistics
    #[cfg(feature = "cache")]
    pub fn cache_stats(&self) -> &crate::cache::CacheStats {
        self.cache.stats()
    }
}

/// Match a pattern against a pathname.
///
/// A string pattern is case-insensitive and must match the whole pathname.
///
/// # Example
///
/// ```
/// use nav_router::match_path;
///
/// let m = match_path("/users/:id", "/users/42").unwrap().unwrap();
/// assert_eq!(m.params.get("id"), Some("42"));
/// assert_eq!(m.pathname, "/users/42");
///
/// assert!(match_path("/users/:id", "/posts/42").unwrap().is_none());
/// ```
pub fn match_path(
    pattern: impl Into<PathPattern>,
    pathname: &str,
) -> Result<Option<PathMatch>, ConfigurationError> {
    PathMatcher::new().match_path(pattern, pathname)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(pattern: impl Into<PathPattern>, pathname: &str) -> Option<PathMatch> {
        match_path(pattern, pathname).unwrap()
    }

    #[test]
    fn test_compile_sources() {
        let mut warnings = Warnings::new();
        let source = |path: &str, end: bool, w: &mut Warnings| {
            compile_path(path, false, end, w).unwrap().source().to_string()
        };

        assert_eq!(source("/", true, &mut warnings), "^//*$");
        assert_eq!(source("/auth", true, &mut warnings), "^/auth/*$");
        assert_eq!(source("auth/*", true, &mut warnings), "^/auth(?:/(.+)|/*)$");
        assert_eq!(source("*", true, &mut warnings), "^/(.*)$");
        assert_eq!(source("/", false, &mut warnings), r"^/(?:(?-u:\b)|$)");
        assert_eq!(source("/a.b", true, &mut warnings), r"^/a\.b/*$");
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_static_route_matching() {
        assert!(matches("/users", "/users").is_some());
        assert!(matches("/users", "/users/").is_some());
        assert!(matches("/users", "/posts").is_none());
        assert!(matches("/users", "/users/123").is_none());
    }

    #[test]
    fn test_case_sensitivity() {
        assert!(matches("/Users", "/users").is_some());
        assert!(matches(PathPattern::new("/Users").case_sensitive(true), "/users").is_none());
        assert!(matches(PathPattern::new("/Users").case_sensitive(true), "/Users").is_some());
    }

    #[test]
    fn test_dynamic_route_matching() {
        let m = matches("/users/:id", "/users/123").unwrap();
        assert_eq!(m.params.get("id"), Some("123"));
        assert_eq!(m.pathname_base, "/users/123");

        assert!(matches("/users/:id", "/users").is_none());
        assert!(matches("/users/:id", "/users/123/posts").is_none());
    }

    #[test]
    fn test_complex_pattern() {
        let m = matches("/api/users/:userId/posts/:postId", "/api/users/42/posts/7").unwrap();
        assert_eq!(m.params.get("userId"), Some("42"));
        assert_eq!(m.params.get("postId"), Some("7"));
    }

    #[test]
    fn test_root_splat_captures_everything() {
        let m = matches("*", "/a/b/c").unwrap();
        assert_eq!(m.params.get("*"), Some("a/b/c"));
        assert_eq!(m.pathname_base, "/");

        let m = matches("/*", "/").unwrap();
        assert_eq!(m.params.get("*"), Some(""));
    }

    #[test]
    fn test_nested_splat() {
        let m = matches("/files/*", "/files/docs/report.pdf").unwrap();
        assert_eq!(m.params.get("*"), Some("docs/report.pdf"));
        assert_eq!(m.pathname, "/files/docs/report.pdf");
        assert_eq!(m.pathname_base, "/files");

        let m = matches("/files/*", "/files").unwrap();
        assert_eq!(m.params.get("*"), Some(""));
        assert_eq!(m.pathname_base, "/files");

        let m = matches("/files/*", "/files/").unwrap();
        assert_eq!(m.params.get("*"), Some(""));

        assert!(matches("/files/*", "/other").is_none());
        assert!(matches("/files/*", "/filesystem").is_none());
    }

    #[test]
    fn test_nested_splat_accepts_double_trailing_slash() {
        let m = matches("/files/*", "/files//").unwrap();
        assert_eq!(m.params.get("*"), Some("/"));
        assert_eq!(m.pathname_base, "/files");
    }

    #[test]
    fn test_splat_without_slash_warns_and_is_treated_as_slash_splat() {
        let mut matcher = PathMatcher::new();
        let m = matcher.match_path("/files*", "/files/a").unwrap().unwrap();

        assert_eq!(m.params.get("*"), Some("a"));
        assert_eq!(
            matcher.warnings().emitted(),
            &[Warning::SplatWithoutSlash {
                path: "/files*".to_string()
            }]
        );
    }

    #[test]
    fn test_word_boundary_without_end() {
        let prefix = PathPattern::new("/home").end(false);
        let m = matches(prefix.clone(), "/home/about").unwrap();
        assert_eq!(m.pathname, "/home");

        assert!(matches(prefix.clone(), "/home").is_some());
        assert!(matches(prefix, "/home2").is_none());
    }

    #[test]
    fn test_trailing_slash_trimmed_from_base() {
        let m = matches("/users", "/users///").unwrap();
        assert_eq!(m.pathname, "/users///");
        assert_eq!(m.pathname_base, "/users");

        let m = matches("/", "/").unwrap();
        assert_eq!(m.pathname_base, "/");
    }

    #[test]
    fn test_param_values_are_decoded() {
        let m = matches("/tags/:tag", "/tags/caf%C3%A9%20au%20lait").unwrap();
        assert_eq!(m.params.get("tag"), Some("café au lait"));
    }

    #[test]
    fn test_malformed_param_kept_raw() {
        let mut matcher = PathMatcher::new();
        let m = matcher.match_path("/tags/:tag", "/tags/100%").unwrap().unwrap();
        assert_eq!(m.params.get("tag"), Some("100%"));

        let m = matcher.match_path("/tags/:tag", "/tags/%E0%A4%A").unwrap().unwrap();
        assert_eq!(m.params.get("tag"), Some("%E0%A4%A"));

        let m = matcher.match_path("/tags/:tag", "/tags/%FF").unwrap().unwrap();
        assert_eq!(m.params.get("tag"), Some("%FF"));

        assert_eq!(matcher.warnings().emitted().len(), 3);
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        assert!(matches("/a.b", "/a.b").is_some());
        assert!(matches("/a.b", "/axb").is_none());
        assert!(matches("/(x)", "/(x)").is_some());
    }

    #[test]
    fn test_lone_colon_is_static() {
        assert!(matches("/a:/b", "/a:/b").is_some());
    }
}
