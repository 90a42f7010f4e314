//! Route table and authentication gate

use std::fmt;

use serde::{Deserialize, Serialize};

/// Screens of the app
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "screen", content = "id", rename_all = "lowercase")]
pub enum Route {
    Login,
    Register,
    Home,
    /// Detail screen of one title
    Details(String),
}

impl Route {
    /// Whether the screen needs a stored session
    pub fn requires_session(&self) -> bool {
        matches!(self, Route::Home | Route::Details(_))
    }

    /// Map a path to a screen, ignoring the session.
    ///
    /// The empty path and anything unknown map to `Login`.
    pub fn parse(path: &str) -> Route {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            ["login"] => Route::Login,
            ["register"] => Route::Register,
            ["home"] => Route::Home,
            ["details", id] => Route::Details((*id).to_string()),
            _ => Route::Login,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Login => write!(f, "/login"),
            Route::Register => write!(f, "/register"),
            Route::Home => write!(f, "/home"),
            Route::Details(id) => write!(f, "/details/{}", id),
        }
    }
}

/// Resolve `path`, sending guarded screens to `Login` when no session is stored.
pub fn resolve(path: &str, session_present: bool) -> Route {
    let route = Route::parse(path);
    if route.requires_session() && !session_present {
        return Route::Login;
    }
    route
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_paths() {
        assert_eq!(Route::parse("/login"), Route::Login);
        assert_eq!(Route::parse("register"), Route::Register);
        assert_eq!(Route::parse("/home/"), Route::Home);
        assert_eq!(Route::parse("/details/s42"), Route::Details("s42".to_string()));
        assert_eq!(Route::parse("/details/s42?from=home"), Route::Details("s42".to_string()));
    }

    #[test]
    fn test_parse_fallback_to_login() {
        assert_eq!(Route::parse(""), Route::Login);
        assert_eq!(Route::parse("/"), Route::Login);
        assert_eq!(Route::parse("/nowhere"), Route::Login);
        assert_eq!(Route::parse("/details"), Route::Login);
        assert_eq!(Route::parse("/details/a/b"), Route::Login);
    }

    #[test]
    fn test_guard_redirects_without_session() {
        assert_eq!(resolve("/home", false), Route::Login);
        assert_eq!(resolve("/details/s1", false), Route::Login);
        assert_eq!(resolve("/register", false), Route::Register);
    }

    #[test]
    fn test_guard_allows_with_session() {
        assert_eq!(resolve("/home", true), Route::Home);
        assert_eq!(resolve("/details/s1", true), Route::Details("s1".to_string()));
    }

    #[test]
    fn test_route_display_round_trips() {
        for route in [
            Route::Login,
            Route::Register,
            Route::Home,
            Route::Details("s9".to_string()),
        ] {
            assert_eq!(Route::parse(&route.to_string()), route);
        }
    }

    #[test]
    fn test_route_serialization() {
        let json = serde_json::to_string(&Route::Details("s1".to_string())).unwrap();
        assert_eq!(json, r#"{"screen":"details","id":"s1"}"#);
        let json = serde_json::to_string(&Route::Home).unwrap();
        assert_eq!(json, r#"{"screen":"home"}"#);
    }
}
