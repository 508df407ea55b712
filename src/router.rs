use tracing::{debug, info};

use crate::record::RecordId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Users,
    UserDetails(RecordId),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Users => "/users".to_string(),
            Route::UserDetails(id) => format!("/users/{id}"),
        }
    }

    /// Unknown paths fall back to the users list.
    pub fn parse(path: &str) -> Route {
        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
        match segments.as_slice() {
            ["users", id] if !id.is_empty() => Route::UserDetails(RecordId::from(*id)),
            _ => Route::Users,
        }
    }
}

/// Push style navigation history.
#[derive(Debug)]
pub struct Router {
    history: Vec<Route>,
}

impl Default for Router {
    fn default() -> Self {
        Router {
            history: vec![Route::Users],
        }
    }
}

impl Router {
    pub fn navigate(&mut self, path: &str) {
        let route = Route::parse(path);
        info!("Navigate to {}", route.path());
        self.history.push(route);
    }

    pub fn back(&mut self) -> bool {
        if self.history.len() > 1 {
            let left = self.history.pop();
            debug!("Left {:?}", left);
            true
        } else {
            false
        }
    }

    pub fn current(&self) -> &Route {
        self.history.last().unwrap_or(&Route::Users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_round_trip_and_unknown_paths_fall_back() {
        assert_eq!(Route::parse("/users/42"), Route::UserDetails(RecordId::from("42")));
        assert_eq!(Route::parse("/users"), Route::Users);
        assert_eq!(Route::parse("/loans/3"), Route::Users);
        assert_eq!(Route::parse("/users/"), Route::Users);
        assert_eq!(Route::UserDetails(RecordId::from("7")).path(), "/users/7");
    }

    #[test]
    fn back_stops_at_the_first_route() {
        let mut router = Router::default();
        router.navigate("/users/1");
        assert_eq!(router.current(), &Route::UserDetails(RecordId::from("1")));
        assert!(router.back());
        assert!(!router.back());
        assert_eq!(router.current(), &Route::Users);
    }
}
