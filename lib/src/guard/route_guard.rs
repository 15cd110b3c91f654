// lib/src/guard/route_guard.rs
use models::Role;
use once_cell::sync::Lazy;
use reqwest::Url;
use crate::session::SessionStore;

static LOGIN_URL: Lazy<Url> = Lazy::new(|| Url::parse("http://portal.local/login").expect("login url parses"));

/// `/login?returnUrl=<encoded>`, the way the login view expects it.
pub fn login_location(return_url: &str) -> String {
    let mut url = LOGIN_URL.clone();
    url.query_pairs_mut().append_pair("returnUrl", return_url);
    match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    RedirectToLogin { return_url: String },
    RedirectToDashboard { path: String },
}

impl GuardDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GuardDecision::Allow)
    }

    /// Where the user is sent instead, if anywhere.
    pub fn location(&self) -> Option<String> {
        match self {
            GuardDecision::Allow => None,
            GuardDecision::RedirectToLogin { return_url } => Some(login_location(return_url)),
            GuardDecision::RedirectToDashboard { path } => Some(path.clone()),
        }
    }
}

/// Pure predicate over the session store; keeps no state between calls.
#[derive(Clone)]
pub struct RouteGuard {
    session: SessionStore,
}

impl RouteGuard {
    pub fn new(session: SessionStore) -> Self {
        RouteGuard { session }
    }

    pub fn can_activate(&self, url: &str, expected_role: Option<&str>) -> GuardDecision {
        let Some(session) = self.session.current_session() else {
            return GuardDecision::RedirectToLogin { return_url: url.to_string() };
        };
        match expected_role {
            Some(expected) if !session.role().matches(expected) => GuardDecision::RedirectToDashboard {
                path: session.role().dashboard_path().to_string(),
            },
            _ => GuardDecision::Allow,
        }
    }

    pub fn can_activate_for(&self, url: &str, expected_role: Role) -> GuardDecision {
        self.can_activate(url, Some(expected_role.as_str()))
    }
}
