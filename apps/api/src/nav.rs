//! Client-side route table and the navigation that depends on the auth snapshot.

use axum::Json;
use serde::Serialize;

use crate::auth::{AuthUser, MaybeUser};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Home,
    Login,
    Register,
    CreateCapsule,
    MyCapsules,
    Rewards,
    Profile,
}

impl Route {
    #[cfg(test)]
    pub const ALL: [Route; 7] = [
        Route::Home,
        Route::Login,
        Route::Register,
        Route::CreateCapsule,
        Route::MyCapsules,
        Route::Rewards,
        Route::Profile,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Login => "/login",
            Route::Register => "/register",
            Route::CreateCapsule => "/create-capsule",
            Route::MyCapsules => "/my-capsules",
            Route::Rewards => "/rewards",
            Route::Profile => "/profile",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Route::Home => "Home",
            Route::Login => "Login",
            Route::Register => "Register",
            Route::CreateCapsule => "Create Capsule",
            Route::MyCapsules => "My Capsules",
            Route::Rewards => "Rewards",
            Route::Profile => "Profile",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NavItem {
    Link { label: &'static str, path: &'static str },
    SignOut { label: &'static str },
}

impl From<Route> for NavItem {
    fn from(route: Route) -> Self {
        NavItem::Link {
            label: route.label(),
            path: route.path(),
        }
    }
}

/// Navigation shown for the given auth snapshot.
pub fn nav_links(user: Option<&AuthUser>) -> Vec<NavItem> {
    match user {
        Some(_) => vec![
            Route::CreateCapsule.into(),
            Route::MyCapsules.into(),
            Route::Rewards.into(),
            Route::Profile.into(),
            NavItem::SignOut { label: "Sign Out" },
        ],
        None => vec![Route::Login.into(), Route::Register.into()],
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallToAction {
    pub label: &'static str,
    pub path: &'static str,
}

/// Home hero button: members create a capsule, visitors register.
pub fn home_cta(user: Option<&AuthUser>) -> CallToAction {
    match user {
        Some(_) => CallToAction {
            label: "Create Your Time Capsule",
            path: Route::CreateCapsule.path(),
        },
        None => CallToAction {
            label: "Start Your Journey",
            path: Route::Register.path(),
        },
    }
}

#[derive(Debug, Serialize)]
pub struct NavResponse {
    pub authenticated: bool,
    pub links: Vec<NavItem>,
    pub home_cta: CallToAction,
}

impl NavResponse {
    pub fn for_user(user: Option<&AuthUser>) -> Self {
        NavResponse {
            authenticated: user.is_some(),
            links: nav_links(user),
            home_cta: home_cta(user),
        }
    }
}

/// GET /api/v1/nav
pub async fn handle_nav(current: MaybeUser) -> Json<NavResponse> {
    Json(NavResponse::for_user(current.user()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn user() -> AuthUser {
        AuthUser {
            id: Uuid::new_v4(),
            email: None,
            created_at: None,
        }
    }

    #[test]
    fn test_anonymous_links() {
        assert_eq!(
            nav_links(None),
            vec![
                NavItem::Link { label: "Login", path: "/login" },
                NavItem::Link { label: "Register", path: "/register" },
            ]
        );
    }

    #[test]
    fn test_signed_in_links_end_with_sign_out() {
        let u = user();
        let links = nav_links(Some(&u));
        assert_eq!(links.len(), 5);
        assert_eq!(links.last(), Some(&NavItem::SignOut { label: "Sign Out" }));
        assert!(!links.contains(&Route::Login.into()));
    }

    #[test]
    fn test_home_cta_depends_on_user() {
        assert_eq!(home_cta(None).path, "/register");
        assert_eq!(home_cta(Some(&user())).path, "/create-capsule");
    }

    #[test]
    fn test_route_paths_are_unique() {
        let mut paths: Vec<&str> = Route::ALL.iter().map(|r| r.path()).collect();
        paths.sort();
        paths.dedup();
        assert_eq!(paths.len(), Route::ALL.len());
    }
}
