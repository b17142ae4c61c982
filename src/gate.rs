//! Session-gated routing.
//!
//! Decides, from the current `AccessState` alone, whether a requested browser path
//! renders a screen or redirects somewhere else. Resolution is pure: the same state
//! and path always produce the same outcome.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::{
    role::{HeaderVariant, MenuItem, Role},
    session::AccessState,
};

pub const LOGIN_PATH: &str = "/login";
pub const LOGOUT_PATH: &str = "/logout";
pub const CHANGE_PASSWORD_PATH: &str = "/change-password";

/// Screen
///
/// Every screen the application can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Screen {
    Login,
    ChangePassword,
    UserHome,
    UserScanner,
    UserHistory,
    VendorHome,
    VendorScanner,
    VendorClaims,
    VendorHistory,
    AdminHome,
}

/// Who may reach a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Only reachable without a usable session.
    Anonymous,
    Role(Role),
    /// Any authenticated role.
    AnyRole,
}

#[derive(Debug, Clone, Copy)]
pub struct RouteEntry {
    pub path: &'static str,
    pub screen: Screen,
    pub access: Access,
}

const fn entry(path: &'static str, screen: Screen, access: Access) -> RouteEntry {
    RouteEntry {
        path,
        screen,
        access,
    }
}

pub static ROUTE_TABLE: &[RouteEntry] = &[
    entry(LOGIN_PATH, Screen::Login, Access::Anonymous),
    entry(CHANGE_PASSWORD_PATH, Screen::ChangePassword, Access::AnyRole),
    entry("/user/home", Screen::UserHome, Access::Role(Role::User)),
    entry("/user/scanner", Screen::UserScanner, Access::Role(Role::User)),
    entry("/user/history", Screen::UserHistory, Access::Role(Role::User)),
    entry("/vendor/home", Screen::VendorHome, Access::Role(Role::Vendor)),
    entry("/vendor/scanner", Screen::VendorScanner, Access::Role(Role::Vendor)),
    entry("/vendor/claims", Screen::VendorClaims, Access::Role(Role::Vendor)),
    entry("/vendor/history", Screen::VendorHistory, Access::Role(Role::Vendor)),
    entry("/admin/home", Screen::AdminHome, Access::Role(Role::Admin)),
];

pub fn lookup(path: &str) -> Option<&'static RouteEntry> {
    ROUTE_TABLE.iter().find(|route| route.path == path)
}

/// Sub-views hosted inside the admin home screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum AdminSection {
    Dashboard,
    Users,
    Vendors,
    Reports,
    ChangePassword,
}

impl AdminSection {
    pub const ALL: [AdminSection; 5] = [
        AdminSection::Dashboard,
        AdminSection::Users,
        AdminSection::Vendors,
        AdminSection::Reports,
        AdminSection::ChangePassword,
    ];

    /// Unknown or missing values select the dashboard.
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("users") => AdminSection::Users,
            Some("vendors") => AdminSection::Vendors,
            Some("reports") => AdminSection::Reports,
            Some("change_password") | Some("change-password") => AdminSection::ChangePassword,
            _ => AdminSection::Dashboard,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct AdminSections {
    pub active: AdminSection,
    pub available: Vec<AdminSection>,
}

/// Page
///
/// A rendered screen together with the navigation shell that wraps it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Page {
    pub path: String,
    pub screen: Screen,
    pub header: HeaderVariant,
    pub menu: Vec<MenuItem>,
    pub sections: Option<AdminSections>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Render(Page),
    Redirect(&'static str),
}

/// Strips the query string and a single trailing slash (root is kept as `/`).
pub fn normalize(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    match path.strip_suffix('/') {
        Some(stripped) if !stripped.is_empty() => stripped,
        _ if path.is_empty() => "/",
        _ => path,
    }
}

/// resolve
///
/// Routes `path` for the given session state.
///
/// * No usable session (no token, or a token with an unrecognised role): only the
///   login screen renders; everything else redirects to it.
/// * Known role: the role's own screens and the shared change-password screen render;
///   everything else, the login screen included, redirects to the role's default path.
pub fn resolve(state: AccessState, path: &str) -> Navigation {
    resolve_with_section(state, path, None)
}

/// Same as [`resolve`], selecting the admin home sub-view from `section`.
pub fn resolve_with_section(state: AccessState, path: &str, section: Option<&str>) -> Navigation {
    let path = normalize(path);
    let route = lookup(path);

    let Some(role) = state.role() else {
        return match route {
            Some(route) if route.access == Access::Anonymous => {
                Navigation::Render(anonymous_page(route))
            }
            _ => Navigation::Redirect(LOGIN_PATH),
        };
    };

    let capability = role.capability();
    match route {
        Some(route) if reachable(route, role) => Navigation::Render(Page {
            path: route.path.to_string(),
            screen: route.screen,
            header: capability.header,
            menu: capability.menu_items(),
            sections: (route.screen == Screen::AdminHome).then(|| AdminSections {
                active: AdminSection::from_query(section),
                available: AdminSection::ALL.to_vec(),
            }),
        }),
        _ => Navigation::Redirect(capability.default_path),
    }
}

fn reachable(route: &RouteEntry, role: Role) -> bool {
    match route.access {
        Access::Anonymous => false,
        Access::AnyRole => true,
        Access::Role(owner) => owner == role && role.capability().owns(route.screen),
    }
}

fn anonymous_page(route: &RouteEntry) -> Page {
    Page {
        path: route.path.to_string(),
        screen: route.screen,
        header: HeaderVariant::None,
        menu: Vec::new(),
        sections: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn redirect_target(state: AccessState, path: &str) -> Option<&'static str> {
        match resolve(state, path) {
            Navigation::Redirect(to) => Some(to),
            Navigation::Render(_) => None,
        }
    }

    #[test]
    fn every_protected_path_has_exactly_one_owner_except_change_password() {
        for route in ROUTE_TABLE {
            let owners: Vec<Role> = Role::ALL
                .into_iter()
                .filter(|role| role.capability().owns(route.screen))
                .collect();
            match route.access {
                Access::Anonymous | Access::AnyRole => assert!(owners.is_empty(), "{}", route.path),
                Access::Role(role) => assert_eq!(owners, vec![role], "{}", route.path),
            }
        }
        let shared: Vec<_> = ROUTE_TABLE
            .iter()
            .filter(|r| r.access == Access::AnyRole)
            .map(|r| r.path)
            .collect();
        assert_eq!(shared, vec![CHANGE_PASSWORD_PATH]);
    }

    #[test]
    fn every_capability_screen_is_routed() {
        for role in Role::ALL {
            for screen in role.capability().screens {
                assert!(ROUTE_TABLE.iter().any(|r| r.screen == *screen));
            }
        }
    }

    #[test]
    fn default_paths_render_for_their_role() {
        for role in Role::ALL {
            let default = role.capability().default_path;
            assert!(matches!(
                resolve(AccessState::Authenticated(role), default),
                Navigation::Render(_)
            ));
        }
    }

    #[test]
    fn anonymous_requests_go_to_login() {
        for route in ROUTE_TABLE.iter().filter(|r| r.access != Access::Anonymous) {
            assert_eq!(
                redirect_target(AccessState::Unauthenticated, route.path),
                Some(LOGIN_PATH)
            );
        }
        assert_eq!(
            redirect_target(AccessState::Unauthenticated, "/admin/home"),
            Some(LOGIN_PATH)
        );
        assert_eq!(redirect_target(AccessState::Unauthenticated, LOGIN_PATH), None);
    }

    #[test]
    fn unknown_role_routes_like_anonymous() {
        assert_eq!(
            redirect_target(AccessState::UnknownRole, CHANGE_PASSWORD_PATH),
            Some(LOGIN_PATH)
        );
        assert_eq!(
            redirect_target(AccessState::UnknownRole, "/user/home"),
            Some(LOGIN_PATH)
        );
        assert_eq!(redirect_target(AccessState::UnknownRole, LOGIN_PATH), None);
    }

    #[test]
    fn vendor_is_sent_home_from_foreign_paths() {
        let vendor = AccessState::Authenticated(Role::Vendor);
        assert_eq!(redirect_target(vendor, "/user/home"), Some("/vendor/home"));
        assert_eq!(redirect_target(vendor, "/admin/home"), Some("/vendor/home"));
        assert_eq!(redirect_target(vendor, LOGIN_PATH), Some("/vendor/home"));
    }

    #[test]
    fn admin_unknown_path_redirects_to_admin_home() {
        assert_eq!(
            redirect_target(AccessState::Authenticated(Role::Admin), "/nonexistent"),
            Some("/admin/home")
        );
    }

    #[test]
    fn user_fallback_is_the_scanner() {
        assert_eq!(
            redirect_target(AccessState::Authenticated(Role::User), "/"),
            Some("/user/scanner")
        );
    }

    #[test]
    fn change_password_is_shared_by_all_roles() {
        for role in Role::ALL {
            let Navigation::Render(page) =
                resolve(AccessState::Authenticated(role), CHANGE_PASSWORD_PATH)
            else {
                panic!("change-password should render for {role}");
            };
            assert_eq!(page.screen, Screen::ChangePassword);
            assert_eq!(page.header, role.capability().header);
        }
    }

    #[test]
    fn resolving_twice_is_identical() {
        let user = AccessState::Authenticated(Role::User);
        assert_eq!(resolve(user, "/user/history"), resolve(user, "/user/history"));
    }

    #[test]
    fn trailing_slash_and_query_are_ignored() {
        assert_eq!(normalize("/vendor/claims/"), "/vendor/claims");
        assert_eq!(normalize("/admin/home?section=users"), "/admin/home");
        assert_eq!(normalize("/"), "/");
        assert_eq!(normalize(""), "/");
    }

    #[test]
    fn paths_match_case_sensitively() {
        assert_eq!(
            resolve(AccessState::Authenticated(Role::Vendor), "/Vendor/Home"),
            Navigation::Redirect("/vendor/home")
        );
        assert_eq!(
            resolve(AccessState::Unauthenticated, "/LOGIN"),
            Navigation::Redirect(LOGIN_PATH)
        );
    }

    #[test]
    fn admin_home_exposes_sections() {
        let Navigation::Render(page) = resolve_with_section(
            AccessState::Authenticated(Role::Admin),
            "/admin/home",
            Some("reports"),
        ) else {
            panic!("admin home should render");
        };
        let sections = page.sections.expect("admin home carries sections");
        assert_eq!(sections.active, AdminSection::Reports);
        assert_eq!(sections.available.len(), 5);
        assert_eq!(AdminSection::from_query(Some("bogus")), AdminSection::Dashboard);
    }
}
