use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::gate::Screen;

/// Role
///
/// The three account types the backend issues in the `user_type` field of a login grant.
/// Anything else is not a role: callers receive `None` from `Role::from_tag` and route
/// the session as if nobody were signed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    /// Employee account (earns and sends points).
    User,
    Vendor,
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::User, Role::Vendor, Role::Admin];

    /// Parses the persisted role tag. Matching is exact; the backend only ever
    /// emits lowercase tags.
    pub fn from_tag(tag: &str) -> Option<Role> {
        match tag {
            "user" => Some(Role::User),
            "vendor" => Some(Role::Vendor),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    pub fn as_tag(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Vendor => "vendor",
            Role::Admin => "admin",
        }
    }

    /// capability
    ///
    /// The single role lookup consumed by the gate, the header builder and the
    /// session endpoints. No other module branches on `Role` directly.
    pub fn capability(self) -> &'static RoleCapability {
        match self {
            Role::User => &USER_CAPABILITY,
            Role::Vendor => &VENDOR_CAPABILITY,
            Role::Admin => &ADMIN_CAPABILITY,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// HeaderVariant
///
/// Which navigation shell wraps a role's screens. Admin has none: the admin home
/// screen carries its own section navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum HeaderVariant {
    User,
    Vendor,
    None,
}

/// MenuItem
///
/// One entry of a header's dropdown menu, already resolved to an absolute path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct MenuItem {
    pub label: String,
    pub href: String,
}

/// Where a menu entry points before it is resolved for a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuTarget {
    /// Suffix under the role prefix, e.g. `/history` becomes `/vendor/history`.
    RoleScoped(&'static str),
    /// Shared path used verbatim.
    Shared(&'static str),
}

/// RoleCapability
///
/// Everything the application needs to know about a role: the screens it may reach,
/// where it lands by default and which header wraps its content.
#[derive(Debug)]
pub struct RoleCapability {
    pub role: Role,
    pub screens: &'static [Screen],
    pub default_path: &'static str,
    pub header: HeaderVariant,
    pub menu: &'static [(&'static str, MenuTarget)],
}

impl RoleCapability {
    /// Whether `screen` belongs to this role's own screen set. The shared
    /// change-password screen is not part of any role set.
    pub fn owns(&self, screen: Screen) -> bool {
        self.screens.contains(&screen)
    }

    /// Resolves the header menu into absolute links for this role.
    pub fn menu_items(&self) -> Vec<MenuItem> {
        self.menu
            .iter()
            .map(|(label, target)| MenuItem {
                label: (*label).to_string(),
                href: match target {
                    MenuTarget::RoleScoped(suffix) => format!("/{}{}", self.role.as_tag(), suffix),
                    MenuTarget::Shared(path) => (*path).to_string(),
                },
            })
            .collect()
    }
}

const CHANGE_PASSWORD: (&str, MenuTarget) =
    ("Change Password", MenuTarget::Shared(crate::gate::CHANGE_PASSWORD_PATH));
const LOGOUT: (&str, MenuTarget) = ("Logout", MenuTarget::Shared(crate::gate::LOGOUT_PATH));

static USER_CAPABILITY: RoleCapability = RoleCapability {
    role: Role::User,
    screens: &[Screen::UserHome, Screen::UserScanner, Screen::UserHistory],
    default_path: "/user/scanner",
    header: HeaderVariant::User,
    menu: &[
        ("Home", MenuTarget::RoleScoped("/home")),
        ("Send", MenuTarget::RoleScoped("/scanner")),
        ("History", MenuTarget::RoleScoped("/history")),
        CHANGE_PASSWORD,
        LOGOUT,
    ],
};

static VENDOR_CAPABILITY: RoleCapability = RoleCapability {
    role: Role::Vendor,
    screens: &[
        Screen::VendorHome,
        Screen::VendorScanner,
        Screen::VendorClaims,
        Screen::VendorHistory,
    ],
    default_path: "/vendor/home",
    header: HeaderVariant::Vendor,
    menu: &[
        ("Home", MenuTarget::RoleScoped("/home")),
        ("Scanner", MenuTarget::RoleScoped("/scanner")),
        ("Claims Data", MenuTarget::RoleScoped("/claims")),
        ("History", MenuTarget::RoleScoped("/history")),
        CHANGE_PASSWORD,
        LOGOUT,
    ],
};

static ADMIN_CAPABILITY: RoleCapability = RoleCapability {
    role: Role::Admin,
    screens: &[Screen::AdminHome],
    default_path: "/admin/home",
    header: HeaderVariant::None,
    menu: &[],
};
