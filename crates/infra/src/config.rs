//! Engine configuration.

use serde::{Deserialize, Serialize};

use scf_core::UserId;
use scf_facilities::DEFAULT_GRACE_PERIOD_DAYS;

pub const ENV_AUTO_POST: &str = "SCF_AUTO_POST";
pub const ENV_REQUIRE_FACILITY: &str = "SCF_REQUIRE_FACILITY";
pub const ENV_DEFAULT_GRACE_DAYS: &str = "SCF_DEFAULT_GRACE_DAYS";
pub const ENV_SYSTEM_USER: &str = "SCF_SYSTEM_USER";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Post transaction entries immediately instead of leaving them pending.
    pub auto_post: bool,
    /// Reject drawdowns when no facility of the requested type exists.
    pub require_facility: bool,
    /// Grace period for facilities created without explicit terms.
    pub default_grace_days: u32,
    /// Poster recorded on automatically posted entries.
    pub system_user: UserId,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            auto_post: false,
            require_facility: false,
            default_grace_days: DEFAULT_GRACE_PERIOD_DAYS,
            system_user: UserId::from_uuid(uuid::Uuid::nil()),
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Malformed values keep the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            auto_post: parse_or(&lookup, ENV_AUTO_POST, defaults.auto_post, parse_bool),
            require_facility: parse_or(
                &lookup,
                ENV_REQUIRE_FACILITY,
                defaults.require_facility,
                parse_bool,
            ),
            default_grace_days: parse_or(
                &lookup,
                ENV_DEFAULT_GRACE_DAYS,
                defaults.default_grace_days,
                |v| v.parse().ok(),
            ),
            system_user: parse_or(&lookup, ENV_SYSTEM_USER, defaults.system_user, |v| {
                v.parse().ok()
            }),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_or<T: std::fmt::Debug>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
    parse: impl Fn(&str) -> Option<T>,
) -> T {
    let Some(raw) = lookup(key) else {
        return default;
    };
    match parse(raw.trim()) {
        Some(value) => value,
        None => {
            tracing::warn!(key, value = %raw, ?default, "ignoring malformed configuration value");
            default
        }
    }
}
