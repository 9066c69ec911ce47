// ── Global status ──
//
// Six protection flags scattered over five endpoints, folded into one
// view. A flag whose source was not read this cycle is `Unknown`, never
// `Disabled`.

use serde::Serialize;
use strum::Display;

use super::{EnabledStatus, FilteringStatus, SafeSearchSettings, ServerStatus};

/// Tri-state flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FlagState {
    Enabled,
    Disabled,
    #[default]
    Unknown,
}

impl From<Option<bool>> for FlagState {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(true) => Self::Enabled,
            Some(false) => Self::Disabled,
            None => Self::Unknown,
        }
    }
}

impl FlagState {
    pub fn as_bool(self) -> Option<bool> {
        match self {
            Self::Enabled => Some(true),
            Self::Disabled => Some(false),
            Self::Unknown => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GlobalStatus {
    pub version: Option<String>,
    pub running: FlagState,
    pub protection: FlagState,
    pub filtering: FlagState,
    pub safe_browsing: FlagState,
    pub parental: FlagState,
    pub safe_search: FlagState,
}

/// Sources for [`GlobalStatus::derive`]: `None` for anything that was not
/// freshly read.
#[derive(Debug, Default, Clone, Copy)]
pub struct StatusSources<'a> {
    pub server: Option<&'a ServerStatus>,
    pub filtering: Option<&'a FilteringStatus>,
    pub safe_browsing: Option<&'a EnabledStatus>,
    pub parental: Option<&'a EnabledStatus>,
    pub safe_search: Option<&'a SafeSearchSettings>,
}

impl GlobalStatus {
    pub fn derive(sources: StatusSources<'_>) -> Self {
        let server = sources.server;
        Self {
            version: server
                .map(|s| s.version.clone())
                .filter(|v| !v.is_empty()),
            running: server.and_then(|s| s.running).into(),
            protection: server.and_then(|s| s.protection_enabled).into(),
            filtering: sources.filtering.and_then(|f| f.enabled).into(),
            safe_browsing: sources.safe_browsing.and_then(|s| s.enabled).into(),
            parental: sources.parental.and_then(|s| s.enabled).into(),
            safe_search: sources.safe_search.and_then(|s| s.enabled).into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_sources_are_unknown_not_disabled() {
        let server = ServerStatus {
            version: "v0.107.60".into(),
            running: Some(true),
            protection_enabled: Some(false),
            ..Default::default()
        };
        let parental = EnabledStatus {
            enabled: Some(true),
        };
        let status = GlobalStatus::derive(StatusSources {
            server: Some(&server),
            parental: Some(&parental),
            ..Default::default()
        });

        assert_eq!(status.version.as_deref(), Some("v0.107.60"));
        assert_eq!(status.protection, FlagState::Disabled);
        assert_eq!(status.parental, FlagState::Enabled);
        assert_eq!(status.filtering, FlagState::Unknown);
        assert_eq!(status.safe_browsing, FlagState::Unknown);
        assert_eq!(status.safe_search.as_bool(), None);
    }
}
