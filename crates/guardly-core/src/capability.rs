// ── Capability registry ──
//
// Maps a server version to the set of version-dependent features that
// are safe to use against it. The table below is the only place where
// minimum versions are recorded.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

// ── RemoteVersion ────────────────────────────────────────────────────

/// A server version as reported by `/control/status`.
///
/// Ordering and equality look at `(major, minor, patch)` only; the
/// prerelease tag is informational.
#[derive(Debug, Clone, Default)]
pub struct RemoteVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub prerelease: Option<String>,
}

impl RemoteVersion {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            prerelease: None,
        }
    }

    /// Parse `v?MAJOR.MINOR.PATCH(-pre)?`. Anything that does not start
    /// with that shape yields `0.0.0`, which has no capabilities.
    pub fn parse(raw: &str) -> Self {
        Self::try_parse(raw.trim()).unwrap_or_default()
    }

    fn try_parse(raw: &str) -> Option<Self> {
        let raw = raw.strip_prefix('v').unwrap_or(raw);
        let mut parts = raw.splitn(3, '.');
        let major = parts.next()?.parse().ok()?;
        let minor = parts.next()?.parse().ok()?;
        let rest = parts.next()?;

        let digits_end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let (patch, tail) = rest.split_at(digits_end);
        let patch = patch.parse().ok()?;
        let prerelease = tail
            .strip_prefix('-')
            .filter(|pre| !pre.is_empty())
            .map(str::to_owned);

        Some(Self {
            major,
            minor,
            patch,
            prerelease,
        })
    }

    fn key(&self) -> (u64, u64, u64) {
        (self.major, self.minor, self.patch)
    }
}

impl PartialEq for RemoteVersion {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for RemoteVersion {}

impl PartialOrd for RemoteVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RemoteVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl fmt::Display for RemoteVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(ref pre) = self.prerelease {
            write!(f, "-{pre}")?;
        }
        Ok(())
    }
}

impl Serialize for RemoteVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ── Capability ───────────────────────────────────────────────────────

/// A feature whose availability depends on the server version.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumIter,
    EnumString,
    Serialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    StatsConfig,
    QuerylogConfig,
    EcosiaSafesearch,
    ScheduleOnBlockedServices,
    ClientSearch,
    CheckHostParams,
    NewBlockedServices,
    CacheToggle,
    QuerylogResponseStatus,
    RewriteEnableFlag,
}

/// Minimum server version for each capability.
pub const TABLE: [(RemoteVersion, Capability); 10] = [
    (RemoteVersion::new(0, 107, 30), Capability::StatsConfig),
    (RemoteVersion::new(0, 107, 30), Capability::QuerylogConfig),
    (RemoteVersion::new(0, 107, 52), Capability::EcosiaSafesearch),
    (RemoteVersion::new(0, 107, 56), Capability::ScheduleOnBlockedServices),
    (RemoteVersion::new(0, 107, 56), Capability::ClientSearch),
    (RemoteVersion::new(0, 107, 58), Capability::CheckHostParams),
    (RemoteVersion::new(0, 107, 65), Capability::NewBlockedServices),
    (RemoteVersion::new(0, 107, 65), Capability::CacheToggle),
    (RemoteVersion::new(0, 107, 68), Capability::QuerylogResponseStatus),
    (RemoteVersion::new(0, 107, 68), Capability::RewriteEnableFlag),
];

impl Capability {
    /// Minimum server version that has this feature.
    pub fn minimum_version(self) -> RemoteVersion {
        TABLE
            .iter()
            .find(|(_, cap)| *cap == self)
            .map(|(min, _)| min.clone())
            .unwrap_or_default()
    }

    /// The capability guarding a gated endpoint path.
    pub fn for_path(path: &str) -> Option<Self> {
        let path = path.trim_start_matches('/').trim_start_matches("control/");
        match path {
            p if p.starts_with("stats/config") => Some(Self::StatsConfig),
            p if p.starts_with("querylog/config") => Some(Self::QuerylogConfig),
            "clients/search" => Some(Self::ClientSearch),
            "blocked_services/get" | "blocked_services/update" => {
                Some(Self::ScheduleOnBlockedServices)
            }
            _ => None,
        }
    }
}

// ── CapabilitySet ────────────────────────────────────────────────────

/// Which capabilities are usable against one server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CapabilitySet {
    flags: BTreeMap<Capability, bool>,
}

impl Default for CapabilitySet {
    fn default() -> Self {
        Self {
            flags: Capability::iter().map(|cap| (cap, false)).collect(),
        }
    }
}

impl CapabilitySet {
    pub fn contains(&self, cap: Capability) -> bool {
        self.flags.get(&cap).copied().unwrap_or(false)
    }

    /// Enabled capabilities in declaration order.
    pub fn enabled(&self) -> impl Iterator<Item = Capability> + '_ {
        self.flags
            .iter()
            .filter_map(|(cap, on)| on.then_some(*cap))
    }

    /// The same set with `cap` turned off.
    pub fn without(&self, cap: Capability) -> Self {
        let mut next = self.clone();
        next.flags.insert(cap, false);
        next
    }

    /// Every capability with its state.
    pub fn iter(&self) -> impl Iterator<Item = (Capability, bool)> + '_ {
        self.flags.iter().map(|(cap, on)| (*cap, *on))
    }
}

/// Capabilities available at `version`. Pure and monotonic in version.
pub fn capabilities_for(version: &RemoteVersion) -> CapabilitySet {
    let mut set = CapabilitySet::default();
    for (minimum, cap) in &TABLE {
        if version >= minimum {
            set.flags.insert(*cap, true);
        }
    }
    set
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_prefix_and_prerelease() {
        let v = RemoteVersion::parse("v0.107.57");
        assert_eq!(v, RemoteVersion::new(0, 107, 57));
        assert_eq!(v.prerelease, None);

        let v = RemoteVersion::parse("0.108.0-b.3");
        assert_eq!(v, RemoteVersion::new(0, 108, 0));
        assert_eq!(v.prerelease.as_deref(), Some("b.3"));
        assert_eq!(v.to_string(), "v0.108.0-b.3");
    }

    #[test]
    fn parse_garbage_is_zero() {
        for raw in ["", "unknown", "v1.2", "vx.y.z", "1..3"] {
            assert_eq!(RemoteVersion::parse(raw), RemoteVersion::new(0, 0, 0), "{raw}");
        }
        assert!(capabilities_for(&RemoteVersion::parse("dev")).enabled().next().is_none());
    }

    #[test]
    fn ordering_is_numeric() {
        assert!(RemoteVersion::parse("v0.107.9") < RemoteVersion::parse("v0.107.10"));
        assert!(RemoteVersion::parse("v0.108.0") > RemoteVersion::parse("v0.107.99"));
        assert!(RemoteVersion::parse("v1.0.0") > RemoteVersion::parse("v0.999.999"));
    }

    #[test]
    fn each_capability_starts_at_its_minimum() {
        for (minimum, cap) in &TABLE {
            let below = if minimum.patch > 0 {
                RemoteVersion::new(minimum.major, minimum.minor, minimum.patch - 1)
            } else {
                RemoteVersion::new(minimum.major, minimum.minor - 1, 999)
            };
            assert!(!capabilities_for(&below).contains(*cap), "{cap} below {minimum}");
            assert!(capabilities_for(minimum).contains(*cap), "{cap} at {minimum}");
            let above = RemoteVersion::new(minimum.major, minimum.minor + 1, 0);
            assert!(capabilities_for(&above).contains(*cap), "{cap} above {minimum}");
        }
    }

    #[test]
    fn capabilities_grow_with_version() {
        let versions: Vec<RemoteVersion> = (0..=80)
            .map(|patch| RemoteVersion::new(0, 107, patch))
            .collect();
        for pair in versions.windows(2) {
            let older = capabilities_for(&pair[0]);
            let newer = capabilities_for(&pair[1]);
            for cap in older.enabled() {
                assert!(newer.contains(cap), "{cap} lost between {} and {}", pair[0], pair[1]);
            }
        }
    }

    #[test]
    fn v0_107_56_has_schedules_but_not_rewrite_flag() {
        let caps = capabilities_for(&RemoteVersion::parse("v0.107.56"));
        assert!(caps.contains(Capability::ScheduleOnBlockedServices));
        assert!(caps.contains(Capability::ClientSearch));
        assert!(!caps.contains(Capability::CheckHostParams));
        assert!(!caps.contains(Capability::RewriteEnableFlag));
    }

    #[test]
    fn without_downgrades_one_capability() {
        let caps = capabilities_for(&RemoteVersion::new(0, 107, 70));
        let reduced = caps.without(Capability::StatsConfig);
        assert!(!reduced.contains(Capability::StatsConfig));
        assert!(reduced.contains(Capability::QuerylogConfig));
        assert_eq!(reduced.enabled().count(), caps.enabled().count() - 1);
    }

    #[test]
    fn set_serializes_as_kebab_map() {
        let caps = capabilities_for(&RemoteVersion::new(0, 107, 52));
        let json = serde_json::to_value(&caps).expect("serializes");
        assert_eq!(json["ecosia-safesearch"], true);
        assert_eq!(json["cache-toggle"], false);
        assert_eq!(json.as_object().map(serde_json::Map::len), Some(10));
    }

    #[test]
    fn gated_paths_map_to_capabilities() {
        assert_eq!(
            Capability::for_path("control/querylog/config/update"),
            Some(Capability::QuerylogConfig)
        );
        assert_eq!(
            Capability::for_path("control/blocked_services/get"),
            Some(Capability::ScheduleOnBlockedServices)
        );
        assert_eq!(Capability::for_path("control/status"), None);
    }
}
