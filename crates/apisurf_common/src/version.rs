//! SDK semantic version and pending version actions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The single version of the whole exported API surface.
///
/// Embedded into the firmware image and into every plugin built against the
/// SDK; the loader rejects plugins whose major version differs. `0.0` is the
/// uninitialized sentinel and is never buildable.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SdkVersion {
    /// Incremented when a live symbol disappears.
    pub major: u32,
    /// Incremented when symbols are added.
    pub minor: u32,
}

impl SdkVersion {
    /// The uninitialized sentinel version.
    pub const ZERO: SdkVersion = SdkVersion { major: 0, minor: 0 };

    /// Creates a version from its components.
    pub fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Returns `true` if this is the uninitialized `0.0` sentinel.
    pub fn is_sentinel(self) -> bool {
        self == Self::ZERO
    }

    /// Applies a version action, returning the bumped version.
    pub fn bumped(self, bump: VersionBump) -> Self {
        match bump {
            VersionBump::None => self,
            VersionBump::Minor => Self::new(self.major, self.minor + 1),
            VersionBump::Major => Self::new(self.major + 1, 0),
        }
    }
}

impl fmt::Display for SdkVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl fmt::Debug for SdkVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SdkVersion({self})")
    }
}

/// Error type for parsing `major.minor` version strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseVersionError {
    /// The input string that failed to parse.
    pub input: String,
}

impl fmt::Display for ParseVersionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid SDK version: '{}'", self.input)
    }
}

impl std::error::Error for ParseVersionError {}

impl FromStr for SdkVersion {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let err = || ParseVersionError {
            input: s.to_string(),
        };
        let (major, minor) = s.split_once('.').ok_or_else(err)?;
        let major = major.parse().map_err(|_| err())?;
        let minor = minor.parse().map_err(|_| err())?;
        Ok(SdkVersion { major, minor })
    }
}

/// The version action required by a diff, ordered by severity.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub enum VersionBump {
    /// The surface is unchanged.
    #[default]
    None,
    /// Entries were added.
    Minor,
    /// A live entry was removed.
    Major,
}

impl VersionBump {
    /// Raises this action to at least `other`. A major bump is never lowered.
    pub fn raise(&mut self, other: VersionBump) {
        if other > *self {
            *self = other;
        }
    }

    /// Returns `true` if a bump is pending.
    pub fn is_pending(self) -> bool {
        self != VersionBump::None
    }
}

impl fmt::Display for VersionBump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionBump::None => write!(f, "none"),
            VersionBump::Minor => write!(f, "minor"),
            VersionBump::Major => write!(f, "major"),
        }
    }
}
