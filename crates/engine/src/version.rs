use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// A `MAJOR.MINOR.PATCH` token-set version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionError {
    #[error("invalid version '{0}': expected MAJOR.MINOR.PATCH")]
    Invalid(String),

    #[error("version {version} cannot take a {component} bump: component overflows")]
    Overflow {
        version: Version,
        component: &'static str,
    },
}

impl Version {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Version {
            major,
            minor,
            patch,
        }
    }

    pub fn bump_major(self) -> Result<Self, VersionError> {
        Ok(Version::new(self.increment(self.major, "major")?, 0, 0))
    }

    pub fn bump_minor(self) -> Result<Self, VersionError> {
        Ok(Version::new(self.major, self.increment(self.minor, "minor")?, 0))
    }

    pub fn bump_patch(self) -> Result<Self, VersionError> {
        Ok(Version::new(
            self.major,
            self.minor,
            self.increment(self.patch, "patch")?,
        ))
    }

    fn increment(self, value: u64, component: &'static str) -> Result<u64, VersionError> {
        value.checked_add(1).ok_or(VersionError::Overflow {
            version: self,
            component,
        })
    }

    /// Parse an optional version string; absent means `0.0.0`.
    pub fn parse_or_default(raw: Option<&str>) -> Result<Self, VersionError> {
        match raw {
            Some(s) => s.parse(),
            None => Ok(Version::default()),
        }
    }
}

impl FromStr for Version {
    type Err = VersionError;

    /// Accepts an optional leading `v`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let body = trimmed.strip_prefix('v').unwrap_or(trimmed);
        let parts: Vec<&str> = body.split('.').collect();
        if parts.len() != 3 {
            return Err(VersionError::Invalid(s.to_string()));
        }
        let num = |p: &str| p.parse::<u64>().map_err(|_| VersionError::Invalid(s.to_string()));
        Ok(Version::new(num(parts[0])?, num(parts[1])?, num(parts[2])?))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl Serialize for Version {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
