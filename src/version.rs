// SPDX-License-Identifier: MPL-2.0

//! Versions and the constraints that select among them.
//!
//! [`Version`] models a release identifier with an optional pre-release,
//! post-release, and dev-release segment, ordered the way PEP 440 orders
//! them. [`Constraint`] wraps a [`pubgrub::Ranges`] of versions together
//! with whether it is willing to match pre-releases, since range algebra
//! alone cannot express that distinction.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use pubgrub::Ranges;
use thiserror::Error;

/// The range type handed to the resolution engine for a single package name.
pub type VersionSet = Ranges<Version>;

/// A release segment ordering: numeric release, then pre/post/dev markers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version {
    release: Vec<u64>,
    pre: Option<(PreReleaseTag, u64)>,
    post: Option<u64>,
    dev: Option<u64>,
    local: Option<String>,
}

/// Pre-release marker, ordered alpha < beta < rc per PEP 440.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PreReleaseTag {
    Alpha,
    Beta,
    Rc,
}

impl fmt::Display for PreReleaseTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PreReleaseTag::Alpha => "a",
            PreReleaseTag::Beta => "b",
            PreReleaseTag::Rc => "rc",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum VersionParseError {
    #[error("version string is empty")]
    Empty,
    #[error("invalid version segment in {0:?}")]
    InvalidSegment(String),
}

impl Version {
    pub fn new(release: impl Into<Vec<u64>>) -> Self {
        Version {
            release: release.into(),
            pre: None,
            post: None,
            dev: None,
            local: None,
        }
    }

    pub fn with_pre(mut self, tag: PreReleaseTag, n: u64) -> Self {
        self.pre = Some((tag, n));
        self
    }

    pub fn with_post(mut self, n: u64) -> Self {
        self.post = Some(n);
        self
    }

    pub fn with_dev(mut self, n: u64) -> Self {
        self.dev = Some(n);
        self
    }

    /// True for pre-releases and dev-releases; post-releases are stable.
    pub fn is_unstable(&self) -> bool {
        self.pre.is_some() || self.dev.is_some()
    }

    /// The release this version would compare as once pre/dev markers are stripped.
    pub fn stable(&self) -> Version {
        Version {
            release: self.release.clone(),
            pre: None,
            post: self.post,
            dev: None,
            local: self.local.clone(),
        }
    }

    pub fn release(&self) -> &[u64] {
        &self.release
    }
}

impl FromStr for Version {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(VersionParseError::Empty);
        }
        let (core, rest) = split_local(s);
        let (core, dev) = split_dev(core)?;
        let (core, post) = split_post(core)?;
        let (core, pre) = split_pre(core)?;
        let release = core
            .split('.')
            .map(|seg| {
                seg.parse::<u64>()
                    .map_err(|_| VersionParseError::InvalidSegment(s.to_string()))
            })
            .collect::<Result<Vec<u64>, _>>()?;
        if release.is_empty() {
            return Err(VersionParseError::InvalidSegment(s.to_string()));
        }
        Ok(Version {
            release,
            pre,
            post,
            dev,
            local: rest,
        })
    }
}

fn split_local(s: &str) -> (&str, Option<String>) {
    match s.split_once('+') {
        Some((core, local)) => (core, Some(local.to_string())),
        None => (s, None),
    }
}

fn split_dev(s: &str) -> Result<(&str, Option<u64>), VersionParseError> {
    match s.split_once(".dev") {
        Some((core, n)) => {
            let n = n
                .parse()
                .map_err(|_| VersionParseError::InvalidSegment(s.to_string()))?;
            Ok((core, Some(n)))
        }
        None => Ok((s, None)),
    }
}

fn split_post(s: &str) -> Result<(&str, Option<u64>), VersionParseError> {
    match s.split_once(".post") {
        Some((core, n)) => {
            let n = n
                .parse()
                .map_err(|_| VersionParseError::InvalidSegment(s.to_string()))?;
            Ok((core, Some(n)))
        }
        None => Ok((s, None)),
    }
}

fn split_pre(s: &str) -> Result<(&str, Option<(PreReleaseTag, u64)>), VersionParseError> {
    for (marker, tag) in [
        ("rc", PreReleaseTag::Rc),
        ("b", PreReleaseTag::Beta),
        ("a", PreReleaseTag::Alpha),
    ] {
        if let Some(idx) = s.rfind(marker) {
            let (core, n) = s.split_at(idx);
            let n = &n[marker.len()..];
            if let Ok(n) = n.parse() {
                return Ok((core, Some((tag, n))));
            }
        }
    }
    Ok((s, None))
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let release = self
            .release
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(".");
        write!(f, "{release}")?;
        if let Some((tag, n)) = &self.pre {
            write!(f, "{tag}{n}")?;
        }
        if let Some(n) = self.post {
            write!(f, ".post{n}")?;
        }
        if let Some(n) = self.dev {
            write!(f, ".dev{n}")?;
        }
        if let Some(local) = &self.local {
            write!(f, "+{local}")?;
        }
        Ok(())
    }
}

/// A package constraint: a version range plus whether pre-releases satisfy it.
///
/// `pubgrub::Ranges<Version>` alone cannot express "pre-releases excluded
/// unless explicitly requested", so that bit travels alongside the range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    ranges: VersionSet,
    allow_prereleases: bool,
}

impl Constraint {
    pub fn any() -> Self {
        Constraint {
            ranges: VersionSet::full(),
            allow_prereleases: false,
        }
    }

    pub fn exact(version: Version) -> Self {
        let allow_prereleases = version.is_unstable();
        Constraint {
            ranges: VersionSet::singleton(version),
            allow_prereleases,
        }
    }

    pub fn from_ranges(ranges: VersionSet, allow_prereleases: bool) -> Self {
        Constraint {
            ranges,
            allow_prereleases,
        }
    }

    pub fn ranges(&self) -> &VersionSet {
        &self.ranges
    }

    pub fn into_ranges(self) -> VersionSet {
        self.ranges
    }

    pub fn allows_prereleases(&self) -> bool {
        self.allow_prereleases
    }

    /// Whether `version` satisfies this constraint, honoring the
    /// stable-projection rule for pre-releases (spec DATA MODEL invariant).
    pub fn allows(&self, version: &Version) -> bool {
        if self.ranges.contains(version) {
            return true;
        }
        self.allow_prereleases && version.is_unstable() && self.ranges.contains(&version.stable())
    }

    pub fn intersection(&self, other: &Constraint) -> Constraint {
        Constraint {
            ranges: self.ranges.intersection(&other.ranges),
            allow_prereleases: self.allow_prereleases || other.allow_prereleases,
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.ranges, f)
    }
}

/// PEP 440-style ordering: dev-releases sort before their pre-release,
/// pre-releases sort before the plain release, post-releases sort after.
impl Version {
    fn pre_sort_key(&self) -> (u8, u64) {
        match &self.pre {
            Some((PreReleaseTag::Alpha, n)) => (0, *n),
            Some((PreReleaseTag::Beta, n)) => (1, *n),
            Some((PreReleaseTag::Rc, n)) => (2, *n),
            None => (3, 0),
        }
    }

}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.release
            .cmp(&other.release)
            .then_with(|| self.pre_sort_key().cmp(&other.pre_sort_key()))
            .then_with(|| dev_key(self.dev).cmp(&dev_key(other.dev)))
            .then_with(|| self.post.cmp(&other.post))
            .then_with(|| self.local.cmp(&other.local))
    }
}

/// `None` (no dev marker) sorts after any dev number: `1.0.dev1 < 1.0`.
fn dev_key(dev: Option<u64>) -> (u8, u64) {
    match dev {
        Some(n) => (0, n),
        None => (1, 0),
    }
}
