//! Engine version reporting and the per-session settings derived from it.

use std::fmt;

/// The engine version a title declares in its first context file.
///
/// Versions are compared lexicographically (major, then minor, then
/// revision); the numbers come straight from the version string the
/// title's `0x0190` parameter section carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct EngineVersion {
    pub major: u32,
    pub minor: u32,
    pub revision: u32,
}

impl EngineVersion {
    pub fn new(major: u32, minor: u32, revision: u32) -> Self {
        Self {
            major,
            minor,
            revision,
        }
    }
}

impl fmt::Display for EngineVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}r{}", self.major, self.minor, self.revision)
    }
}

/// Decoding settings shared by every file in one title.
///
/// The version is discovered while reading the first context file's
/// parameter sections and consulted by later parse paths, so it starts
/// unset and is filled in exactly once.
#[derive(Debug, Default, Clone)]
pub struct SessionContext {
    version: Option<EngineVersion>,
    profile_strings: bool,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn version(&self) -> Option<EngineVersion> {
        self.version
    }

    pub fn set_version(&mut self, version: EngineVersion) {
        if self.version.is_none() {
            self.version = Some(version);
        }
    }

    /// Whether the title declares profile strings alongside its version.
    pub fn has_profile_strings(&self) -> bool {
        self.profile_strings
    }

    pub fn set_profile_strings(&mut self, value: bool) {
        self.profile_strings = value;
    }

    /// First-generation titles (T2.0 era) never declare an engine version
    /// at all; they lay out their context headers and asset metadata
    /// differently from everything that came later. Versioned 3.x titles
    /// exist and use the later layouts.
    pub fn is_first_generation(&self) -> bool {
        self.version.is_none()
    }

    /// Older titles store movie frame footers without the later fields;
    /// first-generation titles and everything through engine 3.2 use the
    /// short layout.
    pub fn has_short_movie_footers(&self) -> bool {
        match self.version {
            Some(v) => v.major <= 3 && v.minor <= 2,
            None => true,
        }
    }
}
