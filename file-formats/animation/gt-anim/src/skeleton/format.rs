//! Skeleton asset format variants

use std::fmt;
use std::str::FromStr;

/// Magic number of the hierarchical skeleton format (format A)
pub const HIERARCHICAL_MAGIC: u32 = 383_405_658;

/// Version of the hierarchical skeleton format (stored as `u8`)
pub const HIERARCHICAL_VERSION: u8 = 1;

/// Magic number shared by the TRS and flat skeleton formats and the clip format
pub const GT_MAGIC: u32 = 0xdead_beef;

/// Version shared by the TRS and flat skeleton formats and the clip format
pub const GT_VERSION: u32 = 1;

/// The supported skeleton encodings
///
/// The TRS and flat formats share magic and version, so the caller names
/// the format instead of it being sniffed from the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum SkeletonFormat {
    /// Format A: bind translation only, parents given as child lists
    Hierarchical,
    /// Format B: translation + scale + rotation, parents given as child lists
    Trs,
    /// Format C: object-space bind matrix and a direct parent index
    Flat,
}

/// Which space the stored bind pose is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindSpace {
    /// Relative to the parent joint
    Local,
    /// Object (model) space
    Global,
}

impl SkeletonFormat {
    /// All formats, in declaration order
    pub const ALL: [Self; 3] = [Self::Hierarchical, Self::Trs, Self::Flat];

    /// Magic number expected at offset 0
    pub fn magic(self) -> u32 {
        match self {
            Self::Hierarchical => HIERARCHICAL_MAGIC,
            Self::Trs | Self::Flat => GT_MAGIC,
        }
    }

    /// Expected version number
    pub fn version(self) -> u32 {
        match self {
            Self::Hierarchical => HIERARCHICAL_VERSION as u32,
            Self::Trs | Self::Flat => GT_VERSION,
        }
    }

    /// Whether parent links are stored as child lists that must be inverted
    pub fn has_child_lists(self) -> bool {
        matches!(self, Self::Hierarchical | Self::Trs)
    }

    /// Space of the stored bind pose
    pub fn bind_space(self) -> BindSpace {
        match self {
            Self::Hierarchical | Self::Trs => BindSpace::Local,
            Self::Flat => BindSpace::Global,
        }
    }

    /// Short identifier used on the command line
    pub fn short_name(self) -> &'static str {
        match self {
            Self::Hierarchical => "hierarchical",
            Self::Trs => "trs",
            Self::Flat => "flat",
        }
    }
}

impl fmt::Display for SkeletonFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hierarchical => write!(f, "Hierarchical (A)"),
            Self::Trs => write!(f, "TRS (B)"),
            Self::Flat => write!(f, "Flat (C)"),
        }
    }
}

impl FromStr for SkeletonFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "a" | "hierarchical" => Ok(Self::Hierarchical),
            "b" | "trs" => Ok(Self::Trs),
            "c" | "flat" => Ok(Self::Flat),
            _ => Err(format!(
                "Unknown skeleton format: {s} (expected hierarchical, trs or flat)"
            )),
        }
    }
}
