//! Project dialects and per-dialect record versions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// A project-file dialect.
///
/// Both dialects share the object store format; they differ in the
/// 10-byte project header, the version label written into project info,
/// and which record fields are present on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Scratch 1.4.
    Scratch14,
    /// BYOB 3.1.1.
    Byob311,
}

impl Dialect {
    pub const ALL: [Dialect; 2] = [Dialect::Scratch14, Dialect::Byob311];

    /// Project header bytes for this dialect.
    pub fn header(self) -> &'static [u8; 10] {
        match self {
            Self::Scratch14 => b"ScratchV02",
            Self::Byob311 => b"BloxExpV01",
        }
    }

    /// Version label stored under `scratch-version` in project info.
    pub fn version_label(self) -> &'static str {
        match self {
            Self::Scratch14 => "1.4 of 30-Jun-09",
            Self::Byob311 => "3.1.1 (19-May-11)",
        }
    }

    /// Identify a dialect from a project header.
    pub fn from_header(header: &[u8]) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.header().as_slice() == header)
    }

    /// Short identifier used on the command line and in config files.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scratch14 => "scratch14",
            Self::Byob311 => "byob311",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "scratch14" | "scratch" | "1.4" => Ok(Self::Scratch14),
            "byob311" | "byob" | "3.1.1" => Ok(Self::Byob311),
            other => Err(TypeError::UnknownDialect(other.to_string())),
        }
    }
}

/// Schema version of a user record, one byte per dialect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassVersion {
    pub scratch14: u8,
    pub byob311: u8,
}

impl ClassVersion {
    pub const fn new(scratch14: u8, byob311: u8) -> Self {
        Self { scratch14, byob311 }
    }

    /// Same version in both dialects.
    pub const fn uniform(version: u8) -> Self {
        Self::new(version, version)
    }

    pub fn get(self, dialect: Dialect) -> u8 {
        match dialect {
            Dialect::Scratch14 => self.scratch14,
            Dialect::Byob311 => self.byob311,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_are_ten_bytes_and_distinct() {
        assert_eq!(Dialect::Scratch14.header(), b"ScratchV02");
        assert_eq!(Dialect::Byob311.header(), b"BloxExpV01");
        assert_ne!(Dialect::Scratch14.header(), Dialect::Byob311.header());
    }

    #[test]
    fn from_header_round_trips() {
        for dialect in Dialect::ALL {
            assert_eq!(Dialect::from_header(dialect.header()), Some(dialect));
        }
        assert_eq!(Dialect::from_header(b"ObjS\x01Stch\x01"), None);
        assert_eq!(Dialect::from_header(b"Scratch"), None);
    }

    #[test]
    fn parse_from_str() {
        assert_eq!("scratch14".parse::<Dialect>().unwrap(), Dialect::Scratch14);
        assert_eq!("BYOB".parse::<Dialect>().unwrap(), Dialect::Byob311);
        assert!(matches!(
            "snap".parse::<Dialect>(),
            Err(TypeError::UnknownDialect(_))
        ));
    }

    #[test]
    fn version_labels() {
        assert_eq!(Dialect::Scratch14.version_label(), "1.4 of 30-Jun-09");
        assert_eq!(Dialect::Byob311.version_label(), "3.1.1 (19-May-11)");
    }

    #[test]
    fn class_version_selects_by_dialect() {
        let v = ClassVersion::new(3, 5);
        assert_eq!(v.get(Dialect::Scratch14), 3);
        assert_eq!(v.get(Dialect::Byob311), 5);
        assert_eq!(ClassVersion::uniform(4).get(Dialect::Byob311), 4);
    }

    #[test]
    fn display_matches_as_str() {
        assert_eq!(Dialect::Byob311.to_string(), "byob311");
        assert_eq!(Dialect::Scratch14.to_string(), "scratch14");
    }
}
