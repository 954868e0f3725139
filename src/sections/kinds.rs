use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Closed set of section categories a resume is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionType {
    Personal,
    Experience,
    Education,
    Skills,
    Other,
}

/// Every resume carries exactly one section of each of these, in this order.
pub const FIXED_SECTIONS: [SectionType; 5] = [
    SectionType::Personal,
    SectionType::Experience,
    SectionType::Education,
    SectionType::Skills,
    SectionType::Other,
];

/// Highest accepted `order`; leaves room for reconciliation to append above it.
pub const MAX_SECTION_ORDER: i32 = i32::MAX - FIXED_SECTIONS.len() as i32;

impl SectionType {
    pub fn as_str(self) -> &'static str {
        match self {
            SectionType::Personal => "personal",
            SectionType::Experience => "experience",
            SectionType::Education => "education",
            SectionType::Skills => "skills",
            SectionType::Other => "other",
        }
    }

    /// Human readable heading used in previews and exports.
    pub fn label(self) -> &'static str {
        match self {
            SectionType::Personal => "Personal Information",
            SectionType::Experience => "Work Experience",
            SectionType::Education => "Education",
            SectionType::Skills => "Skills",
            SectionType::Other => "Other",
        }
    }

    /// Position of the type inside [`FIXED_SECTIONS`].
    pub fn canonical_index(self) -> usize {
        match self {
            SectionType::Personal => 0,
            SectionType::Experience => 1,
            SectionType::Education => 2,
            SectionType::Skills => 3,
            SectionType::Other => 4,
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        FIXED_SECTIONS
            .iter()
            .copied()
            .find(|kind| kind.as_str() == raw)
    }
}

impl fmt::Display for SectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown section type '{0}'")]
pub struct UnknownSectionType(pub String);

impl FromStr for SectionType {
    type Err = UnknownSectionType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SectionType::parse(s).ok_or_else(|| UnknownSectionType(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_index_matches_fixed_order() {
        for (i, kind) in FIXED_SECTIONS.iter().enumerate() {
            assert_eq!(kind.canonical_index(), i);
        }
    }

    #[test]
    fn parse_accepts_only_fixed_names() {
        assert_eq!("skills".parse::<SectionType>(), Ok(SectionType::Skills));
        assert_eq!(SectionType::parse("personal"), Some(SectionType::Personal));
        assert_eq!(SectionType::parse("Personal"), None);
        assert_eq!(
            "hobbies".parse::<SectionType>(),
            Err(UnknownSectionType("hobbies".into()))
        );
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let json = serde_json::to_string(&SectionType::Experience).unwrap();
        assert_eq!(json, "\"experience\"");
        let back: SectionType = serde_json::from_str("\"education\"").unwrap();
        assert_eq!(back, SectionType::Education);
    }

    #[test]
    fn labels_are_human_readable() {
        assert_eq!(SectionType::Personal.label(), "Personal Information");
        assert_eq!(SectionType::Experience.label(), "Work Experience");
        assert_eq!(SectionType::Other.to_string(), "other");
    }
}
