//! Category policy: which employees get the Director report block.
//!
//! The Director list is hand-maintained deployment data (full legal names,
//! exact match), injected into layout discovery rather than baked into the
//! algorithm.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmployeeCategory {
    Standard,
    Director,
}

impl EmployeeCategory {
    /// Rows between an employee's first header occurrence and its second.
    /// The Director block carries the extra night-work row.
    pub fn second_header_offset(&self) -> usize {
        match self {
            EmployeeCategory::Standard => 7,
            EmployeeCategory::Director => 8,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CategoryPolicy {
    directors: BTreeSet<String>,
}

/// On-disk shape: a `[policy]` table with a mandatory `directors` array.
/// A file missing either is a parse error, never an empty policy.
#[derive(Debug, Deserialize)]
struct PolicyFile {
    policy: PolicyTable,
}

#[derive(Debug, Deserialize)]
struct PolicyTable {
    directors: Vec<String>,
}

impl CategoryPolicy {
    pub fn new<I, S>(directors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            directors: directors.into_iter().map(Into::into).collect(),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let parsed: PolicyFile = toml::from_str(content)?;
        Ok(Self::new(parsed.policy.directors))
    }

    pub fn category_of(&self, employee_name: &str) -> EmployeeCategory {
        if self.directors.contains(employee_name) {
            EmployeeCategory::Director
        } else {
            EmployeeCategory::Standard
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn director_lookup_is_exact_match() {
        let policy = CategoryPolicy::new(["Grace Han"]);
        assert_eq!(policy.category_of("Grace Han"), EmployeeCategory::Director);
        assert_eq!(policy.category_of("grace han"), EmployeeCategory::Standard);
        assert_eq!(policy.category_of("Alice Park"), EmployeeCategory::Standard);
    }

    #[test]
    fn policy_file_parses_director_list() {
        let policy =
            CategoryPolicy::from_toml("[policy]\ndirectors = [\"Grace Han\", \"Min Seo\"]")
                .unwrap();
        assert_eq!(policy.category_of("Grace Han"), EmployeeCategory::Director);
        assert_eq!(policy.category_of("Min Seo"), EmployeeCategory::Director);
    }

    #[test]
    fn policy_file_without_director_key_is_rejected() {
        // An empty or key-less file must not degrade to an empty policy.
        assert!(CategoryPolicy::from_toml("").is_err());
        assert!(CategoryPolicy::from_toml("[policy]\n").is_err());
        // The top-level key without the table is an error, not an empty list.
        assert!(CategoryPolicy::from_toml("directors = [\"Grace Han\"]").is_err());
    }

    #[test]
    fn offsets_differ_by_category() {
        assert_eq!(EmployeeCategory::Standard.second_header_offset(), 7);
        assert_eq!(EmployeeCategory::Director.second_header_offset(), 8);
    }
}
