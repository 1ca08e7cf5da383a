use regex::Regex;
use std::sync::OnceLock;

fn release_branch_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"v\d+(\.\d+)?").expect("valid release branch regex"))
}

/// Represents a git branch with context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchContext {
    pub name: String,
    pub is_release_lineage: bool,
}

impl BranchContext {
    /// Create a new branch context
    pub fn new(name: impl Into<String>) -> Self {
        let name_str = name.into();
        let is_release_lineage = release_branch_pattern().is_match(&name_str);

        BranchContext {
            name: name_str,
            is_release_lineage,
        }
    }

    /// Check if this is a maintenance branch such as `v4` or `v4.2`,
    /// released in place instead of through the development branch.
    pub fn is_release_branch(&self) -> bool {
        self.is_release_lineage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_major_release_branch() {
        let branch = BranchContext::new("v4");
        assert!(branch.is_release_branch());
    }

    #[test]
    fn test_minor_release_branch() {
        assert!(BranchContext::new("v4.2").is_release_branch());
    }

    #[test]
    fn test_development_branch() {
        let branch = BranchContext::new("devel");
        assert!(!branch.is_release_branch());
        assert!(!BranchContext::new("master").is_release_branch());
    }

    #[test]
    fn test_pattern_is_unanchored() {
        assert!(BranchContext::new("release/v2").is_release_branch());
    }
}
