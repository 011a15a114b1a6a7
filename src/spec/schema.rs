use serde::Deserialize;
use std::fmt;

/// The transformation rule set for one patch run.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct PatchSpec {
    #[serde(default)]
    pub meta: Meta,
    /// Substring signature the locator scans for (diagnostic only)
    pub fragment: String,
    /// The structural method-body rewrite
    pub primary: StructuralRule,
    /// Secondary best-effort rewrites, e.g. the call-site update
    #[serde(default)]
    pub auxiliary: Vec<TextRule>,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Meta {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Structural detect/replace rule: the region runs from `anchor` through the
/// brace balancing the first `{` at or after it, and must contain `marker`.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct StructuralRule {
    /// Declaration text the region starts at
    pub anchor: String,
    /// Sub-expression that must occur inside the region
    pub marker: String,
    /// Fixed corrected text the region is replaced with
    pub replacement: String,
}

/// Plain find/replace rule, applied best-effort after the primary rewrite.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct TextRule {
    pub find: String,
    pub replace: String,
}

impl PatchSpec {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.fragment.trim().is_empty() {
            issues.push(ValidationIssue::MissingField { field: "fragment" });
        }
        if self.primary.anchor.trim().is_empty() {
            issues.push(ValidationIssue::MissingField {
                field: "primary.anchor",
            });
        }
        if self.primary.marker.trim().is_empty() {
            issues.push(ValidationIssue::MissingField {
                field: "primary.marker",
            });
        }
        if self.primary.replacement.trim().is_empty() {
            issues.push(ValidationIssue::MissingField {
                field: "primary.replacement",
            });
        }
        if self.primary.marker == self.primary.replacement {
            issues.push(ValidationIssue::Invalid {
                message: "primary.replacement must differ from primary.marker".to_string(),
            });
        }
        if self
            .primary
            .replacement
            .contains(self.primary.anchor.as_str())
        {
            issues.push(ValidationIssue::Invalid {
                message: "primary.replacement contains the anchor; re-running would never reach \
                          a no-op"
                    .to_string(),
            });
        }

        for (idx, rule) in self.auxiliary.iter().enumerate() {
            if rule.find.trim().is_empty() {
                issues.push(ValidationIssue::Invalid {
                    message: format!("auxiliary rule {idx} has an empty 'find'"),
                });
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone)]
pub enum ValidationIssue {
    MissingField { field: &'static str },
    Invalid { message: String },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::MissingField { field } => {
                write!(f, "spec missing required field '{field}'")
            }
            ValidationIssue::Invalid { message } => {
                write!(f, "invalid spec: {message}")
            }
        }
    }
}
