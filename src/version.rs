//! Tool versions and the constraint language used in `.stylist.yaml`.
//!
//! Tools report versions such as `13.0.1`, `0.6.13` or `22.3b`, and users
//! write requirements in the PEP 440 flavour common to Python tooling:
//!
//! ```text
//! version: ">=13, <16"      # range
//! version: "~=0.6.13"       # compatible release: >=0.6.13, ==0.6.*
//! version: "==14.*"         # prefix
//! version: "14.0.6"         # bare version means ==
//! ```
//!
//! Versions are zero-padded to three components and stored as
//! [`semver::Version`] so ordering is well defined; a trailing `a`/`b`/`rc`
//! tag becomes a pre-release that sorts before the release. As in PEP 440,
//! `<8` still rejects `8.0b1`.

use semver::{Prerelease, Version};
use std::cmp::Ordering;
use std::fmt;

/// A version reported by a tool, keeping the text it was parsed from.
#[derive(Debug, Clone)]
pub struct ToolVersion {
    raw: String,
    version: Version,
}

impl ToolVersion {
    pub fn parse(text: &str) -> Option<Self> {
        let raw = text.trim();
        let (release, tag) = split_release(raw)?;
        let mut parts = release.split('.').map(|p| p.parse::<u64>());
        let major = parts.next()?.ok()?;
        let minor = parts.next().transpose().ok()?.unwrap_or(0);
        let patch = parts.next().transpose().ok()?.unwrap_or(0);
        // Fourth and later release components do not take part in ordering.
        if parts.any(|p| p.is_err()) {
            return None;
        }
        let mut version = Version::new(major, minor, patch);
        if !tag.is_empty() {
            version.pre = Prerelease::new(tag).ok()?;
        }
        Some(Self {
            raw: raw.to_string(),
            version,
        })
    }

    pub fn as_semver(&self) -> &Version {
        &self.version
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl PartialEq for ToolVersion {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version
    }
}

impl Eq for ToolVersion {}

impl PartialOrd for ToolVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ToolVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.version.cmp(&other.version)
    }
}

impl fmt::Display for ToolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Split `"22.3b1"` into `("22.3", "b1")`.
fn split_release(text: &str) -> Option<(&str, &str)> {
    let end = text
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(text.len());
    let (release, tag) = text.split_at(end);
    if release.is_empty() || release.starts_with('.') || release.ends_with('.') {
        return None;
    }
    let tag_ok = tag.is_empty()
        || ["a", "b", "rc"].iter().any(|prefix| {
            tag.strip_prefix(prefix)
                .is_some_and(|n| n.chars().all(|c| c.is_ascii_digit()))
        });
    tag_ok.then_some((release, tag))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Exact,
    NotEqual,
    Greater,
    GreaterEq,
    Less,
    LessEq,
    Compatible,
}

#[derive(Debug, Clone)]
struct Clause {
    op: Op,
    version: Version,
    /// Number of release components written by the user
    precision: usize,
    wildcard: bool,
}

impl Clause {
    fn parse(text: &str) -> Result<Self, ConstraintError> {
        let text = text.trim();
        const OPS: [(&str, Op); 7] = [
            ("~=", Op::Compatible),
            ("==", Op::Exact),
            ("!=", Op::NotEqual),
            (">=", Op::GreaterEq),
            ("<=", Op::LessEq),
            (">", Op::Greater),
            ("<", Op::Less),
        ];
        let (op, rest) = OPS
            .iter()
            .find_map(|(prefix, op)| text.strip_prefix(prefix).map(|rest| (*op, rest)))
            .unwrap_or((Op::Exact, text));
        let rest = rest.trim();

        let (rest, wildcard) = match rest.strip_suffix(".*") {
            Some(prefix) => (prefix, true),
            None => (rest, false),
        };
        if wildcard && !matches!(op, Op::Exact | Op::NotEqual) {
            return Err(ConstraintError(format!(
                "wildcard only allowed with '==' or '!=': '{text}'"
            )));
        }

        let parsed = ToolVersion::parse(rest)
            .ok_or_else(|| ConstraintError(format!("invalid version in '{text}'")))?;
        let precision = rest
            .split(|c: char| !(c.is_ascii_digit() || c == '.'))
            .next()
            .map(|release| release.split('.').count())
            .unwrap_or(1);
        if op == Op::Compatible && precision < 2 {
            return Err(ConstraintError(format!(
                "'~=' needs at least two release components: '{text}'"
            )));
        }

        Ok(Self {
            op,
            version: parsed.version,
            precision: precision.min(3),
            wildcard,
        })
    }

    fn matches(&self, v: &Version) -> bool {
        match self.op {
            Op::Exact if self.wildcard => same_prefix(v, &self.version, self.precision),
            Op::Exact => v == &self.version,
            Op::NotEqual if self.wildcard => !same_prefix(v, &self.version, self.precision),
            Op::NotEqual => v != &self.version,
            Op::Greater => v > &self.version,
            Op::GreaterEq => v >= &self.version,
            // `<8` must not admit 8.0b1 just because it sorts below 8.0.0
            Op::Less => {
                v < &self.version
                    && !(self.version.pre.is_empty()
                        && !v.pre.is_empty()
                        && same_prefix(v, &self.version, 3))
            }
            Op::LessEq => v <= &self.version,
            Op::Compatible => {
                v >= &self.version && same_prefix(v, &self.version, self.precision - 1)
            }
        }
    }
}

fn same_prefix(a: &Version, b: &Version, len: usize) -> bool {
    let a = [a.major, a.minor, a.patch];
    let b = [b.major, b.minor, b.patch];
    a[..len] == b[..len]
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct ConstraintError(String);

/// Conjunction of comparison clauses, e.g. `>=7,<8`.
#[derive(Debug, Clone)]
pub struct VersionConstraint {
    raw: String,
    clauses: Vec<Clause>,
}

impl VersionConstraint {
    pub fn any() -> Self {
        Self {
            raw: String::new(),
            clauses: Vec::new(),
        }
    }

    pub fn parse(text: &str) -> Result<Self, ConstraintError> {
        let raw = text.trim();
        if raw.is_empty() || raw == "*" {
            return Ok(Self {
                raw: raw.to_string(),
                clauses: Vec::new(),
            });
        }
        let clauses = raw
            .split(',')
            .map(|clause| {
                if clause.trim().is_empty() {
                    Err(ConstraintError(format!("empty clause in '{raw}'")))
                } else {
                    Clause::parse(clause)
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            raw: raw.to_string(),
            clauses,
        })
    }

    pub fn matches(&self, version: &ToolVersion) -> bool {
        self.clauses.iter().all(|c| c.matches(version.as_semver()))
    }

    pub fn is_any(&self) -> bool {
        self.clauses.is_empty()
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_any() {
            f.write_str("*")
        } else {
            f.write_str(&self.raw)
        }
    }
}

impl Default for VersionConstraint {
    fn default() -> Self {
        Self::any()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> ToolVersion {
        ToolVersion::parse(s).unwrap()
    }

    fn c(s: &str) -> VersionConstraint {
        VersionConstraint::parse(s).unwrap()
    }

    #[test]
    fn test_parse_versions() {
        assert_eq!(v("13").as_semver(), &Version::new(13, 0, 0));
        assert_eq!(v("13.0").as_semver(), &Version::new(13, 0, 0));
        assert_eq!(v("0.6.13").as_semver(), &Version::new(0, 6, 13));
        assert_eq!(v("22.3b").as_semver().pre.as_str(), "b");
        assert_eq!(v("8.0.1").to_string(), "8.0.1");
        assert!(ToolVersion::parse("").is_none());
        assert!(ToolVersion::parse("abc").is_none());
        assert!(ToolVersion::parse("1..2").is_none());
        assert!(ToolVersion::parse("1.2-dev").is_none());
    }

    #[test]
    fn test_prerelease_sorts_before_release() {
        assert!(v("22.3a") < v("22.3b"));
        assert!(v("22.3b") < v("22.3"));
        assert!(v("13.0.1") < v("14"));
    }

    #[test]
    fn test_range_constraint() {
        let range = c(">=7,<8");
        assert!(range.matches(&v("7.0.1")));
        assert!(range.matches(&v("7.9")));
        assert!(!range.matches(&v("8.0.1")));
        assert!(!range.matches(&v("6.9.9")));
    }

    #[test]
    fn test_less_than_excludes_prereleases_of_bound() {
        assert!(!c("<8").matches(&v("8.0b")));
        assert!(!c(">=7,<8").matches(&v("8.0a1")));
        assert!(c("<8").matches(&v("7.9")));
        assert!(c("<8").matches(&v("7.9b")));
        assert!(c("<8.0b2").matches(&v("8.0b1")));
    }

    #[test]
    fn test_exact_and_bare_constraint() {
        assert!(c("==14.0.6").matches(&v("14.0.6")));
        assert!(!c("==14").matches(&v("14.0.6")));
        assert!(c("14").matches(&v("14.0.0")));
        assert!(c("!=14.0.6").matches(&v("14.0.5")));
    }

    #[test]
    fn test_wildcard_constraint() {
        assert!(c("==14.*").matches(&v("14.0.6")));
        assert!(!c("==14.*").matches(&v("15.0.0")));
        assert!(c("!=14.*").matches(&v("15.0.0")));
        assert!(VersionConstraint::parse(">=14.*").is_err());
    }

    #[test]
    fn test_compatible_release() {
        let two = c("~=0.6");
        assert!(two.matches(&v("0.6.13")));
        assert!(two.matches(&v("0.9")));
        assert!(!two.matches(&v("1.0")));

        let three = c("~=0.6.13");
        assert!(three.matches(&v("0.6.13")));
        assert!(three.matches(&v("0.6.20")));
        assert!(!three.matches(&v("0.7.0")));
        assert!(VersionConstraint::parse("~=1").is_err());
    }

    #[test]
    fn test_any_constraint() {
        assert!(c("").matches(&v("1.0")));
        assert!(c("*").matches(&v("99")));
        assert_eq!(c("").to_string(), "*");
    }

    #[test]
    fn test_malformed_constraints() {
        assert!(VersionConstraint::parse(">=seven").is_err());
        assert!(VersionConstraint::parse(">=7,").is_err());
        assert!(VersionConstraint::parse("=>7").is_err());
    }
}
