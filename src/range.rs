//! npm-style semver ranges.
//!
//! Package manifests declare peer dependencies with node-semver range syntax
//! (`^1.2.0`, `~1.2`, `>=1.0.0 <2.0.0`, `1.x || ^2.1.0`, `1.2 - 2.0`). The
//! `semver` crate only understands Cargo's requirement syntax, so ranges are
//! desugared here into sets of primitive comparators over [`semver::Version`].

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use semver::{BuildMetadata, Prerelease, Version};

use crate::RangeError;

/// A parsed version range: a union of comparator sets.
///
/// A version satisfies the range if it satisfies every comparator of at
/// least one set.
///
/// # Examples
///
/// ```
/// use component_registry::VersionRange;
/// use semver::Version;
///
/// let host = VersionRange::parse("^1.0.0").unwrap();
/// let component = VersionRange::parse("^1.3.0").unwrap();
///
/// assert!(host.intersects(&component));
/// assert_eq!(host.min_version(), Some(Version::new(1, 0, 0)));
/// assert!(!component.satisfies(&Version::new(1, 0, 0)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    raw: String,
    sets: Vec<ComparatorSet>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ComparatorSet {
    comparators: Vec<Comparator>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Comparator {
    op: Op,
    version: Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Gt,
    Gte,
    Lt,
    Lte,
}

/// A version with wildcard components, as written inside a range.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Partial {
    raw: String,
    major: Option<u64>,
    minor: Option<u64>,
    patch: Option<u64>,
    pre: Prerelease,
}

impl VersionRange {
    /// Parses a range string.
    ///
    /// The empty string, `*` and `x` all mean "any version".
    ///
    /// # Errors
    ///
    /// Returns `RangeError` if a comparator has no valid version, a hyphen
    /// range is incomplete, or a bound would overflow `u64`.
    pub fn parse(input: &str) -> Result<Self, RangeError> {
        let sets = input
            .split("||")
            .map(parse_set)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            raw: input.trim().to_string(),
            sets,
        })
    }

    /// Returns the range as it was written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns true if `version` is inside the range.
    ///
    /// Prerelease versions only match when some comparator of the matching
    /// set carries a prerelease on the same `major.minor.patch`.
    #[must_use]
    pub fn satisfies(&self, version: &Version) -> bool {
        self.sets.iter().any(|set| set.test(version))
    }

    /// Returns true if some version could satisfy both ranges.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.sets
            .iter()
            .any(|left| other.sets.iter().any(|right| left.overlaps(right)))
    }

    /// Returns the lowest version that satisfies the range, if any.
    #[must_use]
    pub fn min_version(&self) -> Option<Version> {
        let zero = Version::new(0, 0, 0);
        if self.satisfies(&zero) {
            return Some(zero);
        }
        let zero_pre = floor(0, 0, 0);
        if self.satisfies(&zero_pre) {
            return Some(zero_pre);
        }

        let candidate = self.sets.iter().filter_map(ComparatorSet::lowest).min()?;
        self.satisfies(&candidate).then_some(candidate)
    }
}

impl FromStr for VersionRange {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl ComparatorSet {
    fn test(&self, version: &Version) -> bool {
        if !self.comparators.iter().all(|c| c.test(version)) {
            return false;
        }
        if version.pre.is_empty() {
            return true;
        }
        self.comparators.iter().any(|c| {
            !c.version.pre.is_empty()
                && c.version.major == version.major
                && c.version.minor == version.minor
                && c.version.patch == version.patch
        })
    }

    /// Tightest lower bound as `(version, inclusive)`.
    fn lower(&self) -> (Version, bool) {
        let mut bound = (floor(0, 0, 0), true);
        for c in &self.comparators {
            let inclusive = match c.op {
                Op::Gt => false,
                Op::Gte => true,
                Op::Lt | Op::Lte => continue,
            };
            match c.version.cmp(&bound.0) {
                Ordering::Greater => bound = (c.version.clone(), inclusive),
                Ordering::Equal => bound.1 &= inclusive,
                Ordering::Less => {}
            }
        }
        bound
    }

    /// Tightest upper bound as `(version, inclusive)`, `None` if unbounded.
    fn upper(&self) -> Option<(Version, bool)> {
        let mut bound: Option<(Version, bool)> = None;
        for c in &self.comparators {
            let inclusive = match c.op {
                Op::Lt => false,
                Op::Lte => true,
                Op::Gt | Op::Gte => continue,
            };
            bound = match bound {
                None => Some((c.version.clone(), inclusive)),
                Some((current, current_inclusive)) => match c.version.cmp(&current) {
                    Ordering::Less => Some((c.version.clone(), inclusive)),
                    Ordering::Equal => Some((current, current_inclusive && inclusive)),
                    Ordering::Greater => Some((current, current_inclusive)),
                },
            };
        }
        bound
    }

    fn overlaps(&self, other: &Self) -> bool {
        let combined = Self {
            comparators: self
                .comparators
                .iter()
                .chain(&other.comparators)
                .cloned()
                .collect(),
        };
        combined.is_satisfiable()
    }

    fn is_satisfiable(&self) -> bool {
        let (lower, lower_inclusive) = self.lower();
        match self.upper() {
            None => true,
            Some((upper, upper_inclusive)) => match lower.cmp(&upper) {
                Ordering::Less => true,
                Ordering::Equal => lower_inclusive && upper_inclusive,
                Ordering::Greater => false,
            },
        }
    }

    /// Lowest version admitted by the set's lower comparators alone.
    fn lowest(&self) -> Option<Version> {
        let mut lowest = None;
        for c in &self.comparators {
            let bound = match c.op {
                Op::Gte => c.version.clone(),
                Op::Gt => successor(&c.version)?,
                Op::Lt | Op::Lte => continue,
            };
            lowest = lowest.max(Some(bound));
        }
        lowest
    }
}

impl Comparator {
    fn new(op: Op, version: Version) -> Self {
        Self { op, version }
    }

    fn test(&self, version: &Version) -> bool {
        let ord = cmp_precedence(version, &self.version);
        match self.op {
            Op::Gt => ord == Ordering::Greater,
            Op::Gte => ord != Ordering::Less,
            Op::Lt => ord == Ordering::Less,
            Op::Lte => ord != Ordering::Greater,
        }
    }
}

/// Compares versions ignoring build metadata.
fn cmp_precedence(left: &Version, right: &Version) -> Ordering {
    (left.major, left.minor, left.patch)
        .cmp(&(right.major, right.minor, right.patch))
        .then_with(|| left.pre.cmp(&right.pre))
}

/// `major.minor.patch-0`, the lowest version of that release line.
fn floor(major: u64, minor: u64, patch: u64) -> Version {
    Version {
        major,
        minor,
        patch,
        pre: Prerelease::new("0").expect("'0' is a valid prerelease identifier"),
        build: BuildMetadata::EMPTY,
    }
}

/// The smallest version strictly greater than `version`.
///
/// `None` only when the patch number is already `u64::MAX`.
fn successor(version: &Version) -> Option<Version> {
    let mut next = version.clone();
    if next.pre.is_empty() {
        next.patch = next.patch.checked_add(1)?;
    } else if let Ok(pre) = Prerelease::new(&format!("{}.0", next.pre)) {
        next.pre = pre;
    }
    Some(next)
}

fn parse_set(input: &str) -> Result<ComparatorSet, RangeError> {
    let tokens = tokenize(input)?;

    if tokens.iter().any(|t| t == "-") {
        return match tokens.as_slice() {
            [from, dash, to] if dash == "-" => Ok(ComparatorSet {
                comparators: hyphen(&parse_partial(from)?, &parse_partial(to)?)?,
            }),
            _ => Err(RangeError::IncompleteHyphenRange {
                range: input.trim().to_string(),
            }),
        };
    }

    let mut comparators = Vec::new();
    for token in &tokens {
        comparators.extend(parse_comparator(token)?);
    }
    Ok(ComparatorSet { comparators })
}

/// Splits on whitespace, gluing detached operators (`>= 1.2.3`) to their version.
fn tokenize(input: &str) -> Result<Vec<String>, RangeError> {
    let mut tokens = Vec::new();
    let mut pending: Option<&str> = None;

    for word in input.split_whitespace() {
        if let Some(op) = pending.take() {
            tokens.push(format!("{op}{word}"));
        } else if is_operator(word) {
            pending = Some(word);
        } else {
            tokens.push(word.to_string());
        }
    }

    match pending {
        Some(op) => Err(RangeError::DanglingOperator {
            operator: op.to_string(),
        }),
        None => Ok(tokens),
    }
}

fn is_operator(word: &str) -> bool {
    matches!(word, ">" | ">=" | "<" | "<=" | "=" | "^" | "~" | "~>")
}

fn parse_comparator(token: &str) -> Result<Vec<Comparator>, RangeError> {
    const OPERATORS: [&str; 8] = [">=", "<=", "~>", ">", "<", "=", "^", "~"];

    let (op, rest) = OPERATORS
        .iter()
        .find_map(|op| token.strip_prefix(op).map(|rest| (*op, rest)))
        .unwrap_or(("", token));

    if rest.is_empty() && !op.is_empty() {
        return Err(RangeError::DanglingOperator {
            operator: op.to_string(),
        });
    }

    let partial = parse_partial(rest)?;
    match op {
        "^" => caret(&partial),
        "~" | "~>" => tilde(&partial),
        ">" => primitive(Op::Gt, &partial),
        ">=" => primitive(Op::Gte, &partial),
        "<" => primitive(Op::Lt, &partial),
        "<=" => primitive(Op::Lte, &partial),
        _ => exact(&partial),
    }
}

fn parse_partial(token: &str) -> Result<Partial, RangeError> {
    let invalid = || RangeError::InvalidVersion {
        token: token.to_string(),
    };

    let trimmed = token.trim_start_matches('=').trim_start_matches(['v', 'V']);
    let without_build = trimmed.split('+').next().unwrap_or_default();
    let (core, pre) = match without_build.split_once('-') {
        Some((core, pre)) => (core, Some(pre)),
        None => (without_build, None),
    };

    let mut parts = [None; 3];
    let mut wildcard = false;
    for (i, part) in core.split('.').enumerate() {
        if i >= 3 {
            return Err(invalid());
        }
        if wildcard || matches!(part, "x" | "X" | "*") {
            wildcard = true;
            continue;
        }
        parts[i] = Some(part.parse::<u64>().map_err(|_| invalid())?);
    }

    let pre = match pre {
        Some(pre) if parts.iter().all(Option::is_some) => {
            Prerelease::new(pre).map_err(|_| invalid())?
        }
        Some(_) => return Err(invalid()),
        None => Prerelease::EMPTY,
    };

    Ok(Partial {
        raw: token.to_string(),
        major: parts[0],
        minor: parts[1],
        patch: parts[2],
        pre,
    })
}

impl Partial {
    fn version(&self) -> Version {
        Version {
            major: self.major.unwrap_or(0),
            minor: self.minor.unwrap_or(0),
            patch: self.patch.unwrap_or(0),
            pre: self.pre.clone(),
            build: BuildMetadata::EMPTY,
        }
    }

    /// `n + 1`, rejecting the token when it would overflow.
    fn next(&self, n: u64) -> Result<u64, RangeError> {
        n.checked_add(1).ok_or_else(|| RangeError::VersionTooLarge {
            token: self.raw.clone(),
        })
    }

    /// `major+1.0.0-0`, the floor of the next major line.
    fn next_major(&self, major: u64) -> Result<Version, RangeError> {
        Ok(floor(self.next(major)?, 0, 0))
    }

    /// `major.minor+1.0-0`, the floor of the next minor line.
    fn next_minor(&self, major: u64, minor: u64) -> Result<Version, RangeError> {
        Ok(floor(major, self.next(minor)?, 0))
    }
}

fn gte(version: Version) -> Comparator {
    Comparator::new(Op::Gte, version)
}

fn lt(version: Version) -> Comparator {
    Comparator::new(Op::Lt, version)
}

/// `^1.2.3` := `>=1.2.3 <2.0.0-0`, narrowing on leading zeros.
fn caret(p: &Partial) -> Result<Vec<Comparator>, RangeError> {
    let Some(major) = p.major else {
        return Ok(Vec::new());
    };
    let Some(minor) = p.minor else {
        return Ok(vec![gte(p.version()), lt(p.next_major(major)?)]);
    };
    let upper = match (major, minor, p.patch) {
        (0, 0, Some(patch)) => floor(0, 0, p.next(patch)?),
        (0, minor, _) => p.next_minor(0, minor)?,
        (major, _, _) => p.next_major(major)?,
    };
    Ok(vec![gte(p.version()), lt(upper)])
}

/// `~1.2.3` := `>=1.2.3 <1.3.0-0`, `~1` := `>=1.0.0 <2.0.0-0`.
fn tilde(p: &Partial) -> Result<Vec<Comparator>, RangeError> {
    Ok(match (p.major, p.minor) {
        (None, _) => Vec::new(),
        (Some(major), None) => vec![gte(p.version()), lt(p.next_major(major)?)],
        (Some(major), Some(minor)) => vec![gte(p.version()), lt(p.next_minor(major, minor)?)],
    })
}

/// Bare or `=` version; partial versions behave as x-ranges.
fn exact(p: &Partial) -> Result<Vec<Comparator>, RangeError> {
    match (p.major, p.minor, p.patch) {
        (None, _, _) => Ok(Vec::new()),
        (Some(_), Some(_), Some(_)) => Ok(vec![
            gte(p.version()),
            Comparator::new(Op::Lte, p.version()),
        ]),
        _ => tilde(p),
    }
}

fn primitive(op: Op, p: &Partial) -> Result<Vec<Comparator>, RangeError> {
    let Some(major) = p.major else {
        return Ok(match op {
            // `>*` and `<*` match nothing.
            Op::Gt | Op::Lt => vec![lt(floor(0, 0, 0))],
            Op::Gte | Op::Lte => Vec::new(),
        });
    };

    if let Some(patch) = p.patch {
        if op == Op::Gt && p.pre.is_empty() {
            p.next(patch)?; // `min_version` needs `patch + 1`
        }
        return Ok(vec![Comparator::new(op, p.version())]);
    }

    // Partial version: bump to the next release line where needed.
    let next_line = || match p.minor {
        Some(minor) => p.next_minor(major, minor),
        None => p.next_major(major),
    };
    Ok(match op {
        Op::Gt => {
            let mut line = next_line()?;
            line.pre = Prerelease::EMPTY;
            vec![gte(line)]
        }
        Op::Gte => vec![gte(p.version())],
        Op::Lt => vec![lt(floor(major, p.minor.unwrap_or(0), 0))],
        Op::Lte => vec![lt(next_line()?)],
    })
}

/// `1.2 - 2.3.4` := `>=1.2.0 <=2.3.4`; a partial upper end is exclusive of the next line.
fn hyphen(from: &Partial, to: &Partial) -> Result<Vec<Comparator>, RangeError> {
    let mut comparators = Vec::new();
    if from.major.is_some() {
        comparators.push(gte(from.version()));
    }
    match (to.major, to.minor, to.patch) {
        (None, _, _) => {}
        (Some(major), None, _) => comparators.push(lt(to.next_major(major)?)),
        (Some(major), Some(minor), None) => comparators.push(lt(to.next_minor(major, minor)?)),
        (Some(_), Some(_), Some(_)) => comparators.push(Comparator::new(Op::Lte, to.version())),
    }
    Ok(comparators)
}
