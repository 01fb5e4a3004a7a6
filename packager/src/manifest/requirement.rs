//! Requirement parsing.
//!
//! Catalogue entries are written as installer requirement strings:
//!
//! ```text
//! name[extra,...] <version specifier> ; python_version <op> "<MAJOR.MINOR>"
//! ```
//!
//! Only `python_version` markers are understood (joined with `and`); platform
//! gating is declared structurally in the catalogue instead. `!=` and `~=`
//! markers are rejected because they do not describe a contiguous range.

use super::predicate::{InterpreterRange, PlatformPredicate};
use crate::error::{PackagerError, Result};
use common::{InterpreterVersion, Platform};

/// One parsed dependency specification.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DependencySpec {
    name: String,
    extras: Vec<String>,
    version_range: String,
    platform: PlatformPredicate,
    interpreter: InterpreterRange,
    group: Option<String>,
    source: String,
}

impl DependencySpec {
    /// Parses `requirement`, attaching the platform predicate and extras
    /// group it was declared under.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::MalformedRequirement`] when the string cannot
    /// be parsed or its marker is unsupported.
    ///
    /// # Examples
    ///
    /// ```
    /// use common::{InterpreterVersion, Platform};
    /// use sdkprep::manifest::{DependencySpec, PlatformPredicate};
    ///
    /// let spec = DependencySpec::parse(
    ///     r#"grpcio>=1.67.0; python_version >= "3.13""#,
    ///     PlatformPredicate::Any,
    ///     None,
    /// )?;
    /// assert_eq!(spec.requirement(), "grpcio>=1.67.0");
    /// assert!(spec.applies_to(&Platform::linux_64(), InterpreterVersion::new(3, 13)));
    /// assert!(!spec.applies_to(&Platform::linux_64(), InterpreterVersion::new(3, 12)));
    /// # Ok::<(), sdkprep::error::PackagerError>(())
    /// ```
    pub fn parse(
        requirement: &str,
        platform: PlatformPredicate,
        group: Option<&str>,
    ) -> Result<Self> {
        let reject = |reason: String| PackagerError::MalformedRequirement {
            requirement: requirement.to_owned(),
            reason,
        };

        let (body, marker) = match requirement.split_once(';') {
            Some((body, marker)) => (body.trim(), Some(marker.trim())),
            None => (requirement.trim(), None),
        };

        let name_len = body
            .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
            .unwrap_or(body.len());
        let (name, rest) = body.split_at(name_len);
        if !name.starts_with(|c: char| c.is_ascii_alphanumeric()) {
            return Err(reject("missing package name".to_owned()));
        }

        let rest = rest.trim_start();
        let (extras, specifier) = match rest.strip_prefix('[') {
            Some(after) => {
                let (inner, tail) = after
                    .split_once(']')
                    .ok_or_else(|| reject("unterminated extras list".to_owned()))?;
                let extras = inner
                    .split(',')
                    .map(str::trim)
                    .filter(|extra| !extra.is_empty())
                    .map(str::to_owned)
                    .collect();
                (extras, tail)
            }
            None => (Vec::new(), rest),
        };

        let version_range: String = specifier.chars().filter(|c| !c.is_whitespace()).collect();
        if !version_range.is_empty() && !version_range.starts_with(['<', '>', '=', '!', '~']) {
            return Err(reject(format!(
                "version specifier {version_range:?} must start with a comparison operator"
            )));
        }

        let interpreter = match marker {
            Some(marker) => parse_marker(marker).map_err(reject)?,
            None => InterpreterRange::unbounded(),
        };

        Ok(Self {
            name: name.to_owned(),
            extras,
            version_range,
            platform,
            interpreter,
            group: group.map(str::to_owned),
            source: requirement.to_owned(),
        })
    }

    /// The package name as written.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The package name normalised for comparison: lower case, with runs of
    /// `-`, `_` and `.` collapsed to `-`.
    #[must_use]
    pub fn normalised_name(&self) -> String {
        normalise_name(&self.name)
    }

    /// The version specifier without whitespace, possibly empty.
    #[must_use]
    pub fn version_range(&self) -> &str {
        &self.version_range
    }

    /// The platform predicate.
    #[must_use]
    pub fn platform(&self) -> &PlatformPredicate {
        &self.platform
    }

    /// The interpreter range from the marker.
    #[must_use]
    pub fn interpreter(&self) -> InterpreterRange {
        self.interpreter
    }

    /// The extras group this spec was declared in; `None` for install-time
    /// dependencies.
    #[must_use]
    pub fn extra_group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    /// The requirement as written in the catalogue.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Renders the selected requirement without its marker.
    #[must_use]
    pub fn requirement(&self) -> String {
        let extras = if self.extras.is_empty() {
            String::new()
        } else {
            format!("[{}]", self.extras.join(","))
        };
        format!("{}{extras}{}", self.name(), self.version_range())
    }

    /// Returns `true` when the spec is selected for this context.
    #[must_use]
    pub fn applies_to(&self, platform: &Platform, interpreter: InterpreterVersion) -> bool {
        self.platform.matches(platform) && self.interpreter.contains(interpreter)
    }

    /// Returns `true` when some context would select both specs.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.platform.overlaps(&other.platform) && self.interpreter.overlaps(&other.interpreter)
    }
}

/// Normalises a package name for comparison.
#[must_use]
pub fn normalise_name(name: &str) -> String {
    let mut normalised = String::with_capacity(name.len());
    let mut pending_separator = false;
    for c in name.chars() {
        if matches!(c, '-' | '_' | '.') {
            pending_separator = true;
            continue;
        }
        if pending_separator && !normalised.is_empty() {
            normalised.push('-');
        }
        pending_separator = false;
        normalised.push(c.to_ascii_lowercase());
    }
    normalised
}

fn parse_marker(marker: &str) -> std::result::Result<InterpreterRange, String> {
    marker
        .split(" and ")
        .map(parse_clause)
        .try_fold(InterpreterRange::unbounded(), |range, clause| {
            let narrowed = range.intersect(&clause?);
            if narrowed.is_empty() {
                Err("marker excludes every interpreter".to_owned())
            } else {
                Ok(narrowed)
            }
        })
}

fn parse_clause(clause: &str) -> std::result::Result<InterpreterRange, String> {
    let clause = clause.trim();
    let rest = clause
        .strip_prefix("python_version")
        .ok_or_else(|| format!("unsupported marker {clause:?}"))?
        .trim_start();

    let (op, literal) = ["<=", ">=", "==", "!=", "~=", "<", ">"]
        .into_iter()
        .find_map(|op| rest.strip_prefix(op).map(|tail| (op, tail.trim())))
        .ok_or_else(|| format!("missing comparison in marker {clause:?}"))?;

    let version_text = literal
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .or_else(|| literal.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
        .ok_or_else(|| format!("marker version must be quoted in {clause:?}"))?;
    let version: InterpreterVersion = version_text
        .parse()
        .map_err(|err: common::ContextError| err.to_string())?;

    match op {
        "<=" => Ok(InterpreterRange::new(None, Some(version))),
        ">=" => Ok(InterpreterRange::new(Some(version), None)),
        "==" => Ok(InterpreterRange::new(Some(version), Some(version))),
        "<" => version
            .predecessor()
            .map(|max| InterpreterRange::new(None, Some(max)))
            .ok_or_else(|| "marker excludes every interpreter".to_owned()),
        ">" => Ok(InterpreterRange::new(Some(version.successor()), None)),
        other => Err(format!(
            "operator {other} does not describe a contiguous interpreter range"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn v(major: u32, minor: u32) -> InterpreterVersion {
        InterpreterVersion::new(major, minor)
    }

    fn parse(raw: &str) -> DependencySpec {
        DependencySpec::parse(raw, PlatformPredicate::Any, None).expect("requirement should parse")
    }

    #[rstest]
    #[case::plain("crcmod>=1.7,<2.0", "crcmod>=1.7,<2.0")]
    #[case::bare_name("markdown", "markdown")]
    #[case::spaces("distributed >= 2024.4.2", "distributed>=2024.4.2")]
    #[case::spaced_upper(
        "google-cloud-aiplatform>=1.26.0, < 2.0",
        "google-cloud-aiplatform>=1.26.0,<2.0"
    )]
    #[case::extras(
        "testcontainers[mysql,kafka,milvus]>=4.0.0,<5.0.0",
        "testcontainers[mysql,kafka,milvus]>=4.0.0,<5.0.0"
    )]
    #[case::exclusions(
        "jupyter-client>=6.1.11,!=6.1.13,<8.2.1",
        "jupyter-client>=6.1.11,!=6.1.13,<8.2.1"
    )]
    #[case::dotted_name(
        "keyrings.google-artifactregistry-auth",
        "keyrings.google-artifactregistry-auth"
    )]
    fn renders_requirements(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(parse(raw).requirement(), expected);
    }

    #[rstest]
    #[case::bare_name("markdown", "")]
    #[case::marker_dropped(r#"grpcio>=1.67.0; python_version >= "3.13""#, ">=1.67.0")]
    #[case::extras_excluded("apache-beam[gcp] >= 2.0, < 3", ">=2.0,<3")]
    fn version_range_excludes_name_extras_and_marker(
        #[case] raw: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(parse(raw).version_range(), expected);
    }

    #[rstest]
    #[case::at_most(r#"grpcio<2; python_version <= "3.12""#, None, Some(v(3, 12)))]
    #[case::at_least(r#"grpcio>=1.67.0; python_version >= "3.13""#, Some(v(3, 13)), None)]
    #[case::strictly_below(r#"js2py>=0.74,<1; python_version<"3.12""#, None, Some(v(3, 11)))]
    #[case::strictly_above("x; python_version > '3.9'", Some(v(3, 10)), None)]
    #[case::exact(r#"x; python_version == "3.11""#, Some(v(3, 11)), Some(v(3, 11)))]
    #[case::conjunction(
        r#"x; python_version >= "3.10" and python_version < "3.13""#,
        Some(v(3, 10)),
        Some(v(3, 12))
    )]
    fn parses_interpreter_markers(
        #[case] raw: &str,
        #[case] min: Option<InterpreterVersion>,
        #[case] max: Option<InterpreterVersion>,
    ) {
        assert_eq!(parse(raw).interpreter(), InterpreterRange::new(min, max));
    }

    #[rstest]
    #[case::no_name(">=1.0")]
    #[case::bad_specifier("numpy 1.2")]
    #[case::unterminated_extras("pkg[extra>=1")]
    #[case::platform_marker(r#"pywin32; sys_platform == "win32""#)]
    #[case::not_equal(r#"x; python_version != "3.10""#)]
    #[case::unquoted("x; python_version >= 3.10")]
    #[case::empty_range(r#"x; python_version >= "3.12" and python_version < "3.10""#)]
    fn rejects_unsupported_requirements(#[case] raw: &str) {
        let err = DependencySpec::parse(raw, PlatformPredicate::Any, None)
            .expect_err("requirement should be rejected");
        assert!(matches!(err, PackagerError::MalformedRequirement { .. }));
    }

    #[rstest]
    #[case("Sphinx", "sphinx")]
    #[case("requests_mock", "requests-mock")]
    #[case("google.cloud__core", "google-cloud-core")]
    #[case("psycopg2-binary", "psycopg2-binary")]
    fn normalises_names(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalise_name(raw), expected);
    }

    #[test]
    fn keeps_declaring_group_and_source() {
        let spec = DependencySpec::parse("boto3>=1.9,<2", PlatformPredicate::Any, Some("aws"))
            .expect("parse");
        assert_eq!(spec.extra_group(), Some("aws"));
        assert_eq!(spec.source(), "boto3>=1.9,<2");
        assert_eq!(spec.name(), "boto3");
    }
}
