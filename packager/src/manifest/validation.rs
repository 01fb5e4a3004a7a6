//! Mutual exclusion and coverage checks for dependency variants.
//!
//! Several specifications may name the same package only if, for every
//! platform and supported interpreter, exactly one of them is selected.
//! Overlap is checked pairwise. Coverage is checked per platform class: each
//! platform named by a predicate, plus every platform no predicate names.

use super::predicate::InterpreterRange;
use super::requirement::DependencySpec;
use crate::error::{PackagerError, Result};
use common::{InterpreterVersion, Platform};
use std::collections::BTreeMap;

/// Validates the specs of one group (`install` or an extras group).
///
/// # Errors
///
/// Returns [`PackagerError::AmbiguousDependencyPredicate`] for overlapping
/// variants and [`PackagerError::IncompleteDependencyCoverage`] when
/// variants leave supported interpreters unselected.
pub(super) fn validate_group(
    group: &str,
    specs: &[&DependencySpec],
    floor: InterpreterVersion,
) -> Result<()> {
    let mut families: BTreeMap<String, Vec<&DependencySpec>> = BTreeMap::new();
    for spec in specs {
        families.entry(spec.normalised_name()).or_default().push(spec);
    }

    for (package, variants) in &families {
        check_exclusive(group, package, variants)?;
        if variants.len() > 1 {
            check_coverage(group, package, variants, floor)?;
        }
    }
    Ok(())
}

fn check_exclusive(group: &str, package: &str, variants: &[&DependencySpec]) -> Result<()> {
    for (index, first) in variants.iter().enumerate() {
        for second in variants.iter().skip(index + 1) {
            if first.overlaps(second) {
                return Err(PackagerError::AmbiguousDependencyPredicate {
                    package: package.to_owned(),
                    group: group.to_owned(),
                    first: first.source().to_owned(),
                    second: second.source().to_owned(),
                });
            }
        }
    }
    Ok(())
}

fn check_coverage(
    group: &str,
    package: &str,
    variants: &[&DependencySpec],
    floor: InterpreterVersion,
) -> Result<()> {
    let mut named: Vec<&Platform> = Vec::new();
    for platform in variants
        .iter()
        .filter_map(|spec| spec.platform().named_platform())
    {
        if !named.contains(&platform) {
            named.push(platform);
        }
    }

    let mut classes: Vec<(String, Vec<InterpreterRange>)> = named
        .iter()
        .map(|platform| {
            let ranges = variants
                .iter()
                .filter(|spec| spec.platform().matches(platform))
                .map(|spec| spec.interpreter())
                .collect();
            (format!("on {platform}"), ranges)
        })
        .collect();
    let unnamed = variants
        .iter()
        .filter(|spec| spec.platform().matches_unnamed())
        .map(|spec| spec.interpreter())
        .collect();
    let label = if named.is_empty() {
        "on all platforms".to_owned()
    } else {
        "on other platforms".to_owned()
    };
    classes.push((label, unnamed));

    for (label, ranges) in classes {
        // A class no variant applies to simply does not get the package.
        if ranges.is_empty() {
            continue;
        }
        if let Some(gap) = first_gap(ranges, floor) {
            return Err(PackagerError::IncompleteDependencyCoverage {
                package: package.to_owned(),
                group: group.to_owned(),
                gap: format!("Python {gap} {label}"),
            });
        }
    }
    Ok(())
}

/// Returns the first uncovered range at or above `floor`, if any. Ranges are
/// assumed pairwise disjoint.
fn first_gap(
    mut ranges: Vec<InterpreterRange>,
    floor: InterpreterVersion,
) -> Option<InterpreterRange> {
    ranges.sort_by_key(InterpreterRange::min);
    let mut cursor = floor;
    for range in ranges {
        if range.max().is_some_and(|max| max < cursor) {
            continue;
        }
        if let Some(min) = range.min().filter(|min| *min > cursor) {
            return Some(InterpreterRange::new(Some(cursor), min.predecessor()));
        }
        match range.max() {
            Some(max) => cursor = max.successor(),
            None => return None,
        }
    }
    Some(InterpreterRange::new(Some(cursor), None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::predicate::PlatformPredicate;
    use rstest::rstest;

    const FLOOR: InterpreterVersion = InterpreterVersion::new(3, 9);

    fn spec(raw: &str) -> DependencySpec {
        DependencySpec::parse(raw, PlatformPredicate::Any, None).expect("parse")
    }

    fn restricted(predicate: PlatformPredicate, raw: &str) -> DependencySpec {
        DependencySpec::parse(raw, predicate, None).expect("parse")
    }

    fn validate(specs: &[DependencySpec]) -> Result<()> {
        let refs: Vec<&DependencySpec> = specs.iter().collect();
        validate_group("install", &refs, FLOOR)
    }

    #[test]
    fn cutover_partition_is_valid() {
        validate(&[
            spec(r#"grpcio<1.66.0; python_version <= "3.12""#),
            spec(r#"grpcio>=1.67.0; python_version >= "3.13""#),
        ])
        .expect("partition should validate");
    }

    #[test]
    fn shared_cutover_version_is_ambiguous() {
        let err = validate(&[
            spec(r#"grpcio<1.66.0; python_version <= "3.13""#),
            spec(r#"grpcio>=1.67.0; python_version >= "3.13""#),
        ])
        .expect_err("overlap should fail");
        match err {
            PackagerError::AmbiguousDependencyPredicate { package, group, .. } => {
                assert_eq!(package, "grpcio");
                assert_eq!(group, "install");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn duplicate_unconditional_specs_are_ambiguous() {
        assert!(matches!(
            validate(&[spec("pandas<2.3.0"), spec("Pandas>=1.4.3")]),
            Err(PackagerError::AmbiguousDependencyPredicate { .. })
        ));
    }

    #[rstest]
    #[case::gap_between(
        r#"x<2; python_version <= "3.10""#,
        r#"x>=2; python_version >= "3.12""#,
        "3.11"
    )]
    #[case::open_top(
        r#"x<2; python_version <= "3.10""#,
        r#"x>=2; python_version == "3.11""#,
        "3.12 and later"
    )]
    #[case::floor_uncovered(
        r#"x<2; python_version == "3.10""#,
        r#"x>=2; python_version >= "3.11""#,
        "3.9"
    )]
    fn gaps_are_reported(#[case] first: &str, #[case] second: &str, #[case] gap: &str) {
        let err = validate(&[spec(first), spec(second)]).expect_err("gap should fail");
        match err {
            PackagerError::IncompleteDependencyCoverage { gap: reported, .. } => {
                assert!(reported.contains(gap), "{reported:?} should mention {gap:?}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn ranges_below_floor_do_not_matter() {
        validate(&[
            spec(r#"x<2; python_version <= "3.8""#),
            spec(r#"x>=2; python_version >= "3.9""#),
        ])
        .expect("coverage from floor should validate");
    }

    #[test]
    fn single_gated_variant_needs_no_coverage() {
        validate(&[spec(r#"js2py>=0.74,<1; python_version<"3.12""#)]).expect("validate");
    }

    #[test]
    fn platform_partition_is_valid() {
        validate(&[
            restricted(PlatformPredicate::Only(Platform::windows_32()), "pyarrow<10"),
            restricted(PlatformPredicate::Excluding(Platform::windows_32()), "pyarrow>=3.0.0"),
        ])
        .expect("platform partition should validate");
    }

    #[test]
    fn platform_class_with_gap_is_reported() {
        let err = validate(&[
            restricted(
                PlatformPredicate::Only(Platform::windows_32()),
                r#"x<2; python_version <= "3.11""#,
            ),
            restricted(PlatformPredicate::Excluding(Platform::windows_32()), "x>=2"),
        ])
        .expect_err("gap should fail");
        assert!(err.to_string().contains("windows-32"));
    }

    #[test]
    fn distinct_packages_are_independent() {
        validate(&[spec("crcmod>=1.7,<2.0"), spec("orjson>=3.9.7,<4")]).expect("validate");
    }
}
