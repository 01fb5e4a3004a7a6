//! Distribution metadata.

use crate::error::Notice;
use camino::Utf8Path;
use common::InterpreterVersion;
use serde::Serialize;

/// Declared interpreter requirement.
pub const PYTHON_REQUIRES: &str = ">=3.9";

/// Oldest supported interpreter, matching [`PYTHON_REQUIRES`].
pub const SUPPORTED_FLOOR: InterpreterVersion = InterpreterVersion::new(3, 9);

/// Newest interpreter the SDK is tested against.
pub const NEWEST_TESTED: InterpreterVersion = InterpreterVersion::new(3, 12);

const DESCRIPTION: &str = "Apache Beam SDK for Python";
const URL: &str = "https://beam.apache.org";
const DOWNLOAD_URL: &str = "https://pypi.python.org/pypi/apache-beam";
const AUTHOR: &str = "Apache Software Foundation";
const AUTHOR_EMAIL: &str = "dev@beam.apache.org";
const KEYWORDS: &str = "apache beam";
const LICENSE: &str = "Apache License, Version 2.0";

const FALLBACK_LONG_DESCRIPTION: &str = "Apache Beam is a unified programming model for both \
batch and streaming data processing, enabling efficient execution across diverse distributed \
execution engines and providing extensibility points for connecting to different technologies \
and user communities.";

const CLASSIFIERS: &[&str] = &[
    "Intended Audience :: End Users/Desktop",
    "License :: OSI Approved :: Apache Software License",
    "Operating System :: POSIX :: Linux",
    "Programming Language :: Python :: 3.9",
    "Programming Language :: Python :: 3.10",
    "Programming Language :: Python :: 3.11",
    "Programming Language :: Python :: 3.12",
    "Programming Language :: Python :: 3.13",
    "Topic :: Software Development :: Libraries",
    "Topic :: Software Development :: Libraries :: Python Modules",
];

/// Descriptive fields of the distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageMetadata {
    /// One-line summary.
    pub description: String,
    /// README contents or the built-in paragraph.
    pub long_description: String,
    /// Always `text/markdown`.
    pub long_description_content_type: String,
    /// Project home page.
    pub url: String,
    /// Download location.
    pub download_url: String,
    /// Author name.
    pub author: String,
    /// Author contact address.
    pub author_email: String,
    /// Search keywords.
    pub keywords: String,
    /// Licence name.
    pub license: String,
    /// Trove classifiers.
    pub classifiers: Vec<String>,
    /// Interpreter requirement.
    pub python_requires: String,
    /// Whether the package may run from a zip archive; always `false`.
    pub zip_safe: bool,
}

/// Builds the metadata, reading the long description from `readme`.
///
/// A missing or unreadable README falls back to a built-in paragraph and
/// yields [`Notice::LongDescriptionFallback`].
#[must_use]
pub fn package_metadata(readme: &Utf8Path) -> (PackageMetadata, Option<Notice>) {
    let (long_description, notice) = match std::fs::read_to_string(readme) {
        Ok(text) => (text, None),
        Err(err) => {
            log::debug!("could not read {readme}: {err}");
            (
                FALLBACK_LONG_DESCRIPTION.to_owned(),
                Some(Notice::LongDescriptionFallback {
                    path: readme.to_owned(),
                }),
            )
        }
    };

    let metadata = PackageMetadata {
        description: DESCRIPTION.to_owned(),
        long_description,
        long_description_content_type: "text/markdown".to_owned(),
        url: URL.to_owned(),
        download_url: DOWNLOAD_URL.to_owned(),
        author: AUTHOR.to_owned(),
        author_email: AUTHOR_EMAIL.to_owned(),
        keywords: KEYWORDS.to_owned(),
        license: LICENSE.to_owned(),
        classifiers: CLASSIFIERS.iter().map(|c| (*c).to_owned()).collect(),
        python_requires: PYTHON_REQUIRES.to_owned(),
        zip_safe: false,
    };
    (metadata, notice)
}
