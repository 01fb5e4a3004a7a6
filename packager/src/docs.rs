//! Documentation example mirroring.
//!
//! YAML examples are authored in the documentation site and tested from the
//! package, so each build copies them into the package data directory when
//! the site sources are available. This step never fails a build.

use crate::config::DocsConfig;
use crate::error::Notice;
use camino::{Utf8Path, Utf8PathBuf};
use glob::Pattern;
use log::{debug, info};
use std::fs;
use std::io;

/// Outcome of a documentation sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocSyncOutcome {
    /// The destination was cleared and repopulated.
    Synced {
        /// File names copied, sorted.
        files: Vec<String>,
    },
    /// The destination was left untouched.
    Unavailable(Notice),
}

/// Mirrors documentation examples into the package.
///
/// When `source` exists, `destination` is removed, recreated, and populated
/// with the files in `source` (not its subdirectories) whose names match
/// `pattern`. Otherwise the destination is not touched and
/// [`Notice::DocsSourceMissing`] is returned.
#[must_use]
pub fn sync_doc_examples(
    source: &Utf8Path,
    destination: &Utf8Path,
    pattern: &str,
) -> DocSyncOutcome {
    if !source.is_dir() {
        return DocSyncOutcome::Unavailable(Notice::DocsSourceMissing {
            path: source.to_owned(),
        });
    }
    match mirror(source, destination, pattern) {
        Ok(files) => {
            info!("copied {} documentation examples into {destination}", files.len());
            DocSyncOutcome::Synced { files }
        }
        Err(err) => DocSyncOutcome::Unavailable(Notice::DocsSyncFailed {
            reason: err.to_string(),
        }),
    }
}

/// Resolves the configured paths against `root` and syncs.
#[must_use]
pub fn sync_from_config(root: &Utf8Path, config: &DocsConfig) -> DocSyncOutcome {
    sync_doc_examples(
        &root.join(&config.source),
        &root.join(&config.destination),
        &config.pattern,
    )
}

fn mirror(source: &Utf8Path, destination: &Utf8Path, pattern: &str) -> io::Result<Vec<String>> {
    let pattern = Pattern::new(pattern).map_err(|err| io::Error::other(err.to_string()))?;
    let mut matched: Vec<Utf8PathBuf> = source
        .read_dir_utf8()?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.into_path())
        .filter(|path| path.is_file())
        .filter(|path| path.file_name().is_some_and(|name| pattern.matches(name)))
        .collect();
    matched.sort();

    match fs::remove_dir_all(destination) {
        Ok(()) => debug!("cleared {destination}"),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }
    fs::create_dir_all(destination)?;

    let mut copied = Vec::with_capacity(matched.len());
    for path in matched {
        let Some(name) = path.file_name() else {
            continue;
        };
        fs::copy(&path, destination.join(name))?;
        copied.push(name.to_owned());
    }
    Ok(copied)
}
