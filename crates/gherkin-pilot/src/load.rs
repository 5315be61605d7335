//! Feature loading, dependency sorting, and skip computation.
//!
//! `from_directory` reads every `*.feature` file in a directory, parses it
//! with the `gherkin` crate, and returns the features in execution order:
//! `@Last`-tagged features stable-sorted to the end, then a topological sort
//! over the `I am run after the "<name>" feature` Background markers.
//! Features tagged `@Skip`, or excluded by another feature's `@Only`, are
//! flagged rather than removed so reporters still see them.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;
use tracing::debug;

use crate::model::{Feature, SkippableFeature};

const TAG_SKIP: &str = "Skip";
const TAG_ONLY: &str = "Only";
const TAG_LAST: &str = "Last";

/// The Background step marker declaring a load-time dependency edge.
pub(crate) fn run_after_regex() -> &'static Regex {
    static RUN_AFTER: OnceLock<Regex> = OnceLock::new();
    RUN_AFTER.get_or_init(|| {
        Regex::new(r#"^I am run after the "([^"]+)" feature$"#)
            .unwrap_or_else(|err| panic!("dependency marker pattern must compile: {err}"))
    })
}

/// Fatal configuration errors raised before any feature executes.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The directory yielded zero parsed features.
    #[error("no features found in {}", directory.display())]
    NoFeaturesFound {
        /// The directory that was scanned.
        directory: PathBuf,
    },

    /// A feature file or the directory could not be read.
    #[error("failed to read feature file: {0}")]
    Io(#[from] std::io::Error),

    /// A feature file is not valid Gherkin.
    #[error("failed to parse feature file {}: {source}", path.display())]
    Parse {
        /// The offending file.
        path: PathBuf,
        /// The parser's diagnosis.
        #[source]
        source: gherkin::ParseError,
    },

    /// A dependency marker references a feature that does not exist.
    #[error("feature `{feature}` wants to run after `{dependency}`, which does not exist")]
    UnknownDependency {
        /// The feature declaring the marker.
        feature: String,
        /// The missing feature name.
        dependency: String,
    },

    /// The dependency markers form a cycle.
    #[error("cyclic feature dependencies involving: {}", features.join(", "))]
    CyclicDependency {
        /// Every feature left unsortable, in load order.
        features: Vec<String>,
    },
}

/// Load, order, and flag every feature in a directory.
///
/// Files are read in lexical name order so runs are reproducible across
/// platforms.
///
/// # Errors
///
/// Returns a [`LoadError`] when the directory cannot be read, a file fails to
/// parse, no features are found, a dependency marker references an unknown
/// feature, or the dependency graph is cyclic.
pub fn from_directory(directory: &Path) -> Result<Vec<SkippableFeature>, LoadError> {
    let mut paths: Vec<PathBuf> = fs::read_dir(directory)?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "feature"))
        .collect();
    paths.sort();

    let mut features = Vec::with_capacity(paths.len());
    for path in paths {
        let mut text = fs::read_to_string(&path)?;
        if !text.ends_with('\n') {
            text.push('\n');
        }
        let parsed = gherkin::Feature::parse(&text, gherkin::GherkinEnv::default())
            .map_err(|source| LoadError::Parse {
                path: path.clone(),
                source,
            })?;
        features.push(Feature::from_gherkin(&parsed, Some(path)));
    }

    if features.is_empty() {
        return Err(LoadError::NoFeaturesFound {
            directory: directory.to_path_buf(),
        });
    }
    parse_features(features)
}

/// Order and flag already-parsed features.
///
/// # Errors
///
/// Returns [`LoadError::UnknownDependency`] or
/// [`LoadError::CyclicDependency`] when the dependency markers are
/// inconsistent.
pub fn parse_features(mut features: Vec<Feature>) -> Result<Vec<SkippableFeature>, LoadError> {
    // Stable sort, so relative order among non-@Last features is preserved.
    features.sort_by_key(|feature| feature.has_tag(TAG_LAST));

    let names: Vec<String> = features.iter().map(|feature| feature.name.clone()).collect();
    let edges = dependency_edges(&features, &names)?;
    let order = topological_order(&names, &edges)?;

    let only_names: BTreeSet<String> = features
        .iter()
        .filter(|feature| feature.has_tag(TAG_ONLY))
        .map(|feature| feature.name.clone())
        .collect();

    let mut by_name: BTreeMap<String, Feature> = features
        .into_iter()
        .map(|feature| (feature.name.clone(), feature))
        .collect();

    let mut sorted = Vec::with_capacity(order.len());
    for name in &order {
        let Some(feature) = by_name.remove(name) else {
            continue;
        };
        let skip = feature.has_tag(TAG_SKIP)
            || (!only_names.is_empty() && !only_names.contains(feature.name.as_str()));
        let depends_on: Vec<String> = edges
            .iter()
            .filter(|(_, dependent)| dependent == &feature.name)
            .map(|(dependency, _)| dependency.clone())
            .collect();
        if skip {
            debug!(feature = %feature.name, "feature flagged for skipping");
        }
        sorted.push(SkippableFeature {
            feature,
            skip,
            depends_on,
        });
    }
    Ok(sorted)
}

/// Collect `(dependency, dependent)` edges from Background markers.
fn dependency_edges(
    features: &[Feature],
    names: &[String],
) -> Result<Vec<(String, String)>, LoadError> {
    let known: BTreeSet<&str> = names.iter().map(String::as_str).collect();
    let mut edges = Vec::new();
    for feature in features {
        let Some(background) = feature.background() else {
            continue;
        };
        for step in &background.steps {
            let Some(captures) = run_after_regex().captures(&step.text) else {
                continue;
            };
            let dependency = captures.get(1).map_or("", |group| group.as_str());
            if !known.contains(dependency) {
                return Err(LoadError::UnknownDependency {
                    feature: feature.name.clone(),
                    dependency: dependency.to_owned(),
                });
            }
            edges.push((dependency.to_owned(), feature.name.clone()));
        }
    }
    Ok(edges)
}

/// Stable Kahn topological sort over feature names.
///
/// Among ready nodes the lowest original index is taken first, so features
/// untouched by dependencies keep their directory order.
fn topological_order(
    names: &[String],
    edges: &[(String, String)],
) -> Result<Vec<String>, LoadError> {
    let index: BTreeMap<&str, usize> = names
        .iter()
        .enumerate()
        .map(|(position, name)| (name.as_str(), position))
        .collect();

    let mut indegree: BTreeMap<usize, usize> = BTreeMap::new();
    let mut adjacency: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (dependency, dependent) in edges {
        let (Some(&from), Some(&to)) = (
            index.get(dependency.as_str()),
            index.get(dependent.as_str()),
        ) else {
            continue;
        };
        *indegree.entry(to).or_insert(0) += 1;
        adjacency.entry(from).or_default().push(to);
    }

    let mut remaining: BTreeSet<usize> = (0..names.len()).collect();
    let mut order = Vec::with_capacity(names.len());
    while let Some(&next) = remaining
        .iter()
        .find(|position| indegree.get(position).copied().unwrap_or(0) == 0)
    {
        remaining.remove(&next);
        if let Some(name) = names.get(next) {
            order.push(name.clone());
        }
        for &child in adjacency.get(&next).into_iter().flatten() {
            if let Some(count) = indegree.get_mut(&child) {
                *count = count.saturating_sub(1);
            }
        }
    }

    if remaining.is_empty() {
        Ok(order)
    } else {
        Err(LoadError::CyclicDependency {
            features: remaining
                .iter()
                .filter_map(|&position| names.get(position).cloned())
                .collect(),
        })
    }
}
