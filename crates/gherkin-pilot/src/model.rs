//! Engine-owned feature model.
//!
//! The loader converts the `gherkin` crate's AST into these owned,
//! serialisable types once at load time; they are read-only thereafter. The
//! Background (where present) becomes the first child of the feature so the
//! orchestrator can run children uniformly in document order. Tag names are
//! normalised without their leading `@`, matching how the `gherkin` parser
//! reports them.

use std::path::PathBuf;

use serde::Serialize;

/// Distinguishes a feature's Background from its ordinary scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScenarioKind {
    /// The feature's Background block, run once before the scenarios.
    Background,
    /// A concrete scenario (including those expanded from an outline).
    Scenario,
}

/// Block argument attached to a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum StepArgument {
    /// A fenced doc string.
    DocString(String),
    /// A data table, row by row.
    Table(Vec<Vec<String>>),
}

/// A single Gherkin step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    /// The textual keyword as written (`Given`, `When`, `And`, …).
    pub keyword: String,
    /// The raw step text, before interpolation.
    pub text: String,
    /// Optional doc string or table argument.
    pub argument: Option<StepArgument>,
}

impl Step {
    fn from_gherkin(step: &gherkin::Step) -> Self {
        let argument = step
            .docstring
            .as_ref()
            .map(|doc| StepArgument::DocString(doc.clone()))
            .or_else(|| {
                step.table
                    .as_ref()
                    .map(|table| StepArgument::Table(table.rows.clone()))
            });
        Self {
            keyword: step.keyword.trim().to_owned(),
            text: step.value.clone(),
            argument,
        }
    }

    /// Substitute `<column>` outline tokens in the step text and doc string.
    fn substitute(&self, bindings: &[(String, String)]) -> Self {
        let apply = |text: &str| {
            bindings.iter().fold(text.to_owned(), |acc, (column, value)| {
                acc.replace(&format!("<{column}>"), value)
            })
        };
        let argument = self.argument.as_ref().map(|argument| match argument {
            StepArgument::DocString(doc) => StepArgument::DocString(apply(doc)),
            StepArgument::Table(rows) => StepArgument::Table(rows.clone()),
        });
        Self {
            keyword: self.keyword.clone(),
            text: apply(&self.text),
            argument,
        }
    }
}

/// One Examples block of a Scenario Outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Examples {
    /// Column names from the table header row.
    pub header: Vec<String>,
    /// Data rows, each as long as the header.
    pub rows: Vec<Vec<String>>,
}

impl Examples {
    fn from_gherkin(examples: &gherkin::Examples) -> Option<Self> {
        let table = examples.table.as_ref()?;
        let mut rows = table.rows.iter();
        let header = rows.next()?.clone();
        Some(Self {
            header,
            rows: rows.cloned().collect(),
        })
    }
}

/// A Background or Scenario with its ordered steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Scenario {
    /// Whether this child is the Background or a scenario.
    pub kind: ScenarioKind,
    /// The scenario name.
    pub name: String,
    /// Normalised tag names (no leading `@`).
    pub tags: Vec<String>,
    /// Steps in document order.
    pub steps: Vec<Step>,
    /// Examples blocks; non-empty marks this scenario as an outline.
    pub examples: Vec<Examples>,
}

impl Scenario {
    fn from_background(background: &gherkin::Background) -> Self {
        Self {
            kind: ScenarioKind::Background,
            name: background.keyword.clone(),
            tags: Vec::new(),
            steps: background.steps.iter().map(Step::from_gherkin).collect(),
            examples: Vec::new(),
        }
    }

    fn from_gherkin(scenario: &gherkin::Scenario) -> Self {
        Self {
            kind: ScenarioKind::Scenario,
            name: scenario.name.clone(),
            tags: normalise_tags(&scenario.tags),
            steps: scenario.steps.iter().map(Step::from_gherkin).collect(),
            examples: scenario
                .examples
                .iter()
                .filter_map(Examples::from_gherkin)
                .collect(),
        }
    }

    /// Whether this scenario carries the given (normalised) tag, or a tag
    /// with the given prefix such as `Retry=`.
    #[must_use]
    pub fn tag_with_prefix(&self, prefix: &str) -> Option<&str> {
        self.tags
            .iter()
            .map(String::as_str)
            .find(|tag| tag.starts_with(prefix))
    }

    /// Expand a Scenario Outline into concrete scenarios, one per Examples
    /// row in table order. Plain scenarios expand to themselves.
    ///
    /// Every `<column>` token in step text and doc strings is replaced with
    /// the row's cell value. Expanded scenarios are named after the original
    /// with a 1-based example index suffix.
    #[must_use]
    pub fn expand(&self) -> Vec<Self> {
        if self.examples.is_empty() {
            return vec![self.clone()];
        }
        let mut expanded = Vec::new();
        for block in &self.examples {
            for row in &block.rows {
                let bindings: Vec<(String, String)> = block
                    .header
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned())
                    .collect();
                expanded.push(Self {
                    kind: ScenarioKind::Scenario,
                    name: format!("{} (example {})", self.name, expanded.len() + 1),
                    tags: self.tags.clone(),
                    steps: self
                        .steps
                        .iter()
                        .map(|step| step.substitute(&bindings))
                        .collect(),
                    examples: Vec::new(),
                });
            }
        }
        if expanded.is_empty() {
            // An outline whose Examples tables hold no data rows.
            return vec![self.clone()];
        }
        expanded
    }
}

/// A loaded feature with its children in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Feature {
    /// The feature name, unique within a run.
    pub name: String,
    /// Source file the feature was loaded from, when known.
    pub path: Option<PathBuf>,
    /// Normalised tag names (no leading `@`).
    pub tags: Vec<String>,
    /// The Background (if any) followed by the scenarios.
    pub children: Vec<Scenario>,
}

impl Feature {
    /// Convert a parsed `gherkin` feature into the engine model.
    #[must_use]
    pub(crate) fn from_gherkin(feature: &gherkin::Feature, path: Option<PathBuf>) -> Self {
        let mut children = Vec::with_capacity(feature.scenarios.len() + 1);
        if let Some(background) = feature.background.as_ref() {
            children.push(Scenario::from_background(background));
        }
        children.extend(feature.scenarios.iter().map(Scenario::from_gherkin));
        Self {
            name: feature.name.clone(),
            path,
            tags: normalise_tags(&feature.tags),
            children,
        }
    }

    /// Whether the feature carries the given (normalised) tag.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|candidate| candidate == tag)
    }

    /// The Background child, when the feature declares one.
    #[must_use]
    pub fn background(&self) -> Option<&Scenario> {
        self.children
            .iter()
            .find(|child| child.kind == ScenarioKind::Background)
    }
}

/// A feature annotated with its load-time skip flag and direct dependencies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippableFeature {
    /// The underlying feature.
    pub feature: Feature,
    /// Whether the feature is skipped (`@Skip`, or excluded by `@Only`).
    pub skip: bool,
    /// Names of the features this one must run after, in load order.
    pub depends_on: Vec<String>,
}

impl SkippableFeature {
    /// The feature name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.feature.name
    }
}

fn normalise_tags(tags: &[String]) -> Vec<String> {
    tags.iter()
        .map(|tag| tag.trim_start_matches('@').to_owned())
        .collect()
}
