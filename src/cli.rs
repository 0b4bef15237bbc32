use crate::report::{Category, CategoryMatcher};
use crate::timeline::ReportWindow;
use anyhow::{bail, Error};
use chrono::NaiveDateTime;
use clap::{Parser, ValueEnum};
use std::{path::PathBuf, str::FromStr};

/// Tallies clocked time from an outline-structured time log into hours-per-day reports.
#[derive(Parser, Debug)]
pub struct Cli {
    /// The outline log file to analyse.
    pub file: PathBuf,

    #[command(flatten)]
    pub queries: QueryOptions,

    /// The window to report over.
    #[arg(short, long, default_value = "week")]
    pub window: ReportWindow,
    /// The reference time anchoring the window, as `YYYY-MM-DDTHH:MM:SS`. Defaults to the current
    /// local time.
    #[arg(long)]
    pub now: Option<NaiveDateTime>,
    /// Which encoding to output.
    #[arg(short, long, default_value = "text")]
    pub encoding: Encoding,
    /// Leave days with no matching minutes out of the table instead of zero-filling them.
    #[arg(long)]
    pub sparse: bool,
    /// Count each minute at most once per category, so overlapping clock entries can't push a
    /// day's total past wall-clock time.
    #[arg(long)]
    pub merge_overlaps: bool,
    /// Turn every clock entry on an item into its own record, instead of only the first.
    #[arg(long)]
    pub all_clocks: bool,
}
impl Cli {
    /// Assembles the requested categories, name queries first, otherwise in the order given.
    pub fn categories(&self) -> Vec<Category> {
        let names = self.queries.names.iter().map(|spec| Category {
            label: spec.label.clone(),
            matcher: CategoryMatcher::Name(spec.pattern.clone()),
        });
        let tags = self.queries.tags.iter().map(|spec| Category {
            label: spec.label.clone(),
            matcher: CategoryMatcher::Tag(spec.pattern.clone()),
        });

        names.chain(tags).collect()
    }
}

/// Options selecting what gets reported: category columns built from name/tag queries, or a
/// per-tag summary of the whole window.
#[derive(Parser, Debug)]
#[group(required = true, multiple = true)]
pub struct QueryOptions {
    /// Adds a category of items whose names contain the given substring (`label=substring` to set
    /// the column label).
    #[arg(short, long = "name")]
    pub names: Vec<CategorySpec>,
    /// Adds a category of items whose tag contains the given substring (`label=substring` to set
    /// the column label).
    #[arg(short, long = "tag")]
    pub tags: Vec<CategorySpec>,
    /// Reports total hours per tag over the window instead of category columns.
    #[arg(long = "tags", conflicts_with_all = ["names", "tags"])]
    pub tag_summary: bool,
}

/// The encoding to use for the output of the CLI.
#[derive(ValueEnum, Clone, Debug)]
#[clap(rename_all = "snake_case")]
pub enum Encoding {
    /// An aligned plain-text table, the default encoding.
    Text,
    /// An HTML table, for embedding the report in a page.
    Html,
    /// JSON, for passing the report to other tooling.
    Json,
    /// Bincode, which is *much* faster to handle if passing output to another Rust program.
    Bincode,
}

/// A category query: a substring to match and the label its column gets in the report. Parsed
/// from `substring` or `label=substring`.
#[derive(Clone, Debug)]
pub struct CategorySpec {
    pub label: String,
    pub pattern: String,
}
impl FromStr for CategorySpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((label, pattern)) if !label.is_empty() && !pattern.is_empty() => Ok(Self {
                label: label.to_string(),
                pattern: pattern.to_string(),
            }),
            Some(_) => bail!("expected `substring` or `label=substring`, got `{s}`"),
            None => Ok(Self {
                label: s.to_string(),
                pattern: s.to_string(),
            }),
        }
    }
}
