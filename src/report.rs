use crate::timeline::MinuteRow;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// How the rows belonging to a category are selected.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum CategoryMatcher {
    /// Rows whose name contains the given substring (case-sensitive, unanchored).
    Name(String),
    /// Rows whose tag contains the given substring (case-sensitive, unanchored).
    Tag(String),
}

/// A labelled category of activity to report a column for.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Category {
    /// The column label in the final table.
    pub label: String,
    /// How rows are matched into this category.
    pub matcher: CategoryMatcher,
}
impl Category {
    /// Whether the given row belongs to this category.
    pub fn matches(&self, row: &MinuteRow) -> bool {
        match &self.matcher {
            CategoryMatcher::Name(pattern) => row.name.contains(pattern.as_str()),
            CategoryMatcher::Tag(pattern) => row.tag.contains(pattern.as_str()),
        }
    }
}

/// Options guiding how the aggregate table is built.
#[derive(Debug, Clone, Copy)]
pub struct ReportOptions {
    /// Give every calendar day in the window a row, with 0.00 for days without matches, instead
    /// of leaving such days out.
    pub zero_fill: bool,
    /// Count each distinct minute at most once per category, so overlapping clock entries can't
    /// inflate the totals past wall-clock time.
    pub merge_overlaps: bool,
}

/// Converts a count of minutes to hours, rounded to two decimals.
pub fn minutes_to_hours(minutes: u32) -> f64 {
    (f64::from(minutes) / 60.0 * 100.0).round() / 100.0
}

/// Counts the matching minutes of each calendar day for the given category.
pub fn daily_minutes(
    rows: &[MinuteRow],
    category: &Category,
    merge_overlaps: bool,
) -> BTreeMap<NaiveDate, u32> {
    let mut by_day = BTreeMap::new();
    if merge_overlaps {
        let distinct: BTreeSet<NaiveDateTime> = rows
            .iter()
            .filter(|row| category.matches(row))
            .map(|row| row.timestamp)
            .collect();
        for timestamp in distinct {
            *by_day.entry(timestamp.date()).or_insert(0) += 1;
        }
    } else {
        for row in rows.iter().filter(|row| category.matches(row)) {
            *by_day.entry(row.timestamp.date()).or_insert(0) += 1;
        }
    }

    by_day
}

/// One row of the aggregate table: a calendar day and the hours each category logged on it.
#[derive(Serialize, Debug, PartialEq, Clone)]
pub struct ReportRow {
    /// The calendar day this row covers.
    pub date: NaiveDate,
    /// The day's weekday name, used as the row label for display.
    pub weekday: String,
    /// Hours per category, in column order. `None` marks a day the category didn't appear on,
    /// which only occurs when zero-filling is off.
    pub hours: Vec<Option<f64>>,
}

/// The aggregate table: one column per requested category, one row per day.
#[derive(Serialize, Debug, PartialEq, Clone)]
pub struct ReportTable {
    /// The column labels, in the order the categories were requested.
    pub columns: Vec<String>,
    /// The rows, in chronological order.
    pub rows: Vec<ReportRow>,
}

/// Builds the aggregate table from the filtered per-minute rows: each category's minutes are
/// tallied per day, converted to hours, and joined side-by-side over the union of days (or the
/// window's full day range when zero-filling).
pub fn build_report(
    rows: &[MinuteRow],
    categories: &[Category],
    window_days: &[NaiveDate],
    options: ReportOptions,
) -> ReportTable {
    let tallies: Vec<BTreeMap<NaiveDate, u32>> = categories
        .iter()
        .map(|category| daily_minutes(rows, category, options.merge_overlaps))
        .collect();

    let dates: Vec<NaiveDate> = if options.zero_fill {
        window_days.to_vec()
    } else {
        tallies
            .iter()
            .flat_map(|tally| tally.keys().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    };

    let rows = dates
        .into_iter()
        .map(|date| ReportRow {
            weekday: date.format("%A").to_string(),
            hours: tallies
                .iter()
                .map(|tally| match tally.get(&date) {
                    Some(minutes) => Some(minutes_to_hours(*minutes)),
                    None if options.zero_fill => Some(0.0),
                    None => None,
                })
                .collect(),
            date,
        })
        .collect();

    ReportTable {
        columns: categories.iter().map(|c| c.label.clone()).collect(),
        rows,
    }
}

/// The total hours logged against one tag over the window.
#[derive(Serialize, Debug, PartialEq, Clone)]
pub struct TagTotal {
    /// The tag, verbatim.
    pub tag: String,
    /// Hours logged, rounded to two decimals.
    pub hours: f64,
}

/// A per-tag summary of the window, sorted by tag.
#[derive(Serialize, Debug, PartialEq, Clone)]
pub struct TagReport {
    pub totals: Vec<TagTotal>,
}

/// Tallies total hours per tag across the filtered rows.
pub fn tag_totals(rows: &[MinuteRow]) -> TagReport {
    let mut minutes: BTreeMap<&str, u32> = BTreeMap::new();
    for row in rows {
        *minutes.entry(row.tag).or_insert(0) += 1;
    }

    TagReport {
        totals: minutes
            .into_iter()
            .map(|(tag, minutes)| TagTotal {
                tag: tag.to_string(),
                hours: minutes_to_hours(minutes),
            })
            .collect(),
    }
}

/// The final report in either shape, ready to encode.
#[derive(Serialize, Debug, PartialEq, Clone)]
#[serde(untagged)]
pub enum Report {
    Table(ReportTable),
    Tags(TagReport),
}
impl Report {
    /// Renders the report as an aligned plain-text table.
    pub fn render_text(&self) -> String {
        match self {
            Self::Table(table) => table.render_text(),
            Self::Tags(tags) => tags.render_text(),
        }
    }

    /// Renders the report as an HTML table.
    pub fn render_html(&self) -> String {
        match self {
            Self::Table(table) => table.render_html(),
            Self::Tags(tags) => tags.render_html(),
        }
    }
}

impl ReportTable {
    pub fn render_text(&self) -> String {
        let widths: Vec<usize> = self.columns.iter().map(|label| label.len().max(6)).collect();

        // "Wednesday" is the longest weekday name
        let mut out = format!("{:<9}", "");
        for (label, &width) in self.columns.iter().zip(&widths) {
            out.push_str(&format!("  {label:>width$}"));
        }
        for row in &self.rows {
            out.push_str(&format!("\n{:<9}", row.weekday));
            for (cell, &width) in row.hours.iter().zip(&widths) {
                match cell {
                    Some(hours) => out.push_str(&format!("  {hours:>width$.2}")),
                    None => out.push_str(&format!("  {:>width$}", "NaN")),
                }
            }
        }

        out
    }

    pub fn render_html(&self) -> String {
        let mut out = String::from("<table border=\"1\" class=\"dataframe\">\n  <thead>\n    <tr>\n      <th></th>\n");
        for label in &self.columns {
            out.push_str(&format!("      <th>{}</th>\n", escape_html(label)));
        }
        out.push_str("    </tr>\n  </thead>\n  <tbody>\n");
        for row in &self.rows {
            out.push_str(&format!("    <tr>\n      <th>{}</th>\n", row.weekday));
            for cell in &row.hours {
                match cell {
                    Some(hours) => out.push_str(&format!("      <td>{hours:.2}</td>\n")),
                    None => out.push_str("      <td>NaN</td>\n"),
                }
            }
            out.push_str("    </tr>\n");
        }
        out.push_str("  </tbody>\n</table>");

        out
    }
}

impl TagReport {
    pub fn render_text(&self) -> String {
        let width = self
            .totals
            .iter()
            .map(|total| total.tag.len())
            .max()
            .unwrap_or(0)
            .max(3);

        let mut out = format!("{:<width$}  {:>6}", "tag", "hours");
        for total in &self.totals {
            out.push_str(&format!("\n{:<width$}  {:>6.2}", total.tag, total.hours));
        }

        out
    }

    pub fn render_html(&self) -> String {
        let mut out = String::from(
            "<table border=\"1\" class=\"dataframe\">\n  <thead>\n    <tr>\n      <th>tag</th>\n      <th>hours</th>\n    </tr>\n  </thead>\n  <tbody>\n",
        );
        for total in &self.totals {
            out.push_str(&format!(
                "    <tr>\n      <th>{}</th>\n      <td>{:.2}</td>\n    </tr>\n",
                escape_html(&total.tag),
                total.hours
            ));
        }
        out.push_str("  </tbody>\n</table>");

        out
    }
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
