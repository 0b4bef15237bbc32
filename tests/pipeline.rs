use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime};
use org_tally::parse::load_outline;
use org_tally::records::{flatten_outline, ClockMode};
use org_tally::report::{build_report, Category, CategoryMatcher, ReportOptions};
use org_tally::timeline::{expand_records, filter_window, ReportWindow};
use std::io::Write;

const LOG: &str = concat!(
    "* 2018-03-04\n",
    "** Sleep  :REST:\n",
    "   CLOCK: [2018-03-04 Sun 23:00]--[2018-03-04 Sun 23:59] =>  0:59\n",
    "   CLOCK: [2018-03-05 Mon 00:00]--[2018-03-05 Mon 07:00] =>  7:00\n",
    "** Deep work  :WORK:STUDYING:\n",
    "   CLOCK: [2018-03-04 Sun 09:00]--[2018-03-04 Sun 10:59] =>  2:00\n",
    "** Forgot to clock  :MISC:\n",
    "* 2018-03-05\n",
    "** Standup  :WORK:\n",
    "   CLOCK: [2018-03-05 Mon 09:30]--[2018-03-05 Mon 09:45] =>  0:15\n",
);

fn name_query(pattern: &str) -> Category {
    Category {
        label: pattern.to_string(),
        matcher: CategoryMatcher::Name(pattern.to_string()),
    }
}

fn tag_query(pattern: &str) -> Category {
    Category {
        label: pattern.to_string(),
        matcher: CategoryMatcher::Tag(pattern.to_string()),
    }
}

fn dt(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
}

fn write_log() -> Result<tempfile::NamedTempFile> {
    let mut file = tempfile::NamedTempFile::new()?;
    file.write_all(LOG.as_bytes())?;
    Ok(file)
}

#[test]
fn day_window_sleep_query_counts_one_hour() -> Result<()> {
    let file = write_log()?;
    let root = load_outline(file.path())?;

    // Only the first clock entry survives flattening, so Sleep is 23:00--23:59
    let records = flatten_outline(&root, ClockMode::FirstOnly);
    let sleep = records.iter().find(|r| r.name == "Sleep").unwrap();
    assert_eq!(sleep.end, dt("2018-03-04 23:59"));
    assert_eq!(
        expand_records(std::slice::from_ref(sleep)).len(),
        60
    );

    let rows = expand_records(&records);
    let now = dt("2018-03-04 23:30");
    let (start, end) = ReportWindow::Day.bounds(now);
    let rows = filter_window(rows, start, end);

    let table = build_report(
        &rows,
        &[name_query("Sleep")],
        &ReportWindow::Day.days(now),
        ReportOptions {
            zero_fill: true,
            merge_overlaps: false,
        },
    );
    let sunday = table
        .rows
        .iter()
        .find(|row| row.date == NaiveDate::from_ymd_opt(2018, 3, 4).unwrap())
        .unwrap();
    assert_eq!(sunday.weekday, "Sunday");
    assert_eq!(sunday.hours, vec![Some(1.0)]);

    Ok(())
}

#[test]
fn discarded_second_tag_is_invisible_to_tag_queries() -> Result<()> {
    let file = write_log()?;
    let root = load_outline(file.path())?;
    let records = flatten_outline(&root, ClockMode::FirstOnly);
    let rows = expand_records(&records);

    let now = dt("2018-03-04 12:00");
    let (start, end) = ReportWindow::Day.bounds(now);
    let rows = filter_window(rows, start, end);

    let table = build_report(
        &rows,
        &[tag_query("STUDYING"), tag_query("WORK")],
        &ReportWindow::Day.days(now),
        ReportOptions {
            zero_fill: true,
            merge_overlaps: false,
        },
    );

    // Deep work's second tag was dropped by the flattener, so STUDYING sees nothing while WORK
    // sees the full 09:00--10:59 interval (120 minutes inclusive)
    for row in &table.rows {
        assert_eq!(row.hours[0], Some(0.0));
    }
    let sunday = table
        .rows
        .iter()
        .find(|row| row.date == NaiveDate::from_ymd_opt(2018, 3, 4).unwrap())
        .unwrap();
    assert_eq!(sunday.hours[1], Some(2.0));

    Ok(())
}

#[test]
fn unclocked_items_drop_but_the_run_completes() -> Result<()> {
    let file = write_log()?;
    let root = load_outline(file.path())?;
    let records = flatten_outline(&root, ClockMode::FirstOnly);

    assert!(!records.iter().any(|r| r.name == "Forgot to clock"));
    assert_eq!(records.len(), 3);

    Ok(())
}

#[test]
fn week_report_has_seven_weekday_rows() -> Result<()> {
    let file = write_log()?;
    let root = load_outline(file.path())?;
    let records = flatten_outline(&root, ClockMode::FirstOnly);
    let rows = expand_records(&records);

    // 2018-03-05 was a Monday; the Sunday sleep falls in the previous ISO week
    let now = dt("2018-03-07 10:00");
    let (start, end) = ReportWindow::Week.bounds(now);
    let rows = filter_window(rows, start, end);

    let table = build_report(
        &rows,
        &[tag_query("WORK"), name_query("Sleep")],
        &ReportWindow::Week.days(now),
        ReportOptions {
            zero_fill: true,
            merge_overlaps: false,
        },
    );

    assert_eq!(table.rows.len(), 7);
    assert_eq!(
        table
            .rows
            .iter()
            .map(|row| row.weekday.as_str())
            .collect::<Vec<_>>(),
        [
            "Monday",
            "Tuesday",
            "Wednesday",
            "Thursday",
            "Friday",
            "Saturday",
            "Sunday"
        ]
    );
    // Standup 09:30--09:45 inclusive is 16 minutes
    assert_eq!(table.rows[0].hours, vec![Some(0.27), Some(0.0)]);

    Ok(())
}

#[test]
fn missing_file_is_a_fatal_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(load_outline(&dir.path().join("nonexistent.org")).is_err());
}
