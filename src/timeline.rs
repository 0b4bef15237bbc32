use crate::records::FlatRecord;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use clap::ValueEnum;

/// One minute of elapsed activity on a record.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct MinuteRow<'a> {
    /// The minute this row covers. Minute-aligned.
    pub timestamp: NaiveDateTime,
    /// The name of the record this minute belongs to.
    pub name: &'a str,
    /// The tag of the record this minute belongs to.
    pub tag: &'a str,
}

/// Expands each record into one row per minute of the closed interval `[start, end]`, so a record
/// with `start == end` still produces one row. Rows from all records are concatenated as-is:
/// overlapping records yield duplicate minutes, which the aggregation stage counts separately
/// unless asked to merge them.
pub fn expand_records(records: &[FlatRecord]) -> Vec<MinuteRow<'_>> {
    let mut rows = Vec::new();
    for record in records {
        let mut timestamp = record.start;
        while timestamp <= record.end {
            rows.push(MinuteRow {
                timestamp,
                name: &record.name,
                tag: &record.tag,
            });
            timestamp += Duration::minutes(1);
        }
    }

    rows
}

/// The span of time a report covers, relative to a reference time.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
#[clap(rename_all = "snake_case")]
pub enum ReportWindow {
    /// The 24 hours ending at the reference time's date, 23:59:59.
    Day,
    /// The ISO calendar week containing the reference time: Monday 00:00:00 through Sunday
    /// 23:59:59. Not a rolling seven days.
    Week,
}
impl ReportWindow {
    /// Computes the inclusive bounds of this window around the given reference time.
    pub fn bounds(&self, now: NaiveDateTime) -> (NaiveDateTime, NaiveDateTime) {
        match self {
            Self::Day => {
                let end = now.date().and_hms_opt(23, 59, 59).unwrap();
                (end - Duration::days(1), end)
            }
            Self::Week => {
                let monday =
                    now.date() - Duration::days(now.weekday().num_days_from_monday() as i64);
                let end = (monday + Duration::days(6)).and_hms_opt(23, 59, 59).unwrap();
                (monday.and_time(NaiveTime::MIN), end)
            }
        }
    }

    /// The calendar days this window touches, in order. These become the rows of a zero-filled
    /// report.
    pub fn days(&self, now: NaiveDateTime) -> Vec<NaiveDate> {
        let (start, end) = self.bounds(now);
        let mut days = Vec::new();
        let mut date = start.date();
        while date <= end.date() {
            days.push(date);
            date = date.succ_opt().unwrap();
        }

        days
    }
}

/// Drops every row whose timestamp falls outside `[start, end]` (inclusive both ends).
pub fn filter_window(
    mut rows: Vec<MinuteRow<'_>>,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Vec<MinuteRow<'_>> {
    rows.retain(|row| row.timestamp >= start && row.timestamp <= end);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn record(start: &str, end: &str) -> FlatRecord {
        let start = NaiveDateTime::parse_from_str(start, "%Y-%m-%d %H:%M").unwrap();
        let end = NaiveDateTime::parse_from_str(end, "%Y-%m-%d %H:%M").unwrap();
        FlatRecord {
            name: "Sleep".to_string(),
            tag: "REST".to_string(),
            start,
            end,
            duration: end - start,
        }
    }

    #[test]
    fn expansion_covers_the_closed_interval() {
        let records = vec![record("2018-03-04 23:00", "2018-03-04 23:59")];
        let rows = expand_records(&records);

        assert_eq!(rows.len(), 60);
        assert_eq!(rows[0].timestamp, records[0].start);
        assert_eq!(rows.last().unwrap().timestamp, records[0].end);
        for pair in rows.windows(2) {
            assert_eq!(pair[1].timestamp - pair[0].timestamp, Duration::minutes(1));
        }
    }

    #[test]
    fn zero_length_interval_produces_one_row() {
        let records = vec![record("2018-03-04 23:00", "2018-03-04 23:00")];
        assert_eq!(expand_records(&records).len(), 1);
    }

    #[test]
    fn day_window_spans_exactly_24_hours() {
        // A mid-afternoon reference time still anchors the window to the end of its date
        let now = NaiveDateTime::parse_from_str("2018-03-07 14:23", "%Y-%m-%d %H:%M").unwrap();
        let (start, end) = ReportWindow::Day.bounds(now);

        assert_eq!(end, now.date().and_hms_opt(23, 59, 59).unwrap());
        assert_eq!(end - start, Duration::days(1));
        assert_eq!(ReportWindow::Day.days(now).len(), 2);
    }

    #[test]
    fn week_window_is_the_iso_week_for_any_weekday() {
        // 2018-03-05 was a Monday
        for day in 5..=11 {
            let now = NaiveDate::from_ymd_opt(2018, 3, day)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap();
            let (start, end) = ReportWindow::Week.bounds(now);

            assert_eq!(start.date(), NaiveDate::from_ymd_opt(2018, 3, 5).unwrap());
            assert_eq!(start.time(), NaiveTime::MIN);
            assert_eq!(start.weekday(), Weekday::Mon);
            assert_eq!(end.date(), NaiveDate::from_ymd_opt(2018, 3, 11).unwrap());
            assert_eq!(end.weekday(), Weekday::Sun);
            assert_eq!(end.time(), NaiveTime::from_hms_opt(23, 59, 59).unwrap());
            assert_eq!(ReportWindow::Week.days(now).len(), 7);
        }
    }

    #[test]
    fn window_filter_is_inclusive_at_both_ends() {
        let records = vec![record("2018-03-05 09:00", "2018-03-05 11:00")];
        let rows = expand_records(&records);

        let start = NaiveDateTime::parse_from_str("2018-03-05 09:00", "%Y-%m-%d %H:%M").unwrap();
        let end = NaiveDateTime::parse_from_str("2018-03-05 11:00", "%Y-%m-%d %H:%M").unwrap();
        let kept = filter_window(rows.clone(), start, end);
        assert_eq!(kept.len(), rows.len());

        let kept = filter_window(rows, start + Duration::minutes(1), end - Duration::minutes(1));
        assert_eq!(kept.len(), 119);
    }
}
