use anyhow::Result;
use clap::Parser;
use org_tally::cli::{Cli, Encoding};
use org_tally::parse::load_outline;
use org_tally::records::{flatten_outline, ClockMode};
use org_tally::report::{build_report, tag_totals, Report, ReportOptions};
use org_tally::timeline::{expand_records, filter_window};
use std::io::Write;
use tracing::debug;

fn main() -> Result<()> {
    org_tally::logging::enable_logging();
    let args = Cli::parse();

    // The reference time is an explicit pipeline input so reports are reproducible
    let now = args
        .now
        .unwrap_or_else(|| chrono::Local::now().naive_local());
    let clock_mode = if args.all_clocks {
        ClockMode::All
    } else {
        ClockMode::FirstOnly
    };

    let root = load_outline(&args.file)?;
    let records = flatten_outline(&root, clock_mode);
    let rows = expand_records(&records);
    let (start, end) = args.window.bounds(now);
    let rows = filter_window(rows, start, end);
    debug!("{} minute rows in window {start} -- {end}", rows.len());

    let report = if args.queries.tag_summary {
        Report::Tags(tag_totals(&rows))
    } else {
        Report::Table(build_report(
            &rows,
            &args.categories(),
            &args.window.days(now),
            ReportOptions {
                zero_fill: !args.sparse,
                merge_overlaps: args.merge_overlaps,
            },
        ))
    };

    match args.encoding {
        Encoding::Text => println!("{}", report.render_text()),
        Encoding::Html => println!("{}", report.render_html()),
        Encoding::Json => println!("{}", serde_json::to_string(&report)?),
        Encoding::Bincode => {
            let bytes = bincode::serialize(&report)?;
            std::io::stdout().write_all(&bytes)?;
            std::io::stdout().flush()?;
        }
    }

    Ok(())
}
