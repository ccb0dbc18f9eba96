//! Output rendering for domain-watchdog CLI.
//!
//! Text mode prints one line per domain, coloured when stdout is a terminal.
//! JSON mode prints the reports as a single array.

use console::{pad_str, style, Alignment};
use domain_watchdog_lib::{DomainReport, Outcome};
use std::time::Duration;

/// Render a single report as a text line.
pub fn format_report_line(report: &DomainReport, width: usize) -> String {
    let domain = pad_str(&report.domain, width, Alignment::Left, None);

    match (report.outcome, report.error.as_deref()) {
        (Some(Outcome::Registered), None) => format!(
            "{} {}  {}",
            style("✓").green().bold(),
            style(domain).bold(),
            style(Outcome::Registered.description()).dim()
        ),
        (Some(outcome), None) => format!(
            "{} {}  {}",
            style("!").yellow().bold(),
            style(domain).bold(),
            style(outcome.description()).yellow()
        ),
        (_, Some(error)) => format!(
            "{} {}  {}",
            style("?").red().bold(),
            style(domain).bold(),
            style(error).red()
        ),
        (None, None) => format!("{} {}", style("?").red().bold(), style(domain).bold()),
    }
}

/// Print all reports in text mode, followed by a summary for batches.
pub fn print_text_reports(reports: &[DomainReport], duration: Duration) {
    let width = reports
        .iter()
        .map(|r| console::measure_text_width(&r.domain))
        .max()
        .unwrap_or(0);

    for report in reports {
        println!("{}", format_report_line(report, width));
    }

    if reports.len() > 1 {
        println!();
        println!("{}", format_summary(reports, duration));
    }
}

/// One-line tally of a batch.
pub fn format_summary(reports: &[DomainReport], duration: Duration) -> String {
    let given = reports
        .iter()
        .filter(|r| !r.has_error() && r.outcome == Some(Outcome::Registered))
        .count();
    let errors = reports.iter().filter(|r| r.has_error()).count();
    let available = reports.len() - given - errors;

    format!(
        "{} {} given, {} available, {} unknown in {:.1}s",
        style("Summary:").bold(),
        style(given).green(),
        style(available).yellow(),
        style(errors).red(),
        duration.as_secs_f64()
    )
}

/// Print all reports as a pretty JSON array.
pub fn print_json_reports(reports: &[DomainReport]) -> Result<(), serde_json::Error> {
    let json = serde_json::to_string_pretty(reports)?;
    println!("{}", json);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(domain: &str, outcome: Option<Outcome>, error: Option<&str>) -> DomainReport {
        DomainReport {
            domain: domain.to_string(),
            outcome,
            error: error.map(str::to_string),
            duration_ms: 12,
        }
    }

    #[test]
    fn test_report_line_contents() {
        console::set_colors_enabled(false);

        let given = format_report_line(&report("example.com", Some(Outcome::Registered), None), 11);
        assert_eq!(given, "✓ example.com  domain is given");

        let free = format_report_line(&report("free.com", Some(Outcome::NotFound), None), 11);
        assert_eq!(free, "! free.com     domain not found");

        let failed = format_report_line(
            &report("down.com", None, Some("whois query error: refused")),
            8,
        );
        assert_eq!(failed, "? down.com  whois query error: refused");
    }

    #[test]
    fn test_summary_counts() {
        console::set_colors_enabled(false);

        let reports = vec![
            report("a.com", Some(Outcome::Registered), None),
            report("b.com", Some(Outcome::Unknown), None),
            report("c.com", Some(Outcome::Unknown), Some("whois response is empty")),
            report("d.com", None, Some("whois query error: refused")),
        ];

        assert_eq!(
            format_summary(&reports, Duration::from_millis(1500)),
            "Summary: 1 given, 1 available, 2 unknown in 1.5s"
        );
    }
}
