//! Output formatting.

use crate::cli::OutputFormat;
use crate::line_index::{LineCol, LineIndex};
use fontface_analyzer::{AnalyzeError, FamilyStats};
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt::Write as _;

/// The result of analyzing one input.
#[derive(Debug)]
pub struct InputReport {
    /// How the input is shown to the user.
    pub source: String,
    pub outcome: Result<FamilyStats, InputFailure>,
}

/// Why an input produced no statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFailure {
    pub message: String,
    /// Where in the input the problem is, when it came from analysis.
    pub position: Option<LineCol>,
    /// The source line at `position`.
    pub line_text: Option<String>,
}

impl InputFailure {
    /// A failure with no source location, such as an I/O error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            position: None,
            line_text: None,
        }
    }

    /// Locates an analysis error in the text it came from.
    pub fn from_analyze_error(error: &AnalyzeError, text: &str) -> Self {
        let index = LineIndex::new(text);
        let position = index.line_col(u32::from(error.span().start) as usize);
        Self {
            message: error.to_string(),
            line_text: position
                .and_then(|pos| index.line_text(pos.line))
                .map(str::to_string),
            position,
        }
    }
}

impl InputReport {
    pub fn is_failure(&self) -> bool {
        self.outcome.is_err()
    }
}

/// A report in JSON output.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub source: &'a str,
    /// Per-rule counts by family. Empty when the input failed.
    pub families: IndexMap<&'a str, &'a [u64]>,
    /// Summed counts by family.
    pub totals: IndexMap<&'a str, u64>,
    pub error: Option<JsonError<'a>>,
}

/// A failure in JSON output.
#[derive(Debug, Serialize)]
pub struct JsonError<'a> {
    pub message: &'a str,
    /// 1-indexed, absent when the failure has no location.
    pub line: Option<u32>,
    pub column: Option<u32>,
}

/// Formats reports for output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a collection of reports.
    pub fn format(&self, reports: &[InputReport]) -> String {
        match self.format {
            OutputFormat::Human => self.format_human(reports, false),
            OutputFormat::HumanVerbose => self.format_human(reports, true),
            OutputFormat::Json => self.format_json(reports),
            OutputFormat::Machine => self.format_machine(reports),
        }
    }

    /// Whether this format ends with a summary line.
    pub fn shows_summary(&self) -> bool {
        matches!(self.format, OutputFormat::Human | OutputFormat::HumanVerbose)
    }

    /// Formats as human-readable output, with snippets when `verbose`.
    fn format_human(&self, reports: &[InputReport], verbose: bool) -> String {
        let mut output = String::new();

        for report in reports {
            let _ = writeln!(output, "{}", report.source);
            match &report.outcome {
                Ok(stats) if stats.is_empty() => {
                    output.push_str("  no @font-face rules with a font-family\n");
                }
                Ok(stats) => {
                    for summary in stats.summaries() {
                        let _ = writeln!(
                            output,
                            "  {}: {} {}, {} code {}",
                            summary.family,
                            summary.chunks.len(),
                            plural(summary.chunks.len() as u64, "rule", "rules"),
                            summary.total,
                            plural(summary.total, "point", "points"),
                        );
                        let chunks: Vec<String> =
                            summary.chunks.iter().map(u64::to_string).collect();
                        let _ = writeln!(output, "    {}", chunks.join(", "));
                    }
                }
                Err(failure) => {
                    let _ = write!(output, "  Error: {}", failure.message);
                    if let Some(pos) = failure.position {
                        let _ = write!(output, " ({}:{})", pos.line, pos.column);
                    }
                    output.push('\n');
                    if verbose {
                        push_snippet(&mut output, failure);
                    }
                }
            }
            output.push('\n');
        }

        output
    }

    /// Formats as JSON output.
    fn format_json(&self, reports: &[InputReport]) -> String {
        let formatted = Self::format_json_reports(reports);
        let mut output = serde_json::to_string_pretty(&formatted).unwrap_or_default();
        output.push('\n');
        output
    }

    /// Formats reports into JSON-ready structs.
    pub fn format_json_reports(reports: &[InputReport]) -> Vec<JsonReport<'_>> {
        reports
            .iter()
            .map(|report| match &report.outcome {
                Ok(stats) => JsonReport {
                    source: &report.source,
                    families: stats
                        .iter()
                        .map(|(family, chunks)| (family.as_str(), chunks.as_slice()))
                        .collect(),
                    totals: stats
                        .families()
                        .map(|family| (family, stats.total(family).unwrap_or_default()))
                        .collect(),
                    error: None,
                },
                Err(failure) => JsonReport {
                    source: &report.source,
                    families: IndexMap::new(),
                    totals: IndexMap::new(),
                    error: Some(JsonError {
                        message: &failure.message,
                        line: failure.position.map(|pos| pos.line),
                        column: failure.position.map(|pos| pos.column),
                    }),
                },
            })
            .collect()
    }

    /// Formats as machine-readable output.
    fn format_machine(&self, reports: &[InputReport]) -> String {
        let mut output = String::new();

        for report in reports {
            match &report.outcome {
                Ok(stats) => {
                    for summary in stats.summaries() {
                        let chunks: Vec<String> =
                            summary.chunks.iter().map(u64::to_string).collect();
                        let _ = writeln!(
                            output,
                            "{}\t{}\t{}\t{}\t{}",
                            report.source,
                            summary.family,
                            summary.chunks.len(),
                            summary.total,
                            chunks.join(",")
                        );
                    }
                }
                Err(failure) => {
                    let _ = match failure.position {
                        Some(pos) => writeln!(
                            output,
                            "ERROR {}:{}:{} {}",
                            report.source, pos.line, pos.column, failure.message
                        ),
                        None => writeln!(output, "ERROR {} {}", report.source, failure.message),
                    };
                }
            }
        }

        output
    }
}

fn push_snippet(output: &mut String, failure: &InputFailure) {
    let (Some(pos), Some(line)) = (failure.position, failure.line_text.as_deref()) else {
        return;
    };
    let gutter = pos.line.to_string();
    let _ = writeln!(output, "  {} | {}", gutter, line);
    let _ = writeln!(
        output,
        "  {} | {}^",
        " ".repeat(gutter.len()),
        " ".repeat(pos.column as usize - 1)
    );
}

fn plural(count: u64, one: &'static str, many: &'static str) -> &'static str {
    if count == 1 {
        one
    } else {
        many
    }
}

/// Summary of a run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of inputs analyzed.
    pub input_count: usize,
    /// Number of inputs that failed.
    pub failed_count: usize,
    /// Number of distinct families across all inputs.
    pub family_count: usize,
}

impl RunSummary {
    pub fn from_reports(reports: &[InputReport]) -> Self {
        let mut families: Vec<&str> = reports
            .iter()
            .filter_map(|report| report.outcome.as_ref().ok())
            .flat_map(FamilyStats::families)
            .collect();
        families.sort_unstable();
        families.dedup();

        Self {
            input_count: reports.len(),
            failed_count: reports.iter().filter(|r| r.is_failure()).count(),
            family_count: families.len(),
        }
    }

    /// Formats the summary line.
    pub fn format(&self) -> String {
        format!(
            "====================================\nfontface-stats analyzed {} {}: {} {}, {} failed",
            self.input_count,
            plural(self.input_count as u64, "input", "inputs"),
            self.family_count,
            plural(self.family_count as u64, "family", "families"),
            self.failed_count
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fontface_analyzer::analyze;
    use pretty_assertions::assert_eq;

    fn ok_report(source: &str, css: &str) -> InputReport {
        InputReport {
            source: source.to_string(),
            outcome: Ok(analyze(css).unwrap()),
        }
    }

    fn failed_report(source: &str, css: &str) -> InputReport {
        let error = analyze(css).unwrap_err();
        InputReport {
            source: source.to_string(),
            outcome: Err(InputFailure::from_analyze_error(&error, css)),
        }
    }

    const INTER: &str = "@font-face { font-family: 'Inter'; unicode-range: U+0000-00FF; }
@font-face { font-family: 'Inter'; unicode-range: U+0131, U+0152-0153; }";

    const BROKEN: &str = "@font-face {\n  font-family: 'A';\n  unicode-range: U+0300-0200;\n}";

    #[test]
    fn test_format_human() {
        let formatter = Formatter::new(OutputFormat::Human);
        let output = formatter.format(&[ok_report("inter.css", INTER)]);
        assert_eq!(
            output,
            "inter.css\n  Inter: 2 rules, 259 code points\n    256, 3\n\n"
        );
    }

    #[test]
    fn test_format_human_failure() {
        let formatter = Formatter::new(OutputFormat::Human);
        let output = formatter.format(&[failed_report("broken.css", BROKEN)]);
        insta::assert_snapshot!(
            output.lines().nth(1).unwrap(),
            @"  Error: invalid unicode-range `U+0300-0200`: start U+300 is greater than end U+200 (3:18)"
        );
        assert!(!output.contains('^'));
    }

    #[test]
    fn test_format_human_verbose_snippet() {
        let formatter = Formatter::new(OutputFormat::HumanVerbose);
        let output = formatter.format(&[failed_report("broken.css", BROKEN)]);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[2], "  3 |   unicode-range: U+0300-0200;");
        assert_eq!(lines[3], "    |                  ^");
    }

    #[test]
    fn test_format_empty_stats() {
        let formatter = Formatter::new(OutputFormat::Human);
        let output = formatter.format(&[ok_report("plain.css", "a { color: red; }")]);
        assert!(output.contains("no @font-face rules"));
    }

    #[test]
    fn test_format_json() {
        let formatter = Formatter::new(OutputFormat::Json);
        let output = formatter.format(&[
            ok_report("inter.css", INTER),
            failed_report("broken.css", BROKEN),
            InputReport {
                source: "missing.css".to_string(),
                outcome: Err(InputFailure::new("failed to read missing.css")),
            },
        ]);
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(
            value,
            serde_json::json!([
                {
                    "source": "inter.css",
                    "families": { "Inter": [256, 3] },
                    "totals": { "Inter": 259 },
                    "error": null
                },
                {
                    "source": "broken.css",
                    "families": {},
                    "totals": {},
                    "error": {
                        "message": "invalid unicode-range `U+0300-0200`: start U+300 is greater than end U+200",
                        "line": 3,
                        "column": 18
                    }
                },
                {
                    "source": "missing.css",
                    "families": {},
                    "totals": {},
                    "error": { "message": "failed to read missing.css", "line": null, "column": null }
                }
            ])
        );
    }

    #[test]
    fn test_format_machine() {
        let formatter = Formatter::new(OutputFormat::Machine);
        let output = formatter.format(&[
            ok_report("inter.css", INTER),
            failed_report("broken.css", BROKEN),
            InputReport {
                source: "<stdin>".to_string(),
                outcome: Err(InputFailure::new("failed to read stdin")),
            },
        ]);
        assert_eq!(
            output,
            "inter.css\tInter\t2\t259\t256,3\n\
             ERROR broken.css:3:18 invalid unicode-range `U+0300-0200`: start U+300 is greater than end U+200\n\
             ERROR <stdin> failed to read stdin\n"
        );
    }

    #[test]
    fn test_summary() {
        let reports = [
            ok_report("a.css", INTER),
            ok_report("b.css", INTER),
            failed_report("c.css", BROKEN),
        ];
        let summary = RunSummary::from_reports(&reports);
        assert_eq!(
            summary,
            RunSummary {
                input_count: 3,
                failed_count: 1,
                family_count: 1,
            }
        );
        assert!(summary
            .format()
            .ends_with("fontface-stats analyzed 3 inputs: 1 family, 1 failed"));
    }
}
