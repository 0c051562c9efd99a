//! Report rendering: stable JSON for machines, categorized text for humans.

use crate::domain::DualTestResult;
use crate::report::{ReportSummary, Verdict};

const RULE: &str =
    "================================================================================";

/// Pretty JSON with the stable field names of [`ReportSummary`].
pub fn render_json(summary: &ReportSummary) -> serde_json::Result<String> {
    serde_json::to_string_pretty(summary)
}

fn verdict_line(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Safe => "SAFE - No regressions detected",
        Verdict::Unsafe => "UNSAFE - Regressions found!",
        Verdict::Inconclusive => "INCONCLUSIVE - Some tests had errors",
        Verdict::Broken => "BROKEN - All modules are failing",
    }
}

fn push_section<F>(out: &mut String, title: &str, modules: &[DualTestResult], mut detail: F)
where
    F: FnMut(&DualTestResult) -> Vec<String>,
{
    if modules.is_empty() {
        return;
    }
    out.push_str(title);
    out.push('\n');
    for m in modules {
        out.push_str(&format!("   - {}\n", m.module));
        for line in detail(m) {
            out.push_str(&format!("     {}\n", line));
        }
    }
    out.push('\n');
}

/// Categorized human-readable report.
///
/// With `verbose`, per-ref error text is shown and passing modules are listed.
pub fn render_human(summary: &ReportSummary, verbose: bool) -> String {
    let mut out = String::new();
    out.push_str(RULE);
    out.push_str("\nGRATER TEST REPORT\n");
    out.push_str(RULE);
    out.push('\n');
    out.push_str(&format!("Base ref:  {}\n", summary.base_ref));
    out.push_str(&format!("Head ref:  {}\n", summary.head_ref));
    out.push_str(&format!("Modules tested: {}\n\n", summary.total_modules));
    out.push_str(&format!("Overall Status: {}\n\n", verdict_line(summary.status)));

    push_section(
        &mut out,
        "REGRESSIONS (base passed, head failed):",
        &summary.regressions,
        |r| {
            let mut lines = Vec::new();
            if verbose && !r.head.error.is_empty() {
                lines.push(format!("Error: {}", r.head.error));
            }
            lines
        },
    );

    push_section(&mut out, "FIXED (base failed, head passed):", &summary.fixed, |r| {
        let mut lines = Vec::new();
        if verbose && !r.base.error.is_empty() {
            lines.push(format!("Base error: {}", r.base.error));
        }
        lines
    });

    push_section(&mut out, "STILL BROKEN (both refs fail):", &summary.broken, |r| {
        let mut lines = Vec::new();
        if verbose {
            if !r.base.error.is_empty() {
                lines.push(format!("Base error: {}", r.base.error));
            }
            if !r.head.error.is_empty() {
                lines.push(format!("Head error: {}", r.head.error));
            }
        }
        lines
    });

    push_section(&mut out, "SKIPPED (timeout):", &summary.skipped, |r| {
        let mut lines = Vec::new();
        if verbose {
            if r.base.skipped {
                lines.push(format!("Base: {}", r.base.error));
            }
            if r.head.skipped {
                lines.push(format!("Head: {}", r.head.error));
            }
        }
        lines
    });

    push_section(&mut out, "ERRORS (test execution failed):", &summary.errors, |r| {
        let mut lines = Vec::new();
        if verbose {
            if r.base.failed_with_error() {
                lines.push(format!("Base: {}", r.base.error));
            }
            if r.head.failed_with_error() {
                lines.push(format!("Head: {}", r.head.error));
            }
        }
        lines
    });

    if verbose {
        push_section(&mut out, "PASSING (both refs work):", &summary.passed, |_| Vec::new());
    }

    out.push_str(RULE);
    out.push('\n');
    out.push_str(&format!(
        "Summary: {} total | {} passed | {} regressions | {} fixed | {} broken | {} skipped | {} errors\n",
        summary.total_modules,
        summary.passed.len(),
        summary.regressions.len(),
        summary.fixed.len(),
        summary.broken.len(),
        summary.skipped.len(),
        summary.errors.len(),
    ));
    out.push_str(RULE);
    out.push('\n');

    if summary.status.is_failure() {
        out.push_str("\nREGRESSIONS DETECTED - Check the report above\n");
    }
    out
}
