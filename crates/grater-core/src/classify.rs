//! Deterministic classification of a dual result into a [`ModuleStatus`].
//!
//! Precedence, first match wins:
//! 1. either ref skipped → `Skipped`
//! 2. either ref failed with a non-empty error → `Error`
//! 3. `(base.passed, head.passed)` → `Pass` / `Regression` / `Fixed` / `Broken`
//!
//! Rule 2 masks the pass/fail comparison: a base-pass/head-fail pair whose
//! head carries error text is reported as `Error`, not `Regression`.

use crate::domain::{DualTestResult, ModuleStatus};

/// Classify one module's dual result.
pub fn classify(result: &DualTestResult) -> ModuleStatus {
    if result.base.skipped || result.head.skipped {
        return ModuleStatus::Skipped;
    }

    if result.base.failed_with_error() || result.head.failed_with_error() {
        return ModuleStatus::Error;
    }

    match (result.base.passed, result.head.passed) {
        (true, true) => ModuleStatus::Pass,
        (true, false) => ModuleStatus::Regression,
        (false, true) => ModuleStatus::Fixed,
        (false, false) => ModuleStatus::Broken,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RefOutcome;

    fn dual(base: RefOutcome, head: RefOutcome) -> DualTestResult {
        DualTestResult {
            module: "github.com/a/b".to_string(),
            base,
            head,
        }
    }

    fn outcome(passed: bool, error: &str, skipped: bool) -> RefOutcome {
        RefOutcome {
            git_ref: "r".to_string(),
            passed,
            error: error.to_string(),
            skipped,
        }
    }

    /// Reference encoding of the precedence rule, evaluated independently.
    fn expected(b: &RefOutcome, h: &RefOutcome) -> ModuleStatus {
        if b.skipped || h.skipped {
            ModuleStatus::Skipped
        } else if (!b.passed && !b.error.is_empty()) || (!h.passed && !h.error.is_empty()) {
            ModuleStatus::Error
        } else if b.passed && h.passed {
            ModuleStatus::Pass
        } else if b.passed {
            ModuleStatus::Regression
        } else if h.passed {
            ModuleStatus::Fixed
        } else {
            ModuleStatus::Broken
        }
    }

    #[test]
    fn test_precedence_holds_for_every_flag_combination() {
        let bools = [false, true];
        for &bs in &bools {
            for &hs in &bools {
                for &bp in &bools {
                    for &hp in &bools {
                        for &be in &bools {
                            for &he in &bools {
                                let b = outcome(bp, if be { "boom" } else { "" }, bs);
                                let h = outcome(hp, if he { "boom" } else { "" }, hs);
                                let got = classify(&dual(b.clone(), h.clone()));
                                assert_eq!(
                                    got,
                                    expected(&b, &h),
                                    "base={b:?} head={h:?}"
                                );
                            }
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_head_error_masks_regression() {
        let r = dual(RefOutcome::passed("main"), RefOutcome::failed("HEAD", "panic"));
        assert_eq!(classify(&r), ModuleStatus::Error);
    }

    #[test]
    fn test_plain_regression_without_error_text() {
        let r = dual(RefOutcome::passed("main"), outcome(false, "", false));
        assert_eq!(classify(&r), ModuleStatus::Regression);
    }

    #[test]
    fn test_skip_wins_over_error() {
        let r = dual(
            RefOutcome::skipped("main", "timeout after 600s"),
            RefOutcome::failed("HEAD", "panic"),
        );
        assert_eq!(classify(&r), ModuleStatus::Skipped);
    }

    #[test]
    fn test_error_text_on_passing_ref_is_ignored() {
        let r = dual(outcome(true, "warning: flaky", false), outcome(true, "", false));
        assert_eq!(classify(&r), ModuleStatus::Pass);
    }

    #[test]
    fn test_fixed_and_broken() {
        let fixed = dual(outcome(false, "", false), RefOutcome::passed("HEAD"));
        assert_eq!(classify(&fixed), ModuleStatus::Fixed);

        let broken = dual(outcome(false, "", false), outcome(false, "", false));
        assert_eq!(classify(&broken), ModuleStatus::Broken);
    }
}
