//! Submission outcome formatting.

use std::fmt;

use crate::{
    error::FormError,
    models::{Entity, Resource},
    submit::SubmitReport,
    wizard::SubmitResolution,
};

/// What a submission saved, and where it stopped if it did.
///
/// Records saved before a failure are listed as committed; nothing is rolled
/// back, so the output says so explicitly.
pub struct SubmitSummary<'a> {
    resource: Resource,
    created: &'a [Entity],
    failure: Option<(usize, &'a FormError)>,
    skipped: usize,
    interrupted: bool,
}

impl<'a> SubmitSummary<'a> {
    /// Summarises a report produced by [`crate::submit::submit_all`].
    pub fn report(resource: Resource, report: &'a SubmitReport) -> Self {
        Self {
            resource,
            created: &report.created,
            failure: report
                .failure
                .as_ref()
                .map(|failure| (failure.index, &failure.error)),
            skipped: report.skipped,
            interrupted: report.interrupted,
        }
    }

    /// Summarises the resolution of a wizard submission.
    pub fn resolution(resource: Resource, resolution: &'a SubmitResolution) -> Self {
        match resolution {
            SubmitResolution::Stale { committed } => Self {
                resource,
                created: committed,
                failure: None,
                skipped: 0,
                interrupted: true,
            },
            SubmitResolution::Completed(created) => Self {
                resource,
                created,
                failure: None,
                skipped: 0,
                interrupted: false,
            },
            SubmitResolution::Failed {
                committed, error, ..
            } => Self {
                resource,
                created: committed,
                failure: Some((committed.len(), error)),
                skipped: 0,
                interrupted: false,
            },
        }
    }

    /// Number of items after the failure or cancellation that were never sent.
    pub fn with_skipped(mut self, skipped: usize) -> Self {
        self.skipped = skipped;
        self
    }

    pub fn is_success(&self) -> bool {
        self.failure.is_none() && !self.interrupted
    }
}

impl fmt::Display for SubmitSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let noun = self.resource.noun();
        match self.failure {
            None if self.interrupted => {
                writeln!(
                    f,
                    "Saving was cancelled after {} {noun}(s); those remain committed.",
                    self.created.len()
                )?;
                if self.skipped > 0 {
                    writeln!(f, "{} {noun}(s) were not sent.", self.skipped)?;
                }
            }
            None => writeln!(f, "Saved {} {noun}(s).", self.created.len())?,
            Some((index, error)) => {
                writeln!(f, "Saving stopped at {noun} {}: {error}", index + 1)?;
                if !self.created.is_empty() {
                    writeln!(f)?;
                    writeln!(
                        f,
                        "{} {noun}(s) saved before the failure remain committed.",
                        self.created.len()
                    )?;
                }
                if self.skipped > 0 {
                    writeln!(f, "{} {noun}(s) were not sent.", self.skipped)?;
                }
            }
        }

        for entity in self.created {
            writeln!(f)?;
            write!(f, "{entity}")?;
        }
        Ok(())
    }
}
