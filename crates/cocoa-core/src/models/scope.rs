//! Scope keys that partition name uniqueness.

use std::fmt;

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

/// The parent context a name must be unique within.
///
/// A name that is taken under one objective is still free under another.
/// Weekly sheets are scoped by the dates they cover rather than by a parent
/// record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ScopeKey {
    Project(u64),
    Objective(u64),
    Dates(Vec<Date>),
}

impl ScopeKey {
    /// Builds a date scope with the dates sorted and deduplicated, so two
    /// scopes covering the same days compare equal.
    pub fn dates(dates: impl IntoIterator<Item = Date>) -> Self {
        let mut dates: Vec<Date> = dates.into_iter().collect();
        dates.sort();
        dates.dedup();
        ScopeKey::Dates(dates)
    }
}

impl fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeKey::Project(id) => write!(f, "project:{id}"),
            ScopeKey::Objective(id) => write!(f, "objective:{id}"),
            ScopeKey::Dates(dates) => {
                write!(f, "dates:")?;
                for (index, date) in dates.iter().enumerate() {
                    if index > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{date}")?;
                }
                Ok(())
            }
        }
    }
}
