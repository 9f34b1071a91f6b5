//! The record being composed inside a wizard.

use serde::{Deserialize, Serialize};

use crate::{
    error::FormError,
    models::{Entity, ScopeKey},
    params::{CriterionPayload, EntityPayload},
    validate::{duplicate_indices, DuplicateSource, FieldIssue, FieldKey, LengthPolicy, ValidationResult},
};

/// One acceptance criterion as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Criterion {
    pub text: String,
}

impl Criterion {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn result(&self) -> ValidationResult {
        LengthPolicy::CRITERION.check(&self.text)
    }
}

/// A deliverable or objective that has not been persisted yet.
///
/// Values are stored as typed (after the raw-length cap) and only trimmed
/// when converted into a payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub name: String,
    /// Empty means "no description"
    pub description: String,
    pub criteria: Vec<Criterion>,
}

impl Default for Draft {
    fn default() -> Self {
        Self::new()
    }
}

impl Draft {
    /// A fresh draft: blank fields and one empty criterion entry to fill.
    pub fn new() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            criteria: vec![Criterion::default()],
        }
    }

    /// Seeds a draft from an existing record, for edit wizards.
    pub fn from_entity(entity: &Entity) -> Self {
        let criteria = if entity.criteria.is_empty() {
            vec![Criterion::default()]
        } else {
            entity
                .criteria
                .iter()
                .map(|record| Criterion::new(record.description.clone()))
                .collect()
        };

        Self {
            name: LengthPolicy::NAME.clamp(&entity.name),
            description: LengthPolicy::DESCRIPTION
                .clamp(entity.description.as_deref().unwrap_or_default()),
            criteria,
        }
    }

    pub fn name_result(&self) -> ValidationResult {
        LengthPolicy::NAME.check(&self.name)
    }

    pub fn description_result(&self) -> ValidationResult {
        LengthPolicy::DESCRIPTION.check(&self.description)
    }

    /// Local errors of the details step: name and description.
    pub fn details_errors(&self) -> Vec<FormError> {
        [
            (FieldKey::Name, self.name_result()),
            (FieldKey::Description, self.description_result()),
        ]
        .into_iter()
        .filter_map(|(field, result)| {
            result
                .issue()
                .map(|issue| FormError::LocalValidation { field, issue })
        })
        .collect()
    }

    /// Local errors of the criteria step, in field order.
    ///
    /// A criterion that is both malformed and repeated reports only the
    /// malformation.
    pub fn criteria_errors(&self) -> Vec<FormError> {
        if self.criteria.is_empty() {
            return vec![FormError::LocalValidation {
                field: FieldKey::Criteria,
                issue: FieldIssue::Required,
            }];
        }

        let texts: Vec<&str> = self.criteria.iter().map(|c| c.text.as_str()).collect();
        let repeated = duplicate_indices(&texts);

        self.criteria
            .iter()
            .enumerate()
            .filter_map(|(index, criterion)| {
                let field = FieldKey::Criterion(index);
                match criterion.result().issue() {
                    Some(issue) => Some(FormError::LocalValidation { field, issue }),
                    None if repeated.contains(&index) => {
                        Some(FormError::duplicate(field, DuplicateSource::Sibling))
                    }
                    None => None,
                }
            })
            .collect()
    }

    /// All local errors of the draft.
    pub fn local_errors(&self) -> Vec<FormError> {
        let mut errors = self.details_errors();
        errors.extend(self.criteria_errors());
        errors
    }

    /// Trimmed wire representation of the draft.
    pub fn to_payload(&self, scope: &ScopeKey) -> EntityPayload {
        let description = self.description.trim();
        EntityPayload {
            name: self.name.trim().to_string(),
            description: (!description.is_empty()).then(|| description.to_string()),
            criteria: self
                .criteria
                .iter()
                .map(|criterion| CriterionPayload {
                    description: criterion.text.trim().to_string(),
                })
                .collect(),
            scope_key: scope.to_string(),
        }
    }
}
