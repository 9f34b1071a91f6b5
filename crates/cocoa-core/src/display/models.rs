//! Display implementations for domain models.

use std::fmt;

use crate::models::{CriterionRecord, Entity};

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "### {}. {}", self.id, self.name)?;
        writeln!(f)?;

        if let Some(scope) = &self.scope_key {
            writeln!(f, "- Scope: {scope}")?;
        }
        if let Some(desc) = &self.description {
            writeln!(f)?;
            writeln!(f, "{desc}")?;
        }

        if !self.criteria.is_empty() {
            writeln!(f)?;
            writeln!(f, "**Acceptance criteria:**")?;
            for criterion in &self.criteria {
                writeln!(f, "{criterion}")?;
            }
        }
        writeln!(f)
    }
}

impl fmt::Display for CriterionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "- {}", self.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_display() {
        let entity = Entity {
            id: 3,
            name: "Plan de pruebas".to_string(),
            description: Some("Cobertura mínima".to_string()),
            criteria: vec![CriterionRecord {
                id: 1,
                description: "Cubre los casos críticos".to_string(),
            }],
            scope_key: Some("objective:2".to_string()),
        };

        let output = entity.to_string();
        assert!(output.starts_with("### 3. Plan de pruebas"));
        assert!(output.contains("- Scope: objective:2"));
        assert!(output.contains("Cobertura mínima"));
        assert!(output.contains("- Cubre los casos críticos"));
    }

    #[test]
    fn test_entity_without_criteria_has_no_criteria_section() {
        let entity = Entity {
            id: 1,
            name: "Entrega".to_string(),
            description: None,
            criteria: vec![],
            scope_key: None,
        };
        assert!(!entity.to_string().contains("Acceptance criteria"));
    }
}
