//! Collection wrapper types for displaying groups of records.

use std::{fmt, ops::Index};

use crate::models::{Entity, Resource};

/// Records of one resource, formatted as a markdown list.
pub struct Entities {
    pub resource: Resource,
    pub items: Vec<Entity>,
}

impl Entities {
    pub fn new(resource: Resource, items: Vec<Entity>) -> Self {
        Self { resource, items }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entity> {
        self.items.iter()
    }
}

impl Index<usize> for Entities {
    type Output = Entity;

    fn index(&self, index: usize) -> &Self::Output {
        &self.items[index]
    }
}

impl<'a> IntoIterator for &'a Entities {
    type Item = &'a Entity;
    type IntoIter = std::slice::Iter<'a, Entity>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl fmt::Display for Entities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.items.is_empty() {
            return writeln!(f, "No {} records found.", self.resource.noun());
        }

        for entity in &self.items {
            write!(f, "{entity}")?;
        }
        Ok(())
    }
}
