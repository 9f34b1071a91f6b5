#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use cocoa_core::{
    backend::{Backend, BackendFailure},
    models::{CriterionRecord, Entity, Resource, ScopeKey},
    params::EntityPayload,
};

/// In-memory backend with failure injection.
#[derive(Default)]
pub struct MockBackend {
    records: Mutex<HashMap<Resource, Vec<Entity>>>,
    /// Failures returned when creating or updating a record with this name
    write_failures: Mutex<HashMap<String, BackendFailure>>,
    list_failure: Mutex<Option<BackendFailure>>,
    list_delay: Mutex<Duration>,
    write_delay: Mutex<Duration>,
    next_id: AtomicU64,
    pub list_calls: AtomicUsize,
    pub write_calls: AtomicUsize,
}

impl MockBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            next_id: AtomicU64::new(100),
            ..Self::default()
        })
    }

    pub fn seed(&self, resource: Resource, scope: &ScopeKey, id: u64, name: &str) -> Entity {
        let entity = Entity {
            id,
            name: name.to_string(),
            description: None,
            criteria: vec![CriterionRecord {
                id: 1,
                description: "Criterio existente".to_string(),
            }],
            scope_key: Some(scope.to_string()),
        };
        self.records
            .lock()
            .unwrap()
            .entry(resource)
            .or_default()
            .push(entity.clone());
        entity
    }

    pub fn fail_write(&self, name: &str, failure: BackendFailure) {
        self.write_failures
            .lock()
            .unwrap()
            .insert(name.to_string(), failure);
    }

    pub fn fail_list(&self, failure: Option<BackendFailure>) {
        *self.list_failure.lock().unwrap() = failure;
    }

    pub fn set_list_delay(&self, delay: Duration) {
        *self.list_delay.lock().unwrap() = delay;
    }

    pub fn set_write_delay(&self, delay: Duration) {
        *self.write_delay.lock().unwrap() = delay;
    }

    pub fn records(&self, resource: Resource) -> Vec<Entity> {
        self.records
            .lock()
            .unwrap()
            .get(&resource)
            .cloned()
            .unwrap_or_default()
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn write_calls(&self) -> usize {
        self.write_calls.load(Ordering::SeqCst)
    }

    fn check_write(&self, payload: &EntityPayload) -> Result<(), BackendFailure> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        match self.write_failures.lock().unwrap().get(&payload.name) {
            Some(failure) => Err(failure.clone()),
            None => Ok(()),
        }
    }

    async fn write_pause(&self) {
        let delay = *self.write_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    fn to_entity(id: u64, payload: &EntityPayload) -> Entity {
        Entity {
            id,
            name: payload.name.clone(),
            description: payload.description.clone(),
            criteria: payload
                .criteria
                .iter()
                .zip(1..)
                .map(|(criterion, id)| CriterionRecord {
                    id,
                    description: criterion.description.clone(),
                })
                .collect(),
            scope_key: Some(payload.scope_key.clone()),
        }
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn list_scoped(
        &self,
        resource: Resource,
        scope: &ScopeKey,
    ) -> Result<Vec<Entity>, BackendFailure> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.list_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if let Some(failure) = self.list_failure.lock().unwrap().clone() {
            return Err(failure);
        }
        let scope = scope.to_string();
        Ok(self
            .records(resource)
            .into_iter()
            .filter(|entity| entity.scope_key.as_deref() == Some(scope.as_str()))
            .collect())
    }

    async fn create(
        &self,
        resource: Resource,
        payload: &EntityPayload,
    ) -> Result<Entity, BackendFailure> {
        self.check_write(payload)?;
        self.write_pause().await;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let entity = Self::to_entity(id, payload);
        self.records
            .lock()
            .unwrap()
            .entry(resource)
            .or_default()
            .push(entity.clone());
        Ok(entity)
    }

    async fn update(
        &self,
        resource: Resource,
        id: u64,
        payload: &EntityPayload,
    ) -> Result<Entity, BackendFailure> {
        self.check_write(payload)?;
        self.write_pause().await;
        let entity = Self::to_entity(id, payload);
        let mut records = self.records.lock().unwrap();
        let list = records.entry(resource).or_default();
        match list.iter_mut().find(|existing| existing.id == id) {
            Some(existing) => *existing = entity.clone(),
            None => {
                return Err(BackendFailure::Rejected {
                    status: 404,
                    message: format!("{} {id} not found", resource.noun()),
                    fields: Default::default(),
                })
            }
        }
        Ok(entity)
    }
}
