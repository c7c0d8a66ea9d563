// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Snapshot access
//!
//! A snapshot is a read-only view of one model revision. Comparison code only
//! talks to the [`Snapshot`] trait; [`ModelSnapshot`] is the in-memory
//! implementation backed by a JSON export.

use std::fs;
use std::path::Path;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::error::{Error, Result};
use crate::schema::IfcClass;

/// Read-only lookup of entities in one model revision
pub trait Snapshot: Send + Sync {
    /// Look up an entity by identifier.
    ///
    /// Returns `Ok(None)` when the identifier is well formed but unknown.
    fn by_id(&self, id: &str) -> Result<Option<&Entity>>;

    /// All entities whose declared type is `type_name` or one of its subtypes
    fn by_type(&self, type_name: &str) -> Result<Vec<&Entity>>;
}

/// Reject identifiers that cannot name an entity
pub fn check_id(id: &str) -> Result<()> {
    if id.is_empty() || id.chars().any(char::is_whitespace) {
        return Err(Error::MalformedId(id.to_string()));
    }
    Ok(())
}

/// On-disk layout of a snapshot export
#[derive(Serialize, Deserialize)]
struct SnapshotDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    schema: Option<String>,
    entities: Vec<Entity>,
}

/// In-memory snapshot
///
/// Entities are kept in insertion order so `by_type` results are stable.
#[derive(Debug, Clone, Default)]
pub struct ModelSnapshot {
    schema: Option<String>,
    entities: Vec<Entity>,
    index: FxHashMap<String, usize>,
}

impl ModelSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a snapshot export from disk
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let snapshot = Self::from_json(&content)?;
        tracing::debug!(
            path = %path.as_ref().display(),
            entities = snapshot.len(),
            "snapshot loaded"
        );
        Ok(snapshot)
    }

    /// Parse a snapshot export
    pub fn from_json(content: &str) -> Result<Self> {
        let document: SnapshotDocument = serde_json::from_str(content)?;
        let mut snapshot = Self {
            schema: document.schema,
            ..Self::default()
        };
        for entity in document.entities {
            snapshot.insert(entity)?;
        }
        Ok(snapshot)
    }

    /// Serialize back to the export layout
    pub fn to_json(&self) -> Result<String> {
        let document = SnapshotDocument {
            schema: self.schema.clone(),
            entities: self.entities.clone(),
        };
        Ok(serde_json::to_string_pretty(&document)?)
    }

    /// Add an entity; identifiers must be well formed and unique
    pub fn insert(&mut self, entity: Entity) -> Result<()> {
        check_id(&entity.id)?;
        if self.index.contains_key(&entity.id) {
            return Err(Error::DuplicateEntity(entity.id));
        }
        self.index.insert(entity.id.clone(), self.entities.len());
        self.entities.push(entity);
        Ok(())
    }

    /// Builder-style [`insert`](Self::insert)
    pub fn with_entity(mut self, entity: Entity) -> Result<Self> {
        self.insert(entity)?;
        Ok(self)
    }

    /// Schema identifier recorded in the export (e.g. `IFC4`)
    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }
}

impl Snapshot for ModelSnapshot {
    fn by_id(&self, id: &str) -> Result<Option<&Entity>> {
        check_id(id)?;
        Ok(self.index.get(id).map(|&i| &self.entities[i]))
    }

    fn by_type(&self, type_name: &str) -> Result<Vec<&Entity>> {
        let class = IfcClass::from_name(type_name)
            .ok_or_else(|| Error::UnknownType(type_name.to_string()))?;
        Ok(self.entities.iter().filter(|e| e.is_a(class)).collect())
    }
}
