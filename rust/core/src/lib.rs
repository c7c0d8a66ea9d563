// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # IFC-Diff Core
//!
//! Model snapshots and entity records for revision comparison.
//!
//! ## Overview
//!
//! - **Class table**: IFC4 product hierarchy with subtype queries ([`IfcClass`])
//! - **Entities**: names, property/quantity sets, containment, decomposition
//!   and tessellated representations ([`Entity`])
//! - **Snapshots**: read-only lookup by id and by type ([`Snapshot`]), with an
//!   in-memory implementation loaded from JSON exports ([`ModelSnapshot`])
//! - **Identifier lists**: comment-tolerant text ingestion ([`idlist`])
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ifc_diff_core::{ModelSnapshot, Snapshot};
//!
//! let v1 = ModelSnapshot::open("model_v1.json")?;
//! for wall in v1.by_type("IfcWall")? {
//!     println!("{} {:?}", wall.id, wall.name);
//! }
//! ```

pub mod entity;
pub mod error;
pub mod idlist;
pub mod schema;
pub mod snapshot;
pub mod value;

pub use entity::{
    Entity, Property, PropertyDefinition, PropertySet, Quantity, QuantitySet, QuantityValue,
    Representation, TessellatedItem,
};
pub use error::{Error, Result};
pub use idlist::{parse_identifier_list, read_identifier_file};
pub use schema::{type_matches, IfcClass};
pub use snapshot::{check_id, ModelSnapshot, Snapshot};
pub use value::{diff_attributes, round_decimals, AttributeMap, FieldChange, Value};
