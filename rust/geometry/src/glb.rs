// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Binary glTF 2.0 (GLB) encoding
//!
//! Layout: `[header: magic, version, length][JSON chunk][BIN chunk]`, all
//! little-endian u32 words. Each primitive becomes one node with one mesh and
//! one flat-colored material. Positions are written as f32, indices as u32.

use serde_json::{json, Value as JsonValue};

use crate::error::{Error, Result};
use crate::mesh::Mesh;

const GLB_MAGIC: u32 = 0x4654_6C67; // "glTF"
const GLB_VERSION: u32 = 2;
const CHUNK_JSON: u32 = 0x4E4F_534A; // "JSON"
const CHUNK_BIN: u32 = 0x004E_4942; // "BIN\0"
const HEADER_LEN: usize = 12;
const CHUNK_HEADER_LEN: usize = 8;

const COMPONENT_FLOAT: u32 = 5126;
const COMPONENT_UNSIGNED_INT: u32 = 5125;
const TARGET_ARRAY_BUFFER: u32 = 34962;
const TARGET_ELEMENT_ARRAY_BUFFER: u32 = 34963;
const MODE_TRIANGLES: u32 = 4;

/// One named, uniformly colored mesh of a scene
#[derive(Debug, Clone, Copy)]
pub struct GlbPrimitive<'a> {
    pub name: &'a str,
    pub mesh: &'a Mesh,
    /// sRGB color with alpha, 0-255
    pub color: [u8; 4],
}

/// Encode the primitives into a GLB file image.
///
/// Empty meshes are skipped; a scene without any triangles is an error.
pub fn encode_glb(primitives: &[GlbPrimitive<'_>]) -> Result<Vec<u8>> {
    let mut bin: Vec<u8> = Vec::new();
    let mut buffer_views = Vec::new();
    let mut accessors = Vec::new();
    let mut materials = Vec::new();
    let mut meshes = Vec::new();
    let mut nodes = Vec::new();

    for primitive in primitives.iter().filter(|p| !p.mesh.is_empty()) {
        let mesh = primitive.mesh;
        let index = nodes.len();

        // Positions
        let position_offset = bin.len();
        let mut min = [f32::INFINITY; 3];
        let mut max = [f32::NEG_INFINITY; 3];
        for vertex in mesh.positions.chunks_exact(3) {
            for (axis, &coordinate) in vertex.iter().enumerate() {
                let value = coordinate as f32;
                min[axis] = min[axis].min(value);
                max[axis] = max[axis].max(value);
                bin.extend_from_slice(&value.to_le_bytes());
            }
        }
        let position_len = bin.len() - position_offset;

        // Indices
        let index_offset = bin.len();
        for &i in &mesh.indices {
            bin.extend_from_slice(&i.to_le_bytes());
        }
        let index_len = bin.len() - index_offset;

        let view = buffer_views.len();
        buffer_views.push(json!({
            "buffer": 0,
            "byteOffset": position_offset,
            "byteLength": position_len,
            "target": TARGET_ARRAY_BUFFER,
        }));
        buffer_views.push(json!({
            "buffer": 0,
            "byteOffset": index_offset,
            "byteLength": index_len,
            "target": TARGET_ELEMENT_ARRAY_BUFFER,
        }));

        let accessor = accessors.len();
        accessors.push(json!({
            "bufferView": view,
            "componentType": COMPONENT_FLOAT,
            "count": mesh.vertex_count(),
            "type": "VEC3",
            "min": min,
            "max": max,
        }));
        accessors.push(json!({
            "bufferView": view + 1,
            "componentType": COMPONENT_UNSIGNED_INT,
            "count": mesh.indices.len(),
            "type": "SCALAR",
        }));

        materials.push(material(primitive.name, primitive.color));
        meshes.push(json!({
            "name": primitive.name,
            "primitives": [{
                "attributes": { "POSITION": accessor },
                "indices": accessor + 1,
                "material": index,
                "mode": MODE_TRIANGLES,
            }],
        }));
        nodes.push(json!({ "name": primitive.name, "mesh": index }));
    }

    if nodes.is_empty() {
        return Err(Error::mesh("no triangles to encode"));
    }

    let scene_nodes: Vec<usize> = (0..nodes.len()).collect();
    let document = json!({
        "asset": { "version": "2.0", "generator": "ifc-diff" },
        "scene": 0,
        "scenes": [{ "nodes": scene_nodes }],
        "nodes": nodes,
        "meshes": meshes,
        "materials": materials,
        "accessors": accessors,
        "bufferViews": buffer_views,
        "buffers": [{ "byteLength": bin.len() }],
    });
    let mut json_chunk = serde_json::to_vec(&document)
        .map_err(|e| Error::mesh(format!("scene document: {e}")))?;

    pad_to_word(&mut json_chunk, b' ');
    pad_to_word(&mut bin, 0);

    let total = HEADER_LEN + CHUNK_HEADER_LEN + json_chunk.len() + CHUNK_HEADER_LEN + bin.len();
    let total = u32::try_from(total).map_err(|_| Error::mesh("scene exceeds the GLB size limit"))?;

    let mut output = Vec::with_capacity(total as usize);
    output.extend_from_slice(&GLB_MAGIC.to_le_bytes());
    output.extend_from_slice(&GLB_VERSION.to_le_bytes());
    output.extend_from_slice(&total.to_le_bytes());
    write_chunk(&mut output, CHUNK_JSON, &json_chunk);
    write_chunk(&mut output, CHUNK_BIN, &bin);
    Ok(output)
}

fn material(name: &str, color: [u8; 4]) -> JsonValue {
    let factor: Vec<f32> = color.iter().map(|&c| f32::from(c) / 255.0).collect();
    let alpha_mode = if color[3] < u8::MAX { "BLEND" } else { "OPAQUE" };
    json!({
        "name": name,
        "pbrMetallicRoughness": {
            "baseColorFactor": factor,
            "metallicFactor": 0.0,
            "roughnessFactor": 1.0,
        },
        "alphaMode": alpha_mode,
        "doubleSided": true,
    })
}

fn pad_to_word(data: &mut Vec<u8>, fill: u8) {
    while data.len() % 4 != 0 {
        data.push(fill);
    }
}

// Format: [chunk_len:u32][chunk_type:u32][chunk]
fn write_chunk(output: &mut Vec<u8>, chunk_type: u32, chunk: &[u8]) {
    output.extend_from_slice(&(chunk.len() as u32).to_le_bytes());
    output.extend_from_slice(&chunk_type.to_le_bytes());
    output.extend_from_slice(chunk);
}
