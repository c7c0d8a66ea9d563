// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Rigid translation detection from bounding-box corners

use nalgebra::Vector3;

use crate::mesh::Mesh;

/// Absolute tolerance for the two corner translations to count as equal
pub const CORNER_TOLERANCE: f64 = 1e-4;

/// Common translation of both bounding-box corners.
///
/// `None` when the corners moved by different amounts, i.e. the object was
/// resized or rotated rather than purely translated.
pub fn rigid_translation(before: &Mesh, after: &Mesh) -> Option<Vector3<f64>> {
    let (min_a, max_a) = before.bounds();
    let (min_b, max_b) = after.bounds();
    let shift_min = min_b - min_a;
    let shift_max = max_b - max_a;

    let consistent = shift_min
        .iter()
        .zip(shift_max.iter())
        .all(|(a, b)| (a - b).abs() <= CORNER_TOLERANCE);
    consistent.then(|| (shift_min + shift_max) * 0.5)
}

/// True iff the object was purely translated by more than `tolerance`.
///
/// A missing mesh on either side reports not moved.
pub fn detect_movement(before: Option<&Mesh>, after: Option<&Mesh>, tolerance: f64) -> bool {
    let (Some(before), Some(after)) = (before, after) else {
        return false;
    };
    rigid_translation(before, after).is_some_and(|t| t.norm() > tolerance)
}
