//! Flattening pass: indexed mesh -> unshared, scaled triangle soup with
//! per-material draw segments.

use corelib::{Aabb, Vec3, face_normal};

use crate::{
    error::{AssetError, AssetResult},
    mesh::{FlatMesh, IndexedMesh, MaterialSegment, Shape, ShapeSegments},
};

/// `offset + count`, or `TooManyVertices` once it leaves the u32 range.
fn advance(offset: u32, count: u32) -> AssetResult<u32> {
    offset
        .checked_add(count)
        .ok_or(AssetError::TooManyVertices(offset as usize + count as usize))
}

/// Splits a shape's faces into material runs.
///
/// Offsets count flattened vertices (3 per triangle) relative to the shape,
/// so `[0, 0, 1, 1, 1, 0]` gives starts `[0, 6, 15]` and `end == 18`.
pub fn discover_segments(shape: &Shape, base_vertex: u32) -> AssetResult<ShapeSegments> {
    let mut segments: Vec<MaterialSegment> = Vec::new();
    let mut vertices: u32 = 0;

    for face in &shape.faces {
        if segments.last().is_none_or(|s| s.material != face.material) {
            segments.push(MaterialSegment {
                start: vertices,
                material: face.material,
            });
        }
        vertices = advance(vertices, 3)?;
    }

    Ok(ShapeSegments {
        name: shape.name.clone(),
        base_vertex,
        segments,
        end: vertices,
    })
}

/// Uniform scale that maps the dominant axis of all pool positions onto
/// `target_scale`.
///
/// Degenerate bounds (empty pool, all points coincident, non-finite input)
/// fall back to `1.0` so positions pass through unscaled.
pub fn scale_factor(mesh: &IndexedMesh, target_scale: f32) -> f32 {
    let aabb = Aabb::from_points(mesh.positions.iter().copied().map(Vec3::from));
    match aabb.uniform_scale_to(target_scale) {
        Some(factor) => factor,
        None => {
            log::warn!(
                "Degenerate bounds (extent {:?}); leaving positions unscaled",
                aabb.extent()
            );
            1.0
        }
    }
}

/// Flattens `mesh` so that no positions or normals are shared between faces.
///
/// Faces missing a normal on any corner get the flat face normal of their
/// scaled positions on all three corners; otherwise normals are copied
/// verbatim from the pool.
pub fn flatten(mesh: &IndexedMesh, target_scale: f32) -> AssetResult<FlatMesh> {
    // Segment layout first: it fixes the exact output size.
    let mut shapes = Vec::with_capacity(mesh.shapes.len());
    let mut base: u32 = 0;
    for shape in &mesh.shapes {
        let segments = discover_segments(shape, base)?;
        base = advance(base, segments.vertex_count())?;
        shapes.push(segments);
    }
    let total = base as usize;

    let scale = scale_factor(mesh, target_scale);

    let mut positions: Vec<f32> = Vec::with_capacity(total * 3);
    let mut normals: Vec<f32> = Vec::with_capacity(total * 3);

    for shape in &mesh.shapes {
        for face in &shape.faces {
            let mut v = [[0.0f32; 3]; 3];
            for (dst, corner) in v.iter_mut().zip(&face.corners) {
                let p = mesh.positions.fetch(corner.vertex)?;
                *dst = p.map(|c| c * scale);
            }

            let n = match face.corners.map(|c| c.normal) {
                [Some(a), Some(b), Some(c)] => [
                    mesh.normals.fetch(a)?,
                    mesh.normals.fetch(b)?,
                    mesh.normals.fetch(c)?,
                ],
                _ => [face_normal(v[0].into(), v[1].into(), v[2].into()).to_array(); 3],
            };

            positions.extend_from_slice(v.as_flattened());
            normals.extend_from_slice(n.as_flattened());
        }
    }

    log::debug!(
        "Flattened {} shapes into {} triangles (scale {})",
        shapes.len(),
        total / 3,
        scale
    );

    Ok(FlatMesh {
        positions,
        normals,
        shapes,
        scale,
    })
}
