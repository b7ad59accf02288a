//! Per-corner texture coordinates matching the layout of [`crate::flatten`].

use crate::{
    error::{AssetError, AssetResult},
    mesh::IndexedMesh,
};

/// Emits `(s, 1 - t)` for every corner, 6 floats per triangle, in face order.
///
/// A mesh without texture coordinates yields all zeros. If it has some, every
/// corner must reference one.
pub fn flatten_texcoords(mesh: &IndexedMesh) -> AssetResult<Vec<f32>> {
    let mut out: Vec<f32> = Vec::with_capacity(mesh.triangle_count() * 6);

    if mesh.texcoords.is_empty() {
        out.resize(mesh.triangle_count() * 6, 0.0);
        return Ok(out);
    }

    for (s, shape) in mesh.shapes.iter().enumerate() {
        for (f, face) in shape.faces.iter().enumerate() {
            for (k, corner) in face.corners.iter().enumerate() {
                let index = corner.texcoord.ok_or(AssetError::InvalidTexcoordIndex {
                    shape: s,
                    face: f,
                    corner: k,
                })?;
                let [u, v] = mesh.texcoords.fetch(index)?;
                out.extend_from_slice(&[u, 1.0 - v]);
            }
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{Corner, Face, Pool, Shape, TexcoordIndex, VertexIndex};

    fn corner(t: Option<u32>) -> Corner {
        Corner::new(VertexIndex(0), None, t.map(TexcoordIndex))
    }

    #[test]
    fn t_coordinate_is_flipped() {
        let mesh = IndexedMesh {
            shapes: vec![Shape::new(
                "s",
                vec![Face::new([corner(Some(0)), corner(Some(1)), corner(Some(2))], None)],
            )],
            texcoords: Pool::from_vec(vec![[0.0, 0.0], [1.0, 0.25], [0.5, 1.0]]),
            ..Default::default()
        };
        let tc = flatten_texcoords(&mesh).unwrap();
        assert_eq!(tc, vec![0.0, 1.0, 1.0, 0.75, 0.5, 0.0]);
    }

    #[test]
    fn no_texcoords_yields_zeros() {
        let mesh = IndexedMesh {
            shapes: vec![Shape::new("s", vec![Face::new([corner(None); 3], None); 2])],
            ..Default::default()
        };
        let tc = flatten_texcoords(&mesh).unwrap();
        assert_eq!(tc.len(), 12);
        assert!(tc.iter().all(|&c| c == 0.0));
    }

    #[test]
    fn missing_index_is_reported() {
        let mesh = IndexedMesh {
            shapes: vec![Shape::new(
                "s",
                vec![Face::new([corner(Some(0)), corner(None), corner(Some(0))], None)],
            )],
            texcoords: Pool::from_vec(vec![[0.5, 0.5]]),
            ..Default::default()
        };
        let err = flatten_texcoords(&mesh).unwrap_err();
        assert!(matches!(
            err,
            AssetError::InvalidTexcoordIndex { shape: 0, face: 0, corner: 1 }
        ));
    }
}
