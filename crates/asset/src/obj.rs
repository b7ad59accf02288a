//! OBJ adapter. `tobj` decides whether a file parses and loads its material
//! libraries; a scan of the `v`/`vt`/`vn`/`f` records then rebuilds the
//! shared pools exactly as written, keeping every position and the empty
//! slots of each face corner.

use std::{
    io::{BufRead, Cursor},
    path::Path,
};

use crate::{
    error::{AssetError, AssetResult},
    mesh::{
        Corner, Face, IndexedMesh, Material, MaterialId, NormalIndex, Shape, TexcoordIndex,
        VertexIndex,
    },
};

const DEFAULT_SHAPE: &str = "unnamed_object";

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        triangulate: true,
        single_index: false,
        ignore_points: true,
        ignore_lines: true,
        ..Default::default()
    }
}

/// Load an OBJ file and the material library it references.
///
/// A missing or unreadable `.mtl` is not fatal: the mesh loads without
/// materials.
pub fn load_indexed(path: impl AsRef<Path>) -> AssetResult<(IndexedMesh, Vec<Material>)> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path).map_err(|e| parse_error(path, e))?;
    let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    parse(path, &source, |mtl| tobj::load_mtl(dir.join(mtl)))
}

/// Parse OBJ source from memory, with an optional material library source
/// used for every `mtllib` statement.
pub fn load_indexed_from_str(
    obj: &str,
    mtl: Option<&str>,
) -> AssetResult<(IndexedMesh, Vec<Material>)> {
    parse(Path::new(MEMORY), obj, |_| match mtl {
        Some(src) => tobj::load_mtl_buf(&mut Cursor::new(src)),
        None => Ok((Vec::new(), Default::default())),
    })
}

pub fn load_indexed_from_reader<R: BufRead>(
    reader: &mut R,
    mtl: Option<&str>,
) -> AssetResult<(IndexedMesh, Vec<Material>)> {
    let mut source = String::new();
    reader
        .read_to_string(&mut source)
        .map_err(|e| parse_error(Path::new(MEMORY), e))?;
    load_indexed_from_str(&source, mtl)
}

const MEMORY: &str = "<memory>";

fn parse_error(path: &Path, e: impl std::fmt::Display) -> AssetError {
    AssetError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

fn parse<F>(path: &Path, source: &str, load_mtl: F) -> AssetResult<(IndexedMesh, Vec<Material>)>
where
    F: Fn(&Path) -> tobj::MTLLoadResult,
{
    let (_, materials) = tobj::load_obj_buf(&mut Cursor::new(source), &load_options(), load_mtl)
        .map_err(|e| parse_error(path, e))?;
    let materials: Vec<Material> = materials
        .unwrap_or_else(|e| {
            log::warn!("No materials for {}: {}", path.display(), e);
            Vec::new()
        })
        .into_iter()
        .map(Material::from)
        .collect();

    let mesh = scan(path, source, &materials)?;

    log::debug!(
        "Parsed {}: {} shapes, {} triangles, {} positions, {} normals, {} texcoords, {} materials",
        path.display(),
        mesh.shapes.len(),
        mesh.triangle_count(),
        mesh.positions.len(),
        mesh.normals.len(),
        mesh.texcoords.len(),
        materials.len()
    );

    Ok((mesh, materials))
}

/// Rebuilds the indexed mesh from the OBJ records. Polygons are fanned into
/// triangles; consecutive faces under one `o`/`g` name form one shape.
fn scan(path: &Path, source: &str, materials: &[Material]) -> AssetResult<IndexedMesh> {
    let mut mesh = IndexedMesh::default();
    let mut group = DEFAULT_SHAPE.to_owned();
    let mut material: Option<MaterialId> = None;

    for (line_no, line) in source.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let mut parts = trimmed.split_whitespace();
        let Some(tag) = parts.next() else {
            continue;
        };
        let at = Location { path, line_no };

        match tag {
            "v" => {
                let x = at.parse_f32(parts.next(), "x coordinate")?;
                let y = at.parse_f32(parts.next(), "y coordinate")?;
                let z = at.parse_f32(parts.next(), "z coordinate")?;
                mesh.positions.push([x, y, z])?;
            }
            "vt" => {
                let u = at.parse_f32(parts.next(), "u coordinate")?;
                let v = at.parse_f32(parts.next(), "v coordinate")?;
                mesh.texcoords.push([u, v])?;
            }
            "vn" => {
                let nx = at.parse_f32(parts.next(), "nx coordinate")?;
                let ny = at.parse_f32(parts.next(), "ny coordinate")?;
                let nz = at.parse_f32(parts.next(), "nz coordinate")?;
                mesh.normals.push([nx, ny, nz])?;
            }
            "o" | "g" => {
                let name = parts.collect::<Vec<_>>().join(" ");
                group = if name.is_empty() { DEFAULT_SHAPE.to_owned() } else { name };
            }
            "usemtl" => {
                material = parts
                    .next()
                    .and_then(|name| materials.iter().position(|m| m.name == name))
                    .map(|i| MaterialId(i as u32));
            }
            "f" => {
                let corners = parts
                    .map(|token| at.parse_corner(token, &mesh))
                    .collect::<AssetResult<Vec<Corner>>>()?;
                if corners.len() < 3 {
                    continue;
                }

                if mesh.shapes.last().is_none_or(|s| s.name != group) {
                    mesh.shapes.push(Shape::new(group.clone(), Vec::new()));
                }
                if let Some(shape) = mesh.shapes.last_mut() {
                    for tri in 1..(corners.len() - 1) {
                        shape.faces.push(Face::new(
                            [corners[0], corners[tri], corners[tri + 1]],
                            material,
                        ));
                    }
                }
            }
            _ => {
                // mtllib, s, l, p, ... are handled by tobj or not needed
            }
        }
    }

    Ok(mesh)
}

#[derive(Clone, Copy)]
struct Location<'a> {
    path: &'a Path,
    line_no: usize,
}

impl Location<'_> {
    fn error(&self, message: String) -> AssetError {
        parse_error(self.path, format!("line {}: {}", self.line_no + 1, message))
    }

    fn parse_f32(&self, value: Option<&str>, what: &str) -> AssetResult<f32> {
        let token = value.ok_or_else(|| self.error(format!("missing {what}")))?;
        token
            .parse::<f32>()
            .map_err(|e| self.error(format!("failed to parse {what} '{token}': {e}")))
    }

    /// `v`, `v/vt`, `v//vn` or `v/vt/vn`; empty slots stay `None`.
    fn parse_corner(&self, token: &str, mesh: &IndexedMesh) -> AssetResult<Corner> {
        let mut split = token.split('/');
        let pos = split
            .next()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| self.error(format!("malformed face element '{token}'")))?;
        let vertex = VertexIndex(self.resolve_index(pos, mesh.positions.len())?);

        let texcoord = match split.next() {
            Some(value) if !value.is_empty() => {
                Some(TexcoordIndex(self.resolve_index(value, mesh.texcoords.len())?))
            }
            _ => None,
        };
        let normal = match split.next() {
            Some(value) if !value.is_empty() => {
                Some(NormalIndex(self.resolve_index(value, mesh.normals.len())?))
            }
            _ => None,
        };

        Ok(Corner::new(vertex, normal, texcoord))
    }

    /// 1-based or negative (relative) OBJ index -> 0-based pool slot.
    fn resolve_index(&self, token: &str, len: usize) -> AssetResult<u32> {
        let raw = token
            .parse::<i64>()
            .map_err(|e| self.error(format!("invalid index '{token}': {e}")))?;
        let idx = match raw {
            0 => return Err(self.error("OBJ indices are 1-based; found 0".to_owned())),
            r if r > 0 => r - 1,
            r => len as i64 + r,
        };
        if idx < 0 || idx as usize >= len {
            return Err(self.error(format!("index {raw} out of bounds (len={len})")));
        }
        u32::try_from(idx).map_err(|_| AssetError::TooManyVertices(idx as usize))
    }
}

impl From<tobj::Material> for Material {
    fn from(m: tobj::Material) -> Self {
        Self {
            name: m.name,
            ambient: m.ambient,
            diffuse: m.diffuse,
            specular: m.specular,
            shininess: m.shininess,
            diffuse_texture: m.diffuse_texture.filter(|t| !t.is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{flatten::flatten, texcoord::flatten_texcoords};

    const CUBE_FACES: &str = r#"
        mtllib cube.mtl
        o cube
        v 0.0 0.0 0.0
        v 1.0 0.0 0.0
        v 1.0 1.0 0.0
        v 0.0 1.0 0.0
        vt 0.0 0.0
        vt 1.0 0.0
        vt 1.0 1.0
        vt 0.0 1.0
        vn 0.0 0.0 1.0
        usemtl red
        f 1/1/1 2/2/1 3/3/1
        f 1/1/1 3/3/1 4/4/1
        usemtl blue
        f 1/1/1 2/2/1 4/4/1
    "#;

    const CUBE_MTL: &str = r#"
        newmtl red
        Kd 1.0 0.0 0.0
        map_Kd red.png
        newmtl blue
        Kd 0.0 0.0 1.0
    "#;

    #[test]
    fn material_runs_merge_into_one_shape() {
        let (mesh, materials) = load_indexed_from_str(CUBE_FACES, Some(CUBE_MTL)).unwrap();
        assert_eq!(mesh.shapes.len(), 1);
        assert_eq!(mesh.shapes[0].name, "cube");
        assert_eq!(mesh.triangle_count(), 3);

        let ids: Vec<_> = mesh.shapes[0].faces.iter().map(|f| f.material).collect();
        assert_eq!(ids[0], ids[1]);
        assert_ne!(ids[1], ids[2]);

        assert_eq!(materials.len(), 2);
        let red = &materials[ids[0].unwrap().index()];
        assert_eq!(red.name, "red");
        assert_eq!(red.diffuse_texture.as_deref(), Some("red.png"));
        let blue = &materials[ids[2].unwrap().index()];
        assert_eq!(blue.diffuse_texture, None);
    }

    #[test]
    fn corners_resolve_into_shared_pools() {
        let (mesh, _) = load_indexed_from_str(CUBE_FACES, Some(CUBE_MTL)).unwrap();
        for face in mesh.shapes.iter().flat_map(|s| &s.faces) {
            for c in &face.corners {
                assert!(mesh.positions.get(c.vertex).is_some());
                assert!(mesh.normals.get(c.normal.unwrap()).is_some());
                assert!(mesh.texcoords.get(c.texcoord.unwrap()).is_some());
            }
        }
    }

    #[test]
    fn quad_without_normals_is_triangulated() {
        let src = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n";
        let (mesh, materials) = load_indexed_from_str(src, None).unwrap();
        assert!(materials.is_empty());
        assert_eq!(mesh.triangle_count(), 2);
        let face = &mesh.shapes[0].faces[0];
        assert!(face.corners.iter().all(|c| c.normal.is_none() && c.texcoord.is_none()));
        assert_eq!(face.material, None);
    }

    #[test]
    fn missing_file_is_a_parse_error() {
        let err = load_indexed("does/not/exist.obj").unwrap_err();
        assert!(matches!(err, AssetError::Parse { .. }));
    }

    #[test]
    fn file_with_companion_mtl() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("cube.obj"), CUBE_FACES).unwrap();
        std::fs::write(dir.path().join("cube.mtl"), CUBE_MTL).unwrap();
        let (mesh, materials) = load_indexed(dir.path().join("cube.obj")).unwrap();
        assert_eq!(mesh.triangle_count(), 3);
        assert_eq!(materials.len(), 2);
    }

    #[test]
    fn corner_without_texcoord_fails_texcoord_flattening() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0.25 0.25\nf 1/1 2/1 3/1\nf 1 2 3\n";
        let (mesh, _) = load_indexed_from_str(src, None).unwrap();
        assert_eq!(mesh.shapes[0].faces[0].corners[0].texcoord, Some(TexcoordIndex(0)));
        assert_eq!(mesh.shapes[0].faces[1].corners[0].texcoord, None);

        let err = flatten_texcoords(&mesh).unwrap_err();
        assert!(matches!(
            err,
            AssetError::InvalidTexcoordIndex { shape: 0, face: 1, corner: 0 }
        ));
    }

    #[test]
    fn face_without_normals_gets_computed_normal() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 -1\nf 1//1 2//1 3//1\nf 1 2 3\n";
        let (mesh, _) = load_indexed_from_str(src, None).unwrap();
        assert!(mesh.shapes[0].faces[1].corners.iter().all(|c| c.normal.is_none()));

        let flat = flatten(&mesh, 1.0).unwrap();
        assert_eq!(flat.normals[..9], [0.0, 0.0, -1.0, 0.0, 0.0, -1.0, 0.0, 0.0, -1.0]);
        assert_eq!(flat.normals[9..], [0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn unreferenced_positions_count_toward_scale() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nv 10 0 0\nf 1 2 3\n";
        let (mesh, _) = load_indexed_from_str(src, None).unwrap();
        assert_eq!(mesh.positions.len(), 4);

        let flat = flatten(&mesh, 1.0).unwrap();
        assert!((flat.scale - 0.1).abs() < 1e-6);
    }

    #[test]
    fn relative_indices_resolve_against_current_pool() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf -3 -2 -1\n";
        let (mesh, _) = load_indexed_from_str(src, None).unwrap();
        let face = &mesh.shapes[0].faces[0];
        let ids: Vec<_> = face.corners.iter().map(|c| c.vertex).collect();
        assert_eq!(ids, vec![VertexIndex(0), VertexIndex(1), VertexIndex(2)]);
    }
}
