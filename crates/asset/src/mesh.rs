//! Mesh representations: the indexed form produced by the OBJ adapter and the
//! flat, unshared form produced by [`crate::flatten`].

use std::{marker::PhantomData, ops::Range};

use crate::error::{AssetError, AssetResult};

/// Index into one of the shared pools of an [`IndexedMesh`].
pub trait PoolIndex: Copy {
    /// Pool name used in diagnostics.
    const KIND: &'static str;

    fn from_raw(raw: u32) -> Self;
    fn raw(self) -> u32;
}

macro_rules! pool_index {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub u32);

        impl PoolIndex for $name {
            const KIND: &'static str = $kind;

            #[inline]
            fn from_raw(raw: u32) -> Self {
                Self(raw)
            }

            #[inline]
            fn raw(self) -> u32 {
                self.0
            }
        }
    };
}

pool_index!(
    /// Position slot in [`IndexedMesh::positions`].
    VertexIndex,
    "vertex"
);
pool_index!(
    /// Normal slot in [`IndexedMesh::normals`].
    NormalIndex,
    "normal"
);
pool_index!(
    /// Texture coordinate slot in [`IndexedMesh::texcoords`].
    TexcoordIndex,
    "texcoord"
);

/// Material slot in the material list returned alongside a mesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MaterialId(pub u32);

impl MaterialId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Dense array addressed only through its own index type.
#[derive(Clone, Debug, PartialEq)]
pub struct Pool<I, T> {
    items: Vec<T>,
    _index: PhantomData<fn(I)>,
}

impl<I: PoolIndex, T> Pool<I, T> {
    pub fn new() -> Self {
        Self::from_vec(Vec::new())
    }

    pub fn from_vec(items: Vec<T>) -> Self {
        Self {
            items,
            _index: PhantomData,
        }
    }

    /// Appends an item and returns its index.
    pub fn push(&mut self, item: T) -> AssetResult<I> {
        let len = self.items.len();
        let raw = u32::try_from(len).map_err(|_| AssetError::TooManyVertices(len))?;
        self.items.push(item);
        Ok(I::from_raw(raw))
    }

    #[inline]
    pub fn get(&self, index: I) -> Option<&T> {
        self.items.get(index.raw() as usize)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

impl<I: PoolIndex, T: Copy> Pool<I, T> {
    /// Copies out the item at `index`, reporting malformed input as an error.
    #[inline]
    pub fn fetch(&self, index: I) -> AssetResult<T> {
        self.get(index)
            .copied()
            .ok_or_else(|| AssetError::IndexOutOfBounds {
                kind: I::KIND,
                index: index.raw(),
                len: self.items.len(),
            })
    }
}

impl<I: PoolIndex, T> Default for Pool<I, T> {
    fn default() -> Self {
        Self::new()
    }
}

/// One vertex of a face, with independent indices into each pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Corner {
    pub vertex: VertexIndex,
    pub normal: Option<NormalIndex>,
    pub texcoord: Option<TexcoordIndex>,
}

impl Corner {
    pub fn new(
        vertex: VertexIndex,
        normal: Option<NormalIndex>,
        texcoord: Option<TexcoordIndex>,
    ) -> Self {
        Self {
            vertex,
            normal,
            texcoord,
        }
    }

    /// Corner with a position only.
    pub fn position(vertex: u32) -> Self {
        Self::new(VertexIndex(vertex), None, None)
    }
}

/// Triangle referencing three corners.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Face {
    pub corners: [Corner; 3],
    pub material: Option<MaterialId>,
}

impl Face {
    pub fn new(corners: [Corner; 3], material: Option<MaterialId>) -> Self {
        Self { corners, material }
    }
}

/// Named group of faces.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Shape {
    pub name: String,
    pub faces: Vec<Face>,
}

impl Shape {
    pub fn new(name: impl Into<String>, faces: Vec<Face>) -> Self {
        Self {
            name: name.into(),
            faces,
        }
    }
}

/// Shapes plus the pools their corners index into.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IndexedMesh {
    pub shapes: Vec<Shape>,
    pub positions: Pool<VertexIndex, [f32; 3]>,
    pub normals: Pool<NormalIndex, [f32; 3]>,
    pub texcoords: Pool<TexcoordIndex, [f32; 2]>,
}

impl IndexedMesh {
    pub fn triangle_count(&self) -> usize {
        self.shapes.iter().map(|s| s.faces.len()).sum()
    }
}

/// Surface parameters of one material.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Material {
    pub name: String,
    pub ambient: Option<[f32; 3]>,
    pub diffuse: Option<[f32; 3]>,
    pub specular: Option<[f32; 3]>,
    pub shininess: Option<f32>,
    /// Diffuse texture file name as written in the material library.
    pub diffuse_texture: Option<String>,
}

/// Start of a run of faces sharing one material, in flattened vertices.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MaterialSegment {
    pub start: u32,
    pub material: Option<MaterialId>,
}

/// Material runs of one shape.
///
/// `start` offsets are shape-local and strictly increasing; `end` is the
/// shape's flattened vertex count. `base_vertex` locates the shape inside
/// the combined [`FlatMesh`] buffers.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShapeSegments {
    pub name: String,
    pub base_vertex: u32,
    pub segments: Vec<MaterialSegment>,
    pub end: u32,
}

impl ShapeSegments {
    #[inline]
    pub fn vertex_count(&self) -> u32 {
        self.end
    }

    /// Segment starts followed by the `end` sentinel.
    pub fn offsets(&self) -> impl Iterator<Item = u32> + '_ {
        self.segments
            .iter()
            .map(|s| s.start)
            .chain((!self.segments.is_empty()).then_some(self.end))
    }

    pub fn materials(&self) -> impl Iterator<Item = Option<MaterialId>> + '_ {
        self.segments.iter().map(|s| s.material)
    }

    /// Shape-local vertex range of every segment.
    pub fn ranges(&self) -> impl Iterator<Item = (Range<u32>, Option<MaterialId>)> + '_ {
        self.segments.iter().enumerate().map(|(i, seg)| {
            let stop = self
                .segments
                .get(i + 1)
                .map_or(self.end, |next| next.start);
            (seg.start..stop, seg.material)
        })
    }
}

/// Unshared triangle soup: every triangle owns 9 position and 9 normal floats.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlatMesh {
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    pub shapes: Vec<ShapeSegments>,
    /// Factor applied to every input position.
    pub scale: f32,
}

impl FlatMesh {
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.positions.len() / 9
    }

    /// Vertex range in the combined buffers of every segment of every shape,
    /// in draw order.
    pub fn draw_ranges(&self) -> impl Iterator<Item = (Range<u32>, Option<MaterialId>)> + '_ {
        self.shapes.iter().flat_map(|shape| {
            let base = shape.base_vertex;
            shape
                .ranges()
                .map(move |(r, material)| (base + r.start..base + r.end, material))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_fetch_reports_kind_and_len() {
        let mut pool: Pool<NormalIndex, [f32; 3]> = Pool::new();
        let first = pool.push([0.0, 1.0, 0.0]).unwrap();
        assert_eq!(first, NormalIndex(0));
        assert_eq!(pool.fetch(first).unwrap(), [0.0, 1.0, 0.0]);

        let err = pool.fetch(NormalIndex(4)).unwrap_err();
        match err {
            AssetError::IndexOutOfBounds { kind, index, len } => {
                assert_eq!(kind, "normal");
                assert_eq!(index, 4);
                assert_eq!(len, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn segment_ranges_end_at_sentinel() {
        let shape = ShapeSegments {
            name: "s".into(),
            base_vertex: 30,
            segments: vec![
                MaterialSegment {
                    start: 0,
                    material: Some(MaterialId(2)),
                },
                MaterialSegment {
                    start: 9,
                    material: None,
                },
            ],
            end: 12,
        };
        assert_eq!(shape.offsets().collect::<Vec<_>>(), vec![0, 9, 12]);
        let ranges: Vec<_> = shape.ranges().collect();
        assert_eq!(ranges, vec![(0..9, Some(MaterialId(2))), (9..12, None)]);

        let flat = FlatMesh {
            shapes: vec![shape],
            ..Default::default()
        };
        let global: Vec<_> = flat.draw_ranges().map(|(r, _)| r).collect();
        assert_eq!(global, vec![30..39, 39..42]);
    }

    #[test]
    fn empty_shape_has_no_offsets() {
        let shape = ShapeSegments::default();
        assert_eq!(shape.offsets().count(), 0);
        assert_eq!(shape.ranges().count(), 0);
    }
}
