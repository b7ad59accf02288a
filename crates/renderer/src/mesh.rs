//! GPU-side copy of a loaded model: one interleaved vertex buffer and the
//! per-segment draw list.

use std::ops::Range;

use asset::{
    LoadedModel,
    texture::{TextureCache, TextureHandle},
};
use bytemuck::{Pod, Zeroable};
use wgpu::{
    Buffer, BufferUsages, Device, RenderPass, VertexBufferLayout, VertexStepMode,
    util::DeviceExt,
};

/// Vertex: position + normal + uv.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub const LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as u64,
        step_mode: VertexStepMode::Vertex,
        attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2],
    };
}

/// Interleave the flat position/normal/texcoord arrays of `model`.
pub fn interleave(model: &LoadedModel) -> Vec<Vertex> {
    let mesh = &model.mesh;
    mesh.positions
        .chunks_exact(3)
        .zip(mesh.normals.chunks_exact(3))
        .enumerate()
        .map(|(i, (p, n))| Vertex {
            pos: [p[0], p[1], p[2]],
            normal: [n[0], n[1], n[2]],
            uv: model
                .texcoords
                .get(2 * i..2 * i + 2)
                .map_or([0.0, 0.0], |t| [t[0], t[1]]),
        })
        .collect()
}

pub struct GpuMesh {
    vertex_buf: Buffer,
    vertex_count: u32,
    batches: Vec<(Range<u32>, Option<TextureHandle>)>,
}

impl GpuMesh {
    pub fn upload(device: &Device, model: &LoadedModel, cache: &TextureCache) -> Self {
        let vertices = interleave(model);
        let vertex_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Model VB"),
            contents: bytemuck::cast_slice(&vertices),
            usage: BufferUsages::VERTEX,
        });
        let batches = model
            .draw_batches(cache)
            .map(|b| (b.vertices, b.texture))
            .collect();

        Self {
            vertex_buf,
            vertex_count: vertices.len() as u32,
            batches,
        }
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn batch_count(&self) -> usize {
        self.batches.len()
    }

    /// One draw call per material segment. `bind` is called before each draw
    /// to set whatever the segment's texture needs.
    pub fn draw<'p>(
        &self,
        rpass: &mut RenderPass<'p>,
        mut bind: impl FnMut(&mut RenderPass<'p>, Option<TextureHandle>),
    ) {
        rpass.set_vertex_buffer(0, self.vertex_buf.slice(..));
        for (range, texture) in &self.batches {
            bind(&mut *rpass, *texture);
            rpass.draw(range.clone(), 0..1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use asset::mesh::FlatMesh;

    #[test]
    fn interleave_pairs_attributes_per_vertex() {
        let model = LoadedModel {
            mesh: FlatMesh {
                positions: (0..9).map(|i| i as f32).collect(),
                normals: vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
                shapes: Vec::new(),
                scale: 1.0,
            },
            texcoords: vec![0.0, 1.0, 0.5, 0.5, 1.0, 0.0],
            materials: Vec::new(),
        };
        let vertices = interleave(&model);
        assert_eq!(vertices.len(), 3);
        assert_eq!(vertices[1].pos, [3.0, 4.0, 5.0]);
        assert_eq!(vertices[2].normal, [0.0, 0.0, 1.0]);
        assert_eq!(vertices[2].uv, [1.0, 0.0]);
        assert_eq!(bytemuck::cast_slice::<Vertex, f32>(&vertices).len(), 24);
    }
}
