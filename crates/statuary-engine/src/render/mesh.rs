use std::path::Path;

use anyhow::{Context, Result};
use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use super::texture::Texture;

/// Interleaved scene vertex: position, normal, texcoord.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x3, // normal
        2 => Float32x2  // uv
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Indexed triangle list on the GPU.
pub struct Mesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
    /// Index into the owning model's materials.
    pub material: usize,
}

impl Mesh {
    pub fn new(
        device: &wgpu::Device,
        label: &str,
        vertices: &[Vertex],
        indices: &[u32],
        material: usize,
    ) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} vbo")),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} ibo")),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
            material,
        }
    }
}

/// Diffuse + specular maps for one surface.
pub struct Material {
    pub diffuse: Texture,
    pub specular: Texture,
}

impl Material {
    /// Material with 1x1 white diffuse and black specular maps.
    pub fn fallback(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self {
            diffuse: Texture::solid(device, queue, "fallback diffuse", [255, 255, 255, 255]),
            specular: Texture::solid(device, queue, "fallback specular", [0, 0, 0, 255]),
        }
    }
}

/// Meshes sharing a material table.
///
/// Every mesh's `material` indexes into `materials`.
pub struct Model {
    pub meshes: Vec<Mesh>,
    pub materials: Vec<Material>,
}

impl Model {
    /// A single mesh with a single material.
    pub fn from_parts(mesh: Mesh, material: Material) -> Self {
        Self {
            meshes: vec![Mesh { material: 0, ..mesh }],
            materials: vec![material],
        }
    }

    /// Loads a Wavefront OBJ and the textures named by its MTL file.
    ///
    /// Texture paths are resolved relative to the OBJ's directory. Meshes
    /// without a material, and materials without a map, use the fallback
    /// white diffuse / black specular maps.
    pub fn load_obj(device: &wgpu::Device, queue: &wgpu::Queue, path: &Path) -> Result<Self> {
        let (shapes, materials) = tobj::load_obj(
            path,
            &tobj::LoadOptions {
                single_index: true,
                triangulate: true,
                ..Default::default()
            },
        )
        .with_context(|| format!("failed to load OBJ {}", path.display()))?;

        let obj_materials = materials.unwrap_or_else(|e| {
            log::warn!("no materials for {}: {e}", path.display());
            Vec::new()
        });

        let dir = path.parent().unwrap_or_else(|| Path::new("."));

        let mut out_materials = Vec::with_capacity(obj_materials.len() + 1);
        for m in &obj_materials {
            let diffuse = match m.diffuse_texture.as_deref() {
                Some(file) => Texture::load(device, queue, &dir.join(file))?,
                None => Texture::solid(device, queue, "fallback diffuse", [255, 255, 255, 255]),
            };
            let specular = match m.specular_texture.as_deref() {
                Some(file) => Texture::load(device, queue, &dir.join(file))?,
                None => Texture::solid(device, queue, "fallback specular", [0, 0, 0, 255]),
            };
            out_materials.push(Material { diffuse, specular });
        }

        // Trailing slot for meshes that reference no material.
        let fallback_index = out_materials.len();
        out_materials.push(Material::fallback(device, queue));

        let mut meshes = Vec::with_capacity(shapes.len());
        for shape in &shapes {
            let m = &shape.mesh;
            let vertices = interleave(&m.positions, &m.normals, &m.texcoords);
            let material = m
                .material_id
                .filter(|&id| id < obj_materials.len())
                .unwrap_or(fallback_index);
            meshes.push(Mesh::new(device, &shape.name, &vertices, &m.indices, material));
        }

        log::info!(
            "loaded model {} ({} meshes, {} materials)",
            path.display(),
            meshes.len(),
            obj_materials.len()
        );

        Ok(Self {
            meshes,
            materials: out_materials,
        })
    }
}

/// Builds interleaved vertices from flat OBJ attribute arrays.
///
/// Missing normals or texcoords are zero-filled.
pub(crate) fn interleave(positions: &[f32], normals: &[f32], texcoords: &[f32]) -> Vec<Vertex> {
    let count = positions.len() / 3;
    (0..count)
        .map(|i| {
            let p = &positions[i * 3..i * 3 + 3];
            let normal = normals
                .get(i * 3..i * 3 + 3)
                .map_or([0.0; 3], |n| [n[0], n[1], n[2]]);
            let uv = texcoords
                .get(i * 2..i * 2 + 2)
                .map_or([0.0; 2], |t| [t[0], t[1]]);
            Vertex {
                position: [p[0], p[1], p[2]],
                normal,
                uv,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── interleave ────────────────────────────────────────────────────────

    #[test]
    fn interleave_full_attributes() {
        let v = interleave(
            &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
            &[0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
            &[0.5, 0.25, 1.0, 0.0],
        );
        assert_eq!(v.len(), 2);
        assert_eq!(v[1].position, [4.0, 5.0, 6.0]);
        assert_eq!(v[1].normal, [0.0, 0.0, 1.0]);
        assert_eq!(v[0].uv, [0.5, 0.25]);
    }

    #[test]
    fn interleave_zero_fills_missing() {
        let v = interleave(&[1.0, 2.0, 3.0], &[], &[]);
        assert_eq!(v[0].normal, [0.0; 3]);
        assert_eq!(v[0].uv, [0.0; 2]);
    }

    // ── layout ────────────────────────────────────────────────────────────

    #[test]
    fn vertex_stride_is_tight() {
        assert_eq!(std::mem::size_of::<Vertex>(), 32);
        assert_eq!(Vertex::layout().array_stride, 32);
    }
}
