use glam::{Mat4, Quat, Vec3};
use wgpu::util::DeviceExt;
use bytemuck::{Pod, Zeroable};

use crate::controller::Simulation;

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub normal: [f32; 3],
}

/// Per-box data: model matrix columns and a flat colour.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Instance {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
}

impl Instance {
    pub fn new(model: Mat4, color: [f32; 4]) -> Self {
        Self { model: model.to_cols_array_2d(), color }
    }
}

pub const GROUND_COLOR: [f32; 4] = [0.33, 0.55, 0.3, 1.0];
pub const VEHICLE_COLOR: [f32; 4] = [0.85, 0.2, 0.15, 1.0];
pub const OBSTACLE_COLOR: [f32; 4] = [0.55, 0.5, 0.45, 1.0];

const GROUND_THICKNESS: f32 = 0.1;

pub struct MeshBuffer {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

#[derive(Debug, Clone)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn upload(&self, device: &wgpu::Device) -> MeshBuffer {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Vertex Buffer"),
            contents: bytemuck::cast_slice(&self.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Index Buffer"),
            contents: bytemuck::cast_slice(&self.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        MeshBuffer {
            vertex_buffer,
            index_buffer,
            index_count: self.indices.len() as u32,
        }
    }
}

/// Unit cube centred on the origin, one quad per face so normals stay flat.
pub fn create_cube_mesh() -> Mesh {
    // (normal, tangent u, tangent v) with u x v == normal for CCW winding
    let faces = [
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (normal, u, v) in faces {
        let base = vertices.len() as u32;
        for (su, sv) in [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)] {
            let p = normal * 0.5 + u * su + v * sv;
            vertices.push(Vertex { pos: p.to_array(), normal: normal.to_array() });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    Mesh { vertices, indices }
}

/// Everything drawn this frame: ground first, then the vehicle, then obstacles.
pub fn scene_instances(sim: &Simulation) -> Vec<Instance> {
    let size = sim.config.world_size;
    let ground = Mat4::from_scale_rotation_translation(
        Vec3::new(size, GROUND_THICKNESS, size),
        Quat::IDENTITY,
        Vec3::new(0.0, -GROUND_THICKNESS / 2.0, 0.0),
    );

    let mut instances = Vec::with_capacity(sim.obstacles.len() + 2);
    instances.push(Instance::new(ground, GROUND_COLOR));
    instances.push(Instance::new(sim.vehicle.transform(), VEHICLE_COLOR));
    instances.extend(sim.obstacles.iter().map(|o| Instance::new(o.transform(), OBSTACLE_COLOR)));
    instances
}
