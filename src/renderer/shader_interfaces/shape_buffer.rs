use super::{record_layout::DecodeError, GpuInt};
use crate::engine::shape::{Shape, ShapeKind};
use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::mem::size_of;

/// Values of the `shape` field of a shape record. Must match the shader's shape enum.
#[rustfmt::skip]
pub mod shape_codes {
    use super::GpuInt;
    pub const SPHERE:      GpuInt = 0x00000000;
    pub const BOX:         GpuInt = 0x00000001;
    pub const TORUS:       GpuInt = 0x00000002;
    pub const CONE:        GpuInt = 0x00000003;
    pub const ROUNDED_BOX: GpuInt = 0x00000004;
}

/// Written to the `index` field of shapes that no operation owns
pub const NO_OWNER_INDEX: GpuInt = -1;

/// One flattened shape node, before it gets packed for a specific [`ShapeLayout`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShapeRecord {
    /// World space position
    pub position: Vec3,
    pub shape: Shape,
    /// Index of the owning operation in the operation array, or [`NO_OWNER_INDEX`]
    pub index: GpuInt,
}

impl ShapeRecord {
    pub fn new(position: Vec3, shape: Shape, owner: Option<usize>) -> Self {
        let index = owner
            .map(|owner| GpuInt::try_from(owner).unwrap_or(NO_OWNER_INDEX))
            .unwrap_or(NO_OWNER_INDEX);
        Self {
            position,
            shape,
            index,
        }
    }

    pub fn owner(&self) -> Option<usize> {
        usize::try_from(self.index).ok()
    }
}

/// 16 floats + 2 ints. Field order must match the shader's shape struct.
#[repr(C)]
#[derive(Clone, Copy, Default, Debug, PartialEq, Pod, Zeroable)]
pub struct ShapePacket {
    pub position: [f32; 3],
    pub shape: GpuInt,
    pub sphere_radius: f32,
    pub box_dimensions: [f32; 3],
    pub round_box_dimensions: [f32; 3],
    pub round_box_factor: f32,
    pub torus_outer_radius: f32,
    pub torus_inner_radius: f32,
    pub cone_height: f32,
    pub cone_ratio: [f32; 2],
    pub index: GpuInt,
}

/// Same as [`ShapePacket`] with an rgb color after the shape code, for shaders that color
/// shapes individually.
#[repr(C)]
#[derive(Clone, Copy, Default, Debug, PartialEq, Pod, Zeroable)]
pub struct ColoredShapePacket {
    pub position: [f32; 3],
    pub shape: GpuInt,
    pub color: [f32; 3],
    pub sphere_radius: f32,
    pub box_dimensions: [f32; 3],
    pub round_box_dimensions: [f32; 3],
    pub round_box_factor: f32,
    pub torus_outer_radius: f32,
    pub torus_inner_radius: f32,
    pub cone_height: f32,
    pub cone_ratio: [f32; 2],
    pub index: GpuInt,
}

/// _Must match the stride of the shape struct in the shader_
pub const SHAPE_PACKET_SIZE: usize = size_of::<f32>() * 16 + size_of::<GpuInt>() * 2;
pub const COLORED_SHAPE_PACKET_SIZE: usize = SHAPE_PACKET_SIZE + size_of::<f32>() * 3;

const _: () = assert!(size_of::<ShapePacket>() == SHAPE_PACKET_SIZE);
const _: () = assert!(size_of::<ColoredShapePacket>() == COLORED_SHAPE_PACKET_SIZE);

/// Versions of the shape record understood by different shader builds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeLayout {
    #[default]
    Plain,
    Colored,
}

impl ShapeLayout {
    /// Record size in bytes
    pub const fn stride(self) -> usize {
        match self {
            Self::Plain => SHAPE_PACKET_SIZE,
            Self::Colored => COLORED_SHAPE_PACKET_SIZE,
        }
    }

    /// Byte offsets of the `shape` and `index` fields, for logging/debugging shader mismatches
    pub fn kind_and_index_offsets(self) -> (usize, usize) {
        match self {
            Self::Plain => (
                memoffset::offset_of!(ShapePacket, shape),
                memoffset::offset_of!(ShapePacket, index),
            ),
            Self::Colored => (
                memoffset::offset_of!(ColoredShapePacket, shape),
                memoffset::offset_of!(ColoredShapePacket, index),
            ),
        }
    }

    /// Appends exactly `self.stride()` bytes for `record` to `out`. Every parameter is written
    /// regardless of the shape kind so the stride stays constant.
    pub fn encode_into(self, record: &ShapeRecord, out: &mut Vec<u8>) {
        let shape = &record.shape;
        match self {
            Self::Plain => out.extend_from_slice(bytemuck::bytes_of(&ShapePacket {
                position: record.position.to_array(),
                shape: shape.kind.shape_code(),
                sphere_radius: shape.sphere_radius,
                box_dimensions: shape.box_dimensions.to_array(),
                round_box_dimensions: shape.round_box_dimensions.to_array(),
                round_box_factor: shape.round_box_factor,
                torus_outer_radius: shape.torus_outer_radius,
                torus_inner_radius: shape.torus_inner_radius,
                cone_height: shape.cone_height,
                cone_ratio: shape.cone_ratio.to_array(),
                index: record.index,
            })),
            Self::Colored => out.extend_from_slice(bytemuck::bytes_of(&ColoredShapePacket {
                position: record.position.to_array(),
                shape: shape.kind.shape_code(),
                color: shape.color.to_array(),
                sphere_radius: shape.sphere_radius,
                box_dimensions: shape.box_dimensions.to_array(),
                round_box_dimensions: shape.round_box_dimensions.to_array(),
                round_box_factor: shape.round_box_factor,
                torus_outer_radius: shape.torus_outer_radius,
                torus_inner_radius: shape.torus_inner_radius,
                cone_height: shape.cone_height,
                cone_ratio: shape.cone_ratio.to_array(),
                index: record.index,
            })),
        }
    }

    pub fn encode(self, record: &ShapeRecord) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.stride());
        self.encode_into(record, &mut bytes);
        bytes
    }

    /// Inverse of [`Self::encode`]. `Plain` records decode with a zero color.
    pub fn decode(self, bytes: &[u8]) -> Result<ShapeRecord, DecodeError> {
        if bytes.len() != self.stride() {
            return Err(DecodeError::WrongRecordSize {
                expected: self.stride(),
                actual: bytes.len(),
            });
        }
        let packet = match self {
            Self::Plain => {
                let packet: ShapePacket = bytemuck::pod_read_unaligned(bytes);
                ColoredShapePacket {
                    position: packet.position,
                    shape: packet.shape,
                    color: [0.; 3],
                    sphere_radius: packet.sphere_radius,
                    box_dimensions: packet.box_dimensions,
                    round_box_dimensions: packet.round_box_dimensions,
                    round_box_factor: packet.round_box_factor,
                    torus_outer_radius: packet.torus_outer_radius,
                    torus_inner_radius: packet.torus_inner_radius,
                    cone_height: packet.cone_height,
                    cone_ratio: packet.cone_ratio,
                    index: packet.index,
                }
            }
            Self::Colored => bytemuck::pod_read_unaligned(bytes),
        };
        let kind = ShapeKind::from_shape_code(packet.shape)
            .ok_or(DecodeError::UnknownShapeCode(packet.shape))?;
        Ok(ShapeRecord {
            position: Vec3::from_array(packet.position),
            shape: Shape {
                kind,
                sphere_radius: packet.sphere_radius,
                box_dimensions: Vec3::from_array(packet.box_dimensions),
                round_box_dimensions: Vec3::from_array(packet.round_box_dimensions),
                round_box_factor: packet.round_box_factor,
                torus_outer_radius: packet.torus_outer_radius,
                torus_inner_radius: packet.torus_inner_radius,
                cone_height: packet.cone_height,
                cone_ratio: Vec2::from_array(packet.cone_ratio),
                color: Vec3::from_array(packet.color),
            },
            index: packet.index,
        })
    }
}

/// Packs `records` back to back, `records.len() * layout.stride()` bytes in total.
pub fn encode_shapes(layout: ShapeLayout, records: &[ShapeRecord]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(records.len() * layout.stride());
    for record in records {
        layout.encode_into(record, &mut bytes);
    }
    bytes
}

pub fn decode_shapes(layout: ShapeLayout, bytes: &[u8]) -> Result<Vec<ShapeRecord>, DecodeError> {
    if bytes.len() % layout.stride() != 0 {
        return Err(DecodeError::TrailingBytes {
            stride: layout.stride(),
            total: bytes.len(),
        });
    }
    bytes
        .chunks_exact(layout.stride())
        .map(|chunk| layout.decode(chunk))
        .collect()
}
