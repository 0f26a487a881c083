use super::{record_layout::DecodeError, GpuInt};
use crate::engine::operation::{Operation, OperationKind};
use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};
use std::mem::size_of;

/// Values of the `kind` field of an operation record. Must match the shader's op function enum.
#[rustfmt::skip]
pub mod op_codes {
    use super::GpuInt;
    pub const UNION:     GpuInt = 0x00000000;
    pub const SUBTRACT:  GpuInt = 0x00000001;
    pub const INTERSECT: GpuInt = 0x00000002;
    pub const BLEND:     GpuInt = 0x00000003;
}

/// One flattened operation node, before it gets packed for a specific [`OperationLayout`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OperationRecord {
    pub kind: OperationKind,
    /// Number of shapes owned by this operation. Occupies the consecutive shape records directly
    /// after the shapes owned by earlier operations.
    pub child_count: GpuInt,
    pub blend_strength: f32,
}

impl OperationRecord {
    pub fn new(operation: Operation, child_count: usize) -> Self {
        Self {
            kind: operation.kind,
            child_count: GpuInt::try_from(child_count).unwrap_or(GpuInt::MAX),
            blend_strength: operation.blend_strength,
        }
    }

    pub fn operation(&self) -> Operation {
        Operation::new(self.kind, self.blend_strength)
    }
}

/// `{ int operation; int childCount; float blendStrength; }`
#[repr(C)]
#[derive(Clone, Copy, Default, Debug, PartialEq, Pod, Zeroable)]
pub struct OperationPacket {
    pub kind: GpuInt,
    pub child_count: GpuInt,
    pub blend_strength: f32,
}

/// `{ int operation; int childCount; }` used by shaders without blend support
#[repr(C)]
#[derive(Clone, Copy, Default, Debug, PartialEq, Pod, Zeroable)]
pub struct BasicOperationPacket {
    pub kind: GpuInt,
    pub child_count: GpuInt,
}

/// _Must match the stride of the operation struct in the shader_
pub const OPERATION_PACKET_SIZE: usize = size_of::<GpuInt>() * 2 + size_of::<f32>();
pub const BASIC_OPERATION_PACKET_SIZE: usize = size_of::<GpuInt>() * 2;

const _: () = assert!(size_of::<OperationPacket>() == OPERATION_PACKET_SIZE);
const _: () = assert!(size_of::<BasicOperationPacket>() == BASIC_OPERATION_PACKET_SIZE);

/// Versions of the operation record understood by different shader builds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationLayout {
    /// kind + child count
    Basic,
    /// kind + child count + blend strength
    #[default]
    Blend,
}

impl OperationLayout {
    /// Record size in bytes
    pub const fn stride(self) -> usize {
        match self {
            Self::Basic => BASIC_OPERATION_PACKET_SIZE,
            Self::Blend => OPERATION_PACKET_SIZE,
        }
    }

    /// Appends exactly `self.stride()` bytes for `record` to `out`.
    pub fn encode_into(self, record: &OperationRecord, out: &mut Vec<u8>) {
        let kind = record.kind.op_code();
        match self {
            Self::Basic => out.extend_from_slice(bytemuck::bytes_of(&BasicOperationPacket {
                kind,
                child_count: record.child_count,
            })),
            Self::Blend => out.extend_from_slice(bytemuck::bytes_of(&OperationPacket {
                kind,
                child_count: record.child_count,
                blend_strength: record.blend_strength,
            })),
        }
    }

    pub fn encode(self, record: &OperationRecord) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.stride());
        self.encode_into(record, &mut bytes);
        bytes
    }

    /// Inverse of [`Self::encode`]. `Basic` records decode with a blend strength of 0.
    pub fn decode(self, bytes: &[u8]) -> Result<OperationRecord, DecodeError> {
        if bytes.len() != self.stride() {
            return Err(DecodeError::WrongRecordSize {
                expected: self.stride(),
                actual: bytes.len(),
            });
        }
        let (kind, child_count, blend_strength) = match self {
            Self::Basic => {
                let packet: BasicOperationPacket = bytemuck::pod_read_unaligned(bytes);
                (packet.kind, packet.child_count, 0.)
            }
            Self::Blend => {
                let packet: OperationPacket = bytemuck::pod_read_unaligned(bytes);
                (packet.kind, packet.child_count, packet.blend_strength)
            }
        };
        let kind = OperationKind::from_op_code(kind).ok_or(DecodeError::UnknownOperationCode(kind))?;
        Ok(OperationRecord {
            kind,
            child_count,
            blend_strength,
        })
    }
}

/// Packs `records` back to back, `records.len() * layout.stride()` bytes in total.
pub fn encode_operations(layout: OperationLayout, records: &[OperationRecord]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(records.len() * layout.stride());
    for record in records {
        layout.encode_into(record, &mut bytes);
    }
    bytes
}

pub fn decode_operations(
    layout: OperationLayout,
    bytes: &[u8],
) -> Result<Vec<OperationRecord>, DecodeError> {
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

#[cfg(test)]
mod tests {
    use super::*;
    use memoffset::offset_of;

    #[test]
    fn packet_field_offsets() {
        assert_eq!(offset_of!(OperationPacket, kind), 0);
        assert_eq!(offset_of!(OperationPacket, child_count), 4);
        assert_eq!(offset_of!(OperationPacket, blend_strength), 8);
        assert_eq!(OperationLayout::Blend.stride(), 12);
        assert_eq!(OperationLayout::Basic.stride(), 8);
    }

    #[test]
    fn blend_record_bytes() {
        let record = OperationRecord::new(Operation::blend(0.25), 3);
        let bytes = OperationLayout::Blend.encode(&record);
        assert_eq!(bytes.len(), 12);
        assert_eq!(&bytes[0..4], &op_codes::BLEND.to_ne_bytes());
        assert_eq!(&bytes[4..8], &3_i32.to_ne_bytes());
        assert_eq!(&bytes[8..12], &0.25_f32.to_ne_bytes());
        assert_eq!(OperationLayout::Blend.decode(&bytes), Ok(record));
    }

    #[test]
    fn basic_layout_drops_blend_strength() {
        let record = OperationRecord::new(Operation::new(OperationKind::Subtract, 0.7), 2);
        let bytes = OperationLayout::Basic.encode(&record);
        assert_eq!(bytes.len(), 8);
        let decoded = OperationLayout::Basic.decode(&bytes).unwrap();
        assert_eq!(decoded.kind, OperationKind::Subtract);
        assert_eq!(decoded.child_count, 2);
        assert_eq!(decoded.blend_strength, 0.);
    }

    #[test]
    fn decode_rejects_bad_input() {
        assert_eq!(
            OperationLayout::Blend.decode(&[0; 8]),
            Err(DecodeError::WrongRecordSize {
                expected: 12,
                actual: 8
            })
        );
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&42_i32.to_ne_bytes());
        bytes.extend_from_slice(&0_i32.to_ne_bytes());
        assert_eq!(
            OperationLayout::Basic.decode(&bytes),
            Err(DecodeError::UnknownOperationCode(42))
        );
        assert_eq!(
            decode_operations(OperationLayout::Blend, &[0; 13]),
            Err(DecodeError::TrailingBytes {
                stride: 12,
                total: 13
            })
        );
    }

    #[test]
    fn array_encoding_is_fixed_stride() {
        let records = [
            OperationRecord::new(Operation::union(), 2),
            OperationRecord::new(Operation::new(OperationKind::Intersect, 0.), 1),
        ];
        let bytes = encode_operations(OperationLayout::Blend, &records);
        assert_eq!(bytes.len(), 24);
        assert_eq!(decode_operations(OperationLayout::Blend, &bytes).unwrap(), records);
        assert!(encode_operations(OperationLayout::Blend, &[]).is_empty());
    }
}
