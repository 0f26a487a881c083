use super::{operation_buffer::OperationLayout, shape_buffer::ShapeLayout, GpuInt};
use serde::{Deserialize, Serialize};
use std::{error, fmt};

/// Which record versions the bound shader expects. Pick once per shader, never per frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordLayout {
    pub operation: OperationLayout,
    pub shape: ShapeLayout,
}

impl RecordLayout {
    pub const fn new(operation: OperationLayout, shape: ShapeLayout) -> Self {
        Self { operation, shape }
    }
}

impl fmt::Display for RecordLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "operations {:?} ({} bytes), shapes {:?} ({} bytes)",
            self.operation,
            self.operation.stride(),
            self.shape,
            self.shape.stride()
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    WrongRecordSize { expected: usize, actual: usize },
    /// Byte slice length isn't a multiple of the record stride
    TrailingBytes { stride: usize, total: usize },
    UnknownOperationCode(GpuInt),
    UnknownShapeCode(GpuInt),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongRecordSize { expected, actual } => write!(
                f,
                "record is {} bytes but the layout expects {} bytes",
                actual, expected
            ),
            Self::TrailingBytes { stride, total } => write!(
                f,
                "{} bytes is not a whole number of {} byte records",
                total, stride
            ),
            Self::UnknownOperationCode(code) => write!(f, "unknown operation code {}", code),
            Self::UnknownShapeCode(code) => write!(f, "unknown shape code {}", code),
        }
    }
}

impl error::Error for DecodeError {}
