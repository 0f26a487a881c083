use std::{error, fmt, io};

/// `from_err_impl!(SceneGraphError, UniqueIdError)` implements `From<UniqueIdError>` for
/// `SceneGraphError`, wrapping it in the variant of the same name.
macro_rules! from_err_impl {
    ($parent:ty, $nested:ident) => {
        impl From<$nested> for $parent {
            fn from(e: $nested) -> Self {
                Self::$nested(e)
            }
        }
    };
}
pub(crate) use from_err_impl;

#[derive(Debug)]
pub enum IoError {
    CreateDirectoryFailed(String, io::Error),
    WriteFileFailed(String, io::Error),
    ReadFileFailed(String, io::Error),
    FileNotFound(String),
    /// The file doesn't start with the expected precursor bytes (written by another program or an
    /// older version of this one)
    PrecursorMismatch(String),
    SerializeFailed(bincode::Error),
    DeserializeFailed(bincode::Error),
}

impl IoError {
    pub fn read_file_error(io_error: io::Error, file_path: String) -> Self {
        if io_error.kind() == io::ErrorKind::NotFound {
            Self::FileNotFound(file_path)
        } else {
            Self::ReadFileFailed(file_path, io_error)
        }
    }
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::CreateDirectoryFailed(dir, _) => write!(f, "failed to create directory {}", dir),
            Self::WriteFileFailed(file, _) => write!(f, "failed to write file {}", file),
            Self::ReadFileFailed(file, _) => write!(f, "failed to read file {}", file),
            Self::FileNotFound(file) => write!(f, "file {} not found", file),
            Self::PrecursorMismatch(file) => {
                write!(f, "file {} has missing or unexpected header bytes", file)
            }
            Self::SerializeFailed(_) => write!(f, "failed to serialize save state"),
            Self::DeserializeFailed(_) => write!(f, "failed to deserialize save state"),
        }
    }
}

impl error::Error for IoError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::CreateDirectoryFailed(_, e)
            | Self::WriteFileFailed(_, e)
            | Self::ReadFileFailed(_, e) => Some(e),
            Self::SerializeFailed(e) | Self::DeserializeFailed(e) => Some(&**e),
            Self::FileNotFound(_) | Self::PrecursorMismatch(_) => None,
        }
    }
}
