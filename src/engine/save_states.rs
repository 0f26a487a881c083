use super::{
    config_engine::{
        SAVE_STATE_FILENAME_CAMERA, SAVE_STATE_FILENAME_SCENE, SAVE_STATE_FILENAME_SETTINGS,
    },
    scene_graph::SceneSnapshot,
};
use crate::{
    camera::Camera,
    config::{PRECURSOR_BYTES, PRECURSOR_BYTE_COUNT},
    helper::more_errors::IoError,
    renderer::render_settings::RenderSettings,
};
use serde::{de::DeserializeOwned, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ~~ Public ~~

pub fn save_state_camera(storage_dir: &Path, camera: &Camera) -> Result<(), IoError> {
    save_state(storage_dir, camera, SAVE_STATE_FILENAME_CAMERA)
}

pub fn load_state_camera(storage_dir: &Path) -> Result<Camera, IoError> {
    load_state::<Camera>(storage_dir, SAVE_STATE_FILENAME_CAMERA)
}

pub fn save_state_settings(storage_dir: &Path, settings: &RenderSettings) -> Result<(), IoError> {
    save_state(storage_dir, settings, SAVE_STATE_FILENAME_SETTINGS)
}

pub fn load_state_settings(storage_dir: &Path) -> Result<RenderSettings, IoError> {
    load_state::<RenderSettings>(storage_dir, SAVE_STATE_FILENAME_SETTINGS)
}

pub fn save_state_scene(storage_dir: &Path, scene: &SceneSnapshot) -> Result<(), IoError> {
    save_state(storage_dir, scene, SAVE_STATE_FILENAME_SCENE)
}

pub fn load_state_scene(storage_dir: &Path) -> Result<SceneSnapshot, IoError> {
    load_state::<SceneSnapshot>(storage_dir, SAVE_STATE_FILENAME_SCENE)
}

// ~~ Private ~~

fn save_state(
    storage_dir: &Path,
    to_serialize: &impl Serialize,
    file_name: &str,
) -> Result<(), IoError> {
    let encoded_bytes = bincode::serialize(to_serialize).map_err(IoError::SerializeFailed)?;
    save_state_bytes(storage_dir, file_name, encoded_bytes)
}

fn save_state_bytes(
    storage_dir: &Path,
    file_name: &str,
    mut encoded_bytes: Vec<u8>,
) -> Result<(), IoError> {
    // prepend encoded bytes with engine info
    let mut write_bytes = PRECURSOR_BYTES.to_vec();
    write_bytes.append(&mut encoded_bytes);

    let file_path = validated_file_path(storage_dir, file_name)?;
    fs::write(&file_path, write_bytes)
        .map_err(|e| IoError::WriteFileFailed(path_string(&file_path), e))?;
    Ok(())
}

fn load_state<T>(storage_dir: &Path, file_name: &str) -> Result<T, IoError>
where
    T: DeserializeOwned,
{
    let encoded_bytes = load_state_bytes(storage_dir, file_name)?;
    bincode::deserialize::<T>(&encoded_bytes).map_err(IoError::DeserializeFailed)
}

fn load_state_bytes(storage_dir: &Path, file_name: &str) -> Result<Vec<u8>, IoError> {
    let file_path = storage_dir.join(file_name);
    let mut read_bytes = fs::read(&file_path)
        .map_err(|io_error| IoError::read_file_error(io_error, path_string(&file_path)))?;

    if !read_bytes.starts_with(&PRECURSOR_BYTES) {
        return Err(IoError::PrecursorMismatch(path_string(&file_path)));
    }
    read_bytes.drain(0..PRECURSOR_BYTE_COUNT);
    Ok(read_bytes)
}

/// Ensures containing directories exist, but not the actual file
fn validated_file_path(storage_dir: &Path, file_name: &str) -> Result<PathBuf, IoError> {
    // create dir if missing
    fs::create_dir_all(storage_dir)
        .map_err(|e| IoError::CreateDirectoryFailed(path_string(storage_dir), e))?;
    Ok(storage_dir.join(file_name))
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

// ~~ Tests ~~
