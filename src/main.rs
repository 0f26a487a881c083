use anyhow::Context;
use glam::{Quat, UVec2, Vec2, Vec3};
#[allow(unused_imports)]
use log::{debug, error, info, trace, warn};
use raymarch_csg::{
    camera::Camera,
    config,
    engine::{
        config_engine::{DEFAULT_CAMERA_POSITION, LOCAL_STORAGE_DIR},
        operation::{Operation, OperationKind},
        save_states::{
            load_state_camera, load_state_scene, load_state_settings, save_state_camera,
            save_state_scene, save_state_settings,
        },
        scene_graph::SceneGraph,
        shape::Shape,
    },
    helper::{anyhow_panic::anyhow_unwrap, logger::ConsoleLogger, more_errors::IoError},
    renderer::{
        config_renderer::{DEFAULT_RECORD_LAYOUT, RAYMARCH_SHADER_NAME},
        headless_backend::{HeadlessBackend, HeadlessImage},
        render_backend::ShaderHandle,
        render_manager::{FrameOutcome, RenderManager},
        render_settings::RenderSettings,
    },
};
use std::path::Path;

const RESOLUTION: UVec2 = UVec2::new(320, 180);

fn main() {
    if let Err(e) = ConsoleLogger::init(config::log_level_from_env()) {
        eprintln!("failed to initialize logger: {}", e);
    }
    info!("starting {}...", config::ENGINE_NAME);

    anyhow_unwrap(run(), "run headless raymarcher");

    info!("{} shut down cleanly", config::ENGINE_NAME);
}

fn run() -> anyhow::Result<()> {
    let storage_dir = Path::new(LOCAL_STORAGE_DIR);

    let settings = load_or_default("render settings", load_state_settings(storage_dir))
        .unwrap_or_default();
    let mut camera = load_or_default("camera", load_state_camera(storage_dir))
        .unwrap_or_else(|| Camera::new(RESOLUTION));
    camera.set_aspect_ratio(RESOLUTION);
    let scene = match load_or_default("scene", load_state_scene(storage_dir)) {
        Some(snapshot) => SceneGraph::from_snapshot(snapshot).or_else(|e| {
            warn!("saved scene is unusable ({}). building the demo scene", e);
            demo_scene()
        })?,
        None => demo_scene()?,
    };
    info!("scene has {} node(s)", scene.len());

    let shader = ShaderHandle::new(RAYMARCH_SHADER_NAME);
    let mut backend = HeadlessBackend::new();
    backend.register_shader(&shader);
    let mut render_manager = RenderManager::new(Some(shader), DEFAULT_RECORD_LAYOUT, settings);

    let source = HeadlessImage::gradient(RESOLUTION.x, RESOLUTION.y);
    let mut destination = HeadlessImage::new(RESOLUTION.x, RESOLUTION.y);

    let frame_count = config::frame_count_from_env();
    let orbit_start = camera.position();
    let mut rendered_frames = 0;
    for frame in 0..frame_count {
        // one full orbit around the origin over the run
        let orbit_angle = std::f32::consts::TAU * frame as f32 / frame_count as f32;
        camera.set_position(Quat::from_rotation_y(orbit_angle) * orbit_start);
        if let Err(e) = camera.look_at(Vec3::ZERO) {
            debug!("keeping previous camera orientation: {}", e);
        }

        let outcome = render_manager
            .render_frame(&mut backend, &scene, &scene, &camera, &source, &mut destination)
            .with_context(|| format!("rendering frame {}", frame))?;
        if let FrameOutcome::Rendered(_) = outcome {
            rendered_frames += 1;
        }
    }

    render_manager.release_material(&mut backend);

    let stats = backend.stats();
    info!(
        "rendered {}/{} frame(s). buffers created = {}, released = {}, live = {}. materials live = {}",
        rendered_frames,
        frame_count,
        stats.buffers_created,
        stats.buffers_released,
        backend.live_buffer_count(),
        backend.live_material_count()
    );

    camera.set_position(orbit_start);
    save_all(storage_dir, &camera, render_manager.settings(), &scene);
    Ok(())
}

/// `None` if there's no saved state yet or it can't be read
fn load_or_default<T>(what: &str, load_res: Result<T, IoError>) -> Option<T> {
    match load_res {
        Ok(loaded) => {
            debug!("loaded saved {}", what);
            Some(loaded)
        }
        Err(IoError::FileNotFound(_)) => {
            info!("no saved {} found. using defaults", what);
            None
        }
        Err(e) => {
            warn!("failed to load saved {}: {}. using defaults", what, e);
            None
        }
    }
}

fn save_all(storage_dir: &Path, camera: &Camera, settings: &RenderSettings, scene: &SceneGraph) {
    if let Err(e) = save_state_camera(storage_dir, camera) {
        warn!("error while saving camera state: {}", e);
    }
    if let Err(e) = save_state_settings(storage_dir, settings) {
        warn!("error while saving render settings: {}", e);
    }
    if let Err(e) = save_state_scene(storage_dir, &scene.snapshot()) {
        warn!("error while saving scene: {}", e);
    }
}

fn demo_scene() -> anyhow::Result<SceneGraph> {
    let mut scene = SceneGraph::new();

    scene.add_directional_light(
        "sun",
        Quat::from_rotation_x(-std::f32::consts::FRAC_PI_3),
    )?;

    let union = scene.add_operation("base", None, Operation::union())?;
    scene.add_shape(
        "floor",
        Some(union),
        Vec3::new(0., -1., 0.),
        Shape::cube(Vec3::new(3., 0.1, 3.)).with_color(Vec3::new(0.4, 0.4, 0.45)),
    )?;
    scene.add_shape(
        "pillar",
        Some(union),
        Vec3::new(-1.5, 0., 0.),
        Shape::rounded_box(Vec3::new(0.3, 1., 0.3), 0.1),
    )?;

    let carved = scene.add_group("carved", Some(union), Vec3::new(1.2, 0., 0.))?;
    let subtract = scene.add_operation(
        "carve",
        Some(carved),
        Operation::new(OperationKind::Subtract, 0.),
    )?;
    scene.add_shape(
        "block",
        Some(subtract),
        Vec3::ZERO,
        Shape::cube(Vec3::splat(0.5)).with_color(Vec3::new(0.9, 0.3, 0.2)),
    )?;
    scene.add_shape("hole", Some(subtract), Vec3::ZERO, Shape::sphere(0.65))?;

    let blend = scene.add_operation("melt", None, Operation::blend(0.4))?;
    scene.add_shape(
        "ring",
        Some(blend),
        Vec3::new(0., 0.5, -1.),
        Shape::torus(0.6, 0.15).with_color(Vec3::new(0.2, 0.6, 0.9)),
    )?;
    scene.add_shape(
        "spike",
        Some(blend),
        Vec3::new(0., 1., -1.),
        Shape::cone(1., Vec2::new(0.5, 1.)),
    )?;

    let intersect = scene.add_operation(
        "lens",
        None,
        Operation::new(OperationKind::Intersect, 0.),
    )?;
    scene.add_shape("lens a", Some(intersect), Vec3::new(0., 2., 0.4), Shape::sphere(0.6))?;
    scene.add_shape("lens b", Some(intersect), Vec3::new(0., 2., -0.4), Shape::sphere(0.6))?;

    // unowned, rendered as a plain union after every operation
    scene.add_shape("moon", None, DEFAULT_CAMERA_POSITION * 2., Shape::default())?;

    Ok(scene)
}
