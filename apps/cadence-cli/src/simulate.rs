use cadence_common::{BoxError, Viewport};
use cadence_input::InputState;
use cadence_kernel::{EngineConfig, EngineError, GameEngine, GameLogic, HeadlessWindow, ManualClock, Surface};
use cadence_render::{FrameRenderer, Gpu, GpuMesh, HeadlessGpu, HeadlessMesh, MeshData, ShaderSource};
use cadence_scene::{Material, Scene, SceneItem};
use glam::{Vec3, Vec4};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Degrees each cube turns per update.
const SPIN_STEP: f32 = 1.5;

/// A row of cubes spinning on the recording backend.
pub struct SpinningCubes {
    gpu: HeadlessGpu,
    renderer: FrameRenderer<HeadlessGpu>,
    scene: Scene<HeadlessMesh>,
    items: usize,
    /// Draws issued so far; the backend's own log is cleared every frame.
    draws: usize,
}

impl SpinningCubes {
    pub fn new(items: usize) -> Self {
        Self {
            gpu: HeadlessGpu::new(),
            renderer: FrameRenderer::new(),
            scene: Scene::new(),
            items,
            draws: 0,
        }
    }

    pub fn gpu(&self) -> &HeadlessGpu {
        &self.gpu
    }

    pub fn draws(&self) -> usize {
        self.draws
    }
}

impl GameLogic<HeadlessWindow> for SpinningCubes {
    fn init(&mut self, window: &mut HeadlessWindow) -> Result<(), BoxError> {
        self.gpu.set_viewport(window.size());
        self.renderer
            .init(&mut self.gpu, &ShaderSource::new("scene", "headless vertex", "headless fragment"))?;
        let mesh = Arc::new(self.gpu.create_mesh(
            &MeshData::cube(),
            Material::from_colour(Vec4::new(0.8, 0.3, 0.2, 1.0), 0.5),
            None,
        )?);
        for i in 0..self.items {
            let x = (i as f32 - (self.items as f32 - 1.0) / 2.0) * 2.0;
            self.scene
                .add_item(SceneItem::new(mesh.clone()).with_position(Vec3::new(x, 0.0, -5.0)));
        }
        Ok(())
    }

    fn input(&mut self, _window: &HeadlessWindow) {}

    fn update(&mut self, _interval: f32, _input: &InputState) -> Result<(), BoxError> {
        for item in self.scene.items_mut() {
            item.rotation.y = (item.rotation.y + SPIN_STEP) % 360.0;
        }
        Ok(())
    }

    fn render(&mut self, window: &mut HeadlessWindow) -> Result<(), BoxError> {
        self.renderer.render(window, &mut self.gpu, &self.scene)?;
        self.draws += self.gpu.draws().len();
        self.gpu.clear_log();
        Ok(())
    }

    fn cleanup(&mut self) {
        // Meshes (and their textures) go before the program.
        for mut mesh in self.scene.teardown() {
            mesh.release();
        }
        self.renderer.cleanup();
    }
}

/// Outcome of a headless run.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub frames: u64,
    pub updates: u64,
    pub draws: usize,
    pub viewport: Viewport,
    pub live_resources: usize,
}

#[derive(Debug, Clone)]
pub struct SimulationParams {
    pub frames: u64,
    pub frame_time: Duration,
    pub items: usize,
    pub width: u32,
    pub height: u32,
}

/// Run the loop on a manual clock: every frame observes `frame_time` elapsed.
pub fn run(config: EngineConfig, params: &SimulationParams) -> Result<SimulationReport, EngineError> {
    let window = HeadlessWindow::new(params.width, params.height).close_after_frames(params.frames);
    let clock = ManualClock::scripted(std::iter::repeat_n(params.frame_time, params.frames as usize));
    let mut engine = GameEngine::with_clock(config, window, SpinningCubes::new(params.items), clock);
    let stats = engine.run()?;
    let logic = engine.logic();
    let gpu = logic.gpu();
    let report = SimulationReport {
        frames: stats.frames,
        updates: stats.updates,
        draws: logic.draws(),
        viewport: gpu.viewport(),
        live_resources: gpu.live_resources(),
    };
    tracing::info!(
        frames = report.frames,
        updates = report.updates,
        draws = report.draws,
        live_resources = report.live_resources,
        "simulation finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(frames: u64, frame_ms: u64) -> SimulationParams {
        SimulationParams {
            frames,
            frame_time: Duration::from_millis(frame_ms),
            items: 3,
            width: 800,
            height: 600,
        }
    }

    #[test]
    fn hundred_ms_frames_at_thirty_ups() {
        let report = run(EngineConfig::default(), &params(10, 100)).unwrap();
        assert_eq!(report.frames, 10);
        assert_eq!(report.updates, 30);
        assert_eq!(report.draws, 30);
        assert_eq!(report.viewport, Viewport::new(800, 600));
        assert_eq!(report.live_resources, 0);
    }

    #[test]
    fn draw_log_does_not_grow_across_frames() {
        let window = HeadlessWindow::new(640, 480).close_after_frames(50);
        let clock = ManualClock::scripted(std::iter::repeat_n(Duration::from_millis(16), 50));
        let mut engine = GameEngine::with_clock(EngineConfig::default(), window, SpinningCubes::new(4), clock);
        engine.run().unwrap();
        assert_eq!(engine.logic().draws(), 200);
        assert!(engine.logic().gpu().draws().is_empty());
        assert!(engine.logic().gpu().commands().is_empty());
    }

    #[test]
    fn short_frames_render_without_updates() {
        let report = run(EngineConfig::default(), &params(4, 5)).unwrap();
        assert_eq!(report.frames, 4);
        assert_eq!(report.updates, 0);
    }

    #[test]
    fn report_serializes() {
        let report = run(EngineConfig::default(), &params(1, 40)).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["frames"], 1);
        assert_eq!(json["updates"], 1);
    }
}
