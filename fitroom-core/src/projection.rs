/// Per-frame transform pipeline: viewport, projection and composition
use log::{debug, warn};
use nalgebra::{Point3, Vector4};

use crate::config::ViewerConfig;
use crate::error::{Result, ViewerError};
use crate::state::TransformState;
use crate::transform::{self, Mat4, TransformOp};

/// Drawing surface size in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    width: f32,
    height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Result<Self> {
        if !(width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite()) {
            return Err(ViewerError::InvalidViewport { width, height });
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }
}

/// Builds the composed matrix for each frame from scratch.
///
/// Rotation and translation are never accumulated matrix to matrix; every
/// frame starts again from a pure projection and the scalar state.
#[derive(Debug, Clone)]
pub struct TransformPipeline {
    config: ViewerConfig,
    viewport: Viewport,
    projection: Mat4,
}

impl TransformPipeline {
    pub fn new(config: ViewerConfig, width: f32, height: f32) -> Result<Self> {
        config.validate()?;
        let viewport = Viewport::new(width, height)?;
        let projection = build_projection(&config, viewport)?;
        debug!("pipeline ready: {width}x{height}, fov {:.3} rad", config.fov);

        Ok(Self {
            config,
            viewport,
            projection,
        })
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Fresh state matching this pipeline's camera distance
    pub fn initial_state(&self) -> TransformState {
        TransformState::new(self.config.camera_distance)
    }

    /// Take a new surface size. An invalid size keeps the previous viewport.
    pub fn resize(&mut self, width: f32, height: f32) -> Result<()> {
        let resized = Viewport::new(width, height)
            .and_then(|viewport| Ok((viewport, build_projection(&self.config, viewport)?)));

        match resized {
            Ok((viewport, projection)) => {
                debug!("viewport resized to {width}x{height}");
                self.viewport = viewport;
                self.projection = projection;
                Ok(())
            }
            Err(err) => {
                warn!("ignoring resize: {err}");
                Err(err)
            }
        }
    }

    /// Pure projection for the current viewport
    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    /// The transform chain applied after projection for `state`
    pub fn ops(&self, state: &TransformState) -> [TransformOp; 3] {
        [
            TransformOp::RotateX(
                state.rotation_angle * self.config.pitch_factor + state.tilt_angle,
            ),
            TransformOp::RotateY(state.rotation_angle),
            TransformOp::translate(0.0, 0.0, -state.camera_distance),
        ]
    }

    /// Composed matrix for the current state, without advancing it
    pub fn composed(&self, state: &TransformState) -> Mat4 {
        transform::compose(&self.projection(), &self.ops(state))
    }

    /// One frame: advance auto-rotation, then rebuild the composed matrix
    pub fn frame(&self, state: &mut TransformState) -> Mat4 {
        state.tick(self.config.auto_rotate_increment);
        self.composed(state)
    }

    pub fn pointer_down(&self, state: &mut TransformState, x: f32, y: f32) {
        state.pointer_down(x, y);
    }

    pub fn pointer_move(&self, state: &mut TransformState, x: f32, y: f32) {
        state.pointer_move(x, y, self.config.drag_sensitivity, self.config.drag_tilt);
    }

    pub fn pointer_up(&self, state: &mut TransformState) {
        state.pointer_up();
    }

    pub fn wheel(&self, state: &mut TransformState, delta_y: f32) {
        state.zoom(
            delta_y,
            self.config.zoom_speed,
            self.config.min_distance,
            self.config.max_distance,
        );
    }

    pub fn reset(&self, state: &mut TransformState) {
        state.reset(self.config.camera_distance);
    }
}

fn build_projection(config: &ViewerConfig, viewport: Viewport) -> Result<Mat4> {
    transform::perspective(viewport.width, viewport.height, config.fov, config.near, config.far)
}

/// Project a model-space point through `matrix` into pixel space.
///
/// Returns `None` only for points at or behind the eye. Points outside the
/// NDC square still map to coordinates off the edges of the surface, so a
/// rasterizer can keep partially visible triangles. Depth is the NDC z,
/// smaller is nearer.
pub fn project_to_screen(
    matrix: &Mat4,
    point: &Point3<f32>,
    width: u32,
    height: u32,
) -> Option<(f32, f32, f32)> {
    let clip = matrix * Vector4::new(point.x, point.y, point.z, 1.0);

    // Prevent division by near-zero w
    if clip.w < 1e-6 {
        return None;
    }

    let ndc_x = clip.x / clip.w;
    let ndc_y = clip.y / clip.w;
    let depth = clip.z / clip.w;

    let screen_x = (ndc_x + 1.0) * 0.5 * width as f32;
    let screen_y = (1.0 - ndc_y) * 0.5 * height as f32;

    Some((screen_x, screen_y, depth))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::IndexedMesh;

    fn pipeline() -> TransformPipeline {
        TransformPipeline::new(ViewerConfig::default(), 800.0, 600.0).unwrap()
    }

    #[test]
    fn test_viewport_rejects_zero_height() {
        assert!(Viewport::new(800.0, 0.0).is_err());
        assert!(TransformPipeline::new(ViewerConfig::default(), 800.0, 0.0).is_err());
        assert!((Viewport::new(800.0, 600.0).unwrap().aspect() - 4.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_invalid_resize_keeps_viewport() {
        let mut pipeline = pipeline();
        assert!(pipeline.resize(0.0, 0.0).is_err());
        assert_eq!(pipeline.viewport().width(), 800.0);

        pipeline.resize(1024.0, 512.0).unwrap();
        let projection = pipeline.projection();
        assert!((projection[(0, 0)] - projection[(1, 1)] / 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_frames_advance_angle() {
        let pipeline = pipeline();
        let mut state = pipeline.initial_state();
        for _ in 0..50 {
            pipeline.frame(&mut state);
        }
        assert!((state.rotation_angle - 50.0 * 0.01).abs() < 1e-4);
    }

    #[test]
    fn test_paused_frames_freeze_matrix() {
        let pipeline = pipeline();
        let mut state = pipeline.initial_state();
        pipeline.frame(&mut state);
        state.toggle_rotation();

        let before = pipeline.frame(&mut state);
        let after = pipeline.frame(&mut state);
        assert_eq!(before, after);
    }

    #[test]
    fn test_composed_rebuilds_from_projection() {
        let pipeline = pipeline();
        let mut state = pipeline.initial_state();
        state.rotation_angle = 2.0;

        let expected = transform::translate(
            &transform::rotate_y(&transform::rotate_x(&pipeline.projection(), 1.0), 2.0),
            0.0,
            0.0,
            -5.0,
        );
        assert_eq!(pipeline.composed(&state), expected);
        // same state, same matrix: nothing accumulates between calls
        assert_eq!(pipeline.composed(&state), pipeline.composed(&state));
    }

    #[test]
    fn test_equivalent_angles_give_same_matrix() {
        let pipeline = pipeline();
        let mut a = pipeline.initial_state();
        let mut b = pipeline.initial_state();
        a.rotation_angle = 0.75;
        b.rotation_angle = 0.75 + 4.0 * std::f32::consts::PI;

        // pitch uses half the angle, so 4 pi keeps both axes in phase
        assert!((pipeline.composed(&a) - pipeline.composed(&b)).norm() < 1e-3);
    }

    #[test]
    fn test_drag_through_pipeline() {
        let pipeline = pipeline();
        let mut state = pipeline.initial_state();
        pipeline.pointer_down(&mut state, 100.0, 100.0);
        pipeline.pointer_move(&mut state, 150.0, 100.0);
        pipeline.pointer_up(&mut state);
        assert!((state.rotation_angle - 0.5).abs() < 1e-6);

        pipeline.wheel(&mut state, 1000.0);
        assert_eq!(state.camera_distance, 10.0);

        pipeline.reset(&mut state);
        assert_eq!(state.rotation_angle, 0.0);
        assert_eq!(state.camera_distance, 5.0);
    }

    #[test]
    fn test_origin_projects_to_center() {
        let pipeline = pipeline();
        let m = pipeline.composed(&pipeline.initial_state());
        let (x, y, depth) = project_to_screen(&m, &Point3::origin(), 800, 600).unwrap();
        assert!((x - 400.0).abs() < 1e-3);
        assert!((y - 300.0).abs() < 1e-3);
        assert!(depth > -1.0 && depth < 1.0);
    }

    #[test]
    fn test_point_behind_eye_is_rejected() {
        let pipeline = pipeline();
        let m = pipeline.composed(&pipeline.initial_state());
        assert!(project_to_screen(&m, &Point3::new(0.0, 0.0, 10.0), 800, 600).is_none());
    }

    fn cube_on_screen(
        pipeline: &TransformPipeline,
        state: &TransformState,
    ) -> Vec<(f32, f32, f32)> {
        let m = pipeline.composed(state);
        IndexedMesh::cube(2.0)
            .vertices
            .iter()
            .map(|v| project_to_screen(&m, &v.point(), 800, 600).unwrap())
            .collect()
    }

    #[test]
    fn test_cube_fits_on_screen_when_zoomed_out() {
        let pipeline = pipeline();
        let mut state = pipeline.initial_state();
        pipeline.wheel(&mut state, 10_000.0);
        assert_eq!(state.camera_distance, pipeline.config().max_distance);

        for (x, y, depth) in cube_on_screen(&pipeline, &state) {
            assert!((0.0..=800.0).contains(&x) && (0.0..=600.0).contains(&y));
            assert!(depth > -1.0 && depth < 1.0);
        }
    }

    #[test]
    fn test_cube_projects_when_zoomed_in() {
        let pipeline = pipeline();
        let mut state = pipeline.initial_state();
        pipeline.wheel(&mut state, -10_000.0);
        assert_eq!(state.camera_distance, pipeline.config().min_distance);

        let points = cube_on_screen(&pipeline, &state);
        assert!(points.iter().all(|&(_, _, depth)| depth > -1.0 && depth < 1.0));
        // front corners overflow the surface but are still projected
        assert!(points.iter().any(|&(x, _, _)| !(0.0..=800.0).contains(&x)));

        let m = pipeline.composed(&state);
        let (x, y, _) = project_to_screen(&m, &Point3::origin(), 800, 600).unwrap();
        assert!((x - 400.0).abs() < 1e-3 && (y - 300.0).abs() < 1e-3);
    }
}
