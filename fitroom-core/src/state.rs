/// Rotation, drag and zoom state for one viewer instance
use log::trace;

/// Mutable per-viewer state, advanced by frame ticks and pointer events.
///
/// Angles are in radians and unbounded; trig periodicity handles wrap-around.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformState {
    pub rotation_angle: f32,
    /// Extra rotation about X from vertical drag (only when tilt is enabled)
    pub tilt_angle: f32,
    pub rotation_enabled: bool,
    pub is_dragging: bool,
    pub last_cursor: (f32, f32),
    pub camera_distance: f32,
}

impl TransformState {
    pub fn new(camera_distance: f32) -> Self {
        Self {
            rotation_angle: 0.0,
            tilt_angle: 0.0,
            rotation_enabled: true,
            is_dragging: false,
            last_cursor: (0.0, 0.0),
            camera_distance,
        }
    }

    /// Advance auto-rotation by one frame
    pub fn tick(&mut self, increment: f32) {
        if self.rotation_enabled {
            self.rotation_angle += increment;
        }
    }

    pub fn toggle_rotation(&mut self) -> bool {
        self.rotation_enabled = !self.rotation_enabled;
        self.rotation_enabled
    }

    pub fn set_rotation_enabled(&mut self, enabled: bool) {
        self.rotation_enabled = enabled;
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) {
        self.is_dragging = true;
        self.last_cursor = (x, y);
    }

    /// Horizontal delta spins the object. Vertical delta is tracked, and only
    /// tilts the object when `tilt` is set.
    pub fn pointer_move(&mut self, x: f32, y: f32, sensitivity: f32, tilt: bool) {
        if !self.is_dragging {
            return;
        }

        let dx = x - self.last_cursor.0;
        let dy = y - self.last_cursor.1;
        self.rotation_angle += dx * sensitivity;
        if tilt {
            self.tilt_angle += dy * sensitivity;
        }
        self.last_cursor = (x, y);

        trace!("drag dx={dx} dy={dy} angle={}", self.rotation_angle);
    }

    pub fn pointer_up(&mut self) {
        self.is_dragging = false;
    }

    /// Wheel zoom: move the camera along Z, clamped to `[min, max]`
    pub fn zoom(&mut self, delta_y: f32, speed: f32, min: f32, max: f32) {
        self.camera_distance = (self.camera_distance + delta_y * speed).clamp(min, max);
    }

    /// Back to the initial pose. Drag and auto-rotation flags are left alone.
    pub fn reset(&mut self, camera_distance: f32) {
        self.rotation_angle = 0.0;
        self.tilt_angle = 0.0;
        self.camera_distance = camera_distance;
    }
}

impl Default for TransformState {
    fn default() -> Self {
        Self::new(5.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_accumulates() {
        let mut state = TransformState::default();
        for _ in 0..100 {
            state.tick(0.01);
        }
        assert!((state.rotation_angle - 100.0 * 0.01).abs() < 1e-4);
    }

    #[test]
    fn test_toggle_freezes_and_resumes() {
        let mut state = TransformState::default();
        state.tick(0.25);
        assert!(!state.toggle_rotation());

        for _ in 0..10 {
            state.tick(0.25);
        }
        assert_eq!(state.rotation_angle, 0.25);

        assert!(state.toggle_rotation());
        state.tick(0.25);
        assert_eq!(state.rotation_angle, 0.5);
    }

    #[test]
    fn test_drag_adds_horizontal_delta() {
        let mut state = TransformState::default();
        state.set_rotation_enabled(false);

        state.pointer_down(100.0, 100.0);
        state.pointer_move(150.0, 100.0, 0.01, false);
        assert!((state.rotation_angle - 0.5).abs() < 1e-6);
        assert_eq!(state.last_cursor, (150.0, 100.0));

        state.pointer_up();
        assert!(!state.is_dragging);
    }

    #[test]
    fn test_vertical_drag_ignored_without_tilt() {
        let mut state = TransformState::default();
        state.pointer_down(0.0, 0.0);
        state.pointer_move(0.0, 80.0, 0.01, false);
        assert_eq!(state.rotation_angle, 0.0);
        assert_eq!(state.tilt_angle, 0.0);
        assert_eq!(state.last_cursor, (0.0, 80.0));

        state.pointer_move(0.0, 100.0, 0.01, true);
        assert!((state.tilt_angle - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_move_without_press_is_ignored() {
        let mut state = TransformState::default();
        state.pointer_move(500.0, 500.0, 0.01, true);
        assert_eq!(state, TransformState::default());
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut state = TransformState::new(5.0);
        state.zoom(100.0, 0.01, 2.0, 10.0);
        assert!((state.camera_distance - 6.0).abs() < 1e-6);

        state.zoom(10_000.0, 0.01, 2.0, 10.0);
        assert_eq!(state.camera_distance, 10.0);

        state.zoom(-10_000.0, 0.01, 2.0, 10.0);
        assert_eq!(state.camera_distance, 2.0);
    }

    #[test]
    fn test_reset_zeroes_angles() {
        let mut state = TransformState::new(5.0);
        state.tick(3.7);
        state.pointer_down(0.0, 0.0);
        state.pointer_move(-42.0, 13.0, 0.01, true);
        state.zoom(150.0, 0.01, 2.0, 10.0);

        state.reset(5.0);
        assert_eq!(state.rotation_angle, 0.0);
        assert_eq!(state.tilt_angle, 0.0);
        assert_eq!(state.camera_distance, 5.0);
        assert!(state.is_dragging);
        assert!(state.rotation_enabled);
    }
}
