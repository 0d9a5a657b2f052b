/// Viewer tuning knobs shared by every front end
use crate::error::{Result, ViewerError};

/// Camera, animation and input settings for one viewer instance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewerConfig {
    /// Vertical field of view (radians)
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    /// Distance the object is pushed down -Z after rotation
    pub camera_distance: f32,
    /// Radians added to the rotation angle per frame while auto-rotating
    pub auto_rotate_increment: f32,
    /// Radians per pixel of horizontal drag
    pub drag_sensitivity: f32,
    /// Fraction of the rotation angle applied about the X axis
    pub pitch_factor: f32,
    /// Feed vertical drag into tilt about the X axis
    pub drag_tilt: bool,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl ViewerConfig {
    pub fn new() -> Self {
        Self {
            fov: std::f32::consts::PI / 4.0, // 45 degrees
            near: 0.1,
            far: 100.0,
            camera_distance: 5.0,
            auto_rotate_increment: 0.01,
            drag_sensitivity: 0.01,
            pitch_factor: 0.5,
            drag_tilt: false,
            zoom_speed: 0.01,
            min_distance: 2.0,
            max_distance: 10.0,
        }
    }

    pub fn with_fov(mut self, fov: f32) -> Self {
        self.fov = fov;
        self
    }

    pub fn with_clip_planes(mut self, near: f32, far: f32) -> Self {
        self.near = near;
        self.far = far;
        self
    }

    pub fn with_camera_distance(mut self, distance: f32) -> Self {
        self.camera_distance = distance;
        self
    }

    pub fn with_auto_rotate_increment(mut self, increment: f32) -> Self {
        self.auto_rotate_increment = increment;
        self
    }

    pub fn with_drag_sensitivity(mut self, sensitivity: f32) -> Self {
        self.drag_sensitivity = sensitivity;
        self
    }

    pub fn with_drag_tilt(mut self, enabled: bool) -> Self {
        self.drag_tilt = enabled;
        self
    }

    pub fn with_zoom(mut self, speed: f32, min_distance: f32, max_distance: f32) -> Self {
        self.zoom_speed = speed;
        self.min_distance = min_distance;
        self.max_distance = max_distance;
        self
    }

    /// Check every field once, before the first frame is built
    pub fn validate(&self) -> Result<()> {
        if !self.fov.is_finite() || self.fov <= 0.0 || self.fov >= std::f32::consts::PI {
            return Err(ViewerError::InvalidFieldOfView(self.fov));
        }
        let planes_finite = self.near.is_finite() && self.far.is_finite();
        if !planes_finite || self.near <= 0.0 || self.far <= self.near {
            return Err(ViewerError::InvalidClipPlanes {
                near: self.near,
                far: self.far,
            });
        }

        let finite = [
            ("camera_distance", self.camera_distance),
            ("auto_rotate_increment", self.auto_rotate_increment),
            ("drag_sensitivity", self.drag_sensitivity),
            ("pitch_factor", self.pitch_factor),
            ("zoom_speed", self.zoom_speed),
        ];
        if let Some((name, value)) = finite.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ViewerError::InvalidConfig(format!("{name} is not finite ({value})")));
        }

        let range_ordered = self.min_distance > 0.0 && self.min_distance <= self.max_distance;
        if !range_ordered || !self.max_distance.is_finite() {
            return Err(ViewerError::InvalidConfig(format!(
                "zoom range [{}, {}] must be positive and ordered",
                self.min_distance, self.max_distance
            )));
        }
        if self.camera_distance < self.min_distance || self.camera_distance > self.max_distance {
            return Err(ViewerError::InvalidConfig(format!(
                "camera_distance {} outside zoom range [{}, {}]",
                self.camera_distance, self.min_distance, self.max_distance
            )));
        }

        Ok(())
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ViewerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.camera_distance, 5.0);
        assert!(!config.drag_tilt);
    }

    #[test]
    fn test_rejects_inverted_clip_planes() {
        let config = ViewerConfig::new().with_clip_planes(10.0, 1.0);
        assert_eq!(
            config.validate(),
            Err(ViewerError::InvalidClipPlanes { near: 10.0, far: 1.0 })
        );
    }

    #[test]
    fn test_rejects_degenerate_fov() {
        assert!(ViewerConfig::new().with_fov(0.0).validate().is_err());
        assert!(ViewerConfig::new().with_fov(std::f32::consts::PI).validate().is_err());
    }

    #[test]
    fn test_rejects_distance_outside_zoom_range() {
        let config = ViewerConfig::new().with_camera_distance(20.0);
        assert!(matches!(config.validate(), Err(ViewerError::InvalidConfig(_))));
    }
}
