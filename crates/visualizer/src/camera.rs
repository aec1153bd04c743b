//! Orbit camera around the model origin with +Z up.
//!
//! Dragging changes the spherical angles directly; zooming changes a
//! logarithmic zoom factor and the eye distance eases toward
//! `2^zoom_factor * start_distance` a fixed fraction per frame.

use std::f32::consts::{PI, TAU};

use glam::{Mat4, Vec3};

use crate::types::CameraTuning;

/// Keeps the eye off the poles where the +Z up vector degenerates.
const VERTICAL_MARGIN: f32 = 0.001;

#[derive(Debug, Clone)]
pub struct OrbitCamera {
    horizontal_angle: f32,
    vertical_angle: f32,
    zoom_factor: f32,
    distance: f32,
    drag_anchor: Option<(f64, f64)>,
    dragging: bool,
    tuning: CameraTuning,
    /// Vertical field of view in radians.
    fov: f32,
    near: f32,
    far: f32,
}

impl OrbitCamera {
    pub fn new(tuning: CameraTuning, fov_degrees: f32, near: f32, far: f32) -> Self {
        Self {
            horizontal_angle: tuning.horizontal_angle.rem_euclid(TAU),
            vertical_angle: clamp_vertical(tuning.vertical_angle),
            zoom_factor: 0.0,
            distance: tuning.start_distance,
            drag_anchor: None,
            dragging: false,
            tuning,
            fov: fov_degrees.to_radians(),
            near,
            far,
        }
    }

    pub fn begin_drag(&mut self) {
        self.dragging = true;
    }

    pub fn end_drag(&mut self) {
        self.dragging = false;
        self.drag_anchor = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Applies cursor motion while dragging. The first motion after a press
    /// only records the anchor.
    pub fn drag_to(&mut self, x: f64, y: f64) {
        if !self.dragging {
            return;
        }
        let (last_x, last_y) = *self.drag_anchor.get_or_insert((x, y));
        let dx = (x - last_x) as f32;
        let dy = (y - last_y) as f32;

        self.horizontal_angle =
            (self.horizontal_angle - dx * self.tuning.drag_speed).rem_euclid(TAU);
        self.vertical_angle = clamp_vertical(self.vertical_angle - dy * self.tuning.drag_speed);
        self.drag_anchor = Some((x, y));
    }

    /// Positive `lines` (wheel up) zooms in.
    pub fn scroll(&mut self, lines: f32) {
        self.zoom_factor -= lines * self.tuning.scroll_speed;
    }

    pub fn goal_distance(&self) -> f32 {
        2f32.powf(self.zoom_factor) * self.tuning.start_distance
    }

    /// Eases the eye distance toward the zoom goal; call once per frame.
    pub fn advance(&mut self) {
        let goal = self.goal_distance();
        self.distance += (goal - self.distance) * self.tuning.animation_speed;
    }

    pub fn reset(&mut self) {
        self.horizontal_angle = self.tuning.horizontal_angle.rem_euclid(TAU);
        self.vertical_angle = clamp_vertical(self.tuning.vertical_angle);
        self.zoom_factor = 0.0;
        self.end_drag();
    }

    pub fn horizontal_angle(&self) -> f32 {
        self.horizontal_angle
    }

    pub fn vertical_angle(&self) -> f32 {
        self.vertical_angle
    }

    pub fn zoom_factor(&self) -> f32 {
        self.zoom_factor
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn eye(&self) -> Vec3 {
        let (sin_h, cos_h) = self.horizontal_angle.sin_cos();
        let (sin_v, cos_v) = self.vertical_angle.sin_cos();
        self.distance * Vec3::new(cos_h * sin_v, sin_h * sin_v, cos_v)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), Vec3::ZERO, Vec3::Z)
    }

    pub fn projection(&self, aspect: f32) -> Mat4 {
        let aspect = if aspect.is_finite() && aspect > 0.0 {
            aspect
        } else {
            1.0
        };
        Mat4::perspective_rh(self.fov, aspect, self.near, self.far)
    }

    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection(aspect) * self.view_matrix()
    }
}

fn clamp_vertical(angle: f32) -> f32 {
    angle.clamp(VERTICAL_MARGIN, PI - VERTICAL_MARGIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_4;

    fn camera() -> OrbitCamera {
        OrbitCamera::new(CameraTuning::default(), 45.0, 0.01, 1000.0)
    }

    #[test]
    fn starts_at_configured_distance() {
        let camera = camera();
        assert!((camera.distance() - 6.0).abs() < 1e-6);
        assert!((camera.eye().length() - 6.0).abs() < 1e-4);
        assert!((camera.horizontal_angle() - FRAC_PI_4).abs() < 1e-6);
    }

    #[test]
    fn eye_follows_spherical_coordinates() {
        let camera = camera();
        let eye = camera.eye();
        // h = v = pi/4: x = y = d/2, z = d/sqrt(2)
        assert!((eye.x - 3.0).abs() < 1e-4);
        assert!((eye.y - 3.0).abs() < 1e-4);
        assert!((eye.z - 6.0 / 2f32.sqrt()).abs() < 1e-4);
    }

    #[test]
    fn first_drag_motion_only_anchors() {
        let mut camera = camera();
        let before = camera.horizontal_angle();
        camera.begin_drag();
        camera.drag_to(100.0, 100.0);
        assert_eq!(camera.horizontal_angle(), before);

        camera.drag_to(110.0, 100.0);
        assert!((camera.horizontal_angle() - (before - 0.1)).abs() < 1e-5);
    }

    #[test]
    fn motion_without_drag_is_ignored() {
        let mut camera = camera();
        let before = (camera.horizontal_angle(), camera.vertical_angle());
        camera.drag_to(0.0, 0.0);
        camera.drag_to(500.0, 500.0);
        assert_eq!(
            (camera.horizontal_angle(), camera.vertical_angle()),
            before
        );
    }

    #[test]
    fn release_forgets_anchor() {
        let mut camera = camera();
        camera.begin_drag();
        camera.drag_to(0.0, 0.0);
        camera.end_drag();
        assert!(!camera.is_dragging());

        let before = camera.horizontal_angle();
        camera.begin_drag();
        camera.drag_to(400.0, 0.0);
        assert_eq!(camera.horizontal_angle(), before);
    }

    #[test]
    fn horizontal_angle_wraps() {
        let mut camera = camera();
        camera.begin_drag();
        camera.drag_to(0.0, 0.0);
        camera.drag_to(1000.0, 0.0);
        let angle = camera.horizontal_angle();
        assert!((0.0..TAU).contains(&angle));
    }

    #[test]
    fn vertical_angle_is_clamped_off_the_poles() {
        let mut camera = camera();
        camera.begin_drag();
        camera.drag_to(0.0, 0.0);
        camera.drag_to(0.0, -10_000.0);
        assert!((camera.vertical_angle() - (PI - VERTICAL_MARGIN)).abs() < 1e-6);

        camera.drag_to(0.0, 10_000.0);
        assert!((camera.vertical_angle() - VERTICAL_MARGIN).abs() < 1e-6);
    }

    #[test]
    fn scrolling_changes_goal_by_powers_of_two() {
        let mut camera = camera();
        camera.scroll(2.0);
        assert!((camera.zoom_factor() + 1.0).abs() < 1e-6);
        assert!((camera.goal_distance() - 3.0).abs() < 1e-5);

        camera.scroll(-4.0);
        assert!((camera.goal_distance() - 12.0).abs() < 1e-4);
    }

    #[test]
    fn advance_eases_toward_goal() {
        let mut camera = camera();
        camera.scroll(2.0);
        camera.advance();
        // 6 + (3 - 6) * 0.1
        assert!((camera.distance() - 5.7).abs() < 1e-5);

        for _ in 0..200 {
            camera.advance();
        }
        assert!((camera.distance() - 3.0).abs() < 1e-3);
    }

    #[test]
    fn reset_restores_initial_view() {
        let mut camera = camera();
        camera.begin_drag();
        camera.drag_to(0.0, 0.0);
        camera.drag_to(50.0, 20.0);
        camera.scroll(3.0);
        camera.reset();
        assert!((camera.horizontal_angle() - FRAC_PI_4).abs() < 1e-6);
        assert!((camera.vertical_angle() - FRAC_PI_4).abs() < 1e-6);
        assert_eq!(camera.zoom_factor(), 0.0);
        assert!(!camera.is_dragging());
    }

    #[test]
    fn origin_projects_to_screen_center() {
        let camera = camera();
        let clip = camera.view_projection(4.0 / 3.0) * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip / clip.w;
        assert!(ndc.x.abs() < 1e-5);
        assert!(ndc.y.abs() < 1e-5);
        assert!((0.0..=1.0).contains(&ndc.z));
    }

    #[test]
    fn degenerate_aspect_falls_back_to_square() {
        let camera = camera();
        assert_eq!(camera.projection(0.0), camera.projection(1.0));
        assert_eq!(camera.projection(f32::NAN), camera.projection(1.0));
    }
}
