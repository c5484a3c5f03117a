use nalgebra::Point2;
use std::f32::consts::FRAC_PI_2;

/// Pointer input routed from the host to a mounted component, in component pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(f32, f32),
    Move(f32, f32),
    Up,
    /// The pointer left the component's area.
    Leave,
}

/// Rotation increment produced by a drag step, in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RotationDelta {
    /// Around the X axis, from vertical pointer motion.
    pub pitch: f32,
    /// Around the Y axis, from horizontal pointer motion.
    pub yaw: f32,
}

/// Turns click-and-drag pointer motion into rotation increments.
pub struct DragRotation {
    pub sensitivity: f32,
    last_pointer: Option<Point2<f32>>,
}

impl DragRotation {
    pub fn new(sensitivity: f32) -> Self {
        Self {
            sensitivity,
            last_pointer: None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.last_pointer.is_some()
    }

    /// Feeds one event; returns the rotation to apply, if any.
    ///
    /// Moves without a preceding `Down` are ignored.
    pub fn handle(&mut self, event: PointerEvent) -> Option<RotationDelta> {
        match event {
            PointerEvent::Down(x, y) => {
                self.last_pointer = Some(Point2::new(x, y));
                None
            }
            PointerEvent::Move(x, y) => {
                let last = self.last_pointer?;
                let current = Point2::new(x, y);
                let delta = current - last;
                self.last_pointer = Some(current);
                Some(RotationDelta {
                    pitch: delta.y * self.sensitivity,
                    yaw: delta.x * self.sensitivity,
                })
            }
            PointerEvent::Up | PointerEvent::Leave => {
                self.last_pointer = None;
                None
            }
        }
    }
}

/// Turns per-frame button state into [`PointerEvent`]s.
///
/// The host reports on every frame whether the button is held on the
/// component, so a press emits `Down` on its first frame even if the pointer
/// never moves.
#[derive(Debug, Default)]
pub struct PressTracker {
    pressed: bool,
}

impl PressTracker {
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// `held` is whether the button is down on the component, `inside` whether
    /// the pointer is over it, and `pos` the pointer in component pixels.
    pub fn route(&mut self, held: bool, inside: bool, pos: Option<(f32, f32)>) -> Option<PointerEvent> {
        match (self.pressed, held) {
            (false, true) => {
                let (x, y) = pos?;
                self.pressed = true;
                Some(PointerEvent::Down(x, y))
            }
            (true, true) if !inside => Some(PointerEvent::Leave),
            (true, true) => pos.map(|(x, y)| PointerEvent::Move(x, y)),
            (true, false) => {
                self.pressed = false;
                Some(PointerEvent::Up)
            }
            (false, false) => None,
        }
    }
}

/// Keeps a pitch angle within straight up / straight down.
#[inline]
pub fn clamp_pitch(pitch: f32) -> f32 {
    pitch.clamp(-FRAC_PI_2, FRAC_PI_2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_without_down_is_ignored() {
        let mut drag = DragRotation::new(0.01);
        assert_eq!(drag.handle(PointerEvent::Move(10.0, 10.0)), None);
        assert!(!drag.is_dragging());
    }

    #[test]
    fn deltas_scale_with_sensitivity() {
        let mut drag = DragRotation::new(0.01);
        drag.handle(PointerEvent::Down(100.0, 100.0));
        let d = drag.handle(PointerEvent::Move(110.0, 80.0)).unwrap();
        assert!((d.yaw - 0.1).abs() < 1e-6);
        assert!((d.pitch + 0.2).abs() < 1e-6);
        // Deltas are relative to the previous move, not the press.
        let d = drag.handle(PointerEvent::Move(111.0, 80.0)).unwrap();
        assert!((d.yaw - 0.01).abs() < 1e-6);
        assert_eq!(d.pitch, 0.0);
    }

    #[test]
    fn leave_ends_the_drag() {
        let mut drag = DragRotation::new(0.01);
        drag.handle(PointerEvent::Down(0.0, 0.0));
        drag.handle(PointerEvent::Leave);
        assert_eq!(drag.handle(PointerEvent::Move(5.0, 5.0)), None);
    }

    #[test]
    fn press_without_motion_emits_down() {
        let mut press = PressTracker::default();
        assert_eq!(press.route(false, true, Some((4.0, 4.0))), None);
        assert_eq!(press.route(true, true, Some((4.0, 4.0))), Some(PointerEvent::Down(4.0, 4.0)));
        assert!(press.is_pressed());
        // Holding still keeps reporting the same position.
        assert_eq!(press.route(true, true, Some((4.0, 4.0))), Some(PointerEvent::Move(4.0, 4.0)));
        assert_eq!(press.route(false, true, Some((4.0, 4.0))), Some(PointerEvent::Up));
        assert!(!press.is_pressed());
        assert_eq!(press.route(false, true, None), None);
    }

    #[test]
    fn held_press_outside_reports_leave() {
        let mut press = PressTracker::default();
        press.route(true, true, Some((1.0, 1.0)));
        assert_eq!(press.route(true, false, Some((-3.0, 1.0))), Some(PointerEvent::Leave));
        assert_eq!(press.route(true, true, Some((2.0, 1.0))), Some(PointerEvent::Move(2.0, 1.0)));
    }

    #[test]
    fn click_then_move_rotates_from_the_press_point() {
        let mut press = PressTracker::default();
        let mut drag = DragRotation::new(0.01);
        let down = press.route(true, true, Some((10.0, 10.0))).unwrap();
        assert_eq!(drag.handle(down), None);
        assert!(drag.is_dragging());
        let step = press.route(true, true, Some((20.0, 10.0))).unwrap();
        let d = drag.handle(step).unwrap();
        assert!((d.yaw - 0.1).abs() < 1e-6);
        assert_eq!(d.pitch, 0.0);
    }

    #[test]
    fn pitch_is_clamped() {
        assert_eq!(clamp_pitch(10.0), FRAC_PI_2);
        assert_eq!(clamp_pitch(-10.0), -FRAC_PI_2);
        assert_eq!(clamp_pitch(0.3), 0.3);
    }
}
