//! Input events and the pointer/touch state that turns them into pans and
//! zooms.
//!
//! Nothing here touches the coordinate system directly. [`PointerState`]
//! only reports a [`ViewChange`]; the plot decides whether the change is
//! allowed by its options and applies it.

use std::collections::BTreeMap;
use std::time::Instant;

use crate::coords::ScreenPoint;

/// Scroll distance, in pixels, that zooms by a factor of `e`.
const WHEEL_SENSITIVITY: f64 = 1000.0;
/// Per-event zoom while two fingers move apart.
pub const PINCH_ZOOM_IN: f64 = 1.03;
/// Per-event zoom while two fingers move together.
pub const PINCH_ZOOM_OUT: f64 = 0.97;

// ================================================================================
// Events
// ================================================================================

/// Everything a plot reacts to. Positions are relative to the drawing
/// surface.
#[derive(Clone, Debug, PartialEq)]
pub enum PlotEvent {
    PointerPressed(ScreenPoint),
    PointerMoved(ScreenPoint),
    PointerReleased,
    /// `delta_y` is positive when scrolling down, which zooms out.
    WheelScrolled {
        delta_y: f64,
        position: ScreenPoint,
    },
    FingerPressed {
        id: u64,
        position: ScreenPoint,
    },
    FingerMoved {
        id: u64,
        position: ScreenPoint,
    },
    FingerLifted {
        id: u64,
    },

    ZoomIn,
    ZoomOut,
    Refresh,
    ToggleGrid,
    ToggleGeometricAid,
    ToggleFullscreen,
    TogglePlay(String),
    ParameterChanged(String, f64),

    SurfaceResized {
        width: f64,
        height: f64,
    },
    Frame(Instant),
}

/// A change of view requested by direct manipulation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ViewChange {
    Pan { dx: f64, dy: f64 },
    Zoom { factor: f64, center: ScreenPoint },
}

/// Zoom factor for a wheel scroll of `delta_y` pixels.
pub fn wheel_zoom_factor(delta_y: f64) -> f64 {
    (-delta_y / WHEEL_SENSITIVITY).exp()
}

// ================================================================================
// Pointer State
// ================================================================================

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PointerState {
    /// Last position of the mouse or single finger while dragging.
    drag: Option<ScreenPoint>,
    fingers: BTreeMap<u64, ScreenPoint>,
    /// Finger distance seen by the previous pinch event.
    pinch_distance: Option<f64>,
}

impl PointerState {
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn is_pinching(&self) -> bool {
        self.pinch_distance.is_some()
    }

    pub fn press(&mut self, position: ScreenPoint) {
        self.drag = Some(position);
    }

    /// Moves the drag anchor to `position` and reports the pan.
    pub fn drag_to(&mut self, position: ScreenPoint) -> Option<ViewChange> {
        let last = self.drag.replace(position)?;
        Some(ViewChange::Pan {
            dx: position.x - last.x,
            dy: position.y - last.y,
        })
    }

    pub fn release(&mut self) {
        self.drag = None;
    }

    pub fn finger_pressed(&mut self, id: u64, position: ScreenPoint) {
        self.fingers.insert(id, position);
        match self.pinch_pair() {
            Some((a, b)) => {
                self.drag = None;
                self.pinch_distance = Some(a.distance(b));
            }
            None => self.drag = Some(position),
        }
    }

    pub fn finger_moved(&mut self, id: u64, position: ScreenPoint) -> Option<ViewChange> {
        let finger = self.fingers.get_mut(&id)?;
        *finger = position;

        if let Some((a, b)) = self.pinch_pair() {
            let distance = a.distance(b);
            let previous = self.pinch_distance.replace(distance)?;
            let factor = if distance > previous {
                PINCH_ZOOM_IN
            } else if distance < previous {
                PINCH_ZOOM_OUT
            } else {
                return None;
            };
            return Some(ViewChange::Zoom {
                factor,
                center: a.midpoint(b),
            });
        }

        if self.is_pinching() {
            return None;
        }
        self.drag_to(position)
    }

    /// Removes a finger. A pinch ends when fewer than two fingers remain and
    /// panning resumes from the remaining finger.
    pub fn finger_lifted(&mut self, id: u64) {
        if self.fingers.remove(&id).is_none() {
            return;
        }
        if self.fingers.len() < 2 {
            self.pinch_distance = None;
            self.drag = self.fingers.values().next().copied();
        }
    }

    fn pinch_pair(&self) -> Option<(ScreenPoint, ScreenPoint)> {
        let mut fingers = self.fingers.values();
        match (fingers.next(), fingers.next()) {
            (Some(a), Some(b)) => Some((*a, *b)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> ScreenPoint {
        ScreenPoint::new(x, y)
    }

    #[test]
    fn test_wheel_factor() {
        assert_eq!(wheel_zoom_factor(0.0), 1.0);
        assert!(wheel_zoom_factor(100.0) < 1.0);
        assert!(wheel_zoom_factor(-100.0) > 1.0);
        assert!((wheel_zoom_factor(-1000.0) - std::f64::consts::E).abs() < 1e-12);
    }

    #[test]
    fn test_drag_reports_deltas() {
        let mut pointer = PointerState::default();
        assert_eq!(pointer.drag_to(p(10.0, 10.0)), None);

        pointer.press(p(10.0, 10.0));
        assert_eq!(
            pointer.drag_to(p(15.0, 7.0)),
            Some(ViewChange::Pan { dx: 5.0, dy: -3.0 })
        );
        assert_eq!(
            pointer.drag_to(p(15.0, 9.0)),
            Some(ViewChange::Pan { dx: 0.0, dy: 2.0 })
        );

        pointer.release();
        assert!(!pointer.is_dragging());
        assert_eq!(pointer.drag_to(p(0.0, 0.0)), None);
    }

    #[test]
    fn test_pinch_zooms_about_midpoint() {
        let mut pointer = PointerState::default();
        pointer.finger_pressed(1, p(100.0, 100.0));
        pointer.finger_pressed(2, p(200.0, 100.0));
        assert!(pointer.is_pinching());
        assert!(!pointer.is_dragging());

        let change = pointer.finger_moved(2, p(220.0, 100.0));
        assert_eq!(
            change,
            Some(ViewChange::Zoom {
                factor: PINCH_ZOOM_IN,
                center: p(160.0, 100.0),
            })
        );

        let change = pointer.finger_moved(1, p(150.0, 100.0));
        assert!(matches!(
            change,
            Some(ViewChange::Zoom { factor, .. }) if factor == PINCH_ZOOM_OUT
        ));
    }

    #[test]
    fn test_single_finger_pans_and_resumes_after_pinch() {
        let mut pointer = PointerState::default();
        pointer.finger_pressed(1, p(0.0, 0.0));
        assert_eq!(
            pointer.finger_moved(1, p(3.0, 4.0)),
            Some(ViewChange::Pan { dx: 3.0, dy: 4.0 })
        );

        pointer.finger_pressed(2, p(50.0, 50.0));
        pointer.finger_lifted(1);
        assert!(!pointer.is_pinching());

        // resumes from where the remaining finger is, no jump
        assert_eq!(
            pointer.finger_moved(2, p(52.0, 50.0)),
            Some(ViewChange::Pan { dx: 2.0, dy: 0.0 })
        );
    }

    #[test]
    fn test_unknown_finger_is_ignored() {
        let mut pointer = PointerState::default();
        assert_eq!(pointer.finger_moved(7, p(1.0, 1.0)), None);
        pointer.finger_lifted(7);
        assert_eq!(pointer, PointerState::default());
    }
}
