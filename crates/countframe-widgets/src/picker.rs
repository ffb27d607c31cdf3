//! Pointer input and its mapping into world space.

use countframe_geom::FaceSide;
use countframe_math::{Point2, Point3};

use crate::set::WidgetId;

/// Pointer input delivered to a widget, in display pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// Pointer moved.
    Move(Point2),
    /// Primary button pressed.
    Press(Point2),
    /// Primary button released.
    Release(Point2),
    /// Pointer left the view.
    Leave,
    /// The gesture was cancelled (e.g. escape key).
    Cancel,
}

impl PointerEvent {
    /// Pixel position, if the event carries one.
    pub fn position(&self) -> Option<Point2> {
        match *self {
            Self::Move(p) | Self::Press(p) | Self::Release(p) => Some(p),
            Self::Leave | Self::Cancel => None,
        }
    }
}

/// Maps display pixels of a widget's view to world positions.
///
/// Implemented by the rendering host, which owns cameras and viewports.
pub trait PointerPicker {
    /// World position under `pixel`, or `None` if nothing can be picked.
    ///
    /// For planar views the result lies on the view's slice plane.
    fn pick(&self, widget: WidgetId, pixel: Point2) -> Option<Point3>;

    /// Whether `pixel` is inside the widget's viewport.
    fn in_viewport(&self, widget: WidgetId, pixel: Point2) -> bool {
        let _ = (widget, pixel);
        true
    }

    /// Region face under `pixel` in a 3D view.
    fn pick_face(&self, widget: WidgetId, pixel: Point2) -> Option<FaceSide> {
        let _ = (widget, pixel);
        None
    }
}
