#![warn(missing_docs)]

//! Interactive editing of counting regions.
//!
//! A [`RegionWidgetSet`] shows one region in any number of planar views and
//! an optional 3D view. Dragging an edge or face moves the matching margin;
//! every step is validated against the whole region and, when accepted,
//! pushed to all views before the event returns.
//!
//! # Example
//!
//! ```
//! use std::{cell::RefCell, rc::Rc};
//!
//! use countframe_geom::{FaceSide, RegionGeometry};
//! use countframe_math::{Plane, Point2, Point3};
//! use countframe_widgets::{EventOutcome, PointerEvent, PointerPicker, RegionWidgetSet, WidgetId};
//!
//! struct Axial;
//! impl PointerPicker for Axial {
//!     fn pick(&self, _: WidgetId, pixel: Point2) -> Option<Point3> {
//!         Some(Point3::new(pixel.x, pixel.y, 5.0))
//!     }
//! }
//!
//! let region =
//!     RegionGeometry::rectangular("1", [0.0, 100.0, 0.0, 100.0, 0.0, 10.0], [1.0; 3]).unwrap();
//! let mut set = RegionWidgetSet::new(Rc::new(RefCell::new(region)));
//! let view = set.create_widget(Some(Plane::Axial));
//!
//! let press = set.handle(view, PointerEvent::Press(Point2::new(0.0, 50.0)), &Axial).unwrap();
//! assert_eq!(press, EventOutcome::DragStarted(FaceSide::Left));
//! set.handle(view, PointerEvent::Move(Point2::new(10.0, 50.0)), &Axial).unwrap();
//! assert_eq!(set.region().borrow().margins().inclusion[0], 10.0);
//! ```

pub mod error;
pub mod list;
pub mod machine;
pub mod picker;
pub mod set;

pub use error::{LoadError, WidgetError};
pub use list::{natural_cmp, LoadFailure, LoadReport, RegionId, RegionList};
pub use machine::{
    DragOutcome, EdgeGrip, EdgeInteractionStateMachine, FaceInteractionStateMachine, Grip,
    InteractionMachine, InteractionState,
};
pub use picker::{PointerEvent, PointerPicker};
pub use set::{EventOutcome, RegionChange, RegionWidgetSet, SharedRegion, WidgetId, WidgetState};
