//! Property tests: no sequence of pointer events can leave a region with
//! crossing edges, and aborting always restores the pre-drag margins.

use std::cell::RefCell;
use std::rc::Rc;

use countframe_geom::{MarginPolicy, Margins, RegionGeometry, SliceBoundary, SliceStack};
use countframe_math::{AxisPermutation, Plane, Point2, Point3};
use countframe_widgets::{EventOutcome, PointerEvent, PointerPicker, RegionWidgetSet, WidgetId};
use proptest::prelude::*;

struct SlicePicker {
    views: Vec<(WidgetId, Plane, f64)>,
}

impl PointerPicker for SlicePicker {
    fn pick(&self, widget: WidgetId, pixel: Point2) -> Option<Point3> {
        self.views
            .iter()
            .find(|(id, _, _)| *id == widget)
            .map(|&(_, plane, c)| plane.permutation().lift(&pixel, c))
    }
}

fn tapered() -> RegionGeometry {
    let stack = SliceStack::new(
        AxisPermutation::IDENTITY,
        vec![
            SliceBoundary::rect(0.0, 0.0, 100.0, 0.0, 100.0),
            SliceBoundary::rect(10.0, 30.0, 70.0, 20.0, 90.0),
            SliceBoundary::rect(20.0, 10.0, 90.0, 0.0, 100.0),
        ],
    )
    .unwrap();
    RegionGeometry::new("p", MarginPolicy::Adaptive { stack }, [2.0, 2.0, 1.0]).unwrap()
}

fn setup() -> (RegionWidgetSet, SlicePicker, Vec<WidgetId>) {
    let mut set = RegionWidgetSet::new(Rc::new(RefCell::new(tapered())));
    let mut views = Vec::new();
    for (plane, c) in [(Plane::Axial, 0.0), (Plane::Coronal, 50.0), (Plane::Sagittal, 50.0)] {
        let id = set.create_widget(Some(plane));
        set.set_slice(id, c).unwrap();
        views.push((id, plane, c));
    }
    let ids = views.iter().map(|v| v.0).collect();
    (set, SlicePicker { views }, ids)
}

/// Every slice between the bounding slices keeps near + resolution <= far.
fn edges_apart(region: &RegionGeometry) -> bool {
    region.validate_margins(&region.margins()).is_ok()
}

#[derive(Debug, Clone)]
enum Step {
    Move(usize, f64, f64),
    Press(usize, f64, f64),
    Release(usize),
    Cancel(usize),
}

fn step() -> impl Strategy<Value = Step> {
    let xy = (0usize..3, -20.0f64..120.0, -20.0f64..120.0);
    prop_oneof![
        4 => xy.clone().prop_map(|(v, x, y)| Step::Move(v, x, y)),
        2 => xy.prop_map(|(v, x, y)| Step::Press(v, x, y)),
        1 => (0usize..3).prop_map(Step::Release),
        1 => (0usize..3).prop_map(Step::Cancel),
    ]
}

proptest! {
    #[test]
    fn drags_never_cross_edges(steps in prop::collection::vec(step(), 1..60)) {
        let (mut set, picker, ids) = setup();
        for s in steps {
            let (id, event) = match s {
                Step::Move(v, x, y) => (ids[v], PointerEvent::Move(Point2::new(x, y))),
                Step::Press(v, x, y) => (ids[v], PointerEvent::Press(Point2::new(x, y))),
                Step::Release(v) => (ids[v], PointerEvent::Release(Point2::new(0.0, 0.0))),
                Step::Cancel(v) => (ids[v], PointerEvent::Cancel),
            };
            set.handle(id, event, &picker).unwrap();
            let revision = {
                let region = set.region().borrow();
                prop_assert!(edges_apart(&region));
                let margins = region.margins();
                prop_assert!(margins.inclusion.iter().chain(&margins.exclusion).all(|m| *m >= 0.0));
                region.revision()
            };
            for &view in &ids {
                prop_assert_eq!(set.slice_face(view).unwrap().revision, revision);
            }
        }
    }

    #[test]
    fn abort_restores_margins(
        start in 0.0f64..10.0,
        moves in prop::collection::vec((-30.0f64..130.0, -30.0f64..130.0), 1..20),
    ) {
        let (mut set, picker, ids) = setup();
        let axial = ids[0];
        prop_assume!(set.set_margins(Margins::new([start, 0.0, 0.0], [0.0; 3])).is_ok());
        let before = set.region().borrow().margins();

        let pressed = set.handle(axial, PointerEvent::Press(Point2::new(start, 50.0)), &picker).unwrap();
        prop_assert!(matches!(pressed, EventOutcome::DragStarted(_)));
        for (x, y) in moves {
            set.handle(axial, PointerEvent::Move(Point2::new(x, y)), &picker).unwrap();
        }
        set.handle(axial, PointerEvent::Cancel, &picker).unwrap();
        prop_assert_eq!(set.region().borrow().margins(), before);
        prop_assert_eq!(set.active(), None);
    }
}

#[test]
fn crossing_drag_is_refused_and_reported() {
    let region =
        RegionGeometry::rectangular("b", [0.0, 100.0, 0.0, 100.0, 0.0, 10.0], [2.0; 3]).unwrap();
    let mut set = RegionWidgetSet::new(Rc::new(RefCell::new(region)));
    let axial = set.create_widget(Some(Plane::Axial));
    let picker = SlicePicker {
        views: vec![(axial, Plane::Axial, 5.0)],
    };
    set.handle(axial, PointerEvent::Press(Point2::new(0.0, 50.0)), &picker)
        .unwrap();
    let outcome = set
        .handle(axial, PointerEvent::Move(Point2::new(150.0, 50.0)), &picker)
        .unwrap();
    assert!(matches!(outcome, EventOutcome::Rejected(_)));
    assert_eq!(set.region().borrow().margins(), Margins::ZERO);
}
