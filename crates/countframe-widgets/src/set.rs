//! One region edited from several synchronized views.
//!
//! Every view (a planar slice or the 3D view) owns its own interaction
//! machine. Only one view may drag at a time. Each committed change is
//! pushed to every view and then to subscribers before the event handler
//! returns, so all views always show the same revision.

use std::cell::RefCell;
use std::rc::Rc;

use countframe_geom::{FaceSide, MarginViolation, Margins, RegionGeometry, RegionSettings};
use countframe_math::{Plane, Point2, Point3};
use countframe_slice::{SliceFace, SliceFaceProjector};
use slotmap::{new_key_type, SlotMap};
use tracing::{debug, trace};

use crate::error::WidgetError;
use crate::machine::{
    DragOutcome, EdgeGrip, EdgeInteractionStateMachine, FaceInteractionStateMachine, Grip,
    InteractionState,
};
use crate::picker::{PointerEvent, PointerPicker};

new_key_type! {
    /// Handle of a view within a [`RegionWidgetSet`].
    pub struct WidgetId;
}

/// A region shared between its widget set and the rest of the application.
pub type SharedRegion = Rc<RefCell<RegionGeometry>>;

/// View-independent interaction state, naming the region side involved.
pub type WidgetState = InteractionState<FaceSide>;

/// Notification sent after every committed change.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionChange {
    /// Region revision after the change.
    pub revision: u64,
    /// Margins after the change.
    pub margins: Margins,
    /// View whose drag caused the change; `None` for programmatic edits.
    pub source: Option<WidgetId>,
}

/// What handling a pointer event did.
#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    /// Nothing changed.
    Ignored,
    /// The hovered side changed.
    Hover(Option<FaceSide>),
    /// A drag started on this side.
    DragStarted(FaceSide),
    /// A drag step was committed and broadcast.
    Committed(RegionChange),
    /// A drag step was refused.
    Rejected(MarginViolation),
    /// The drag on this side ended.
    Released(FaceSide),
    /// The drag was cancelled and the margins restored.
    Aborted,
}

#[derive(Debug)]
enum View {
    Planar {
        projector: SliceFaceProjector,
        coordinate: f64,
        machine: EdgeInteractionStateMachine,
        face: SliceFace,
    },
    Volume {
        machine: FaceInteractionStateMachine,
    },
}

fn side_state<G: Grip>(state: InteractionState<G>) -> WidgetState {
    match state {
        InteractionState::Outside => InteractionState::Outside,
        InteractionState::Hover(g) => InteractionState::Hover(g.face_side()),
        InteractionState::Dragging(g) => InteractionState::Dragging(g.face_side()),
    }
}

impl View {
    fn state(&self) -> WidgetState {
        match self {
            View::Planar { machine, .. } => side_state(machine.state()),
            View::Volume { machine } => side_state(machine.state()),
        }
    }

    fn press(&mut self, at: Point3, margins: Margins) -> Option<FaceSide> {
        match self {
            View::Planar { machine, .. } => machine.press(at, margins).map(|g| g.face_side()),
            View::Volume { machine } => machine.press(at, margins),
        }
    }

    fn drag(&mut self, at: Point3, region: &mut RegionGeometry) -> DragOutcome {
        match self {
            View::Planar { machine, .. } => machine.drag(at, region),
            View::Volume { machine } => machine.drag(at, region),
        }
    }

    fn release(&mut self) -> Option<FaceSide> {
        match self {
            View::Planar { machine, .. } => machine.release().map(|g| g.face_side()),
            View::Volume { machine } => machine.release(),
        }
    }

    fn abort(&mut self, region: &mut RegionGeometry) -> bool {
        match self {
            View::Planar { machine, .. } => machine.abort(region),
            View::Volume { machine } => machine.abort(region),
        }
    }

    fn refresh(&mut self, region: &RegionGeometry) {
        if let View::Planar {
            projector,
            coordinate,
            face,
            ..
        } = self
        {
            *face = projector.project(region, *coordinate);
        }
    }

    /// Re-project a planar face derived from an older region revision.
    fn sync(&mut self, region: &RegionGeometry) {
        let stale = matches!(self, View::Planar { face, .. } if face.revision != region.revision());
        if stale {
            trace!(revision = region.revision(), "stale slice face");
            self.refresh(region);
        }
    }
}

type Listener = Box<dyn FnMut(&RegionChange)>;

/// All views editing one region.
pub struct RegionWidgetSet {
    region: SharedRegion,
    views: SlotMap<WidgetId, View>,
    active: Option<WidgetId>,
    listeners: Vec<Listener>,
    hover_tolerance: f64,
}

impl RegionWidgetSet {
    /// Empty set over `region` with default settings.
    pub fn new(region: SharedRegion) -> Self {
        Self::with_settings(region, &RegionSettings::default())
    }

    /// Empty set over `region` using the hover tolerance from `settings`.
    pub fn with_settings(region: SharedRegion, settings: &RegionSettings) -> Self {
        Self {
            region,
            views: SlotMap::with_key(),
            active: None,
            listeners: Vec::new(),
            hover_tolerance: settings.hover_tolerance,
        }
    }

    /// The edited region.
    pub fn region(&self) -> &SharedRegion {
        &self.region
    }

    /// Number of views.
    pub fn len(&self) -> usize {
        self.views.len()
    }

    /// True if there are no views.
    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Ids of all views.
    pub fn widgets(&self) -> impl Iterator<Item = WidgetId> + '_ {
        self.views.keys()
    }

    /// View currently dragging, if any.
    pub fn active(&self) -> Option<WidgetId> {
        self.active
    }

    /// Add a planar view on `plane`, or the 3D view for `None`.
    ///
    /// Planar views start at the middle of the region along the plane normal.
    pub fn create_widget(&mut self, plane: Option<Plane>) -> WidgetId {
        let region = self.region.borrow();
        let view = match plane {
            Some(plane) => {
                let projector = SliceFaceProjector::new(plane);
                let coordinate = region
                    .policy()
                    .bounds()
                    .map(|b| {
                        let (lo, hi) = b.range(plane.normal());
                        0.5 * (lo + hi)
                    })
                    .unwrap_or(0.0);
                View::Planar {
                    projector,
                    coordinate,
                    machine: EdgeInteractionStateMachine::new(),
                    face: projector.project(&region, coordinate),
                }
            }
            None => View::Volume {
                machine: FaceInteractionStateMachine::new(),
            },
        };
        drop(region);
        let id = self.views.insert(view);
        debug!(?id, ?plane, "widget created");
        id
    }

    /// Remove a view, aborting its drag if it had one.
    pub fn remove_widget(&mut self, id: WidgetId) -> bool {
        if self.active == Some(id) {
            self.cancel();
        }
        let removed = self.views.remove(id).is_some();
        if removed {
            debug!(?id, "widget removed");
        }
        removed
    }

    /// Move a planar view to slice `coordinate` along its normal.
    pub fn set_slice(&mut self, id: WidgetId, coordinate: f64) -> Result<(), WidgetError> {
        if !coordinate.is_finite() {
            return Err(WidgetError::InvalidSlice(coordinate));
        }
        match self.views.get_mut(id) {
            Some(View::Planar {
                projector,
                coordinate: current,
                face,
                ..
            }) => {
                *current = coordinate;
                *face = projector.project(&self.region.borrow(), coordinate);
                Ok(())
            }
            Some(View::Volume { .. }) => Err(WidgetError::NotPlanar(id)),
            None => Err(WidgetError::UnknownWidget(id)),
        }
    }

    /// Current face of a planar view.
    ///
    /// A face left behind by an edit made directly on the shared region is
    /// re-projected first.
    pub fn slice_face(&mut self, id: WidgetId) -> Option<&SliceFace> {
        let region = self.region.borrow();
        let view = self.views.get_mut(id)?;
        view.sync(&region);
        match view {
            View::Planar { face, .. } => Some(face),
            View::Volume { .. } => None,
        }
    }

    /// Interaction state of a view.
    pub fn state(&self, id: WidgetId) -> Option<WidgetState> {
        self.views.get(id).map(View::state)
    }

    /// Call `listener` after every committed change.
    pub fn subscribe(&mut self, listener: impl FnMut(&RegionChange) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Feed a pointer event to view `id`.
    ///
    /// Positions outside the view's viewport count as leaving it. Leaving or
    /// cancelling during a drag aborts it. Presses are ignored while another
    /// view is dragging.
    pub fn handle(
        &mut self,
        id: WidgetId,
        event: PointerEvent,
        picker: &dyn PointerPicker,
    ) -> Result<EventOutcome, WidgetError> {
        if !self.views.contains_key(id) {
            return Err(WidgetError::UnknownWidget(id));
        }
        let event = match event.position() {
            Some(pixel) if !picker.in_viewport(id, pixel) => PointerEvent::Leave,
            _ => event,
        };
        let outcome = match event {
            PointerEvent::Move(pixel) => self.on_move(id, pixel, picker),
            PointerEvent::Press(pixel) => self.on_press(id, pixel, picker),
            PointerEvent::Release(_) => self.on_release(id),
            PointerEvent::Leave | PointerEvent::Cancel => self.on_leave(id),
        };
        trace!(?id, ?event, ?outcome, "pointer event");
        Ok(outcome)
    }

    fn on_move(&mut self, id: WidgetId, pixel: Point2, picker: &dyn PointerPicker) -> EventOutcome {
        let at = picker.pick(id, pixel);
        if self.active != Some(id) {
            return self.hover_outcome(id, pixel, at, picker);
        }
        let Some(at) = at else {
            return EventOutcome::Ignored;
        };
        let outcome = match self.views.get_mut(id) {
            Some(view) => view.drag(at, &mut self.region.borrow_mut()),
            None => DragOutcome::Ignored,
        };
        match outcome {
            DragOutcome::Committed(_) => EventOutcome::Committed(self.publish(Some(id))),
            DragOutcome::Rejected(violation) => EventOutcome::Rejected(violation),
            DragOutcome::Unchanged | DragOutcome::Ignored => EventOutcome::Ignored,
        }
    }

    fn on_press(&mut self, id: WidgetId, pixel: Point2, picker: &dyn PointerPicker) -> EventOutcome {
        if self.active.is_some() {
            return EventOutcome::Ignored;
        }
        let at = picker.pick(id, pixel);
        self.update_hover(id, pixel, at, picker);
        let Some(at) = at else {
            return EventOutcome::Ignored;
        };
        let margins = self.region.borrow().margins();
        match self.views.get_mut(id).and_then(|view| view.press(at, margins)) {
            Some(side) => {
                self.active = Some(id);
                debug!(?id, ?side, "drag started");
                EventOutcome::DragStarted(side)
            }
            None => EventOutcome::Ignored,
        }
    }

    fn on_release(&mut self, id: WidgetId) -> EventOutcome {
        if self.active != Some(id) {
            return EventOutcome::Ignored;
        }
        self.active = None;
        match self.views.get_mut(id).and_then(View::release) {
            Some(side) => {
                debug!(?id, ?side, "drag finished");
                EventOutcome::Released(side)
            }
            None => EventOutcome::Ignored,
        }
    }

    fn on_leave(&mut self, id: WidgetId) -> EventOutcome {
        if self.active == Some(id) {
            self.cancel();
            return EventOutcome::Aborted;
        }
        let changed = match self.views.get_mut(id) {
            Some(View::Planar { machine, .. }) => machine.hover(None),
            Some(View::Volume { machine }) => machine.hover(None),
            None => false,
        };
        if changed {
            EventOutcome::Hover(None)
        } else {
            EventOutcome::Ignored
        }
    }

    fn hover_outcome(
        &mut self,
        id: WidgetId,
        pixel: Point2,
        at: Option<Point3>,
        picker: &dyn PointerPicker,
    ) -> EventOutcome {
        if !self.update_hover(id, pixel, at, picker) {
            return EventOutcome::Ignored;
        }
        match self.state(id) {
            Some(InteractionState::Hover(side)) => EventOutcome::Hover(Some(side)),
            _ => EventOutcome::Hover(None),
        }
    }

    /// Returns `true` if the hovered grip changed.
    fn update_hover(
        &mut self,
        id: WidgetId,
        pixel: Point2,
        at: Option<Point3>,
        picker: &dyn PointerPicker,
    ) -> bool {
        let tolerance = self.hover_tolerance;
        if let Some(view) = self.views.get_mut(id) {
            view.sync(&self.region.borrow());
        }
        match self.views.get_mut(id) {
            Some(View::Planar {
                projector,
                machine,
                face,
                ..
            }) => {
                let plane = projector.plane();
                let edge = at.and_then(|at| face.edge_near(&plane.permutation().project(&at), tolerance));
                machine.hover(edge.map(|edge| EdgeGrip { plane, edge }))
            }
            Some(View::Volume { machine }) => machine.hover(picker.pick_face(id, pixel)),
            None => false,
        }
    }

    /// Abort the active drag, if any, restoring the margins it started from.
    ///
    /// Returns `true` if the region had to be changed back.
    pub fn cancel(&mut self) -> bool {
        let Some(id) = self.active.take() else {
            return false;
        };
        let restored = match self.views.get_mut(id) {
            Some(view) => view.abort(&mut self.region.borrow_mut()),
            None => false,
        };
        debug!(?id, restored, "drag aborted");
        if restored {
            self.publish(Some(id));
        }
        restored
    }

    /// Programmatic edit: validate and commit `margins`, then broadcast.
    ///
    /// A drag in progress is aborted first.
    pub fn set_margins(&mut self, margins: Margins) -> Result<RegionChange, MarginViolation> {
        self.cancel();
        self.region.borrow_mut().try_set_margins(margins)?;
        Ok(self.publish(None))
    }

    /// Re-derive every view after the region was changed through another
    /// handle, e.g. a new boundary policy.
    pub fn refresh(&mut self) -> RegionChange {
        self.publish(None)
    }

    fn publish(&mut self, source: Option<WidgetId>) -> RegionChange {
        let change = {
            let region = self.region.borrow();
            let faces = region.compute_faces().len();
            for view in self.views.values_mut() {
                view.refresh(&region);
            }
            trace!(revision = region.revision(), faces, "views refreshed");
            RegionChange {
                revision: region.revision(),
                margins: region.margins(),
                source,
            }
        };
        for listener in &mut self.listeners {
            listener(&change);
        }
        debug!(
            revision = change.revision,
            ?source,
            listeners = self.listeners.len(),
            "region change published"
        );
        change
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use countframe_slice::Edge;
    use std::collections::HashMap;

    /// Maps pixels straight onto the slice plane of each planar view.
    #[derive(Default)]
    struct FlatPicker {
        planes: HashMap<WidgetId, (Plane, f64)>,
        face: Option<FaceSide>,
    }

    impl PointerPicker for FlatPicker {
        fn pick(&self, widget: WidgetId, pixel: Point2) -> Option<Point3> {
            match self.planes.get(&widget) {
                Some(&(plane, coordinate)) => Some(plane.permutation().lift(&pixel, coordinate)),
                None => Some(Point3::new(pixel.x, pixel.y, 5.0)),
            }
        }

        fn in_viewport(&self, _widget: WidgetId, pixel: Point2) -> bool {
            pixel.x.abs() <= 1000.0 && pixel.y.abs() <= 1000.0
        }

        fn pick_face(&self, _widget: WidgetId, _pixel: Point2) -> Option<FaceSide> {
            self.face
        }
    }

    struct Fixture {
        set: RegionWidgetSet,
        picker: FlatPicker,
        axial: WidgetId,
        coronal: WidgetId,
        changes: Rc<RefCell<Vec<RegionChange>>>,
    }

    fn fixture() -> Fixture {
        let region =
            RegionGeometry::rectangular("1", [0.0, 100.0, 0.0, 100.0, 0.0, 10.0], [2.0, 2.0, 2.0]).unwrap();
        let mut set = RegionWidgetSet::new(Rc::new(RefCell::new(region)));
        let axial = set.create_widget(Some(Plane::Axial));
        let coronal = set.create_widget(Some(Plane::Coronal));
        let mut picker = FlatPicker::default();
        picker.planes.insert(axial, (Plane::Axial, 5.0));
        picker.planes.insert(coronal, (Plane::Coronal, 50.0));

        let changes = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&changes);
        set.subscribe(move |c| sink.borrow_mut().push(c.clone()));
        Fixture {
            set,
            picker,
            axial,
            coronal,
            changes,
        }
    }

    fn send(f: &mut Fixture, id: WidgetId, event: PointerEvent) -> EventOutcome {
        f.set.handle(id, event, &f.picker).unwrap()
    }

    #[test]
    fn test_widgets_start_mid_region() {
        let mut f = fixture();
        assert_eq!(f.set.len(), 2);
        assert_eq!(f.set.slice_face(f.axial).unwrap().coordinate, 5.0);
        assert_eq!(f.set.slice_face(f.coronal).unwrap().coordinate, 50.0);
        assert!(f.set.slice_face(f.axial).unwrap().is_visible());
    }

    #[test]
    fn test_drag_broadcasts_to_all_views() {
        let mut f = fixture();
        let (axial, coronal) = (f.axial, f.coronal);
        assert_eq!(
            send(&mut f, axial, PointerEvent::Move(Point2::new(1.0, 50.0))),
            EventOutcome::Hover(Some(FaceSide::Left))
        );
        assert_eq!(
            send(&mut f, axial, PointerEvent::Press(Point2::new(1.0, 50.0))),
            EventOutcome::DragStarted(FaceSide::Left)
        );
        let outcome = send(&mut f, axial, PointerEvent::Move(Point2::new(21.0, 50.0)));
        let EventOutcome::Committed(change) = outcome else {
            panic!("expected commit, got {outcome:?}");
        };
        assert_eq!(change.margins.inclusion[0], 20.0);
        assert_eq!(change.source, Some(axial));

        let revision = f.set.region().borrow().revision();
        for id in [axial, coronal] {
            assert_eq!(f.set.slice_face(id).unwrap().revision, revision);
        }
        let coronal_left = &f.set.slice_face(coronal).unwrap().edge(Edge::Left).polyline;
        assert!(coronal_left.points.iter().all(|p| p.x == 20.0));
        assert_eq!(f.changes.borrow().len(), 1);

        assert_eq!(
            send(&mut f, axial, PointerEvent::Release(Point2::new(21.0, 50.0))),
            EventOutcome::Released(FaceSide::Left)
        );
        assert_eq!(f.set.active(), None);
        assert_eq!(f.set.state(axial), Some(InteractionState::Outside));
    }

    #[test]
    fn test_rejected_drag_is_not_broadcast() {
        let mut f = fixture();
        let axial = f.axial;
        send(&mut f, axial, PointerEvent::Press(Point2::new(1.0, 50.0)));
        let outcome = send(&mut f, axial, PointerEvent::Move(Point2::new(151.0, 50.0)));
        assert!(matches!(outcome, EventOutcome::Rejected(_)));
        assert_eq!(f.set.region().borrow().margins(), Margins::ZERO);
        assert!(f.changes.borrow().is_empty());
    }

    #[test]
    fn test_only_one_drag_at_a_time() {
        let mut f = fixture();
        let (axial, coronal) = (f.axial, f.coronal);
        send(&mut f, axial, PointerEvent::Press(Point2::new(1.0, 50.0)));
        assert_eq!(
            send(&mut f, coronal, PointerEvent::Press(Point2::new(99.0, 5.0))),
            EventOutcome::Ignored
        );
        assert_eq!(f.set.active(), Some(axial));
        assert_eq!(
            send(&mut f, coronal, PointerEvent::Release(Point2::new(99.0, 5.0))),
            EventOutcome::Ignored
        );
    }

    #[test]
    fn test_leaving_viewport_aborts() {
        let mut f = fixture();
        let axial = f.axial;
        assert!(f.set.set_margins(Margins::new([4.0, 0.0, 0.0], [0.0; 3])).is_ok());
        let before = f.set.region().borrow().margins();

        send(&mut f, axial, PointerEvent::Press(Point2::new(4.0, 50.0)));
        send(&mut f, axial, PointerEvent::Move(Point2::new(30.0, 50.0)));
        assert_eq!(f.set.region().borrow().margins().inclusion[0], 30.0);
        assert_eq!(
            send(&mut f, axial, PointerEvent::Move(Point2::new(5000.0, 50.0))),
            EventOutcome::Aborted
        );
        assert_eq!(f.set.region().borrow().margins(), before);
        let last = f.changes.borrow().last().cloned().unwrap();
        assert_eq!(last.margins, before);
        assert_eq!(f.set.active(), None);
    }

    #[test]
    fn test_remove_widget_mid_drag() {
        let mut f = fixture();
        let axial = f.axial;
        send(&mut f, axial, PointerEvent::Press(Point2::new(1.0, 50.0)));
        send(&mut f, axial, PointerEvent::Move(Point2::new(11.0, 50.0)));
        assert!(f.set.remove_widget(axial));
        assert!(!f.set.remove_widget(axial));
        assert_eq!(f.set.region().borrow().margins(), Margins::ZERO);
        assert_eq!(
            f.set.handle(axial, PointerEvent::Cancel, &f.picker),
            Err(WidgetError::UnknownWidget(axial))
        );
    }

    #[test]
    fn test_volume_view_drags_faces() {
        let mut f = fixture();
        let volume = f.set.create_widget(None);
        f.picker.face = Some(FaceSide::Right);
        assert_eq!(
            send(&mut f, volume, PointerEvent::Press(Point2::new(100.0, 50.0))),
            EventOutcome::DragStarted(FaceSide::Right)
        );
        send(&mut f, volume, PointerEvent::Move(Point2::new(90.0, 50.0)));
        assert_eq!(f.set.region().borrow().margins().exclusion[0], 10.0);
        assert_eq!(f.set.set_slice(volume, 1.0), Err(WidgetError::NotPlanar(volume)));
        assert_eq!(send(&mut f, volume, PointerEvent::Cancel), EventOutcome::Aborted);
        assert_eq!(f.set.region().borrow().margins(), Margins::ZERO);
    }

    #[test]
    fn test_set_slice_and_refresh() {
        let mut f = fixture();
        let axial = f.axial;
        f.set.set_slice(axial, 20.0).unwrap();
        assert!(!f.set.slice_face(axial).unwrap().is_visible());
        assert!(matches!(
            f.set.set_slice(axial, f64::NAN),
            Err(WidgetError::InvalidSlice(_))
        ));

        f.set.region().borrow_mut().set_policy(countframe_geom::MarginPolicy::rectangular([
            0.0, 100.0, 0.0, 100.0, 0.0, 40.0,
        ]));
        let change = f.set.refresh();
        assert_eq!(f.set.slice_face(axial).unwrap().revision, change.revision);
        assert!(f.set.slice_face(axial).unwrap().is_visible());
    }

    #[test]
    fn test_direct_region_edit_reaches_faces() {
        let mut f = fixture();
        let axial = f.axial;
        let before = f.set.slice_face(axial).unwrap().revision;

        // edit through the shared handle, without refresh()
        assert!(f.set.region().borrow_mut().set_margins([20.0, 0.0, 0.0], [0.0; 3]));
        let revision = f.set.region().borrow().revision();
        assert_ne!(revision, before);

        let face = f.set.slice_face(axial).unwrap();
        assert_eq!(face.revision, revision);
        assert!(face.edge(Edge::Left).polyline.points.iter().all(|p| p.x == 20.0));

        // hover works against the moved edge, not the cached one
        assert_eq!(
            send(&mut f, axial, PointerEvent::Move(Point2::new(1.0, 50.0))),
            EventOutcome::Ignored
        );
        assert_eq!(
            send(&mut f, axial, PointerEvent::Move(Point2::new(20.5, 50.0))),
            EventOutcome::Hover(Some(FaceSide::Left))
        );
        assert!(f.changes.borrow().is_empty());
    }
}
