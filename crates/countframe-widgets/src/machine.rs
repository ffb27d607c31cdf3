//! Pointer-driven margin editing state machine.
//!
//! ```text
//! Outside --hover--> Hover(grip) --press--> Dragging(grip)
//!    ^                   |                      |
//!    +------ leave ------+---- release/abort ---+
//! ```
//!
//! The same machine serves planar views (grabbing an edge) and the 3D view
//! (grabbing a face); only the grip type differs.

use std::fmt;

use countframe_geom::{FaceSide, MarginViolation, Margins, RegionGeometry, Side};
use countframe_math::{Axis, Plane, Point3};
use countframe_slice::Edge;
use tracing::{debug, warn};

/// Something the pointer can grab that moves exactly one margin.
pub trait Grip: Copy + PartialEq + fmt::Debug {
    /// World axis the grip moves along.
    fn axis(&self) -> Axis;

    /// Whether it moves an inclusion (near) or exclusion (far) margin.
    fn side(&self) -> Side;

    /// Region side controlled by the grip.
    fn face_side(&self) -> FaceSide {
        FaceSide::new(self.axis(), self.side())
    }
}

/// An edge of a planar view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeGrip {
    /// Plane of the view.
    pub plane: Plane,
    /// Grabbed edge.
    pub edge: Edge,
}

impl Grip for EdgeGrip {
    fn axis(&self) -> Axis {
        self.edge.axis(self.plane)
    }

    fn side(&self) -> Side {
        self.edge.side()
    }
}

impl Grip for FaceSide {
    fn axis(&self) -> Axis {
        FaceSide::axis(*self)
    }

    fn side(&self) -> Side {
        FaceSide::side(*self)
    }
}

/// Current state of one view's interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionState<G> {
    /// Pointer is not near anything grabbable.
    Outside,
    /// Pointer is near a grip.
    Hover(G),
    /// A grip is being dragged.
    Dragging(G),
}

/// Result of a drag-move.
#[derive(Debug, Clone, PartialEq)]
pub enum DragOutcome {
    /// No drag in progress.
    Ignored,
    /// The move did not change any margin.
    Unchanged,
    /// The proposal passed validation and is now the region's margins.
    Committed(Margins),
    /// The proposal was refused; margins are as before the move.
    Rejected(MarginViolation),
}

/// Per-view state machine turning pointer motion into margin changes.
#[derive(Debug, Clone)]
pub struct InteractionMachine<G> {
    state: InteractionState<G>,
    last: Option<Point3>,
    before: Option<Margins>,
}

/// Machine for planar views.
pub type EdgeInteractionStateMachine = InteractionMachine<EdgeGrip>;

/// Machine for the 3D view.
pub type FaceInteractionStateMachine = InteractionMachine<FaceSide>;

impl<G: Grip> Default for InteractionMachine<G> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: Grip> InteractionMachine<G> {
    /// A machine in the `Outside` state.
    pub fn new() -> Self {
        Self {
            state: InteractionState::Outside,
            last: None,
            before: None,
        }
    }

    /// Current state.
    pub fn state(&self) -> InteractionState<G> {
        self.state
    }

    /// True while a grip is held.
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, InteractionState::Dragging(_))
    }

    /// Report what the pointer is over. Ignored while dragging.
    ///
    /// Returns `true` if the state changed.
    pub fn hover(&mut self, grip: Option<G>) -> bool {
        if self.is_dragging() {
            return false;
        }
        let next = grip.map_or(InteractionState::Outside, InteractionState::Hover);
        let changed = next != self.state;
        self.state = next;
        changed
    }

    /// Start dragging the hovered grip from world position `at`.
    ///
    /// `margins` is remembered so an abort can restore it. Returns the grip if
    /// a drag started.
    pub fn press(&mut self, at: Point3, margins: Margins) -> Option<G> {
        let InteractionState::Hover(grip) = self.state else {
            return None;
        };
        self.state = InteractionState::Dragging(grip);
        self.last = Some(at);
        self.before = Some(margins);
        Some(grip)
    }

    /// Move the held grip to world position `at`.
    ///
    /// The displacement since the previous event grows the inclusion margin
    /// of a near grip or shrinks the exclusion margin of a far grip. Negative
    /// results clamp to zero. The whole proposal is validated against every
    /// visible slice and either committed or dropped. The reference position
    /// advances in both cases.
    pub fn drag(&mut self, at: Point3, region: &mut RegionGeometry) -> DragOutcome {
        let InteractionState::Dragging(grip) = self.state else {
            return DragOutcome::Ignored;
        };
        let Some(last) = self.last.replace(at) else {
            return DragOutcome::Ignored;
        };

        let axis = grip.axis();
        let delta = axis.of(&at) - axis.of(&last);
        let current = region.margins();
        let mut proposal = current;
        match grip.side() {
            Side::Near => proposal.set(axis, Side::Near, current.inclusion(axis) + delta),
            Side::Far => proposal.set(axis, Side::Far, current.exclusion(axis) - delta),
        }
        let proposal = proposal.clamped();
        if proposal == current {
            return DragOutcome::Unchanged;
        }

        match region.try_set_margins(proposal) {
            Ok(()) => DragOutcome::Committed(proposal),
            Err(violation) => {
                debug!(region = region.id(), ?grip, delta, %violation, "drag rejected");
                DragOutcome::Rejected(violation)
            }
        }
    }

    /// Let go of the grip. Returns the grip that was held.
    pub fn release(&mut self) -> Option<G> {
        let held = match self.state {
            InteractionState::Dragging(grip) => Some(grip),
            _ => None,
        };
        self.reset();
        held
    }

    /// Cancel the gesture, restoring the margins from before the press.
    ///
    /// Returns `true` if the region had to be changed back. If the boundary
    /// was replaced during the drag and the old margins no longer fit it,
    /// the dragged margins are kept and `false` is returned.
    pub fn abort(&mut self, region: &mut RegionGeometry) -> bool {
        let was_dragging = self.is_dragging();
        let before = self.before;
        self.reset();
        match before {
            Some(before) if was_dragging && before != region.margins() => {
                match region.try_set_margins(before) {
                    Ok(()) => true,
                    Err(violation) => {
                        warn!(region = region.id(), %violation, "could not restore margins after abort");
                        false
                    }
                }
            }
            _ => false,
        }
    }

    fn reset(&mut self) {
        self.state = InteractionState::Outside;
        self.last = None;
        self.before = None;
    }
}
