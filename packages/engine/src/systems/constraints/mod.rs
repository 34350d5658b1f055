//! XPBD constraints
//!
//! Constraints form a closed set dispatched with a `match` in the solve loop.
//! Every variant follows the same pattern:
//!
//! - `init` resets the accumulated multiplier `lambda` (once per substep)
//! - `apply` runs one Gauss-Seidel relaxation and moves bodies through
//!   positional impulses
//! - `apply_damping` is an optional velocity-only pass
//!
//! Degenerate geometry (no stable direction) and impossible mass
//! configurations skip the constraint for the substep instead of failing.

mod axis;
mod axle;
mod distance;
mod pin;

use std::fmt;

use tracing::trace;

use crate::core::math::{Real, Vec2};
use crate::domain::{Attachment, Body, BodyHandle};

pub use axis::AxisConstraint;
pub use axle::AxleConstraint;
pub use distance::DistanceConstraint;
pub use pin::PinConstraint;

/// Index of a constraint inside its scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConstraintHandle(pub(crate) u32);

impl ConstraintHandle {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ConstraintHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Result of one relaxation of one constraint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolveOutcome {
    Applied,
    /// Degenerate this substep (zero-length direction, zero generalized mass
    /// or a missing body).
    Skipped,
}

#[derive(Clone, Debug)]
pub enum ConstraintKind {
    Distance(DistanceConstraint),
    Axis(AxisConstraint),
    Pin(PinConstraint),
    Axle(AxleConstraint),
}

impl ConstraintKind {
    pub fn name(&self) -> &'static str {
        match self {
            ConstraintKind::Distance(_) => "distance",
            ConstraintKind::Axis(_) => "axis",
            ConstraintKind::Pin(_) => "pin",
            ConstraintKind::Axle(_) => "axle",
        }
    }
}

/// A constraint plus the state every kind shares.
#[derive(Clone, Debug)]
pub struct Constraint {
    pub enabled: bool,
    /// Inverse stiffness; 0 = rigid
    pub compliance: Real,
    /// Velocity damping coefficient (1/s); 0 = no damping pass
    pub damping: Real,
    lambda: Real,
    kind: ConstraintKind,
}

impl Constraint {
    pub fn new(kind: ConstraintKind) -> Self {
        Self {
            enabled: true,
            compliance: 0.0,
            damping: 0.0,
            lambda: 0.0,
            kind,
        }
    }

    pub fn distance(from: Attachment, to: Attachment, rest_distance: Real) -> Self {
        Self::new(ConstraintKind::Distance(DistanceConstraint::new(from, to, rest_distance)))
    }

    pub fn axis(attachment: Attachment, origin: Vec2, axis: Vec2) -> Self {
        Self::new(ConstraintKind::Axis(AxisConstraint::new(attachment, origin, axis)))
    }

    pub fn pin(attachment: Attachment, origin: Vec2) -> Self {
        Self::new(ConstraintKind::Pin(PinConstraint::new(attachment, origin)))
    }

    pub fn axle(a: BodyHandle, b: BodyHandle, gear_ratio: Real) -> Self {
        Self::new(ConstraintKind::Axle(AxleConstraint::new(a, b, gear_ratio)))
    }

    pub fn with_compliance(mut self, compliance: Real) -> Self {
        self.compliance = compliance.max(0.0);
        self
    }

    pub fn with_damping(mut self, damping: Real) -> Self {
        self.damping = damping.max(0.0);
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn kind(&self) -> &ConstraintKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut ConstraintKind {
        &mut self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Multiplier accumulated during the current substep.
    pub fn lambda(&self) -> Real {
        self.lambda
    }

    /// Bodies this constraint acts on.
    pub fn bodies(&self) -> impl Iterator<Item = BodyHandle> {
        let pair = match &self.kind {
            ConstraintKind::Distance(c) => [Some(c.from().body), Some(c.to().body)],
            ConstraintKind::Axis(c) => [Some(c.attachment().body), None],
            ConstraintKind::Pin(c) => [Some(c.attachment().body), None],
            ConstraintKind::Axle(c) => [Some(c.a()), Some(c.b())],
        };
        pair.into_iter().flatten()
    }

    pub fn init(&mut self, _delta: Real) {
        self.lambda = 0.0;
    }

    /// One Gauss-Seidel relaxation.
    pub fn apply(&mut self, delta: Real, bodies: &mut [Body]) -> SolveOutcome {
        let alpha = self.compliance / (delta * delta);
        let applied = match &self.kind {
            ConstraintKind::Distance(c) => c.solve(&mut self.lambda, alpha, delta, bodies).is_some(),
            ConstraintKind::Axis(c) => c.solve(&mut self.lambda, alpha, delta, bodies).is_some(),
            ConstraintKind::Pin(c) => c.solve(&mut self.lambda, alpha, delta, bodies).is_some(),
            ConstraintKind::Axle(c) => c.solve(&mut self.lambda, alpha, delta, bodies).is_some(),
        };
        if applied {
            SolveOutcome::Applied
        } else {
            trace!(kind = self.kind.name(), "constraint skipped for substep");
            SolveOutcome::Skipped
        }
    }

    /// Velocity-only relaxation; a no-op when `damping` is zero.
    pub fn apply_damping(&self, delta: Real, bodies: &mut [Body]) {
        if self.damping <= 0.0 {
            return;
        }
        let factor = (self.damping * delta).min(1.0);
        match &self.kind {
            ConstraintKind::Distance(c) => c.damp(factor, bodies),
            ConstraintKind::Axis(c) => c.damp(factor, bodies),
            ConstraintKind::Pin(c) => c.damp(factor, bodies),
            ConstraintKind::Axle(c) => c.damp(factor, bodies),
        }
    }
}

/// XPBD multiplier update `Δλ = (-c - λα) / (w + α)`.
///
/// `None` when the denominator vanishes (every endpoint fixed and the
/// constraint rigid), which would otherwise produce NaN.
#[inline]
pub(crate) fn delta_lambda(c: Real, lambda: Real, alpha: Real, w: Real) -> Option<Real> {
    let denominator = w + alpha;
    if denominator > 0.0 && denominator.is_finite() {
        Some((-c - lambda * alpha) / denominator)
    } else {
        None
    }
}

/// Velocity impulse magnitude that removes `factor` of a relative velocity.
#[inline]
pub(crate) fn damping_impulse(relative_velocity: Real, factor: Real, w: Real) -> Option<Real> {
    if w > 0.0 && w.is_finite() {
        Some(-relative_velocity * factor / w)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn zero_denominator_is_skipped() {
        assert_eq!(delta_lambda(1.0, 0.0, 0.0, 0.0), None);
        assert_relative_eq!(delta_lambda(1.0, 0.0, 1.0, 0.0).unwrap(), -1.0);
    }

    #[test]
    fn compliance_softens_the_correction() {
        let rigid = delta_lambda(2.0, 0.0, 0.0, 2.0).unwrap();
        let soft = delta_lambda(2.0, 0.0, 2.0, 2.0).unwrap();
        assert_relative_eq!(rigid, -1.0);
        assert_relative_eq!(soft, -0.5);
    }

    #[test]
    fn init_resets_lambda() {
        let mut bodies = vec![Body::at(0.0, 0.0), Body::at(2.0, 0.0)];
        let mut c = Constraint::distance(
            Attachment::central(BodyHandle(0)),
            Attachment::central(BodyHandle(1)),
            1.0,
        );
        assert_eq!(c.apply(0.01, &mut bodies), SolveOutcome::Applied);
        assert!(c.lambda() != 0.0);
        c.init(0.01);
        assert_eq!(c.lambda(), 0.0);
    }

    #[test]
    fn missing_body_is_skipped() {
        let mut bodies = vec![Body::new()];
        let mut c = Constraint::pin(Attachment::central(BodyHandle(4)), Vec2::ZERO);
        assert_eq!(c.apply(0.01, &mut bodies), SolveOutcome::Skipped);
    }

    #[test]
    fn bodies_lists_every_endpoint() {
        let c = Constraint::axle(BodyHandle(2), BodyHandle(5), 1.0);
        assert_eq!(c.bodies().collect::<Vec<_>>(), vec![BodyHandle(2), BodyHandle(5)]);
        let p = Constraint::pin(Attachment::central(BodyHandle(1)), Vec2::ZERO);
        assert_eq!(p.bodies().collect::<Vec<_>>(), vec![BodyHandle(1)]);
    }
}
