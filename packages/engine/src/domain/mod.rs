//! Simulation state: bodies and the attachments constraints hold on them.

pub mod attachment;
pub mod body;

pub use attachment::Attachment;
pub use body::{Body, BodyHandle};
pub use crate::systems::constraints::ConstraintHandle;
