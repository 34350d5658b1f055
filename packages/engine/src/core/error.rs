//! Error types for scene construction and configuration.
//!
//! Numeric edge cases inside the solver never produce errors; they are
//! skipped for the substep. Only API misuse ends up here.

use thiserror::Error;

use crate::domain::{BodyHandle, ConstraintHandle};

#[derive(Debug, Error)]
pub enum SceneError {
    /// A handle that was never returned by `Scene::add_body`.
    #[error("unknown body handle {0}")]
    UnknownBody(BodyHandle),

    /// A handle that was never returned by `Scene::add_constraint`.
    #[error("unknown constraint handle {0}")]
    UnknownConstraint(ConstraintHandle),

    /// A kind-specific operation was used on another constraint kind.
    #[error("constraint {handle} is a {actual} constraint, expected {expected}")]
    WrongConstraintKind {
        handle: ConstraintHandle,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    #[error("settings parse error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type SceneResult<T> = Result<T, SceneError>;
