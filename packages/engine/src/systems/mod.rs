pub mod constraints;
pub mod forces;
pub mod friction;
