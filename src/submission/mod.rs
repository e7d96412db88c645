//! Draft → order transition and submitted order reads

pub mod gate;
pub mod handlers;

pub use gate::SubmissionGate;
