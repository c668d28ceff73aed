//! Time-value primitives and pension projection

pub mod tvm;
mod pension;

pub use pension::{shift_age, PensionProjection, PensionProjector, PensionStream, StreamKind};
pub use tvm::{
    annuity_payment, compound_future_value, future_value_with_contribution,
    growing_contribution_future_value, safe_ratio,
};
