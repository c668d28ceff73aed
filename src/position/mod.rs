//! Financial position aggregation

mod aggregator;
mod types;

pub use aggregator::{aggregate, to_monthly, PositionAggregator};
pub use types::{AssetTotals, DebtCategory, DebtTotals, FinancialPosition, PensionEntitlements, PersonProfile};
