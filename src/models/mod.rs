pub mod aggregation;
pub mod transaction;

pub use aggregation::{
    AggregationResult, CategoryAmounts, CategoryRow, CategorySummary, CategoryTotals, WeekBucket,
};
pub use transaction::{sum_amounts, NormalizedTransaction, RawTransaction, UNCATEGORIZED};
