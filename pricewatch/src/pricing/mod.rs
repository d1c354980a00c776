//! Price values: parsing raw text, candidate records and selection.

mod candidate;
mod parser;
mod selector;

pub use candidate::{PriceCandidate, StrategyKind};
pub use parser::{parse_price, SANITY_RANGE};
pub use selector::select_price;
