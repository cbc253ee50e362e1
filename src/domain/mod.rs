pub mod compact_id;
pub mod eth;
pub mod mandate;
pub mod quote;
pub mod registry;
pub mod token;
pub mod witness;
