pub mod cost;
pub mod diagnosis;
pub mod patient;
pub mod token_count;
