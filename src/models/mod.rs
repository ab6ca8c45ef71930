pub mod replenishment;
pub mod utils;
