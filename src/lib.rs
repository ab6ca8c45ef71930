pub mod models;
pub mod problem;
pub mod report;
pub mod solver;
