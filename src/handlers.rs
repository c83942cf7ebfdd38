pub mod auth;
pub mod board;
pub mod dashboard;
pub mod leads;
