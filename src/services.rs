pub mod auth;
pub mod board_service;
pub mod clock;
pub mod dashboard_service;
pub mod lead_service;
pub mod period_filter;
