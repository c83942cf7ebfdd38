pub mod board;
pub mod common;
pub mod config;
pub mod db;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod notify;
pub mod routes;
pub mod services;
