pub mod calendar;
pub mod config;
pub mod cookie;
pub mod db;
pub mod error;
pub mod handlers;
pub mod media;
pub mod middleware;
pub mod migrations;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod state;
pub mod version;
pub mod views;
