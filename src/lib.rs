//! Read-oriented analytics backend for an XRPL liquidity-mining program.
//!
//! Serves JSON REST endpoints over a MongoDB instance populated by an
//! external ingestion process: dashboard stats, per-miner order and
//! transfer history, and a generic database inspection/query tool.

pub mod config;
pub mod error;
pub mod models;

pub mod controllers;
pub mod routes;
pub mod services;

#[derive(Clone)]
pub struct AppState {
    pub db: services::db::Mongo,
    pub settings: config::Settings,
}
