pub mod db;
pub mod filters;
pub mod pagination;
pub mod query;
pub mod refresh;
pub mod shape;
pub mod stats;
