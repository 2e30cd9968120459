pub mod audit;
pub mod clear;
pub mod config;
pub mod plan;
pub mod render;
pub mod session;
pub mod update;
