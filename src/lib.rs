//! 军用资产管理服务库
//! 库存、调拨/采购/分配/消耗流水、操作日志与仪表盘

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;
pub mod telemetry;
