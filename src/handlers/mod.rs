//! HTTP 处理器模块

pub mod activity;
pub mod asset;
pub mod assignment;
pub mod auth;
pub mod dashboard;
pub mod expenditure;
pub mod health;
pub mod purchase;
pub mod transfer;
pub mod user;
