//! 数据模型模块

pub mod activity;
pub mod asset;
pub mod assignment;
pub mod auth;
pub mod dashboard;
pub mod expenditure;
pub mod filter;
pub mod purchase;
pub mod session;
pub mod transfer;
pub mod user;
