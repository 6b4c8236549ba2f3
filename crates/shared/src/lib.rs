//! 共享库
//!
//! 规则引擎及其调用方共用的配置、数据库连接与日志初始化代码。

pub mod config;
pub mod database;
pub mod observability;
