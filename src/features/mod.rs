/// 动画资源模块
pub mod anime;

/// 认证与用户目录模块
pub mod auth;
