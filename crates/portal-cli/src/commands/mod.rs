pub mod admin;
pub mod app;
pub mod apply;
pub mod backend;
pub mod code;
pub mod config;
pub mod dispatch;
pub mod proof;
pub mod serve;
pub mod shared;
