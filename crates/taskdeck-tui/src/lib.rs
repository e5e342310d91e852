pub mod app;
pub mod components;
pub mod config;
pub mod dispatch;
pub mod loadable;
