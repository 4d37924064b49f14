//! Command implementations for kindling CLI

pub mod bootstrap;
pub mod check;
pub mod completions;
pub mod daemon;
pub mod ensure;
pub mod helpers;
pub mod hook;
pub mod install;
pub mod service;
pub mod uninstall;
pub mod version;
