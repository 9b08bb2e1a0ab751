#![deny(warnings)]

pub mod config;
pub mod prompt;
pub mod session;
pub mod translate;
pub mod view;
