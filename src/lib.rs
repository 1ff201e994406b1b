//! Tugasku - Natural-Language Student Task Tracker

pub mod core;
pub mod interpret;
pub mod llm;
pub mod tracker;
