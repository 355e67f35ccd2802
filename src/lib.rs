pub mod command;
pub mod common;
pub mod layout_engine;
pub mod model;
pub mod sys;
