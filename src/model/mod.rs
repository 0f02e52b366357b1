pub mod config;
pub mod option;
pub mod stage;
