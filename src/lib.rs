pub mod agent;
pub mod app;
pub mod bus;
pub mod domain;
pub mod infrastructure;
pub mod orchestrator;
pub mod palette;
pub mod protocol;
pub mod theme;
