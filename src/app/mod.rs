pub mod input;
pub mod run;
pub mod state;
pub mod ui;
