pub mod browser;
pub mod chord;
pub mod models;
pub mod settings;
pub mod site;
