pub mod app;
pub mod client;
pub mod config;
pub mod generate;
pub mod goal;
pub mod mapping;
pub mod prompt;
pub mod recipe;
pub mod store;
pub mod upstream;

pub use config::Config;
pub use goal::FoodGoal;
pub use recipe::Recipe;
