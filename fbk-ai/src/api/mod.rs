//! HTTP API handlers for fbk-ai

pub mod feedback;
pub mod health;
pub mod ui;

pub use feedback::feedback_routes;
pub use health::health_routes;
pub use ui::ui_routes;
