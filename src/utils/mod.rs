pub mod models;
pub mod time_window;
pub mod tracing;
