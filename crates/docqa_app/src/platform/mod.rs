mod app;
mod effects;
pub(crate) mod ui;

pub use app::run_app;
