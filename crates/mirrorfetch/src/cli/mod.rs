pub mod app;
pub mod names;

pub use app::App;
