pub mod app;
pub mod helpers;
pub mod library_view;
pub mod settings;

pub use app::LauncherApp;
