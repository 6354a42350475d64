//! Settings front ends: the presenter plus its HTTP and console surfaces.

pub mod console;
pub mod presenter;
pub mod routes;
pub mod status;
pub mod view;

pub use presenter::SettingsPresenter;
pub use routes::settings_routes;
pub use view::ProfileView;
