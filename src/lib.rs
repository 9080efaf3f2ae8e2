pub mod appsettings;
pub mod clock;
pub mod engine;
pub mod form;
pub mod phase;
pub mod settings;
pub mod storage;
pub mod view;
