pub mod settings;

pub use settings::{Settings, SettingsError, PRIVATE_KEY_VAR};
