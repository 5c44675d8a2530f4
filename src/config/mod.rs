pub mod settings;

pub use settings::{Settings, SettingsDelta, SettingsObserver, SettingsPatch, SettingsStore};
