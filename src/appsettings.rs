use config::{Config, ConfigError, Environment, File};
use meditrack_models::settings::Settings;

/// Reads `appsettings.toml`, then `appsettings.local.toml`, then `APP__*` environment
/// variables. Every file is optional and every key has a default.
pub fn load() -> Result<Settings, ConfigError> {
    let settings = Config::builder()
        .add_source(File::with_name("appsettings").required(false))
        .add_source(File::with_name("appsettings.local").required(false))
        .add_source(
            Environment::with_prefix("APP")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize()
}
