#[derive(Debug, thiserror::Error)]
pub enum SettingError {
    #[error("You must provide an address of the roller device")]
    MissingAddress,

    #[error("Failed to load settings: {0}")]
    Load(#[from] config::ConfigError),
}
