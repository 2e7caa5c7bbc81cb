use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Fmt(#[from] std::fmt::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
    #[error(transparent)]
    TomlD(#[from] toml::de::Error),
    #[error(transparent)]
    TomlS(#[from] toml::ser::Error),
    #[error(transparent)]
    Url(#[from] url::ParseError),

    /// An unknown url scheme was provided, the scheme should be
    /// the associated value
    #[error("Unknown url scheme `{0}`")]
    UnknownScheme(String),
    #[error("Invalid file URL: `{0}`")]
    InvalidFileUrl(Url),
    /// The data root cannot have path segments appended (e.g. `mailto:`)
    #[error("Data root cannot be a base: `{0}`")]
    CannotBeBase(Url),
    #[error("Unknown key: `{0}`")]
    UnknownKey(String),
    #[error("Invalid arguments, {0}")]
    InvalidArgument(String),
    #[error("Previously setup, use --force (-f) to overwrite exiting config")]
    PreviouslySetup,
}
