use thiserror::Error;

/// Fatal problems with the stored template. No plan is produced.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("template is malformed: {0}")]
    MalformedTemplate(#[from] serde_json::Error),

    #[error("template title must not be blank")]
    BlankTitle,

    #[error("template module dictionary is empty")]
    NoModules,

    #[error("module stored under key {key:?} declares id {id:?}")]
    ModuleIdMismatch { key: String, id: String },
}
