use amphora_api::ApiError;
use amphora_uri::UriError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Uri(#[from] UriError),

    #[error("No page loaded")]
    NoPage,

    #[error("No form open")]
    NoForm,

    #[error("Unknown component: {0}")]
    UnknownComponent(String),
}
