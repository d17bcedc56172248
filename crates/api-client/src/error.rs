use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// The API could not be reached, or the connection failed mid-request.
    #[error("The API is unreachable: {0}")]
    Unreachable(#[from] reqwest::Error),

    /// The API answered with a non-success status. `message` is the `error`
    /// field of its JSON body when present.
    #[error("The API rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Failed to deserialize the API response: {0}")]
    Deserialization(String),

    #[error("Invalid client configuration: {0}")]
    Configuration(String),
}
