use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApifyError>;

/// Failures talking to the Apify platform while running the tweet actors.
#[derive(Debug, Error)]
pub enum ApifyError {
    /// The request never got an HTTP answer: DNS, TLS, connection reset.
    #[error("could not reach Apify: {0}")]
    Network(String),

    /// Apify answered with a non-2xx status. A 401 means a bad `APIFY_TOKEN`;
    /// a 402 means the account ran out of credit for the scraper actors.
    #[error("Apify rejected the request (status {status}): {message}")]
    Api { status: u16, message: String },

    /// A run, dataset or account payload did not have the expected shape.
    #[error("unexpected Apify response: {0}")]
    Decode(String),

    /// The tweet actor run ended in FAILED, ABORTED or TIMED-OUT. Its dataset
    /// is not fetched.
    #[error("actor run {run_id} ended with status {status}")]
    RunFailed { run_id: String, status: String },
}

impl From<reqwest::Error> for ApifyError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApifyError::Decode(err.to_string())
        } else {
            ApifyError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApifyError {
    fn from(err: serde_json::Error) -> Self {
        ApifyError::Decode(err.to_string())
    }
}
