use thiserror::Error;

/// Failure classes of one portfolio lookup, each shown to the user differently.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PortfolioError {
    #[error("COVALENT_API_KEY is not configured")]
    CredentialMissing,
    #[error("Upstream request failed: {0}")]
    NetworkOrAuth(String),
    #[error("Malformed upstream response: {0}")]
    MalformedResponse(String),
    #[error("Invalid wallet address: {0}")]
    InvalidAddress(String),
    #[error("No holdings with a positive USD value")]
    EmptyPortfolio,
}
