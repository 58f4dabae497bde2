use reqwest::header::InvalidHeaderValue;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TibberLoaderError {
    #[error("Missing Tibber API token. Please set the TIBBER_API_KEY environmental variable")]
    TokenMissing,

    #[error("Tibber API token is not valid")]
    Unauthorized,

    #[error("Invalid http header value")]
    InvalidHeader(#[from] InvalidHeaderValue),

    #[error("Failed to get data from GraphQL response")]
    MissingResponseData,

    #[error("No home is registered for this account")]
    NoHome,

    #[error("{0}")]
    GraphQLError(String),

    #[error("Failed to fetch: {0}")]
    FetchError(#[from] reqwest::Error),

    #[error("No subscription")]
    NoSubscription,

    #[error("No price info")]
    NoPriceInfo,

    #[error("No current price")]
    NoCurrentPrice,

    #[error("Price list contains an empty record")]
    MissingPriceRecord,

    #[error("Price record without total")]
    MissingTotal,

    #[error("Invalid price start time: {0}")]
    InvalidStartsAt(String),
}
