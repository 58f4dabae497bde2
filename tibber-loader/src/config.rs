use crate::errors::TibberLoaderError;

pub const TIBBER_API_URL: &str = "https://api.tibber.com/v1-beta/gql";
pub const TIBBER_API_KEY_VAR: &str = "TIBBER_API_KEY";

#[derive(Debug, Clone)]
pub struct Config {
    pub token: String,
    pub url: String,
}

impl Config {
    pub fn new(url: &str) -> Result<Self, TibberLoaderError> {
        match std::env::var(TIBBER_API_KEY_VAR) {
            Ok(token) if !token.trim().is_empty() => Ok(Self {
                token,
                url: url.to_string(),
            }),
            _ => Err(TibberLoaderError::TokenMissing),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    // Both cases live in one test since they share the process environment.
    #[test]
    fn test_token_from_environment() {
        std::env::remove_var(TIBBER_API_KEY_VAR);
        assert!(matches!(
            Config::new(TIBBER_API_URL),
            Err(TibberLoaderError::TokenMissing)
        ));

        std::env::set_var(TIBBER_API_KEY_VAR, "  ");
        assert!(matches!(
            Config::new(TIBBER_API_URL),
            Err(TibberLoaderError::TokenMissing)
        ));

        std::env::set_var(TIBBER_API_KEY_VAR, "test-token");
        let config = Config::new(TIBBER_API_URL).unwrap();
        assert_eq!(config.token, "test-token");
        assert_eq!(config.url, TIBBER_API_URL);

        std::env::remove_var(TIBBER_API_KEY_VAR);
    }
}
