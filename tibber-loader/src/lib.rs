use crate::{
    client::{connect, post_graphql},
    config::Config,
    errors::TibberLoaderError,
    gql::queries::{self, PriceForecast, PriceInfo, SubscriptionPriceInfo, ViewerData},
};
use log::{debug, warn};
use reqwest::Client;

pub mod client;
pub mod config;
pub mod consts;
pub mod errors;
pub mod gql;

#[derive(Debug, Clone)]
pub struct Session {
    url: String,
    client: Client,
}

impl Session {
    /// Prepares an authenticated client. Nothing is sent until a price query runs.
    pub fn new(config: Config) -> Result<Self, TibberLoaderError> {
        let client = connect(&config)?;
        Ok(Session {
            url: config.url,
            client,
        })
    }

    /// Today's and tomorrow's prices, fetched with a single request
    pub async fn get_prices(&self) -> Result<PriceForecast, TibberLoaderError> {
        let data = post_graphql::<queries::Prices, _>(
            &self.client,
            self.url.as_str(),
            queries::prices::Variables {},
        )
        .await?;

        let forecast = PriceForecast::new(&price_info(data)?)?;
        debug!(
            "Received {} prices for today and {} for tomorrow",
            forecast.today.len(),
            forecast.tomorrow.len()
        );
        Ok(forecast)
    }

    /// Today's and tomorrow's prices together with the running hour's price,
    /// fetched with a single request
    pub async fn get_current_prices(
        &self,
    ) -> Result<(PriceForecast, PriceInfo), TibberLoaderError> {
        let data = post_graphql::<queries::CurrentPrices, _>(
            &self.client,
            self.url.as_str(),
            queries::current_prices::Variables {},
        )
        .await?;

        current_prices(price_info(data)?)
    }
}

fn price_info(data: ViewerData) -> Result<SubscriptionPriceInfo, TibberLoaderError> {
    let mut homes = data.viewer.homes.into_iter().flatten();
    let home = homes.next().ok_or(TibberLoaderError::NoHome)?;
    if homes.next().is_some() {
        warn!("Account has more than one home, using the first one");
    }

    home.current_subscription
        .ok_or(TibberLoaderError::NoSubscription)?
        .price_info
        .ok_or(TibberLoaderError::NoPriceInfo)
}

fn current_prices(
    info: SubscriptionPriceInfo,
) -> Result<(PriceForecast, PriceInfo), TibberLoaderError> {
    let forecast = PriceForecast::new(&info)?;
    let current = PriceInfo::new(info.current.ok_or(TibberLoaderError::NoCurrentPrice)?)?;
    debug!(
        "Received {} prices, current price {} starting at {}",
        forecast.len(),
        current.total,
        current.starts_at
    );
    Ok((forecast, current))
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    fn viewer(homes: serde_json::Value) -> ViewerData {
        serde_json::from_value(json!({ "viewer": { "homes": homes } })).unwrap()
    }

    #[test]
    fn test_current_prices() {
        let data = viewer(json!([{
            "currentSubscription": {
                "priceInfo": {
                    "current": {
                        "total": 0.2953,
                        "energy": 0.1001,
                        "tax": 0.1952,
                        "startsAt": "2024-01-01T14:00:00.000+01:00"
                    },
                    "today": [
                        { "total": 0.30, "startsAt": "2024-01-01T00:00:00.000+01:00" },
                        { "total": 0.31, "startsAt": "2024-01-01T01:00:00.000+01:00" }
                    ],
                    "tomorrow": [
                        { "total": 0.25, "startsAt": "2024-01-02T00:00:00.000+01:00" }
                    ]
                }
            }
        }]));

        let (forecast, current) = current_prices(price_info(data).unwrap()).unwrap();

        assert_eq!(forecast.today.len(), 2);
        assert_eq!(forecast.tomorrow.len(), 1);
        assert_eq!(forecast.tomorrow[0].total, 0.25);
        assert_eq!(current.total, 0.2953);
    }

    #[test]
    fn test_missing_current_price() {
        let data = viewer(json!([{
            "currentSubscription": {
                "priceInfo": { "current": null, "today": [], "tomorrow": [] }
            }
        }]));

        assert!(matches!(
            current_prices(price_info(data).unwrap()),
            Err(TibberLoaderError::NoCurrentPrice)
        ));
    }

    #[test]
    fn test_missing_nesting() {
        assert!(matches!(
            price_info(viewer(json!([]))),
            Err(TibberLoaderError::NoHome)
        ));
        assert!(matches!(
            price_info(viewer(json!([null]))),
            Err(TibberLoaderError::NoHome)
        ));
        assert!(matches!(
            price_info(viewer(json!([{ "currentSubscription": null }]))),
            Err(TibberLoaderError::NoSubscription)
        ));
        assert!(matches!(
            price_info(viewer(json!([{ "currentSubscription": { "priceInfo": null } }]))),
            Err(TibberLoaderError::NoPriceInfo)
        ));
    }

    #[test]
    fn test_first_home_is_used() {
        let data = viewer(json!([
            { "currentSubscription": { "priceInfo": {
                "today": [{ "total": 0.1, "startsAt": "2024-01-01T00:00:00+01:00" }]
            } } },
            { "currentSubscription": null }
        ]));

        let forecast = PriceForecast::new(&price_info(data).unwrap()).unwrap();

        assert_eq!(forecast.today[0].total, 0.1);
    }

    #[test]
    fn test_session_does_not_need_network() {
        let config = Config {
            token: "test-token".to_string(),
            url: config::TIBBER_API_URL.to_string(),
        };

        assert!(Session::new(config).is_ok());
    }
}
