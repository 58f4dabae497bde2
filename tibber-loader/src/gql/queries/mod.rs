use crate::errors::TibberLoaderError;
use chrono::{DateTime, FixedOffset};
use graphql_client::{GraphQLQuery, QueryBody};
use serde::{Deserialize, Serialize};

/// Today's and tomorrow's hourly prices of every home
pub struct Prices;

/// Same as [`Prices`], plus the price of the running hour
pub struct CurrentPrices;

pub mod prices {
    use serde::Serialize;

    pub const QUERY: &str = include_str!("strings/prices.graphql");
    pub const OPERATION_NAME: &str = "Prices";

    #[derive(Serialize, Debug, Clone, Default)]
    pub struct Variables {}

    pub type ResponseData = super::ViewerData;
}

pub mod current_prices {
    use serde::Serialize;

    pub const QUERY: &str = include_str!("strings/current_prices.graphql");
    pub const OPERATION_NAME: &str = "CurrentPrices";

    #[derive(Serialize, Debug, Clone, Default)]
    pub struct Variables {}

    pub type ResponseData = super::ViewerData;
}

impl GraphQLQuery for Prices {
    type Variables = prices::Variables;
    type ResponseData = prices::ResponseData;

    fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
        QueryBody {
            variables,
            query: prices::QUERY,
            operation_name: prices::OPERATION_NAME,
        }
    }
}

impl GraphQLQuery for CurrentPrices {
    type Variables = current_prices::Variables;
    type ResponseData = current_prices::ResponseData;

    fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
        QueryBody {
            variables,
            query: current_prices::QUERY,
            operation_name: current_prices::OPERATION_NAME,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ViewerData {
    pub viewer: Viewer,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Viewer {
    pub homes: Vec<Option<Home>>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Home {
    pub current_subscription: Option<Subscription>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub price_info: Option<SubscriptionPriceInfo>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct SubscriptionPriceInfo {
    /// Only requested by [`CurrentPrices`]
    #[serde(default)]
    pub current: Option<Price>,
    #[serde(default)]
    pub today: Option<Vec<Option<Price>>>,
    #[serde(default)]
    pub tomorrow: Option<Vec<Option<Price>>>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Price {
    pub total: Option<f64>,
    #[serde(default)]
    pub energy: Option<f64>,
    #[serde(default)]
    pub tax: Option<f64>,
    pub starts_at: Option<String>,
}

fn parse_starts_at(starts_at: Option<String>) -> Result<DateTime<FixedOffset>, TibberLoaderError> {
    let starts_at = starts_at.ok_or_else(|| TibberLoaderError::InvalidStartsAt("missing".into()))?;
    DateTime::parse_from_rfc3339(&starts_at)
        .map_err(|e| TibberLoaderError::InvalidStartsAt(format!("{starts_at}: {e}")))
}

#[derive(Debug, Clone, PartialEq)]
/// One hourly price bucket as delivered by the API
pub struct PriceRecord {
    /// The total price (incl. tax)
    pub total: f64,
    /// The start time of the price, in the offset the API reported
    pub starts_at: DateTime<FixedOffset>,
}

impl TryFrom<Price> for PriceRecord {
    type Error = TibberLoaderError;

    fn try_from(price: Price) -> Result<Self, Self::Error> {
        Ok(PriceRecord {
            total: price.total.ok_or(TibberLoaderError::MissingTotal)?,
            starts_at: parse_starts_at(price.starts_at)?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
/// Hourly prices of today and, once published (usually around 13:00), tomorrow
pub struct PriceForecast {
    pub today: Vec<PriceRecord>,
    pub tomorrow: Vec<PriceRecord>,
}

impl PriceForecast {
    pub fn new(info: &SubscriptionPriceInfo) -> Result<Self, TibberLoaderError> {
        Ok(PriceForecast {
            today: records(info.today.as_deref())?,
            tomorrow: records(info.tomorrow.as_deref())?,
        })
    }

    pub fn len(&self) -> usize {
        self.today.len() + self.tomorrow.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn records(prices: Option<&[Option<Price>]>) -> Result<Vec<PriceRecord>, TibberLoaderError> {
    // A null entry would shift every later bucket by an hour.
    prices
        .unwrap_or_default()
        .iter()
        .map(|price| {
            price
                .clone()
                .ok_or(TibberLoaderError::MissingPriceRecord)
                .and_then(PriceRecord::try_from)
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
/// Price information related to the subscription for the current hour
pub struct PriceInfo {
    /// The total price (incl. tax)
    pub total: f64,
    /// Nord Pool spot price
    pub energy: f64,
    /// The tax part of the price (guarantee of origin certificate, energy tax (Sweden only) and VAT)
    pub tax: f64,
    /// The start time of the price
    pub starts_at: DateTime<FixedOffset>,
}

impl PriceInfo {
    pub fn new(pinfo: Price) -> Result<Self, TibberLoaderError> {
        let total = pinfo.total.ok_or(TibberLoaderError::MissingTotal)?;
        let (energy, tax) = match (pinfo.energy, pinfo.tax) {
            (Some(energy), Some(tax)) => (energy, tax),
            (Some(energy), None) => (energy, total - energy),
            (None, Some(tax)) => (total - tax, tax),
            _ => (total, 0.0),
        };

        Ok(PriceInfo {
            total,
            energy,
            tax,
            starts_at: parse_starts_at(pinfo.starts_at)?,
        })
    }
}
