use crate::{config::Config, consts, errors::TibberLoaderError};
use graphql_client::GraphQLQuery;
use graphql_client::Response as GraphQLResponse;
use log::debug;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
};

pub fn connect(config: &Config) -> Result<Client, TibberLoaderError> {
    let mut headers = HeaderMap::new();

    headers.insert(
        reqwest::header::CONTENT_TYPE,
        HeaderValue::from_str("application/json")?,
    );
    let mut authorization = HeaderValue::from_str(format!("Bearer {}", config.token).as_str())?;
    authorization.set_sensitive(true);
    headers.insert(reqwest::header::AUTHORIZATION, authorization);

    let client = Client::builder()
        .user_agent(consts::get_user_agent())
        .default_headers(headers)
        .build()?;
    Ok(client)
}

pub async fn post_graphql<Q: GraphQLQuery, U: reqwest::IntoUrl>(
    client: &reqwest::Client,
    url: U,
    variables: Q::Variables,
) -> Result<Q::ResponseData, TibberLoaderError> {
    let body = Q::build_query(variables);
    debug!("Posting GraphQL operation {}", body.operation_name);
    let res: GraphQLResponse<Q::ResponseData> =
        client.post(url).json(&body).send().await?.json().await?;

    into_data(res)
}

/// Separates a GraphQL envelope into its data or the first reported error.
pub(crate) fn into_data<T>(res: GraphQLResponse<T>) -> Result<T, TibberLoaderError> {
    match (res.errors, res.data) {
        (Some(errors), _) if !errors.is_empty() => {
            if errors[0].message.to_lowercase().contains("not authorized") {
                Err(TibberLoaderError::Unauthorized)
            } else {
                Err(TibberLoaderError::GraphQLError(errors[0].message.clone()))
            }
        }
        (_, Some(data)) => Ok(data),
        _ => Err(TibberLoaderError::MissingResponseData),
    }
}
