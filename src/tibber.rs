use crate::model::{DailyPrices, PricePoint};
use crate::Error;
use chrono::{DateTime, FixedOffset};
use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

/// GraphQL query for today's and tomorrow's prices of every home on the account.
pub const PRICE_QUERY: &str =
    "query{viewer{homes{currentSubscription{priceInfo{today{total startsAt}tomorrow{total startsAt}}}}}}";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TibberPriceItem {
    total: f64,
    starts_at: DateTime<FixedOffset>,
}

impl From<TibberPriceItem> for PricePoint {
    fn from(item: TibberPriceItem) -> Self {
        Self {
            starts_at: item.starts_at,
            total: item.total,
        }
    }
}

#[derive(Deserialize)]
struct PriceInfo {
    #[serde(default)]
    today: Vec<TibberPriceItem>,
    #[serde(default)]
    tomorrow: Option<Vec<TibberPriceItem>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Subscription {
    price_info: Option<PriceInfo>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Home {
    current_subscription: Option<Subscription>,
}

#[derive(Deserialize)]
struct Viewer {
    homes: Vec<Home>,
}

#[derive(Deserialize)]
struct ResponseData {
    viewer: Viewer,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Deserialize)]
struct TibberResponse {
    data: Option<ResponseData>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

impl TryFrom<TibberResponse> for DailyPrices {
    type Error = Error;

    fn try_from(response: TibberResponse) -> Result<Self, Self::Error> {
        if !response.errors.is_empty() {
            return Err(Error::GraphQl(
                response
                    .errors
                    .into_iter()
                    .map(|error| error.message)
                    .collect::<Vec<_>>()
                    .join("; "),
            ));
        }

        let home = response
            .data
            .ok_or_else(|| Error::UnsupportedResponse("response carries no data".to_owned()))?
            .viewer
            .homes
            .into_iter()
            .next()
            .ok_or_else(|| Error::UnsupportedResponse("account has no homes".to_owned()))?;

        let price_info = home
            .current_subscription
            .ok_or_else(|| Error::UnsupportedResponse("home has no subscription".to_owned()))?
            .price_info
            .ok_or_else(|| Error::UnsupportedResponse("subscription has no price info".to_owned()))?;

        if price_info.today.is_empty() {
            return Err(Error::UnsupportedResponse(
                "no prices for today".to_owned(),
            ));
        }

        // Tibber answers with an empty list until tomorrow's prices are published
        let tomorrow = price_info
            .tomorrow
            .filter(|items| !items.is_empty())
            .map(|items| items.into_iter().map(PricePoint::from).collect());

        Ok(Self {
            today: price_info.today.into_iter().map(PricePoint::from).collect(),
            tomorrow,
        })
    }
}

impl DailyPrices {
    /// Decodes a Tibber GraphQL response body.
    pub fn from_json(body: &str) -> Result<Self, Error> {
        serde_json::from_str::<TibberResponse>(body)?.try_into()
    }
}

/// Client for the Tibber GraphQL API.
pub struct TibberClient {
    http_client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl TibberClient {
    const DEFAULT_ENDPOINT: &'static str = "https://api.tibber.com/v1-beta/gql";

    pub fn new(api_key: String) -> Self {
        Self::with_endpoint(api_key, Self::DEFAULT_ENDPOINT.to_owned())
    }

    /// Creates a client talking to a different GraphQL endpoint.
    pub fn with_endpoint(api_key: String, endpoint: String) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            api_key,
            endpoint,
        }
    }

    /// Query today's and, if already published, tomorrow's hourly prices of the
    /// first home on the account.
    pub async fn fetch_prices(&self) -> Result<DailyPrices, Error> {
        debug!(endpoint = %self.endpoint, "querying prices");

        let response = self
            .http_client
            .get(&self.endpoint)
            .query(&[("query", PRICE_QUERY)])
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status != StatusCode::OK {
            return Err(Error::ApiStatus {
                status: status.as_u16(),
                body,
            });
        }

        DailyPrices::from_json(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use mockito::{Matcher, Server};

    fn items(hours: std::ops::Range<u32>, day: u32) -> String {
        hours
            .map(|hour| {
                format!(
                    r#"{{"total":0.{:02},"startsAt":"2024-03-{day:02}T{hour:02}:00:00.000+01:00"}}"#,
                    20 + hour
                )
            })
            .collect::<Vec<_>>()
            .join(",")
    }

    fn body(today: &str, tomorrow: Option<&str>) -> String {
        let tomorrow = tomorrow
            .map(|tomorrow| format!(r#","tomorrow":{tomorrow}"#))
            .unwrap_or_default();
        format!(
            r#"{{"data":{{"viewer":{{"homes":[{{"currentSubscription":{{"priceInfo":{{"today":{today}{tomorrow}}}}}}}]}}}}}}"#
        )
    }

    #[test]
    fn test_decode_both_days() {
        let today = format!("[{}]", items(0..24, 12));
        let tomorrow = format!("[{}]", items(0..24, 13));

        let prices = DailyPrices::from_json(&body(&today, Some(&tomorrow))).unwrap();

        assert_eq!(prices.today.len(), 24);
        assert_eq!(prices.tomorrow.as_ref().map(Vec::len), Some(24));
        assert_eq!(prices.today[3].total, 0.23);
        assert_eq!(
            prices.today[3].starts_at,
            FixedOffset::east_opt(3600)
                .unwrap()
                .with_ymd_and_hms(2024, 3, 12, 3, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn test_tomorrow_missing() {
        let today = format!("[{}]", items(0..24, 12));

        for tomorrow in [None, Some("null"), Some("[]")] {
            let prices = DailyPrices::from_json(&body(&today, tomorrow)).unwrap();
            assert_eq!(prices.tomorrow, None);
            assert_eq!(prices.today.len(), 24);
        }
    }

    #[test]
    fn test_empty_today() {
        let result = DailyPrices::from_json(&body("[]", None));

        assert!(matches!(result, Err(Error::UnsupportedResponse(_))));
    }

    #[test]
    fn test_no_homes() {
        let result = DailyPrices::from_json(r#"{"data":{"viewer":{"homes":[]}}}"#);

        assert!(matches!(result, Err(Error::UnsupportedResponse(_))));
    }

    #[test]
    fn test_home_without_subscription() {
        let result = DailyPrices::from_json(
            r#"{"data":{"viewer":{"homes":[{"currentSubscription":null}]}}}"#,
        );

        assert!(matches!(result, Err(Error::UnsupportedResponse(_))));
    }

    #[test]
    fn test_graphql_errors() {
        let result = DailyPrices::from_json(
            r#"{"errors":[{"message":"invalid token","locations":[]}],"data":null}"#,
        );

        match result {
            Err(Error::GraphQl(message)) => assert_eq!(message, "invalid token"),
            other => panic!("unexpected result {other:?}"),
        }
    }

    async fn mock_endpoint(server: &mut mockito::Server, status: usize, body: &str) -> mockito::Mock {
        server
            .mock("GET", "/v1-beta/gql")
            .match_header("authorization", "Bearer test_token")
            .match_query(Matcher::UrlEncoded("query".to_owned(), PRICE_QUERY.to_owned()))
            .with_status(status)
            .with_body(body)
            .create_async()
            .await
    }

    fn client(server: &mockito::Server) -> TibberClient {
        TibberClient::with_endpoint("test_token".to_owned(), format!("{}/v1-beta/gql", server.url()))
    }

    #[tokio::test]
    async fn test_fetch_prices_success() {
        let mut server = Server::new_async().await;
        let today = format!("[{}]", items(0..24, 12));
        let tomorrow = format!("[{}]", items(0..24, 13));
        let mock = mock_endpoint(&mut server, 200, &body(&today, Some(&tomorrow))).await;

        let prices = client(&server).fetch_prices().await.unwrap();

        assert_eq!(prices.today.len(), 24);
        assert_eq!(prices.tomorrow.as_ref().map(Vec::len), Some(24));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_prices_error_status() {
        let mut server = Server::new_async().await;
        let mock = mock_endpoint(&mut server, 503, "maintenance").await;

        let result = client(&server).fetch_prices().await;

        match result {
            Err(Error::ApiStatus { status, body }) => {
                assert_eq!(status, 503);
                assert_eq!(body, "maintenance");
            }
            other => panic!("unexpected result {other:?}"),
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_prices_without_token_match() {
        let mut server = Server::new_async().await;
        let mock = mock_endpoint(&mut server, 200, "{}").await;
        let client = TibberClient::with_endpoint(
            "other_token".to_owned(),
            format!("{}/v1-beta/gql", server.url()),
        );

        let result = client.fetch_prices().await;

        // mockito answers unmatched requests with 501
        assert!(matches!(result, Err(Error::ApiStatus { status: 501, .. })));
        assert!(!mock.matched_async().await);
    }

    #[test]
    fn test_malformed_json() {
        let result = DailyPrices::from_json("<html>Bad Gateway</html>");

        assert!(matches!(result, Err(Error::Decode(_))));
    }
}
