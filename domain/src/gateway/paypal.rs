use crate::error::{DomainErrorKind, Error, ExternalErrorKind};
use crate::Id;
use log::*;
use serde::{Deserialize, Serialize};
use service::config::Config;

/// Currencies PayPal only accepts as whole units.
const ZERO_DECIMAL_CURRENCIES: [&str; 3] = ["HUF", "JPY", "TWD"];

/// PayPal Orders v2 client authenticating with OAuth2 client credentials.
pub struct PayPalClient {
    client: reqwest::Client,
    base_url: String,
    client_id: String,
    client_secret: String,
    return_url: Option<String>,
    cancel_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    access_token: String,
}

#[derive(Debug, Serialize)]
struct CreateOrderRequest {
    intent: &'static str,
    purchase_units: Vec<PurchaseUnit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    application_context: Option<ApplicationContext>,
}

#[derive(Debug, Serialize)]
struct PurchaseUnit {
    reference_id: String,
    amount: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
    pub currency_code: String,
    pub value: String,
}

#[derive(Debug, Serialize)]
struct ApplicationContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    return_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cancel_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Link {
    pub href: String,
    pub rel: String,
}

/// Order as returned by the create and capture endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct Order {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl Order {
    /// URL the payer is sent to in order to approve the payment.
    pub fn approval_url(&self) -> Option<&str> {
        self.links
            .iter()
            .find(|link| link.rel == "approve" || link.rel == "payer-action")
            .map(|link| link.href.as_str())
    }

    pub fn is_completed(&self) -> bool {
        self.status == "COMPLETED"
    }
}

impl PayPalClient {
    pub fn new(config: &Config) -> Result<Self, Error> {
        let (Some(client_id), Some(client_secret)) =
            (config.paypal_client_id(), config.paypal_client_secret())
        else {
            warn!("PayPal client credentials are not configured");
            return Err(Error::config());
        };

        let client = reqwest::Client::builder().use_rustls_tls().build()?;

        Ok(Self {
            client,
            base_url: config.paypal_base_url().trim_end_matches('/').to_string(),
            client_id,
            client_secret,
            return_url: config.paypal_return_url(),
            cancel_url: config.paypal_cancel_url(),
        })
    }

    /// Creates a `CAPTURE` order for `amount_cents` in `currency`, referencing the session.
    pub async fn create_order(
        &self,
        session_id: Id,
        amount_cents: i64,
        currency: &str,
    ) -> Result<Order, Error> {
        let access_token = self.access_token().await?;
        let request = CreateOrderRequest {
            intent: "CAPTURE",
            purchase_units: vec![PurchaseUnit {
                reference_id: session_id.to_string(),
                amount: Amount {
                    currency_code: currency.to_uppercase(),
                    value: format_amount(amount_cents, currency),
                },
            }],
            application_context: (self.return_url.is_some() || self.cancel_url.is_some()).then(
                || ApplicationContext {
                    return_url: self.return_url.clone(),
                    cancel_url: self.cancel_url.clone(),
                },
            ),
        };

        info!("Creating PayPal order for session {session_id}");
        let response = self
            .client
            .post(format!("{}/v2/checkout/orders", self.base_url))
            .bearer_auth(&access_token)
            .json(&request)
            .send()
            .await?;

        let order: Order = parse(response, "create order").await?;
        debug!("PayPal order {} created with status {}", order.id, order.status);
        Ok(order)
    }

    pub async fn capture_order(&self, order_id: &str) -> Result<Order, Error> {
        let access_token = self.access_token().await?;

        info!("Capturing PayPal order {order_id}");
        let response = self
            .client
            .post(format!(
                "{}/v2/checkout/orders/{order_id}/capture",
                self.base_url
            ))
            .bearer_auth(&access_token)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body("{}")
            .send()
            .await?;

        let order: Order = parse(response, "capture order").await?;
        info!("PayPal order {} captured with status {}", order.id, order.status);
        Ok(order)
    }

    async fn access_token(&self) -> Result<String, Error> {
        let response = self
            .client
            .post(format!("{}/v1/oauth2/token", self.base_url))
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let token: AccessTokenResponse = parse(response, "obtain access token").await?;
        Ok(token.access_token)
    }
}

async fn parse<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
    action: &str,
) -> Result<T, Error> {
    let status = response.status();
    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_default();
        warn!("PayPal failed to {action}: {status} - {error_text}");
        return Err(Error {
            source: None,
            error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
        });
    }

    response.json::<T>().await.map_err(|err| {
        warn!("Unexpected PayPal response to {action}: {err:?}");
        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::External(ExternalErrorKind::Other(
                "Unexpected PayPal response".to_string(),
            )),
        }
    })
}

/// Formats minor units the way PayPal expects them, e.g. `12050` USD as `"120.50"`.
pub fn format_amount(amount_cents: i64, currency: &str) -> String {
    let currency = currency.to_uppercase();
    if ZERO_DECIMAL_CURRENCIES.contains(&currency.as_str()) {
        return (amount_cents / 100).to_string();
    }
    format!("{}.{:02}", amount_cents / 100, amount_cents % 100)
}
