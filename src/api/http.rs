//! reqwest-backed implementation of the API seams.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde_json::{json, Value};
use url::Url;

use super::envelope::{unwrap_entity, unwrap_page};
use super::{OrderApi, ResourceApi};
use crate::config::ClientConfig;
use crate::entities::{
    ListQuery, NewOrder, Order, OrderList, OrderQuery, OrderStatus, Page, PaymentStatus,
    RefundRequest, Resource,
};
use crate::errors::{ClientError, ClientResult};

pub const TENANT_HEADER: &str = "X-Tenant-ID";

#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base_url: Url,
    token: Option<String>,
    tenant_id: Option<String>,
}

impl HttpApi {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Self::with_client(client, config)
    }

    /// Reuses an existing reqwest client; its own timeout applies.
    pub fn with_client(client: Client, config: &ClientConfig) -> ClientResult<Self> {
        let mut raw = config.base_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let base_url = Url::parse(&raw)
            .map_err(|e| ClientError::Config(format!("invalid base url {raw:?}: {e}")))?;
        Ok(Self {
            client,
            base_url,
            token: config.token.clone(),
            tenant_id: config.tenant_id.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends `segments` under the base path, percent-encoding each one so
    /// an id can never address a different resource.
    fn url(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                ClientError::Config(format!("base url {} cannot carry a path", self.base_url))
            })?;
            path.pop_if_empty();
            for segment in segments {
                if matches!(*segment, "" | "." | "..") {
                    return Err(ClientError::InvalidRequest(format!(
                        "path segment {segment:?} is not a valid id"
                    )));
                }
                path.push(segment);
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, path: &[&str]) -> ClientResult<RequestBuilder> {
        let mut request = self.client.request(method, self.url(path)?);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(tenant) = &self.tenant_id {
            request = request.header(TENANT_HEADER, tenant);
        }
        Ok(request)
    }

    async fn send(&self, request: RequestBuilder) -> ClientResult<Value> {
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = error_message(status, &text);
            tracing::debug!(status = status.as_u16(), %message, "api call failed");
            return Err(ClientError::Status {
                status: status.as_u16(),
                message,
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }

    async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &[&str],
        body: &B,
    ) -> ClientResult<Value> {
        self.send(self.request(method, path)?.json(body)).await
    }

    async fn get_value(&self, path: &[&str], query: &[(String, String)]) -> ClientResult<Value> {
        self.send(self.request(Method::GET, path)?.query(query)).await
    }
}

/// Prefers the server's `message`/`error` field over the raw body.
fn error_message(status: StatusCode, body: &str) -> String {
    let from_json = serde_json::from_str::<Value>(body).ok().and_then(|v| {
        v.get("message")
            .or_else(|| v.get("error"))
            .and_then(Value::as_str)
            .map(str::to_string)
    });
    match from_json {
        Some(message) if !message.is_empty() => message,
        _ if !body.trim().is_empty() => body.trim().to_string(),
        _ => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
    }
}

#[async_trait]
impl OrderApi for HttpApi {
    async fn list_orders(&self, query: &OrderQuery) -> ClientResult<OrderList> {
        let body = self.get_value(&["orders"], &query.to_pairs()).await?;
        unwrap_page(body, query.skip, query.limit, "order list")
    }

    async fn get_order(&self, order_id: &str) -> ClientResult<Order> {
        let body = self.get_value(&["orders", order_id], &[]).await?;
        unwrap_entity(body, "order fetch")
    }

    async fn create_order(&self, new: &NewOrder) -> ClientResult<Order> {
        let body = self.send_json(Method::POST, &["orders"], new).await?;
        unwrap_entity(body, "order create")
    }

    async fn delete_order(&self, order_id: &str) -> ClientResult<()> {
        self.send(self.request(Method::DELETE, &["orders", order_id])?)
            .await?;
        Ok(())
    }

    async fn update_order_status(
        &self,
        order_id: &str,
        status: OrderStatus,
    ) -> ClientResult<Order> {
        let body = self
            .send_json(
                Method::PUT,
                &["orders", order_id, "status"],
                &json!({ "status": status }),
            )
            .await?;
        unwrap_entity(body, "status update")
    }

    async fn assign_delivery_partner(
        &self,
        order_id: &str,
        partner_id: &str,
    ) -> ClientResult<Order> {
        let body = self
            .send_json(
                Method::PUT,
                &["orders", order_id, "assign"],
                &json!({ "delivery_partner_id": partner_id }),
            )
            .await?;
        unwrap_entity(body, "delivery partner assignment")
    }

    async fn update_payment_status(
        &self,
        order_id: &str,
        status: PaymentStatus,
    ) -> ClientResult<Order> {
        let body = self
            .send_json(
                Method::PUT,
                &["orders", order_id, "payment-status"],
                &json!({ "payment_status": status }),
            )
            .await?;
        unwrap_entity(body, "payment status update")
    }

    async fn refund_order(&self, order_id: &str, refund: &RefundRequest) -> ClientResult<Order> {
        let body = self
            .send_json(Method::POST, &["orders", order_id, "refund"], refund)
            .await?;
        unwrap_entity(body, "refund")
    }
}

#[async_trait]
impl<R: Resource> ResourceApi<R> for HttpApi {
    async fn list(&self, query: &ListQuery) -> ClientResult<Page<R>> {
        let body = self.get_value(&[R::COLLECTION], &query.to_pairs()).await?;
        unwrap_page(body, query.skip, query.limit, R::COLLECTION)
    }

    async fn get(&self, id: &str) -> ClientResult<R> {
        let body = self.get_value(&[R::COLLECTION, id], &[]).await?;
        unwrap_entity(body, R::COLLECTION)
    }

    async fn create(&self, draft: &R::Draft) -> ClientResult<R> {
        let body = self.send_json(Method::POST, &[R::COLLECTION], draft).await?;
        unwrap_entity(body, R::COLLECTION)
    }

    async fn update(&self, id: &str, draft: &R::Draft) -> ClientResult<R> {
        let body = self
            .send_json(Method::PUT, &[R::COLLECTION, id], draft)
            .await?;
        unwrap_entity(body, R::COLLECTION)
    }

    async fn delete(&self, id: &str) -> ClientResult<()> {
        self.send(self.request(Method::DELETE, &[R::COLLECTION, id])?)
            .await?;
        Ok(())
    }
}
