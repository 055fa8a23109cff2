//! REST client for the venue endpoints used by the transaction pipeline.
//!
//! [`VenueApi`] is the seam the pipeline is written against; [`VenueHttpClient`]
//! is the reqwest-backed implementation. Every request carries the static
//! `X-API-KEY` header taken from [`ApiConfig`].
//!
//! ```no_run
//! use deltadefi_sdk::config::{ApiConfig, ApiNetwork};
//! use deltadefi_sdk::venue_module::venue_api::VenueHttpClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ApiConfig::new(ApiNetwork::Staging, "my-api-key");
//! let client = VenueHttpClient::new(&config)?;
//! for balance in client.get_account_balance().await? {
//!     println!("{}: free {} locked {}", balance.asset, balance.free, balance.locked);
//! }
//! # Ok(())
//! # }
//! ```

use std::future::Future;

use log::debug;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::error::VenueApiError;
use super::venue_types::{
    AssetBalance, BuildCancelAllOrdersResponse, BuildPlaceOrderResponse, BuildTransferalRequest,
    BuildWithdrawalRequest, ErrorResponse, GetOperationKeyResponse, OrderRecordResponse,
    PlaceOrderRequest, SignedTxRequest, SubmitCancelAllOrdersRequest,
    SubmitCancelAllOrdersResponse, SubmitPlaceOrderRequest, SubmitPlaceOrderResponse,
    TxHashResponse, TxHexResponse,
};
use crate::config::ApiConfig;

pub type Result<T> = std::result::Result<T, VenueApiError>;

const API_KEY_HEADER: &str = "x-api-key";

/// Remote build/submit endpoints, one method per call.
///
/// Build methods return unsigned payloads; submit methods take signed ones.
/// Implementations must not retry internally.
pub trait VenueApi: Send + Sync {
    fn get_operation_key(&self) -> impl Future<Output = Result<GetOperationKeyResponse>> + Send;

    fn build_place_order(
        &self,
        request: &PlaceOrderRequest,
    ) -> impl Future<Output = Result<BuildPlaceOrderResponse>> + Send;

    fn submit_place_order(
        &self,
        request: &SubmitPlaceOrderRequest,
    ) -> impl Future<Output = Result<SubmitPlaceOrderResponse>> + Send;

    fn build_cancel_order(
        &self,
        order_id: &str,
    ) -> impl Future<Output = Result<TxHexResponse>> + Send;

    fn submit_cancel_order(
        &self,
        request: &SignedTxRequest,
    ) -> impl Future<Output = Result<TxHashResponse>> + Send;

    fn build_cancel_all_orders(
        &self,
    ) -> impl Future<Output = Result<BuildCancelAllOrdersResponse>> + Send;

    fn submit_cancel_all_orders(
        &self,
        request: &SubmitCancelAllOrdersRequest,
    ) -> impl Future<Output = Result<SubmitCancelAllOrdersResponse>> + Send;

    fn build_withdrawal(
        &self,
        request: &BuildWithdrawalRequest,
    ) -> impl Future<Output = Result<TxHexResponse>> + Send;

    fn submit_withdrawal(
        &self,
        request: &SignedTxRequest,
    ) -> impl Future<Output = Result<TxHashResponse>> + Send;

    fn build_transferal(
        &self,
        request: &BuildTransferalRequest,
    ) -> impl Future<Output = Result<TxHexResponse>> + Send;

    fn submit_transferal(
        &self,
        request: &SignedTxRequest,
    ) -> impl Future<Output = Result<TxHashResponse>> + Send;
}

#[derive(Debug, Clone)]
pub struct VenueHttpClient {
    client: reqwest::Client,
    base_url: String,
}

impl VenueHttpClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut api_key = HeaderValue::from_str(&config.api_key)
            .map_err(|e| VenueApiError::Config(format!("invalid api key header: {}", e)))?;
        api_key.set_sensitive(true);
        headers.insert(HeaderName::from_static(API_KEY_HEADER), api_key);

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .default_headers(headers)
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn request<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("{} {}", method, url);
        let mut builder = self.client.request(method, &url);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let response = builder.send().await?;
        Self::parse_response(response).await
    }

    async fn parse_response<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            let message = match serde_json::from_str::<ErrorResponse>(&text) {
                Ok(err) => err.message,
                Err(_) if text.is_empty() => "No response body".to_string(),
                Err(_) => text,
            };
            return Err(VenueApiError::Status {
                status: status.as_u16(),
                message,
            });
        }
        serde_json::from_str(&text).map_err(|e| VenueApiError::Decode(e.to_string()))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request::<(), T>(Method::GET, path, None).await
    }

    /// Free and locked amounts per asset.
    pub async fn get_account_balance(&self) -> Result<Vec<AssetBalance>> {
        self.get("/accounts/balance").await
    }

    /// Current state of one order; the recovery query after a failed submit.
    pub async fn get_order_record(&self, order_id: &str) -> Result<OrderRecordResponse> {
        self.get(&format!("/accounts/order/{}", order_id)).await
    }
}

impl VenueApi for VenueHttpClient {
    async fn get_operation_key(&self) -> Result<GetOperationKeyResponse> {
        self.get("/accounts/operation-key").await
    }

    async fn build_place_order(
        &self,
        request: &PlaceOrderRequest,
    ) -> Result<BuildPlaceOrderResponse> {
        self.request(Method::POST, "/order/build", Some(request))
            .await
    }

    async fn submit_place_order(
        &self,
        request: &SubmitPlaceOrderRequest,
    ) -> Result<SubmitPlaceOrderResponse> {
        self.request(Method::POST, "/order/submit", Some(request))
            .await
    }

    async fn build_cancel_order(&self, order_id: &str) -> Result<TxHexResponse> {
        self.request::<(), _>(Method::DELETE, &format!("/order/{}/build", order_id), None)
            .await
    }

    async fn submit_cancel_order(&self, request: &SignedTxRequest) -> Result<TxHashResponse> {
        self.request(Method::DELETE, "/order/submit", Some(request))
            .await
    }

    async fn build_cancel_all_orders(&self) -> Result<BuildCancelAllOrdersResponse> {
        self.request::<(), _>(Method::DELETE, "/order/cancel-all/build", None)
            .await
    }

    async fn submit_cancel_all_orders(
        &self,
        request: &SubmitCancelAllOrdersRequest,
    ) -> Result<SubmitCancelAllOrdersResponse> {
        self.request(Method::DELETE, "/order/cancel-all/submit", Some(request))
            .await
    }

    async fn build_withdrawal(&self, request: &BuildWithdrawalRequest) -> Result<TxHexResponse> {
        self.request(Method::POST, "/accounts/withdrawal/build", Some(request))
            .await
    }

    async fn submit_withdrawal(&self, request: &SignedTxRequest) -> Result<TxHashResponse> {
        self.request(Method::POST, "/accounts/withdrawal/submit", Some(request))
            .await
    }

    async fn build_transferal(&self, request: &BuildTransferalRequest) -> Result<TxHexResponse> {
        self.request(Method::POST, "/accounts/transferal/build", Some(request))
            .await
    }

    async fn submit_transferal(&self, request: &SignedTxRequest) -> Result<TxHashResponse> {
        self.request(Method::POST, "/accounts/transferal/submit", Some(request))
            .await
    }
}
