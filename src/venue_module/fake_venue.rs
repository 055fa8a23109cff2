//! In-memory venue that records every call, for pipeline tests.

use std::sync::Mutex;

use super::error::VenueApiError;
use super::venue_api::{Result, VenueApi};
use super::venue_types::{
    BuildCancelAllOrdersResponse, BuildPlaceOrderResponse, BuildTransferalRequest,
    BuildWithdrawalRequest, GetOperationKeyResponse, OrderJson, OrderSide, OrderStatus,
    OrderType,
    PlaceOrderRequest, SignedTxRequest, SubmitCancelAllOrdersRequest,
    SubmitCancelAllOrdersResponse, SubmitPlaceOrderRequest, SubmitPlaceOrderResponse,
    TxHashResponse, TxHexResponse,
};
use crate::value::Asset;
use crate::wallet::{PUBLIC_KEY_LEN, SIGNATURE_LEN};

pub(crate) struct FakeVenue {
    pub encrypted_operation_key: String,
    pub place_order_tx: String,
    pub cancel_order_tx: String,
    pub cancel_all_txs: Vec<String>,
    pub account_tx: String,
    pub fail_build: bool,
    pub fail_submit: bool,
    calls: Mutex<Vec<&'static str>>,
    submitted: Mutex<Vec<String>>,
    amounts: Mutex<Vec<Vec<Asset>>>,
    last_request: Mutex<Option<PlaceOrderRequest>>,
}

impl FakeVenue {
    pub fn new() -> Self {
        Self {
            encrypted_operation_key: String::new(),
            place_order_tx: "84a30081825820aa".to_string(),
            cancel_order_tx: "84a30081825820bb".to_string(),
            cancel_all_txs: vec!["aa01".into(), "aa02".into(), "aa03".into()],
            account_tx: "84a30081825820cc".to_string(),
            fail_build: false,
            fail_submit: false,
            calls: Mutex::new(Vec::new()),
            submitted: Mutex::new(Vec::new()),
            amounts: Mutex::new(Vec::new()),
            last_request: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, name: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| **c == name).count()
    }

    /// Signed payloads received by submit endpoints, in arrival order.
    pub fn submitted(&self) -> Vec<String> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn last_amount(&self) -> Vec<Asset> {
        self.amounts.lock().unwrap().last().cloned().unwrap_or_default()
    }

    pub fn last_place_order(&self) -> Option<PlaceOrderRequest> {
        self.last_request.lock().unwrap().clone()
    }

    fn record(&self, name: &'static str) {
        self.calls.lock().unwrap().push(name);
    }

    fn build_result<T>(&self, ok: T) -> Result<T> {
        if self.fail_build {
            return Err(VenueApiError::Status {
                status: 400,
                message: "invalid quantity".to_string(),
            });
        }
        Ok(ok)
    }

    fn submit_result<T>(&self, signed: &[String], ok: T) -> Result<T> {
        self.submitted.lock().unwrap().extend_from_slice(signed);
        if self.fail_submit {
            return Err(VenueApiError::Status {
                status: 502,
                message: "upstream timeout".to_string(),
            });
        }
        Ok(ok)
    }
}

impl VenueApi for FakeVenue {
    async fn get_operation_key(&self) -> Result<GetOperationKeyResponse> {
        self.record("get_operation_key");
        Ok(GetOperationKeyResponse {
            encrypted_operation_key: self.encrypted_operation_key.clone(),
            operation_key_hash: "fake-hash".to_string(),
        })
    }

    async fn build_place_order(
        &self,
        request: &PlaceOrderRequest,
    ) -> Result<BuildPlaceOrderResponse> {
        self.record("build_place_order");
        *self.last_request.lock().unwrap() = Some(request.clone());
        self.build_result(BuildPlaceOrderResponse {
            order_id: "order-1".to_string(),
            tx_hex: self.place_order_tx.clone(),
        })
    }

    async fn submit_place_order(
        &self,
        request: &SubmitPlaceOrderRequest,
    ) -> Result<SubmitPlaceOrderResponse> {
        self.record("submit_place_order");
        let placed = self.last_place_order();
        let order = OrderJson {
            order_id: request.order_id.clone(),
            status: OrderStatus::Processing,
            symbol: placed.as_ref().map(|p| p.symbol.clone()).unwrap_or_default(),
            orig_qty: placed
                .as_ref()
                .map(|p| p.quantity.to_string())
                .unwrap_or_default(),
            executed_qty: "0".to_string(),
            side: placed
                .as_ref()
                .map(|p| p.side)
                .unwrap_or(OrderSide::Buy),
            price: placed.as_ref().and_then(|p| p.price).unwrap_or_default(),
            order_type: placed
                .as_ref()
                .map(|p| p.order_type)
                .unwrap_or(OrderType::Limit),
            fee_charged: String::new(),
            fee_unit: String::new(),
            executed_price: 0.0,
            slippage: String::new(),
            created_time: 1_700_000_000,
            update_time: 1_700_000_000,
            fills: Vec::new(),
        };
        self.submit_result(
            std::slice::from_ref(&request.signed_tx),
            SubmitPlaceOrderResponse { order },
        )
    }

    async fn build_cancel_order(&self, order_id: &str) -> Result<TxHexResponse> {
        self.record("build_cancel_order");
        self.build_result(TxHexResponse {
            tx_hex: format!("{}{}", self.cancel_order_tx, hex::encode(order_id)),
        })
    }

    async fn submit_cancel_order(&self, request: &SignedTxRequest) -> Result<TxHashResponse> {
        self.record("submit_cancel_order");
        // The fake build step embeds the order id after the fixed prefix.
        let order_id = hex::decode(&self.cancel_order_tx)
            .ok()
            .and_then(|prefix| {
                let signed = hex::decode(&request.signed_tx).ok()?;
                let end = signed.len().checked_sub(PUBLIC_KEY_LEN + SIGNATURE_LEN)?;
                let body = signed.get(prefix.len()..end)?;
                String::from_utf8(body.to_vec()).ok()
            })
            .unwrap_or_default();
        self.submit_result(
            std::slice::from_ref(&request.signed_tx),
            TxHashResponse {
                tx_hash: format!("cancel-{}", order_id),
            },
        )
    }

    async fn build_cancel_all_orders(&self) -> Result<BuildCancelAllOrdersResponse> {
        self.record("build_cancel_all_orders");
        self.build_result(BuildCancelAllOrdersResponse {
            tx_hexes: self.cancel_all_txs.clone(),
        })
    }

    async fn submit_cancel_all_orders(
        &self,
        request: &SubmitCancelAllOrdersRequest,
    ) -> Result<SubmitCancelAllOrdersResponse> {
        self.record("submit_cancel_all_orders");
        let ids = (1..=request.signed_txs.len())
            .map(|i| format!("order-{}", i))
            .collect();
        self.submit_result(
            &request.signed_txs,
            SubmitCancelAllOrdersResponse {
                cancelled_order_ids: ids,
            },
        )
    }

    async fn build_withdrawal(&self, request: &BuildWithdrawalRequest) -> Result<TxHexResponse> {
        self.record("build_withdrawal");
        self.amounts
            .lock()
            .unwrap()
            .push(request.withdrawal_amount.clone());
        self.build_result(TxHexResponse {
            tx_hex: self.account_tx.clone(),
        })
    }

    async fn submit_withdrawal(&self, request: &SignedTxRequest) -> Result<TxHashResponse> {
        self.record("submit_withdrawal");
        self.submit_result(
            std::slice::from_ref(&request.signed_tx),
            TxHashResponse {
                tx_hash: "withdrawal-tx".to_string(),
            },
        )
    }

    async fn build_transferal(&self, request: &BuildTransferalRequest) -> Result<TxHexResponse> {
        self.record("build_transferal");
        self.amounts
            .lock()
            .unwrap()
            .push(request.transferal_amount.clone());
        self.build_result(TxHexResponse {
            tx_hex: self.account_tx.clone(),
        })
    }

    async fn submit_transferal(&self, request: &SignedTxRequest) -> Result<TxHashResponse> {
        self.record("submit_transferal");
        self.submit_result(
            std::slice::from_ref(&request.signed_tx),
            TxHashResponse {
                tx_hash: "transferal-tx".to_string(),
            },
        )
    }
}
