use std::fmt;

use log::{debug, info, warn};
use secrecy::SecretString;

use super::error::{Operation, OrderWalletError, Result, VenueApiError};
use super::venue_api::{VenueApi, VenueHttpClient};
use super::venue_types::{
    BuildTransferalRequest, BuildWithdrawalRequest, OrderJson, PlaceOrderRequest,
    SignedTxRequest, SubmitCancelAllOrdersRequest, SubmitPlaceOrderRequest,
};
use crate::config::ApiConfig;
use crate::security::decrypt_operation_key;
use crate::value::{Asset, AssetValue};
use crate::wallet::{OperationKeySigner, TxSigner};

/// Trading client that runs every venue transaction through build, local
/// sign and submit.
///
/// Each step finishes before the next starts and nothing is retried. A wallet
/// holds at most one signer; callers sharing one across tasks must serialise
/// pipeline calls themselves.
pub struct OrderWallet<A: VenueApi = VenueHttpClient> {
    api: A,
    signer: Option<Box<dyn TxSigner>>,
}

impl<A: VenueApi> fmt::Debug for OrderWallet<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderWallet")
            .field(
                "signer",
                &self.signer.as_ref().map(|s| s.public_key_hex()),
            )
            .finish_non_exhaustive()
    }
}

impl OrderWallet<VenueHttpClient> {
    pub fn new(config: &ApiConfig) -> std::result::Result<Self, VenueApiError> {
        Ok(Self::with_api(VenueHttpClient::new(config)?))
    }
}

impl<A: VenueApi> OrderWallet<A> {
    pub fn with_api(api: A) -> Self {
        Self { api, signer: None }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn is_loaded(&self) -> bool {
        self.signer.is_some()
    }

    pub fn public_key_hex(&self) -> Option<String> {
        self.signer.as_ref().map(|s| s.public_key_hex())
    }

    /// Fetch the encrypted operation key from the venue, decrypt it with
    /// `passcode` and install the resulting signer.
    ///
    /// On failure any previously loaded signer is kept.
    pub async fn load_operation_key(&mut self, passcode: &SecretString) -> Result<()> {
        let response = self
            .api
            .get_operation_key()
            .await
            .map_err(OrderWalletError::KeyFetch)?;
        debug!(
            "fetched operation key blob, hash {}",
            response.operation_key_hash
        );
        self.load_operation_key_from_blob(&response.encrypted_operation_key, passcode)
    }

    /// Same as [`OrderWallet::load_operation_key`] for a blob obtained out of band.
    pub fn load_operation_key_from_blob(
        &mut self,
        encrypted: &str,
        passcode: &SecretString,
    ) -> Result<()> {
        let key = decrypt_operation_key(encrypted, passcode)?;
        let signer =
            OperationKeySigner::from_operation_key(&key).map_err(OrderWalletError::SignerKey)?;
        self.load_signer(signer);
        Ok(())
    }

    pub fn load_signer(&mut self, signer: impl TxSigner + 'static) {
        info!("operation key loaded, public key {}", signer.public_key_hex());
        self.signer = Some(Box::new(signer));
    }

    pub fn unload(&mut self) {
        if self.signer.take().is_some() {
            info!("operation key unloaded");
        }
    }

    fn session(&self) -> Result<&dyn TxSigner> {
        self.signer.as_deref().ok_or(OrderWalletError::NotLoaded)
    }

    pub async fn place_order(&self, request: &PlaceOrderRequest) -> Result<OrderJson> {
        let op = Operation::PlaceOrder;
        let signer = self.session()?;
        debug!(
            "building {:?} {:?} order: {} x {}",
            request.order_type, request.side, request.symbol, request.quantity
        );
        let built = self
            .api
            .build_place_order(request)
            .await
            .map_err(|source| OrderWalletError::Build { op, source })?;
        let signed_tx = sign_payload(signer, op, &built.tx_hex)?;

        let submit = SubmitPlaceOrderRequest {
            order_id: built.order_id,
            signed_tx,
        };
        let response = self
            .api
            .submit_place_order(&submit)
            .await
            .map_err(|source| submit_failed(op, &submit.order_id, source))?;
        info!(
            "order {} submitted, status {:?}",
            response.order.order_id, response.order.status
        );
        Ok(response.order)
    }

    /// Returns the cancel transaction hash.
    pub async fn cancel_order(&self, order_id: &str) -> Result<String> {
        let op = Operation::CancelOrder;
        let signer = self.session()?;
        let built = self
            .api
            .build_cancel_order(order_id)
            .await
            .map_err(|source| OrderWalletError::Build { op, source })?;
        let signed_tx = sign_payload(signer, op, &built.tx_hex)?;
        let response = self
            .api
            .submit_cancel_order(&SignedTxRequest { signed_tx })
            .await
            .map_err(|source| submit_failed(op, order_id, source))?;
        info!("order {} cancelled, tx {}", order_id, response.tx_hash);
        Ok(response.tx_hash)
    }

    /// Cancel every open order in one submission.
    ///
    /// Payloads are signed in build order and submitted together. If any
    /// payload fails to sign, nothing is submitted. No open orders means an
    /// empty result and no submit call.
    pub async fn cancel_all_orders(&self) -> Result<Vec<String>> {
        let op = Operation::CancelAllOrders;
        let signer = self.session()?;
        let built = self
            .api
            .build_cancel_all_orders()
            .await
            .map_err(|source| OrderWalletError::Build { op, source })?;
        if built.tx_hexes.is_empty() {
            info!("no open orders to cancel");
            return Ok(Vec::new());
        }
        debug!("signing {} cancel payloads", built.tx_hexes.len());

        let signed_txs = built
            .tx_hexes
            .iter()
            .enumerate()
            .map(|(index, tx_hex)| {
                signer
                    .sign_tx(tx_hex)
                    .map_err(|source| OrderWalletError::Signing {
                        op,
                        index: Some(index),
                        source,
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        let response = self
            .api
            .submit_cancel_all_orders(&SubmitCancelAllOrdersRequest { signed_txs })
            .await
            .map_err(|source| submit_failed(op, "*", source))?;
        info!("cancelled {} orders", response.cancelled_order_ids.len());
        Ok(response.cancelled_order_ids)
    }

    /// Withdraw `assets` from the trading account. Quantities are checked
    /// locally before anything is sent. Returns the transaction hash.
    pub async fn withdraw(&self, assets: &[Asset]) -> Result<String> {
        let op = Operation::Withdrawal;
        let signer = self.session()?;
        let amount = non_empty_amount(op, assets)?;
        debug!("building withdrawal of {}", amount);

        let built = self
            .api
            .build_withdrawal(&BuildWithdrawalRequest {
                withdrawal_amount: amount.to_assets(),
            })
            .await
            .map_err(|source| OrderWalletError::Build { op, source })?;
        let signed_tx = sign_payload(signer, op, &built.tx_hex)?;
        let response = self
            .api
            .submit_withdrawal(&SignedTxRequest { signed_tx })
            .await
            .map_err(|source| submit_failed(op, "-", source))?;
        info!("withdrawal submitted, tx {}", response.tx_hash);
        Ok(response.tx_hash)
    }

    /// Transfer `assets` to another venue account. Returns the transaction hash.
    pub async fn transfer(&self, assets: &[Asset], to_address: &str) -> Result<String> {
        let op = Operation::Transferal;
        let signer = self.session()?;
        let amount = non_empty_amount(op, assets)?;
        debug!("building transferal of {} to {}", amount, to_address);

        let built = self
            .api
            .build_transferal(&BuildTransferalRequest {
                transferal_amount: amount.to_assets(),
                to_address: to_address.to_string(),
            })
            .await
            .map_err(|source| OrderWalletError::Build { op, source })?;
        let signed_tx = sign_payload(signer, op, &built.tx_hex)?;
        let response = self
            .api
            .submit_transferal(&SignedTxRequest { signed_tx })
            .await
            .map_err(|source| submit_failed(op, to_address, source))?;
        info!("transferal submitted, tx {}", response.tx_hash);
        Ok(response.tx_hash)
    }
}

/// Normalise `assets`; zero quantities drop out, and nothing left is an error.
fn non_empty_amount(op: Operation, assets: &[Asset]) -> Result<AssetValue> {
    let amount = AssetValue::from_assets(assets)?;
    if amount.is_empty() {
        return Err(OrderWalletError::EmptyAmount(op));
    }
    Ok(amount)
}

fn sign_payload(signer: &dyn TxSigner, op: Operation, tx_hex: &str) -> Result<String> {
    signer
        .sign_tx(tx_hex)
        .map_err(|source| OrderWalletError::Signing {
            op,
            index: None,
            source,
        })
}

fn submit_failed(op: Operation, target: &str, source: VenueApiError) -> OrderWalletError {
    warn!("{} submit failed for {}, remote state unknown: {}", op, target, source);
    OrderWalletError::Submit { op, source }
}
