#[cfg(test)]
mod tests {
    use k256::ecdsa::{Signature, VerifyingKey, signature::Verifier};
    use secrecy::SecretString;
    use serial_test::serial;

    use crate::SdkError;
    use crate::security::{
        EncryptedBlob, PASSCODE_ENV, SecurePassword, decrypt_operation_key, encrypt_with_params,
    };
    use crate::value::{Asset, AssetValue};
    use crate::venue_module::fake_venue::FakeVenue;
    use crate::venue_module::venue_types::{ADAUSDM, OrderSide, PlaceOrderRequest};
    use crate::venue_module::{OrderWallet, OrderWalletError, Phase};
    use crate::wallet::{PUBLIC_KEY_LEN, SIGNATURE_LEN};

    const IV1: [u8; 16] = [
        0x3a, 0x91, 0x0c, 0x55, 0xe2, 0x17, 0x48, 0xbd, 0x06, 0x7f, 0xc4, 0x29, 0x9e, 0x63, 0xd0,
        0x1b,
    ];

    fn legacy_blob(plaintext: &[u8], passcode: &str) -> String {
        let passcode = SecretString::new(passcode.to_string());
        encrypt_with_params(plaintext, &passcode, &IV1, None)
            .unwrap()
            .to_json()
    }

    #[tokio::test]
    async fn test_legacy_blob_to_signed_order() {
        let blob = legacy_blob(b"masterkey123", "pass1");
        assert!(EncryptedBlob::parse(&blob).unwrap().is_legacy());
        assert!(!blob.contains("salt"));

        let mut venue = FakeVenue::new();
        venue.encrypted_operation_key = blob;
        let mut wallet = OrderWallet::with_api(venue);
        wallet
            .load_operation_key(&SecretString::new("pass1".to_string()))
            .await
            .unwrap();

        wallet
            .place_order(&PlaceOrderRequest::limit(ADAUSDM, OrderSide::Sell, 50.0, 0.8))
            .await
            .unwrap();

        let signed = hex::decode(&wallet.api().submitted()[0]).unwrap();
        let payload = hex::decode(&wallet.api().place_order_tx).unwrap();
        assert_eq!(signed.len(), payload.len() + PUBLIC_KEY_LEN + SIGNATURE_LEN);

        let pk = &signed[payload.len()..payload.len() + PUBLIC_KEY_LEN];
        assert_eq!(hex::encode(pk), wallet.public_key_hex().unwrap());
        let verifying_key = VerifyingKey::from_sec1_bytes(pk).unwrap();
        let signature = Signature::from_slice(&signed[payload.len() + PUBLIC_KEY_LEN..]).unwrap();
        assert!(verifying_key.verify(&payload, &signature).is_ok());
    }

    #[tokio::test]
    async fn test_corrupted_blob_never_loads() {
        let mut parsed = EncryptedBlob::parse(&legacy_blob(b"masterkey123", "pass1")).unwrap();
        parsed.ciphertext[0] ^= 0x01;

        let mut venue = FakeVenue::new();
        venue.encrypted_operation_key = parsed.to_json();
        let mut wallet = OrderWallet::with_api(venue);
        let err = wallet
            .load_operation_key(&SecretString::new("pass1".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "incorrect passcode or corrupted data");

        let err = wallet.cancel_order("order-1").await.unwrap_err();
        assert!(matches!(err, OrderWalletError::NotLoaded));
        assert_eq!(wallet.api().calls(), vec!["get_operation_key"]);
    }

    #[test]
    #[serial]
    fn test_passcode_from_env_decrypts_blob() {
        let blob = legacy_blob(b"masterkey123", "pass1");
        // SAFETY: env mutation is serialised across tests.
        unsafe { std::env::set_var(PASSCODE_ENV, "pass1") };
        let passcode = SecurePassword::get_passcode().unwrap();
        unsafe { std::env::remove_var(PASSCODE_ENV) };

        let key = decrypt_operation_key(&blob, &passcode).unwrap();
        assert_eq!(key.expose_material(), b"masterkey123");
    }

    #[tokio::test]
    async fn test_sdk_error_keeps_phase_information() {
        let mut venue = FakeVenue::new();
        venue.fail_submit = true;
        let mut wallet = OrderWallet::with_api(venue);
        wallet
            .load_operation_key_from_blob(
                &legacy_blob(b"masterkey123", "pass1"),
                &SecretString::new("pass1".to_string()),
            )
            .unwrap();

        let err = wallet
            .place_order(&PlaceOrderRequest::market(ADAUSDM, OrderSide::Buy, 10.0))
            .await
            .unwrap_err();
        assert_eq!(err.phase(), Some(Phase::Submit));
        let err: SdkError = err.into();
        assert!(err.remote_state_uncertain());
        assert!(err.to_string().contains("query order status"));
    }

    #[tokio::test]
    async fn test_withdraw_settled_balance() {
        let mut venue = FakeVenue::new();
        venue.encrypted_operation_key = legacy_blob(b"masterkey123", "pass1");
        let mut wallet = OrderWallet::with_api(venue);
        wallet
            .load_operation_key(&SecretString::new("pass1".to_string()))
            .await
            .unwrap();

        let mut balance = AssetValue::from_assets(&[Asset::new("ADA", 100)]).unwrap();
        let withdrawal = vec![Asset::new("ADA", 100)];
        wallet.withdraw(&withdrawal).await.unwrap();
        balance.subtract_all(&withdrawal).unwrap();
        assert!(balance.is_empty());
        assert_eq!(wallet.api().last_amount(), withdrawal);
    }
}
