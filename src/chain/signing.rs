/// Ledger transaction signing in legacy Amino JSON mode. The body and auth
/// info are rebuilt from the same `StdSignDoc` the device signed.

use crate::chain::amino::{self, Coin, StdFee};
use crate::chain::messages::MessageRegistry;
use crate::chain::metadata::{SignerMetadata, SignerMetadataSource};
use crate::chain::proto::{Any, SignMode, TxRaw};
use crate::chain::tx_builder::{encode_secp256k1_pubkey, make_auth_info_bytes, parse_gas_limit};
use crate::chain::wallet::{HardwareSigner, SignerIdentity};
use crate::error::Result;

/// Fee paid by the transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxFee {
    pub amount: Vec<Coin>,
    /// Gas limit as a decimal string; must fit in 53 bits
    pub gas: String,
    /// Fee granter address; empty when the signer pays
    pub granter: String,
}

impl TxFee {
    pub fn new(amount: Vec<Coin>, gas: impl Into<String>) -> Self {
        Self {
            amount,
            gas: gas.into(),
            granter: String::new(),
        }
    }

    pub fn with_granter(mut self, granter: impl Into<String>) -> Self {
        self.granter = granter.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignOptions {
    pub fee: TxFee,
    pub memo: String,
}

/// Signs message lists with a hardware device
pub struct LedgerTxBuilder<'a, S: ?Sized, M: ?Sized> {
    signer: &'a S,
    metadata: &'a M,
    registry: &'a MessageRegistry,
}

impl<'a, S, M> LedgerTxBuilder<'a, S, M>
where
    S: HardwareSigner + ?Sized,
    M: SignerMetadataSource + ?Sized,
{
    pub fn new(signer: &'a S, metadata: &'a M, registry: &'a MessageRegistry) -> Self {
        Self {
            signer,
            metadata,
            registry,
        }
    }

    /// Sign `messages`, looking up account number, sequence and chain id for
    /// the device's address
    pub async fn sign(&self, messages: &[Any], options: &SignOptions) -> Result<TxRaw> {
        let gas_limit = self.preflight(messages, options)?;

        let identity = self.signer.address_and_public_key().await?;
        log::info!("Signing {} message(s) as {}", messages.len(), identity.address);

        let signer_data = self.metadata.signer_metadata(&identity.address).await?;
        self.sign_as(messages, options, gas_limit, &identity, &signer_data)
            .await
    }

    /// Sign with caller-provided account number, sequence and chain id
    ///
    /// No network lookup happens; use this to sign several transactions
    /// ahead of time with consecutive sequences.
    pub async fn sign_with_signer_data(
        &self,
        messages: &[Any],
        options: &SignOptions,
        signer_data: &SignerMetadata,
    ) -> Result<TxRaw> {
        let gas_limit = self.preflight(messages, options)?;

        let identity = self.signer.address_and_public_key().await?;
        log::info!(
            "Signing {} message(s) as {} with sequence {}",
            messages.len(),
            identity.address,
            signer_data.sequence
        );

        self.sign_as(messages, options, gas_limit, &identity, signer_data)
            .await
    }

    /// Checks that need neither device nor network; run before any prompt
    fn preflight(&self, messages: &[Any], options: &SignOptions) -> Result<u64> {
        self.registry.ensure_supported(messages)?;
        parse_gas_limit(&options.fee.gas)
    }

    async fn sign_as(
        &self,
        messages: &[Any],
        options: &SignOptions,
        gas_limit: u64,
        identity: &SignerIdentity,
        signer_data: &SignerMetadata,
    ) -> Result<TxRaw> {
        let public_key = encode_secp256k1_pubkey(&identity.public_key)?;

        let msgs = messages
            .iter()
            .map(|msg| self.registry.to_amino(msg))
            .collect::<Result<Vec<_>>>()?;

        let fee = StdFee {
            amount: options.fee.amount.clone(),
            gas: gas_limit.to_string(),
        };
        let sign_doc = amino::make_sign_doc(
            msgs,
            fee,
            &signer_data.chain_id,
            &options.memo,
            signer_data.account_number,
            signer_data.sequence,
        );
        let sign_bytes = amino::serialize_sign_doc(&sign_doc)?;
        log::debug!("Amino sign document: {}", String::from_utf8_lossy(&sign_bytes));

        let signature = self.signer.sign(&sign_bytes).await?;

        // Rebuild the body from what was signed, not from the input
        let signed_messages = sign_doc
            .msgs
            .iter()
            .map(|msg| self.registry.from_amino(msg))
            .collect::<Result<Vec<_>>>()?;
        let body_bytes = self
            .registry
            .encode_tx_body(signed_messages, &sign_doc.memo)?;

        let auth_info_bytes = make_auth_info_bytes(
            &[(public_key, signer_data.sequence)],
            &sign_doc.fee.amount,
            gas_limit,
            &options.fee.granter,
            SignMode::LegacyAminoJson,
        );

        log::info!("Transaction signed for {}", identity.address);

        Ok(TxRaw {
            body_bytes,
            auth_info_bytes,
            signatures: vec![signature],
        })
    }
}

/// One-shot form of [`LedgerTxBuilder::sign`]
pub async fn sign_from_ledger<S, M>(
    signer: &S,
    metadata: &M,
    messages: &[Any],
    options: &SignOptions,
    registry: &MessageRegistry,
) -> Result<TxRaw>
where
    S: HardwareSigner + ?Sized,
    M: SignerMetadataSource + ?Sized,
{
    LedgerTxBuilder::new(signer, metadata, registry)
        .sign(messages, options)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::messages::{to_any, AminoMsgDelegate, AminoMsgSend};
    use crate::chain::proto::{self, mode_info, AuthInfo, MsgDelegate, MsgSend, TxBody};
    use crate::chain::wallet::derive_address;
    use crate::error::SignerError;
    use async_trait::async_trait;
    use prost::Message as _;
    use secp256k1::{ecdsa, Message, PublicKey, Secp256k1, SecretKey};
    use sha2::{Digest, Sha256};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn secret() -> SecretKey {
        SecretKey::from_slice(&[0x11; 32]).unwrap()
    }

    fn public() -> Vec<u8> {
        PublicKey::from_secret_key(&Secp256k1::new(), &secret())
            .serialize()
            .to_vec()
    }

    fn address() -> String {
        derive_address(&public(), "firma").unwrap()
    }

    /// Device stub returning a fixed signature and recording what it signed
    struct StubSigner {
        public_key: Vec<u8>,
        signature: Vec<u8>,
        identity_calls: AtomicUsize,
        signed: Mutex<Vec<Vec<u8>>>,
    }

    impl StubSigner {
        fn new(signature: &[u8]) -> Self {
            Self {
                public_key: public(),
                signature: signature.to_vec(),
                identity_calls: AtomicUsize::new(0),
                signed: Mutex::new(Vec::new()),
            }
        }

        fn device_calls(&self) -> usize {
            self.identity_calls.load(Ordering::SeqCst) + self.signed.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl HardwareSigner for StubSigner {
        async fn address(&self) -> Result<String> {
            self.identity_calls.fetch_add(1, Ordering::SeqCst);
            Ok(address())
        }

        async fn public_key(&self) -> Result<Vec<u8>> {
            self.identity_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.public_key.clone())
        }

        async fn sign(&self, message: &[u8]) -> Result<Vec<u8>> {
            self.signed.lock().unwrap().push(message.to_vec());
            Ok(self.signature.clone())
        }

        async fn show_address_on_device(&self) -> Result<()> {
            Ok(())
        }
    }

    /// Signs for real with a software key, the way the device would
    struct SoftwareSigner;

    #[async_trait]
    impl HardwareSigner for SoftwareSigner {
        async fn address(&self) -> Result<String> {
            Ok(address())
        }

        async fn public_key(&self) -> Result<Vec<u8>> {
            Ok(public())
        }

        async fn sign(&self, message: &[u8]) -> Result<Vec<u8>> {
            let digest: [u8; 32] = Sha256::digest(message).into();
            let msg = Message::from_digest_slice(&digest).unwrap();
            let sig = Secp256k1::new().sign_ecdsa(&msg, &secret());
            Ok(sig.serialize_compact().to_vec())
        }

        async fn show_address_on_device(&self) -> Result<()> {
            Ok(())
        }
    }

    struct StubMetadata {
        result: std::result::Result<SignerMetadata, String>,
        queried: Mutex<Vec<String>>,
    }

    impl StubMetadata {
        fn ok(chain_id: &str, account_number: u64, sequence: u64) -> Self {
            Self {
                result: Ok(SignerMetadata {
                    chain_id: chain_id.to_string(),
                    account_number,
                    sequence,
                }),
                queried: Mutex::new(Vec::new()),
            }
        }

        fn missing() -> Self {
            Self {
                result: Err("missing".to_string()),
                queried: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl SignerMetadataSource for StubMetadata {
        async fn signer_metadata(&self, address: &str) -> Result<SignerMetadata> {
            self.queried.lock().unwrap().push(address.to_string());
            self.result.clone().map_err(|_| SignerError::AccountNotFound {
                address: address.to_string(),
            })
        }
    }

    fn send_msg(amount: &str) -> Any {
        to_any::<AminoMsgSend>(&MsgSend {
            from_address: address(),
            to_address: "firma1recipient".to_string(),
            amount: vec![proto::Coin {
                denom: "ufct".to_string(),
                amount: amount.to_string(),
            }],
        })
    }

    fn options(gas: &str) -> SignOptions {
        SignOptions {
            fee: TxFee::new(vec![Coin::new("100", "ufct")], gas),
            memo: String::new(),
        }
    }

    #[tokio::test]
    async fn test_sign_with_stub_device() {
        let registry = MessageRegistry::with_defaults();
        let signer = StubSigner::new(b"SIG");
        let metadata = StubMetadata::ok("test-1", 5, 3);
        let msg = send_msg("1");

        let tx = sign_from_ledger(&signer, &metadata, &[msg.clone()], &options("200000"), &registry)
            .await
            .unwrap();

        assert_eq!(tx.signatures, vec![b"SIG".to_vec()]);
        assert_eq!(*metadata.queried.lock().unwrap(), vec![address()]);

        let body = TxBody::decode(tx.body_bytes.as_slice()).unwrap();
        assert_eq!(body.messages, vec![msg]);
        assert_eq!(body.memo, "");

        let auth_info = AuthInfo::decode(tx.auth_info_bytes.as_slice()).unwrap();
        let info = &auth_info.signer_infos[0];
        assert_eq!(info.sequence, 3);
        let key = proto::Secp256k1PubKey::decode(info.public_key.as_ref().unwrap().value.as_slice())
            .unwrap();
        assert_eq!(key.key, public());
        match info.mode_info.as_ref().and_then(|m| m.sum.as_ref()) {
            Some(mode_info::Sum::Single(single)) => {
                assert_eq!(single.mode, SignMode::LegacyAminoJson as i32)
            }
            other => panic!("unexpected mode info: {:?}", other),
        }

        let fee = auth_info.fee.unwrap();
        assert_eq!(fee.gas_limit, 200000);
        assert_eq!(fee.amount[0].amount, "100");
        assert_eq!(fee.amount[0].denom, "ufct");

        let signed = signer.signed.lock().unwrap();
        assert_eq!(signed.len(), 1);
        let expected = format!(
            concat!(
                r#"{{"account_number":"5","chain_id":"test-1","#,
                r#""fee":{{"amount":[{{"amount":"100","denom":"ufct"}}],"gas":"200000"}},"#,
                r#""memo":"","#,
                r#""msgs":[{{"type":"cosmos-sdk/MsgSend","value":{{"amount":[{{"amount":"1","denom":"ufct"}}],"from_address":"{}","to_address":"firma1recipient"}}}}],"#,
                r#""sequence":"3"}}"#
            ),
            address()
        );
        assert_eq!(String::from_utf8(signed[0].clone()).unwrap(), expected);
    }

    #[tokio::test]
    async fn test_unsupported_message_never_reaches_device() {
        let registry = MessageRegistry::with_defaults();
        let signer = StubSigner::new(b"SIG");
        let metadata = StubMetadata::ok("test-1", 5, 3);
        let unknown = Any {
            type_url: "/firmachain.contract.MsgAddContractLog".to_string(),
            value: vec![1, 2, 3],
        };

        let err = sign_from_ledger(
            &signer,
            &metadata,
            &[send_msg("1"), unknown],
            &options("200000"),
            &registry,
        )
        .await
        .unwrap_err();

        assert!(
            matches!(err, SignerError::UnsupportedMessageType(ref t) if t == "/firmachain.contract.MsgAddContractLog")
        );
        assert_eq!(signer.device_calls(), 0);
        assert!(metadata.queried.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_gas_overflow_rejected_before_device() {
        let registry = MessageRegistry::with_defaults();
        let signer = StubSigner::new(b"SIG");
        let metadata = StubMetadata::ok("test-1", 5, 3);

        let err = sign_from_ledger(
            &signer,
            &metadata,
            &[send_msg("1")],
            &options("9007199254740992"),
            &registry,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, SignerError::NumericOverflow(_)));
        assert_eq!(signer.device_calls(), 0);

        let err = sign_from_ledger(&signer, &metadata, &[send_msg("1")], &options("lots"), &registry)
            .await
            .unwrap_err();
        assert!(matches!(err, SignerError::InvalidNumber(_)));
    }

    #[tokio::test]
    async fn test_max_safe_gas_accepted() {
        let registry = MessageRegistry::with_defaults();
        let signer = StubSigner::new(b"SIG");
        let metadata = StubMetadata::ok("test-1", 5, 3);

        let tx = sign_from_ledger(
            &signer,
            &metadata,
            &[send_msg("1")],
            &options("9007199254740991"),
            &registry,
        )
        .await
        .unwrap();

        let fee = AuthInfo::decode(tx.auth_info_bytes.as_slice())
            .unwrap()
            .fee
            .unwrap();
        assert_eq!(fee.gas_limit, 9007199254740991);
    }

    #[tokio::test]
    async fn test_metadata_failure_stops_before_signing() {
        let registry = MessageRegistry::with_defaults();
        let signer = StubSigner::new(b"SIG");
        let metadata = StubMetadata::missing();

        let err = sign_from_ledger(&signer, &metadata, &[send_msg("1")], &options("1"), &registry)
            .await
            .unwrap_err();

        assert!(err.is_metadata_error());
        assert!(signer.signed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_only_signature_differs_between_devices() {
        let registry = MessageRegistry::with_defaults();
        let metadata = StubMetadata::ok("test-1", 5, 3);
        let first = StubSigner::new(b"SIG-A");
        let second = StubSigner::new(b"SIG-B");
        let msgs = [send_msg("1")];

        let a = sign_from_ledger(&first, &metadata, &msgs, &options("200000"), &registry)
            .await
            .unwrap();
        let b = sign_from_ledger(&second, &metadata, &msgs, &options("200000"), &registry)
            .await
            .unwrap();

        assert_eq!(a.body_bytes, b.body_bytes);
        assert_eq!(a.auth_info_bytes, b.auth_info_bytes);
        assert_ne!(a.signatures, b.signatures);
        assert_eq!(
            *first.signed.lock().unwrap(),
            *second.signed.lock().unwrap()
        );
    }

    #[tokio::test]
    async fn test_explicit_signer_data_skips_lookup() {
        let registry = MessageRegistry::with_defaults();
        let signer = StubSigner::new(b"SIG");
        let metadata = StubMetadata::ok("test-1", 5, 3);
        let builder = LedgerTxBuilder::new(&signer, &metadata, &registry);

        let signer_data = SignerMetadata {
            chain_id: "colosseum-1".to_string(),
            account_number: 5,
            sequence: 42,
        };
        let tx = builder
            .sign_with_signer_data(&[send_msg("1")], &options("200000"), &signer_data)
            .await
            .unwrap();

        assert!(metadata.queried.lock().unwrap().is_empty());
        let auth_info = AuthInfo::decode(tx.auth_info_bytes.as_slice()).unwrap();
        assert_eq!(auth_info.signer_infos[0].sequence, 42);

        let signed = String::from_utf8(signer.signed.lock().unwrap()[0].clone()).unwrap();
        assert!(signed.contains(r#""chain_id":"colosseum-1""#));
        assert!(signed.ends_with(r#""sequence":"42"}"#));
    }

    #[tokio::test]
    async fn test_granter_only_in_auth_info() {
        let registry = MessageRegistry::with_defaults();
        let signer = StubSigner::new(b"SIG");
        let metadata = StubMetadata::ok("test-1", 5, 3);
        let options = SignOptions {
            fee: TxFee::new(vec![Coin::new("100", "ufct")], "200000").with_granter("firma1granter"),
            memo: "rent <march>".to_string(),
        };

        let tx = sign_from_ledger(&signer, &metadata, &[send_msg("1")], &options, &registry)
            .await
            .unwrap();

        let signed = String::from_utf8(signer.signed.lock().unwrap()[0].clone()).unwrap();
        assert!(signed.contains(r#""fee":{"amount":[{"amount":"100","denom":"ufct"}],"gas":"200000"},"#));
        assert!(!signed.contains("granter"));
        assert!(signed.contains(r#""memo":"rent \u003cmarch\u003e""#));

        let body = TxBody::decode(tx.body_bytes.as_slice()).unwrap();
        assert_eq!(body.memo, "rent <march>");
        let fee = AuthInfo::decode(tx.auth_info_bytes.as_slice())
            .unwrap()
            .fee
            .unwrap();
        assert_eq!(fee.granter, "firma1granter");
    }

    #[tokio::test]
    async fn test_message_order_preserved() {
        let registry = MessageRegistry::with_defaults();
        let signer = StubSigner::new(b"SIG");
        let metadata = StubMetadata::ok("test-1", 5, 3);
        let delegate = to_any::<AminoMsgDelegate>(&MsgDelegate {
            delegator_address: address(),
            validator_address: "firmavaloper1validator".to_string(),
            amount: Some(proto::Coin {
                denom: "ufct".to_string(),
                amount: "250".to_string(),
            }),
        });
        let msgs = vec![send_msg("1"), delegate, send_msg("2")];

        let tx = sign_from_ledger(&signer, &metadata, &msgs, &options("300000"), &registry)
            .await
            .unwrap();

        let body = TxBody::decode(tx.body_bytes.as_slice()).unwrap();
        assert_eq!(body.messages, msgs);
    }

    #[tokio::test]
    async fn test_signature_verifies_over_sign_doc() {
        let registry = MessageRegistry::with_defaults();
        let metadata = StubMetadata::ok("test-1", 5, 3);

        let tx = sign_from_ledger(
            &SoftwareSigner,
            &metadata,
            &[send_msg("1")],
            &options("200000"),
            &registry,
        )
        .await
        .unwrap();

        // Rebuild the sign bytes the way a verifying node does
        let body = TxBody::decode(tx.body_bytes.as_slice()).unwrap();
        let msgs = body
            .messages
            .iter()
            .map(|m| registry.to_amino(m).unwrap())
            .collect();
        let fee = StdFee {
            amount: vec![Coin::new("100", "ufct")],
            gas: "200000".to_string(),
        };
        let doc = amino::make_sign_doc(msgs, fee, "test-1", &body.memo, 5, 3);
        let bytes = amino::serialize_sign_doc(&doc).unwrap();

        let digest: [u8; 32] = Sha256::digest(&bytes).into();
        let signature = ecdsa::Signature::from_compact(&tx.signatures[0]).unwrap();
        let key = PublicKey::from_slice(&public()).unwrap();
        Secp256k1::verification_only()
            .verify_ecdsa(&Message::from_digest_slice(&digest).unwrap(), &signature, &key)
            .unwrap();
    }

    #[tokio::test]
    async fn test_invalid_device_key_rejected_before_signing() {
        let registry = MessageRegistry::with_defaults();
        let mut signer = StubSigner::new(b"SIG");
        signer.public_key = vec![0x02; 20];
        let metadata = StubMetadata::ok("test-1", 5, 3);

        let err = sign_from_ledger(&signer, &metadata, &[send_msg("1")], &options("1"), &registry)
            .await
            .unwrap_err();

        assert!(matches!(err, SignerError::InvalidPublicKey(_)));
        assert!(signer.signed.lock().unwrap().is_empty());
    }
}
