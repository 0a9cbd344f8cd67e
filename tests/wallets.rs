//! Account lifecycle scenarios across the three wallet kinds.
use std::sync::{Arc, Mutex};
use trustlines::{
    prelude::*,
    utils::{parse_address, to_checksum},
};

// stand-in proxy creation code, addresses derived from it are not deployed anywhere
const PROXY_INIT_CODE: [u8; 5] = [0x60, 0x80, 0x60, 0x40, 0x52];
const KEY: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
const META_KINDS: [WalletKind; 2] = [WalletKind::Identity, WalletKind::SmartWallet];
const ALL_KINDS: [WalletKind; 3] =
    [WalletKind::Direct, WalletKind::Identity, WalletKind::SmartWallet];

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn config() -> WalletConfig {
    WalletConfig::default().with_chain_id(4660).with_identity_contracts(
        parse_address("0x3daB9C8301FC109Fd7bb5C81B5ea4413ef692634").unwrap(),
        parse_address("0x7E2439D87052379E8e2a8Ad203a20f546f7f5913").unwrap(),
        PROXY_INIT_CODE,
    )
}

fn relay() -> MockRelay {
    let relay = MockRelay::new();
    relay.set_fee_estimate(FeeEstimate {
        base_fee: U256::from(100u64),
        gas_price: U256::from(2u64),
        gas_limit: Some(U256::from(500_000u64)),
        safe_tx_gas: Some(U256::from(100_000u64)),
        base_gas: Some(U256::from(50_000u64)),
        fee_recipient: Address::repeat_byte(0x22),
        fee_currency: Address::repeat_byte(0x33),
    });
    relay
}

async fn recovered(kind: WalletKind, relay: MockRelay) -> TlWallet<MockRelay> {
    let mut wallet = TlWallet::new(kind, relay, config()).unwrap();
    wallet.recover_from_private_key(KEY).await.unwrap();
    wallet
}

#[tokio::test]
async fn known_key_exposes_known_addresses() {
    init_tracing();
    for (kind, expected) in [
        (WalletKind::Direct, "0x2c7536E3605D9C16a7a3D7b1898e529396a65c23"),
        (WalletKind::Identity, "0x674B717128E35b013A846C1eFF223f5A200e2445"),
        (WalletKind::SmartWallet, "0x5De5c0B59BdB1E5F96C71eC0CA9310AfE7515251"),
    ] {
        let wallet = recovered(kind, relay()).await;
        assert_eq!(to_checksum(&wallet.address().await.unwrap(), None), expected, "{kind}");
        assert_eq!(
            to_checksum(&wallet.controlling_address().unwrap(), None),
            "0x2c7536E3605D9C16a7a3D7b1898e529396a65c23"
        );
    }
}

#[test]
fn offline_derivation_matches_wallets() {
    let identity = trustlines::wallets::address::proxy_identity_address(
        "0x3daB9C8301FC109Fd7bb5C81B5ea4413ef692634",
        "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf",
        &PROXY_INIT_CODE,
    )
    .unwrap();
    assert_eq!(identity, "0xdbc7Fd565171137F8e9f491eB0F95Df08030375e");

    let safe = trustlines::wallets::address::smart_wallet_address(
        "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf",
        "0xd9Db270c1B5E3Bd161E8c8503c55cEABeE709552",
        "0xa6B71E26C5e0845f74c812102Ca7114b6a896AB2",
    )
    .unwrap();
    assert_eq!(safe, "0x7ecFEd3293cCeaE22b84B3f06559652caC8A75D3");

    assert!(matches!(
        trustlines::wallets::address::proxy_identity_address("0x3daB", "0x7E5F", &PROXY_INIT_CODE),
        Err(WalletError::ConversionError(_))
    ));
}

#[tokio::test]
async fn created_accounts_recover_to_the_same_address() {
    init_tracing();
    for kind in ALL_KINDS {
        let mut wallet = TlWallet::new(kind, relay(), config()).unwrap();
        let created = wallet.create().await.unwrap();
        let phrase = created.meta.signing_key.mnemonic.clone().expect("created with a mnemonic");

        let mut from_key = TlWallet::new(kind, relay(), config()).unwrap();
        let recovered = from_key
            .recover_from_private_key(&created.meta.signing_key.private_key)
            .await
            .unwrap();
        assert_eq!(recovered.address, created.address, "{kind}");

        let mut from_seed = TlWallet::new(kind, relay(), config()).unwrap();
        from_seed.recover_from_seed(&phrase).await.unwrap();
        assert_eq!(from_seed.address().await.unwrap(), created.address, "{kind}");
        assert_eq!(from_seed.mnemonic().unwrap().as_deref(), Some(phrase.as_str()));

        // derivation has no hidden state
        let owner = created.meta.owner_address;
        assert_eq!(wallet.derive_address(owner), wallet.derive_address(owner));
    }
}

#[tokio::test]
async fn stored_accounts_are_validated_on_load() {
    let mut wallet = TlWallet::new(WalletKind::Identity, relay(), config()).unwrap();
    let data = wallet.create().await.unwrap();

    // survives a JSON round trip
    let json = serde_json::to_string(&data).unwrap();
    assert!(json.contains(r#""type":"identity""#));
    let parsed: WalletData = serde_json::from_str(&json).unwrap();
    let loaded = TlWallet::from_wallet_data(&parsed, relay(), config()).await.unwrap();
    assert_eq!(loaded.address().await.unwrap(), data.address);

    let mut tampered = data.clone();
    tampered.address = Address::repeat_byte(0x99);
    assert!(matches!(
        TlWallet::from_wallet_data(&tampered, relay(), config()).await,
        Err(WalletError::AddressMismatch { .. })
    ));

    let mut foreign_owner = data.clone();
    foreign_owner.meta.owner_address = Address::repeat_byte(0x98);
    assert!(matches!(
        TlWallet::from_wallet_data(&foreign_owner, relay(), config()).await,
        Err(WalletError::AddressMismatch { .. })
    ));

    let mut future = data.clone();
    future.version = 2;
    assert!(matches!(
        TlWallet::from_wallet_data(&future, relay(), config()).await,
        Err(WalletError::UnsupportedVersion(2))
    ));

    let mut safe = TlWallet::new(WalletKind::SmartWallet, relay(), config()).unwrap();
    assert!(matches!(
        safe.load_from(&data).await,
        Err(WalletError::WrongWalletKind {
            expected: WalletKind::SmartWallet,
            actual: WalletKind::Identity
        })
    ));

    // another deployment derives other identities
    let other = config().with_identity_contracts(
        Address::repeat_byte(0x01),
        Address::zero(),
        PROXY_INIT_CODE,
    );
    assert!(matches!(
        TlWallet::from_wallet_data(&data, relay(), other).await,
        Err(WalletError::AddressMismatch { .. })
    ));
}

#[tokio::test]
async fn foreign_transactions_are_refused() {
    for kind in META_KINDS {
        let relay = relay();
        let wallet = recovered(kind, relay.clone()).await;
        let prepared = wallet
            .prepare_transaction(PendingTransaction::pay(Address::repeat_byte(0x11), 1u64))
            .await
            .unwrap();

        let mut tx = prepared.transaction;
        tx.from = Address::repeat_byte(0x44);
        match wallet.confirm(&tx).await {
            Err(WalletError::FromAddressMismatch { expected, actual }) => {
                assert_eq!(expected, wallet.address().await.unwrap());
                assert_eq!(actual, Address::repeat_byte(0x44));
            }
            res => panic!("{kind}: unexpected {res:?}"),
        }
        assert!(relay.submitted().is_empty());
    }
}

#[tokio::test]
async fn unsubmitted_transactions_are_not_found() {
    for kind in ALL_KINDS {
        let wallet = recovered(kind, relay()).await;
        let prepared = wallet
            .prepare_transaction(PendingTransaction::pay(Address::repeat_byte(0x11), 1u64))
            .await
            .unwrap();
        assert_eq!(
            wallet.get_transaction_status(prepared.transaction.into()).await.unwrap(),
            TransactionStatus::NotFound,
            "{kind}"
        );
        assert_eq!(
            wallet.get_transaction_status(StatusQuery::Hash(H256::zero())).await.unwrap(),
            TransactionStatus::NotFound
        );
    }
}

#[tokio::test]
async fn submitted_transactions_are_tracked_by_digest() {
    init_tracing();
    for kind in ALL_KINDS {
        let relay = relay();
        let wallet = recovered(kind, relay.clone()).await;
        let prepared = wallet
            .prepare_transaction(
                PendingTransaction::pay(Address::repeat_byte(0x11), U256::exp10(18))
                    .data(vec![0xa9, 0x05, 0x9c, 0xbb]),
            )
            .await
            .unwrap();
        let hash = wallet.confirm(&prepared.transaction).await.unwrap();
        assert_eq!(wallet.transaction_hash(&prepared.transaction).unwrap(), hash, "{kind}");

        relay.set_status(hash, TransactionStatus::Success);
        assert_eq!(
            wallet.get_transaction_status(prepared.transaction.clone().into()).await.unwrap(),
            TransactionStatus::Success
        );
        assert_eq!(relay.submitted()[0].hash(), hash);
    }
}

#[tokio::test]
async fn concurrent_confirms_on_one_wallet() {
    let relay = relay();
    let wallet = Arc::new(recovered(WalletKind::Identity, relay.clone()).await);
    let from = wallet.address().await.unwrap();

    let handles = (0..8u64)
        .map(|nonce| {
            let wallet = Arc::clone(&wallet);
            tokio::spawn(async move {
                let tx = PendingTransaction::pay(Address::repeat_byte(0x11), 1u64)
                    .from(from)
                    .nonce(nonce);
                let prepared = wallet.prepare_transaction(tx).await?;
                wallet.confirm(&prepared.transaction).await
            })
        })
        .collect::<Vec<_>>();

    let mut hashes = Vec::new();
    for handle in handles {
        hashes.push(handle.await.unwrap().unwrap());
    }
    hashes.sort();
    hashes.dedup();
    assert_eq!(hashes.len(), 8);
    assert_eq!(relay.submitted().len(), 8);
}

#[cfg(not(target_arch = "wasm32"))]
#[tokio::test]
async fn keystore_round_trip_reports_progress() {
    let wallet = recovered(WalletKind::SmartWallet, relay()).await;

    let progress = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&progress);
    let callback: ProgressCallback = Box::new(move |p: u8| sink.lock().unwrap().push(p));
    let json = wallet.encrypt_to_json("hunter2", Some(callback)).await.unwrap();

    let mut restored = TlWallet::new(WalletKind::SmartWallet, relay(), config()).unwrap();
    let sink = Arc::clone(&progress);
    let callback: ProgressCallback = Box::new(move |p: u8| sink.lock().unwrap().push(p));
    restored.recover_from_encrypted_json(&json, "hunter2", Some(callback)).await.unwrap();
    assert_eq!(restored.address().await.unwrap(), wallet.address().await.unwrap());
    assert_eq!(*progress.lock().unwrap(), vec![0, 100, 0, 100]);

    let mut wrong = TlWallet::new(WalletKind::SmartWallet, relay(), config()).unwrap();
    assert!(matches!(
        wrong.recover_from_encrypted_json(&json, "hunter3", None).await,
        Err(WalletError::KeyError(_))
    ));
}

#[tokio::test]
async fn message_hashes_are_signed_as_is() {
    let wallet = recovered(WalletKind::Identity, relay()).await;
    let digest = "0x1c8aff950685c2ed4bc3174f3472287b56d9517b9c948127319a09a7a36deac8";
    let signature = wallet.sign_msg_hash(digest).unwrap();
    let digest = trustlines::utils::parse_hash(digest).unwrap();
    assert_eq!(signature.recover(digest).unwrap(), wallet.controlling_address().unwrap());

    assert!(matches!(
        wallet.sign_msg_hash("0x1c8aff"),
        Err(WalletError::KeyError(KeyError::InvalidDigestLength(8)))
    ));
}

#[test]
fn unknown_nonce_mechanisms_are_rejected() {
    assert_eq!("random".parse::<NonceMechanism>().unwrap(), NonceMechanism::Random);
    assert!(matches!(
        "sequential".parse::<NonceMechanism>(),
        Err(WalletError::UnknownNonceMechanism(tag)) if tag == "sequential"
    ));
}

#[tokio::test]
async fn meta_transaction_digests_are_stable() {
    for (kind, expected) in [
        (WalletKind::Identity, "6a5731716d32c05eab9dc175389751e92efb4ff8d891ebb3586056bb86e5ecae"),
        (WalletKind::SmartWallet, "d5ad4f4cf97c5648327be0de18e8025154169b94f80112fe42fc88609a847e39"),
    ] {
        let relay = relay();
        let wallet = recovered(kind, relay.clone()).await;
        relay.set_nonce(wallet.address().await.unwrap(), 7u64);

        let prepared = wallet
            .prepare_transaction(
                PendingTransaction::pay(Address::repeat_byte(0x11), U256::exp10(18))
                    .data(vec![0xa9, 0x05, 0x9c, 0xbb]),
            )
            .await
            .unwrap();
        let hash = wallet.confirm(&prepared.transaction).await.unwrap();
        assert_eq!(hex::encode(hash), expected, "{kind}");
    }
}
