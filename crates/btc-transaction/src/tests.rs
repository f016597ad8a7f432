//! Tests for the btc-transaction crate.
//!
//! Covers parsing and serialization of legacy, segwit and coinbase
//! transactions, both signature digests, fee calculation, and end-to-end
//! verification of P2PKH, P2SH multisig, P2WPKH, P2SH-P2WPKH and P2WSH
//! spends.

use std::collections::HashMap;

use num_bigint::BigUint;

use btc_primitives::ec::{NonceSource, PrivateKey};
use btc_primitives::hash::{hash160, sha256};
use btc_primitives::Network;
use btc_script::opcodes::{OP_0, OP_CHECKSIG};
use btc_script::{Command, Script};

use crate::fetcher::TxFetcher;
use crate::input::TransactionInput;
use crate::output::TransactionOutput;
use crate::sighash::SIGHASH_ALL;
use crate::transaction::Transaction;
use crate::TransactionError;

// -----------------------------------------------------------------------
// Test vectors
// -----------------------------------------------------------------------

/// A mainnet P2PKH spend with a 40000 satoshi fee.
const KNOWN_TX_HEX: &str = "0100000001813f79011acb80925dfe69b3def355fe914bd1d96a3f5f71bf8303c6a989c7d1000000006b483045022100ed81ff192e75a3fd2304004dcadb746fa5e24c5031ccfcf21320b0277457c98f02207a986d955c6e0cb35d446a89d3f56100f4d7f67801c31967743a9c8e10615bed01210349fc4e631e3624a545de3f89f5d8684c7b8138bd94bdd531d2e213bf016b278afeffffff02a135ef01000000001976a914bc3b654dca7e56b04dca18f2566cdaf02e8d9ada88ac99c39800000000001976a9141c4bc762dd5423e332166702cb75f40df79fea1288ac19430600";
const KNOWN_TX_ID: &str = "452c629d67e41baec3ac6f04fe744b4b9617f8f859c63b3002f8684e7a4fee03";
const KNOWN_PREV_TXID: &str = "d1c789a9c60383bf715f3f6ad9d14b91fe55f3deb369fe5d9280cb1a01793f81";
const KNOWN_PREV_SCRIPT: &str = "76a914a802fc56c704ce87c42d7c92eb75e7896bdc41ae88ac";
const KNOWN_PREV_AMOUNT: u64 = 42505594;

/// A testnet spend of output 13 of `SPEND_PREV_TXID` to two addresses.
const UNSIGNED_SPEND_HEX: &str = "010000000199a24308080ab26e6fb65c4eccfadf76749bb5bfa8cb08f291320b3c21e56f0d0d00000000ffffffff02408af701000000001976a914d52ad7ca9b3d096a38e752c2018e6fbc40cdf26f88ac80969800000000001976a914507b27411ccf7f16f10297de6cef3f291623eddf88ac00000000";
/// `UNSIGNED_SPEND_HEX` signed by key 8675309 with a deterministic nonce.
const SIGNED_SPEND_HEX: &str = "010000000199a24308080ab26e6fb65c4eccfadf76749bb5bfa8cb08f291320b3c21e56f0d0d0000006b4830450221008ed46aa2cf12d6d81065bfabe903670165b538f65ee9a3385e6327d80c66d3b502203124f804410527497329ec4715e18558082d489b218677bd029e7fa306a72236012103935581e52c354cd2f484fe8ed83af7a3097005b2f9c60bff71d35bd795f54b67ffffffff02408af701000000001976a914d52ad7ca9b3d096a38e752c2018e6fbc40cdf26f88ac80969800000000001976a914507b27411ccf7f16f10297de6cef3f291623eddf88ac00000000";
const SPEND_PREV_TXID: &str = "0d6fe5213c0b3291f208cba8bfb59b7476dffacc4e5cb66f6eb20a080843a299";

/// The native P2WPKH example from BIP143, unsigned.
const BIP143_UNSIGNED_HEX: &str = "0100000002fff7f7881a8099afa6940d42d1e7f6362bec38171ea3edf433541db4e4ad969f0000000000eeffffffef51e1b804cc89d182d279655c3aa89e815b1b309fe287d9b2b55d57b90ec68a0100000000ffffffff02202cb206000000001976a9148280b37df378db99f66f85c95a783a76ac7a6d5988ac9093510d000000001976a9143bde42dbee7e4dbe6a21b2d50ce2f0167faa815988ac11000000";
const BIP143_PREV_TXID: &str = "8ac60eb9575db5b2d987e29f301b5b819ea83a5c6579d282d189cc04b8e151ef";
const BIP143_PRIVATE_KEY: &str = "619c335025c7f4012e556c2a58b2506e30b8511b53ade95ea316fd8c3286feb9";

/// Coinbase of block 465879.
const COINBASE_TX_HEX: &str = "01000000010000000000000000000000000000000000000000000000000000000000000000ffffffff5e03d71b07254d696e656420627920416e74506f6f6c20626a31312f4542312f4144362f43205914293101fabe6d6d678e2c8c34afc36896e7d9402824ed38e856676ee94bfdb0c6c4bcd8b2e5666a0400000000000000c7270000a5e00e00ffffffff01faf20b58000000001976a914338c84849423992471bffb1a54a8d9b1d69dc28a88ac00000000";

// -----------------------------------------------------------------------
// Helpers
// -----------------------------------------------------------------------

/// Serves prepared transactions under chosen ids without checking them,
/// standing in for previous transactions whose raw bytes are not at hand.
#[derive(Default)]
struct StubFetcher {
    txs: HashMap<String, Transaction>,
}

impl StubFetcher {
    fn with(mut self, txid: &str, tx: Transaction) -> Self {
        self.txs.insert(txid.to_string(), tx);
        self
    }
}

impl TxFetcher for StubFetcher {
    fn fetch(&self, txid: &str, network: Network) -> Result<Transaction, TransactionError> {
        self.txs
            .get(txid)
            .cloned()
            .map(|tx| tx.with_network(network))
            .ok_or_else(|| TransactionError::FetchError(format!("no transaction {}", txid)))
    }
}

/// A transaction whose output `index` pays `amount` to `script_pubkey`.
fn prev_tx_paying(index: u32, amount: u64, script_pubkey: Script) -> Transaction {
    let mut outputs = vec![TransactionOutput::new(0, Script::empty()); index as usize];
    outputs.push(TransactionOutput::new(amount, script_pubkey));
    Transaction::new(1, vec![TransactionInput::new([0x5a; 32], 0)], outputs, 0)
}

fn key(secret: u64) -> PrivateKey {
    PrivateKey::new(BigUint::from(secret)).expect("valid secret")
}

/// DER signature with the SIGHASH_ALL byte appended.
fn sign_digest(key: &PrivateKey, z: &BigUint) -> Vec<u8> {
    let mut sig = key
        .sign_with(z, NonceSource::Deterministic)
        .expect("signing succeeds")
        .der();
    sig.push(SIGHASH_ALL as u8);
    sig
}

fn known_fetcher(amount: u64) -> StubFetcher {
    let script = Script::from_hex(KNOWN_PREV_SCRIPT).expect("valid script");
    StubFetcher::default().with(KNOWN_PREV_TXID, prev_tx_paying(0, amount, script))
}

/// A one-input, one-output transaction spending `prev` output 0.
fn spend_of(prev: &Transaction, amount: u64) -> Transaction {
    let input = TransactionInput::from_txid(&prev.id(), 0).expect("valid txid");
    let output = TransactionOutput::new(amount, Script::p2pkh(&[0x33; 20]));
    Transaction::new(1, vec![input], vec![output], 0)
}

// -----------------------------------------------------------------------
// Parsing and serialization
// -----------------------------------------------------------------------

#[test]
fn test_parse_known_transaction() {
    let tx = Transaction::from_hex(KNOWN_TX_HEX).expect("should parse");

    assert_eq!(tx.version(), 1);
    assert_eq!(tx.inputs().len(), 1);
    assert_eq!(tx.outputs().len(), 2);
    assert_eq!(tx.locktime(), 410393);
    assert!(!tx.is_segwit());
    assert_eq!(tx.inputs()[0].prev_tx_hex(), KNOWN_PREV_TXID);
    assert_eq!(tx.inputs()[0].sequence, 0xfffffffe);
    assert_eq!(tx.outputs()[0].amount, 32454049);
    assert_eq!(tx.outputs()[1].amount, 10011545);
    assert_eq!(
        tx.outputs()[1].script_pubkey.to_hex(),
        "76a9141c4bc762dd5423e332166702cb75f40df79fea1288ac"
    );

    assert_eq!(tx.to_hex(), KNOWN_TX_HEX);
    assert_eq!(tx.to_bytes(), tx.to_bytes_legacy());
    assert_eq!(tx.to_string(), KNOWN_TX_HEX);
}

#[test]
fn test_transaction_id() {
    let tx = Transaction::from_hex(KNOWN_TX_HEX).expect("should parse");
    assert_eq!(tx.id(), KNOWN_TX_ID);
    assert_eq!(hex::encode(tx.hash()), KNOWN_TX_ID);
}

#[test]
fn test_malformed_encodings() {
    assert!(Transaction::from_hex("not hex").is_err());
    assert!(Transaction::from_bytes(&[]).is_err());

    let trailing = format!("{}00", KNOWN_TX_HEX);
    assert!(matches!(
        Transaction::from_hex(&trailing),
        Err(TransactionError::SerializationError(_))
    ));

    let truncated = &KNOWN_TX_HEX[..KNOWN_TX_HEX.len() - 8];
    assert!(Transaction::from_hex(truncated).is_err());

    // Segwit marker followed by a flag other than 0x01.
    let bad_flag = format!("0100000000{}", &BIP143_UNSIGNED_HEX[8..]);
    assert!(matches!(
        Transaction::from_hex(&bad_flag),
        Err(TransactionError::SerializationError(_))
    ));
}

#[test]
fn test_build_transaction_from_parts() {
    let input = TransactionInput::from_txid(SPEND_PREV_TXID, 13).expect("valid txid");
    let outputs = vec![
        TransactionOutput::new(
            33_000_000,
            Script::p2pkh_for_address("mzx5YhAH9kNHtcN481u6WkjeHjYtVeKVh2").expect("address"),
        ),
        TransactionOutput::new(
            10_000_000,
            Script::p2pkh_for_address("mnrVtF8DWjMu839VW3rBfgYaAfKk8983Xf").expect("address"),
        ),
    ];
    let tx = Transaction::new(1, vec![input], outputs, 0).with_network(Network::Testnet);

    assert_eq!(tx.to_hex(), UNSIGNED_SPEND_HEX);
    assert_eq!(tx.network(), Network::Testnet);
    assert_eq!(tx, Transaction::from_hex(UNSIGNED_SPEND_HEX).expect("should parse"));
}

// -----------------------------------------------------------------------
// Coinbase
// -----------------------------------------------------------------------

#[test]
fn test_coinbase_detection_and_height() {
    let tx = Transaction::from_hex(COINBASE_TX_HEX).expect("should parse coinbase");
    assert!(tx.is_coinbase());
    assert_eq!(tx.coinbase_height(), Some(465879));
    assert_eq!(tx.to_hex(), COINBASE_TX_HEX);

    let normal = Transaction::from_hex(KNOWN_TX_HEX).expect("should parse");
    assert!(!normal.is_coinbase());
    assert_eq!(normal.coinbase_height(), None);
}

#[test]
fn test_coinbase_requires_null_outpoint() {
    let zero_index = TransactionInput::new([0u8; 32], 0);
    let tx = Transaction::new(1, vec![zero_index], vec![], 0);
    assert!(!tx.is_coinbase());

    let null = TransactionInput::new([0u8; 32], 0xFFFF_FFFF);
    let two_inputs = Transaction::new(1, vec![null.clone(), null], vec![], 0);
    assert!(!two_inputs.is_coinbase());
}

#[test]
fn test_empty_unlocking_data_roundtrips() {
    let mut tx = Transaction::from_hex(KNOWN_TX_HEX).expect("should parse");
    tx.set_witness(0, Vec::new()).expect("set witness");
    tx.set_script_sig(0, Script::empty()).expect("set script sig");
    assert!(tx.inputs()[0].witness.is_none());
    assert!(tx.inputs()[0].script_sig.is_none());

    let reparsed = Transaction::from_bytes(&tx.to_bytes()).expect("should parse");
    assert_eq!(reparsed, tx);
    assert_eq!(reparsed.to_bytes(), tx.to_bytes());

    let mut input = TransactionInput::new([0x07; 32], 1);
    input.script_sig = Some(Script::empty());
    input.witness = Some(Vec::new());
    let built = Transaction::new(1, vec![input], vec![], 0);
    assert!(built.inputs()[0].script_sig.is_none());
    assert!(built.inputs()[0].witness.is_none());
    assert_eq!(Transaction::from_bytes(&built.to_bytes()).expect("should parse"), built);
}

// -----------------------------------------------------------------------
// Fee and legacy verification
// -----------------------------------------------------------------------

#[test]
fn test_known_transaction_fee() {
    let tx = Transaction::from_hex(KNOWN_TX_HEX).expect("should parse");
    let fetcher = known_fetcher(KNOWN_PREV_AMOUNT);
    assert_eq!(tx.fee(&fetcher).expect("fee"), 40000);
    assert_eq!(tx.total_output_amount(), u128::from(KNOWN_PREV_AMOUNT - 40000));
}

#[test]
fn test_fee_with_output_total_beyond_u64() {
    let prev = prev_tx_paying(0, 1000, Script::p2pkh(&[0x44; 20]));
    let fetcher = StubFetcher::default().with(&prev.id(), prev.clone());
    let input = TransactionInput::from_txid(&prev.id(), 0).expect("valid txid");
    let tx = Transaction::new(
        1,
        vec![input],
        vec![
            TransactionOutput::new(u64::MAX, Script::p2pkh(&[0x33; 20])),
            TransactionOutput::new(2, Script::p2pkh(&[0x33; 20])),
        ],
        0,
    );

    assert_eq!(tx.total_output_amount(), u128::from(u64::MAX) + 2);
    assert!(matches!(
        tx.fee(&fetcher),
        Err(TransactionError::InvalidTransaction(_))
    ));
    assert!(!tx.verify(&fetcher).expect("verify"));
}

#[test]
fn test_known_transaction_sig_hash() {
    let tx = Transaction::from_hex(KNOWN_TX_HEX).expect("should parse");
    let fetcher = known_fetcher(KNOWN_PREV_AMOUNT);
    let z = tx.sig_hash(0, None, &fetcher).expect("sig hash");
    assert_eq!(
        format!("{:064x}", z),
        "27e0c5994dec7824e56dec6b2fcb342eb7cdb0d0957c2fce9882f715e85d81a6"
    );
}

#[test]
fn test_known_transaction_verifies() {
    let _ = env_logger::builder().is_test(true).try_init();
    let tx = Transaction::from_hex(KNOWN_TX_HEX).expect("should parse");
    let fetcher = known_fetcher(KNOWN_PREV_AMOUNT);
    assert!(tx.verify_input(0, &fetcher).expect("verify input"));
    assert!(tx.verify(&fetcher).expect("verify"));
}

#[test]
fn test_negative_fee_fails_verification() {
    let tx = Transaction::from_hex(KNOWN_TX_HEX).expect("should parse");
    let fetcher = known_fetcher(1000);
    assert!(tx.fee(&fetcher).expect("fee") < 0);
    // The signature does not commit to the amount, so the input alone still passes.
    assert!(tx.verify_input(0, &fetcher).expect("verify input"));
    assert!(!tx.verify(&fetcher).expect("verify"));
}

#[test]
fn test_altered_output_fails_verification() {
    let tx = Transaction::from_hex(KNOWN_TX_HEX).expect("should parse");
    let mut outputs = tx.outputs().to_vec();
    outputs[0].amount -= 1;
    let altered = Transaction::new(tx.version(), tx.inputs().to_vec(), outputs, tx.locktime());

    let fetcher = known_fetcher(KNOWN_PREV_AMOUNT);
    assert!(!altered.verify_input(0, &fetcher).expect("verify input"));
    assert!(!altered.verify(&fetcher).expect("verify"));
}

#[test]
fn test_fetch_failures_propagate() {
    let tx = Transaction::from_hex(KNOWN_TX_HEX).expect("should parse");

    let empty = StubFetcher::default();
    assert!(matches!(tx.verify(&empty), Err(TransactionError::FetchError(_))));

    let too_few_outputs = StubFetcher::default().with(
        KNOWN_PREV_TXID,
        Transaction::new(1, vec![TransactionInput::new([1; 32], 0)], vec![], 0),
    );
    assert!(matches!(
        tx.verify_input(0, &too_few_outputs),
        Err(TransactionError::PreviousOutputMissing { index: 0, .. })
    ));

    let fetcher = known_fetcher(KNOWN_PREV_AMOUNT);
    assert!(matches!(
        tx.verify_input(1, &fetcher),
        Err(TransactionError::InputIndexOutOfRange { index: 1, count: 1 })
    ));
}

// -----------------------------------------------------------------------
// Signing
// -----------------------------------------------------------------------

fn spend_fetcher() -> StubFetcher {
    let script = Script::p2pkh(&key(8675309).point().hash160(true));
    StubFetcher::default().with(SPEND_PREV_TXID, prev_tx_paying(13, 50_000_000, script))
}

#[test]
fn test_sign_input_deterministic() {
    let mut tx = Transaction::from_hex(UNSIGNED_SPEND_HEX)
        .expect("should parse")
        .with_network(Network::Testnet);
    let fetcher = spend_fetcher();

    let ok = tx
        .sign_input_with(0, &key(8675309), &fetcher, NonceSource::Deterministic)
        .expect("signing");
    assert!(ok);
    assert_eq!(tx.to_hex(), SIGNED_SPEND_HEX);

    let reparsed = Transaction::from_hex(SIGNED_SPEND_HEX).expect("should parse");
    assert_eq!(reparsed, tx);
    assert!(reparsed.verify(&fetcher).expect("verify"));
}

#[test]
fn test_sign_input_random_nonce() {
    let mut tx = Transaction::from_hex(UNSIGNED_SPEND_HEX).expect("should parse");
    let fetcher = spend_fetcher();
    assert!(tx.sign_input(0, &key(8675309), &fetcher).expect("signing"));
    assert!(tx.verify(&fetcher).expect("verify"));
}

#[test]
fn test_sign_input_with_wrong_key() {
    let mut tx = Transaction::from_hex(UNSIGNED_SPEND_HEX).expect("should parse");
    let fetcher = spend_fetcher();
    let ok = tx
        .sign_input_with(0, &key(12345), &fetcher, NonceSource::Deterministic)
        .expect("signing");
    assert!(!ok);
}

// -----------------------------------------------------------------------
// P2SH
// -----------------------------------------------------------------------

#[test]
fn test_p2sh_multisig_spend() {
    let keys = [key(1001), key(1002), key(1003)];
    let points: Vec<_> = keys.iter().map(|k| k.point().clone()).collect();
    let redeem = Script::multisig(2, &points, true).expect("multisig");
    let script_pubkey = Script::p2sh(&hash160(&redeem.to_bytes()));
    let prev = prev_tx_paying(0, 100_000, script_pubkey);
    let fetcher = StubFetcher::default().with(&prev.id(), prev.clone());

    let mut tx = spend_of(&prev, 90_000);
    let z = tx.sig_hash(0, Some(&redeem), &fetcher).expect("sig hash");
    let script_sig = Script::new(vec![
        Command::Opcode(OP_0),
        Command::push(sign_digest(&keys[0], &z)),
        Command::push(sign_digest(&keys[2], &z)),
        Command::push(redeem.to_bytes()),
    ])
    .expect("script sig");
    tx.set_script_sig(0, script_sig).expect("set script sig");

    assert!(tx.verify_input(0, &fetcher).expect("verify input"));
    assert!(tx.verify(&fetcher).expect("verify"));
}

#[test]
fn test_p2sh_wrong_redeem_script_fails() {
    let redeem = Script::multisig(1, &[key(1001).point().clone()], true).expect("multisig");
    let other = Script::multisig(1, &[key(1002).point().clone()], true).expect("multisig");
    let prev = prev_tx_paying(0, 100_000, Script::p2sh(&hash160(&redeem.to_bytes())));
    let fetcher = StubFetcher::default().with(&prev.id(), prev.clone());

    let mut tx = spend_of(&prev, 90_000);
    let z = tx.sig_hash(0, Some(&other), &fetcher).expect("sig hash");
    let script_sig = Script::new(vec![
        Command::Opcode(OP_0),
        Command::push(sign_digest(&key(1002), &z)),
        Command::push(other.to_bytes()),
    ])
    .expect("script sig");
    tx.set_script_sig(0, script_sig).expect("set script sig");

    assert!(!tx.verify_input(0, &fetcher).expect("verify input"));
}

// -----------------------------------------------------------------------
// Segwit
// -----------------------------------------------------------------------

fn bip143_fetcher() -> StubFetcher {
    let key = PrivateKey::from_hex(BIP143_PRIVATE_KEY).expect("valid key");
    let script = Script::p2wpkh(&key.point().hash160(true));
    StubFetcher::default().with(BIP143_PREV_TXID, prev_tx_paying(1, 600_000_000, script))
}

#[test]
fn test_bip143_p2wpkh_sig_hash() {
    let tx = Transaction::from_hex(BIP143_UNSIGNED_HEX).expect("should parse");
    let fetcher = bip143_fetcher();
    let z = tx.sig_hash_bip143(1, None, None, &fetcher).expect("sig hash");
    assert_eq!(
        format!("{:064x}", z),
        "c37af31116d1b27caf68aae9e3ac82f1477929014d5b917657d0eb49478cb670"
    );
}

#[test]
fn test_bip143_public_key() {
    let key = PrivateKey::from_hex(BIP143_PRIVATE_KEY).expect("valid key");
    assert_eq!(
        hex::encode(key.point().sec(true)),
        "025476c2e83188368da1ff3e292e7acafcdb3566bb0ad253f62fc70f07aeee6357"
    );
    assert_eq!(
        hex::encode(key.point().hash160(true)),
        "1d0f172a0ecb48aee1be1f2687d2963ae33f71a1"
    );
}

#[test]
fn test_p2wpkh_spend_verifies() {
    let mut tx = Transaction::from_hex(BIP143_UNSIGNED_HEX).expect("should parse");
    let unsigned_id = tx.id();
    let fetcher = bip143_fetcher();
    let key = PrivateKey::from_hex(BIP143_PRIVATE_KEY).expect("valid key");

    let z = tx.sig_hash_bip143(1, None, None, &fetcher).expect("sig hash");
    tx.set_witness(1, vec![sign_digest(&key, &z), key.point().sec(true)])
        .expect("set witness");

    assert!(tx.is_segwit());
    assert!(tx.verify_input(1, &fetcher).expect("verify input"));
    assert_eq!(tx.id(), unsigned_id);

    let bytes = tx.to_bytes();
    assert_eq!(&bytes[4..6], &[0x00, 0x01]);
    assert_eq!(tx.to_bytes_legacy(), hex::decode(BIP143_UNSIGNED_HEX).expect("hex"));

    let reparsed = Transaction::from_bytes(&bytes).expect("should parse segwit");
    assert_eq!(reparsed, tx);
    assert!(reparsed.inputs()[0].witness.is_none());
    assert_eq!(reparsed.inputs()[1].witness.as_ref().map(Vec::len), Some(2));
}

#[test]
fn test_p2wpkh_bad_signature_fails() {
    let mut tx = Transaction::from_hex(BIP143_UNSIGNED_HEX).expect("should parse");
    let fetcher = bip143_fetcher();
    let key = PrivateKey::from_hex(BIP143_PRIVATE_KEY).expect("valid key");

    // Signed over the legacy digest instead of the BIP143 one.
    let wrong_z = BigUint::from(42u32);
    tx.set_witness(1, vec![sign_digest(&key, &wrong_z), key.point().sec(true)])
        .expect("set witness");
    assert!(!tx.verify_input(1, &fetcher).expect("verify input"));
}

#[test]
fn test_p2sh_p2wpkh_spend_verifies() {
    let key = key(4242);
    let redeem = Script::p2wpkh(&key.point().hash160(true));
    let prev = prev_tx_paying(0, 75_000, Script::p2sh(&hash160(&redeem.to_bytes())));
    let fetcher = StubFetcher::default().with(&prev.id(), prev.clone());

    let mut tx = spend_of(&prev, 70_000);
    tx.set_script_sig(0, Script::new(vec![Command::push(redeem.to_bytes())]).expect("script"))
        .expect("set script sig");
    let z = tx.sig_hash_bip143(0, Some(&redeem), None, &fetcher).expect("sig hash");
    tx.set_witness(0, vec![sign_digest(&key, &z), key.point().sec(true)])
        .expect("set witness");

    assert!(tx.verify_input(0, &fetcher).expect("verify input"));
    assert!(tx.verify(&fetcher).expect("verify"));
}

#[test]
fn test_p2wsh_spend_verifies() {
    let key = key(777);
    let witness_script = Script::new(vec![
        Command::push(key.point().sec(true)),
        Command::Opcode(OP_CHECKSIG),
    ])
    .expect("witness script");
    let prev = prev_tx_paying(0, 20_000, Script::p2wsh(&sha256(&witness_script.to_bytes())));
    let fetcher = StubFetcher::default().with(&prev.id(), prev.clone());

    let mut tx = spend_of(&prev, 19_000);
    let z = tx
        .sig_hash_bip143(0, None, Some(&witness_script), &fetcher)
        .expect("sig hash");
    tx.set_witness(0, vec![sign_digest(&key, &z), witness_script.to_bytes()])
        .expect("set witness");

    assert!(tx.verify_input(0, &fetcher).expect("verify input"));
    assert!(tx.verify(&fetcher).expect("verify"));
}

#[test]
fn test_p2wsh_mismatched_witness_script_fails() {
    let key = key(777);
    let committed = Script::new(vec![
        Command::push(key.point().sec(true)),
        Command::Opcode(OP_CHECKSIG),
    ])
    .expect("witness script");
    let substituted = Script::new(vec![Command::push_int(1)]).expect("script");
    let prev = prev_tx_paying(0, 20_000, Script::p2wsh(&sha256(&committed.to_bytes())));
    let fetcher = StubFetcher::default().with(&prev.id(), prev.clone());

    let mut tx = spend_of(&prev, 19_000);
    tx.set_witness(0, vec![substituted.to_bytes()]).expect("set witness");
    assert!(!tx.verify_input(0, &fetcher).expect("verify input"));

    let mut bare = spend_of(&prev, 19_000);
    assert!(!bare.verify_input(0, &fetcher).expect("verify input"));
    bare.set_witness(0, Vec::new()).expect("set witness");
    assert!(!bare.verify_input(0, &fetcher).expect("verify input"));
}
