//! Deterministic addresses of wallet contracts.
//!
//! Both account contracts are deployed through CREATE2, so their addresses are known
//! before deployment. These functions are pure and never touch the network.
use crate::WalletError;
use trustlines_core::{
    abi::{encode, Token},
    types::{Address, Bytes, H256, U256},
    utils::{get_create2_address, id, keccak256, parse_address, to_checksum},
};

/// Creation code of the smart-wallet proxy (Safe 1.3.0 `GnosisSafeProxy`), without its
/// `address singleton` constructor argument
pub const SAFE_PROXY_CREATION_CODE: &str = "0x608060405234801561001057600080fd5b506040516101e63803806101e68339818101604052602081101561003357600080fd5b8101908080519060200190929190505050600073ffffffffffffffffffffffffffffffffffffffff168173ffffffffffffffffffffffffffffffffffffffff1614156100ca576040517f08c379a00000000000000000000000000000000000000000000000000000000081526004018080602001828103825260228152602001806101c46022913960400191505060405180910390fd5b806000806101000a81548173ffffffffffffffffffffffffffffffffffffffff021916908373ffffffffffffffffffffffffffffffffffffffff1602179055505060ab806101196000396000f3fe608060405273ffffffffffffffffffffffffffffffffffffffff600054167fa619486e0000000000000000000000000000000000000000000000000000000060003514156050578060005260206000f35b3660008037600080366000845af43d6000803e60008114156070573d6000fd5b3d6000f3fea2646970667358221220d1429297349653a4918076d650332de1a1068c5f3e07c5c82360c277770b955264736f6c63430007060033496e76616c69642073696e676c65746f6e20616464726573732070726f7669646564";

/// Safe 1.3.0 singleton
pub const DEFAULT_SAFE_SINGLETON: &str = "0xd9Db270c1B5E3Bd161E8c8503c55cEABeE709552";

/// Safe 1.3.0 proxy factory
pub const DEFAULT_SAFE_PROXY_FACTORY: &str = "0xa6B71E26C5e0845f74c812102Ca7114b6a896AB2";

const SAFE_SETUP_SIGNATURE: &str =
    "setup(address[],uint256,address,bytes,address,address,uint256,address)";

/// Checksummed address of the identity proxy `factory` deploys for `owner` from
/// `proxy_init_code`, the creation code of the deployment's identity proxy without its
/// `address owner` constructor argument.
///
/// Fails with an invalid address error if either address is not a 20-byte hex address.
///
/// ```
/// use trustlines_wallets::address::proxy_identity_address;
///
/// let a = proxy_identity_address(
///     "0x3daB9C8301FC109Fd7bb5C81B5ea4413ef692634",
///     "0x2c7536E3605D9C16a7a3D7b1898e529396a65c23",
///     &[0x60, 0x80, 0x60, 0x40, 0x52],
/// )?;
/// let b = proxy_identity_address(
///     "0x3daB9C8301FC109Fd7bb5C81B5ea4413ef692634",
///     "0x2c7536E3605D9C16a7a3D7b1898e529396a65c23",
///     &[0x60, 0x80, 0x60, 0x40, 0x52, 0x00],
/// )?;
/// assert_ne!(a, b);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn proxy_identity_address(
    factory: &str,
    owner: &str,
    proxy_init_code: &[u8],
) -> Result<String, WalletError> {
    let address = compute_proxy_identity_address(
        parse_address(factory)?,
        parse_address(owner)?,
        proxy_init_code,
    );
    Ok(to_checksum(&address, None))
}

/// Checksummed counterfactual address of the single-owner smart wallet of `owner`, using
/// the default proxy creation code and a zero salt nonce.
pub fn smart_wallet_address(
    owner: &str,
    singleton: &str,
    proxy_factory: &str,
) -> Result<String, WalletError> {
    let creation_code = decode_code(SAFE_PROXY_CREATION_CODE);
    let address = compute_smart_wallet_address(
        parse_address(owner)?,
        parse_address(singleton)?,
        parse_address(proxy_factory)?,
        &creation_code,
        U256::zero(),
    );
    Ok(to_checksum(&address, None))
}

/// `keccak256(0xff ‖ factory ‖ 0 ‖ keccak256(initCode ‖ abi.encode(owner)))[12..]`
pub fn compute_proxy_identity_address(
    factory: Address,
    owner: Address,
    proxy_init_code: &[u8],
) -> Address {
    get_create2_address(factory, H256::zero(), identity_init_code(proxy_init_code, owner))
}

/// Full creation code of the identity proxy of `owner`, as the factory deploys it
pub fn identity_init_code(proxy_init_code: &[u8], owner: Address) -> Bytes {
    [proxy_init_code, &encode(&[Token::Address(owner)])].concat().into()
}

/// The address `proxy_factory.createProxyWithNonce(singleton, initializer, salt_nonce)`
/// deploys the smart wallet of `owner` at.
///
/// The CREATE2 salt is `keccak256(keccak256(initializer) ‖ uint256(salt_nonce))`, the init
/// code is `creation_code ‖ abi.encode(singleton)`.
pub fn compute_smart_wallet_address(
    owner: Address,
    singleton: Address,
    proxy_factory: Address,
    creation_code: &[u8],
    salt_nonce: U256,
) -> Address {
    let initializer = safe_setup_initializer(owner);

    let mut salt_preimage = keccak256(initializer.as_ref()).to_vec();
    salt_preimage.extend_from_slice(&encode(&[Token::Uint(salt_nonce)]));
    let salt = keccak256(salt_preimage);

    let init_code = [creation_code, &encode(&[Token::Address(singleton)])].concat();
    get_create2_address(proxy_factory, salt, init_code)
}

/// Calldata of `setup([owner], 1, 0x0, "", 0x0, 0x0, 0, 0x0)` on the singleton
pub fn safe_setup_initializer(owner: Address) -> Bytes {
    let params = encode(&[
        Token::Array(vec![Token::Address(owner)]),
        Token::Uint(U256::one()),
        Token::Address(Address::zero()),
        Token::Bytes(Vec::new()),
        Token::Address(Address::zero()),
        Token::Address(Address::zero()),
        Token::Uint(U256::zero()),
        Token::Address(Address::zero()),
    ]);
    [&id(SAFE_SETUP_SIGNATURE)[..], &params].concat().into()
}

pub(crate) fn decode_code(code: &'static str) -> Vec<u8> {
    hex::decode(code.trim_start_matches("0x"))
        .unwrap_or_else(|_| unreachable!("bundled contract code is valid hex"))
}
