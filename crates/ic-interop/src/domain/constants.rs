//! Protocol constants.

use super::errors::Hash;

/// Name of the interoperability module.
pub const MODULE_NAME_INTEROPERABILITY: &str = "interoperability";

/// Built-in cross-chain command: channel registration handshake.
pub const CROSS_CHAIN_COMMAND_REGISTRATION: &str = "registration";
/// Built-in cross-chain command: the sending chain closed the channel.
pub const CROSS_CHAIN_COMMAND_CHANNEL_TERMINATED: &str = "channelTerminated";
/// Built-in cross-chain command: the mainchain reports a terminated sidechain.
pub const CROSS_CHAIN_COMMAND_SIDECHAIN_TERMINATED: &str = "sidechainTerminated";

/// CCU carrying mainchain messages, submitted on a sidechain.
pub const COMMAND_SUBMIT_MAINCHAIN_CCU: &str = "submitMainchainCrossChainUpdate";
/// CCU carrying sidechain messages, submitted on the mainchain.
pub const COMMAND_SUBMIT_SIDECHAIN_CCU: &str = "submitSidechainCrossChainUpdate";
/// Register a sidechain on the mainchain.
pub const COMMAND_REGISTER_SIDECHAIN: &str = "registerSidechain";
/// Register the mainchain on a sidechain.
pub const COMMAND_REGISTER_MAINCHAIN: &str = "registerMainchain";
/// Terminate a sidechain that stopped certifying.
pub const COMMAND_TERMINATE_SIDECHAIN_FOR_LIVENESS: &str = "terminateSidechainForLiveness";
/// Prove a terminated sidechain's account against the mainchain.
pub const COMMAND_INITIALIZE_STATE_RECOVERY: &str = "initializeStateRecovery";
/// Recover module state of a terminated chain.
pub const COMMAND_RECOVER_STATE: &str = "recoverState";

/// Name of the mainchain as registered on sidechains.
pub const MAINCHAIN_NAME: &str = "mainchain";

/// Chain ID length in bytes.
pub const CHAIN_ID_LENGTH: usize = 4;
/// Hash length in bytes.
pub const HASH_LENGTH: usize = 32;
/// Compressed BLS public key length.
pub const BLS_PUBLIC_KEY_LENGTH: usize = 48;
/// Compressed BLS signature length.
pub const BLS_SIGNATURE_LENGTH: usize = 96;
/// Token ID length.
pub const TOKEN_ID_LENGTH: usize = 8;
/// Longest accepted chain name.
pub const MAX_CHAIN_NAME_LENGTH: usize = 40;
/// Longest module or cross-chain command name inside a CCM.
pub const MAX_MODULE_NAME_LENGTH: usize = 32;
/// Encoded CCM size limit.
pub const MAX_CCM_SIZE: usize = 10_240;
/// Largest validator set.
pub const MAX_NUM_VALIDATORS: usize = 199;
/// Seconds without a certificate after which a chain is no longer live.
pub const LIVENESS_LIMIT: u64 = 2_592_000;
/// Default return fee per CCM byte for new channels.
pub const MIN_RETURN_FEE_PER_BYTE: u64 = 1_000;
/// Default fee token of new channels.
pub const DEFAULT_MESSAGE_FEE_TOKEN_ID: [u8; TOKEN_ID_LENGTH] = [0; TOKEN_ID_LENGTH];

/// Domain tag of certificate signatures.
pub const MESSAGE_TAG_CERTIFICATE: &str = "IC_CE_";
/// Domain tag of mainchain registration signatures.
pub const MESSAGE_TAG_CHAIN_REG: &str = "IC_CHAIN_REG_";

/// Characters allowed in chain names.
pub const CHAIN_NAME_ALPHABET: &str = "abcdefghijklmnopqrstuvwxyz0123456789!@$&_.";

/// SHA-256 of the empty string.
pub const EMPTY_HASH: Hash = [
    0xe3, 0xb0, 0xc4, 0x42, 0x98, 0xfc, 0x1c, 0x14, 0x9a, 0xfb, 0xf4, 0xc8, 0x99, 0x6f, 0xb9, 0x24,
    0x27, 0xae, 0x41, 0xe4, 0x64, 0x9b, 0x93, 0x4c, 0xa4, 0x95, 0x99, 0x1b, 0x78, 0x52, 0xb8, 0x55,
];

/// Leaf value written over a recovered store entry. Has no known preimage,
/// so a second proof of the same entry fails.
pub const RECOVERED_STORE_VALUE: Hash = [0x01; 32];

/// Substore prefixes of the interoperability module.
pub const SUBSTORE_PREFIX_OUTBOX_ROOT: [u8; 2] = [0x00, 0x00];
/// Chain accounts.
pub const SUBSTORE_PREFIX_CHAIN_ACCOUNT: [u8; 2] = [0x80, 0x00];
/// Own chain account.
pub const SUBSTORE_PREFIX_OWN_CHAIN: [u8; 2] = [0x90, 0x00];
/// Channels.
pub const SUBSTORE_PREFIX_CHANNEL: [u8; 2] = [0xa0, 0x00];
/// Chain validators.
pub const SUBSTORE_PREFIX_CHAIN_VALIDATORS: [u8; 2] = [0xb0, 0x00];
/// Terminated-state accounts.
pub const SUBSTORE_PREFIX_TERMINATED_STATE: [u8; 2] = [0xc0, 0x00];
/// Terminated-outbox accounts.
pub const SUBSTORE_PREFIX_TERMINATED_OUTBOX: [u8; 2] = [0xd0, 0x00];
/// Registered chain names.
pub const SUBSTORE_PREFIX_REGISTERED_NAMES: [u8; 2] = [0xe0, 0x00];
