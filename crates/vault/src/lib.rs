pub mod crypto;
pub mod vault;

pub use crypto::{
    decrypt_value, encrypt_value, is_encrypted, parse_master_key, CryptoError, ExposeSecret,
    MasterKey, PayloadEncryptor, Secret, SecretString,
};
pub use vault::{Vault, VaultError};
