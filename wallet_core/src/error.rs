use thiserror::Error;

use tzwallet_bakers::DirectoryError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    #[error("baker directory error: {0}")]
    Directory(#[from] DirectoryError),
}
