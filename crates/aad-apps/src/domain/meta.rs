//! # Application Metadata
//!
//! Identity of a deployed application, recovered from its confirmed create
//! transaction.

use aad_types::{Address, PendingTransactionInfo};

use crate::errors::AppError;

/// A deployed application's id and escrow address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AppMeta {
    /// Application id.
    pub app_id: u64,
    /// Address derived from `app_id`.
    pub address: Address,
}

impl AppMeta {
    /// Metadata of application `app_id`.
    #[must_use]
    pub fn new(app_id: u64) -> Self {
        Self {
            app_id,
            address: Address::for_application(app_id),
        }
    }

    /// Extracts the created application from a confirmed create transaction.
    ///
    /// # Errors
    ///
    /// * `MalformedResult` - the result carries no `application-index`
    pub fn from_result(result: &PendingTransactionInfo) -> Result<Self, AppError> {
        result.application_index.map(Self::new).ok_or_else(|| {
            AppError::MalformedResult("confirmed transaction has no application-index".into())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_zero_address() {
        assert_eq!(
            AppMeta::new(0).address.to_string(),
            "6X7XJO6FX3SHUK2OUL46QBQDSNO67RAFK6O73KJD4IVOMTSOIYANOIVWNU"
        );
    }

    #[test]
    fn test_from_confirmed_result() {
        let info: PendingTransactionInfo = serde_json::from_value(serde_json::json!({
            "application-index": 12,
            "confirmed-round": 40,
            "pool-error": ""
        }))
        .unwrap();
        let meta = AppMeta::from_result(&info).unwrap();
        assert_eq!(meta.app_id, 12);
        assert_eq!(meta.address, Address::for_application(12));
    }

    #[test]
    fn test_missing_application_index() {
        let info = PendingTransactionInfo {
            confirmed_round: Some(40),
            ..PendingTransactionInfo::default()
        };
        assert!(matches!(
            AppMeta::from_result(&info),
            Err(AppError::MalformedResult(_))
        ));
    }
}
