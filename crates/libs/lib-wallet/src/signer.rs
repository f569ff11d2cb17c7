//! # Capability-Gated Signing
//!
//! Builders for the three signing shapes (one transaction, a batch, a message). Each takes
//! the adapter's capability, a connection check and an error sink, and returns a callable.
//!
//! - Disconnected: the callable fails at once with [`WalletError::NotConnected`], reported
//!   through the sink. The adapter is never invoked.
//! - Connected: the callable defers to the adapter and forwards its result or failure
//!   untouched.
//!
//! The connection check runs on every call, so a callable kept past a disconnect stops
//! reaching the adapter. Whether the adapter supports a shape at all is decided by the caller
//! before building.

use crate::adapter::{BatchTransactionSigner, MessageSigner, TransactionSigner, WalletTransaction};
use futures::future::{self, BoxFuture, FutureExt};
use lib_core::WalletError;
use std::sync::Arc;

/// Destination for errors that should become visible in coordinator state.
pub trait ErrorSink: Send + Sync {
    /// Record `error` and hand it back for propagation.
    fn report(&self, error: WalletError) -> WalletError;
}

/// Answers whether the signing wallet is connected at this moment.
pub type ConnectedCheck = Arc<dyn Fn() -> bool + Send + Sync>;

pub type SignFuture<T> = BoxFuture<'static, Result<T, WalletError>>;

pub type SignTransactionFn =
    Arc<dyn Fn(WalletTransaction) -> SignFuture<WalletTransaction> + Send + Sync>;

pub type SignAllTransactionsFn =
    Arc<dyn Fn(Vec<WalletTransaction>) -> SignFuture<Vec<WalletTransaction>> + Send + Sync>;

pub type SignMessageFn = Arc<dyn Fn(Vec<u8>) -> SignFuture<Vec<u8>> + Send + Sync>;

fn not_connected<T: Send + 'static>(sink: &dyn ErrorSink) -> SignFuture<T> {
    let error = sink.report(WalletError::NotConnected);
    future::ready(Err(error)).boxed()
}

pub fn sign_transaction(
    signer: Arc<dyn TransactionSigner>,
    connected: ConnectedCheck,
    sink: Arc<dyn ErrorSink>,
) -> SignTransactionFn {
    Arc::new(move |transaction: WalletTransaction| {
        if !connected() {
            return not_connected(sink.as_ref());
        }
        let signer = Arc::clone(&signer);
        async move { signer.sign_transaction(transaction).await }.boxed()
    })
}

pub fn sign_all_transactions(
    signer: Arc<dyn BatchTransactionSigner>,
    connected: ConnectedCheck,
    sink: Arc<dyn ErrorSink>,
) -> SignAllTransactionsFn {
    Arc::new(move |transactions: Vec<WalletTransaction>| {
        if !connected() {
            return not_connected(sink.as_ref());
        }
        let signer = Arc::clone(&signer);
        async move { signer.sign_all_transactions(transactions).await }.boxed()
    })
}

pub fn sign_message(
    signer: Arc<dyn MessageSigner>,
    connected: ConnectedCheck,
    sink: Arc<dyn ErrorSink>,
) -> SignMessageFn {
    Arc::new(move |message: Vec<u8>| {
        if !connected() {
            return not_connected(sink.as_ref());
        }
        let signer = Arc::clone(&signer);
        async move { signer.sign_message(message).await }.boxed()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockAdapter, RecordingSink};
    use solana_sdk::transaction::Transaction;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn fixed(connected: bool) -> ConnectedCheck {
        Arc::new(move || connected)
    }

    #[tokio::test]
    async fn test_disconnected_fails_without_touching_adapter() {
        let mock = MockAdapter::new("Phantom");
        let sink = Arc::new(RecordingSink::default());

        let sign = sign_message(mock.clone(), fixed(false), sink.clone());
        let result = sign(b"hello".to_vec()).await;

        assert_eq!(result, Err(WalletError::NotConnected));
        assert_eq!(mock.calls().sign_message, 0);
        assert_eq!(sink.errors(), vec![WalletError::NotConnected]);
    }

    #[tokio::test]
    async fn test_connected_forwards_result() {
        let mock = MockAdapter::new("Phantom");
        let sink = Arc::new(RecordingSink::default());

        let sign = sign_message(mock.clone(), fixed(true), sink.clone());
        let signature = sign(b"hello".to_vec()).await.unwrap();
        assert_eq!(signature, b"olleh".to_vec());

        let sign = sign_transaction(mock.clone(), fixed(true), sink.clone());
        let tx = WalletTransaction::from(Transaction::default());
        assert_eq!(sign(tx.clone()).await, Ok(tx.clone()));

        let sign = sign_all_transactions(mock.clone(), fixed(true), sink.clone());
        assert_eq!(sign(vec![tx.clone(), tx]).await.unwrap().len(), 2);

        let calls = mock.calls();
        assert_eq!(calls.sign_message, 1);
        assert_eq!(calls.sign_transaction, 1);
        assert_eq!(calls.sign_all_transactions, 1);
        assert!(sink.errors().is_empty());
    }

    #[tokio::test]
    async fn test_connection_is_checked_on_every_call() {
        let mock = MockAdapter::new("Phantom");
        let sink = Arc::new(RecordingSink::default());
        let flag = Arc::new(AtomicBool::new(true));
        let live = Arc::clone(&flag);

        let sign = sign_transaction(
            mock.clone(),
            Arc::new(move || live.load(Ordering::SeqCst)),
            sink.clone(),
        );
        let tx = WalletTransaction::from(Transaction::default());
        assert!(sign(tx.clone()).await.is_ok());

        flag.store(false, Ordering::SeqCst);
        assert_eq!(sign(tx).await, Err(WalletError::NotConnected));
        assert_eq!(mock.calls().sign_transaction, 1);
        assert_eq!(sink.errors(), vec![WalletError::NotConnected]);
    }

    #[tokio::test]
    async fn test_adapter_failure_is_forwarded_without_sink() {
        let mock = MockAdapter::new("Phantom");
        mock.fail_signing(WalletError::SignTransaction("User rejected the request".to_string()));
        let sink = Arc::new(RecordingSink::default());

        let sign = sign_transaction(mock.clone(), fixed(true), sink.clone());
        let result = sign(Transaction::default().into()).await;

        assert_eq!(
            result,
            Err(WalletError::SignTransaction("User rejected the request".to_string()))
        );
        assert!(sink.errors().is_empty());
    }
}
