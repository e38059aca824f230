//! Trait definition for pluggable content sources.
//!
//! Each source (a search backend, a documentation index, a feed reader)
//! implements [`SourceConnector`] so the coordinator can query them
//! uniformly and concurrently.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::SourceError;
use crate::types::{DiscoveryOptions, DiscoveryResponse};

/// A pluggable content source.
///
/// Implementors are stored behind `Arc<dyn SourceConnector>` in the registry
/// and called from their own tokio task, so they must be `Send + Sync`.
///
/// # Cancellation
///
/// The coordinator cancels `cancel` when the source's timeout expires and
/// stops waiting for the result. Implementations should watch the token
/// (for example with `tokio::select!`) and return early once it fires;
/// an implementation that ignores it keeps running in the background until
/// it finishes on its own.
#[async_trait]
pub trait SourceConnector: Send + Sync {
    /// Discover content matching `query`.
    ///
    /// An ordinary "nothing found" must be `Ok` with no items.
    ///
    /// # Errors
    ///
    /// Any error is treated as a hard failure of this source for the
    /// current call; the coordinator records it and carries on with the
    /// remaining sources.
    async fn discover(
        &self,
        query: &str,
        options: &DiscoveryOptions,
        cancel: CancellationToken,
    ) -> Result<DiscoveryResponse, SourceError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ContentItem;
    use std::sync::Arc;

    /// A mock connector for testing trait bounds and async execution.
    struct MockConnector {
        items: Vec<ContentItem>,
        fail: bool,
    }

    #[async_trait]
    impl SourceConnector for MockConnector {
        async fn discover(
            &self,
            _query: &str,
            options: &DiscoveryOptions,
            _cancel: CancellationToken,
        ) -> Result<DiscoveryResponse, SourceError> {
            if self.fail {
                return Err(SourceError::Connector("mock connector failure".into()));
            }
            let limit = options.max_results.unwrap_or(usize::MAX);
            Ok(DiscoveryResponse::from_items(
                self.items.iter().take(limit).cloned().collect(),
            ))
        }
    }

    #[test]
    fn connector_is_object_safe_and_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn SourceConnector>();
        let _boxed: Arc<dyn SourceConnector> = Arc::new(MockConnector {
            items: vec![],
            fail: false,
        });
    }

    #[tokio::test]
    async fn mock_connector_returns_items() {
        let connector = MockConnector {
            items: vec![ContentItem::new("1", "Test", "mock")],
            fail: false,
        };
        let response = connector
            .discover("test", &DiscoveryOptions::default(), CancellationToken::new())
            .await
            .expect("should succeed");
        assert_eq!(response.items.len(), 1);
        assert_eq!(response.items[0].title, "Test");
    }

    #[tokio::test]
    async fn mock_connector_honours_max_results() {
        let connector = MockConnector {
            items: (0..5)
                .map(|i| ContentItem::new(i.to_string(), format!("T{i}"), "mock"))
                .collect(),
            fail: false,
        };
        let options = DiscoveryOptions {
            max_results: Some(2),
            ..Default::default()
        };
        let response = connector
            .discover("q", &options, CancellationToken::new())
            .await
            .expect("should succeed");
        assert_eq!(response.items.len(), 2);
    }

    #[tokio::test]
    async fn mock_connector_propagates_errors() {
        let connector = MockConnector {
            items: vec![],
            fail: true,
        };
        let err = connector
            .discover("q", &DiscoveryOptions::default(), CancellationToken::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("mock connector failure"));
    }
}
