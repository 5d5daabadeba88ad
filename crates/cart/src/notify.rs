//! User-facing notifications.
//!
//! Every cart operation ends with exactly one notification on failure and,
//! when enabled, one on success. They are the toast messages a storefront UI
//! shows; code that needs to branch on the outcome should use the returned
//! [`CartError`] instead of the message text.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::error::CartError;
use crate::manager::CartOperation;

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationLevel {
    Success,
    Error,
}

/// A message for the shopper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }

    /// Confirmation for a completed operation.
    #[must_use]
    pub fn for_success(operation: CartOperation) -> Self {
        Self::success(match operation {
            CartOperation::Add => "Product added to cart",
            CartOperation::Remove => "Product removed from cart",
            CartOperation::UpdateAmount => "Product amount updated",
        })
    }

    /// Error message for a rejected operation.
    ///
    /// Stock shortages get their own message; everything else is reported as
    /// a generic failure of the operation.
    #[must_use]
    pub fn for_failure(operation: CartOperation, error: &CartError) -> Self {
        if matches!(error, CartError::OutOfStock { .. }) {
            return Self::error("Requested quantity is out of stock");
        }
        Self::error(match operation {
            CartOperation::Add => "Failed to add product",
            CartOperation::Remove => "Failed to remove product",
            CartOperation::UpdateAmount => "Failed to update product amount",
        })
    }
}

/// Receiver of user-facing notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &Notification);
}

impl<N: Notifier + ?Sized> Notifier for Arc<N> {
    fn notify(&self, notification: &Notification) {
        (**self).notify(notification);
    }
}

/// Writes notifications to the tracing log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: &Notification) {
        match notification.level {
            NotificationLevel::Success => info!(toast = %notification.message, "Cart notification"),
            NotificationLevel::Error => warn!(toast = %notification.message, "Cart notification"),
        }
    }
}

/// Forwards notifications to a channel, for a UI loop to render.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    /// Create a notifier and the receiving end of its channel.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: &Notification) {
        // Receiver gone means nobody is rendering toasts anymore.
        let _ = self.tx.send(notification.clone());
    }
}

#[cfg(test)]
mod tests {
    use storefront_cart_core::ProductId;

    use super::*;

    #[test]
    fn test_out_of_stock_message_is_shared() {
        let err = CartError::OutOfStock {
            product_id: ProductId::new(1),
            requested: 2,
            available: 1,
        };
        for operation in [CartOperation::Add, CartOperation::UpdateAmount] {
            let notification = Notification::for_failure(operation, &err);
            assert_eq!(notification.level, NotificationLevel::Error);
            assert_eq!(notification.message, "Requested quantity is out of stock");
        }
    }

    #[test]
    fn test_failure_message_per_operation() {
        let err = CartError::ProductNotFound(ProductId::new(1));
        assert_eq!(
            Notification::for_failure(CartOperation::Remove, &err).message,
            "Failed to remove product"
        );
        assert_eq!(
            Notification::for_failure(CartOperation::UpdateAmount, &err).message,
            "Failed to update product amount"
        );
    }

    #[tokio::test]
    async fn test_channel_notifier_forwards() {
        let (notifier, mut rx) = ChannelNotifier::channel();
        notifier.notify(&Notification::for_success(CartOperation::Add));

        let received = rx.recv().await.expect("notification");
        assert_eq!(received, Notification::success("Product added to cart"));
    }
}
