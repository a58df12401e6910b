//! Best-effort reporting of lookups to an external receiver.
//!
//! Every successful lookup is posted as JSON `{pincode, city, ppm}` to the
//! configured URL. Delivery runs on a spawned Tokio task bounded by the
//! client timeout; failures are logged and dropped. Postal codes on the
//! exclusion list are never reported.
//!
//! Sinks use enum dispatch because async methods are not dyn-compatible.

use std::collections::HashSet;
use std::time::Duration;

use hardness_core::config::NotifierConfig;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Body posted to the receiver.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LookupNotification {
    /// Postal code as requested.
    pub pincode: String,
    /// Resolved city.
    pub city: String,
    /// Resolved hardness in ppm.
    pub ppm: f64,
}

/// Errors raised while building or delivering notifications.
#[derive(Debug, thiserror::Error)]
pub enum NotifierError {
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(String),

    /// The request could not be sent or timed out.
    #[error("notification request failed: {0}")]
    Request(String),

    /// The receiver answered with a non-success status.
    #[error("receiver returned {0}")]
    Status(reqwest::StatusCode),
}

/// What [`Notifier::notify`] did with a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyOutcome {
    /// Handed to the sink.
    Dispatched,
    /// The postal code is on the exclusion list.
    Excluded,
    /// No receiver is configured.
    Disabled,
}

/// HTTP receiver.
#[derive(Debug, Clone)]
pub struct HttpSink {
    client: reqwest::Client,
    url: String,
}

impl HttpSink {
    /// Create a sink posting to `url` with the given request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`NotifierError::Client`] if the TLS backend cannot be
    /// initialized.
    pub fn new(url: String, timeout: Duration) -> Result<Self, NotifierError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotifierError::Client(format!("{e}")))?;
        Ok(Self { client, url })
    }

    /// Post one notification and check the status code.
    ///
    /// # Errors
    ///
    /// Returns [`NotifierError::Request`] on transport failure or timeout,
    /// [`NotifierError::Status`] on a non-2xx answer.
    pub async fn deliver(&self, notification: &LookupNotification) -> Result<(), NotifierError> {
        let response = self
            .client
            .post(&self.url)
            .json(notification)
            .send()
            .await
            .map_err(|e| NotifierError::Request(format!("{e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifierError::Status(status));
        }
        Ok(())
    }
}

/// Where notifications go.
#[derive(Debug, Clone)]
pub enum NotificationSink {
    /// Post to an HTTP receiver on a background task.
    Http(HttpSink),
    /// Forward to an in-process channel.
    Channel(mpsc::UnboundedSender<LookupNotification>),
    /// Drop everything.
    Disabled,
}

/// Applies the exclusion policy and hands lookups to a sink.
#[derive(Debug, Clone)]
pub struct Notifier {
    sink: NotificationSink,
    excluded: HashSet<String>,
}

impl Notifier {
    /// Create a notifier with an explicit sink and exclusion list.
    pub fn new(sink: NotificationSink, excluded: impl IntoIterator<Item = String>) -> Self {
        Self {
            sink,
            excluded: excluded.into_iter().collect(),
        }
    }

    /// Build from configuration. A missing URL yields a disabled notifier.
    ///
    /// # Errors
    ///
    /// Returns [`NotifierError::Client`] if the HTTP client cannot be built.
    pub fn from_config(config: &NotifierConfig) -> Result<Self, NotifierError> {
        let sink = match &config.url {
            Some(url) => NotificationSink::Http(HttpSink::new(url.clone(), config.timeout())?),
            None => NotificationSink::Disabled,
        };
        Ok(Self::new(sink, config.excluded_pincodes.iter().cloned()))
    }

    /// A notifier that drops everything.
    pub fn disabled() -> Self {
        Self::new(NotificationSink::Disabled, Vec::new())
    }

    /// A notifier forwarding into a channel, plus the receiving end.
    pub fn channel(
        excluded: impl IntoIterator<Item = String>,
    ) -> (Self, mpsc::UnboundedReceiver<LookupNotification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(NotificationSink::Channel(tx), excluded), rx)
    }

    /// Whether a receiver is configured.
    pub const fn is_enabled(&self) -> bool {
        !matches!(self.sink, NotificationSink::Disabled)
    }

    /// Report a lookup. Never blocks on the network and never fails.
    ///
    /// HTTP delivery requires a running Tokio runtime.
    pub fn notify(&self, pincode: &str, city: &str, ppm: f64) -> NotifyOutcome {
        if self.excluded.contains(pincode) {
            debug!(pincode, "postal code excluded from notifications");
            return NotifyOutcome::Excluded;
        }

        let notification = LookupNotification {
            pincode: pincode.to_owned(),
            city: city.to_owned(),
            ppm,
        };

        match &self.sink {
            NotificationSink::Http(sink) => {
                let sink = sink.clone();
                tokio::spawn(async move {
                    if let Err(e) = sink.deliver(&notification).await {
                        warn!(
                            error = %e,
                            pincode = notification.pincode,
                            "failed to deliver lookup notification"
                        );
                    }
                });
                NotifyOutcome::Dispatched
            }
            NotificationSink::Channel(tx) => {
                if tx.send(notification).is_err() {
                    warn!(pincode, "notification channel closed");
                }
                NotifyOutcome::Dispatched
            }
            NotificationSink::Disabled => NotifyOutcome::Disabled,
        }
    }
}
