use futures::future::join_all;
use serde::Serialize;
use tracing::warn;

use crate::gateways::email::EmailTransport;

/// One recipient's fully rendered message.
#[derive(Debug, Clone)]
pub struct Notification {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Aggregate result of a fan-out: how many sends succeeded out of how many
/// candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DispatchOutcome {
    pub sent: usize,
    pub total: usize,
}

/// Fan all notifications out concurrently and wait for every send to settle.
/// Individual failures are logged and counted, never propagated. With no
/// transport configured this short-circuits to zero sends without I/O.
pub async fn dispatch_all<E>(transport: Option<&E>, notifications: Vec<Notification>) -> DispatchOutcome
where
    E: EmailTransport + ?Sized,
{
    let total = notifications.len();
    let Some(transport) = transport else {
        if total > 0 {
            warn!(total, "no email transport configured, skipping notification fan-out");
        }
        return DispatchOutcome { sent: 0, total };
    };

    let sends = notifications.into_iter().map(|notification| async move {
        match transport
            .send(&notification.to, &notification.subject, &notification.html)
            .await
        {
            Ok(()) => true,
            Err(err) => {
                warn!(recipient = %notification.to, error = %err, "notification send failed");
                false
            }
        }
    });

    let sent = join_all(sends).await.into_iter().filter(|ok| *ok).count();
    DispatchOutcome { sent, total }
}
