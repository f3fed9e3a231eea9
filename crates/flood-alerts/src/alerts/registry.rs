//! Idempotent alert subscription management keyed by contact identity.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::content;
use super::dispatch::{dispatch_all, Notification};
use super::domain::{AlertSubscription, ContactIdentity, Language, NewAlertSubscription};
use super::service::ServiceError;
use super::store::Store;
use crate::gateways::email::EmailTransport;
use crate::gateways::geocode::{resolve_location_name, GeocodeGateway};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub location: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationOutcome {
    pub subscription: AlertSubscription,
    pub message: String,
}

/// Register or update a subscription. The contact identity (email preferred,
/// else phone) is the upsert key: an existing record gets its coordinates,
/// location, and language overwritten and is forced back to active. A fresh
/// record starts active and, when it carries an email, receives a best-effort
/// confirmation message.
pub async fn register<S, G, E>(
    store: &S,
    geocoder: &G,
    transport: Option<&E>,
    request: RegisterRequest,
) -> Result<RegistrationOutcome, ServiceError>
where
    S: Store + ?Sized,
    G: GeocodeGateway + ?Sized,
    E: EmailTransport + ?Sized,
{
    let identity = ContactIdentity::new(request.email.as_deref(), request.phone.as_deref())
        .ok_or_else(|| ServiceError::Validation("email or phone is required".to_string()))?;
    let (latitude, longitude) = match (request.latitude, request.longitude) {
        (Some(lat), Some(lon)) => (lat, lon),
        _ => {
            return Err(ServiceError::Validation(
                "latitude and longitude are required".to_string(),
            ))
        }
    };

    let location = match request.location.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => resolve_location_name(geocoder, latitude, longitude).await,
    };
    let language = Language::parse(request.language.as_deref());

    if let Some(mut existing) = store.find_subscription(&identity).await? {
        existing.latitude = latitude;
        existing.longitude = longitude;
        existing.location = location;
        existing.language = language;
        existing.active = true;
        let subscription = store.update_subscription(existing).await?;
        info!(subscription_id = %subscription.id, "alert subscription re-registered");
        return Ok(RegistrationOutcome {
            subscription,
            message: "Subscription updated; alerts re-activated for this contact".to_string(),
        });
    }

    let email = normalize(request.email);
    let phone = normalize(request.phone);
    let subscription = store
        .insert_subscription(NewAlertSubscription {
            email,
            phone,
            latitude,
            longitude,
            location: location.clone(),
            language,
            active: true,
        })
        .await?;
    info!(subscription_id = %subscription.id, %location, "alert subscription created");

    if let Some(recipient) = subscription.email.clone() {
        let message = content::confirmation_message(language, &location);
        let outcome = dispatch_all(
            transport,
            vec![Notification {
                to: recipient,
                subject: message.subject,
                html: message.html,
            }],
        )
        .await;
        if outcome.sent < outcome.total {
            warn!(subscription_id = %subscription.id, "confirmation email not delivered");
        }
    }

    Ok(RegistrationOutcome {
        subscription,
        message: format!("Subscribed to flood alerts for {location}"),
    })
}

/// Exact-match lookup by email or phone; no fuzzy matching.
pub async fn check<S>(
    store: &S,
    email: Option<&str>,
    phone: Option<&str>,
) -> Result<Option<AlertSubscription>, ServiceError>
where
    S: Store + ?Sized,
{
    let identity = ContactIdentity::new(email, phone)
        .ok_or_else(|| ServiceError::Validation("email or phone is required".to_string()))?;
    Ok(store.find_subscription(&identity).await?)
}

fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
}
