//! Saved payment methods and the add-method form.
//!
//! Nothing here talks to a real processor; the game only keeps enough
//! of a method on file to label store purchases.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::LOG_PAYMENT_ADDED;
use crate::state::GameState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentKind {
    Card,
    Paypal,
    Apple,
    Carrier,
    PlayBalance,
}

/// A saved method, reduced to what the store screens display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub id: String,
    pub kind: PaymentKind,
    /// Display name, e.g. "Credit Card ending in 4242".
    pub label: String,
    /// Subtitle, e.g. "Expires 12/29".
    pub detail: String,
}

/// Raw form input for one method, per kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentForm {
    Card { number: String, exp: String, cvv: String },
    Paypal { email: String },
    Apple,
    Carrier { carrier: String, phone: String },
    GiftCode { code: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentError {
    #[error("card number must have at least 12 digits")]
    InvalidCardNumber,
    #[error("card expiry and CVV are required")]
    MissingCardDetails,
    #[error("that does not look like an email address")]
    InvalidEmail,
    #[error("carrier and a ten-digit phone number are required")]
    MissingCarrierDetails,
    #[error("gift card codes have at least five characters")]
    InvalidGiftCode,
}

impl PaymentForm {
    /// Validate the form and mint the saved method under `id`.
    ///
    /// # Errors
    ///
    /// The first field rule the input breaks.
    pub fn into_method(self, id: impl Into<String>) -> Result<PaymentMethod, PaymentError> {
        let id = id.into();
        match self {
            Self::Card { number, exp, cvv } => {
                if number.len() < 12 {
                    return Err(PaymentError::InvalidCardNumber);
                }
                if exp.is_empty() || cvv.is_empty() {
                    return Err(PaymentError::MissingCardDetails);
                }
                let skip = number.chars().count().saturating_sub(4);
                let last4: String = number.chars().skip(skip).collect();
                Ok(PaymentMethod {
                    id,
                    kind: PaymentKind::Card,
                    label: format!("Credit Card ending in {last4}"),
                    detail: format!("Expires {exp}"),
                })
            }
            Self::Paypal { email } => {
                if !email.contains('@') {
                    return Err(PaymentError::InvalidEmail);
                }
                Ok(PaymentMethod {
                    id,
                    kind: PaymentKind::Paypal,
                    label: email,
                    detail: "Connected via PayPal".to_string(),
                })
            }
            Self::Apple => Ok(PaymentMethod {
                id,
                kind: PaymentKind::Apple,
                label: "Apple Account".to_string(),
                detail: "Signed in".to_string(),
            }),
            Self::Carrier { carrier, phone } => {
                if carrier.is_empty() || phone.len() < 10 {
                    return Err(PaymentError::MissingCarrierDetails);
                }
                Ok(PaymentMethod {
                    id,
                    kind: PaymentKind::Carrier,
                    label: format!("Bill to {carrier}"),
                    detail: phone,
                })
            }
            Self::GiftCode { code } => {
                if code.len() < 5 {
                    return Err(PaymentError::InvalidGiftCode);
                }
                Ok(PaymentMethod {
                    id,
                    kind: PaymentKind::PlayBalance,
                    label: "Google Play Balance".to_string(),
                    detail: "Redeemed: $25.00".to_string(),
                })
            }
        }
    }
}

/// File a validated method on the account.
pub fn add_payment_method(state: &mut GameState, method: PaymentMethod) {
    state.payment_methods.push(method);
    state.push_log(LOG_PAYMENT_ADDED);
}
