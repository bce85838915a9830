//! crates/growify_core/src/payment.rs
//!
//! Simulated course checkout: `SelectingMethod -> Processing -> Succeeded`.
//! There is no gateway; the shell decides how long "processing" takes.

use crate::domain::CourseId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Card,
    Upi,
    NetBanking,
    Wallet,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub transaction_id: Uuid,
    pub course_id: CourseId,
    pub amount_cents: u64,
    pub currency: String,
    pub method: PaymentMethod,
    pub paid_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum PaymentPhase {
    SelectingMethod,
    Processing,
    Succeeded { receipt: Receipt },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaymentError {
    #[error("Please select a payment method")]
    NoMethodSelected,
    #[error("A payment is already being processed")]
    AlreadyProcessing,
    #[error("No payment is being processed")]
    NotProcessing,
    #[error("This course has already been paid for")]
    AlreadyPaid,
}

#[derive(Debug, Clone)]
pub struct Checkout {
    course_id: CourseId,
    amount_cents: u64,
    currency: String,
    method: Option<PaymentMethod>,
    phase: PaymentPhase,
}

impl Checkout {
    pub fn new(course_id: CourseId, amount_cents: u64, currency: impl Into<String>) -> Self {
        Self {
            course_id,
            amount_cents,
            currency: currency.into(),
            method: None,
            phase: PaymentPhase::SelectingMethod,
        }
    }

    pub fn course_id(&self) -> CourseId {
        self.course_id
    }

    pub fn method(&self) -> Option<PaymentMethod> {
        self.method
    }

    pub fn phase(&self) -> &PaymentPhase {
        &self.phase
    }

    /// Picks (or switches) the payment method. Only allowed before paying.
    pub fn select_method(&mut self, method: PaymentMethod) -> Result<(), PaymentError> {
        match self.phase {
            PaymentPhase::SelectingMethod => {
                self.method = Some(method);
                Ok(())
            }
            PaymentPhase::Processing => Err(PaymentError::AlreadyProcessing),
            PaymentPhase::Succeeded { .. } => Err(PaymentError::AlreadyPaid),
        }
    }

    pub fn begin_processing(&mut self) -> Result<(), PaymentError> {
        match self.phase {
            PaymentPhase::SelectingMethod if self.method.is_none() => {
                Err(PaymentError::NoMethodSelected)
            }
            PaymentPhase::SelectingMethod => {
                self.phase = PaymentPhase::Processing;
                Ok(())
            }
            PaymentPhase::Processing => Err(PaymentError::AlreadyProcessing),
            PaymentPhase::Succeeded { .. } => Err(PaymentError::AlreadyPaid),
        }
    }

    /// Abandons an in-flight payment, e.g. when the payment screen goes away.
    pub fn cancel_processing(&mut self) -> Result<(), PaymentError> {
        match self.phase {
            PaymentPhase::Processing => {
                self.phase = PaymentPhase::SelectingMethod;
                Ok(())
            }
            _ => Err(PaymentError::NotProcessing),
        }
    }

    pub fn complete(
        &mut self,
        transaction_id: Uuid,
        paid_at: DateTime<Utc>,
    ) -> Result<&Receipt, PaymentError> {
        if self.phase != PaymentPhase::Processing {
            return Err(PaymentError::NotProcessing);
        }
        let method = self.method.ok_or(PaymentError::NoMethodSelected)?;
        self.phase = PaymentPhase::Succeeded {
            receipt: Receipt {
                transaction_id,
                course_id: self.course_id,
                amount_cents: self.amount_cents,
                currency: self.currency.clone(),
                method,
                paid_at,
            },
        };
        match &self.phase {
            PaymentPhase::Succeeded { receipt } => Ok(receipt),
            _ => Err(PaymentError::NotProcessing),
        }
    }
}
