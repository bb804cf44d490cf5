use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::common::{calendar_date, validate_amount, validate_not_blank};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum InstallmentStatus {
    #[default]
    Pending,
    Paid,
    Overdue,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Installment {
    pub id: Uuid,
    #[serde(with = "calendar_date")]
    pub due_date: NaiveDate,
    pub amount: Decimal,
    pub status: InstallmentStatus,
    pub paid_at: Option<DateTime<Utc>>,
}

/// A fixed-length installment plan (buy-now-pay-later, device financing, ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecurringPayment {
    pub id: Uuid,
    pub owner: Uuid,
    pub name: String,
    pub provider: Option<String>,
    pub total_amount: Decimal,
    pub installments: Vec<Installment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallmentInput {
    pub id: Option<Uuid>,

    #[serde(with = "calendar_date")]
    pub due_date: NaiveDate,

    pub amount: Decimal,

    pub status: Option<InstallmentStatus>,
    pub paid_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecurringPaymentRequest {
    #[validate(length(max = 200, message = "Name is too long"), custom = "validate_not_blank")]
    pub name: String,

    #[validate(length(max = 100, message = "Provider name is too long"))]
    pub provider: Option<String>,

    #[validate(custom = "validate_amount")]
    pub total_amount: Decimal,

    #[serde(default)]
    #[validate(custom = "validate_installments")]
    pub installments: Vec<InstallmentInput>,
}

#[derive(Debug, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecurringPaymentRequest {
    #[validate(length(max = 200, message = "Name is too long"), custom = "validate_not_blank")]
    pub name: Option<String>,

    #[validate(length(max = 100, message = "Provider name is too long"))]
    pub provider: Option<String>,

    #[validate(custom = "validate_amount")]
    pub total_amount: Option<Decimal>,

    #[validate(custom = "validate_installments")]
    pub installments: Option<Vec<InstallmentInput>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSchedule {
    pub next_due: Option<Installment>,
    pub amount_remaining: Decimal,
    pub payment_history: Vec<Installment>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InstallmentReminder {
    pub payment_id: Uuid,
    pub installment_id: Uuid,
    pub name: String,
    pub provider: Option<String>,
    #[serde(with = "calendar_date")]
    pub due_date: NaiveDate,
    pub amount: Decimal,
}

impl From<InstallmentInput> for Installment {
    fn from(input: InstallmentInput) -> Self {
        Self {
            id: input.id.unwrap_or_else(Uuid::new_v4),
            due_date: input.due_date,
            amount: input.amount,
            status: input.status.unwrap_or_default(),
            paid_at: input.paid_at,
        }
    }
}

impl Installment {
    pub fn is_pending(&self) -> bool {
        self.status == InstallmentStatus::Pending
    }

    pub fn mark_paid(&mut self, at: DateTime<Utc>) {
        if self.status != InstallmentStatus::Paid || self.paid_at.is_none() {
            self.paid_at = Some(at);
        }
        self.status = InstallmentStatus::Paid;
    }
}

fn validate_installments(installments: &[InstallmentInput]) -> Result<(), ValidationError> {
    installments
        .iter()
        .try_for_each(|installment| validate_amount(&installment.amount))
}

fn build_schedule(inputs: Vec<InstallmentInput>) -> Vec<Installment> {
    let mut installments: Vec<Installment> = inputs.into_iter().map(Installment::from).collect();
    installments.sort_by_key(|i| i.due_date);
    installments
}

fn clean_provider(provider: Option<String>) -> Option<String> {
    provider
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
}

impl RecurringPayment {
    pub fn new(owner: Uuid, request: CreateRecurringPaymentRequest) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner,
            name: request.name.trim().to_string(),
            provider: clean_provider(request.provider),
            total_amount: request.total_amount,
            installments: build_schedule(request.installments),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn update(&mut self, request: UpdateRecurringPaymentRequest) {
        if let Some(name) = request.name {
            self.name = name.trim().to_string();
        }
        if request.provider.is_some() {
            self.provider = clean_provider(request.provider);
        }
        if let Some(total_amount) = request.total_amount {
            self.total_amount = total_amount;
        }
        if let Some(installments) = request.installments {
            self.installments = build_schedule(installments);
        }
        self.updated_at = Utc::now();
    }

    /// Outstanding balance as reported by the category view: pending only.
    pub fn pending_balance(&self) -> Decimal {
        self.installments
            .iter()
            .filter(|i| i.is_pending())
            .map(|i| i.amount)
            .sum()
    }

    /// Everything not yet paid, overdue included.
    pub fn unpaid_balance(&self) -> Decimal {
        self.installments
            .iter()
            .filter(|i| i.status != InstallmentStatus::Paid)
            .map(|i| i.amount)
            .sum()
    }

    pub fn schedule(&self) -> PaymentSchedule {
        PaymentSchedule {
            next_due: self
                .installments
                .iter()
                .filter(|i| i.is_pending())
                .min_by_key(|i| i.due_date)
                .cloned(),
            amount_remaining: self.unpaid_balance(),
            payment_history: self.installments.clone(),
        }
    }

    pub fn mark_installment_paid(&mut self, installment_id: &Uuid) -> Option<Installment> {
        let now = Utc::now();
        let installment = self
            .installments
            .iter_mut()
            .find(|i| i.id == *installment_id)?;

        installment.mark_paid(now);
        let paid = installment.clone();
        self.updated_at = now;
        Some(paid)
    }

    /// Pending installments due between `today` and `today + window_days`.
    pub fn upcoming_reminders(
        &self,
        today: NaiveDate,
        window_days: i64,
    ) -> Vec<InstallmentReminder> {
        let horizon = today + Duration::days(window_days);
        self.installments
            .iter()
            .filter(|i| i.is_pending() && i.due_date >= today && i.due_date <= horizon)
            .map(|i| InstallmentReminder {
                payment_id: self.id,
                installment_id: i.id,
                name: self.name.clone(),
                provider: self.provider.clone(),
                due_date: i.due_date,
                amount: i.amount,
            })
            .collect()
    }
}
