use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::common::{calendar_date, validate_amount, validate_not_blank};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Frequency {
    Monthly,
    Yearly,
}

impl Frequency {
    fn months_per_period(&self) -> u32 {
        match self {
            Frequency::Monthly => 1,
            Frequency::Yearly => 12,
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Frequency::Monthly => write!(f, "Monthly"),
            Frequency::Yearly => write!(f, "Yearly"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: Uuid,
    pub owner: Uuid,
    pub name: String,
    pub amount: Decimal,
    pub frequency: Frequency,
    #[serde(with = "calendar_date")]
    pub start_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubscriptionRequest {
    #[validate(length(max = 200, message = "Name is too long"), custom = "validate_not_blank")]
    pub name: String,

    #[validate(custom = "validate_amount")]
    pub amount: Decimal,

    pub frequency: Frequency,

    #[serde(with = "calendar_date")]
    pub start_date: NaiveDate,
}

#[derive(Debug, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSubscriptionRequest {
    #[validate(length(max = 200, message = "Name is too long"), custom = "validate_not_blank")]
    pub name: Option<String>,

    #[validate(custom = "validate_amount")]
    pub amount: Option<Decimal>,

    pub frequency: Option<Frequency>,

    #[serde(default, with = "calendar_date::option")]
    pub start_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RenewalReminder {
    pub subscription_id: Uuid,
    pub name: String,
    pub amount: Decimal,
    pub frequency: Frequency,
    #[serde(with = "calendar_date")]
    pub renewal_date: NaiveDate,
    pub days_until: i64,
}

impl Subscription {
    pub fn new(owner: Uuid, request: CreateSubscriptionRequest) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner,
            name: request.name.trim().to_string(),
            amount: request.amount,
            frequency: request.frequency,
            start_date: request.start_date,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn update(&mut self, request: UpdateSubscriptionRequest) {
        if let Some(name) = request.name {
            self.name = name.trim().to_string();
        }
        if let Some(amount) = request.amount {
            self.amount = amount;
        }
        if let Some(frequency) = request.frequency {
            self.frequency = frequency;
        }
        if let Some(start_date) = request.start_date {
            self.start_date = start_date;
        }
        self.updated_at = Utc::now();
    }

    /// Active when `start_date` is on or before the first day of the month.
    /// A subscription starting mid-month is first charged the month after.
    pub fn is_active_in(&self, month: u32, year: i32) -> bool {
        NaiveDate::from_ymd_opt(year, month, 1).map_or(false, |first| self.start_date <= first)
    }

    /// What this subscription charges in the given calendar month.
    ///
    /// Yearly subscriptions renew in their start month of every year once
    /// started; monthly ones charge every active month.
    pub fn charge_for_month(&self, month: u32, year: i32) -> Option<Decimal> {
        if !self.is_active_in(month, year) {
            return None;
        }

        match self.frequency {
            Frequency::Monthly => Some(self.amount),
            Frequency::Yearly if self.start_date.month() == month => Some(self.amount),
            Frequency::Yearly => None,
        }
    }

    /// First charge date on or after `today`, clamped to month end for
    /// start days the target month doesn't have.
    pub fn next_renewal(&self, today: NaiveDate) -> Option<NaiveDate> {
        if self.start_date >= today {
            return Some(self.start_date);
        }

        let step = self.frequency.months_per_period();
        let elapsed = (today.year() - self.start_date.year()) * 12 + today.month() as i32
            - self.start_date.month() as i32;
        let mut periods = elapsed.max(0) as u32 / step;

        loop {
            let candidate = self
                .start_date
                .checked_add_months(Months::new(periods * step))?;
            if candidate >= today {
                return Some(candidate);
            }
            periods += 1;
        }
    }

    pub fn renewal_reminder(&self, today: NaiveDate, window_days: i64) -> Option<RenewalReminder> {
        let renewal_date = self.next_renewal(today)?;
        let days_until = renewal_date.signed_duration_since(today).num_days();

        if days_until > window_days {
            return None;
        }

        Some(RenewalReminder {
            subscription_id: self.id,
            name: self.name.clone(),
            amount: self.amount,
            frequency: self.frequency,
            renewal_date,
            days_until,
        })
    }

    /// Whether `start_date` falls in `year` (and `month`, when given).
    pub fn starts_within(&self, year: i32, month: Option<u32>) -> bool {
        self.start_date.year() == year && month.map_or(true, |m| self.start_date.month() == m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn subscription(amount: Decimal, frequency: Frequency, start_date: NaiveDate) -> Subscription {
        Subscription::new(
            Uuid::new_v4(),
            CreateSubscriptionRequest {
                name: "Netflix".to_string(),
                amount,
                frequency,
                start_date,
            },
        )
    }

    #[test]
    fn test_monthly_charges_from_start_month() {
        let sub = subscription(dec!(15), Frequency::Monthly, date(2024, 1, 1));

        assert_eq!(sub.charge_for_month(12, 2023), None);
        assert_eq!(sub.charge_for_month(1, 2024), Some(dec!(15)));
        assert_eq!(sub.charge_for_month(7, 2024), Some(dec!(15)));
        assert_eq!(sub.charge_for_month(3, 2031), Some(dec!(15)));
    }

    #[test]
    fn test_mid_month_start_charges_from_next_month() {
        let sub = subscription(dec!(15), Frequency::Monthly, date(2024, 1, 15));

        assert_eq!(sub.charge_for_month(1, 2024), None);
        assert_eq!(sub.charge_for_month(2, 2024), Some(dec!(15)));
        assert!(!sub.is_active_in(13, 2024));
    }

    #[test]
    fn test_yearly_charges_on_anniversary_month() {
        let sub = subscription(dec!(120), Frequency::Yearly, date(2024, 3, 15));

        assert_eq!(sub.charge_for_month(3, 2023), None);
        assert_eq!(sub.charge_for_month(2, 2024), None);
        // Starts after March 1st, so the first charge is the next anniversary.
        assert_eq!(sub.charge_for_month(3, 2024), None);
        assert_eq!(sub.charge_for_month(4, 2024), None);

        let from_first = subscription(dec!(120), Frequency::Yearly, date(2024, 3, 1));
        assert_eq!(from_first.charge_for_month(3, 2024), Some(dec!(120)));
        assert_eq!(sub.charge_for_month(3, 2025), Some(dec!(120)));
        assert_eq!(sub.charge_for_month(3, 2026), Some(dec!(120)));
        assert_eq!(sub.charge_for_month(1, 2026), None);
    }

    #[test]
    fn test_request_validation() {
        let mut request = CreateSubscriptionRequest {
            name: "  Netflix ".to_string(),
            amount: dec!(15),
            frequency: Frequency::Monthly,
            start_date: date(2024, 1, 1),
        };
        assert!(request.validate().is_ok());

        request.name = "   ".to_string();
        assert!(request.validate().is_err());

        request.name = "Netflix".to_string();
        request.amount = dec!(50000000000000000000000000000);
        assert!(request.validate().is_err());

        let update = UpdateSubscriptionRequest {
            name: Some(" ".to_string()),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }

    #[test]
    fn test_update_is_partial() {
        let mut sub = subscription(dec!(15), Frequency::Monthly, date(2024, 1, 1));
        sub.update(UpdateSubscriptionRequest {
            amount: Some(dec!(17.99)),
            ..Default::default()
        });

        assert_eq!(sub.amount, dec!(17.99));
        assert_eq!(sub.name, "Netflix");
        assert_eq!(sub.frequency, Frequency::Monthly);
    }

    #[test]
    fn test_next_renewal() {
        let monthly = subscription(dec!(10), Frequency::Monthly, date(2024, 1, 31));
        assert_eq!(monthly.next_renewal(date(2024, 2, 10)), Some(date(2024, 2, 29)));
        assert_eq!(monthly.next_renewal(date(2024, 3, 1)), Some(date(2024, 3, 31)));

        let yearly = subscription(dec!(99), Frequency::Yearly, date(2022, 6, 1));
        assert_eq!(yearly.next_renewal(date(2025, 6, 1)), Some(date(2025, 6, 1)));
        assert_eq!(yearly.next_renewal(date(2025, 6, 2)), Some(date(2026, 6, 1)));

        let future = subscription(dec!(5), Frequency::Monthly, date(2030, 1, 1));
        assert_eq!(future.next_renewal(date(2025, 1, 1)), Some(date(2030, 1, 1)));
    }

    #[test]
    fn test_renewal_reminder_window() {
        let sub = subscription(dec!(99), Frequency::Yearly, date(2022, 6, 20));

        let reminder = sub.renewal_reminder(date(2025, 6, 1), 30).unwrap();
        assert_eq!(reminder.renewal_date, date(2025, 6, 20));
        assert_eq!(reminder.days_until, 19);

        assert!(sub.renewal_reminder(date(2025, 1, 1), 30).is_none());
    }

    #[test]
    fn test_starts_within() {
        let sub = subscription(dec!(10), Frequency::Monthly, date(2024, 5, 9));
        assert!(sub.starts_within(2024, None));
        assert!(sub.starts_within(2024, Some(5)));
        assert!(!sub.starts_within(2024, Some(6)));
        assert!(!sub.starts_within(2023, None));
    }
}
