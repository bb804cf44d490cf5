//! Expense aggregation over one user's subscriptions and installment plans.
//!
//! Everything here is pure: handlers load the records, these functions bucket
//! them into calendar months and years. Money is summed with checked
//! arithmetic so an overflowing total becomes an error instead of a panic.

use anyhow::{anyhow, Result};
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use crate::models::{
    analytics::{
        CategoryBreakdown, CategoryItem, InstallmentCharge, MonthTotal, MonthlyCost,
        MonthlySummary, SpendingTrends, SubscriptionCharge, YearComparison, YearTrend,
        YearlySummary,
    },
    common::month_name,
    payment::RecurringPayment,
    subscription::{Frequency, Subscription},
};

const MONTHS: std::ops::RangeInclusive<u32> = 1..=12;

fn add(total: Decimal, amount: Decimal) -> Result<Decimal> {
    total
        .checked_add(amount)
        .ok_or_else(|| anyhow!("Expense total overflowed"))
}

fn sum(amounts: impl IntoIterator<Item = Decimal>) -> Result<Decimal> {
    amounts.into_iter().try_fold(Decimal::ZERO, add)
}

pub fn monthly_summary(
    subscriptions: &[Subscription],
    payments: &[RecurringPayment],
    month: u32,
    year: i32,
) -> Result<MonthlySummary> {
    let subscription_breakdown: Vec<SubscriptionCharge> = subscriptions
        .iter()
        .filter_map(|sub| {
            sub.charge_for_month(month, year)
                .filter(|amount| *amount > Decimal::ZERO)
                .map(|amount| SubscriptionCharge {
                    name: sub.name.clone(),
                    amount,
                    frequency: sub.frequency,
                })
        })
        .collect();

    let installment_breakdown: Vec<InstallmentCharge> = payments
        .iter()
        .flat_map(|payment| {
            payment
                .installments
                .iter()
                .filter(|i| falls_in(i.due_date, month, year))
                .map(move |i| InstallmentCharge {
                    name: payment.name.clone(),
                    provider: payment.provider.clone(),
                    amount: i.amount,
                    due_date: i.due_date,
                    status: i.status,
                })
        })
        .collect();

    let subscription_cost = sum(subscription_breakdown.iter().map(|c| c.amount))?;
    let installment_cost = sum(installment_breakdown.iter().map(|c| c.amount))?;

    Ok(MonthlySummary {
        month,
        year,
        total_expense: add(subscription_cost, installment_cost)?,
        subscription_cost,
        installment_cost,
        subscription_breakdown,
        installment_breakdown,
    })
}

pub fn yearly_summary(
    subscriptions: &[Subscription],
    payments: &[RecurringPayment],
    year: i32,
) -> Result<YearlySummary> {
    let monthly_data = MONTHS
        .map(|month| {
            let summary = monthly_summary(subscriptions, payments, month, year)?;
            Ok(MonthlyCost {
                month,
                month_name: month_name(month).to_string(),
                subscription_cost: summary.subscription_cost,
                installment_cost: summary.installment_cost,
                total_cost: summary.total_expense,
            })
        })
        .collect::<Result<Vec<MonthlyCost>>>()?;

    Ok(YearlySummary {
        year,
        total_yearly_expense: sum(monthly_data.iter().map(|m| m.total_cost))?,
        monthly_data,
    })
}

fn year_trend(
    subscriptions: &[Subscription],
    payments: &[RecurringPayment],
    year: i32,
) -> Result<YearTrend> {
    let summary = yearly_summary(subscriptions, payments, year)?;
    let total = summary.total_yearly_expense;

    Ok(YearTrend {
        year,
        total_expense: total,
        average_monthly: total / Decimal::from(12),
        monthly_data: summary
            .monthly_data
            .into_iter()
            .map(|m| MonthTotal {
                month: m.month,
                total: m.total_cost,
                subscriptions: m.subscription_cost,
                installments: m.installment_cost,
            })
            .collect(),
    })
}

/// Compares `current_year` with the year before it.
pub fn spending_trends(
    subscriptions: &[Subscription],
    payments: &[RecurringPayment],
    current_year: i32,
) -> Result<SpendingTrends> {
    let current = year_trend(subscriptions, payments, current_year)?;
    let previous = year_trend(subscriptions, payments, current_year - 1)?;

    let change = current
        .total_expense
        .checked_sub(previous.total_expense)
        .ok_or_else(|| anyhow!("Year-over-year change overflowed"))?;

    let percentage_change = if previous.total_expense > Decimal::ZERO {
        change
            .checked_div(previous.total_expense)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .ok_or_else(|| anyhow!("Percentage change overflowed"))?
    } else {
        Decimal::ZERO
    };

    Ok(SpendingTrends {
        current_year: current,
        previous_year: previous,
        comparison: YearComparison {
            year_over_year_change: change,
            percentage_change,
        },
    })
}

/// Splits spend into the three fixed buckets.
///
/// Subscription buckets carry the nominal recurring amount; the installment
/// bucket carries the pending balance regardless of due date.
pub fn category_breakdown(
    subscriptions: &[Subscription],
    payments: &[RecurringPayment],
) -> Result<CategoryBreakdown> {
    let mut breakdown = CategoryBreakdown::default();

    for sub in subscriptions {
        let item = CategoryItem {
            name: sub.name.clone(),
            amount: sub.amount,
            provider: None,
        };
        match sub.frequency {
            Frequency::Monthly => {
                breakdown.categories.monthly_subscriptions =
                    add(breakdown.categories.monthly_subscriptions, sub.amount)?;
                breakdown.details.monthly_subscriptions.push(item);
            }
            Frequency::Yearly => {
                breakdown.categories.yearly_subscriptions =
                    add(breakdown.categories.yearly_subscriptions, sub.amount)?;
                breakdown.details.yearly_subscriptions.push(item);
            }
        }
    }

    for payment in payments {
        let remaining = payment.pending_balance();
        breakdown.categories.installment_payments =
            add(breakdown.categories.installment_payments, remaining)?;
        breakdown.details.installment_payments.push(CategoryItem {
            name: payment.name.clone(),
            amount: remaining,
            provider: payment.provider.clone(),
        });
    }

    Ok(breakdown)
}

fn falls_in(date: NaiveDate, month: u32, year: i32) -> bool {
    date.month() == month && date.year() == year
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        payment::{CreateRecurringPaymentRequest, InstallmentInput, InstallmentStatus},
        subscription::CreateSubscriptionRequest,
    };
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sub(name: &str, amount: Decimal, frequency: Frequency, start: NaiveDate) -> Subscription {
        Subscription::new(
            Uuid::new_v4(),
            CreateSubscriptionRequest {
                name: name.to_string(),
                amount,
                frequency,
                start_date: start,
            },
        )
    }

    fn plan(
        name: &str,
        installments: Vec<(NaiveDate, Decimal, InstallmentStatus)>,
    ) -> RecurringPayment {
        RecurringPayment::new(
            Uuid::new_v4(),
            CreateRecurringPaymentRequest {
                name: name.to_string(),
                provider: Some("Afterpay".to_string()),
                total_amount: installments.iter().map(|(_, a, _)| *a).sum(),
                installments: installments
                    .into_iter()
                    .map(|(due_date, amount, status)| InstallmentInput {
                        id: None,
                        due_date,
                        amount,
                        status: Some(status),
                        paid_at: None,
                    })
                    .collect(),
            },
        )
    }

    fn fixture() -> (Vec<Subscription>, Vec<RecurringPayment>) {
        let subscriptions = vec![
            sub("Netflix", dec!(15), Frequency::Monthly, date(2024, 1, 1)),
            sub("Domain", dec!(120), Frequency::Yearly, date(2024, 3, 15)),
            sub("Gym", dec!(40.50), Frequency::Monthly, date(2025, 6, 20)),
        ];
        let payments = vec![
            plan(
                "Phone",
                vec![
                    (date(2025, 3, 1), dec!(200), InstallmentStatus::Pending),
                    (date(2025, 4, 1), dec!(200), InstallmentStatus::Paid),
                    (date(2025, 5, 1), dec!(200), InstallmentStatus::Overdue),
                ],
            ),
            plan("Sofa", vec![(date(2024, 11, 10), dec!(75.25), InstallmentStatus::Pending)]),
        ];
        (subscriptions, payments)
    }

    #[test]
    fn test_monthly_summary_example() {
        let subscriptions = vec![sub("Netflix", dec!(15), Frequency::Monthly, date(2024, 1, 1))];
        let payments = vec![plan(
            "Phone",
            vec![(date(2025, 3, 1), dec!(200), InstallmentStatus::Pending)],
        )];

        let summary = monthly_summary(&subscriptions, &payments, 3, 2025).unwrap();

        assert_eq!(summary.month, 3);
        assert_eq!(summary.year, 2025);
        assert_eq!(summary.total_expense, dec!(215));
        assert_eq!(summary.subscription_cost, dec!(15));
        assert_eq!(summary.installment_cost, dec!(200));
        assert_eq!(summary.subscription_breakdown.len(), 1);
        assert_eq!(summary.installment_breakdown[0].provider.as_deref(), Some("Afterpay"));
        assert_eq!(summary.installment_breakdown[0].due_date, date(2025, 3, 1));
    }

    #[test]
    fn test_monthly_total_is_sum_of_parts() {
        let (subscriptions, payments) = fixture();
        for year in 2023..=2026 {
            for month in 1..=12 {
                let s = monthly_summary(&subscriptions, &payments, month, year).unwrap();
                assert_eq!(s.total_expense, s.subscription_cost + s.installment_cost);
            }
        }
    }

    #[test]
    fn test_installments_count_regardless_of_status() {
        let payments = vec![
            plan("A", vec![(date(2025, 6, 10), dec!(50), InstallmentStatus::Pending)]),
            plan("B", vec![(date(2025, 6, 10), dec!(50), InstallmentStatus::Paid)]),
            plan("C", vec![(date(2025, 6, 10), dec!(50), InstallmentStatus::Overdue)]),
        ];

        let summary = monthly_summary(&[], &payments, 6, 2025).unwrap();
        assert_eq!(summary.installment_cost, dec!(150));

        // Same month, different year.
        let other_year = monthly_summary(&[], &payments, 6, 2024).unwrap();
        assert_eq!(other_year.installment_cost, Decimal::ZERO);
    }

    #[test]
    fn test_yearly_subscription_only_in_renewal_month() {
        let subscriptions = vec![sub("Domain", dec!(120), Frequency::Yearly, date(2024, 3, 15))];

        // Started after March 1st 2024, so the first charge is March 2025.
        let y2024 = yearly_summary(&subscriptions, &[], 2024).unwrap();
        assert_eq!(y2024.total_yearly_expense, Decimal::ZERO);

        let y2025 = yearly_summary(&subscriptions, &[], 2025).unwrap();
        assert_eq!(y2025.total_yearly_expense, dec!(120));
        assert_eq!(y2025.monthly_data[2].subscription_cost, dec!(120));
        assert_eq!(y2025.monthly_data[3].subscription_cost, Decimal::ZERO);

        let y2023 = yearly_summary(&subscriptions, &[], 2023).unwrap();
        assert_eq!(y2023.total_yearly_expense, Decimal::ZERO);
        let y2027 = yearly_summary(&subscriptions, &[], 2027).unwrap();
        assert_eq!(y2027.total_yearly_expense, dec!(120));
    }

    #[test]
    fn test_mid_month_start_skips_first_month() {
        let subscriptions = vec![sub("Netflix", dec!(15), Frequency::Monthly, date(2024, 1, 15))];

        let january = monthly_summary(&subscriptions, &[], 1, 2024).unwrap();
        assert_eq!(january.subscription_cost, Decimal::ZERO);
        assert!(january.subscription_breakdown.is_empty());

        let february = monthly_summary(&subscriptions, &[], 2, 2024).unwrap();
        assert_eq!(february.subscription_cost, dec!(15));
    }

    #[test]
    fn test_yearly_summary_matches_months() {
        let (subscriptions, payments) = fixture();
        let summary = yearly_summary(&subscriptions, &payments, 2025).unwrap();

        assert_eq!(summary.monthly_data.len(), 12);
        assert_eq!(summary.monthly_data[0].month_name, "January");
        assert_eq!(summary.monthly_data[11].month, 12);

        let summed: Decimal = summary.monthly_data.iter().map(|m| m.total_cost).sum();
        assert_eq!(summary.total_yearly_expense, summed);

        // Netflix 12 * 15, Domain 120, Gym July..December 6 * 40.50, Phone 3 * 200
        assert_eq!(
            summary.total_yearly_expense,
            dec!(180) + dec!(120) + dec!(243) + dec!(600)
        );
    }

    #[test]
    fn test_spending_trends() {
        let (subscriptions, payments) = fixture();
        let trends = spending_trends(&subscriptions, &payments, 2025).unwrap();

        // 2024: Netflix 12 * 15 + Sofa 75.25 (Domain starts charging in 2025)
        assert_eq!(trends.previous_year.year, 2024);
        assert_eq!(trends.previous_year.total_expense, dec!(255.25));
        assert_eq!(trends.current_year.total_expense, dec!(1143));
        assert_eq!(trends.current_year.average_monthly, dec!(1143) / dec!(12));
        assert_eq!(trends.current_year.monthly_data.len(), 12);
        assert_eq!(trends.comparison.year_over_year_change, dec!(887.75));
        assert_eq!(
            trends.comparison.percentage_change,
            dec!(887.75) / dec!(255.25) * dec!(100)
        );
    }

    #[test]
    fn test_percentage_change_zero_without_history() {
        let subscriptions = vec![sub("Netflix", dec!(15), Frequency::Monthly, date(2025, 1, 1))];
        let trends = spending_trends(&subscriptions, &[], 2025).unwrap();

        assert_eq!(trends.previous_year.total_expense, Decimal::ZERO);
        assert_eq!(trends.comparison.year_over_year_change, dec!(180));
        assert_eq!(trends.comparison.percentage_change, Decimal::ZERO);
    }

    #[test]
    fn test_overflowing_totals_are_errors() {
        let huge = dec!(50000000000000000000000000000);
        let subscriptions = vec![
            sub("A", huge, Frequency::Monthly, date(2024, 1, 1)),
            sub("B", huge, Frequency::Monthly, date(2024, 1, 1)),
        ];

        assert!(monthly_summary(&subscriptions, &[], 1, 2024).is_err());
        assert!(yearly_summary(&subscriptions, &[], 2024).is_err());
        assert!(category_breakdown(&subscriptions, &[]).is_err());
    }

    #[test]
    fn test_percentage_change_overflow_is_error() {
        let payments = vec![
            plan(
                "Tiny",
                vec![(
                    date(2024, 5, 1),
                    dec!(0.0000000000000000000000000001),
                    InstallmentStatus::Paid,
                )],
            ),
            plan(
                "Large",
                vec![(date(2025, 5, 1), dec!(1000000000000), InstallmentStatus::Pending)],
            ),
        ];

        assert!(spending_trends(&[], &payments, 2025).is_err());
    }

    #[test]
    fn test_category_breakdown_uses_pending_balance() {
        let (subscriptions, payments) = fixture();
        let breakdown = category_breakdown(&subscriptions, &payments).unwrap();

        assert_eq!(breakdown.categories.monthly_subscriptions, dec!(55.50));
        assert_eq!(breakdown.categories.yearly_subscriptions, dec!(120));
        // Phone: only the pending 200, Sofa: 75.25. Paid and overdue are excluded.
        assert_eq!(breakdown.categories.installment_payments, dec!(275.25));

        assert_eq!(breakdown.details.monthly_subscriptions.len(), 2);
        assert_eq!(breakdown.details.yearly_subscriptions[0].name, "Domain");
        assert_eq!(breakdown.details.installment_payments.len(), 2);
        assert_eq!(breakdown.details.installment_payments[0].amount, dec!(200));
    }

    #[test]
    fn test_category_breakdown_serializes_bucket_names() {
        let (subscriptions, payments) = fixture();
        let breakdown = category_breakdown(&subscriptions, &payments).unwrap();
        let json = serde_json::to_value(breakdown).unwrap();

        assert!(json["categories"]["Monthly Subscriptions"].is_number());
        assert!(json["categories"]["Yearly Subscriptions"].is_number());
        assert!(json["categories"]["Installment Payments"].is_number());
        assert_eq!(json["details"]["Installment Payments"][0]["provider"], "Afterpay");
        assert!(json["details"]["Monthly Subscriptions"][0].get("provider").is_none());
    }
}
