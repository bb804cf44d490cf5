use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{
    common::calendar_date,
    payment::InstallmentStatus,
    subscription::Frequency,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionCharge {
    pub name: String,
    pub amount: Decimal,
    pub frequency: Frequency,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InstallmentCharge {
    pub name: String,
    pub provider: Option<String>,
    pub amount: Decimal,
    #[serde(with = "calendar_date")]
    pub due_date: NaiveDate,
    pub status: InstallmentStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummary {
    pub month: u32,
    pub year: i32,
    pub total_expense: Decimal,
    pub subscription_cost: Decimal,
    pub installment_cost: Decimal,
    pub subscription_breakdown: Vec<SubscriptionCharge>,
    pub installment_breakdown: Vec<InstallmentCharge>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyCost {
    pub month: u32,
    pub month_name: String,
    pub subscription_cost: Decimal,
    pub installment_cost: Decimal,
    pub total_cost: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct YearlySummary {
    pub year: i32,
    pub total_yearly_expense: Decimal,
    pub monthly_data: Vec<MonthlyCost>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthTotal {
    pub month: u32,
    pub total: Decimal,
    pub subscriptions: Decimal,
    pub installments: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct YearTrend {
    pub year: i32,
    pub total_expense: Decimal,
    pub average_monthly: Decimal,
    pub monthly_data: Vec<MonthTotal>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct YearComparison {
    pub year_over_year_change: Decimal,
    pub percentage_change: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SpendingTrends {
    pub current_year: YearTrend,
    pub previous_year: YearTrend,
    pub comparison: YearComparison,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CategoryTotals {
    #[serde(rename = "Monthly Subscriptions")]
    pub monthly_subscriptions: Decimal,
    #[serde(rename = "Yearly Subscriptions")]
    pub yearly_subscriptions: Decimal,
    #[serde(rename = "Installment Payments")]
    pub installment_payments: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryItem {
    pub name: String,
    pub amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CategoryDetails {
    #[serde(rename = "Monthly Subscriptions")]
    pub monthly_subscriptions: Vec<CategoryItem>,
    #[serde(rename = "Yearly Subscriptions")]
    pub yearly_subscriptions: Vec<CategoryItem>,
    #[serde(rename = "Installment Payments")]
    pub installment_payments: Vec<CategoryItem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CategoryBreakdown {
    pub categories: CategoryTotals,
    pub details: CategoryDetails,
}
