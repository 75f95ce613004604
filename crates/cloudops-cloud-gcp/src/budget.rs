//! Budget definition document
//!
//! Field names follow the Cloud Billing Budget API (`v1`) schema exactly;
//! the serialized form is the request body submitted to the API.

use serde::{Deserialize, Serialize};

/// Billing service id of Cloud Run
pub const CLOUD_RUN_SERVICE_ID: &str = "services/152E-C115-5142";

pub const CURRENCY_CODE: &str = "USD";

/// Topic receiving programmatic budget notifications
pub const BUDGET_TOPIC: &str = "budget-alerts";

pub const NOTIFICATION_SCHEMA_VERSION: &str = "1.0";

/// Spend fractions at which notifications fire
pub const THRESHOLDS: [f64; 3] = [0.5, 0.8, 1.0];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetDefinition {
    pub display_name: String,
    pub budget_filter: BudgetFilter,
    pub amount: BudgetAmount,
    pub threshold_rules: Vec<ThresholdRule>,
    pub notifications_rule: NotificationsRule,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetFilter {
    pub projects: Vec<String>,
    pub services: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetAmount {
    pub specified_amount: Money,
}

/// `google.type.Money`; `units` is an int64 carried as a JSON string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    pub currency_code: String,
    pub units: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdRule {
    pub threshold_percent: f64,
    pub spend_basis: SpendBasis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpendBasis {
    CurrentSpend,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationsRule {
    pub pubsub_topic: String,
    pub schema_version: String,
    pub monitoring_notification_channels: Vec<String>,
}

impl BudgetDefinition {
    /// Draft definition for Cloud Run spend in `project`
    ///
    /// The notification channel list starts empty and is filled in with
    /// [`BudgetDefinition::splice_channel`] once the channel id is known.
    pub fn new(project: &str, display_name: &str, amount: u64) -> Self {
        Self {
            display_name: display_name.to_string(),
            budget_filter: BudgetFilter {
                projects: vec![format!("projects/{project}")],
                services: vec![CLOUD_RUN_SERVICE_ID.to_string()],
            },
            amount: BudgetAmount {
                specified_amount: Money {
                    currency_code: CURRENCY_CODE.to_string(),
                    units: amount.to_string(),
                },
            },
            threshold_rules: THRESHOLDS
                .iter()
                .map(|&threshold_percent| ThresholdRule {
                    threshold_percent,
                    spend_basis: SpendBasis::CurrentSpend,
                })
                .collect(),
            notifications_rule: NotificationsRule {
                pubsub_topic: topic_name(project, BUDGET_TOPIC),
                schema_version: NOTIFICATION_SCHEMA_VERSION.to_string(),
                monitoring_notification_channels: Vec::new(),
            },
        }
    }

    /// Point notifications at `channel`, replacing any previous channel
    pub fn splice_channel(&mut self, channel: impl Into<String>) {
        self.notifications_rule.monitoring_notification_channels = vec![channel.into()];
    }

    pub fn channels(&self) -> &[String] {
        &self.notifications_rule.monitoring_notification_channels
    }

    pub fn thresholds(&self) -> Vec<f64> {
        self.threshold_rules
            .iter()
            .map(|r| r.threshold_percent)
            .collect()
    }
}

pub fn topic_name(project: &str, topic: &str) -> String {
    format!("projects/{project}/topics/{topic}")
}

/// Dollar amounts shown to the operator for each threshold
///
/// Whole-unit integer arithmetic, so 50% of 15 reports as 7. Display only;
/// the API receives the fractional thresholds.
pub fn threshold_amounts(amount: u64) -> [(u32, u64); 3] {
    [
        (50, percent_of(amount, 50)),
        (80, percent_of(amount, 80)),
        (100, amount),
    ]
}

/// `amount * percent / 100` without intermediate overflow
fn percent_of(amount: u64, percent: u64) -> u64 {
    // result never exceeds `amount` for percent <= 100
    (u128::from(amount) * u128::from(percent) / 100) as u64
}

/// Console lines describing when alerts fire
pub fn threshold_report(amount: u64) -> Vec<String> {
    threshold_amounts(amount)
        .iter()
        .map(|(percent, dollars)| format!("{percent}% of budget (${dollars})"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_schema() {
        let mut budget = BudgetDefinition::new("my-proj", "MCP Server Budget", 10);
        budget.splice_channel("projects/my-proj/notificationChannels/42");

        let value = serde_json::to_value(&budget).unwrap();
        assert_eq!(
            value,
            json!({
                "displayName": "MCP Server Budget",
                "budgetFilter": {
                    "projects": ["projects/my-proj"],
                    "services": ["services/152E-C115-5142"]
                },
                "amount": {
                    "specifiedAmount": {"currencyCode": "USD", "units": "10"}
                },
                "thresholdRules": [
                    {"thresholdPercent": 0.5, "spendBasis": "CURRENT_SPEND"},
                    {"thresholdPercent": 0.8, "spendBasis": "CURRENT_SPEND"},
                    {"thresholdPercent": 1.0, "spendBasis": "CURRENT_SPEND"}
                ],
                "notificationsRule": {
                    "pubsubTopic": "projects/my-proj/topics/budget-alerts",
                    "schemaVersion": "1.0",
                    "monitoringNotificationChannels": ["projects/my-proj/notificationChannels/42"]
                }
            })
        );
    }

    #[test]
    fn test_thresholds_independent_of_amount() {
        for amount in [1, 10, 37, 1_000_000] {
            let budget = BudgetDefinition::new("p", "b", amount);
            assert_eq!(budget.thresholds(), vec![0.5, 0.8, 1.0]);
        }
    }

    #[test]
    fn test_splice_replaces_channel() {
        let mut budget = BudgetDefinition::new("p", "b", 10);
        assert!(budget.channels().is_empty());

        budget.splice_channel("a");
        budget.splice_channel("b");
        assert_eq!(budget.channels(), ["b".to_string()]);
    }

    #[test]
    fn test_threshold_amounts() {
        assert_eq!(threshold_amounts(10), [(50, 5), (80, 8), (100, 10)]);
        assert_eq!(threshold_amounts(15), [(50, 7), (80, 12), (100, 15)]);

        assert_eq!(
            threshold_amounts(u64::MAX),
            [(50, u64::MAX / 2), (80, 14_757_395_258_967_641_292), (100, u64::MAX)]
        );

        let report = threshold_report(10);
        assert_eq!(report[0], "50% of budget ($5)");
        assert_eq!(report[1], "80% of budget ($8)");
        assert_eq!(report[2], "100% of budget ($10)");
    }
}
