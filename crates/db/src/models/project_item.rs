//! Project-scoped line items: milestones, risks and financial records.
//!
//! The three families share one access pattern (a `get_project_*` /
//! `add_project_*` / `update_project_*` RPC triple with a direct table
//! fallback), so they share the [`ProjectItem`] trait and a single generic
//! repository.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use taskdeck_core::permissions::ProjectAction;
use taskdeck_core::status::{
    Likelihood, MilestoneStatus, PaymentStatus, RiskLevel, RiskStatus, TransactionType,
};
use taskdeck_core::types::{Date, Id, Timestamp};
use validator::Validate;

use super::Record;

/// A line-item family reachable through its RPC triple or its table.
pub trait ProjectItem: Record + DeserializeOwned {
    type New: Serialize + Validate + Send + Sync;
    type Patch: Serialize + Validate + Send + Sync;

    /// Singular RPC stem, e.g. `milestone` in `add_project_milestone`.
    const SINGULAR: &'static str;
    /// Plural RPC stem, e.g. `milestones` in `get_project_milestones`.
    const PLURAL: &'static str;
    /// Backing table for the direct fallback.
    const TABLE: &'static str;
    /// Project permission needed to add, edit or delete items.
    const MANAGE_ACTION: ProjectAction;

    /// Local stand-in for a row being created, shown until the server row
    /// arrives.
    fn draft(project_id: Id, input: &Self::New, now: Timestamp) -> Self;
    fn project_id(&self) -> Id;
    fn apply(&mut self, patch: &Self::Patch);
}

// ---------------------------------------------------------------------------
// Milestones
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub id: Id,
    pub project_id: Id,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<Date>,
    pub status: MilestoneStatus,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct NewMilestone {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<Date>,
    pub status: MilestoneStatus,
}

#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct UpdateMilestone {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Date>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<MilestoneStatus>,
}

impl Record for Milestone {
    fn id(&self) -> Id {
        self.id
    }
}

impl ProjectItem for Milestone {
    type New = NewMilestone;
    type Patch = UpdateMilestone;
    const SINGULAR: &'static str = "milestone";
    const PLURAL: &'static str = "milestones";
    const TABLE: &'static str = "project_milestones";
    const MANAGE_ACTION: ProjectAction = ProjectAction::EditProject;

    fn draft(project_id: Id, input: &NewMilestone, now: Timestamp) -> Self {
        Self {
            id: Id::new_v4(),
            project_id,
            title: input.title.trim().to_string(),
            description: input.description.clone(),
            due_date: input.due_date,
            status: input.status,
            created_at: now,
        }
    }

    fn project_id(&self) -> Id {
        self.project_id
    }

    fn apply(&mut self, patch: &UpdateMilestone) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(description) = &patch.description {
            self.description = Some(description.clone());
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = Some(due_date);
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
    }
}

// ---------------------------------------------------------------------------
// Risks
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Risk {
    pub id: Id,
    pub project_id: Id,
    pub title: String,
    pub description: Option<String>,
    pub severity: RiskLevel,
    pub probability: Likelihood,
    pub impact: Likelihood,
    pub status: RiskStatus,
    pub mitigation_plan: Option<String>,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct NewRisk {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub title: String,
    pub description: Option<String>,
    pub severity: RiskLevel,
    pub probability: Likelihood,
    pub impact: Likelihood,
    pub status: RiskStatus,
    pub mitigation_plan: Option<String>,
}

impl NewRisk {
    /// A new open risk whose severity is derived from its assessment.
    pub fn assessed(title: impl Into<String>, probability: Likelihood, impact: Likelihood) -> Self {
        Self {
            title: title.into(),
            description: None,
            severity: RiskLevel::from_assessment(probability, impact),
            probability,
            impact,
            status: RiskStatus::Open,
            mitigation_plan: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct UpdateRisk {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<RiskLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<RiskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mitigation_plan: Option<String>,
}

impl Record for Risk {
    fn id(&self) -> Id {
        self.id
    }
}

impl ProjectItem for Risk {
    type New = NewRisk;
    type Patch = UpdateRisk;
    const SINGULAR: &'static str = "risk";
    const PLURAL: &'static str = "risks";
    const TABLE: &'static str = "project_risks";
    const MANAGE_ACTION: ProjectAction = ProjectAction::ManageRisks;

    fn draft(project_id: Id, input: &NewRisk, now: Timestamp) -> Self {
        Self {
            id: Id::new_v4(),
            project_id,
            title: input.title.trim().to_string(),
            description: input.description.clone(),
            severity: input.severity,
            probability: input.probability,
            impact: input.impact,
            status: input.status,
            mitigation_plan: input.mitigation_plan.clone(),
            created_at: now,
        }
    }

    fn project_id(&self) -> Id {
        self.project_id
    }

    fn apply(&mut self, patch: &UpdateRisk) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(description) = &patch.description {
            self.description = Some(description.clone());
        }
        if let Some(severity) = patch.severity {
            self.severity = severity;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(plan) = &patch.mitigation_plan {
            self.mitigation_plan = Some(plan.clone());
        }
    }
}

// ---------------------------------------------------------------------------
// Financial records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialRecord {
    pub id: Id,
    pub project_id: Id,
    pub description: String,
    pub amount: f64,
    pub transaction_type: TransactionType,
    pub payment_status: PaymentStatus,
    pub transaction_date: Date,
    pub category: Option<String>,
    pub created_at: Timestamp,
}

impl FinancialRecord {
    /// Amount with its sign: income positive, expenses negative.
    pub fn signed_amount(&self) -> f64 {
        match self.transaction_type {
            TransactionType::Income => self.amount,
            TransactionType::Expense => -self.amount,
        }
    }
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct NewFinancialRecord {
    #[validate(length(min = 1, max = 500, message = "must be 1-500 characters"))]
    pub description: String,
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub amount: f64,
    pub transaction_type: TransactionType,
    pub payment_status: PaymentStatus,
    pub transaction_date: Date,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct UpdateFinancialRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 500, message = "must be 1-500 characters"))]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<PaymentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Record for FinancialRecord {
    fn id(&self) -> Id {
        self.id
    }
}

impl ProjectItem for FinancialRecord {
    type New = NewFinancialRecord;
    type Patch = UpdateFinancialRecord;
    const SINGULAR: &'static str = "financial";
    const PLURAL: &'static str = "financials";
    const TABLE: &'static str = "project_financials";
    const MANAGE_ACTION: ProjectAction = ProjectAction::ManageFinancials;

    fn draft(project_id: Id, input: &NewFinancialRecord, now: Timestamp) -> Self {
        Self {
            id: Id::new_v4(),
            project_id,
            description: input.description.trim().to_string(),
            amount: input.amount,
            transaction_type: input.transaction_type,
            payment_status: input.payment_status,
            transaction_date: input.transaction_date,
            category: input.category.clone(),
            created_at: now,
        }
    }

    fn project_id(&self) -> Id {
        self.project_id
    }

    fn apply(&mut self, patch: &UpdateFinancialRecord) {
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(amount) = patch.amount {
            self.amount = amount;
        }
        if let Some(status) = patch.payment_status {
            self.payment_status = status;
        }
        if let Some(category) = &patch.category {
            self.category = Some(category.clone());
        }
    }
}

/// Net of income minus expenses, ignoring cancelled records.
pub fn net_balance(records: &[FinancialRecord]) -> f64 {
    records
        .iter()
        .filter(|r| r.payment_status != PaymentStatus::Cancelled)
        .map(FinancialRecord::signed_amount)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(amount: f64, kind: &str, status: &str) -> FinancialRecord {
        serde_json::from_value(json!({
            "id": Id::new_v4(),
            "project_id": Id::new_v4(),
            "description": "line",
            "amount": amount,
            "transaction_type": kind,
            "payment_status": status,
            "transaction_date": "2025-03-01",
            "category": null,
            "created_at": "2025-03-01T00:00:00Z"
        }))
        .unwrap()
    }

    #[test]
    fn net_balance_skips_cancelled() {
        let records = vec![
            record(1000.0, "income", "paid"),
            record(250.0, "expense", "pending"),
            record(999.0, "expense", "cancelled"),
        ];
        assert_eq!(net_balance(&records), 750.0);
    }

    #[test]
    fn negative_amount_is_rejected() {
        let dto = NewFinancialRecord {
            description: "Refund".to_string(),
            amount: -5.0,
            transaction_type: TransactionType::Expense,
            payment_status: PaymentStatus::Pending,
            transaction_date: Date::from_ymd_opt(2025, 3, 1).unwrap(),
            category: None,
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn assessed_risk_derives_severity() {
        let risk = NewRisk::assessed("Vendor slip", Likelihood::High, Likelihood::High);
        assert_eq!(risk.severity, RiskLevel::Critical);
        assert_eq!(risk.status, RiskStatus::Open);
    }

    #[test]
    fn rpc_stems_match_backend_names() {
        assert_eq!(
            format!("get_project_{}", FinancialRecord::PLURAL),
            "get_project_financials"
        );
        assert_eq!(format!("add_project_{}", Risk::SINGULAR), "add_project_risk");
    }
}
