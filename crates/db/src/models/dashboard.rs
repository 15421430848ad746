//! Dashboard summary computed from loaded projects and tasks.

use std::collections::BTreeMap;

use serde::Serialize;
use taskdeck_core::status::ProjectStatus;
use taskdeck_core::types::Date;

use super::project::ProjectRecord;
use super::task::TaskRecord;

/// Tasks due within this many days count as "due soon".
pub const DUE_SOON_DAYS: i64 = 7;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_projects: usize,
    pub projects_by_status: BTreeMap<ProjectStatus, usize>,
    /// Mean project progress, 0 when there are no projects.
    pub average_progress: f64,
    pub open_tasks: usize,
    pub completed_tasks: usize,
    pub overdue_tasks: usize,
    pub due_soon_tasks: usize,
}

impl DashboardSummary {
    pub fn compute(projects: &[ProjectRecord], tasks: &[TaskRecord], today: Date) -> Self {
        let mut projects_by_status = BTreeMap::new();
        for status in ProjectStatus::ALL {
            projects_by_status.insert(*status, 0);
        }
        for project in projects {
            *projects_by_status.entry(project.status).or_insert(0) += 1;
        }

        let average_progress = if projects.is_empty() {
            0.0
        } else {
            projects.iter().map(|p| f64::from(p.progress)).sum::<f64>() / projects.len() as f64
        };

        let completed_tasks = tasks.iter().filter(|t| t.is_done()).count();
        Self {
            total_projects: projects.len(),
            projects_by_status,
            average_progress,
            open_tasks: tasks.len() - completed_tasks,
            completed_tasks,
            overdue_tasks: tasks.iter().filter(|t| t.is_overdue(today)).count(),
            due_soon_tasks: tasks
                .iter()
                .filter(|t| t.is_due_within(today, DUE_SOON_DAYS))
                .count(),
        }
    }
}
