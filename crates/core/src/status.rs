//! Closed status enums for the text-valued status columns.
//!
//! The hosted database stores statuses as short kebab-case strings. Each
//! enum decodes only the values listed here, so an unexpected status fails
//! at the boundary instead of leaking into the views.

macro_rules! define_text_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
            serde::Serialize, serde::Deserialize,
        )]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $val)] $variant ),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Return the database string for this variant.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $val ),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::error::CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $val => Ok($name::$variant), )+
                    other => Err($crate::error::CoreError::Validation(format!(
                        "Unknown {} '{other}'",
                        stringify!($name)
                    ))),
                }
            }
        }
    };
}

pub(crate) use define_text_enum;

define_text_enum! {
    /// Project lifecycle status.
    ProjectStatus {
        NotStarted = "not-started",
        InProgress = "in-progress",
        OnHold = "on-hold",
        Completed = "completed",
    }
}

impl Default for ProjectStatus {
    fn default() -> Self {
        ProjectStatus::NotStarted
    }
}

define_text_enum! {
    /// Task board column.
    TaskStatus {
        Todo = "todo",
        InProgress = "in-progress",
        Review = "review",
        Completed = "completed",
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Todo
    }
}

define_text_enum! {
    /// Task priority.
    TaskPriority {
        Low = "low",
        Medium = "medium",
        High = "high",
        Urgent = "urgent",
    }
}

impl Default for TaskPriority {
    fn default() -> Self {
        TaskPriority::Medium
    }
}

define_text_enum! {
    /// Severity of a toast or persisted notification.
    NotificationSeverity {
        Info = "info",
        Success = "success",
        Warning = "warning",
        Error = "error",
    }
}

define_text_enum! {
    /// Project milestone status.
    MilestoneStatus {
        Pending = "pending",
        InProgress = "in-progress",
        Completed = "completed",
        Delayed = "delayed",
    }
}

define_text_enum! {
    /// Risk severity.
    RiskLevel {
        Low = "low",
        Medium = "medium",
        High = "high",
        Critical = "critical",
    }
}

define_text_enum! {
    /// Risk probability and impact rating.
    Likelihood {
        Low = "low",
        Medium = "medium",
        High = "high",
    }
}

define_text_enum! {
    /// Risk tracking status.
    RiskStatus {
        Open = "open",
        Mitigated = "mitigated",
        Closed = "closed",
    }
}

define_text_enum! {
    /// Direction of a project financial transaction.
    TransactionType {
        Income = "income",
        Expense = "expense",
    }
}

define_text_enum! {
    /// Payment state of a project financial transaction.
    PaymentStatus {
        Pending = "pending",
        Paid = "paid",
        Overdue = "overdue",
        Cancelled = "cancelled",
    }
}

impl RiskLevel {
    /// Combine probability and impact into a severity score.
    ///
    /// Used when a risk is recorded without an explicit severity.
    pub fn from_assessment(probability: Likelihood, impact: Likelihood) -> Self {
        let weight = |l: Likelihood| match l {
            Likelihood::Low => 1,
            Likelihood::Medium => 2,
            Likelihood::High => 3,
        };
        match weight(probability) * weight(impact) {
            1..=2 => RiskLevel::Low,
            3..=4 => RiskLevel::Medium,
            5..=6 => RiskLevel::High,
            _ => RiskLevel::Critical,
        }
    }
}
