//! Operation descriptors.
//!
//! An [`Operation`] names one request against the hosted database: a
//! select/insert/update/delete on a table, filtered by equality predicates,
//! or a named remote procedure with a JSON argument object.

use std::fmt::Display;

use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Select,
    Insert,
    Update,
    Delete,
    Rpc,
}

impl OpKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OpKind::Select => "select",
            OpKind::Insert => "insert",
            OpKind::Update => "update",
            OpKind::Delete => "delete",
            OpKind::Rpc => "rpc",
        }
    }

    /// Mutating table operations ask the backend to return the touched rows.
    pub fn returns_representation(self) -> bool {
        matches!(self, OpKind::Insert | OpKind::Update | OpKind::Delete)
    }
}

/// Equality predicate `column = value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub descending: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub kind: OpKind,
    /// Table name, or function name for [`OpKind::Rpc`].
    pub target: String,
    /// Select list; may embed joins, e.g. `*, profiles(full_name)`.
    pub columns: Option<String>,
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
    /// Insert values, update patch, or RPC arguments.
    pub body: Option<Value>,
}

impl Operation {
    fn new(kind: OpKind, target: impl Into<String>, body: Option<Value>) -> Self {
        Self {
            kind,
            target: target.into(),
            columns: None,
            filters: Vec::new(),
            order: None,
            limit: None,
            body,
        }
    }

    pub fn select(table: impl Into<String>) -> Self {
        Self::new(OpKind::Select, table, None)
    }

    pub fn insert(table: impl Into<String>, values: Value) -> Self {
        Self::new(OpKind::Insert, table, Some(values))
    }

    pub fn update(table: impl Into<String>, patch: Value) -> Self {
        Self::new(OpKind::Update, table, Some(patch))
    }

    pub fn delete(table: impl Into<String>) -> Self {
        Self::new(OpKind::Delete, table, None)
    }

    pub fn rpc(function: impl Into<String>, args: Value) -> Self {
        Self::new(OpKind::Rpc, function, Some(args))
    }

    pub fn columns(mut self, columns: impl Into<String>) -> Self {
        self.columns = Some(columns.into());
        self
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl Display) -> Self {
        self.filters.push(Filter {
            column: column.into(),
            value: value.to_string(),
        });
        self
    }

    pub fn order_desc(mut self, column: impl Into<String>) -> Self {
        self.order = Some(Order {
            column: column.into(),
            descending: true,
        });
        self
    }

    pub fn order_asc(mut self, column: impl Into<String>) -> Self {
        self.order = Some(Order {
            column: column.into(),
            descending: false,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Short routing label, e.g. `select:tasks` or `rpc:get_project_members`.
    pub fn label(&self) -> String {
        format!("{}:{}", self.kind.as_str(), self.target)
    }

    /// Query-string pairs in PostgREST syntax.
    ///
    /// RPC arguments travel in the body, so RPCs carry no query pairs.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        if self.kind == OpKind::Rpc {
            return Vec::new();
        }

        let mut pairs = Vec::new();
        match (&self.columns, self.kind) {
            (Some(cols), _) => pairs.push(("select".to_string(), cols.clone())),
            (None, OpKind::Select) => pairs.push(("select".to_string(), "*".to_string())),
            _ => {}
        }
        for f in &self.filters {
            pairs.push((f.column.clone(), format!("eq.{}", f.value)));
        }
        if let Some(order) = &self.order {
            let dir = if order.descending { "desc" } else { "asc" };
            pairs.push(("order".to_string(), format!("{}.{dir}", order.column)));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pair(k: &str, v: &str) -> (String, String) {
        (k.to_string(), v.to_string())
    }

    #[test]
    fn select_defaults_to_star_and_renders_filters_order_limit() {
        let op = Operation::select("tasks")
            .eq("project_id", "p-1")
            .eq("completed", false)
            .order_desc("created_at")
            .limit(20);

        assert_eq!(op.label(), "select:tasks");
        assert_eq!(
            op.query_pairs(),
            vec![
                pair("select", "*"),
                pair("project_id", "eq.p-1"),
                pair("completed", "eq.false"),
                pair("order", "created_at.desc"),
                pair("limit", "20"),
            ]
        );
    }

    #[test]
    fn embedded_select_list_is_passed_through() {
        let op = Operation::select("project_members")
            .columns("id, role, profiles(full_name)")
            .order_asc("created_at");
        assert_eq!(
            op.query_pairs(),
            vec![
                pair("select", "id, role, profiles(full_name)"),
                pair("order", "created_at.asc"),
            ]
        );
    }

    #[test]
    fn mutations_only_add_select_when_requested() {
        let op = Operation::update("tasks", json!({"title": "x"})).eq("id", 7);
        assert_eq!(op.query_pairs(), vec![pair("id", "eq.7")]);
        assert!(op.kind.returns_representation());
        assert_eq!(op.body, Some(json!({"title": "x"})));
    }

    #[test]
    fn rpc_has_no_query_pairs() {
        let op = Operation::rpc("check_project_access_v3", json!({"p_project_id": 1}));
        assert_eq!(op.label(), "rpc:check_project_access_v3");
        assert!(op.query_pairs().is_empty());
        assert!(!op.kind.returns_representation());
    }
}
