//! Parameterised SQL composition for the recommendation reads.
//!
//! Statements are plain data so they can be inspected in tests and executed by
//! any store that understands `?N` placeholders.

use std::fmt::Write as _;

use super::domain::{TargetType, UserId};

/// Bound parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
    Integer(i64),
    Text(String),
}

/// Rendered statement with its parameters in placeholder order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlStatement {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

/// Physical table names for a given prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNames {
    pub events: String,
    pub favorites: String,
    pub magazine_views: String,
}

impl TableNames {
    /// The prefix must already be validated as an identifier fragment.
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            events: format!("{prefix}roro_events"),
            favorites: format!("{prefix}roro_favorites"),
            magazine_views: format!("{prefix}roro_magazine_views"),
        }
    }
}

impl Default for TableNames {
    fn default() -> Self {
        Self::with_prefix("wp_")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    fn keyword(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// SQL fragment whose `?` markers are renumbered when the statement renders.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Fragment {
    text: String,
    params: Vec<SqlValue>,
}

impl Fragment {
    fn new(text: impl Into<String>, params: Vec<SqlValue>) -> Self {
        Self {
            text: text.into(),
            params,
        }
    }
}

/// Compositional `SELECT` builder.
#[derive(Debug, Clone, Default)]
pub struct SelectQuery {
    columns: Vec<Fragment>,
    from: String,
    joins: Vec<Fragment>,
    conditions: Vec<Fragment>,
    group_by: Vec<String>,
    order_by: Vec<(String, SortDirection)>,
    limit: Option<u32>,
}

impl SelectQuery {
    pub fn from(table: impl Into<String>) -> Self {
        Self {
            from: table.into(),
            ..Self::default()
        }
    }

    pub fn column(mut self, expression: impl Into<String>) -> Self {
        self.columns.push(Fragment::new(expression, Vec::new()));
        self
    }

    /// Column expression containing `?` markers bound to `params`.
    pub fn column_with(mut self, expression: impl Into<String>, params: Vec<SqlValue>) -> Self {
        self.columns.push(Fragment::new(expression, params));
        self
    }

    pub fn left_join(mut self, table: &str, on: impl Into<String>, params: Vec<SqlValue>) -> Self {
        let on = on.into();
        self.joins
            .push(Fragment::new(format!("LEFT JOIN {table} ON {on}"), params));
        self
    }

    pub fn filter(mut self, condition: impl Into<String>, params: Vec<SqlValue>) -> Self {
        self.conditions.push(Fragment::new(condition, params));
        self
    }

    pub fn group_by(mut self, expression: impl Into<String>) -> Self {
        self.group_by.push(expression.into());
        self
    }

    pub fn order_by(mut self, expression: impl Into<String>, direction: SortDirection) -> Self {
        self.order_by.push((expression.into(), direction));
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn build(&self) -> SqlStatement {
        let mut params = Vec::new();
        let mut sql = String::from("SELECT ");

        let columns: Vec<String> = self
            .columns
            .iter()
            .map(|fragment| number_placeholders(fragment, &mut params))
            .collect();
        sql.push_str(&columns.join(", "));
        let _ = write!(sql, " FROM {}", self.from);

        for join in &self.joins {
            sql.push(' ');
            sql.push_str(&number_placeholders(join, &mut params));
        }

        if !self.conditions.is_empty() {
            let conditions: Vec<String> = self
                .conditions
                .iter()
                .map(|fragment| number_placeholders(fragment, &mut params))
                .collect();
            let _ = write!(sql, " WHERE {}", conditions.join(" AND "));
        }

        if !self.group_by.is_empty() {
            let _ = write!(sql, " GROUP BY {}", self.group_by.join(", "));
        }

        if !self.order_by.is_empty() {
            let order: Vec<String> = self
                .order_by
                .iter()
                .map(|(expression, direction)| format!("{expression} {}", direction.keyword()))
                .collect();
            let _ = write!(sql, " ORDER BY {}", order.join(", "));
        }

        if let Some(limit) = self.limit {
            let _ = write!(sql, " LIMIT {limit}");
        }

        SqlStatement { sql, params }
    }
}

fn number_placeholders(fragment: &Fragment, params: &mut Vec<SqlValue>) -> String {
    let mut rendered = String::with_capacity(fragment.text.len() + 4);
    let mut bound = fragment.params.iter();

    for ch in fragment.text.chars() {
        if ch == '?' {
            if let Some(value) = bound.next() {
                params.push(value.clone());
                let _ = write!(rendered, "?{}", params.len());
                continue;
            }
        }
        rendered.push(ch);
    }

    rendered
}

/// Favourite totals for every visible event, optionally flagged for one member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventAggregateQuery {
    pub user: Option<UserId>,
}

impl EventAggregateQuery {
    pub fn for_user(user: Option<UserId>) -> Self {
        Self { user }
    }

    /// Column order: id, name, event_date, favorites[, user_favorited].
    pub fn statement(&self, tables: &TableNames) -> SqlStatement {
        let mut query = SelectQuery::from(format!("{} e", tables.events))
            .column("e.id")
            .column("e.name")
            .column("e.event_date")
            .column("COUNT(f.id) AS favorites");

        if let Some(user) = self.user {
            query = query.column_with(
                "MAX(CASE WHEN f.user_id = ? THEN 1 ELSE 0 END) AS user_favorited",
                vec![SqlValue::Integer(user.0)],
            );
        }

        query
            .left_join(
                &format!("{} f", tables.favorites),
                "f.target_type = ? AND f.target_id = e.id",
                vec![SqlValue::Text(TargetType::Event.as_str().to_string())],
            )
            .filter("e.visible = ?", vec![SqlValue::Integer(1)])
            .group_by("e.id")
            .group_by("e.name")
            .group_by("e.event_date")
            .order_by("e.id", SortDirection::Asc)
            .build()
    }
}

/// View totals per (issue, page) in first-recorded order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MagazineViewQuery;

impl MagazineViewQuery {
    /// Column order: issue_id, page_id, views.
    pub fn statement(&self, tables: &TableNames) -> SqlStatement {
        SelectQuery::from(tables.magazine_views.clone())
            .column("issue_id")
            .column("page_id")
            .column("SUM(views) AS views")
            .group_by("issue_id")
            .group_by("page_id")
            .order_by("MIN(id)", SortDirection::Asc)
            .build()
    }
}
