//! Incremental SQL filter used by content listing and search.

use rusqlite::types::Value;

/// Joins, `AND`-ed conditions and their positional binds over alias `c`.
#[derive(Debug, Clone, Default)]
pub(crate) struct ContentFilter {
    joins: Vec<String>,
    conditions: Vec<String>,
    binds: Vec<Value>,
}

impl ContentFilter {
    /// Filter restricted to non-tombstoned rows.
    pub(crate) fn live() -> Self {
        let mut filter = Self::default();
        filter.condition("c.deleted_at IS NULL", []);
        filter
    }

    pub(crate) fn join(&mut self, clause: impl Into<String>) {
        self.joins.push(clause.into());
    }

    pub(crate) fn condition(
        &mut self,
        clause: impl Into<String>,
        binds: impl IntoIterator<Item = Value>,
    ) {
        self.conditions.push(clause.into());
        self.binds.extend(binds);
    }

    /// Renders `FROM <table> c [JOIN ...] [WHERE ...]`.
    pub(crate) fn from_clause(&self, table: &str) -> String {
        let mut sql = format!(" FROM {table} c");
        for join in &self.joins {
            sql.push(' ');
            sql.push_str(join);
        }
        if !self.conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.conditions.join(" AND "));
        }
        sql
    }

    pub(crate) fn binds(&self) -> &[Value] {
        &self.binds
    }
}

/// Escapes `%`, `_` and `\` for a `LIKE ... ESCAPE '\'` pattern.
pub(crate) fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// `?1, ?2, ..., ?n`
pub(crate) fn numbered_placeholders(count: usize) -> String {
    (1..=count)
        .map(|index| format!("?{index}"))
        .collect::<Vec<_>>()
        .join(", ")
}
