//! Search criteria for the list style REST actions (`find`, `count`, `ids`).
//!
//! Criteria are parsed from query parameters against a resource's [`Columns`] map, so
//! every column that ends up in SQL comes from a static whitelist and every value is bound.
//!
//! | parameter | example | meaning |
//! | --- | --- | --- |
//! | `where` | `{"role": "ROLE_ADMIN", "id": ["..", ".."], "description": null}` | `=`, `IN`, `IS NULL` |
//! | `order` | `order=name`, `order=-name`, `order[name]=DESC` | sort |
//! | `limit` / `offset` | `limit=10&offset=20` | pagination |
//! | `search` | `search=foo bar`, `search={"and": ["foo", "bar"]}` | `LIKE` on searchable columns |

use serde_json::Value;
use sqlx::{QueryBuilder, Sqlite};
use uuid::Uuid;

use crate::errors::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Uuid,
    Integer,
    Timestamp,
}

/// A column exposed to clients: its API (camelCase) name and the SQL expression behind it.
#[derive(Debug, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub sql: &'static str,
    pub kind: ColumnKind,
    pub searchable: bool,
}

impl Column {
    pub const fn new(name: &'static str, sql: &'static str, kind: ColumnKind) -> Self {
        Self {
            name,
            sql,
            kind,
            searchable: false,
        }
    }

    pub const fn searchable(mut self) -> Self {
        self.searchable = true;
        self
    }
}

/// Whitelist of columns for a table.
#[derive(Debug)]
pub struct Columns {
    pub table: &'static str,
    pub columns: &'static [Column],
}

impl Columns {
    pub fn get(&self, name: &str) -> Option<&'static Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    fn require(&self, name: &str, parameter: &str) -> Result<&'static Column> {
        self.get(name).ok_or_else(|| Error::BadRequest {
            message: format!("Unknown column '{name}' in {parameter} parameter"),
        })
    }

    fn searchable(&self) -> impl Iterator<Item = &'static Column> {
        self.columns.iter().filter(|c| c.searchable)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Text(String),
    Integer(i64),
    Real(f64),
    Uuid(Uuid),
}

impl Literal {
    fn from_json(column: &Column, value: &Value) -> Result<Self> {
        let invalid = || Error::BadRequest {
            message: format!("Invalid value {value} for column '{}'", column.name),
        };

        match (column.kind, value) {
            (ColumnKind::Uuid, Value::String(s)) => Uuid::parse_str(s).map(Literal::Uuid).map_err(|_| invalid()),
            (ColumnKind::Integer, Value::Number(n)) => match n.as_i64() {
                Some(i) => Ok(Literal::Integer(i)),
                None => n.as_f64().map(Literal::Real).ok_or_else(invalid),
            },
            (ColumnKind::Integer, Value::Bool(b)) => Ok(Literal::Integer(i64::from(*b))),
            (ColumnKind::Integer, Value::String(s)) => s.parse().map(Literal::Integer).map_err(|_| invalid()),
            (ColumnKind::Text | ColumnKind::Timestamp, Value::String(s)) => Ok(Literal::Text(s.clone())),
            (ColumnKind::Text, Value::Number(n)) => Ok(Literal::Text(n.to_string())),
            _ => Err(invalid()),
        }
    }

    fn push_bind(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        match self {
            Literal::Text(s) => qb.push_bind(s.clone()),
            Literal::Integer(i) => qb.push_bind(*i),
            Literal::Real(f) => qb.push_bind(*f),
            Literal::Uuid(u) => qb.push_bind(*u),
        };
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    IsNull,
    Eq(Literal),
    In(Vec<Literal>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: &'static Column,
    pub condition: Condition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    fn parse(value: &str) -> Result<Self> {
        match value.to_ascii_uppercase().as_str() {
            "ASC" => Ok(Direction::Asc),
            "DESC" => Ok(Direction::Desc),
            _ => Err(Error::BadRequest {
                message: format!("Invalid order direction '{value}', expected ASC or DESC"),
            }),
        }
    }

    fn as_sql(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// Every term must match at least one searchable column
    And,
    /// Any term matching any searchable column is enough
    Or,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerms {
    pub mode: SearchMode,
    pub terms: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchCriteria {
    pub filters: Vec<Filter>,
    pub order_by: Vec<(&'static Column, Direction)>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub search: Option<SearchTerms>,
}

impl SearchCriteria {
    /// Parse raw query parameters. Unrelated parameters are ignored.
    pub fn parse(params: &[(String, String)], columns: &Columns) -> Result<Self> {
        let mut criteria = SearchCriteria::default();

        for (key, value) in params {
            match key.as_str() {
                "where" => criteria.filters.extend(parse_where(value, columns)?),
                "order" => {
                    for part in value.split(',').map(str::trim).filter(|p| !p.is_empty()) {
                        let (name, direction) = match part.strip_prefix('-') {
                            Some(name) => (name, Direction::Desc),
                            None => (part, Direction::Asc),
                        };
                        criteria.order_by.push((columns.require(name, "order")?, direction));
                    }
                }
                "limit" => criteria.limit = Some(parse_non_negative("limit", value)?),
                "offset" => criteria.offset = Some(parse_non_negative("offset", value)?),
                "search" => criteria.search = parse_search(value)?,
                _ => {
                    if let Some(name) = key.strip_prefix("order[").and_then(|k| k.strip_suffix(']')) {
                        criteria.order_by.push((columns.require(name, "order")?, Direction::parse(value)?));
                    }
                }
            }
        }

        Ok(criteria)
    }

    /// Criteria matching a single column value, for internal lookups.
    pub fn by(columns: &Columns, name: &str, value: Value) -> Result<Self> {
        let column = columns.require(name, "where")?;
        let condition = match value {
            Value::Null => Condition::IsNull,
            value => Condition::Eq(Literal::from_json(column, &value)?),
        };
        Ok(Self {
            filters: vec![Filter { column, condition }],
            ..Default::default()
        })
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Append `WHERE ...` for the filters and search terms.
    pub fn push_where(&self, qb: &mut QueryBuilder<'_, Sqlite>, columns: &Columns) {
        qb.push(" WHERE 1 = 1");

        for filter in &self.filters {
            qb.push(" AND ").push(filter.column.sql);
            match &filter.condition {
                Condition::IsNull => {
                    qb.push(" IS NULL");
                }
                Condition::Eq(literal) => {
                    qb.push(" = ");
                    literal.push_bind(qb);
                }
                Condition::In(literals) if literals.is_empty() => {
                    qb.push(" IN (NULL)");
                }
                Condition::In(literals) => {
                    qb.push(" IN (");
                    for (i, literal) in literals.iter().enumerate() {
                        if i > 0 {
                            qb.push(", ");
                        }
                        literal.push_bind(qb);
                    }
                    qb.push(")");
                }
            }
        }

        if let Some(search) = &self.search {
            let searchable: Vec<&Column> = columns.searchable().collect();
            if searchable.is_empty() || search.terms.is_empty() {
                return;
            }

            match search.mode {
                SearchMode::Or => {
                    qb.push(" AND (");
                    for (i, term) in search.terms.iter().enumerate() {
                        push_term_match(qb, &searchable, term, i == 0);
                    }
                    qb.push(")");
                }
                SearchMode::And => {
                    for term in &search.terms {
                        qb.push(" AND (");
                        push_term_match(qb, &searchable, term, true);
                        qb.push(")");
                    }
                }
            }
        }
    }

    /// Append `ORDER BY`, `LIMIT` and `OFFSET`.
    pub fn push_order_and_pagination(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        if !self.order_by.is_empty() {
            qb.push(" ORDER BY ");
            for (i, (column, direction)) in self.order_by.iter().enumerate() {
                if i > 0 {
                    qb.push(", ");
                }
                qb.push(column.sql).push(" ").push(direction.as_sql());
            }
        }

        match (self.limit, self.offset) {
            (Some(limit), offset) => {
                qb.push(" LIMIT ").push_bind(limit);
                if let Some(offset) = offset {
                    qb.push(" OFFSET ").push_bind(offset);
                }
            }
            // SQLite only accepts OFFSET after a LIMIT
            (None, Some(offset)) => {
                qb.push(" LIMIT -1 OFFSET ").push_bind(offset);
            }
            (None, None) => {}
        }
    }
}

/// `col1 LIKE ? OR col2 LIKE ? ...` for one term; `first` omits the leading `OR`.
fn push_term_match(qb: &mut QueryBuilder<'_, Sqlite>, searchable: &[&Column], term: &str, first: bool) {
    for (i, column) in searchable.iter().enumerate() {
        if i > 0 || !first {
            qb.push(" OR ");
        }
        qb.push(column.sql).push(" LIKE ");
        qb.push_bind(format!("%{}%", escape_like(term)));
        qb.push(" ESCAPE '\\'");
    }
}

fn parse_where(raw: &str, columns: &Columns) -> Result<Vec<Filter>> {
    let value: Value = serde_json::from_str(raw).map_err(|_| Error::BadRequest {
        message: "Current 'where' parameter is not valid JSON.".to_string(),
    })?;
    let Value::Object(map) = value else {
        return Err(Error::BadRequest {
            message: "The 'where' parameter must be a JSON object.".to_string(),
        });
    };

    map.iter()
        .map(|(name, value)| {
            let column = columns.require(name, "where")?;
            let condition = match value {
                Value::Null => Condition::IsNull,
                Value::Array(items) => Condition::In(
                    items
                        .iter()
                        .map(|item| Literal::from_json(column, item))
                        .collect::<Result<Vec<_>>>()?,
                ),
                value => Condition::Eq(Literal::from_json(column, value)?),
            };
            Ok(Filter { column, condition })
        })
        .collect()
}

fn parse_non_negative(name: &str, raw: &str) -> Result<i64> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|n| *n >= 0)
        .ok_or_else(|| Error::BadRequest {
            message: format!("The '{name}' parameter must be a non-negative integer"),
        })
}

fn split_terms(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(str::to_string).collect()
}

fn parse_search(raw: &str) -> Result<Option<SearchTerms>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    if !raw.starts_with('{') {
        return Ok(Some(SearchTerms {
            mode: SearchMode::Or,
            terms: split_terms(raw),
        }));
    }

    let invalid = || Error::BadRequest {
        message: "Given search parameter is not valid, expected {\"and\": [...]} or {\"or\": [...]}".to_string(),
    };
    let Ok(Value::Object(map)) = serde_json::from_str::<Value>(raw) else {
        return Err(invalid());
    };

    let mut result: Option<SearchTerms> = None;
    for (key, value) in map {
        let mode = match key.as_str() {
            "and" => SearchMode::And,
            "or" => SearchMode::Or,
            _ => return Err(invalid()),
        };
        let terms = match value {
            Value::String(s) => split_terms(&s),
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s),
                    _ => Err(invalid()),
                })
                .collect::<Result<Vec<_>>>()?,
            _ => return Err(invalid()),
        };
        // Both keys given: an AND term list wins, OR terms are appended to it
        match &mut result {
            Some(existing) if mode == SearchMode::And => {
                existing.mode = SearchMode::And;
                existing.terms.extend(terms);
            }
            Some(existing) => existing.terms.extend(terms),
            None => result = Some(SearchTerms { mode, terms }),
        }
    }

    Ok(result.filter(|s| !s.terms.is_empty()))
}

fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    static TEST_COLUMNS: Columns = Columns {
        table: "things",
        columns: &[
            Column::new("id", "id", ColumnKind::Uuid),
            Column::new("name", "name", ColumnKind::Text).searchable(),
            Column::new("firstName", "first_name", ColumnKind::Text).searchable(),
            Column::new("age", "age", ColumnKind::Integer),
        ],
    };

    fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn sql(criteria: &SearchCriteria) -> String {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM things");
        criteria.push_where(&mut qb, &TEST_COLUMNS);
        criteria.push_order_and_pagination(&mut qb);
        qb.sql().to_string()
    }

    #[test]
    fn test_empty_parameters() {
        let criteria = SearchCriteria::parse(&[], &TEST_COLUMNS).unwrap();
        assert_eq!(criteria, SearchCriteria::default());
        assert_eq!(sql(&criteria), "SELECT * FROM things WHERE 1 = 1");
    }

    #[test]
    fn test_where_forms() {
        let id = Uuid::new_v4();
        let raw = json!({"name": "foo", "id": [id.to_string()], "age": null}).to_string();
        let criteria = SearchCriteria::parse(&params(&[("where", &raw)]), &TEST_COLUMNS).unwrap();

        assert_eq!(criteria.filters.len(), 3);
        let by_name = |name: &str| criteria.filters.iter().find(|f| f.column.name == name).unwrap().condition.clone();
        assert_eq!(by_name("name"), Condition::Eq(Literal::Text("foo".to_string())));
        assert_eq!(by_name("id"), Condition::In(vec![Literal::Uuid(id)]));
        assert_eq!(by_name("age"), Condition::IsNull);
    }

    #[test]
    fn test_where_rejects_bad_input() {
        for raw in ["not json", "[1, 2]", r#"{"password": "x"}"#, r#"{"id": "not-a-uuid"}"#, r#"{"name": {"a": 1}}"#] {
            let result = SearchCriteria::parse(&params(&[("where", raw)]), &TEST_COLUMNS);
            assert!(matches!(result, Err(Error::BadRequest { .. })), "expected 400 for {raw}");
        }
    }

    #[test]
    fn test_order_forms() {
        let criteria = SearchCriteria::parse(
            &params(&[("order", "name,-age"), ("order[firstName]", "desc")]),
            &TEST_COLUMNS,
        )
        .unwrap();

        let order: Vec<_> = criteria.order_by.iter().map(|(c, d)| (c.name, *d)).collect();
        assert_eq!(
            order,
            vec![("name", Direction::Asc), ("age", Direction::Desc), ("firstName", Direction::Desc)]
        );
        assert_eq!(
            sql(&criteria),
            "SELECT * FROM things WHERE 1 = 1 ORDER BY name ASC, age DESC, first_name DESC"
        );
    }

    #[test]
    fn test_order_rejects_unknown_column_and_direction() {
        assert!(SearchCriteria::parse(&params(&[("order", "nope")]), &TEST_COLUMNS).is_err());
        assert!(SearchCriteria::parse(&params(&[("order[name]", "sideways")]), &TEST_COLUMNS).is_err());
    }

    #[test]
    fn test_pagination() {
        let criteria = SearchCriteria::parse(&params(&[("limit", "10"), ("offset", "5")]), &TEST_COLUMNS).unwrap();
        assert_eq!(criteria.limit, Some(10));
        assert_eq!(criteria.offset, Some(5));
        assert!(sql(&criteria).ends_with(" LIMIT ? OFFSET ?"));

        let offset_only = SearchCriteria::parse(&params(&[("offset", "5")]), &TEST_COLUMNS).unwrap();
        assert!(sql(&offset_only).ends_with(" LIMIT -1 OFFSET ?"));

        assert!(SearchCriteria::parse(&params(&[("limit", "-1")]), &TEST_COLUMNS).is_err());
        assert!(SearchCriteria::parse(&params(&[("offset", "abc")]), &TEST_COLUMNS).is_err());
    }

    #[test]
    fn test_search_plain_terms_use_or() {
        let criteria = SearchCriteria::parse(&params(&[("search", "john  doe")]), &TEST_COLUMNS).unwrap();
        assert_eq!(
            criteria.search,
            Some(SearchTerms {
                mode: SearchMode::Or,
                terms: vec!["john".to_string(), "doe".to_string()],
            })
        );
        assert_eq!(
            sql(&criteria),
            "SELECT * FROM things WHERE 1 = 1 AND (name LIKE ? ESCAPE '\\' OR first_name LIKE ? ESCAPE '\\' \
             OR name LIKE ? ESCAPE '\\' OR first_name LIKE ? ESCAPE '\\')"
        );
    }

    #[test]
    fn test_search_and_mode() {
        let criteria = SearchCriteria::parse(&params(&[("search", r#"{"and": ["john", "doe"]}"#)]), &TEST_COLUMNS).unwrap();
        assert_eq!(criteria.search.as_ref().unwrap().mode, SearchMode::And);
        assert_eq!(
            sql(&criteria),
            "SELECT * FROM things WHERE 1 = 1 AND (name LIKE ? ESCAPE '\\' OR first_name LIKE ? ESCAPE '\\') \
             AND (name LIKE ? ESCAPE '\\' OR first_name LIKE ? ESCAPE '\\')"
        );
    }

    #[test]
    fn test_search_rejects_bad_json() {
        assert!(SearchCriteria::parse(&params(&[("search", r#"{"xor": ["a"]}"#)]), &TEST_COLUMNS).is_err());
        assert!(SearchCriteria::parse(&params(&[("search", "{broken")]), &TEST_COLUMNS).is_err());
        assert_eq!(
            SearchCriteria::parse(&params(&[("search", "   ")]), &TEST_COLUMNS).unwrap().search,
            None
        );
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }
}
