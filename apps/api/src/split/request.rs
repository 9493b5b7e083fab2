use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::calendar::Scalar;
use crate::store::Filter;

/// Body of `POST /split-calendar`. Every field is optional on the wire;
/// `into_lookup` decides whether the combination is usable.
#[derive(Debug, Default, Deserialize)]
pub struct SplitRequest {
    #[serde(default, alias = "calendarRowId")]
    pub id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub month: Option<Scalar>,
    #[serde(default)]
    pub year: Option<Scalar>,
    #[serde(default)]
    pub platform: Option<String>,
}

/// How the source row is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    ById(Uuid),
    ByFilter(Vec<Filter>),
}

impl Lookup {
    pub fn filters(&self) -> Vec<Filter> {
        match self {
            Lookup::ById(id) => vec![Filter::eq("id", id.to_string())],
            Lookup::ByFilter(filters) => filters.clone(),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Lookup::ById(id) => format!("id={id}"),
            Lookup::ByFilter(filters) => filters
                .iter()
                .map(|f| format!("{}={}", f.column, f.value))
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Text used to filter on `month`/`year`. Numbers must be whole: `3.0` filters
/// as `3`, while `3.5` is rejected because it can never match the column.
fn whole_number_text(column: &str, value: Option<Scalar>) -> Result<Option<String>, AppError> {
    let n = match value {
        None => return Ok(None),
        Some(Scalar::Text(s)) => return Ok(Some(s)),
        Some(Scalar::Number(n)) => n,
    };

    if let Some(i) = n.as_i64() {
        return Ok(Some(i.to_string()));
    }
    if let Some(u) = n.as_u64() {
        return Ok(Some(u.to_string()));
    }
    match n.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
            Ok(Some((f as i64).to_string()))
        }
        _ => Err(AppError::Validation(format!(
            "'{column}' must be a whole number, got {n}"
        ))),
    }
}

impl SplitRequest {
    /// Validates the request shape and turns it into a lookup.
    /// Blank strings count as absent. `id` and filter fields are mutually exclusive.
    pub fn into_lookup(self) -> Result<Lookup, AppError> {
        let id = non_empty(self.id);

        let filters: Vec<Filter> = [
            ("user_id", non_empty(self.user_id)),
            ("month", non_empty(whole_number_text("month", self.month)?)),
            ("year", non_empty(whole_number_text("year", self.year)?)),
            ("platform", non_empty(self.platform)),
        ]
        .into_iter()
        .filter_map(|(column, value)| value.map(|v| Filter::eq(column, v)))
        .collect();

        match id {
            Some(_) if !filters.is_empty() => Err(AppError::Validation(
                "Provide either 'id' or filter fields (user_id, month, year, platform), not both"
                    .to_string(),
            )),
            Some(id) => Uuid::parse_str(&id)
                .map(Lookup::ById)
                .map_err(|_| AppError::Validation(format!("'id' must be a UUID, got '{id}'"))),
            None if filters.is_empty() => Err(AppError::Validation(
                "Request must include 'id' or at least one of user_id, month, year, platform"
                    .to_string(),
            )),
            None => Ok(Lookup::ByFilter(filters)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(body: serde_json::Value) -> SplitRequest {
        serde_json::from_value(body).unwrap()
    }

    fn assert_validation(result: Result<Lookup, AppError>) {
        match result {
            Err(AppError::Validation(_)) => {}
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_id_lookup() {
        let lookup = parse(json!({ "id": "7577a560-6d0a-4f00-87cf-d943306f3d45" }))
            .into_lookup()
            .unwrap();
        assert_eq!(
            lookup,
            Lookup::ById(Uuid::parse_str("7577a560-6d0a-4f00-87cf-d943306f3d45").unwrap())
        );
    }

    #[test]
    fn test_legacy_calendar_row_id_alias() {
        let lookup = parse(json!({ "calendarRowId": "7577a560-6d0a-4f00-87cf-d943306f3d45" }))
            .into_lookup()
            .unwrap();
        assert!(matches!(lookup, Lookup::ById(_)));
    }

    #[test]
    fn test_filter_lookup_keeps_only_non_empty_fields() {
        let lookup = parse(json!({ "user_id": "u1", "month": 3, "year": "2024", "platform": "  " }))
            .into_lookup()
            .unwrap();
        assert_eq!(
            lookup,
            Lookup::ByFilter(vec![
                Filter::eq("user_id", "u1"),
                Filter::eq("month", "3"),
                Filter::eq("year", "2024"),
            ])
        );
    }

    #[test]
    fn test_integral_float_month_filters_as_integer() {
        let lookup = parse(json!({ "month": 3.0, "year": 2024 }))
            .into_lookup()
            .unwrap();
        assert_eq!(
            lookup,
            Lookup::ByFilter(vec![Filter::eq("month", "3"), Filter::eq("year", "2024")])
        );
    }

    #[test]
    fn test_fractional_month_is_rejected() {
        assert_validation(parse(json!({ "user_id": "u1", "month": 3.5 })).into_lookup());
    }

    #[test]
    fn test_empty_request_is_rejected() {
        assert_validation(parse(json!({})).into_lookup());
    }

    #[test]
    fn test_blank_fields_are_rejected() {
        assert_validation(parse(json!({ "id": " ", "user_id": "", "month": "" })).into_lookup());
    }

    #[test]
    fn test_id_with_filters_is_rejected() {
        assert_validation(
            parse(json!({ "id": "7577a560-6d0a-4f00-87cf-d943306f3d45", "user_id": "u1" }))
                .into_lookup(),
        );
    }

    #[test]
    fn test_malformed_id_is_rejected() {
        assert_validation(parse(json!({ "id": "not-a-uuid" })).into_lookup());
    }

    #[test]
    fn test_id_lookup_filters_on_id_column() {
        let id = Uuid::new_v4();
        assert_eq!(
            Lookup::ById(id).filters(),
            vec![Filter::eq("id", id.to_string())]
        );
    }
}
