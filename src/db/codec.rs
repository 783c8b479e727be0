//! Result-set to JSON projection.

use sea_orm::{FromQueryResult, JsonValue, QueryResult};

use crate::error::{ApiError, ApiResult};

/// Convert a result set into JSON. Empty sets become `[]`; a single row
/// becomes a bare object when `can_be_object` is set, so singleton lookups
/// read as `{…}` while list endpoints always read as `[…]`.
///
/// Column typing follows the database types: booleans, integers and floats
/// keep their JSON scalar kind, everything else is rendered as a string and
/// SQL `NULL` becomes JSON `null`.
pub fn rows_to_json(rows: &[QueryResult], can_be_object: bool) -> ApiResult<JsonValue> {
    if rows.is_empty() {
        return Ok(JsonValue::Array(Vec::new()));
    }

    let mut items = Vec::with_capacity(rows.len());
    for row in rows {
        items.push(JsonValue::from_query_result(row, "").map_err(|_| ApiError::Json)?);
    }

    if items.len() == 1 && can_be_object {
        return Ok(items.remove(0));
    }
    Ok(JsonValue::Array(items))
}
