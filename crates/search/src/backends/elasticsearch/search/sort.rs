//! Sort clauses.

use serde_json::{Map, Value, json};

use crate::filter::Property;
use crate::types::{Sort, SortValueType};

/// Builds the `sort` array. Returns `None` when there is nothing to sort by,
/// leaving the backend's relevance order in place.
pub fn build_sort(sorts: &[Sort]) -> Option<Value> {
    if sorts.is_empty() {
        return None;
    }
    Some(Value::Array(sorts.iter().map(build_sort_clause).collect()))
}

fn build_sort_clause(sort: &Sort) -> Value {
    let mut options = Map::new();
    options.insert(
        "order".to_string(),
        json!(if sort.reverse { "desc" } else { "asc" }),
    );
    options.insert(
        "unmapped_type".to_string(),
        json!(unmapped_type(sort.value_type)),
    );

    let property = Property::new(sort.field_name.as_str());
    if let Some(path) = property.nested_root() {
        options.insert("nested".to_string(), json!({ "path": path }));
    }

    let mut clause = Map::new();
    clause.insert(sort.field_name.clone(), Value::Object(options));
    Value::Object(clause)
}

fn unmapped_type(value_type: SortValueType) -> &'static str {
    match value_type {
        SortValueType::Long => "long",
        SortValueType::String => "keyword",
        SortValueType::Double => "double",
        SortValueType::Float => "float",
    }
}
