use serde_json::{Map, Value};

/// Recursively rewrites every snake_case object key in `value` to camelCase.
///
/// Array elements are transformed one by one; strings, numbers, booleans and
/// `null` are returned untouched. Keys that are not snake_case (already
/// camelCase, leading underscores, upper case, ...) are kept as they are, so
/// applying the transform to its own output is a no-op.
#[must_use]
pub fn camelize_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (key, inner) in map {
                out.insert(to_camel_case(&key), camelize_keys(inner));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(camelize_keys).collect()),
        other => other,
    }
}

/// Converts a single snake_case identifier to camelCase.
///
/// Only names matching `[a-z][a-z0-9]*(_[a-z0-9]+)+` are converted; anything
/// else is returned unchanged.
#[must_use]
pub fn to_camel_case(key: &str) -> String {
    if !is_snake_case(key) {
        return key.to_owned();
    }

    let mut out = String::with_capacity(key.len());
    for (i, segment) in key.split('_').enumerate() {
        if i == 0 {
            out.push_str(segment);
            continue;
        }
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            out.push(first.to_ascii_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}

fn is_snake_case(key: &str) -> bool {
    let mut segments = key.split('_');
    let Some(head) = segments.next() else {
        return false;
    };
    if !head.starts_with(|c: char| c.is_ascii_lowercase()) || !is_lower_alnum(head) {
        return false;
    }

    let mut has_tail = false;
    for segment in segments {
        if segment.is_empty() || !is_lower_alnum(segment) {
            return false;
        }
        has_tail = true;
    }
    has_tail
}

fn is_lower_alnum(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn converts_simple_keys() {
        assert_eq!(to_camel_case("tax_filing_status"), "taxFilingStatus");
        assert_eq!(to_camel_case("address_line_1"), "addressLine1");
        assert_eq!(to_camel_case("id"), "id");
    }

    #[test]
    fn leaves_non_snake_keys_alone() {
        assert_eq!(to_camel_case("taxFilingStatus"), "taxFilingStatus");
        assert_eq!(to_camel_case("_private"), "_private");
        assert_eq!(to_camel_case("trailing_"), "trailing_");
        assert_eq!(to_camel_case("double__under"), "double__under");
        assert_eq!(to_camel_case("SCREAMING_CASE"), "SCREAMING_CASE");
        assert_eq!(to_camel_case("mixed_Case"), "mixed_Case");
        assert_eq!(to_camel_case(""), "");
    }

    #[test]
    fn transforms_nested_objects_and_arrays() {
        let input = json!({
            "household_id": "h1",
            "members": [
                { "first_name": "Ada", "birth_year": 1990 },
                { "first_name": "Bo", "tags": ["snake_case_value"] }
            ],
            "tax_profile": { "filing_status": "married_joint", "state_code": null }
        });

        let expected = json!({
            "householdId": "h1",
            "members": [
                { "firstName": "Ada", "birthYear": 1990 },
                { "firstName": "Bo", "tags": ["snake_case_value"] }
            ],
            "taxProfile": { "filingStatus": "married_joint", "stateCode": null }
        });

        assert_eq!(camelize_keys(input), expected);
    }

    #[test]
    fn primitives_pass_through() {
        assert_eq!(camelize_keys(json!("some_string")), json!("some_string"));
        assert_eq!(camelize_keys(json!(42)), json!(42));
        assert_eq!(camelize_keys(json!(null)), json!(null));
        assert_eq!(camelize_keys(json!([1, "a_b", true])), json!([1, "a_b", true]));
    }

    #[test]
    fn second_application_is_noop() {
        let once = camelize_keys(json!({
            "results": [{ "id": "h1", "tax_filing_status": "married_joint" }],
            "next_page": null
        }));
        let twice = camelize_keys(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn household_envelope_scenario() {
        let out = camelize_keys(json!({
            "results": [{ "id": "h1", "tax_filing_status": "married_joint" }]
        }));
        assert_eq!(
            out,
            json!({ "results": [{ "id": "h1", "taxFilingStatus": "married_joint" }] })
        );
    }
}
