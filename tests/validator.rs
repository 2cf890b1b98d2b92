//! Shape descriptor and validator behaviour
//!
use serde_json::{Value, json};
use workflow_editor::prelude::*;

fn sample_values() -> Vec<Value> {
    vec![
        json!(null),
        json!(""),
        json!("raster"),
        json!("42"),
        json!(42),
        json!(1.5),
        json!(true),
        json!([]),
        json!(["a"]),
        json!({}),
        json!({"a": 1}),
    ]
}

#[cfg(test)]
mod scalar_tests {
    use super::*;

    #[test]
    fn nullable_string_accepts_exactly_strings_and_null() {
        let shape = Shape::nullable_string();
        for value in sample_values() {
            let expected = value.is_string() || value.is_null();
            assert_eq!(shape.matches(&value), expected, "value: {}", value);
        }
    }

    #[test]
    fn no_coercion_between_strings_and_numbers() {
        assert!(!Shape::string().matches(&json!(42)));
        assert!(!Shape::number().matches(&json!("42")));
        assert!(!Shape::boolean().matches(&json!("true")));
        assert!(Shape::number().matches(&json!(42)));
    }

    #[test]
    fn non_empty_string_rejects_empty() {
        let shape = Shape::non_empty_string();
        assert!(shape.matches(&json!("json")));
        assert!(!shape.matches(&json!("")));
    }

    #[test]
    fn rejection_names_expectation_and_actual() {
        let err = validate(&Shape::nullable_string(), &json!(7)).unwrap_err();
        assert!(err.path.is_root());
        assert_eq!(err.expected, "a string or null");
        assert_eq!(err.actual, "number 7");
    }
}

#[cfg(test)]
mod enumerated_tests {
    use super::*;

    #[test]
    fn single_element_from_allowed_set() {
        let shape = Shape::enumerated(Some(["raster", "vector"]), 1, 1);
        let cases = [
            (json!(["raster"]), true),
            (json!(["vector"]), true),
            (json!([]), false),
            (json!(["raster", "vector"]), false),
            (json!(["plot"]), false),
            (json!([1]), false),
            (json!("raster"), false),
            (json!(null), false),
        ];
        for (value, accepted) in cases {
            assert_eq!(shape.matches(&value), accepted, "value: {}", value);
        }
    }

    #[test]
    fn bad_element_is_reported_by_index() {
        let shape = Shape::enumerated(Some(["raster", "vector"]), 1, 2);
        let err = validate(&shape, &json!(["raster", "plot"])).unwrap_err();
        assert_eq!(err.path.to_string(), "[1]");
        assert_eq!(err.actual, "string \"plot\"");
    }

    #[test]
    fn unrestricted_strings_still_bound_length() {
        let shape = Shape::strings(1, 1);
        assert!(shape.matches(&json!(["anything"])));
        assert!(!shape.matches(&json!([])));
        assert!(!shape.matches(&json!(["a", "b"])));
        assert_eq!(shape.expectation(), "a list of exactly 1 string");
        assert_eq!(Shape::strings(0, 2).expectation(), "a list of 0 to 2 strings");
    }
}

#[cfg(test)]
mod mapping_tests {
    use super::*;

    fn person() -> Shape {
        Shape::mapping([
            Field::required("name", Shape::string()),
            Field::required("nickname", Shape::nullable_string()),
            Field::optional("email", Shape::string()),
            Field::optional("note", Shape::nullable_string()),
        ])
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = validate(
            &person(),
            &json!({"name": "a", "nickname": null, "age": 3}),
        )
        .unwrap_err();
        assert_eq!(err.path.to_string(), "age");
        assert!(err.expected.starts_with("no key `age`"), "{}", err.expected);
    }

    #[test]
    fn required_nullable_differs_from_optional() {
        // Required + nullable: null is fine, absence is not.
        assert!(person().matches(&json!({"name": "a", "nickname": null})));
        let err = validate(&person(), &json!({"name": "a"})).unwrap_err();
        assert_eq!(err.path.to_string(), "nickname");
        assert_eq!(err.actual, "nothing (key is missing)");

        // Optional, not nullable: absence is fine, null is not.
        assert!(!person().matches(&json!({"name": "a", "nickname": "b", "email": null})));

        // Optional + nullable: both are fine.
        assert!(person().matches(&json!({"name": "a", "nickname": "b", "note": null})));
    }

    #[test]
    fn nested_paths_are_reported() {
        let shape = Shape::mapping([Field::required(
            "people",
            Shape::list(person()),
        )]);
        let doc = json!({"people": [
            {"name": "a", "nickname": null},
            {"name": 5, "nickname": null}
        ]});
        let err = validate(&shape, &doc).unwrap_err();
        assert_eq!(err.path.to_string(), "people[1].name");
        assert_eq!(
            err.to_string(),
            "at `people[1].name`: expected a string, found number 5"
        );
    }

    #[test]
    fn keyed_mapping_checks_keys_and_values() {
        let shape = Shape::keyed(KeyPredicate::Not("oneOf".to_string()), Shape::number());
        assert!(shape.matches(&json!({"a": 1, "b": 2})));
        assert!(shape.matches(&json!({})));
        let err = validate(&shape, &json!({"a": 1, "oneOf": 2})).unwrap_err();
        assert_eq!(err.path.to_string(), "oneOf");
        let err = validate(&shape, &json!({"b": "x"})).unwrap_err();
        assert_eq!(err.path.to_string(), "b");
    }

    #[test]
    fn opaque_accepts_any_mapping_only() {
        let shape = Shape::opaque();
        assert!(shape.matches(&json!({"deep": {"anything": [1, 2, {"x": null}]}})));
        assert!(!shape.matches(&json!([1])));
        assert!(!shape.matches(&json!("x")));
    }

    #[test]
    fn validation_returns_input_untouched() {
        let doc = json!({"name": "a", "nickname": null});
        let accepted = validate(&person(), &doc).expect("valid");
        assert!(std::ptr::eq(accepted, &doc));
    }
}

#[cfg(test)]
mod sequence_and_union_tests {
    use super::*;

    #[test]
    fn sequence_bounds() {
        let single = Shape::list_bounded(Shape::number(), 1, Some(1));
        assert_eq!(single.expectation(), "a list of exactly 1 element, each a number");
        let shape = Shape::list_bounded(Shape::number(), 1, Some(2));
        assert!(!shape.matches(&json!([])));
        assert!(shape.matches(&json!([1, 2])));
        assert!(!shape.matches(&json!([1, 2, 3])));
    }

    #[test]
    fn union_accepts_any_variant() {
        let shape = Shape::union([Shape::number(), Shape::boolean()]);
        assert!(shape.matches(&json!(1)));
        assert!(shape.matches(&json!(false)));
        assert!(!shape.matches(&json!("1")));
    }

    #[test]
    fn union_reports_first_variant_and_keeps_the_rest() {
        let shape = Shape::union([
            Shape::mapping([Field::required("$ref", Shape::string())]),
            Shape::mapping([Field::required("items", Shape::opaque())]),
        ]);
        let err = validate(&shape, &json!({"$ref": 3})).unwrap_err();
        assert_eq!(err.path.to_string(), "$ref");
        assert_eq!(err.expected, "a string");
        assert_eq!(err.alternatives.len(), 1);
        assert_eq!(err.alternatives[0].path.to_string(), "$ref");
        assert!(err.alternatives[0].expected.starts_with("no key `$ref`"));
    }

    #[test]
    fn nullable_composite() {
        let shape = Shape::list(Shape::string()).nullable();
        assert!(shape.matches(&json!(null)));
        assert!(shape.matches(&json!(["a"])));
        assert!(!shape.matches(&json!([null])));
    }
}
