use crate::{
    Error,
    annotate::{AnnotateError, BoxError, KeyAtom, KeySpec},
    db::{DbError, primitives::FilterExpr, query::QueryError, response::Response},
    test_support::{Product, catalog, db_with},
    value::Value,
};
use proptest::prelude::*;

fn names(response: &Response<Product>) -> Vec<String> {
    response.iter().map(|row| row.entity.name.clone()).collect()
}

//
// Order preservation
//

#[test]
fn annotate_preserves_implicit_row_order() {
    let db = db_with(&catalog());
    let manager = db.manager::<Product>();

    let base_keys = manager.all().execute().unwrap().keys();
    let annotated = manager.annotate_property("name_length").unwrap();

    assert_eq!(annotated.execute().unwrap().keys(), base_keys);
}

#[test]
fn annotate_preserves_explicit_row_order() {
    let db = db_with(&catalog());
    let manager = db.manager::<Product>();

    let base = manager.all().order_by_desc("name");
    let base_names = names(&base.execute().unwrap());
    assert_eq!(base_names, vec!["Carla", "Bob", "Amy"]);

    let annotated = base.annotate_property("name_length").unwrap();
    assert_eq!(names(&annotated.execute().unwrap()), base_names);
}

//
// Naming
//

#[test]
fn default_output_name_appends_property() {
    let db = db_with(&catalog());

    let response = db
        .manager::<Product>()
        .annotate_property("name_length")
        .unwrap()
        .execute()
        .unwrap();

    assert_eq!(
        response.annotation_values("name_length_property"),
        vec![Value::Int(3), Value::Int(3), Value::Int(5)]
    );
}

#[test]
fn explicit_output_name_wins() {
    let db = db_with(&catalog());

    let response = db
        .manager::<Product>()
        .annotate_property_as("name_length", "nl")
        .unwrap()
        .execute()
        .unwrap();

    assert_eq!(
        response.annotation_values("nl"),
        vec![Value::Int(3), Value::Int(3), Value::Int(5)]
    );
    assert!(response.rows()[0].annotation("name_length_property").is_none());
}

#[test]
fn callable_without_name_is_invalid() {
    let db = db_with(&catalog());

    let err = db
        .manager::<Product>()
        .annotate_property(KeySpec::call(|p: &Product| p.price * 2))
        .unwrap_err();

    assert!(matches!(
        err,
        Error::AnnotateError(AnnotateError::InvalidArgument { .. })
    ));
}

#[test]
fn composite_spec_is_invalid_for_annotation() {
    let db = db_with(&catalog());

    let err = db
        .manager::<Product>()
        .annotate_property_as(["name_length", "name"], "pair")
        .unwrap_err();

    assert!(matches!(
        err,
        Error::AnnotateError(AnnotateError::InvalidArgument { .. })
    ));
}

//
// Sorting
//

#[test]
fn composite_sort_breaks_ties_by_later_keys() {
    let db = db_with(&catalog());

    let sorted = db.manager::<Product>().sort(["name_length", "name"]).unwrap();

    assert_eq!(
        names(&sorted.execute().unwrap()),
        vec!["Amy", "Bob", "Carla"]
    );
}

#[test]
fn sort_is_stable_for_equal_keys() {
    // Bob precedes Amy in natural key order; both have length 3.
    let db = db_with(&catalog());

    let sorted = db.manager::<Product>().sort("name_length").unwrap();

    assert_eq!(
        names(&sorted.execute().unwrap()),
        vec!["Bob", "Amy", "Carla"]
    );
}

#[test]
fn sort_desc_reverses_distinct_keys_and_stays_stable() {
    let db = db_with(&catalog());

    let sorted = db.manager::<Product>().sort_desc("name_length").unwrap();

    // Carla (5) first; the tied pair keeps its materialized order.
    assert_eq!(
        names(&sorted.execute().unwrap()),
        vec!["Carla", "Bob", "Amy"]
    );
}

#[test]
fn sort_accepts_callables_and_mixed_composites() {
    let db = db_with(&catalog());

    let spec = KeySpec::composite([
        KeyAtom::call(|p: &Product| p.name_length()),
        KeyAtom::name("name"),
    ]);
    let sorted = db.manager::<Product>().sort(spec).unwrap();

    assert_eq!(
        names(&sorted.execute().unwrap()),
        vec!["Amy", "Bob", "Carla"]
    );
}

#[test]
fn sort_result_remains_chainable() {
    let db = db_with(&catalog());

    let response = db
        .manager::<Product>()
        .sort(["name_length", "name"])
        .unwrap()
        .filter(FilterExpr::gt("price", 100))
        .execute()
        .unwrap();

    assert_eq!(names(&response), vec!["Amy", "Carla"]);
}

#[test]
fn slicing_composes_after_sort() {
    let db = db_with(&catalog());

    let response = db
        .manager::<Product>()
        .sort(["name_length", "name"])
        .unwrap()
        .offset(1)
        .limit(1)
        .execute()
        .unwrap();

    assert_eq!(names(&response), vec!["Bob"]);
}

//
// Composability
//

#[test]
fn exclude_on_annotated_field_keeps_relative_order() {
    let db = db_with(&catalog());

    let response = db
        .manager::<Product>()
        .annotate_property("name_length")
        .unwrap()
        .exclude(FilterExpr::lt("name_length_property", 5))
        .execute()
        .unwrap();

    assert_eq!(names(&response), vec!["Carla"]);
}

#[test]
fn filter_on_annotated_field_uses_standard_operators() {
    let db = db_with(&catalog());

    let response = db
        .manager::<Product>()
        .annotate_property("name_length")
        .unwrap()
        .filter(FilterExpr::lte("name_length_property", 3))
        .execute()
        .unwrap();

    assert_eq!(names(&response), vec!["Bob", "Amy"]);
}

#[test]
fn annotating_twice_carries_both_fields() {
    let db = db_with(&catalog());
    let manager = db.manager::<Product>();

    let base_keys = manager.all().execute().unwrap().keys();

    let response = manager
        .annotate_property("name_length")
        .unwrap()
        .annotate_property("margin")
        .unwrap()
        .execute()
        .unwrap();

    assert_eq!(response.keys(), base_keys);
    assert_eq!(
        response.annotation_values("name_length_property"),
        vec![Value::Int(3), Value::Int(3), Value::Int(5)]
    );
    assert_eq!(
        response.annotation_values("margin_property"),
        vec![Value::Float(0.4), Value::Float(0.8), Value::Float(0.2)]
    );
}

#[test]
fn annotation_survives_a_subsequent_sort() {
    let db = db_with(&catalog());

    let response = db
        .manager::<Product>()
        .annotate_property("name_length")
        .unwrap()
        .sort("name")
        .unwrap()
        .execute()
        .unwrap();

    assert_eq!(names(&response), vec!["Amy", "Bob", "Carla"]);
    assert_eq!(
        response.annotation_values("name_length_property"),
        vec![Value::Int(3), Value::Int(3), Value::Int(5)]
    );
}

#[test]
fn annotate_after_filter_only_covers_matching_rows() {
    let db = db_with(&catalog());

    let response = db
        .manager::<Product>()
        .filter(FilterExpr::gt("price", 100))
        .annotate_property("name_length")
        .unwrap()
        .execute()
        .unwrap();

    assert_eq!(names(&response), vec!["Amy", "Carla"]);
}

//
// Empty result sets
//

#[test]
fn annotate_on_empty_result_set_is_a_no_op() {
    let db = db_with(&catalog());

    let annotated = db
        .manager::<Product>()
        .filter(FilterExpr::eq("name", "Zed"))
        .annotate_property("name_length")
        .unwrap();

    assert!(annotated.is_empty().unwrap());

    // still chainable
    let response = annotated
        .filter(FilterExpr::gt("price", 0))
        .execute()
        .unwrap();
    assert_eq!(response.count(), 0);
}

#[test]
fn sort_on_empty_result_set_is_a_no_op() {
    let db = db_with(&[]);

    let sorted = db.manager::<Product>().sort("name_length").unwrap();

    assert!(sorted.is_empty().unwrap());
}

//
// Failure propagation
//

#[test]
fn callable_failure_aborts_the_whole_call() {
    let db = db_with(&catalog());

    let spec = KeySpec::try_call(|p: &Product| -> Result<i64, BoxError> {
        if p.name == "Amy" {
            Err("no key for Amy".into())
        } else {
            Ok(p.price)
        }
    });

    let err = db
        .manager::<Product>()
        .annotate_property_as(spec, "price_key")
        .unwrap_err();

    assert!(matches!(
        err,
        Error::AnnotateError(AnnotateError::KeyEvaluation { entity: "Product", .. })
    ));
}

#[test]
fn unresolvable_name_aborts_the_whole_call() {
    let db = db_with(&catalog());

    let err = db
        .manager::<Product>()
        .sort("mystery")
        .unwrap_err();

    assert!(matches!(
        err,
        Error::AnnotateError(AnnotateError::UnresolvableKey { entity: "Product", name })
            if name == "mystery"
    ));
}

#[test]
fn unresolvable_name_fails_fast_even_for_empty_sets() {
    let db = db_with(&[]);

    let err = db.manager::<Product>().sort("mystery").unwrap_err();

    assert!(matches!(
        err,
        Error::AnnotateError(AnnotateError::UnresolvableKey { .. })
    ));
}

#[test]
fn composite_failure_in_one_atom_aborts_the_whole_call() {
    let db = db_with(&catalog());

    let spec = KeySpec::composite([
        KeyAtom::name("name_length"),
        KeyAtom::name("mystery"),
    ]);
    let err = db.manager::<Product>().sort(spec).unwrap_err();

    assert!(matches!(
        err,
        Error::AnnotateError(AnnotateError::UnresolvableKey { .. })
    ));
}

#[test]
fn filtering_on_a_missing_annotation_name_fails_lazily() {
    let db = db_with(&catalog());

    let err = db
        .manager::<Product>()
        .filter(FilterExpr::gt("name_length_property", 3))
        .execute()
        .unwrap_err();

    assert!(matches!(
        err,
        Error::DbError(DbError::QueryError(QueryError::UnknownField { field, .. }))
            if field == "name_length_property"
    ));
}

//
// Properties over arbitrary catalogs
//

proptest! {
    #[test]
    fn annotate_preserves_order_for_arbitrary_catalogs(
        rows in prop::collection::btree_map(any::<u128>(), ("[a-z]{0,6}", 1i64..1000), 0..24)
    ) {
        let products: Vec<Product> = rows
            .into_iter()
            .map(|(raw, (name, price))| Product::fixture(raw, &name, price, price / 2))
            .collect();

        let db = db_with(&products);
        let manager = db.manager::<Product>();

        let base_keys = manager.all().execute().unwrap().keys();
        let annotated = manager.annotate_property("name_length").unwrap();

        prop_assert_eq!(annotated.execute().unwrap().keys(), base_keys);
    }

    #[test]
    fn sort_matches_host_sort_semantics(
        rows in prop::collection::btree_map(any::<u128>(), "[a-z]{0,6}", 0..24)
    ) {
        let products: Vec<Product> = rows
            .into_iter()
            .map(|(raw, name)| Product::fixture(raw, &name, 100, 50))
            .collect();

        let db = db_with(&products);

        let mut expected: Vec<String> = products.iter().map(|p| p.name.clone()).collect();
        expected.sort();

        let sorted = db.manager::<Product>().sort("name").unwrap();
        prop_assert_eq!(names(&sorted.execute().unwrap()), expected);
    }
}
