use crate::{
    db::{
        executor::LoadExecutor,
        primitives::{CaseExpr, FilterExpr, OrderSpec},
        query::LoadQuery,
        response::Response,
    },
    test_support::{Product, catalog, db_with},
    types::Ulid,
    value::Value,
};

fn names(response: &Response<Product>) -> Vec<String> {
    response.iter().map(|row| row.entity.name.clone()).collect()
}

#[test]
fn empty_query_returns_all_rows_in_key_order() {
    let db = db_with(&catalog());

    let response = LoadExecutor::<Product>::new(&db)
        .execute(&LoadQuery::new())
        .unwrap();

    assert_eq!(names(&response), vec!["Bob", "Amy", "Carla"]);
}

#[test]
fn key_access_restricts_without_reordering() {
    let db = db_with(&catalog());

    let query = LoadQuery::new().keys([Ulid::from_u128(3), Ulid::from_u128(1)]);
    let response = LoadExecutor::<Product>::new(&db).execute(&query).unwrap();

    // access restricts; only an order spec reorders
    assert_eq!(names(&response), vec!["Bob", "Carla"]);
}

#[test]
fn order_by_field_is_stable() {
    let db = db_with(&catalog());

    // price ties: none here, so exercise a constant-free field
    let query = LoadQuery::new().order_by_desc("name");
    let response = LoadExecutor::<Product>::new(&db).execute(&query).unwrap();

    assert_eq!(names(&response), vec!["Carla", "Bob", "Amy"]);
}

#[test]
fn annotations_participate_in_filters_and_order() {
    let db = db_with(&catalog());

    let badge = CaseExpr::over("id")
        .when(Ulid::from_u128(1), 20)
        .when(Ulid::from_u128(2), 10)
        .when(Ulid::from_u128(3), 30);

    let query = LoadQuery::new()
        .annotate("badge", badge)
        .filter(FilterExpr::gt("badge", 5))
        .order_by("badge");
    let response = LoadExecutor::<Product>::new(&db).execute(&query).unwrap();

    assert_eq!(names(&response), vec!["Amy", "Bob", "Carla"]);
    assert_eq!(
        response.annotation_values("badge"),
        vec![Value::Int(10), Value::Int(20), Value::Int(30)]
    );
}

#[test]
fn rows_outside_a_case_expression_annotate_as_null() {
    let db = db_with(&catalog());

    let badge = CaseExpr::over("id").when(Ulid::from_u128(2), 10);
    let query = LoadQuery::new().annotate("badge", badge);
    let response = LoadExecutor::<Product>::new(&db).execute(&query).unwrap();

    assert_eq!(
        response.annotation_values("badge"),
        vec![Value::Null, Value::Int(10), Value::Null]
    );

    // Null never matches ordering comparisons
    let filtered = LoadExecutor::<Product>::new(&db)
        .execute(
            &LoadQuery::new()
                .annotate("badge", CaseExpr::over("id").when(Ulid::from_u128(2), 10))
                .filter(FilterExpr::gte("badge", 0)),
        )
        .unwrap();
    assert_eq!(names(&filtered), vec!["Amy"]);
}

#[test]
fn window_applies_after_ordering() {
    let db = db_with(&catalog());

    let query = LoadQuery::new().order_by("name").offset(1).limit(1);
    let response = LoadExecutor::<Product>::new(&db).execute(&query).unwrap();

    assert_eq!(names(&response), vec!["Bob"]);
}

#[test]
fn order_by_expression_imposes_an_explicit_row_order() {
    let db = db_with(&catalog());

    let position = CaseExpr::over("id")
        .when(Ulid::from_u128(2), 0)
        .when(Ulid::from_u128(3), 1)
        .when(Ulid::from_u128(1), 2);

    let query = LoadQuery::new().ordered(OrderSpec::by_expr(position));
    let response = LoadExecutor::<Product>::new(&db).execute(&query).unwrap();

    assert_eq!(names(&response), vec!["Amy", "Carla", "Bob"]);
}
