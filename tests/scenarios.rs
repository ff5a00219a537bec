// SPDX-License-Identifier: MPL-2.0

//! End-to-end scenarios exercising the full pipeline (grammar sugar → `Cube`/`Query` → rendering
//! or binding) rather than a single module in isolation.

use log::LevelFilter;
use std::io::Write;

use query_algebra::{Constraint, DefaultFormatter, Map, Query};
use query_values::{NaturalOrderComparator, Parameter};

fn init_log() {
    let _ = env_logger::builder()
        .filter_level(LevelFilter::Trace)
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .is_test(true)
        .try_init();
}

fn cmp() -> NaturalOrderComparator {
    NaturalOrderComparator
}

fn fields(pairs: Vec<(&str, Constraint<NaturalOrderComparator>)>) -> Map<Constraint<NaturalOrderComparator>> {
    let mut m = Map::default();
    for (k, v) in pairs {
        m.insert(k.to_string(), v);
    }
    m
}

#[test]
fn or_and_factoring_render_as_a_single_parenthesized_disjunction() {
    init_log();
    let a = Query::from_constraints(fields(vec![("x", Constraint::below(2)), ("y", 4.into())]), cmp()).unwrap();
    let b = Query::from_constraints(fields(vec![("z", 5.into())]), cmp()).unwrap();
    let combined = a.and(&b).unwrap();

    let c = Query::from_constraints(
        fields(vec![("x", Constraint::between(6, 8)), ("y", 3.into()), ("z", 99.into())]),
        cmp(),
    )
    .unwrap();
    let result = combined.or(&c);

    assert_eq!(
        result.to_expression(&DefaultFormatter, None),
        "(x<2 and y=4 and z=5 or x>=6 and x<8 and y=3 and z=99)"
    );
}

#[test]
fn nested_subquery_renders_with_dotted_paths() {
    init_log();
    let beta = fields(vec![("nuts", "brazil".into())]);
    let y = fields(vec![("alpha", Constraint::between(2, 6)), ("beta", Constraint::Record(beta))]);
    let q = Query::from_constraints(fields(vec![("x", Constraint::below(2)), ("y", Constraint::Record(y))]), cmp()).unwrap();

    assert_eq!(
        q.to_expression(&DefaultFormatter, None),
        "x<2 and (y.alpha>=2 and y.alpha<6 and (y.beta.nuts=\"brazil\"))"
    );
}

#[test]
fn intersecting_has_element_ranges_on_different_parameters_keeps_both() {
    init_log();
    let param1 = Parameter::named("param1").unwrap();
    let param2 = Parameter::named("param2").unwrap();

    let y1 = fields(vec![
        ("alpha", Constraint::between(2, 6)),
        ("nuts", Constraint::has(Constraint::Scalar(param1.clone().into()))),
    ]);
    let a = Query::from_constraints(fields(vec![("x", Constraint::below(2)), ("y", Constraint::Record(y1))]), cmp()).unwrap();

    let y2 = fields(vec![("nuts", Constraint::has(Constraint::Scalar(param2.clone().into())))]);
    let b = Query::from_constraints(fields(vec![("y", Constraint::Record(y2))]), cmp()).unwrap();

    let combined = a.and(&b).unwrap();
    let rendered = combined.to_expression(&DefaultFormatter, None);

    // Both parameters survive the intersection of the two `has` constraints on the same
    // dimension; neither is silently dropped just because they name different parameters.
    assert!(rendered.contains(&format!("${}", param1.name())), "missing param1 in {rendered:?}");
    assert!(rendered.contains(&format!("${}", param2.name())), "missing param2 in {rendered:?}");
    assert!(rendered.contains("y.nuts has("), "missing the has() clause in {rendered:?}");
}

#[test]
fn factor_splits_matching_cubes_from_the_remainder() {
    init_log();
    let a = Query::from_constraints(
        fields(vec![("x", 2.into()), ("y", Constraint::between(3, 4)), ("z", 8.into())]),
        cmp(),
    )
    .unwrap();
    let b = Query::from_constraints(fields(vec![("x", 2.into()), ("y", Constraint::below(4)), ("z", 7.into())]), cmp()).unwrap();
    let c = Query::from_constraints(fields(vec![("x", 3.into()), ("y", Constraint::at_least(3)), ("z", 7.into())]), cmp()).unwrap();

    let all = a.or(&b).or(&c);
    let factor_range = query_algebra::Range::equals(2, cmp());
    let (factored, remainder) = all.factor("x", &factor_range);

    let expected_factored = Query::from_constraints(fields(vec![("y", Constraint::between(3, 4)), ("z", 8.into())]), cmp())
        .unwrap()
        .or(&Query::from_constraints(fields(vec![("y", Constraint::below(4)), ("z", 7.into())]), cmp()).unwrap());
    assert!(factored.unwrap().equals(&expected_factored).unwrap().is_true());

    let expected_remainder =
        Query::from_constraints(fields(vec![("x", 3.into()), ("y", Constraint::at_least(3)), ("z", 7.into())]), cmp()).unwrap();
    assert!(remainder.unwrap().equals(&expected_remainder).unwrap().is_true());
}

#[test]
fn parametric_bounds_make_containment_unknown_in_both_directions() {
    init_log();
    let p1 = Parameter::named("p1").unwrap();
    let p2 = Parameter::named("p2").unwrap();
    let p3 = Parameter::named("p3").unwrap();

    let beta = fields(vec![("nuts", Constraint::Scalar(p2.clone().into()))]);

    let y2 = fields(vec![("alpha", Constraint::between(2, p3.clone())), ("beta", Constraint::Record(beta.clone()))]);
    let q2 = Query::from_constraints(
        fields(vec![("x", Constraint::between(p1.clone(), 2)), ("y", Constraint::Record(y2))]),
        cmp(),
    )
    .unwrap();

    let y3 = fields(vec![("alpha", Constraint::between(2, 8)), ("beta", Constraint::Record(beta))]);
    let q3 = Query::from_constraints(
        fields(vec![("x", Constraint::between(p1, 2)), ("y", Constraint::Record(y3))]),
        cmp(),
    )
    .unwrap();

    assert!(q3.contains(&q2).unwrap().is_unknown());
    assert!(q2.contains(&q3).unwrap().is_unknown());
}

#[test]
fn binding_substitutes_the_parameter_without_disturbing_surrounding_structure() {
    init_log();
    let min_age = Parameter::named("min_age").unwrap();
    let student = fields(vec![("age", Constraint::ge(min_age.clone()))]);
    let q = Query::from_constraints(fields(vec![("student", Constraint::Record(student))]), cmp()).unwrap();

    assert_eq!(q.to_expression(&DefaultFormatter, None), "(student.age>=$min_age)");

    let mut env = query_algebra::Bindings::default();
    env.insert(min_age.name().to_string(), query_values::Value::Int(27));
    let bound = q.bind(&env);

    assert_eq!(bound.to_expression(&DefaultFormatter, None), "(student.age>=27)");
}

#[test]
fn dimension_order_does_not_affect_query_equality() {
    init_log();
    let a = Query::from_constraints(fields(vec![("x", 1.into()), ("y", 2.into()), ("z", 3.into())]), cmp()).unwrap();
    let b = Query::from_constraints(fields(vec![("z", 3.into()), ("x", 1.into()), ("y", 2.into())]), cmp()).unwrap();
    assert!(a.equals(&b).unwrap().is_true());
}
