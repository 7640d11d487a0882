use criterion::{Criterion, criterion_group, criterion_main};
use formgate::{PredicateSet, Rules, dispatch_name, parse};
use serde_json::json;
use std::hint::black_box;

fn bench_rule_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("rule_parsing");

    group.bench_function("simple_chain", |b| {
        b.iter(|| parse(black_box("required|email")))
    });

    group.bench_function("chain_with_params", |b| {
        b.iter(|| parse(black_box("required|minLength[3]|maxLength[20]|listed[a, b, c, d]")))
    });

    group.bench_function("dispatch_name", |b| {
        b.iter(|| dispatch_name(black_box("min_length")))
    });

    group.finish();
}

fn bench_predicates(c: &mut Criterion) {
    let mut group = c.benchmark_group("predicates");
    let set = PredicateSet::builtin();
    let no_params: Vec<String> = Vec::new();
    let length = vec!["5".to_string()];

    let email = set.get("isEmail").unwrap();
    group.bench_function("email", |b| {
        b.iter(|| email(black_box(&[json!("user@example.com")]), &no_params))
    });

    let min_length = set.get("isMinLength").unwrap();
    group.bench_function("min_length", |b| {
        b.iter(|| min_length(black_box(&[json!("Hello World")]), &length))
    });

    group.finish();
}

fn signup_rules(username: &str) -> Rules {
    let mut rules = Rules::from_json(json!({
        "username": username,
        "email": "john@example.com",
        "age": "34",
        "role": "admin",
    }))
    .unwrap();

    rules
        .add_rule("username", "Username", "required|minLength[3]|maxLength[20]")
        .add_rule("email", "E-mail", "required|email")
        .add_rule("age", "Age", "integer|between[18, 120]")
        .add_rule("role", "Role", "listed[admin, editor]");
    rules
}

fn bench_validation_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("validation_pass");

    let mut passing = signup_rules("john_doe");
    group.bench_function("all_passing", |b| b.iter(|| passing.validate().unwrap()));

    let mut failing = signup_rules("jo");
    group.bench_function("with_failures", |b| b.iter(|| failing.validate().unwrap()));

    group.finish();
}

criterion_group!(
    validation_benches,
    bench_rule_parsing,
    bench_predicates,
    bench_validation_pass,
);

criterion_main!(validation_benches);
