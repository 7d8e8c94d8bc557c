//! End-to-end grading tests: concurrent case evaluation, verdict
//! aggregation and fail-soft fault reporting.

use grader::error::GraderError;
use grader::types::{TestCase, Verdict};
use grader::{GradingJob, grade_all};
use sandbox::outcome::Fault;
use serde_json::json;
use util::execution_config::ExecutionConfig;

fn inputs(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

fn config(budget: u64) -> ExecutionConfig {
    ExecutionConfig {
        step_budget: budget,
        max_concurrent_cases: 4,
    }
}

#[tokio::test]
async fn all_cases_pass() {
    // Doubles the numeric input.
    let program = "let n = prompt()\nlet x = 0\nwhile (x + '' != n) { x = x + 1 }\nx * 2";
    let cases = vec![
        TestCase::new(inputs(&["2"]), json!(4)),
        TestCase::new(inputs(&["5"]), json!(10)),
    ];
    let report = grade_all(program, cases, 100_000).await.unwrap();
    assert_eq!(report.verdict, Verdict::All);
    assert_eq!(report.passed, vec![true, true]);
    assert!(report.fault.is_none());
}

#[tokio::test]
async fn mixed_results_yield_partial() {
    let program = "prompt()";
    let cases = vec![
        TestCase::new(inputs(&["a"]), json!("a")),
        TestCase::new(inputs(&["b"]), json!("wrong")),
        TestCase::new(inputs(&["c"]), json!("c")),
    ];
    let report = grade_all(program, cases, 10_000).await.unwrap();
    assert_eq!(report.verdict, Verdict::Partial);
    assert_eq!(report.passed, vec![true, false, true]);
}

#[tokio::test]
async fn no_passing_case_yields_none() {
    let program = "1 + 1";
    let cases = vec![
        TestCase::new(vec![], json!(5)),
        TestCase::new(vec![], json!("2")),
        TestCase::new(vec![], json!([2])),
    ];
    let report = grade_all(program, cases, 10_000).await.unwrap();
    assert_eq!(report.verdict, Verdict::None);
}

#[tokio::test]
async fn concurrent_cases_never_share_input_queues() {
    let program = "prompt()";
    let cases = vec![
        TestCase::new(inputs(&["x"]), json!("x")),
        TestCase::new(inputs(&["y"]), json!("y")),
    ];
    // Repeated runs shake out scheduling interleavings.
    for _ in 0..20 {
        let report = grade_all(program, cases.clone(), 10_000).await.unwrap();
        assert_eq!(report.verdict, Verdict::All, "cases observed foreign inputs");
    }
}

#[tokio::test]
async fn structural_comparison_no_coercion() {
    let object_program = "{ \"a\": 1 }";
    let report = grade_all(
        object_program,
        vec![TestCase::new(vec![], json!({ "a": 1 }))],
        10_000,
    )
    .await
    .unwrap();
    assert_eq!(report.verdict, Verdict::All);

    let scalar_program = "1";
    let report = grade_all(
        scalar_program,
        vec![TestCase::new(vec![], json!("1"))],
        10_000,
    )
    .await
    .unwrap();
    assert_eq!(report.verdict, Verdict::None, "1 must not coerce to \"1\"");
}

#[tokio::test]
async fn primary_value_and_steps_come_from_case_zero() {
    let program = "prompt()";
    let cases = vec![
        TestCase::new(inputs(&["first"]), json!("not-this")),
        TestCase::new(inputs(&["second"]), json!("second")),
    ];
    let report = grade_all(program, cases, 10_000).await.unwrap();
    // Case 0 failed, but it still supplies the primary value and steps.
    assert_eq!(report.primary_value, Some(json!("first")));
    assert!(report.primary_steps > 0);
    assert_eq!(report.verdict, Verdict::Partial);
}

#[tokio::test]
async fn infinite_loop_is_a_failed_case_not_an_error() {
    let program = "let i = 0\nwhile (i >= 0) { i = i + 1 }\ni";
    let cases = vec![TestCase::new(vec![], json!(0))];
    let report = grade_all(program, cases, 500).await.unwrap();
    assert_eq!(report.verdict, Verdict::None);
    assert_eq!(report.fault, Some(Fault::ThresholdExceeded));
}

#[tokio::test]
async fn guest_errors_are_reported_as_data() {
    let program = "no_such_variable";
    let report = grade_all(program, vec![TestCase::new(vec![], json!(1))], 10_000)
        .await
        .unwrap();
    assert_eq!(report.verdict, Verdict::None);
    assert!(matches!(report.fault, Some(Fault::ScriptRuntimeError(_))));
}

#[tokio::test]
async fn zero_budget_is_a_configuration_error() {
    let job = GradingJob::new("1", vec![TestCase::new(vec![], json!(1))], config(0));
    let err = job.grade().await.unwrap_err();
    assert_eq!(err, GraderError::InvalidBudget(0));
}

#[tokio::test]
async fn zero_concurrency_is_a_configuration_error() {
    let config = ExecutionConfig {
        step_budget: 10_000,
        max_concurrent_cases: 0,
    };
    let job = GradingJob::new("1", vec![TestCase::new(vec![], json!(1))], config);
    let err = job.grade().await.unwrap_err();
    assert!(matches!(err, GraderError::InvalidConfiguration(_)));
}

#[tokio::test]
async fn budget_override_applies() {
    let program = "let i = 0\nwhile (i < 100000) { i = i + 1 }\ni";
    let job = GradingJob::new(
        program,
        vec![TestCase::new(vec![], json!(100000))],
        config(10_000_000),
    )
    .with_budget(100);
    let report = job.grade().await.unwrap();
    assert_eq!(report.fault, Some(Fault::ThresholdExceeded));
}

#[tokio::test]
async fn empty_case_list_is_vacuously_all() {
    let report = grade_all("1", vec![], 10_000).await.unwrap();
    assert_eq!(report.verdict, Verdict::All);
    assert!(report.passed.is_empty());
    assert!(report.primary_value.is_none());
}
