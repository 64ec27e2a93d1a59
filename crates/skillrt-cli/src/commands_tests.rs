use super::*;

const GREETING_SKILL: &str = r#"---
id: greeting
version: 1.0.0
output_schema:
  format: json
  greeting: string
---

## s1 (template)
var: greeting
```
"hello {{name}}"
```
"#;

const CONFIRM_SKILL: &str = r#"---
id: confirm
version: 1.0.0
output_schema:
  format: json
  result: string
---

## s1 (await)
var: confirm
```
{ "message": "proceed?", "input_schema": { "ok": { "type": "boolean", "required": true } } }
```

## s2 (template)
var: result
```
"{{ok}}"
```
"#;

fn write_skill(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("skill.md");
    std::fs::write(&path, content).unwrap();
    path
}

#[tokio::test]
async fn run_executes_a_pure_template_skill() {
    let dir = tempfile::tempdir().unwrap();
    let skill_file = write_skill(dir.path(), GREETING_SKILL);

    let result = run_result(dir.path(), &skill_file, Some(r#"{"name": "ada"}"#.to_string()), None)
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(result.output.unwrap().get("greeting"), Some(&Value::String("hello ada".to_string())));
}

#[tokio::test]
async fn run_with_no_input_defaults_to_empty_map() {
    let dir = tempfile::tempdir().unwrap();
    let skill_file = write_skill(dir.path(), GREETING_SKILL);

    let result = run_result(dir.path(), &skill_file, None, None).await.unwrap();

    assert!(result.success);
    assert_eq!(result.output.unwrap().get("greeting"), Some(&Value::String("hello ".to_string())));
}

#[tokio::test]
async fn run_then_resume_round_trips_through_snapshot_files() {
    let dir = tempfile::tempdir().unwrap();
    let skill_file = write_skill(dir.path(), CONFIRM_SKILL);

    let suspended = run_result(dir.path(), &skill_file, None, None).await.unwrap();
    assert!(suspended.awaiting);
    let execution_id = suspended.execution_id.unwrap();

    assert!(dir.path().join(".skillrt").join("snapshots").join(format!("{execution_id}.json")).exists());

    let resumed = resume_result(dir.path(), &skill_file, &execution_id, Some(r#"{"ok": true}"#.to_string()), None)
        .await
        .unwrap();

    assert!(resumed.success);
    assert_eq!(resumed.output.unwrap().get("result"), Some(&Value::String("true".to_string())));
    assert!(!dir.path().join(".skillrt").join("snapshots").join(format!("{execution_id}.json")).exists());
}

#[tokio::test]
async fn resume_without_a_prior_run_fails_with_a_clear_error() {
    let dir = tempfile::tempdir().unwrap();
    let skill_file = write_skill(dir.path(), CONFIRM_SKILL);

    let err = resume_result(dir.path(), &skill_file, "exec-nonexistent", None, None).await.unwrap_err();
    assert!(err.to_string().contains("exec-nonexistent"));
}

#[tokio::test]
async fn sweep_with_no_snapshots_sweeps_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let swept = sweep_count(dir.path()).await.unwrap();
    assert_eq!(swept, 0);
}

#[test]
fn load_input_rejects_a_non_object_json_value() {
    let err = load_input(Some("[1, 2, 3]".to_string()), None).unwrap_err();
    assert!(err.to_string().contains("JSON object"));
}

#[test]
fn load_input_defaults_to_empty_when_nothing_supplied() {
    let input = load_input(None, None).unwrap();
    assert!(input.is_empty());
}
