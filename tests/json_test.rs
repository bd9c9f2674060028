use filterql::json::{self, FieldSpec};
use filterql::FilterCompiler;
use std::fs;
use std::io::Write;
use std::process::{Command, Stdio};
use tempfile::tempdir;

const ROWS: &str = r#"[
    {"Name": "ada", "Age": 36, "Joined": "2021-03-04", "Active": true},
    {"Name": "grace", "Age": 85, "Joined": "2019-11-30", "Active": false},
    {"Name": "linus", "Age": null, "Joined": "2022-07-01"},
    {"Name": "alan", "Age": "forty-one", "Active": true}
]"#;

fn specs() -> Vec<FieldSpec> {
    ["Name:string", "Age:int32", "Joined:date", "Active:bool"]
        .iter()
        .map(|s| s.parse().unwrap())
        .collect()
}

fn filterql(args: &[&str], stdin: Option<&str>) -> (bool, String, String) {
    let mut child = Command::new(env!("CARGO_BIN_EXE_filterql"))
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    {
        let mut child_stdin = child.stdin.take().unwrap();
        if let Some(input) = stdin {
            child_stdin.write_all(input.as_bytes()).unwrap();
        }
    }
    let output = child.wait_with_output().unwrap();
    (
        output.status.success(),
        String::from_utf8(output.stdout).unwrap(),
        String::from_utf8(output.stderr).unwrap(),
    )
}

#[test]
fn test_filter_rows_from_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("people.json");
    fs::write(&path, ROWS).unwrap();

    let rows = json::load_rows(fs::File::open(&path).unwrap()).unwrap();
    let compiler = FilterCompiler::new(json::registry(&specs()).unwrap());

    let names = |query: &str| -> Vec<String> {
        let predicate = compiler.compile(query).unwrap();
        predicate
            .filter(&rows)
            .map(|row| row["Name"].as_str().unwrap().to_string())
            .collect()
    };

    assert_eq!(names("Age >> '40'"), vec!["grace"]);
    // Null and mistyped ages only satisfy `!=`
    assert_eq!(names("Age != '36'"), vec!["grace", "linus", "alan"]);
    assert_eq!(names("Joined >= '2021-01-01'"), vec!["ada", "linus"]);
    assert_eq!(names("Active == 'true' && Name @= 'a'"), vec!["ada", "alan"]);
}

#[test]
fn test_cli_filters_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("people.json");
    fs::write(&path, ROWS).unwrap();
    let path = path.to_str().unwrap();

    let (ok, stdout, stderr) = filterql(
        &[
            "--query",
            "Age >= '36' && Active == 'true'",
            "--field",
            "Name:string",
            "-f",
            "Age:int32",
            "-f",
            "Active:bool",
            "--input",
            path,
        ],
        None,
    );
    assert!(ok, "{}", stderr);

    let output: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let names: Vec<&str> = output
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["Name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["ada"]);
}

#[test]
fn test_cli_count_from_stdin() {
    let (ok, stdout, stderr) = filterql(
        &["-q", "Name %% 'a'", "-f", "Name:string", "--count", "-i", "-"],
        Some(ROWS),
    );
    assert!(ok, "{}", stderr);
    assert_eq!(stdout.trim(), "3");
}

#[test]
fn test_cli_sql() {
    let (ok, stdout, stderr) = filterql(
        &["-q", "Age << '30' || Name =@ 'n'", "-f", "Name:string", "-f", "Age:int32", "--sql"],
        None,
    );
    assert!(ok, "{}", stderr);

    let mut lines = stdout.lines();
    assert_eq!(
        lines.next(),
        Some(r#"("Age" < ? OR "Name" LIKE ? ESCAPE '\')"#)
    );
    assert_eq!(lines.next(), Some(r#"[30,"%n"]"#));
}

#[test]
fn test_cli_reports_errors() {
    let (ok, _, stderr) = filterql(
        &["-q", "Age @= '3'", "-f", "Age:int32", "--count"],
        Some("[]"),
    );
    assert!(!ok);
    assert!(stderr.contains("Failed to compile query"), "{}", stderr);
    assert!(stderr.contains("not supported"), "{}", stderr);

    let (ok, _, stderr) = filterql(
        &["-q", "Age == '3'", "-f", "Age:int32"],
        Some(r#"{"Age": 3}"#),
    );
    assert!(!ok);
    assert!(stderr.contains("expected a JSON array"), "{}", stderr);
}
