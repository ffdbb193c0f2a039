use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

const DFC_BODY: &str = r#"{
  "meses": ["2024-01", "2024-02"], "trimestres": ["2024Q1"], "anos": [2024],
  "data": [{
    "tipo": "=", "nome": "Movimentações",
    "valores_mensais": {"2024-01": 1500.5, "2024-02": -200},
    "classificacoes": [{"tipo": "+", "nome": "Recebimentos", "valores_mensais": {"2024-01": 1500.5}}]
  }]
}"#;

const MOM_BODY: &str = r#"{"success": true, "data": {"mom_analysis": [
  {"mes": "2024-01", "valor_atual": 100, "valor_anterior": 80, "variacao_absoluta": 20, "variacao_percentual": 25}
]}}"#;

/// Serve every connection from a background thread, picking the body by path.
fn serve() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { continue };
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap_or(0);
            let mut line = String::new();
            while reader.read_line(&mut line).unwrap_or(0) > 0 {
                if line == "\r\n" {
                    break;
                }
                line.clear();
            }
            let body = if request_line.contains("/dfc") { DFC_BODY } else { MOM_BODY };
            let resp = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = stream.write_all(resp.as_bytes());
        }
    });
    format!("http://{addr}")
}

fn painel(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("painel").unwrap();
    cmd.env("HOME", home).env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_lists_commands() {
    let home = tempfile::tempdir().unwrap();
    painel(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("report"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_config_round_trip() {
    let home = tempfile::tempdir().unwrap();
    painel(home.path())
        .args(["config", "set", "--api-url", "http://relatorios:8080/", "--cache-ttl", "60"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Settings saved."));

    assert!(home.path().join(".config/painel/settings.json").exists());

    painel(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("http://relatorios:8080"))
        .stdout(predicate::str::contains("cache_ttl_secs:       60"));
}

#[test]
fn test_config_set_requires_a_change() {
    let home = tempfile::tempdir().unwrap();
    painel(home.path())
        .args(["config", "set"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nothing to set"));
}

#[test]
fn test_text_report_against_local_api() {
    let home = tempfile::tempdir().unwrap();
    let url = serve();
    painel(home.path())
        .args(["--api-url", &url, "report", "dfc", "--mode", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Fluxo de Caixa (DFC)"))
        .stdout(predicate::str::contains("Recebimentos"))
        .stdout(predicate::str::contains("1.500,50"));
}

#[test]
fn test_mom_text_report() {
    let home = tempfile::tempdir().unwrap();
    let url = serve();
    painel(home.path())
        .args(["--api-url", &url, "report", "mom", "receber", "--mode", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Contas a Receber"))
        .stdout(predicate::str::contains("25.0%"));
}

#[test]
fn test_export_writes_workbook() {
    let home = tempfile::tempdir().unwrap();
    let url = serve();
    let out = home.path().join("out").join("dfc.xlsx");
    painel(home.path())
        .args(["--api-url", &url, "export", "dfc", "--year", "2024", "--output"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote"));
    assert!(out.exists());
}

#[test]
fn test_mom_cannot_be_exported() {
    let home = tempfile::tempdir().unwrap();
    painel(home.path())
        .args(["report", "mom", "pagar", "--mode", "export"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("can be exported"));
}

#[test]
fn test_unreachable_api_exits_with_error() {
    let home = tempfile::tempdir().unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);
    painel(home.path())
        .args(["--api-url", &url, "report", "dre", "--mode", "text"])
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("Error:"));
}

#[test]
fn test_invalid_year_is_rejected() {
    let home = tempfile::tempdir().unwrap();
    painel(home.path())
        .args(["report", "dfc", "--year", "ontem", "--mode", "text"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid argument"));
}
