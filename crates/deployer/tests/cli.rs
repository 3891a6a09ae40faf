use assert_cmd::Command;

const BIN: &str = "deployer";

#[test]
fn deploy_produces_help_message() {
    let mut cmd = Command::cargo_bin(BIN).unwrap();
    cmd.arg("--help").assert().success();
}

#[test]
fn deploy_requires_baseurl_and_token() {
    let mut cmd = Command::cargo_bin(BIN).unwrap();
    cmd.arg("deploy")
        .arg("somefile.json")
        .env_remove("DEPLOYER_BASE_URL")
        .env_remove("DEPLOYER_ACCESS_TOKEN")
        .assert()
        .failure();
}

#[test]
fn deploy_fails_on_missing_document() {
    let mut cmd = Command::cargo_bin(BIN).unwrap();
    cmd.arg("-b")
        .arg("http://127.0.0.1:1")
        .arg("-a")
        .arg("token")
        .arg("deploy")
        .arg("/nonexistent/path.json")
        .assert()
        .failure();
}

#[test]
fn delete_requires_group_name_argument() {
    let mut cmd = Command::cargo_bin(BIN).unwrap();
    cmd.arg("-b")
        .arg("http://127.0.0.1:1")
        .arg("-a")
        .arg("token")
        .arg("delete")
        .assert()
        .failure();
}
