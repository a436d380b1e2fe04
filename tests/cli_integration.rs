//! Integration tests for the Coffer CLI.
//!
//! These tests exercise the binary end-to-end using `assert_cmd`.
//! Values are always passed on the command line and deletes use
//! `--force`, so no test needs an interactive terminal.

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

/// Helper: get a Command pointing at the coffer binary, with a config
/// file inside `tmp`.
fn coffer(tmp: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("coffer").expect("binary should exist");
    cmd.current_dir(tmp.path())
        .env_remove("COFFER_CONFIG")
        .env_remove("COFFER_LOG")
        .arg("--config")
        .arg(tmp.path().join("coffer.json"));
    cmd
}

/// Helper: `coffer init` an AES vault whose key lives in `tmp/vault.key`.
fn init_aes(tmp: &TempDir) {
    let key = coffer::crypto::generate_key();
    tmp.child("vault.key").write_str(key.as_str()).unwrap();

    coffer(tmp)
        .args(["init", "--id", "cli", "--type", "aes256", "--path", "store"])
        .arg("--key-file")
        .arg(tmp.path().join("vault.key"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Vault 'cli' (aes256) is ready"));
}

#[test]
fn help_flag_shows_usage() {
    #[allow(deprecated)]
    Command::cargo_bin("coffer")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Local encrypted secret vaults"))
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("recipients"))
        .stdout(predicate::str::contains("keygen"));
}

#[test]
fn no_args_shows_help() {
    #[allow(deprecated)]
    Command::cargo_bin("coffer")
        .unwrap()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn init_creates_config_and_vault_file() {
    let tmp = TempDir::new().unwrap();
    init_aes(&tmp);

    tmp.child("coffer.json").assert(predicate::path::exists());
    tmp.child("store/vault-cli.enc").assert(predicate::path::exists());
}

#[test]
fn init_refuses_to_overwrite_without_force() {
    let tmp = TempDir::new().unwrap();
    init_aes(&tmp);

    coffer(&tmp)
        .args(["init", "--id", "other", "--type", "unencrypted"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn set_get_list_delete_roundtrip() {
    let tmp = TempDir::new().unwrap();
    init_aes(&tmp);

    coffer(&tmp)
        .args(["set", "db.password", "hunter2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("added to"))
        .stderr(predicate::str::contains("command line: it may appear in shell history"));

    coffer(&tmp)
        .args(["get", "db.password"])
        .assert()
        .success()
        .stdout("hunter2\n");

    coffer(&tmp)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("db.password"));

    coffer(&tmp)
        .args(["delete", "db.password", "--force"])
        .assert()
        .success();

    coffer(&tmp)
        .args(["get", "db.password"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn invalid_secret_name_fails() {
    let tmp = TempDir::new().unwrap();
    init_aes(&tmp);

    coffer(&tmp)
        .args(["set", "bad key!", "v"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid key"));
}

#[test]
fn info_shows_id_and_type() {
    let tmp = TempDir::new().unwrap();
    init_aes(&tmp);

    coffer(&tmp)
        .arg("info")
        .assert()
        .success()
        .stdout(predicate::str::contains("cli"))
        .stdout(predicate::str::contains("aes256"));
}

#[test]
fn missing_config_fails() {
    let tmp = TempDir::new().unwrap();
    coffer(&tmp)
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("coffer init"));
}

#[test]
fn recipients_on_aes_vault_fail() {
    let tmp = TempDir::new().unwrap();
    init_aes(&tmp);

    coffer(&tmp)
        .args(["recipients", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not support recipients"));
}

#[test]
fn age_vault_recipient_management() {
    let tmp = TempDir::new().unwrap();
    let me = coffer::vault::generate_age_identity();
    tmp.child("me.txt").write_str(me.identity.as_str()).unwrap();

    coffer(&tmp)
        .args(["init", "--id", "team", "--type", "age", "--path", "store"])
        .arg("--identity-file")
        .arg(tmp.path().join("me.txt"))
        .args(["--recipient", &me.recipient])
        .assert()
        .success();

    coffer(&tmp)
        .args(["recipients", "remove", &me.recipient])
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least one recipient"));

    let colleague = coffer::vault::generate_age_identity();
    coffer(&tmp)
        .args(["recipients", "add", &colleague.recipient])
        .assert()
        .success();

    coffer(&tmp)
        .args(["recipients", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Vault 'team': 2 recipient(s)"))
        .stdout(predicate::str::contains(colleague.recipient.as_str()))
        .stdout(predicate::str::contains(me.recipient.as_str()));
}

#[test]
fn keygen_aes_prints_a_usable_key() {
    let tmp = TempDir::new().unwrap();
    let output = coffer(&tmp).args(["keygen", "aes"]).output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let line = stdout.lines().next().unwrap();
    let key = coffer::crypto::EncryptionKey::new(line);
    assert!(coffer::vault::validate_encryption_key(&key).is_ok());
}

#[test]
fn keygen_age_prints_identity_and_recipient() {
    let tmp = TempDir::new().unwrap();
    coffer(&tmp)
        .args(["keygen", "age"])
        .assert()
        .success()
        .stdout(predicate::str::contains("# public key: age1"))
        .stdout(predicate::str::contains("AGE-SECRET-KEY-1"));
}

#[test]
fn completions_reject_an_unknown_shell() {
    let tmp = TempDir::new().unwrap();
    coffer(&tmp)
        .args(["completions", "csh"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("possible values"));
}

#[test]
fn completions_bash_generates_script() {
    let tmp = TempDir::new().unwrap();
    coffer(&tmp)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("coffer"));
}
