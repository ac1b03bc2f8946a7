use crate::harness::TestContext;
use predicates::prelude::*;

#[test]
fn uninstall_with_yes_removes_everything() {
    let ctx = TestContext::new();
    ctx.install();

    ctx.cli()
        .args(["uninstall", "-y"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed"));

    assert!(!ctx.install_dir().exists());
    assert!(ctx.docker.was_called_with("compose down --remove-orphans -v"));
}

#[test]
fn uninstall_without_confirmation_keeps_the_installation() {
    let ctx = TestContext::new();
    ctx.install();

    ctx.cli()
        .arg("uninstall")
        .assert()
        .success()
        .stdout(predicate::str::contains("Uninstall cancelled"));

    assert!(ctx.exists("docker-compose.yml"));
}

#[test]
fn uninstall_of_missing_installation_fails() {
    let ctx = TestContext::new();

    ctx.cli()
        .args(["uninstall", "-y"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No installation found"));
}
