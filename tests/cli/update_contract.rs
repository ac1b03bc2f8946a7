use crate::harness::TestContext;
use predicates::prelude::*;

#[test]
fn update_requires_an_installation() {
    let ctx = TestContext::new();

    ctx.cli()
        .arg("update")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No installation found"))
        .stderr(predicate::str::contains("mtdeploy install"));
}

#[test]
fn update_reads_parameters_back_from_env_file() {
    let ctx = TestContext::new();
    ctx.install();
    let secret = ctx.read("secret");

    ctx.cli()
        .arg("update")
        .env("TLS_DOMAIN", "ignored.example")
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated proxy installation"));

    assert_eq!(ctx.read("secret"), secret);
    assert!(ctx.read("telemt.toml").contains("pikabu.ru"));
    assert!(!ctx.read("telemt.toml").contains("ignored.example"));
}

#[test]
fn update_waits_for_a_running_operation() {
    let ctx = TestContext::new();
    ctx.install();
    let compose = ctx.read("docker-compose.yml");
    let calls_before = ctx.docker.calls().len();
    std::fs::write(ctx.install_dir().join(".mtdeploy.lock"), std::process::id().to_string())
        .expect("write lock");

    ctx.cli()
        .arg("update")
        .assert()
        .failure()
        .stderr(predicate::str::contains("locked by another mtdeploy process"));

    assert_eq!(ctx.read("docker-compose.yml"), compose);
    assert!(ctx.docker.calls()[calls_before..].iter().all(|line| !line.starts_with("compose")));
}
