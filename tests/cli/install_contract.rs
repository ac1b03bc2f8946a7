use crate::harness::TestContext;
use predicates::prelude::*;
use std::fs;

#[test]
fn install_writes_artifacts_and_prints_links() {
    let ctx = TestContext::new();

    ctx.cli()
        .arg("install")
        .assert()
        .success()
        .stdout(predicate::str::contains("Installed proxy installation"))
        .stdout(predicate::str::contains("tg://proxy?server=YOUR_SERVER_IP"));

    for file in ["docker-compose.yml", "telemt.toml", "traefik/dynamic/tcp.yml", ".env", "secret"] {
        assert!(ctx.exists(file), "{} missing", file);
    }
    let secret = ctx.read("secret");
    assert_eq!(secret.trim().len(), 32);
    assert!(ctx.read("telemt.toml").contains(secret.trim()));
    assert!(ctx.read("traefik/dynamic/tcp.yml").contains("HostSNI(`pikabu.ru`)"));
    assert!(ctx.read(".env").contains(&format!("LISTEN_PORT={}", ctx.listen_port())));
    assert!(!ctx.exists(".mtdeploy.lock"));

    assert!(ctx.docker.was_called_with("info"));
    assert!(ctx.docker.was_called_with("compose pull"));
    assert!(ctx.docker.was_called_with("compose up -d --remove-orphans"));
}

#[test]
fn second_install_updates_and_keeps_the_secret() {
    let ctx = TestContext::new();
    ctx.install();
    let secret = ctx.read("secret");
    let compose = ctx.read("docker-compose.yml");

    ctx.cli()
        .arg("install")
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated proxy installation"));

    assert_eq!(ctx.read("secret"), secret);
    assert_eq!(ctx.read("docker-compose.yml"), compose);
}

#[test]
fn install_refuses_foreign_directory() {
    let ctx = TestContext::new();
    fs::create_dir_all(ctx.install_dir()).unwrap();
    fs::write(ctx.install_dir().join("notes.txt"), "keep me").unwrap();

    ctx.cli()
        .arg("install")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("is not an mtdeploy installation"))
        .stderr(predicate::str::contains("--force"));

    assert_eq!(fs::read_to_string(ctx.install_dir().join("notes.txt")).unwrap(), "keep me");
    assert!(!ctx.exists("docker-compose.yml"));
}

#[test]
fn install_without_docker_reports_environment_error() {
    let ctx = TestContext::new();

    ctx.cli()
        .arg("install")
        .env("MTDEPLOY_DOCKER", "mtdeploy-no-such-docker")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Container runtime unavailable"))
        .stderr(predicate::str::contains("Hint: Install Docker"));

    assert!(!ctx.install_dir().exists());
}

#[test]
fn invalid_port_is_rejected_before_anything_is_written() {
    let ctx = TestContext::new();

    ctx.cli()
        .arg("install")
        .env("LISTEN_PORT", "65536")
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of range"));

    assert!(!ctx.install_dir().exists());
}

#[test]
fn image_pull_failure_is_fatal_after_commit() {
    let ctx = TestContext::new();

    ctx.cli()
        .arg("install")
        .env("FAKE_DOCKER_FAIL", "pull")
        .assert()
        .failure()
        .stderr(predicate::str::contains("simulated pull failure"))
        .stderr(predicate::str::contains("mtdeploy update"));

    assert!(ctx.exists("docker-compose.yml"));
}
