use crate::harness::TestContext;
use predicates::prelude::*;

#[test]
fn reset_password_rotates_proxy_secret() {
    let ctx = TestContext::new();
    ctx.install();
    let before = ctx.read("secret");

    ctx.cli()
        .arg("reset-password")
        .assert()
        .success()
        .stdout(predicate::str::contains("Proxy secret rotated"));

    let after = ctx.read("secret");
    assert_ne!(before, after);
    assert!(ctx.read("telemt.toml").contains(after.trim()));
    assert!(ctx.docker.was_called_with("compose restart telemt"));
}

#[test]
fn reset_password_in_panel_mode_resets_admin() {
    let ctx = TestContext::new();
    ctx.install_with_panel();
    let secret = ctx.read("secret");

    ctx.cli()
        .arg("reset-password")
        .env("PANEL_ADMIN_USER", "ops")
        .env("PANEL_ADMIN_PASSWORD", "new-password")
        .assert()
        .success()
        .stdout(predicate::str::contains("Panel admin 'ops' reset"));

    assert_eq!(ctx.read("secret"), secret);
    assert!(ctx.docker.was_called_with("compose exec -T panel python -c <script> upsert-admin"));
    assert!(ctx.docker.calls().iter().all(|line| !line.contains("new-password")));
    assert!(ctx.docker.stdin().contains("\"password\":\"new-password\""));
}

#[test]
fn reset_password_twice_in_panel_mode_succeeds() {
    let ctx = TestContext::new();
    ctx.install_with_panel();

    for _ in 0..2 {
        ctx.cli()
            .arg("reset-password")
            .env("PANEL_ADMIN_USER", "admin")
            .env("PANEL_ADMIN_PASSWORD", "again-and-again")
            .assert()
            .success();
    }
    let upserts = ctx
        .docker
        .calls()
        .iter()
        .filter(|line| line.ends_with("upsert-admin"))
        .count();
    assert_eq!(upserts, 2);
}

#[test]
fn reset_password_reports_panel_exec_failure() {
    let ctx = TestContext::new();
    ctx.install_with_panel();

    ctx.cli()
        .arg("reset-password")
        .env("PANEL_ADMIN_PASSWORD", "whatever")
        .env("FAKE_DOCKER_FAIL", "exec")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}
