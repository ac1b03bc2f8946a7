use crate::harness::TestContext;
use predicates::prelude::*;

#[test]
fn add_panel_migrates_static_config() {
    let ctx = TestContext::new();
    ctx.install();
    let secret = ctx.read("secret");

    ctx.cli()
        .arg("add-panel")
        .env("PANEL_ADMIN_PASSWORD", "correct-horse")
        .assert()
        .success()
        .stdout(predicate::str::contains("Upgraded proxy + panel installation"))
        .stdout(predicate::str::contains("Panel did not report healthy"));

    assert!(!ctx.exists("telemt.toml"));
    assert!(ctx.read("panel-data/telemt.toml").contains(secret.trim()));
    // The panel never turns healthy here, so the users wait for the next update.
    assert!(ctx.read("panel-data/seed-user.toml").contains(secret.trim()));
    assert!(ctx.read("docker-compose.yml").contains("panel"));
    assert!(ctx.read(".env").contains("MTDEPLOY_MODE=panel"));
    assert_eq!(ctx.read("secret"), secret);
}

#[test]
fn add_panel_twice_is_rejected() {
    let ctx = TestContext::new();
    ctx.install_with_panel();

    ctx.cli()
        .arg("add-panel")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already runs the admin panel"));
}
