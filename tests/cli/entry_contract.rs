use crate::harness::TestContext;
use predicates::prelude::*;

#[test]
fn help_lists_every_verb() {
    let ctx = TestContext::new();

    let output = ctx.cli().arg("--help").output().unwrap();
    assert!(output.status.success());
    let help = String::from_utf8_lossy(&output.stdout);
    for verb in ["install", "update", "config", "uninstall", "add-panel", "reset-password", "link"] {
        assert!(help.contains(verb), "help is missing {}", verb);
    }
}

#[test]
fn no_verb_without_terminal_fails_with_guidance() {
    let ctx = TestContext::new();

    ctx.cli()
        .assert()
        .failure()
        .stderr(predicate::str::contains("No command given"));
}

#[test]
fn verbose_flag_emits_logs_on_stderr() {
    let ctx = TestContext::new();

    ctx.cli()
        .args(["-vv", "install"])
        .assert()
        .success()
        .stderr(predicate::str::contains("detected installation state"));
}
