use crate::harness::TestContext;
use predicates::prelude::*;

#[test]
fn link_json_is_machine_readable() {
    let ctx = TestContext::new();
    ctx.install();
    let secret = ctx.read("secret");

    let output = ctx.cli().args(["link", "--json"]).output().unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();

    let link = &json["links"][0];
    assert_eq!(link["server"], "YOUR_SERVER_IP");
    assert_eq!(link["port"], ctx.listen_port());
    let expected = format!("ee{}{}", secret.trim(), "70696b6162752e7275");
    assert!(link["tg_link"].as_str().unwrap().ends_with(&expected));
    assert!(json["warning"].is_string());
}

#[test]
fn link_does_not_modify_the_installation() {
    let ctx = TestContext::new();
    ctx.install();
    let before = ctx.read(".env");
    let calls = ctx.docker.calls().len();

    ctx.cli().arg("link").assert().success().stdout(predicate::str::contains("t.me/proxy?"));

    assert_eq!(ctx.read(".env"), before);
    assert_eq!(ctx.docker.calls().len(), calls);
}
