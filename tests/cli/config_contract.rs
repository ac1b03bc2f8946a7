use crate::harness::TestContext;
use predicates::prelude::*;

#[test]
fn config_sni_changes_domain_everywhere_but_not_the_secret() {
    let ctx = TestContext::new();
    ctx.install();
    let secret = ctx.read("secret");

    ctx.cli()
        .args(["config", "--sni", "example.com"])
        .assert()
        .success()
        .stdout(predicate::str::contains("from pikabu.ru to example.com"))
        .stdout(predicate::str::contains("6578616d706c652e636f6d"));

    assert_eq!(ctx.read("secret"), secret);
    assert!(ctx.read("telemt.toml").contains("tls_domain = \"example.com\""));
    assert!(ctx.read("traefik/dynamic/tcp.yml").contains("HostSNI(`example.com`)"));
    assert!(ctx.read(".env").contains("TLS_DOMAIN=example.com"));
    assert!(ctx.docker.was_called_with("compose up -d --force-recreate --no-deps telemt traefik"));
}

#[test]
fn config_rejects_invalid_domain() {
    let ctx = TestContext::new();
    ctx.install();

    ctx.cli()
        .args(["config", "--sni", "bad domain"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid masquerade domain"));

    assert!(ctx.read("telemt.toml").contains("pikabu.ru"));
}
