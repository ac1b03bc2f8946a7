use mtdeploy::domain::{Link, LinkServer, MasqueradeDomain, Port, Secret, long_secret};
use std::net::{Ipv4Addr, Ipv6Addr};

#[test]
fn long_secret_is_prefix_secret_and_domain_hex() {
    let secret = Secret::parse("00112233445566778899aabbccddeeff").unwrap();
    let domain = MasqueradeDomain::new("1c.ru").unwrap();

    assert_eq!(long_secret(&secret, &domain), "ee00112233445566778899aabbccddeeff31632e7275");
}

#[test]
fn links_carry_server_port_and_long_secret() {
    let secret = Secret::parse("00112233445566778899aabbccddeeff").unwrap();
    let domain = MasqueradeDomain::new("1c.ru").unwrap();
    let long = long_secret(&secret, &domain);

    let v4 = Link::new(
        LinkServer::V4(Ipv4Addr::new(203, 0, 113, 7)),
        Port::new(443).unwrap(),
        long.clone(),
    );
    assert_eq!(
        v4.tg_url(),
        "tg://proxy?server=203.0.113.7&port=443&secret=ee00112233445566778899aabbccddeeff31632e7275"
    );
    assert!(v4.https_url().starts_with("https://t.me/proxy?server=203.0.113.7&port=443"));

    let v6 = Link::new(
        LinkServer::V6("2001:db8::1".parse::<Ipv6Addr>().unwrap()),
        Port::new(8443).unwrap(),
        long,
    );
    assert!(v6.tg_url().contains("server=2001:db8::1&port=8443"));
}
