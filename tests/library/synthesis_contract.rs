use mtdeploy::domain::{
    ImageSource, MasqueradeDomain, Parameters, Port, Secret, TemplateOrigin, TemplateSet,
    synthesize,
};
use proptest::prelude::*;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

fn shipped_templates() -> TemplateSet {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("templates");
    let files: BTreeMap<String, String> = fs::read_dir(&dir)
        .unwrap()
        .map(|entry| {
            let path = entry.unwrap().path();
            let name = path.file_name().unwrap().to_string_lossy().to_string();
            (name, fs::read_to_string(&path).unwrap())
        })
        .collect();
    TemplateSet::new(files, TemplateOrigin::LocalCheckout(dir))
}

fn domain_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-z0-9]{1,10}", 2..4).prop_map(|labels| labels.join("."))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn every_artifact_names_the_same_domain(
        domain in domain_strategy(),
        listen in 1u16..=65535,
        panel in any::<bool>(),
        build in any::<bool>(),
    ) {
        let templates = shipped_templates();
        let domain = MasqueradeDomain::new(&domain).unwrap();
        let mut params = Parameters::with_defaults(PathBuf::from("/opt/mtproxy"), domain.clone());
        params.listen_port = Port::new(i64::from(listen)).unwrap();
        params.panel_enabled = panel;
        params.image_source = if build { ImageSource::Build } else { ImageSource::Prebuilt };
        let secret = Secret::generate();

        let artifacts = synthesize(&templates, &params, &secret, None).unwrap();

        let sni = format!("HostSNI(`{}`)", domain.as_str());
        prop_assert!(artifacts.router_rule.contains(&sni));
        prop_assert_eq!(&artifacts.env.tls_domain, &domain);
        prop_assert_eq!(artifacts.env.listen_port, params.listen_port);

        let proxy = match (&artifacts.proxy_config, &artifacts.panel_config) {
            (Some(config), None) => config.clone(),
            (None, Some(file)) => file.content.clone(),
            other => panic!("unexpected proxy config layout: {:?}", other),
        };
        let quoted = format!("\"{}\"", domain.as_str());
        prop_assert!(proxy.contains(&quoted));
        prop_assert!(proxy.contains(secret.expose()));
    }
}
