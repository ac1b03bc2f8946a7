//! Templates + parameters + secret -> configuration artifacts. No I/O.

use rand::RngCore;
use rand::rngs::OsRng;

use crate::domain::artifacts::{ArtifactFile, WritePolicy};
use crate::domain::env_record::PanelEnv;
use crate::domain::layout::{PANEL_CONFIG_FILE, PANEL_SEED_FILE};
use crate::domain::template::{
    PROXY_CONFIG, Placeholders, ROUTER_RULE, TemplateSet, compose_variant, render_toml,
    render_yaml,
};
use crate::domain::{
    AppError, ConfigurationArtifacts, EnvRecord, InstallMode, MasqueradeDomain, Parameters,
    Secret,
};

const PANEL_KEY_BYTES: usize = 32;

/// Name of the single static user in proxy-only mode.
pub const STATIC_USER: &str = "default";

/// Render the full artifact set for `params`.
///
/// `previous` is the environment record of the installation being updated;
/// the panel signing key and operator-added keys are carried over from it.
pub fn synthesize(
    templates: &TemplateSet,
    params: &Parameters,
    secret: &Secret,
    previous: Option<&EnvRecord>,
) -> Result<ConfigurationArtifacts, AppError> {
    let mode = params.mode();
    let placeholders = placeholders(params, secret);

    let compose_name = compose_variant(params.image_source, mode);
    let compose = render_yaml(compose_name, templates.get(compose_name)?, &placeholders)?;

    let mut proxy = render_toml(PROXY_CONFIG, templates.get(PROXY_CONFIG)?, &placeholders)?;
    set_tls_domain(&mut proxy, &params.masquerade_domain);

    let mut router = render_yaml(ROUTER_RULE, templates.get(ROUTER_RULE)?, &placeholders)?;
    rebuild_router_rule(&mut router, &params.masquerade_domain);

    let env = env_record(params, previous);

    let proxy_domain = tls_domain_of(&proxy);
    let router_domain = router_sni(&router);
    check_consistency(
        proxy_domain.as_deref(),
        router_domain.as_deref(),
        env.tls_domain.as_str(),
    )?;

    let (proxy_config, panel_config) = match mode {
        InstallMode::ProxyOnly => (Some(to_toml(PROXY_CONFIG, &proxy)?), None),
        InstallMode::ProxyPanel => {
            // The static user stays until the panel has imported it.
            let seed = ArtifactFile {
                path: PANEL_CONFIG_FILE,
                content: to_toml(PROXY_CONFIG, &proxy)?,
                policy: WritePolicy::CreateOnly,
                private: false,
            };
            (None, Some(seed))
        }
    };

    Ok(ConfigurationArtifacts {
        compose: to_yaml(compose_name, &compose)?,
        proxy_config,
        router_rule: to_yaml(ROUTER_RULE, &router)?,
        env,
        secret: Some(secret.clone()),
        panel_config,
        panel_seed: None,
        obsolete: Vec::new(),
    })
}

fn placeholders(params: &Parameters, secret: &Secret) -> Placeholders {
    Placeholders::new()
        .text("tls_domain", params.masquerade_domain.as_str())
        .integer("internal_port", params.internal_port.get())
        .integer("listen_port", params.listen_port.get())
        .text("secret", secret.expose())
        .text("telemt_image", params.images.telemt.as_str())
        .text("panel_image", params.images.panel.as_str())
        .integer("panel_port", params.panel_port.get())
}

fn env_record(params: &Parameters, previous: Option<&EnvRecord>) -> EnvRecord {
    let previous_panel = previous.and_then(|record| record.panel.as_ref());
    let panel = params.panel_enabled.then(|| PanelEnv {
        panel_port: params.panel_port,
        secret_key: previous_panel
            .map(|panel| panel.secret_key.clone())
            .unwrap_or_else(generate_panel_key),
        proxy_host: previous_panel.and_then(|panel| panel.proxy_host.clone()),
    });

    EnvRecord {
        mode: params.mode(),
        listen_port: params.listen_port,
        internal_port: params.internal_port,
        image_source: params.image_source,
        tls_domain: params.masquerade_domain.clone(),
        telemt_image: params.images.telemt.clone(),
        panel_image: params.images.panel.clone(),
        panel,
        extra: previous.map(|record| record.extra.clone()).unwrap_or_default(),
    }
}

/// Fresh panel JWT signing key.
pub fn generate_panel_key() -> String {
    let mut bytes = [0u8; PANEL_KEY_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn set_tls_domain(config: &mut toml::Table, domain: &MasqueradeDomain) {
    let censorship = config
        .entry("censorship")
        .or_insert_with(|| toml::Value::Table(toml::Table::new()));
    if let toml::Value::Table(table) = censorship {
        table.insert("tls_domain".to_string(), toml::Value::String(domain.to_string()));
    }
}

fn tls_domain_of(config: &toml::Table) -> Option<String> {
    config.get("censorship")?.get("tls_domain")?.as_str().map(str::to_string)
}

/// Static users declared in a proxy config, in file order.
pub fn static_users(config: &str) -> Result<Vec<(String, String)>, AppError> {
    let table: toml::Table = toml::from_str(config).map_err(|e| AppError::TemplateInvalid {
        name: PROXY_CONFIG.to_string(),
        details: e.to_string(),
    })?;
    let users = table
        .get("access")
        .and_then(|access| access.get("users"))
        .and_then(toml::Value::as_table)
        .map(|users| {
            users
                .iter()
                .filter_map(|(name, secret)| secret.as_str().map(|s| (name.clone(), s.to_string())))
                .collect()
        })
        .unwrap_or_default();
    Ok(users)
}

/// Rewrite only `censorship.tls_domain` of an existing proxy config. Every
/// other table, including panel-managed access tables, is kept.
pub fn patch_tls_domain(config: &str, domain: &MasqueradeDomain) -> Result<String, AppError> {
    let mut table: toml::Table = toml::from_str(config).map_err(|e| AppError::TemplateInvalid {
        name: PANEL_CONFIG_FILE.to_string(),
        details: e.to_string(),
    })?;
    set_tls_domain(&mut table, domain);
    to_toml(PANEL_CONFIG_FILE, &table)
}

/// Users for the panel to import once it is up.
pub fn panel_seed(users: &[(String, String)], created_at: &str) -> Result<String, AppError> {
    let mut root = toml::Table::new();
    root.insert("created_at".to_string(), toml::Value::String(created_at.to_string()));
    let entries = users
        .iter()
        .map(|(username, secret)| {
            let mut entry = toml::Table::new();
            entry.insert("username".to_string(), toml::Value::String(username.clone()));
            entry.insert("secret".to_string(), toml::Value::String(secret.clone()));
            toml::Value::Table(entry)
        })
        .collect();
    root.insert("users".to_string(), toml::Value::Array(entries));
    let body = to_toml(PANEL_SEED_FILE, &root)?;
    Ok(format!("# Pending import into the panel. Removed by mtdeploy once imported.\n{}", body))
}

/// Users listed in a panel seed, in file order.
pub fn parse_panel_seed(content: &str) -> Result<Vec<(String, String)>, AppError> {
    let table: toml::Table = toml::from_str(content).map_err(|e| AppError::TemplateInvalid {
        name: PANEL_SEED_FILE.to_string(),
        details: e.to_string(),
    })?;
    let users = table
        .get("users")
        .and_then(toml::Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| {
                    let username = entry.get("username")?.as_str()?;
                    let secret = entry.get("secret")?.as_str()?;
                    Some((username.to_string(), secret.to_string()))
                })
                .collect()
        })
        .unwrap_or_default();
    Ok(users)
}

fn rebuild_router_rule(router: &mut serde_yaml::Value, domain: &MasqueradeDomain) {
    let rule = serde_yaml::Value::String(format!("HostSNI(`{}`)", domain));
    if let Some(routers) = router
        .get_mut("tcp")
        .and_then(|tcp| tcp.get_mut("routers"))
        .and_then(serde_yaml::Value::as_mapping_mut)
    {
        for (_, entry) in routers.iter_mut() {
            if let Some(map) = entry.as_mapping_mut() {
                map.insert(serde_yaml::Value::String("rule".to_string()), rule.clone());
            }
        }
    }
}

/// SNI of the first TCP router, when the rule is a plain `HostSNI`.
pub fn router_sni(router: &serde_yaml::Value) -> Option<String> {
    let routers = router.get("tcp")?.get("routers")?.as_mapping()?;
    routers.iter().find_map(|(_, entry)| {
        let rule = entry.get("rule")?.as_str()?;
        let inner = rule.strip_prefix("HostSNI(`")?.strip_suffix("`)")?;
        Some(inner.to_string())
    })
}

fn check_consistency(
    proxy: Option<&str>,
    router: Option<&str>,
    env: &str,
) -> Result<(), AppError> {
    match (proxy, router) {
        (Some(p), Some(r)) if p == env && r == env => Ok(()),
        _ => Err(AppError::SynthesisInconsistent(format!(
            "proxy config '{}', router rule '{}', environment '{}'",
            proxy.unwrap_or("<none>"),
            router.unwrap_or("<none>"),
            env
        ))),
    }
}

fn to_yaml(name: &str, value: &serde_yaml::Value) -> Result<String, AppError> {
    serde_yaml::to_string(value)
        .map_err(|e| AppError::TemplateInvalid { name: name.to_string(), details: e.to_string() })
}

fn to_toml(name: &str, value: &toml::Table) -> Result<String, AppError> {
    toml::to_string(value)
        .map_err(|e| AppError::TemplateInvalid { name: name.to_string(), details: e.to_string() })
}
