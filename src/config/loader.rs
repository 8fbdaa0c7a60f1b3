//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};
use crate::load_balancer::backend::AddressError;

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {var}: {reason}")]
    Env { var: String, reason: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error(transparent)]
    Address(#[from] AddressError),

    #[error("route {route:?} references unknown pool {pool:?}")]
    UnknownPool { route: String, pool: String },
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load a TOML file without validating it.
pub fn read_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Build the effective configuration: file (or defaults), then environment, then validation.
pub fn load_config(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => read_config(path)?,
        None => GatewayConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply `PORT` and `<POOL>_SERVICES` overrides.
///
/// `lookup` abstracts the environment so overrides can be tested without
/// touching process state.
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(port) = lookup("PORT") {
        let port: u16 = port.trim().parse().map_err(|_| ConfigError::Env {
            var: "PORT".to_string(),
            reason: format!("{:?} is not a port number", port),
        })?;
        config.listener.bind_address = with_port(&config.listener.bind_address, port);
    }

    for pool in &mut config.pools {
        let var = services_var(&pool.name);
        if let Some(list) = lookup(&var) {
            let backends: Vec<String> = list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            if backends.is_empty() {
                return Err(ConfigError::Env {
                    var,
                    reason: "no backend addresses given".to_string(),
                });
            }
            pool.backends = backends;
        }
    }

    Ok(())
}

/// Environment variable holding the backend list of a pool, e.g. `RESTAURANT_SERVICES`.
pub fn services_var(pool: &str) -> String {
    let name: String = pool
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
        .collect();
    format!("{}_SERVICES", name)
}

fn with_port(bind_address: &str, port: u16) -> String {
    let host = match bind_address.rsplit_once(':') {
        Some((host, _)) if !host.is_empty() => host,
        _ => "0.0.0.0",
    };
    format!("{}:{}", host, port)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn port_override_keeps_host() {
        let mut config = GatewayConfig::default();
        apply_env_overrides(&mut config, env(&[("PORT", "9100")])).unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:9100");
    }

    #[test]
    fn bad_port_is_rejected() {
        let mut config = GatewayConfig::default();
        let err = apply_env_overrides(&mut config, env(&[("PORT", "http")])).unwrap_err();
        assert!(matches!(err, ConfigError::Env { ref var, .. } if var == "PORT"));
    }

    #[test]
    fn services_override_replaces_pool_backends() {
        let mut config = GatewayConfig::default();
        apply_env_overrides(
            &mut config,
            env(&[("ORDER_SERVICES", " http://10.0.0.5:6001, http://10.0.0.6:6001 ,")]),
        )
        .unwrap();

        assert_eq!(
            config.pools[1].backends,
            vec!["http://10.0.0.5:6001", "http://10.0.0.6:6001"]
        );
        assert_eq!(config.pools[0].backends.len(), 2);
    }

    #[test]
    fn empty_services_override_is_rejected() {
        let mut config = GatewayConfig::default();
        assert!(apply_env_overrides(&mut config, env(&[("RESTAURANT_SERVICES", " , ")])).is_err());
    }

    #[test]
    fn services_var_names() {
        assert_eq!(services_var("restaurant"), "RESTAURANT_SERVICES");
        assert_eq!(services_var("menu-v2"), "MENU_V2_SERVICES");
    }

    #[test]
    fn validation_error_lists_everything() {
        let err = ConfigError::Validation(vec![
            ValidationError::EmptyPool("order".into()),
            ValidationError::Zero("timeouts.upstream_secs"),
        ]);
        assert_eq!(
            err.to_string(),
            "Validation failed: pool \"order\" has no backends, timeouts.upstream_secs must be greater than zero"
        );
    }

    #[test]
    fn read_config_reports_parse_errors() {
        let dir = std::env::temp_dir().join(format!("gateway-config-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("broken.toml");
        fs::write(&path, "[listener\nbind_address = 1").unwrap();

        assert!(matches!(read_config(&path), Err(ConfigError::Parse(_))));
        assert!(matches!(
            read_config(&dir.join("missing.toml")),
            Err(ConfigError::Io(_))
        ));
        fs::remove_dir_all(&dir).unwrap();
    }
}
