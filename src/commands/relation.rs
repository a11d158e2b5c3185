//! Relation, unit and charm config commands

use super::print_value;
use anyhow::{Context, Result};
use charmhelpers::context::HookContext;
use charmhelpers::services::hookenv;
use charmhelpers::LogLevel;
use serde_json::Value;

pub fn handle_relation_ids(ctx: &HookContext, relation: &str) -> Result<()> {
    for rid in hookenv::relation_ids(ctx.exec(), relation)?.unwrap_or_default() {
        println!("{}", rid);
    }
    Ok(())
}

pub fn handle_relation_list(ctx: &HookContext, rid: &str) -> Result<()> {
    for unit in hookenv::relation_list(ctx.exec(), rid)?.unwrap_or_default() {
        println!("{}", unit);
    }
    Ok(())
}

pub fn handle_relation_get(
    ctx: &HookContext,
    attribute: &str,
    unit: Option<&str>,
    rid: Option<&str>,
) -> Result<()> {
    let value = hookenv::relation_get(ctx.exec(), attribute, unit, rid)?;
    print_value(value.as_deref());
    Ok(())
}

pub fn handle_relation_set(ctx: &HookContext, rid: Option<&str>, settings: &[String]) -> Result<()> {
    let pairs = parse_settings(settings)?;
    hookenv::relation_set(ctx.exec(), rid, pairs)
}

pub fn handle_unit_get(ctx: &HookContext, attribute: &str) -> Result<()> {
    let value = hookenv::unit_get(ctx.exec(), attribute)?;
    print_value(value.as_deref());
    Ok(())
}

pub fn handle_config_get(ctx: &HookContext, attribute: Option<&str>) -> Result<()> {
    match attribute {
        Some(attribute) => {
            if let Some(value) = hookenv::config_get(ctx.exec(), attribute)? {
                println!("{}", render_value(&value));
            }
        }
        None => {
            let config = hookenv::config_get_all(ctx.exec())?;
            let rendered = serde_json::to_string_pretty(&config)
                .context("Failed to serialize charm config")?;
            println!("{}", rendered);
        }
    }
    Ok(())
}

pub fn handle_relation_made(ctx: &HookContext, relation: &str, key: &str) -> Result<bool> {
    hookenv::is_relation_made(ctx.exec(), relation, key)
}

pub fn handle_log(ctx: &HookContext, level: LogLevel, message: &str) -> Result<()> {
    hookenv::juju_log(ctx.exec(), level, message)
}

/// Split `key=value` arguments; values may contain `=`
fn parse_settings(settings: &[String]) -> Result<Vec<(&str, &str)>> {
    settings
        .iter()
        .map(|setting| {
            setting
                .split_once('=')
                .filter(|(key, _)| !key.is_empty())
                .with_context(|| format!("Invalid setting '{}' (expected key=value)", setting))
        })
        .collect()
}

/// Strings print bare so shell hooks can use them directly
fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_settings() {
        let settings = vec![
            "user=wordpress".to_string(),
            "dsn=mysql://h/db?ssl=true".to_string(),
            "empty=".to_string(),
        ];
        assert_eq!(
            parse_settings(&settings).unwrap(),
            vec![
                ("user", "wordpress"),
                ("dsn", "mysql://h/db?ssl=true"),
                ("empty", ""),
            ]
        );
    }

    #[test]
    fn test_parse_settings_rejects_bare_words() {
        assert!(parse_settings(&["ready".to_string()]).is_err());
        assert!(parse_settings(&["=value".to_string()]).is_err());
    }

    #[test]
    fn test_render_value() {
        assert_eq!(render_value(&json!("web")), "web");
        assert_eq!(render_value(&json!(8080)), "8080");
        assert_eq!(render_value(&json!(true)), "true");
        assert_eq!(render_value(&json!(["a", "b"])), r#"["a","b"]"#);
    }
}
