use std::path::Path;

use crate::error::{PainelError, Result};
use crate::settings::{load_settings, save_settings, Settings};

pub fn show(effective: &Settings) -> Result<()> {
    println!("{}", format_settings(effective));
    Ok(())
}

pub fn format_settings(s: &Settings) -> String {
    [
        format!("api_url:              {}", s.api_url),
        format!("cache_ttl_secs:       {}", s.cache_ttl_secs),
        format!("request_timeout_secs: {}", s.request_timeout_secs),
        format!("export_dir:           {}", s.export_dir),
    ]
    .join("\n")
}

/// Apply the given changes on top of `settings`. Unset arguments leave the
/// current value alone.
pub fn apply(
    mut settings: Settings,
    api_url: Option<String>,
    cache_ttl: Option<u64>,
    timeout: Option<u64>,
    export_dir: Option<String>,
) -> Result<Settings> {
    if let Some(url) = api_url {
        let url = url.trim().trim_end_matches('/');
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(PainelError::InvalidArgument(format!(
                "api-url must start with http:// or https://, got '{url}'"
            )));
        }
        settings.api_url = url.to_string();
    }
    if let Some(ttl) = cache_ttl {
        settings.cache_ttl_secs = ttl;
    }
    if let Some(t) = timeout {
        if t == 0 {
            return Err(PainelError::InvalidArgument("timeout must be at least 1 second".into()));
        }
        settings.request_timeout_secs = t;
    }
    if let Some(dir) = export_dir {
        if Path::new(&dir).as_os_str().is_empty() {
            return Err(PainelError::InvalidArgument("export-dir cannot be empty".into()));
        }
        settings.export_dir = dir;
    }
    Ok(settings)
}

pub fn set(
    api_url: Option<String>,
    cache_ttl: Option<u64>,
    timeout: Option<u64>,
    export_dir: Option<String>,
) -> Result<()> {
    if api_url.is_none() && cache_ttl.is_none() && timeout.is_none() && export_dir.is_none() {
        return Err(PainelError::InvalidArgument(
            "nothing to set; pass at least one of --api-url, --cache-ttl, --timeout, --export-dir"
                .into(),
        ));
    }
    let updated = apply(load_settings(), api_url, cache_ttl, timeout, export_dir)?;
    save_settings(&updated)?;
    println!("Settings saved.");
    println!("{}", format_settings(&updated));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_only_touches_given_fields() {
        let s = apply(Settings::default(), None, Some(60), None, None).unwrap();
        assert_eq!(s.cache_ttl_secs, 60);
        assert_eq!(s.api_url, Settings::default().api_url);
        assert_eq!(s.request_timeout_secs, 30);
    }

    #[test]
    fn test_apply_trims_trailing_slash() {
        let s = apply(Settings::default(), Some("https://api.exemplo.com/".into()), None, None, None)
            .unwrap();
        assert_eq!(s.api_url, "https://api.exemplo.com");
    }

    #[test]
    fn test_apply_rejects_bad_values() {
        assert!(apply(Settings::default(), Some("localhost:5000".into()), None, None, None).is_err());
        assert!(apply(Settings::default(), None, None, Some(0), None).is_err());
        assert!(apply(Settings::default(), None, None, None, Some(String::new())).is_err());
    }

    #[test]
    fn test_format_settings_lists_every_key() {
        let out = format_settings(&Settings::default());
        for key in ["api_url", "cache_ttl_secs", "request_timeout_secs", "export_dir"] {
            assert!(out.contains(key), "missing {key}");
        }
    }
}
