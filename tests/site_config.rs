// tests/site_config.rs
use mars_design_site::config::site::ENV_SITE_CONFIG_PATH;
use mars_design_site::SiteConfig;
use std::{env, fs};

const ENV_KEYS: &[&str] = &[
    ENV_SITE_CONFIG_PATH,
    "CONTENTFUL_SPACE_ID",
    "CONTENTFUL_ACCESS_TOKEN",
    "CONTENTFUL_PREVIEW_ACCESS_TOKEN",
    "CONTENTFUL_PREVIEW_SECRET",
    "CONTENTFUL_ENVIRONMENT",
    "EMAIL_HOST",
    "EMAIL_PORT",
    "EMAIL_SECURE",
    "EMAIL_USER",
    "EMAIL_PASSWORD",
    "CONTACT_EMAIL",
    "CAREERS_EMAIL",
    "REVALIDATE_SECS",
];

fn clear_env() {
    for k in ENV_KEYS {
        env::remove_var(k);
    }
}

#[serial_test::serial]
#[test]
fn from_env_reads_deployment_variables() {
    clear_env();
    env::set_var("CONTENTFUL_SPACE_ID", "space-1");
    env::set_var("CONTENTFUL_ACCESS_TOKEN", "cda-token");
    env::set_var("EMAIL_USER", "studio@example.com");
    env::set_var("EMAIL_PORT", "465");
    env::set_var("EMAIL_SECURE", "true");
    env::set_var("CAREERS_EMAIL", "jobs@example.com");

    let cfg = SiteConfig::from_env().unwrap();
    assert_eq!(cfg.content.space_id, "space-1");
    assert_eq!(cfg.content.environment, "master");
    assert!(cfg.content.preview_access_token.is_none());
    assert_eq!(cfg.mail.port, 465);
    assert!(cfg.mail.secure);
    assert_eq!(cfg.mail.contact_recipient(), "studio@example.com");
    assert_eq!(cfg.mail.careers_recipient(), "jobs@example.com");
    assert_eq!(cfg.revalidate_secs, 3600);
    assert!(cfg.preview.secret.is_none());

    env::set_var("EMAIL_PORT", "not-a-port");
    assert!(SiteConfig::from_env().is_err());
    clear_env();
}

#[serial_test::serial]
#[test]
fn from_env_requires_content_credentials() {
    clear_env();
    let err = SiteConfig::from_env().unwrap_err();
    assert!(err.to_string().contains("CONTENTFUL_SPACE_ID"));
}

#[serial_test::serial]
#[test]
fn toml_placeholders_resolve_from_env() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("site.toml");
    fs::write(
        &p,
        r#"
revalidate_secs = 600

[content]
space_id = "space-2"
access_token = "ENV"
preview_access_token = "ENV"

[mail]
user = "studio@example.com"
password = "ENV"
contact_to = "hello@example.com"

[preview]
secret = "ENV"
"#,
    )
    .unwrap();

    // access token placeholder without a value is an error
    assert!(SiteConfig::load_from_file(&p).is_err());

    env::set_var("CONTENTFUL_ACCESS_TOKEN", "from-env");
    env::set_var("EMAIL_PASSWORD", "app-password");
    env::set_var("CONTENTFUL_PREVIEW_SECRET", "shh");
    let cfg = SiteConfig::load_from_file(&p).unwrap();
    assert_eq!(cfg.content.access_token, "from-env");
    assert_eq!(cfg.content.preview_access_token, None);
    assert_eq!(cfg.mail.password, "app-password");
    assert_eq!(cfg.mail.contact_recipient(), "hello@example.com");
    assert_eq!(cfg.preview.secret.as_deref(), Some("shh"));
    assert_eq!(cfg.revalidate_secs, 600);
    clear_env();
}

#[serial_test::serial]
#[test]
fn default_uses_env_path_then_file_then_env() {
    clear_env();
    let old = env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    env::set_current_dir(tmp.path()).unwrap();

    // 1) nothing configured -> env fallback fails on missing credentials
    assert!(SiteConfig::load_default().is_err());

    // 2) env-only configuration
    env::set_var("CONTENTFUL_SPACE_ID", "from-env-vars");
    env::set_var("CONTENTFUL_ACCESS_TOKEN", "t");
    assert_eq!(SiteConfig::load_default().unwrap().content.space_id, "from-env-vars");

    // 3) config/site.toml wins over plain env vars
    fs::create_dir_all(tmp.path().join("config")).unwrap();
    fs::write(
        tmp.path().join("config/site.toml"),
        "[content]\nspace_id = \"from-default-file\"\naccess_token = \"t\"\n",
    )
    .unwrap();
    assert_eq!(SiteConfig::load_default().unwrap().content.space_id, "from-default-file");

    // 4) SITE_CONFIG_PATH wins over everything
    let explicit = tmp.path().join("explicit.toml");
    fs::write(&explicit, "[content]\nspace_id = \"from-explicit\"\naccess_token = \"t\"\n").unwrap();
    env::set_var(ENV_SITE_CONFIG_PATH, explicit.display().to_string());
    assert_eq!(SiteConfig::load_default().unwrap().content.space_id, "from-explicit");

    // 5) pointing at a missing file is an error, not a silent fallback
    env::set_var(ENV_SITE_CONFIG_PATH, tmp.path().join("missing.toml").display().to_string());
    assert!(SiteConfig::load_default().is_err());

    clear_env();
    env::set_current_dir(&old).unwrap();
}
