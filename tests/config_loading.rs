// tests/config_loading.rs
use serial_test::serial;
use std::{env, fs};

use universal_widget::config::{ENV_CONFIG_PATH, ENV_WIKIPEDIA_TOKENS, ENV_WIKIPEDIA_USERNAMES};
use universal_widget::{SizeClass, WidgetConfig};

struct CwdGuard(std::path::PathBuf);

impl Drop for CwdGuard {
    fn drop(&mut self) {
        let _ = env::set_current_dir(&self.0);
    }
}

fn enter(dir: &std::path::Path) -> CwdGuard {
    let guard = CwdGuard(env::current_dir().unwrap());
    env::set_current_dir(dir).unwrap();
    guard
}

#[test]
#[serial]
fn toml_wins_over_json_in_config_dir() {
    let tmp = tempfile::tempdir().unwrap();
    let _cwd = enter(tmp.path());
    env::remove_var(ENV_CONFIG_PATH);

    fs::create_dir_all("config").unwrap();
    fs::write("config/widget.json", r#"{"default_source": "imdb"}"#).unwrap();
    assert_eq!(WidgetConfig::load_default().unwrap().default_source, "imdb");

    fs::write("config/widget.toml", "default_source = \"github\"\n").unwrap();
    let cfg = WidgetConfig::load_default().unwrap();
    assert_eq!(cfg.default_source, "github");
    // omitted tables keep their built-in values
    assert_eq!(cfg.sources.len(), 6);
    assert_eq!(cfg.profile(SizeClass::Large).max_items, 10);
}

#[test]
#[serial]
fn env_placeholders_resolve_on_load() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("widget.toml");
    fs::write(
        &path,
        r#"
        [sources.wikipedia]
        name = "Wikipedia Edits"
        endpoint = "/wikipedia-watchlist"
        icon = "book.fill"
        refresh_hours = 2
        usernames = "ENV"
        tokens = "ENV"
        languages = "en"
        "#,
    )
    .unwrap();

    env::set_var(ENV_WIKIPEDIA_USERNAMES, "en:Jane");
    env::set_var(ENV_WIKIPEDIA_TOKENS, "en:secret");
    let cfg = WidgetConfig::load_from(&path).unwrap();
    let wiki = cfg.source("wikipedia").unwrap();
    assert_eq!(wiki.id, "wikipedia");
    assert_eq!(wiki.usernames.as_deref(), Some("en:Jane"));
    assert_eq!(wiki.tokens.as_deref(), Some("en:secret"));

    env::remove_var(ENV_WIKIPEDIA_TOKENS);
    let err = WidgetConfig::load_from(&path).unwrap_err();
    assert!(err.to_string().contains(ENV_WIKIPEDIA_TOKENS), "{err}");
    env::remove_var(ENV_WIKIPEDIA_USERNAMES);
}

#[test]
#[serial]
fn malformed_file_is_reported_with_its_path() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("broken.toml");
    fs::write(&path, "default_source = [").unwrap();
    let err = WidgetConfig::load_from(&path).unwrap_err();
    assert!(format!("{err:#}").contains("broken.toml"));
}

#[test]
#[serial]
fn shipped_config_matches_builtin_defaults() {
    let shipped = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("config/widget.toml");
    let shipped = WidgetConfig::load_from(&shipped).unwrap();

    let tmp = tempfile::tempdir().unwrap();
    let _cwd = enter(tmp.path());
    env::remove_var(ENV_CONFIG_PATH);
    assert_eq!(shipped, WidgetConfig::load_default().unwrap());
}
