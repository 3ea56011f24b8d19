use anyhow::Result;
use crewdeck_infrastructure::{ConfigService, CrewdeckPaths};
use serde_json::json;

use super::utils::print_json;

pub fn init(service: &ConfigService) -> Result<()> {
    let path = service.ensure_config_file()?;
    println!("Config: {}", path.display());
    Ok(())
}

pub fn paths(paths: &CrewdeckPaths, json: bool) -> Result<()> {
    let files = [
        ("base", paths.base_dir().to_path_buf()),
        ("config", paths.config_file()),
        ("secret", paths.secret_file()),
        ("session", paths.session_file()),
        ("events", paths.events_file()),
        ("chat", paths.chat_file()),
        ("users", paths.users_file()),
    ];
    if json {
        let map: serde_json::Map<String, serde_json::Value> = files
            .iter()
            .map(|(name, path)| (name.to_string(), json!(path.display().to_string())))
            .collect();
        return print_json(&map);
    }
    for (name, path) in files {
        println!("{:<8} {}", name, path.display());
    }
    Ok(())
}
