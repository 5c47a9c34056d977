use std::fs;

fn main() {
    // Validate default config at compile time
    let config_path = "src/default_config.toml";
    println!("cargo:rerun-if-changed={}", config_path);

    let content = fs::read_to_string(config_path).expect("Failed to read default_config.toml");

    let table = match content.parse::<toml::Table>() {
        Ok(table) => table,
        Err(e) => panic!("Invalid default_config.toml: {}", e),
    };

    if let Some(theme) = table.get("theme").and_then(|v| v.as_str()) {
        if !matches!(theme, "default" | "warm" | "rustic") {
            panic!("default_config.toml names unknown theme '{}'", theme);
        }
    }

    for sheet in ["default", "warm", "rustic"] {
        println!("cargo:rerun-if-changed=src/themes/{}.css", sheet);
    }
}
