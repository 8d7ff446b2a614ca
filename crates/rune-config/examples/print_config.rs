/// Example program to print the loaded configuration
///
/// Run with: cargo run -p rune-config --example print_config

fn main() {
    let config = rune_config::RuneConfig::load();

    println!("=== Rune Configuration ===\n");

    println!("Text Settings:");
    println!("  Font: {:?}", config.text.font);
    println!("  Text Size: {}", config.text.text_size);
    println!("  Density: {}", config.text.density);
    println!("  Max Lines: {:?}", config.text.max_lines);
    println!("  Slow Layout Threshold: {:?}", config.slow_layout_threshold());
    println!();

    println!("Derived:");
    println!("  Flags: {:?}", config.text_flags());
    println!("  Dimensions: {:?}", config.dimensions());
    println!();

    match toml::to_string_pretty(&config) {
        Ok(toml_str) => {
            println!("=== Serialized Configuration ===");
            println!("{}", toml_str);
        }
        Err(e) => {
            eprintln!("Failed to serialize config: {}", e);
        }
    }
}
