use colored::Colorize;
use keysign_service::SignerConfig;

pub fn handle(config: &SignerConfig) {
    println!("{}", "Supported algorithms:".cyan());
    for (algorithm, scheme) in config.scheme_table() {
        let settings = config.settings(algorithm);
        let sizes = algorithm
            .supported_key_sizes()
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "  {:<4} {:<16} key size {} (supported: {})",
            algorithm.name(),
            scheme.name(),
            settings.key_size,
            sizes
        );
    }
    println!();
    println!("  key encoding: {}", config.key_encoding);
    println!("  chunk size:   {} bytes", config.chunk_size);
    println!("  atomic writes: {}", config.atomic_writes);
}
