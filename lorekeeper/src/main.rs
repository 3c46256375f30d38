//! Lorekeeper command line renderer.
//!
//! Prints a creature's stat block, rendered ability text, or combatant
//! summary from a bestiary file:
//!
//! ```bash
//! cargo run -p lorekeeper -- --bestiary monsters.json --guard Goblin --text "[Name] hides."
//! ```

mod cli;

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let filter =
        EnvFilter::try_from_env("LOREKEEPER_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() <= 1 || args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }

    let config = cli::parse_config_from_args(&args);
    let output = cli::run(&config).await?;
    println!("{output}");

    Ok(())
}

fn print_help() {
    println!("Lorekeeper - creature stat blocks and ability text");
    println!();
    println!("USAGE:");
    println!("  lorekeeper --bestiary <FILE> --guard <NAME> [OPTIONS]");
    println!("  lorekeeper --new <RULESET> [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("  -h, --help          Show this help message");
    println!("  --bestiary <FILE>   Bestiary JSON file to read");
    println!("  --guard <NAME>      Creature to select (case-insensitive)");
    println!("  --new <RULESET>     Use a freshly created creature instead");
    println!("  --text <TEXT>       Render ability text for the creature");
    println!("  --stat-block        Print the stat block (default without --text)");
    println!("  --combatant         Print the encounter summary");
    println!();
    println!("RULESETS:");
    println!("  dnd5e, pathfinder, adnd (existing records only)");
    println!();
    println!("ENVIRONMENT:");
    println!("  LOREKEEPER_LOG      Log filter, e.g. debug or lorekeeper_core=trace (default: warn)");
    println!();
    println!("EXAMPLES:");
    println!("  lorekeeper --new dnd5e");
    println!("  lorekeeper --bestiary monsters.json --guard Goblin --combatant");
    println!("  lorekeeper --bestiary monsters.json --guard Goblin --text \"[Name] hits for 1d6[+dex].\"");
}
