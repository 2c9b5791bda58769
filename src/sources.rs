use anyhow::Result;
use std::path::Path;

use crate::config::Config;
use crate::resolver;

/// List the provider chain in priority order with configuration status.
pub fn list_providers(config: &Config) -> Result<()> {
    let chain = resolver::build_chain(config);

    println!("{:<14} {:<16} DETAIL", "PROVIDER", "STATUS");
    for name in ["query_api", "local_table", "remote_table"] {
        match chain.iter().find(|p| p.name() == name) {
            Some(provider) => {
                let mut detail = provider.describe();
                if name == "local_table" && !Path::new(&detail).exists() {
                    detail.push_str(" (missing)");
                }
                println!("{:<14} {:<16} {}", name, "configured", detail);
            }
            None => println!("{:<14} {:<16}", name, "not configured"),
        }
    }

    Ok(())
}
