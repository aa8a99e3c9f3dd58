//! Generate config command

use std::path::Path;

use colored::Colorize;

use crate::cli::CliError;
use crate::config::StaticConfig;

/// Generate example configuration file
pub fn generate_config(output_path: Option<String>, force: bool) -> Result<(), CliError> {
    let path = output_path.unwrap_or_else(|| "config.example.toml".to_string());

    if Path::new(&path).exists() && !force {
        return Err(CliError::CommandError(format!(
            "{} already exists, pass --force to overwrite",
            path
        )));
    }

    println!(
        "{} {}",
        "Generating configuration file...".yellow(),
        path.blue()
    );

    StaticConfig::default()
        .save_to_file(&path)
        .map_err(|e| CliError::CommandError(format!("Failed to write {}: {}", path, e)))?;

    println!(
        "  {} {}",
        "Configuration file generated successfully".green(),
        path.blue()
    );
    println!(
        "  {}",
        "Environment variables (CTA__SECTION__KEY) override file values".dimmed()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_generate_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let path_str = path.to_string_lossy().to_string();

        generate_config(Some(path_str.clone()), false).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("[retention]"));

        assert!(generate_config(Some(path_str.clone()), false).is_err());
        assert!(generate_config(Some(path_str), true).is_ok());
    }
}
