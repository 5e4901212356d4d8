
use std::path::Path;

use anyhow::{Context, Result};
use console::style;
use dialoguer::{Confirm, Input, Select};

use super::{Config, ConfigError, Credentials, ProviderConfig};
use crate::index::Metric;
use crate::provider::ProviderClient;

#[inline]
pub fn run_interactive_config(config_dir: &Path) -> Result<()> {
    eprintln!("{}", style("🔧 Profile Assistant Configuration Setup").bold().cyan());
    eprintln!();

    let mut config = load_existing_config(config_dir);

    eprintln!("{}", style("Provider Configuration").bold().yellow());
    eprintln!("Configure the embedding and completion service.");
    eprintln!();

    configure_provider(&mut config.provider)?;

    eprintln!();
    eprintln!("{}", style("Retrieval Configuration").bold().yellow());
    configure_retrieval(&mut config)?;

    eprintln!();
    eprintln!("{}", style("Testing configuration...").yellow());

    match test_provider_connection(&config.provider) {
        Ok(()) => eprintln!("{}", style("✓ Provider connection successful!").green()),
        Err(e) => {
            eprintln!(
                "{}",
                style(format!("⚠ Warning: Could not reach provider: {e}")).yellow()
            );
            eprintln!("You can continue, but the assistant will fail until this is fixed.");
        }
    }

    eprintln!();
    if Confirm::new()
        .with_prompt("Save configuration?")
        .default(true)
        .interact()?
    {
        config.save().context("Failed to save configuration")?;
        eprintln!("{}", style("✓ Configuration saved successfully!").green());
        eprintln!(
            "Configuration saved to: {}",
            style(config.config_file_path().display()).cyan()
        );
    } else {
        eprintln!("Configuration not saved.");
    }

    Ok(())
}

#[inline]
pub fn show_config(config: &Config, check: bool) -> Result<()> {
    eprintln!("{}", style("📋 Current Configuration").bold().cyan());
    eprintln!();

    eprintln!("{}", style("Provider Settings:").bold().yellow());
    match config.provider.base_url() {
        Ok(url) => eprintln!("  Base URL: {}", style(url).cyan()),
        Err(e) => eprintln!("  Base URL: {} ({})", style("Invalid").red(), e),
    }
    eprintln!(
        "  Embedding Model: {}",
        style(&config.provider.embedding_model).cyan()
    );
    eprintln!(
        "  Completion Model: {}",
        style(&config.provider.completion_model).cyan()
    );
    eprintln!("  Max Tokens: {}", style(config.provider.max_tokens).cyan());
    eprintln!(
        "  Temperature: {}",
        style(config.provider.temperature).cyan()
    );
    eprintln!(
        "  Timeout: {}",
        style(format!("{}s", config.provider.timeout_seconds)).cyan()
    );

    let credential_status = if Credentials::from_env(&config.provider.api_key_env).is_ok() {
        style("set").green()
    } else {
        style("not set").red()
    };
    eprintln!(
        "  Credential ({}): {}",
        config.provider.api_key_env, credential_status
    );

    eprintln!();
    eprintln!("{}", style("Retrieval Settings:").bold().yellow());
    eprintln!("  Max Words per Chunk: {}", style(config.chunking.max_words).cyan());
    eprintln!("  Top K: {}", style(config.retrieval.top_k).cyan());
    eprintln!("  Metric: {}", style(config.retrieval.metric).cyan());
    eprintln!("  Subject: {}", style(&config.prompt.subject).cyan());
    eprintln!("  Index: {}", style(config.index_path().display()).cyan());

    eprintln!();
    eprintln!("Config file: {}", style(config.config_file_path().display()).dim());

    if check {
        eprintln!();
        match test_provider_connection(&config.provider) {
            Ok(()) => eprintln!("{}", style("✓ Provider health check passed").green()),
            Err(e) => eprintln!("{} {:#}", style("✗ Provider health check failed:").red(), e),
        }
    }

    Ok(())
}

fn load_existing_config(config_dir: &Path) -> Config {
    Config::load(config_dir).unwrap_or_else(|_| {
        eprintln!(
            "{}",
            style("No usable configuration found. Using defaults.").yellow()
        );
        Config {
            base_dir: config_dir.to_path_buf(),
            ..Config::default()
        }
    })
}

fn configure_provider(provider: &mut ProviderConfig) -> Result<()> {
    let base_url: String = Input::new()
        .with_prompt("Provider base URL")
        .default(provider.base_url.clone())
        .validate_with(|input: &String| -> Result<(), ConfigError> {
            let temp_config = ProviderConfig {
                base_url: input.clone(),
                ..ProviderConfig::default()
            };
            temp_config.base_url()?;
            Ok(())
        })
        .interact_text()?;

    let api_key_env: String = Input::new()
        .with_prompt("Environment variable holding the API key")
        .default(provider.api_key_env.clone())
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.trim().is_empty() {
                Err("Variable name cannot be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    let embedding_model: String = Input::new()
        .with_prompt("Embedding model")
        .default(provider.embedding_model.clone())
        .interact_text()?;

    let completion_model: String = Input::new()
        .with_prompt("Completion model")
        .default(provider.completion_model.clone())
        .interact_text()?;

    let timeout_seconds: u64 = Input::new()
        .with_prompt("Request timeout in seconds")
        .default(provider.timeout_seconds)
        .validate_with(|input: &u64| -> Result<(), &str> {
            if (1..=300).contains(input) {
                Ok(())
            } else {
                Err("Timeout must be between 1 and 300 seconds")
            }
        })
        .interact_text()?;

    provider.set_base_url(base_url)?;
    provider.api_key_env = api_key_env.trim().to_string();
    provider.set_embedding_model(embedding_model)?;
    provider.set_completion_model(completion_model)?;
    provider.set_timeout_seconds(timeout_seconds)?;

    Ok(())
}

fn configure_retrieval(config: &mut Config) -> Result<()> {
    let top_k: usize = Input::new()
        .with_prompt("Passages retrieved per question")
        .default(config.retrieval.top_k)
        .validate_with(|input: &usize| -> Result<(), &str> {
            if (1..=50).contains(input) {
                Ok(())
            } else {
                Err("Must be between 1 and 50")
            }
        })
        .interact_text()?;

    let metrics = [Metric::L2, Metric::InnerProduct];
    let default_index = metrics
        .iter()
        .position(|&m| m == config.retrieval.metric)
        .unwrap_or(0);
    let metric_index = Select::new()
        .with_prompt("Similarity metric used when building the index")
        .default(default_index)
        .items(&metrics)
        .interact()?;

    let subject: String = Input::new()
        .with_prompt("Name of the person the knowledge base describes")
        .default(config.prompt.subject.clone())
        .interact_text()?;

    config.retrieval.top_k = top_k;
    config.retrieval.metric = metrics[metric_index];
    config.prompt.subject = subject;

    Ok(())
}

fn test_provider_connection(provider: &ProviderConfig) -> Result<()> {
    let credentials = Credentials::from_env(&provider.api_key_env)?;
    let client = ProviderClient::new(provider, credentials)?;
    client.health_check()?;
    Ok(())
}
