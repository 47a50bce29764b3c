//! formpilot command implementations

use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

use formpilot_agent::AgentLoop;
use formpilot_config::Config;
use formpilot_mcp::StdioServer;
use formpilot_provider::OpenAiProvider;

/// API key: environment wins, config falls back
fn resolve_api_key(config: &Config) -> Option<String> {
    std::env::var("OPENAI_API_KEY")
        .ok()
        .filter(|k| !k.is_empty())
        .or_else(|| config.api_key())
}

/// Forms server command: environment wins, config falls back
fn resolve_server_command(config: &Config) -> Option<String> {
    std::env::var("GOOGLE_FORMS_MCP_PATH")
        .ok()
        .filter(|p| !p.is_empty())
        .or_else(|| config.server_command())
}

/// Read one line from stdin
fn read_line() -> String {
    let mut input = String::new();
    let _ = std::io::stdin().read_line(&mut input);
    input.trim().to_string()
}

fn read_request_interactively() -> Result<String> {
    println!("=== Google Forms Creator ===");
    println!("Enter your form details:");
    println!("Format: 'Title: [Your Title] | Questions: [Question 1] | [Question 2] | ...'");
    println!("Example: 'Title: Customer Feedback | Questions: required What are your comments? | How satisfied are you? (Very Satisfied, Satisfied, Neutral, Dissatisfied, Very Dissatisfied)'");
    println!();
    println!("To mark questions as REQUIRED, prefix them with 'required':");
    println!("Example: 'Title: Survey | Questions: required How would you rate me? (Good, Bad) | What do you think? | required What should I improve?'");
    println!("{}", "=".repeat(80));
    print!("Enter your form request: ");
    std::io::stdout().flush()?;
    Ok(read_line())
}

/// Initialize config and print next steps
pub async fn init_command() -> Result<()> {
    println!("Initializing formpilot...");

    formpilot_config::init().await?;

    println!("formpilot initialized");
    println!("\nNext steps:");
    println!(
        "  1. Add your OpenAI API key to {}",
        formpilot_config::config_path().display()
    );
    println!("     (or export OPENAI_API_KEY)");
    println!("  2. Point forms_server.command at the Google Forms MCP server");
    println!("     (or export GOOGLE_FORMS_MCP_PATH)");
    println!("  3. Run: formpilot ask -m \"Title: Survey | Questions: How did we do?\"");

    Ok(())
}

/// Run one form-building request
pub async fn ask_command(message: Option<String>) -> Result<()> {
    let config = Config::load().await?;

    let api_key = resolve_api_key(&config).context(
        "No API key configured. Export OPENAI_API_KEY or set it in ~/.formpilot/config.json",
    )?;
    let server_command = resolve_server_command(&config).context(
        "No Forms server configured. Export GOOGLE_FORMS_MCP_PATH or set forms_server.command in ~/.formpilot/config.json",
    )?;

    // Usually a script path; catch typos before spawning.
    if server_command.contains('/') && !Path::new(&server_command).exists() {
        anyhow::bail!("Forms server not found at {}", server_command);
    }

    let request = match message {
        Some(m) => m.trim().to_string(),
        None => read_request_interactively()?,
    };
    if request.is_empty() {
        anyhow::bail!("Please provide form details");
    }

    println!("\nProcessing: {}", request);
    println!("{}", "=".repeat(50));

    let provider = OpenAiProvider::new(api_key, config.api_base(), Some(config.default_model()));
    let agent = AgentLoop::new(provider, config.default_model()).with_limits(
        config.max_tool_iterations(),
        config.temperature(),
        config.max_tokens(),
    );

    let mut session = StdioServer::new(server_command, config.server_args());
    session
        .start()
        .await
        .context("Failed to start the Forms server")?;

    // The session must close on both outcomes; async drop cannot do it.
    let result = agent.run(&mut session, &request).await;
    session.stop().await;
    let output = result?;

    println!("\n{}", output.text);
    println!("\nCompleted after {} iterations", output.iterations);

    Ok(())
}

/// Show configuration status
pub async fn status_command() -> Result<()> {
    let config_path = formpilot_config::config_path();

    println!("formpilot status");
    println!("-----------------------------");
    println!(
        "Config:       {} {}",
        config_path.display(),
        if config_path.exists() { "[OK]" } else { "[Missing]" }
    );

    let config = Config::load().await?;
    println!("Model:        {}", config.default_model());
    println!(
        "API key:      {}",
        if resolve_api_key(&config).is_some() {
            "[Set]"
        } else {
            "[Missing]"
        }
    );
    match resolve_server_command(&config) {
        Some(command) => {
            let found = !command.contains('/') || Path::new(&command).exists();
            println!(
                "Forms server: {} {}",
                command,
                if found { "[OK]" } else { "[Missing]" }
            );
        }
        None => println!("Forms server: [Not set]"),
    }
    println!("Max tool iterations: {}", config.max_tool_iterations());

    Ok(())
}
