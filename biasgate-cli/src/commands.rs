//! CLI subcommand handlers.

use crate::Commands;
use crate::ConfigAction;
use biasgate_core::config::{BiasConfig, load_config, workspace_config_path};
use biasgate_core::gateway::{GatewayState, run_gateway};
use biasgate_core::{BiasDetector, RosterInput, Verdict};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

/// Exit status of `check` when the roster is rejected.
const REJECTED_EXIT: u8 = 2;

/// Handle a CLI subcommand.
pub async fn handle_command(
    command: Commands,
    workspace: &Path,
    config_path: Option<&Path>,
) -> anyhow::Result<ExitCode> {
    match command {
        Commands::Serve { host, port } => {
            handle_serve(host, port, workspace, config_path).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check { file, trial_id } => {
            handle_check(&file, trial_id, workspace, config_path)
        }
        Commands::Config { action } => {
            handle_config(action, workspace, config_path)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load(workspace: &Path, config_path: Option<&Path>) -> anyhow::Result<BiasConfig> {
    load_config(Some(workspace), config_path)
        .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
}

async fn handle_serve(
    host: Option<String>,
    port: Option<u16>,
    workspace: &Path,
    config_path: Option<&Path>,
) -> anyhow::Result<()> {
    let mut config = load(workspace, config_path)?;
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let state = Arc::new(GatewayState::from_config(&config));
    tracing::debug!(detector = ?state.detector(), "Detector configured");
    run_gateway(state, &config.server).await?;
    Ok(())
}

fn handle_check(
    file: &Path,
    trial_id: Option<String>,
    workspace: &Path,
    config_path: Option<&Path>,
) -> anyhow::Result<ExitCode> {
    let config = load(workspace, config_path)?;
    let text = std::fs::read_to_string(file)
        .map_err(|e| anyhow::anyhow!("Cannot read {}: {}", file.display(), e))?;
    let verdict = screen_roster(&text, trial_id, &config)
        .map_err(|e| anyhow::anyhow!("{}: {}", file.display(), e))?;

    println!("{}", serde_json::to_string_pretty(&verdict)?);
    Ok(if verdict.passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(REJECTED_EXIT)
    })
}

/// Parse a roster document and screen it with a detector built from `config`.
fn screen_roster(
    text: &str,
    trial_id: Option<String>,
    config: &BiasConfig,
) -> anyhow::Result<Verdict> {
    let input: RosterInput = serde_json::from_str(text)
        .map_err(|e| anyhow::anyhow!("not a valid roster: {}", e))?;
    let mut request = input.into_request();
    if trial_id.is_some() {
        request.trial_id = trial_id;
    }

    let detector = BiasDetector::new(config);
    Ok(detector.evaluate(request.trial_id(), request.patients())?)
}

fn handle_config(
    action: ConfigAction,
    workspace: &Path,
    config_path: Option<&Path>,
) -> anyhow::Result<()> {
    match action {
        ConfigAction::Init => {
            let config_path = workspace_config_path(workspace);
            if config_path.exists() {
                println!(
                    "Configuration file already exists at: {}",
                    config_path.display()
                );
                return Ok(());
            }
            if let Some(dir) = config_path.parent() {
                std::fs::create_dir_all(dir)?;
            }

            let toml_str = toml::to_string_pretty(&BiasConfig::default())?;
            std::fs::write(&config_path, &toml_str)?;
            println!(
                "Created default configuration at: {}",
                config_path.display()
            );
            Ok(())
        }
        ConfigAction::Show => {
            let config = load(workspace, config_path)?;
            let toml_str = toml::to_string_pretty(&config)?;
            println!("{}", toml_str);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn young_roster_json() -> String {
        let patients: Vec<String> = (0..20)
            .map(|_| r#"{"age": 30, "gender": "M"}"#.to_string())
            .collect();
        format!("[{}]", patients.join(","))
    }

    #[test]
    fn test_screen_bare_array() {
        let verdict =
            screen_roster(&young_roster_json(), None, &BiasConfig::default()).unwrap();
        assert!(!verdict.passed);
        assert_eq!(verdict.bias_score, 90);
    }

    #[test]
    fn test_screen_full_request_with_trial_override() {
        let text = r#"{"trialId": "T7", "patientData": [{"age": 61, "gender": "F"}]}"#;
        let verdict =
            screen_roster(text, Some("T8".into()), &BiasConfig::default()).unwrap();
        assert!(verdict.passed);
        assert!(verdict.ml_token.unwrap().starts_with("ML_APPROVED_"));
    }

    #[test]
    fn test_screen_rejects_invalid_document() {
        let err = screen_roster("\"hello\"", None, &BiasConfig::default()).unwrap_err();
        assert!(err.to_string().contains("not a valid roster"));
    }

    #[test]
    fn test_screen_respects_config() {
        let mut config = BiasConfig::default();
        config.age.max_young_pct = 100.0;
        config.gender.max_male_pct = 100.0;
        let verdict = screen_roster(&young_roster_json(), None, &config).unwrap();
        assert!(verdict.passed, "{}", verdict.reason);
    }

    #[tokio::test]
    async fn test_check_exit_codes() {
        let dir = TempDir::new().unwrap();
        let rejected = dir.path().join("rejected.json");
        std::fs::write(&rejected, young_roster_json()).unwrap();
        let accepted = dir.path().join("accepted.json");
        std::fs::write(&accepted, "[]").unwrap();

        let code = handle_command(
            Commands::Check {
                file: rejected,
                trial_id: None,
            },
            dir.path(),
            None,
        )
        .await
        .unwrap();
        assert_eq!(code, ExitCode::from(REJECTED_EXIT));

        let code = handle_command(
            Commands::Check {
                file: accepted,
                trial_id: Some("T1".into()),
            },
            dir.path(),
            None,
        )
        .await
        .unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
    }

    #[tokio::test]
    async fn test_check_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = handle_command(
            Commands::Check {
                file: dir.path().join("missing.json"),
                trial_id: None,
            },
            dir.path(),
            None,
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_config_init_then_show() {
        let dir = TempDir::new().unwrap();
        let workspace = dir.path();

        let init = Commands::Config {
            action: ConfigAction::Init,
        };
        assert!(handle_command(init, workspace, None).await.is_ok());
        let written = std::fs::read_to_string(workspace_config_path(workspace)).unwrap();
        let restored: BiasConfig = toml::from_str(&written).unwrap();
        assert_eq!(restored, BiasConfig::default());

        let show = Commands::Config {
            action: ConfigAction::Show,
        };
        assert!(handle_command(show, workspace, None).await.is_ok());
    }

    #[tokio::test]
    async fn test_config_init_keeps_existing_file() {
        let dir = TempDir::new().unwrap();
        let workspace = dir.path();
        let path = workspace_config_path(workspace);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "[server]\nport = 7000\n").unwrap();

        let init = Commands::Config {
            action: ConfigAction::Init,
        };
        handle_command(init, workspace, None).await.unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "[server]\nport = 7000\n"
        );
    }
}
