//! The modelgrant CLI application.
//!
//! Each resource command loads the stored state and the controller snapshot,
//! runs exactly one resource handler, and writes both back only if the
//! handler succeeded.

use std::path::Path;
use std::sync::Arc;

use modelgrant_core::{Error, InMemoryController, Result};
use modelgrant_resource::{AccessModelConfig, AccessModelResource, AccessModelState};
use tracing_subscriber::EnvFilter;

use crate::cli::{CliArgs, Command};
use crate::config::ModelgrantConfig;
use crate::config_handlers;
use crate::store;

/// CLI application bound to a loaded configuration.
pub struct ModelgrantCli {
    name: String,
    config: ModelgrantConfig,
    version: String,
}

impl ModelgrantCli {
    /// Create from CLI args, loading config from file/env.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the configuration cannot be loaded.
    pub fn from_args(name: impl Into<String>, args: &CliArgs) -> Result<Self> {
        let config = ModelgrantConfig::load(args.config.as_deref())?;
        Ok(Self::new(name, config))
    }

    /// Create a new CLI application.
    pub fn new(name: impl Into<String>, config: ModelgrantConfig) -> Self {
        Self {
            name: name.into(),
            config,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// The loaded configuration.
    pub fn config(&self) -> &ModelgrantConfig {
        &self.config
    }

    /// Initialise tracing-based logging.
    ///
    /// Uses `RUST_LOG` env var if set, otherwise defaults based on verbosity flags.
    pub fn init_logging(&self, verbose: bool, quiet: bool) {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else if quiet {
            EnvFilter::new("warn")
        } else if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        };

        // A subscriber may already be installed (e.g. in tests).
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    }

    /// Run the CLI with the given arguments.
    ///
    /// # Errors
    ///
    /// Returns the first error from loading files or running the handler.
    pub async fn run(&self, args: CliArgs) -> Result<()> {
        self.init_logging(args.verbose, args.quiet);

        let Some(command) = args.command else {
            println!("{} {}: use --help for usage", self.name, self.version);
            return Ok(());
        };

        match command {
            Command::Schema => print_json(&modelgrant_resource::access_model_schema()),
            Command::Config(config_cmd) => {
                config_handlers::handle_config_command(args.config.as_deref(), config_cmd.command)
            }
            command => {
                if let Some(state) = self.execute(command).await? {
                    print_json(&state)?;
                }
                Ok(())
            }
        }
    }

    /// Runs one resource command and persists the result.
    ///
    /// Returns the state to display, `None` when the resource was deleted.
    async fn execute(&self, command: Command) -> Result<Option<AccessModelState>> {
        let state_path = self.config.state_path()?;
        let controller = store::load_controller(&self.config).await?;
        let resource = AccessModelResource::new(Arc::new(controller.clone()));
        let prior = store::load_state(&state_path)?;

        let next = match command {
            Command::Plan { file } => {
                let planned = load_desired(&file)?;
                let action = resource.plan(prior.as_ref(), &planned);
                println!("{}", serde_json::to_string(&action)?);
                return Ok(None);
            }
            Command::Create { file } => {
                if let Some(existing) = &prior {
                    return Err(Error::state(format!(
                        "access model {} already exists; use update or delete",
                        existing.require_id()?
                    )));
                }
                resource.create(&load_desired(&file)?).await?
            }
            Command::Read => resource.read(require(prior.as_ref())?).await?,
            Command::Update { file } => {
                resource
                    .update(require(prior.as_ref())?, &load_desired(&file)?)
                    .await?
            }
            Command::Delete => resource.delete(require(prior.as_ref())?).await?,
            Command::Import { id } => {
                if prior.is_some() {
                    return Err(Error::state(
                        "state already holds an access model; delete it before importing",
                    ));
                }
                let seed = resource.import_state(&id)?;
                resource.read(&seed).await?
            }
            Command::Schema | Command::Config(_) => {
                return Err(Error::state("not a resource command"));
            }
        };

        self.persist(&state_path, &next, &controller).await?;
        Ok(next.exists().then_some(next))
    }

    async fn persist(
        &self,
        state_path: &Path,
        state: &AccessModelState,
        controller: &InMemoryController,
    ) -> Result<()> {
        store::save_controller(&self.config, controller).await?;
        store::save_state(state_path, Some(state))?;
        tracing::debug!("state written to {}", state_path.display());
        Ok(())
    }
}

fn require(prior: Option<&AccessModelState>) -> Result<&AccessModelState> {
    prior.ok_or_else(|| Error::state("no access model in state; run create or import first"))
}

fn load_desired(path: &str) -> Result<AccessModelConfig> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| Error::invalid_config(format!("Failed to parse {path}: {e}")))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    fn app(dir: &TempDir) -> ModelgrantCli {
        let config: ModelgrantConfig = toml::from_str(&format!(
            r#"
            base_path = "{}"
            [controller]
            models = ["model1", "model2"]
            "#,
            dir.path().display()
        ))
        .unwrap();
        ModelgrantCli::new("modelgrant", config)
    }

    fn desired(dir: &TempDir, name: &str, body: &str) -> String {
        let path = dir.path().join(name);
        std::fs::write(&path, body).unwrap();
        path.to_string_lossy().into_owned()
    }

    fn args(argv: &[&str]) -> Command {
        let mut full = vec!["modelgrant"];
        full.extend_from_slice(argv);
        CliArgs::try_parse_from(full).unwrap().command.unwrap()
    }

    #[tokio::test]
    async fn test_create_read_update_delete() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir);
        let v1 = desired(
            &dir,
            "v1.toml",
            r#"model = "model1"
access = "read"
users = ["alice", "bob"]"#,
        );
        let v2 = desired(
            &dir,
            "v2.toml",
            r#"model = "model1"
access = "write"
users = ["bob"]"#,
        );

        let created = app.execute(args(&["create", "-f", &v1])).await.unwrap().unwrap();
        assert_eq!(created.require_id().unwrap().to_string(), "model1:read");

        let read = app.execute(args(&["read"])).await.unwrap().unwrap();
        assert_eq!(read.users, vec!["alice", "bob"]);

        let updated = app.execute(args(&["update", "-f", &v2])).await.unwrap().unwrap();
        assert_eq!(updated.require_id().unwrap().to_string(), "model1:write");
        assert_eq!(updated.users, vec!["bob"]);

        let deleted = app.execute(args(&["delete"])).await.unwrap();
        assert!(deleted.is_none());
        assert!(
            store::load_state(app.config().state_path().unwrap())
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_create_twice_is_rejected() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir);
        let v1 = desired(&dir, "v1.toml", "model = \"model1\"\naccess = \"read\"\nusers = []");

        app.execute(args(&["create", "-f", &v1])).await.unwrap();
        let err = app.execute(args(&["create", "-f", &v1])).await.unwrap_err();
        assert!(matches!(err, Error::State(_)));
    }

    #[tokio::test]
    async fn test_read_without_state() {
        let dir = TempDir::new().unwrap();
        let err = app(&dir).execute(args(&["read"])).await.unwrap_err();
        assert!(err.to_string().contains("run create or import first"));
    }

    #[tokio::test]
    async fn test_failed_create_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir);
        let bad = desired(&dir, "bad.toml", "model = \"missing\"\naccess = \"read\"\nusers = [\"alice\"]");

        let err = app.execute(args(&["create", "-f", &bad])).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert!(!app.config().state_path().unwrap().exists());
    }

    #[tokio::test]
    async fn test_import_existing_grant() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir);
        let v1 = desired(&dir, "v1.toml", "model = \"model2\"\naccess = \"admin\"\nusers = [\"carol\"]");

        // Grant through one state file, then adopt it from a fresh one.
        app.execute(args(&["create", "-f", &v1])).await.unwrap();
        std::fs::remove_file(app.config().state_path().unwrap()).unwrap();

        let imported = app
            .execute(args(&["import", "model2:admin"]))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(imported.users, vec!["carol"]);
    }

    #[tokio::test]
    async fn test_plan_does_not_write_state() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir);
        let v1 = desired(&dir, "v1.toml", "model = \"model1\"\naccess = \"read\"\nusers = []");

        assert!(app.execute(args(&["plan", "-f", &v1])).await.unwrap().is_none());
        assert!(!app.config().state_path().unwrap().exists());
    }

    #[test]
    fn test_load_desired_rejects_bad_toml() {
        let dir = TempDir::new().unwrap();
        let path = desired(&dir, "bad.toml", "model = ");
        assert!(matches!(
            load_desired(&path),
            Err(Error::InvalidConfig(_))
        ));
    }
}
