use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const CONFIG: &str = r#"[llm]
api_url = "https://api.groq.com/openai/v1/chat/completions"
model = ""
temperature = 0.2

[output]
directory = "."
"#;

pub const DEFAULT_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

pub const ENV_API_KEY: &str = "GROQ_API_KEY";
pub const ENV_MODEL: &str = "MODEL";
pub const ENV_API_URL: &str = "GROQ_API_URL";

#[derive(Deserialize, Debug, Default)]
struct RawLlm {
    api_url: Option<String>,
    model: Option<String>,
    temperature: Option<f32>,
}

#[derive(Deserialize, Debug, Default)]
struct RawOutput {
    directory: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
struct RawConfig {
    llm: Option<RawLlm>,
    output: Option<RawOutput>,
}

#[derive(Clone, Debug)]
pub struct LlmConfig {
    pub api_url: String,
    pub model: String,
    pub api_key: String,
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        LlmConfig {
            api_url: DEFAULT_API_URL.to_string(),
            model: String::new(),
            api_key: String::new(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Output {
    /// Where the generated tree is created; `None` means the working directory.
    pub directory: Option<PathBuf>,
}

#[derive(Clone, Debug, Default)]
pub struct Config {
    pub llm: LlmConfig,
    pub output: Output,
    pub debug: bool,
}

#[derive(Parser, Clone, Debug)]
#[command(about = "Generate a project's file and folder layout from a description")]
pub struct Args {
    #[arg(help = "Command to execute (use 'init' to create config) or project description")]
    pub command_or_description: Option<String>,

    #[arg(short = 'o', long, help = "Output directory for the generated structure")]
    pub output: Option<String>,

    #[arg(long, help = "Model name, overrides config and MODEL")]
    pub model: Option<String>,

    #[arg(long, help = "Enable debug logging")]
    pub debug: bool,

    #[arg(
        short = 'c',
        long,
        default_value = "sprout.toml",
        help = "Config file path"
    )]
    pub config: String,
}

impl Args {
    /// True when the positional argument is the `init` command.
    pub fn is_init(&self) -> bool {
        self.command_or_description.as_deref() == Some("init")
    }

    /// The initial project description, unless the positional is a command.
    pub fn description(&self) -> Option<&str> {
        match self.command_or_description.as_deref() {
            Some("init") | None => None,
            Some(d) => Some(d),
        }
    }
}

impl Config {
    /// Defaults, then the config file, then `.env`/environment, then CLI flags.
    pub fn new(config_path: &str, args: &Args) -> Self {
        if let Err(e) = dotenvy::dotenv() {
            debug!("no .env file loaded: {}", e);
        }
        let mut config = Self::load_config(config_path);
        config.apply_env(|key| std::env::var(key).ok());
        config.apply_args(args);
        config
    }

    /// Parse config file contents over the defaults.
    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        let raw: RawConfig = toml::from_str(contents)?;
        let default_config = Self::default();
        let loaded_llm = raw.llm.unwrap_or_default();
        let loaded_output = raw.output.unwrap_or_default();

        Ok(Config {
            llm: LlmConfig {
                api_url: loaded_llm.api_url.unwrap_or(default_config.llm.api_url),
                model: loaded_llm.model.unwrap_or(default_config.llm.model),
                api_key: default_config.llm.api_key,
                temperature: loaded_llm
                    .temperature
                    .unwrap_or(default_config.llm.temperature),
            },
            output: Output {
                directory: loaded_output
                    .directory
                    .map(PathBuf::from)
                    .or(default_config.output.directory),
            },
            debug: default_config.debug,
        })
    }

    fn load_config(config_path: &str) -> Self {
        if !Path::new(config_path).exists() {
            return Self::default();
        }

        let contents = match fs::read_to_string(config_path) {
            Ok(c) => c,
            Err(e) => {
                warn!("Cannot read config {}: {}. Using defaults.", config_path, e);
                return Self::default();
            }
        };

        match Self::from_toml(&contents) {
            Ok(c) => c,
            Err(e) => {
                warn!("Cannot parse config {}: {}. Using defaults.", config_path, e);
                Self::default()
            }
        }
    }

    /// Overlay credentials and endpoint settings from environment variables.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(key) = non_empty(ENV_API_KEY) {
            self.llm.api_key = key;
        }
        if let Some(model) = non_empty(ENV_MODEL) {
            self.llm.model = model;
        }
        if let Some(url) = non_empty(ENV_API_URL) {
            self.llm.api_url = url;
        }
    }

    pub fn apply_args(&mut self, args: &Args) {
        if let Some(o) = &args.output {
            self.output.directory = Some(PathBuf::from(o));
        }
        if let Some(m) = &args.model {
            self.llm.model = m.clone();
        }
        if args.debug {
            self.debug = true;
        }
    }

    pub fn create_config(config_path: &str) -> io::Result<()> {
        fs::write(config_path, CONFIG)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn args(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn defaults_without_file() {
        let config = Config::load_config("definitely/not/here.toml");
        assert_eq!(config.llm.api_url, DEFAULT_API_URL);
        assert_eq!(config.llm.temperature, DEFAULT_TEMPERATURE);
        assert!(config.output.directory.is_none());
    }

    #[test]
    fn file_values_override_defaults() {
        let config = Config::from_toml(
            "[llm]\nmodel = \"llama\"\ntemperature = 0.5\n[output]\ndirectory = \"out\"\n",
        )
        .unwrap();
        assert_eq!(config.llm.model, "llama");
        assert_eq!(config.llm.temperature, 0.5);
        assert_eq!(config.llm.api_url, DEFAULT_API_URL);
        assert_eq!(config.output.directory, Some(PathBuf::from("out")));
    }

    #[test]
    fn starter_config_parses() {
        let config = Config::from_toml(CONFIG).unwrap();
        assert_eq!(config.output.directory, Some(PathBuf::from(".")));
    }

    #[test]
    fn invalid_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sprout.toml");
        fs::write(&path, "[llm\nmodel = ").unwrap();
        let config = Config::load_config(path.to_str().unwrap());
        assert_eq!(config.llm.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn create_config_writes_starter_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sprout.toml");
        Config::create_config(path.to_str().unwrap()).unwrap();
        let config = Config::load_config(path.to_str().unwrap());
        assert_eq!(config.llm.temperature, DEFAULT_TEMPERATURE);
    }

    #[test]
    fn env_overrides_file_and_ignores_blank_values() {
        let env: HashMap<&str, &str> = [
            (ENV_API_KEY, "secret"),
            (ENV_MODEL, "  "),
            (ENV_API_URL, "http://localhost/v1"),
        ]
        .into_iter()
        .collect();
        let mut config = Config::from_toml("[llm]\nmodel = \"llama\"\n").unwrap();
        config.apply_env(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.llm.api_key, "secret");
        assert_eq!(config.llm.model, "llama");
        assert_eq!(config.llm.api_url, "http://localhost/v1");
    }

    #[test]
    fn args_override_everything() {
        let mut config = Config::default();
        config.apply_args(&args(&["sprout", "a blog", "-o", "out", "--model", "m", "--debug"]));
        assert_eq!(config.output.directory, Some(PathBuf::from("out")));
        assert_eq!(config.llm.model, "m");
        assert!(config.debug);
    }

    #[test]
    fn init_is_a_command_not_a_description() {
        let init = args(&["sprout", "init"]);
        assert!(init.is_init());
        assert_eq!(init.description(), None);

        let described = args(&["sprout", "a todo app in rust"]);
        assert!(!described.is_init());
        assert_eq!(described.description(), Some("a todo app in rust"));
        assert_eq!(described.config, "sprout.toml");
    }
}
