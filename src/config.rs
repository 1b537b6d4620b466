//! Generator configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::parser::ParserOptions;
use crate::script::TargetScript;

/// Environment variable that overrides the configured seed.
pub const SEED_ENV: &str = "WORDTEST_SEED";

/// Top-level wordtest configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Fixed random seed. Unset means a fresh seed per run.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Script translations are written in.
    #[serde(default)]
    pub target_script: TargetScript,
    /// Minimum share of target-script letters in a translation cell.
    #[serde(default = "default_script_threshold")]
    pub script_threshold: f64,
    /// Appended to the input file stem to name the output.
    #[serde(default = "default_answer_suffix")]
    pub answer_suffix: String,
    /// Where generated documents go when no output path is given.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_script_threshold() -> f64 {
    0.3
}
fn default_answer_suffix() -> String {
    "_Answer".to_string()
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("generated")
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: None,
            target_script: TargetScript::default(),
            script_threshold: default_script_threshold(),
            answer_suffix: default_answer_suffix(),
            output_dir: default_output_dir(),
        }
    }
}

impl GeneratorConfig {
    pub fn parser_options(&self) -> ParserOptions {
        ParserOptions {
            target_script: self.target_script,
            script_threshold: self.script_threshold,
        }
    }

    /// Output file name for `input`: `<stem><suffix>.docx`.
    pub fn answer_file_name(&self, input: &Path) -> String {
        let stem = input
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .unwrap_or("wordlist");
        format!("{}{}.docx", stem, self.answer_suffix)
    }
}

/// Parse a configuration from TOML text.
pub fn parse_config_str(content: &str) -> Result<GeneratorConfig> {
    let config: GeneratorConfig = toml::from_str(content).context("invalid wordtest configuration")?;
    if !(0.0..=1.0).contains(&config.script_threshold) {
        anyhow::bail!(
            "script_threshold must be between 0 and 1, got {}",
            config.script_threshold
        );
    }
    Ok(config)
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. the explicit `path`, which must exist
/// 2. `wordtest.toml` in the current directory
/// 3. built-in defaults
///
/// `WORDTEST_SEED` overrides the seed from any source.
pub fn load_config_from(path: Option<&Path>) -> Result<GeneratorConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => Some(PathBuf::from("wordtest.toml")).filter(|p| p.exists()),
    };

    let mut config = match config_path {
        Some(p) => {
            let content = std::fs::read_to_string(&p)
                .with_context(|| format!("failed to read config {}", p.display()))?;
            parse_config_str(&content).with_context(|| format!("in {}", p.display()))?
        }
        None => GeneratorConfig::default(),
    };

    if let Ok(seed) = std::env::var(SEED_ENV) {
        config.seed = Some(
            seed.trim()
                .parse()
                .with_context(|| format!("{} is not a number: {}", SEED_ENV, seed))?,
        );
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    // Tests that read the process environment hold this lock.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn defaults_when_empty() {
        let config = parse_config_str("").unwrap();
        assert_eq!(config, GeneratorConfig::default());
        assert_eq!(config.script_threshold, 0.3);
        assert_eq!(config.target_script, TargetScript::Hangul);
    }

    #[test]
    fn parses_all_fields() {
        let config = parse_config_str(
            r#"
seed = 42
target_script = "kana"
script_threshold = 0.5
answer_suffix = "_Key"
output_dir = "out"
"#,
        )
        .unwrap();
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.target_script, TargetScript::Kana);
        assert_eq!(config.parser_options().script_threshold, 0.5);
        assert_eq!(config.answer_file_name(Path::new("in/week 3.docx")), "week 3_Key.docx");
        assert_eq!(config.output_dir, PathBuf::from("out"));
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        assert!(parse_config_str("script_threshold = 1.5").is_err());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        assert!(load_config_from(Some(Path::new("/nonexistent/wordtest.toml"))).is_err());
    }

    #[test]
    fn seed_env_overrides_config_file() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wordtest.toml");
        std::fs::write(&path, "seed = 1\nanswer_suffix = \"_Key\"\n").unwrap();

        std::env::set_var(SEED_ENV, " 1234 ");
        let config = load_config_from(Some(&path));
        std::env::set_var(SEED_ENV, "soon");
        let invalid = load_config_from(Some(&path));
        std::env::remove_var(SEED_ENV);

        let config = config.unwrap();
        assert_eq!(config.seed, Some(1234));
        assert_eq!(config.answer_suffix, "_Key");
        assert!(invalid.is_err());
        assert_eq!(load_config_from(Some(&path)).unwrap().seed, Some(1));
    }

    #[test]
    fn default_answer_file_name() {
        let config = GeneratorConfig::default();
        assert_eq!(config.answer_file_name(Path::new("uploads/lesson_words.docx")), "lesson_words_Answer.docx");
    }
}
