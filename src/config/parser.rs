use crate::config::types::SourcesFile;
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;

/// Loads and parses a sources file from the given path
///
/// Files ending in `.toml` are parsed as TOML; everything else as JSON.
///
/// # Arguments
///
/// * `path` - Path to the sources file
///
/// # Returns
///
/// * `Ok(SourcesFile)` - Successfully loaded and validated sources
/// * `Err(ConfigError)` - The file is missing, malformed, or invalid
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use grounds_events::config::load_sources;
///
/// let file = load_sources(Path::new("config/sources.json")).unwrap();
/// println!("Max retries: {}", file.scraper.max_retries);
/// ```
pub fn load_sources(path: &Path) -> Result<SourcesFile, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.display().to_string()));
    }

    let content = std::fs::read_to_string(path)?;
    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    let file = if is_toml {
        toml::from_str(&content)?
    } else {
        parse_sources(&content)?
    };

    validate(&file)?;

    tracing::debug!(
        "Loaded {} sources from {}",
        file.sources().len(),
        path.display()
    );

    Ok(file)
}

/// Parses a JSON sources document without validating it
pub fn parse_sources(content: &str) -> Result<SourcesFile, ConfigError> {
    Ok(serde_json::from_str(content)?)
}
