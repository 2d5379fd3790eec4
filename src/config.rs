use serde::Deserialize;
use std::{fs, path::Path};

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default = "default_db_path")]
    pub db_path: String,
    #[serde(default = "default_documents_dir")]
    pub documents_dir: String,
}

fn default_db_path() -> String {
    "data/greasebook.db".to_string()
}

fn default_documents_dir() -> String {
    "data/documents".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            db_path: default_db_path(),
            documents_dir: default_documents_dir(),
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }
}
