use include_dir::{include_dir, Dir};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::DataUnavailable;

static WORDS_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/words");

pub const BUNDLED_LIST: &str = "english_spanish.json";

/// One source word and its true translation.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct WordPair {
    #[serde(alias = "text_eng")]
    pub source_text: String,
    #[serde(alias = "text_spa")]
    pub target_text: String,
}

impl WordPair {
    pub fn new(source_text: impl Into<String>, target_text: impl Into<String>) -> Self {
        Self {
            source_text: source_text.into(),
            target_text: target_text.into(),
        }
    }
}

/// Where the word pairs come from
pub trait WordSource: Send {
    fn load(&self) -> Result<Vec<WordPair>, DataUnavailable>;
}

/// Word list compiled into the binary
#[derive(Debug, Clone)]
pub struct BundledWords {
    file_name: String,
}

impl BundledWords {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }
}

impl Default for BundledWords {
    fn default() -> Self {
        Self::new(BUNDLED_LIST)
    }
}

impl WordSource for BundledWords {
    fn load(&self) -> Result<Vec<WordPair>, DataUnavailable> {
        let file = WORDS_DIR
            .get_file(&self.file_name)
            .ok_or_else(|| DataUnavailable::MissingBundled(self.file_name.clone()))?;

        let contents = file
            .contents_utf8()
            .ok_or_else(|| DataUnavailable::NotUtf8(self.file_name.clone()))?;

        parse_pairs(contents)
    }
}

/// Word list read from a JSON file on disk
#[derive(Debug, Clone)]
pub struct JsonFileWords {
    path: PathBuf,
}

impl JsonFileWords {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl WordSource for JsonFileWords {
    fn load(&self) -> Result<Vec<WordPair>, DataUnavailable> {
        let contents = fs::read_to_string(&self.path).map_err(|source| DataUnavailable::Read {
            path: self.path.clone(),
            source,
        })?;
        parse_pairs(&contents)
    }
}

impl WordSource for Vec<WordPair> {
    fn load(&self) -> Result<Vec<WordPair>, DataUnavailable> {
        Ok(self.clone())
    }
}

pub fn parse_pairs(json: &str) -> Result<Vec<WordPair>, DataUnavailable> {
    Ok(serde_json::from_str(json)?)
}
