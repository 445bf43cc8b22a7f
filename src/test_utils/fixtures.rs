use std::path::PathBuf;

use tempfile::TempDir;

use crate::search::types::Document;

/// Isolated data root for tests that touch the filesystem.
pub struct UnitTestFixture {
    pub temp_dir: TempDir,
    pub data_path: PathBuf,
}

impl Default for UnitTestFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl UnitTestFixture {
    #[must_use]
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let data_path = temp_dir.path().to_path_buf();
        println!("[FIXTURE] Created temp directory: {data_path:?}");
        Self {
            temp_dir,
            data_path,
        }
    }

    /// Create a file relative to the data root.
    #[must_use]
    pub fn create_file(&self, relative_path: &str, content: &str) -> PathBuf {
        let full_path = self.data_path.join(relative_path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        std::fs::write(&full_path, content).expect("Failed to write file");
        full_path
    }

    /// Write `config.toml` at the data root.
    #[must_use]
    pub fn create_config(&self, toml: &str) -> PathBuf {
        self.create_file("config.toml", toml)
    }

    /// Write a `word count` frequency dictionary.
    #[must_use]
    pub fn create_dictionary(&self, words: &[(&str, u64)]) -> PathBuf {
        let body: String = words
            .iter()
            .map(|(word, count)| format!("{word} {count}\n"))
            .collect();
        self.create_file("dictionary.txt", &body)
    }

    /// Write a titles file, one per line.
    #[must_use]
    pub fn create_titles(&self, titles: &[&str]) -> PathBuf {
        self.create_file("titles.txt", &titles.join("\n"))
    }

    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.data_path.join("feedback.db")
    }
}

/// A small article set shared by engine tests.
#[must_use]
pub fn sample_articles() -> Vec<Document> {
    vec![
        Document::new("101", 9.2)
            .with_title("Senate passes healthcare policy overhaul")
            .with_excerpt("The bill reshapes insurance markets.")
            .with_published_at("2017-07-28")
            .with_tags(["politics", "health"]),
        Document::new("102", 7.4)
            .with_title("Hospitals brace for policy changes")
            .with_published_at("2017-08-02"),
        Document::new("103", 6.1)
            .with_title("Climate talks stall")
            .with_published_at("2016-11-15"),
        Document::new("104", 5.0).with_title("Untitled wire copy"),
        Document::new("105", 4.4)
            .with_title("Insurers weigh healthcare exits")
            .with_published_at("2017-06-30"),
    ]
}

impl Drop for UnitTestFixture {
    fn drop(&mut self) {
        println!("[FIXTURE] Cleaning up temp directory: {:?}", self.data_path);
    }
}
