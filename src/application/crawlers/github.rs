use super::base::CrawlerContext;
use crate::domain::documents::{ContentFields, NoSqlDocument, RepositoryDocument, UserDocument};
use crate::domain::ports::Crawler;
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::Path;
use tempfile::TempDir;

/// Clones a repository and stores every text file, keyed by relative path.
pub struct GithubCrawler {
    context: CrawlerContext,
    ignore: Vec<String>,
    git: String,
}

impl GithubCrawler {
    pub fn new(context: CrawlerContext) -> Self {
        let ignore = context.github_ignore.clone();
        Self {
            context,
            ignore,
            git: "git".to_string(),
        }
    }

    pub fn with_ignore(mut self, ignore: Vec<String>) -> Self {
        self.ignore = ignore;
        self
    }

    async fn clone_repository(&self, link: &str, target: &Path) -> Result<()> {
        let output = tokio::process::Command::new(&self.git)
            .arg("clone")
            .arg("--depth=1")
            .arg(link)
            .arg(target)
            .output()
            .await
            .map_err(|e| EtlError::CommandError {
                command: format!("{} clone", self.git),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(EtlError::CommandError {
                command: format!("{} clone {}", self.git, link),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(())
    }
}

/// Last path segment of a repository link.
pub fn repository_name(link: &str) -> Option<&str> {
    link.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty() && !name.contains(':'))
}

/// Reads every file under `root`.
///
/// Directories whose relative path starts with an ignore pattern and files
/// whose name ends with one are skipped. Invalid UTF-8 bytes are dropped and
/// space characters are stripped.
pub fn read_repository_tree(root: &Path, ignore: &[String]) -> Result<Map<String, Value>> {
    let mut tree = Map::new();
    walk(root, "", ignore, &mut tree)?;
    Ok(tree)
}

fn walk(dir: &Path, relative: &str, ignore: &[String], tree: &mut Map<String, Value>) -> Result<()> {
    if ignore.iter().any(|pattern| relative.starts_with(pattern.as_str())) {
        return Ok(());
    }

    let mut entries = std::fs::read_dir(dir)?.collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let name = entry.file_name().to_string_lossy().to_string();
        let file_type = entry.file_type()?;
        let path = if relative.is_empty() {
            name.clone()
        } else {
            format!("{}/{}", relative, name)
        };

        if file_type.is_dir() {
            walk(&entry.path(), &path, ignore, tree)?;
        } else if file_type.is_file() {
            if ignore.iter().any(|pattern| name.ends_with(pattern.as_str())) {
                continue;
            }
            let bytes = std::fs::read(entry.path())?;
            let content = bytes
                .utf8_chunks()
                .map(|chunk| chunk.valid())
                .collect::<String>()
                .replace(' ', "");
            tree.insert(path, Value::String(content));
        }
    }

    Ok(())
}

#[async_trait]
impl Crawler for GithubCrawler {
    fn name(&self) -> &'static str {
        "github"
    }

    async fn extract(&self, link: &str, user: &UserDocument) -> Result<()> {
        if self.context.already_stored::<RepositoryDocument>(link).await? {
            tracing::info!("Repository already exists in database: {}", link);
            return Ok(());
        }

        tracing::info!("Starting scrapping GitHub repository: {}", link);

        let repo_name = repository_name(link)
            .ok_or_else(|| EtlError::CrawlError {
                crawler: self.name().to_string(),
                link: link.to_string(),
                message: "cannot derive a repository name".to_string(),
            })?
            .to_string();

        // TempDir 在離開作用域時刪除，失敗路徑也一樣
        let workdir = TempDir::new()?;
        let repo_path = workdir.path().join(&repo_name);
        self.clone_repository(link, &repo_path).await?;

        let ignore = self.ignore.clone();
        let tree = tokio::task::spawn_blocking(move || read_repository_tree(&repo_path, &ignore))
            .await
            .map_err(|e| EtlError::ProcessingError {
                message: format!("reading repository tree panicked: {}", e),
            })??;

        tracing::debug!("Read {} file(s) from {}", tree.len(), repo_name);

        let repository =
            RepositoryDocument::new(ContentFields::new(tree, "github", user), repo_name, link);
        repository.save(self.context.store()).await?;

        tracing::info!("Finished scrapping GitHub repository: {}", link);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::Settings;
    use crate::domain::ports::{filter, DocumentStore, Filter};
    use crate::infrastructure::db::SurrealDocumentStore;
    use serde_json::json;
    use std::fs;
    use std::sync::Arc;

    fn default_ignore() -> Vec<String> {
        Settings::default().github_ignore
    }

    #[test]
    fn test_repository_name() {
        assert_eq!(repository_name("https://github.com/jane/llm-twin"), Some("llm-twin"));
        assert_eq!(repository_name("https://github.com/jane/llm-twin/"), Some("llm-twin"));
        assert_eq!(repository_name("https:"), None);
    }

    #[test]
    fn test_read_repository_tree_applies_ignore_rules() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();

        fs::create_dir_all(root.join(".git/objects")).unwrap();
        fs::write(root.join(".git/config"), "[core]").unwrap();
        fs::create_dir_all(root.join("src/nested")).unwrap();
        fs::write(root.join("src/main.rs"), "fn main() { run(); }").unwrap();
        fs::write(root.join("src/nested/lib.rs"), "pub mod a;").unwrap();
        fs::write(root.join("Cargo.toml"), "[package]").unwrap();
        fs::write(root.join("Cargo.lock"), "# lock").unwrap();
        fs::write(root.join("logo.png"), [0x89, 0x50, 0x4e, 0x47]).unwrap();
        fs::write(root.join("README.md"), "# LLM twin").unwrap();

        let tree = read_repository_tree(root, &default_ignore()).unwrap();

        let keys: Vec<&String> = tree.keys().collect();
        assert_eq!(keys, vec!["README.md", "src/main.rs", "src/nested/lib.rs"]);
        assert_eq!(tree["src/main.rs"], Value::String("fnmain(){run();}".to_string()));
        assert_eq!(tree["README.md"], Value::String("#LLMtwin".to_string()));
    }

    #[test]
    fn test_read_repository_tree_drops_invalid_utf8() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("data.bin"), [b'a', 0xff, b'b', 0xc3]).unwrap();

        let tree = read_repository_tree(dir.path(), &[]).unwrap();
        assert_eq!(tree["data.bin"], Value::String("ab".to_string()));
    }

    #[tokio::test]
    async fn test_failed_clone_is_an_error() {
        let store = Arc::new(SurrealDocumentStore::memory().await.unwrap());
        let context = CrawlerContext::new(store, &Settings::default()).unwrap();
        let mut crawler = GithubCrawler::new(context).with_ignore(vec![]);
        crawler.git = "llm-twin-no-such-git-binary".to_string();

        let result = crawler
            .extract("https://github.com/jane/llm-twin", &UserDocument::new("Jane", "Doe"))
            .await;
        assert!(matches!(result, Err(EtlError::CommandError { .. })));
    }

    /// 假的 git：在目標目錄建立幾個檔案，並記下目標路徑
    #[cfg(unix)]
    fn fake_git(dir: &Path) -> String {
        use std::os::unix::fs::PermissionsExt;

        let script = dir.join("git");
        let record = dir.join("target.txt");
        fs::write(
            &script,
            format!(
                "#!/bin/sh\nset -e\n\
                 mkdir -p \"$4/src\" \"$4/.git\"\n\
                 printf 'fn main() {{ run(); }}' > \"$4/src/main.rs\"\n\
                 printf '[core]' > \"$4/.git/config\"\n\
                 printf 'lock' > \"$4/Cargo.lock\"\n\
                 printf '%s' \"$4\" > \"{}\"\n",
                record.display()
            ),
        )
        .unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        script.to_string_lossy().to_string()
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_extract_stores_cloned_repository() {
        let bin = TempDir::new().unwrap();
        let store = Arc::new(SurrealDocumentStore::memory().await.unwrap());
        let context = CrawlerContext::new(store.clone(), &Settings::default()).unwrap();
        let mut crawler = GithubCrawler::new(context);
        crawler.git = fake_git(bin.path());
        let user = UserDocument::new("Jane", "Doe");
        let link = "https://github.com/jane/llm-twin";

        crawler.extract(link, &user).await.unwrap();

        let stored = store.find("repositories", &filter([("link", json!(link))])).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0]["name"], json!("llm-twin"));
        assert_eq!(stored[0]["platform"], json!("github"));
        assert_eq!(stored[0]["author_full_name"], json!("Jane Doe"));
        assert_eq!(stored[0]["content"], json!({"src/main.rs": "fnmain(){run();}"}));

        // clone 目錄在結束後已刪除
        let target = fs::read_to_string(bin.path().join("target.txt")).unwrap();
        assert!(target.ends_with("llm-twin"));
        assert!(!Path::new(&target).exists());
        assert!(!Path::new(&target).parent().unwrap().exists());
    }

    #[tokio::test]
    async fn test_extract_skips_stored_repository() {
        let store = Arc::new(SurrealDocumentStore::memory().await.unwrap());
        let context = CrawlerContext::new(store.clone(), &Settings::default()).unwrap();
        let mut crawler = GithubCrawler::new(context);
        // 若真的去 clone 就會失敗
        crawler.git = "llm-twin-no-such-git-binary".to_string();
        let user = UserDocument::new("Jane", "Doe");
        let link = "https://github.com/jane/llm-twin";

        RepositoryDocument::new(ContentFields::new(Map::new(), "github", &user), "llm-twin", link)
            .save(store.as_ref())
            .await
            .unwrap();

        crawler.extract(link, &user).await.unwrap();

        let stored = store.find("repositories", &Filter::new()).await.unwrap();
        assert_eq!(stored.len(), 1);
    }
}
