//! `.env` discovery
//!
//! Loads the first env file found among the working directory, its two
//! parents and the per-user locations. Variables already set in the shell
//! are never overwritten.

use std::path::{Path, PathBuf};

use agent_runtime::EnvLookup;

/// Variables that indicate some provider credentials are present
pub const KEY_VARS: [&str; 6] = [
    "OPENAI_API_KEY",
    "GEMINI_API_KEY",
    "ANTHROPIC_API_KEY",
    "AWS_ACCESS_KEY_ID",
    "AWS_SECRET_ACCESS_KEY",
    "AWS_REGION",
];

pub const MISSING_KEYS_GUIDANCE: &str = "\
No API keys found. You can set them in one of these ways:

1. Create a .env file in the current directory
2. Create ~/.env.ai-agent in your home directory
3. Export them in your shell:
   export OPENAI_API_KEY=your-key-here

Run 'ai list-providers' to see which keys are needed.";

/// Search order for env files
pub fn candidate_paths(cwd: &Path, home: Option<&Path>) -> Vec<PathBuf> {
    let mut paths = vec![
        cwd.join(".env"),
        cwd.join("..").join(".env"),
        cwd.join("..").join("..").join(".env"),
    ];
    if let Some(home) = home {
        paths.push(home.join(".env.ai-agent"));
        paths.push(home.join(".config").join("ai-agent").join(".env"));
    }
    paths
}

/// Load the first existing candidate; returns the path that was loaded
pub fn load_environment(cwd: &Path, home: Option<&Path>) -> Option<PathBuf> {
    for path in candidate_paths(cwd, home) {
        if !path.is_file() {
            continue;
        }
        match dotenvy::from_path(&path) {
            Ok(()) => {
                tracing::info!(path = %path.display(), "Loaded environment");
                return Some(path);
            }
            Err(err) => tracing::warn!(path = %path.display(), error = %err, "Skipping unreadable env file"),
        }
    }
    None
}

/// Whether any known credential variable is set
pub fn has_any_key(env: EnvLookup<'_>) -> bool {
    KEY_VARS.iter().any(|key| env(key).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_order() {
        let paths = candidate_paths(Path::new("/work/project"), Some(Path::new("/home/me")));
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/work/project/.env"),
                PathBuf::from("/work/project/../.env"),
                PathBuf::from("/work/project/../../.env"),
                PathBuf::from("/home/me/.env.ai-agent"),
                PathBuf::from("/home/me/.config/ai-agent/.env"),
            ]
        );
        assert_eq!(candidate_paths(Path::new("/w"), None).len(), 3);
    }

    #[test]
    fn test_nothing_to_load() {
        let dir = tempfile::tempdir().unwrap();
        let cwd = dir.path().join("a").join("b");
        std::fs::create_dir_all(&cwd).unwrap();
        assert_eq!(load_environment(&cwd, Some(&dir.path().join("home"))), None);
    }

    #[test]
    fn test_has_any_key() {
        let none = |_: &str| -> Option<String> { None };
        assert!(!has_any_key(&none));

        let region = |key: &str| (key == "AWS_REGION").then(|| "us-east-1".to_string());
        assert!(has_any_key(&region));
    }
}
