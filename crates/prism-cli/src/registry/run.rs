use std::fs::{OpenOptions, create_dir_all};
use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{RegistryError, RegistryResult};

/// Metadata captured at run start.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub model_id: String,
    pub config_path: PathBuf,
    pub values_path: PathBuf,
    pub strict: bool,
    pub run_dir: PathBuf,
}

/// JSON config written to each run directory.
#[derive(Debug, Serialize)]
pub struct RunConfig {
    pub run_id: String,
    pub started_at: String,
    pub model_id: String,
    pub config_path: String,
    pub values_path: String,
    pub strict: bool,
    pub git: GitInfo,
}

/// Git metadata for reproducibility.
#[derive(Debug, Serialize)]
pub struct GitInfo {
    pub commit: Option<String>,
    pub dirty: Option<bool>,
}

/// Paths for run artifacts.
#[derive(Debug, Clone)]
pub struct RunPaths {
    pub root: PathBuf,
    pub logs_path: PathBuf,
    pub ratings_path: PathBuf,
}

pub fn start_run(ctx: &RunContext) -> RegistryResult<RunPaths> {
    let timestamp = ctx.started_at.format("%Y-%m-%dT%H-%M-%SZ").to_string();
    let run_root = ctx
        .run_dir
        .join(format!("{timestamp}__run_{}", ctx.run_id));

    create_dir_all(&run_root)?;

    let config_path = run_root.join("config.json");
    let logs_path = run_root.join("logs.ndjson");
    let ratings_path = run_root.join("ratings.json");

    let config = RunConfig {
        run_id: ctx.run_id.clone(),
        started_at: ctx.started_at.to_rfc3339(),
        model_id: ctx.model_id.clone(),
        config_path: ctx.config_path.display().to_string(),
        values_path: ctx.values_path.display().to_string(),
        strict: ctx.strict,
        git: collect_git_info(),
    };

    write_json(&config_path, &config)?;

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&logs_path)?;

    Ok(RunPaths {
        root: run_root,
        logs_path,
        ratings_path,
    })
}

/// Write ratings into the run directory (when one is active) and to `out_path`.
pub fn write_ratings<T: Serialize>(
    paths: Option<&RunPaths>,
    ratings: &T,
    out_path: Option<&Path>,
) -> RegistryResult<()> {
    if let Some(paths) = paths {
        write_json(&paths.ratings_path, ratings)?;
    }

    if let Some(out_path) = out_path {
        if let Some(parent) = out_path.parent() {
            if !parent.as_os_str().is_empty() {
                create_dir_all(parent)?;
            }
        }
        write_json(out_path, ratings)?;
    }

    Ok(())
}

pub fn collect_git_info() -> GitInfo {
    let commit = Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .and_then(|output| {
            if output.status.success() {
                Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
            } else {
                None
            }
        })
        .filter(|value| !value.is_empty());

    let dirty = Command::new("git")
        .args(["status", "--porcelain"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| !output.stdout.is_empty());

    GitInfo { commit, dirty }
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> RegistryResult<()> {
    let file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(path)?;
    serde_json::to_writer_pretty(file, value).map_err(RegistryError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use uuid::Uuid;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("prism-run-{}", Uuid::new_v4()))
    }

    #[test]
    fn start_run_creates_artifacts() {
        let run_dir = scratch_dir();
        let ctx = RunContext {
            run_id: "abc".to_string(),
            started_at: DateTime::parse_from_rfc3339("2026-03-01T08:30:00Z")
                .expect("timestamp")
                .with_timezone(&Utc),
            model_id: "credit_pd".to_string(),
            config_path: PathBuf::from("configs/models/credit_pd.yaml"),
            values_path: PathBuf::from("values.json"),
            strict: true,
            run_dir: run_dir.clone(),
        };

        let paths = start_run(&ctx).expect("start run");
        assert_eq!(
            paths.root,
            run_dir.join("2026-03-01T08-30-00Z__run_abc")
        );
        assert!(paths.logs_path.exists());

        let config: Value = serde_json::from_str(
            &std::fs::read_to_string(paths.root.join("config.json")).expect("config.json"),
        )
        .expect("parse config.json");
        assert_eq!(config["model_id"], "credit_pd");
        assert_eq!(config["strict"], true);

        let out = run_dir.join("exports/ratings.json");
        write_ratings(Some(&paths), &json!({"final": "green"}), Some(&out)).expect("write");
        assert!(paths.ratings_path.exists());
        assert!(out.exists());

        std::fs::remove_dir_all(&run_dir).expect("cleanup");
    }
}
