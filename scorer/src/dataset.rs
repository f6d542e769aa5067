use crate::model::{Application, Interaction, JobPosting, UserId};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Interaction as stored in dataset files, tagged with its user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInteraction {
    pub user_id: UserId,
    #[serde(flatten)]
    pub interaction: Interaction,
}

/// Materialized collections the recommender scores against.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub jobs: Vec<JobPosting>,
    pub applications: Vec<Application>,
    pub interactions: Vec<UserInteraction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Collection { Jobs, Applications, Interactions }

impl Collection {
    fn for_path(path: &Path) -> Option<Self> {
        let stem = path.file_stem()?.to_str()?.to_ascii_lowercase();
        if stem.starts_with("jobs") {
            Some(Collection::Jobs)
        } else if stem.starts_with("applications") {
            Some(Collection::Applications)
        } else if stem.starts_with("interactions") {
            Some(Collection::Interactions)
        } else {
            None
        }
    }
}

impl Dataset {
    /// Load every `jobs*`, `applications*` and `interactions*` JSON/JSONL file
    /// under `root`, in path order.
    pub fn load<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref();
        let mut files: Vec<PathBuf> = Vec::new();
        if root.is_dir() {
            for entry in WalkDir::new(root).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
                let p = entry.path();
                if p.is_file() && matches!(p.extension().and_then(|s| s.to_str()), Some("json" | "jsonl")) {
                    files.push(p.to_path_buf());
                }
            }
        } else if root.is_file() {
            files.push(root.to_path_buf());
        } else {
            anyhow::bail!("dataset path {} does not exist", root.display());
        }

        let mut dataset = Dataset::default();
        for file in files {
            let Some(collection) = Collection::for_path(&file) else {
                tracing::debug!(file = %file.display(), "skipping unrecognized dataset file");
                continue;
            };
            match collection {
                Collection::Jobs => dataset.jobs.extend(read_records(&file)?),
                Collection::Applications => dataset.applications.extend(read_records(&file)?),
                Collection::Interactions => dataset.interactions.extend(read_records(&file)?),
            }
        }
        tracing::info!(
            jobs = dataset.jobs.len(),
            applications = dataset.applications.len(),
            interactions = dataset.interactions.len(),
            "dataset loaded"
        );
        Ok(dataset)
    }

    /// Interactions grouped per user, file order kept within a user.
    pub fn interactions_by_user(&self) -> BTreeMap<&str, Vec<Interaction>> {
        let mut grouped: BTreeMap<&str, Vec<Interaction>> = BTreeMap::new();
        for ui in &self.interactions {
            grouped.entry(ui.user_id.as_str()).or_default().push(ui.interaction.clone());
        }
        grouped
    }

    /// Attach the job document to interactions that only carry a job id.
    pub fn populate_jobs(&self, interactions: &mut [Interaction]) {
        let mut by_id: HashMap<&str, &JobPosting> = HashMap::with_capacity(self.jobs.len());
        for job in &self.jobs {
            by_id.entry(job.id.as_str()).or_insert(job);
        }
        for interaction in interactions.iter_mut().filter(|i| i.job.is_none()) {
            interaction.job = by_id.get(interaction.job_id.as_str()).map(|j| (*j).clone());
        }
    }
}

/// Read a JSONL file, a JSON array, or a single JSON object.
pub fn read_records<T: DeserializeOwned>(file: &Path) -> Result<Vec<T>> {
    let f = File::open(file).with_context(|| format!("opening {}", file.display()))?;
    let reader = BufReader::new(f);
    if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
        let mut out = Vec::new();
        for (lineno, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() { continue; }
            let rec = serde_json::from_str(&line)
                .with_context(|| format!("{}:{}: malformed record", file.display(), lineno + 1))?;
            out.push(rec);
        }
        return Ok(out);
    }
    let json: serde_json::Value =
        serde_json::from_reader(reader).with_context(|| format!("parsing {}", file.display()))?;
    let records = match json {
        serde_json::Value::Array(arr) => arr
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<T>, _>>()?,
        obj @ serde_json::Value::Object(_) => vec![serde_json::from_value(obj)?],
        _ => Vec::new(),
    };
    Ok(records)
}
