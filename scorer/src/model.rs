use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

pub type JobId = String;
pub type UserId = String;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SalaryRange {
    #[serde(default, deserialize_with = "null_as_default")]
    pub min: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub max: f64,
}

impl SalaryRange {
    pub fn new(min: f64, max: f64) -> Self { Self { min, max } }

    pub fn midpoint(&self) -> f64 { (self.min + self.max) / 2.0 }

    /// A range of `{0, 0}` carries no salary information.
    pub fn is_unset(&self) -> bool { self.min == 0.0 && self.max == 0.0 }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub city: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct JobStats {
    #[serde(default, deserialize_with = "null_as_default")]
    pub views: u64,
}

/// A job posting as fetched by the data-access layer. Every field other than
/// `id` may be absent and then contributes nothing to a score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPosting {
    #[serde(alias = "_id")]
    pub id: JobId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub skills: Vec<String>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default, rename = "type")]
    pub job_type: Option<String>,
    #[serde(default)]
    pub salary: Option<SalaryRange>,
    #[serde(default)]
    pub stats: Option<JobStats>,
}

impl JobPosting {
    pub fn city(&self) -> Option<&str> {
        self.location.as_ref().and_then(|l| l.city.as_deref())
    }

    pub fn views(&self) -> u64 { self.stats.map(|s| s.views).unwrap_or(0) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Reviewed,
    Shortlisted,
    Accepted,
    Rejected,
    #[serde(other)]
    Other,
}

impl Default for ApplicationStatus {
    fn default() -> Self { ApplicationStatus::Pending }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub jobseeker_id: UserId,
    pub job_id: JobId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: ApplicationStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionKind {
    View,
    Save,
    Apply,
    Like,
    Share,
    #[serde(other)]
    Other,
}

impl Default for InteractionKind {
    fn default() -> Self { InteractionKind::Other }
}

impl InteractionKind {
    /// Fixed weight of an interaction; caller-supplied weights are ignored.
    pub fn weight(self) -> u32 {
        match self {
            InteractionKind::View => 1,
            InteractionKind::Save => 3,
            InteractionKind::Apply => 5,
            InteractionKind::Like | InteractionKind::Share => 2,
            InteractionKind::Other => 1,
        }
    }
}

/// One user action on a job, optionally with the job document populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
    pub job_id: JobId,
    #[serde(default, rename = "type", deserialize_with = "null_as_default")]
    pub kind: InteractionKind,
    #[serde(default, serialize_with = "time::serde::rfc3339::option::serialize", deserialize_with = "lenient_timestamp")]
    pub timestamp: Option<OffsetDateTime>,
    /// Absent when the job was not populated (e.g. a bare id).
    #[serde(default, deserialize_with = "lenient_job")]
    pub job: Option<JobPosting>,
}

impl Interaction {
    pub fn new(job_id: impl Into<JobId>, kind: InteractionKind) -> Self {
        Self { job_id: job_id.into(), kind, timestamp: None, job: None }
    }

    pub fn with_job(mut self, job: JobPosting) -> Self {
        self.job = Some(job);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightedInteraction {
    pub job_id: JobId,
    #[serde(rename = "type")]
    pub kind: InteractionKind,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub timestamp: Option<OffsetDateTime>,
    pub weight: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: UserId,
    pub skills: BTreeSet<String>,
    pub locations: BTreeSet<String>,
    pub companies: BTreeSet<String>,
    pub job_types: BTreeSet<String>,
    pub salary_range: SalaryRange,
    pub interactions: Vec<WeightedInteraction>,
    /// Stemmed title keywords of interacted jobs. Only feeds reasons.
    #[serde(default)]
    pub title_terms: BTreeSet<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl UserProfile {
    pub fn empty(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
            skills: BTreeSet::new(),
            locations: BTreeSet::new(),
            companies: BTreeSet::new(),
            job_types: BTreeSet::new(),
            salary_range: SalaryRange::default(),
            interactions: Vec::new(),
            title_terms: BTreeSet::new(),
            updated_at: OffsetDateTime::now_utc(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecommendationMethod {
    #[serde(rename = "content-based")]
    ContentBased,
    #[serde(rename = "collaborative")]
    Collaborative,
    #[serde(rename = "popular")]
    Popular,
    #[serde(rename = "hybrid")]
    Hybrid,
}

impl RecommendationMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            RecommendationMethod::ContentBased => "content-based",
            RecommendationMethod::Collaborative => "collaborative",
            RecommendationMethod::Popular => "popular",
            RecommendationMethod::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for RecommendationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMethod(pub String);

impl fmt::Display for UnknownMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown recommendation method '{}'", self.0)
    }
}

impl std::error::Error for UnknownMethod {}

impl FromStr for RecommendationMethod {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "content-based" | "content" => Ok(RecommendationMethod::ContentBased),
            "collaborative" => Ok(RecommendationMethod::Collaborative),
            "popular" => Ok(RecommendationMethod::Popular),
            "hybrid" => Ok(RecommendationMethod::Hybrid),
            _ => Err(UnknownMethod(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub job_id: JobId,
    pub score: f64,
    pub method: RecommendationMethod,
    pub reasons: Vec<String>,
}

/// `null` deserializes to the field's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Text(String),
    Millis(i64),
    Other(IgnoredAny),
}

/// RFC 3339 text or epoch milliseconds; anything else is `None`.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<OffsetDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let parsed = match Option::<RawTimestamp>::deserialize(deserializer)? {
        Some(RawTimestamp::Text(text)) => OffsetDateTime::parse(&text, &Rfc3339).ok(),
        Some(RawTimestamp::Millis(ms)) => OffsetDateTime::from_unix_timestamp_nanos(ms as i128 * 1_000_000).ok(),
        Some(RawTimestamp::Other(_)) | None => None,
    };
    Ok(parsed)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawJob {
    Doc(Box<JobPosting>),
    Other(IgnoredAny),
}

fn lenient_job<'de, D>(deserializer: D) -> Result<Option<JobPosting>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<RawJob>::deserialize(deserializer)? {
        Some(RawJob::Doc(job)) => Some(*job),
        Some(RawJob::Other(_)) | None => None,
    })
}

/// Descending by score, ties broken by ascending job id.
pub(crate) fn rank(recs: &mut [Recommendation]) {
    recs.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.job_id.cmp(&b.job_id))
    });
}
