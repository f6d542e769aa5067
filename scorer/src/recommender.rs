use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::config::{RecommenderConfig, ScoringConfig};
use crate::explain::explanation_for;
use crate::lexicon::{normalize_basic, Lexicon, LexiconConfig};
use crate::model::{
    rank, Application, ApplicationStatus, Interaction, JobPosting, Recommendation, RecommendationMethod, UserProfile,
    WeightedInteraction,
};
use crate::similarity::{jaccard, salary_match, skill_overlap};
use crate::store::ProfileStore;

/// Outcome of [`Recommender::initialize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    /// Content scoring unavailable; content-based requests serve popular jobs.
    Degraded { reason: String },
}

impl Readiness {
    pub fn is_ready(&self) -> bool { matches!(self, Readiness::Ready) }
}

pub struct Recommender {
    scoring: ScoringConfig,
    lexicon_config: LexiconConfig,
    lexicon: Option<Lexicon>,
    store: Arc<dyn ProfileStore>,
}

impl Recommender {
    pub fn new(config: RecommenderConfig) -> Self {
        let store = config.store.build();
        Self::with_store(config, store)
    }

    pub fn with_store(config: RecommenderConfig, store: Arc<dyn ProfileStore>) -> Self {
        Self { scoring: config.scoring, lexicon_config: config.lexicon, lexicon: None, store }
    }

    /// Prepare the lexical helper. Failure leaves the recommender usable in
    /// degraded mode and is never fatal.
    pub fn initialize(&mut self) -> Readiness {
        match Lexicon::new(&self.lexicon_config) {
            Ok(lexicon) => {
                self.lexicon = Some(lexicon);
                info!("recommender initialized");
                Readiness::Ready
            }
            Err(e) => {
                self.lexicon = None;
                warn!(error = %format!("{e:#}"), "lexicon initialization failed; serving popular jobs for content requests");
                Readiness::Degraded { reason: format!("{e:#}") }
            }
        }
    }

    pub fn is_ready(&self) -> bool { self.lexicon.is_some() }

    pub fn scoring(&self) -> &ScoringConfig { &self.scoring }

    pub fn store(&self) -> &dyn ProfileStore { self.store.as_ref() }

    pub fn profile(&self, user_id: &str) -> Option<Arc<UserProfile>> { self.store.get(user_id) }

    /// Rebuild the profile for `user_id` from `interactions`, replacing any
    /// stored profile.
    pub fn update_user_profile(&self, user_id: &str, interactions: &[Interaction]) -> Arc<UserProfile> {
        let mut profile = UserProfile::empty(user_id);
        for interaction in interactions {
            profile.interactions.push(WeightedInteraction {
                job_id: interaction.job_id.clone(),
                kind: interaction.kind,
                timestamp: interaction.timestamp,
                weight: interaction.kind.weight(),
            });
            let Some(job) = &interaction.job else { continue };

            for skill in &job.skills {
                insert_non_empty(&mut profile.skills, normalize_basic(skill));
            }
            if let Some(city) = job.city() {
                insert_non_empty(&mut profile.locations, normalize_basic(city));
            }
            if let Some(company) = &job.company {
                insert_non_empty(&mut profile.companies, normalize_basic(company));
            }
            if let Some(job_type) = &job.job_type {
                insert_non_empty(&mut profile.job_types, normalize_basic(job_type));
            }
            if let Some(salary) = &job.salary {
                profile.salary_range.min = profile.salary_range.min.max(salary.min);
                profile.salary_range.max = profile.salary_range.max.max(salary.max);
            }
            if let (Some(lex), Some(title)) = (&self.lexicon, &job.title) {
                profile.title_terms.extend(lex.keywords(title));
            }
        }
        profile.updated_at = OffsetDateTime::now_utc();
        debug!(user_id, interactions = interactions.len(), skills = profile.skills.len(), "profile rebuilt");
        self.store.put(profile)
    }

    /// Jobs by view count, most viewed first. Scores are views relative to
    /// the most viewed candidate.
    pub fn get_popular_jobs(&self, jobs: &[JobPosting], limit: usize) -> Vec<Recommendation> {
        let jobs = unique_jobs(jobs);
        let max_views = jobs.iter().map(|j| j.views()).max().unwrap_or(0);
        let mut ordered = jobs;
        ordered.sort_by(|a, b| b.views().cmp(&a.views()).then_with(|| a.id.cmp(&b.id)));
        ordered
            .into_iter()
            .take(limit)
            .map(|job| {
                let views = job.views();
                let score = if max_views == 0 { 0.0 } else { views as f64 / max_views as f64 };
                Recommendation {
                    job_id: job.id.clone(),
                    score,
                    method: RecommendationMethod::Popular,
                    reasons: vec![format!("Popular with {views} views")],
                }
            })
            .collect()
    }

    pub fn get_content_based_recommendations(&self, user_id: &str, jobs: &[JobPosting], limit: usize) -> Vec<Recommendation> {
        let Some(lexicon) = &self.lexicon else {
            debug!(user_id, "recommender not ready; falling back to popular jobs");
            return self.get_popular_jobs(jobs, limit);
        };
        let Some(profile) = self.store.get(user_id) else {
            debug!(user_id, "no profile; falling back to popular jobs");
            return self.get_popular_jobs(jobs, limit);
        };

        let mut recs: Vec<Recommendation> = unique_jobs(jobs)
            .into_iter()
            .map(|job| self.score_content(&profile, lexicon, job))
            .collect();
        rank(&mut recs);
        recs.truncate(limit);
        debug!(user_id, candidates = jobs.len(), returned = recs.len(), "content-based ranking");
        recs
    }

    fn score_content(&self, profile: &UserProfile, lexicon: &Lexicon, job: &JobPosting) -> Recommendation {
        let w = &self.scoring;
        let mut score = 0.0;
        let mut reasons = Vec::new();

        let job_skills: Vec<String> = job.skills.iter().map(|s| lexicon.normalize(s)).collect();
        let (skill_ratio, matched) = skill_overlap(&profile.skills, &job_skills);
        score += skill_ratio * w.skills_weight;
        if !matched.is_empty() {
            reasons.push(format!("Matches your skills: {}", matched.join(", ")));
        }

        if let Some(city) = job.city() {
            if profile.locations.contains(&lexicon.normalize(city)) {
                score += w.location_weight;
                reasons.push(format!("Located in {city}"));
            }
        }
        if let Some(company) = &job.company {
            if profile.companies.contains(&lexicon.normalize(company)) {
                score += w.company_weight;
                reasons.push(format!("At {company}, a company you have shown interest in"));
            }
        }
        if let Some(job_type) = &job.job_type {
            if profile.job_types.contains(&lexicon.normalize(job_type)) {
                score += w.job_type_weight;
                reasons.push(format!("Matches your preferred job type ({job_type})"));
            }
        }

        let user_salary = Some(&profile.salary_range);
        let salary = salary_match(user_salary, job.salary.as_ref(), w.neutral_salary_match);
        score += salary * w.salary_weight;
        if salary >= 0.8 && job.salary.is_some_and(|s| !s.is_unset()) && !profile.salary_range.is_unset() {
            reasons.push("Salary fits your expected range".to_string());
        }

        if let Some(title) = &job.title {
            if lexicon.keywords(title).iter().any(|t| profile.title_terms.contains(t)) {
                reasons.push("Similar to roles you have engaged with".to_string());
            }
        }

        Recommendation { job_id: job.id.clone(), score, method: RecommendationMethod::ContentBased, reasons }
    }

    pub fn get_collaborative_recommendations(
        &self,
        user_id: &str,
        jobs: &[JobPosting],
        applications: &[Application],
        limit: usize,
    ) -> Vec<Recommendation> {
        let mut applied: HashMap<&str, HashSet<&str>> = HashMap::new();
        let mut accepted: HashMap<&str, HashSet<&str>> = HashMap::new();
        for app in applications {
            applied.entry(app.jobseeker_id.as_str()).or_default().insert(app.job_id.as_str());
            if app.status == ApplicationStatus::Accepted {
                accepted.entry(app.jobseeker_id.as_str()).or_default().insert(app.job_id.as_str());
            }
        }
        let Some(mine) = applied.get(user_id) else {
            debug!(user_id, "no applications; no collaborative candidates");
            return Vec::new();
        };

        let mut neighbors: Vec<(&str, f64)> = applied
            .iter()
            .filter(|(other, _)| **other != user_id)
            .map(|(other, theirs)| (*other, jaccard(mine, theirs)))
            .filter(|(_, sim)| *sim > self.scoring.min_similarity)
            .collect();
        neighbors.sort_by(|a, b| {
            b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal).then_with(|| a.0.cmp(&b.0))
        });
        neighbors.truncate(self.scoring.max_neighbors);

        let candidates: HashSet<&str> = jobs.iter().map(|j| j.id.as_str()).collect();
        let mut scores: HashMap<&str, (f64, usize)> = HashMap::new();
        for (neighbor, sim) in &neighbors {
            let Some(accepted_jobs) = accepted.get(neighbor) else { continue };
            for job_id in accepted_jobs.iter().filter(|j| candidates.contains(**j)) {
                let entry = scores.entry(*job_id).or_insert((0.0, 0));
                entry.0 += sim;
                entry.1 += 1;
            }
        }

        let mut recs: Vec<Recommendation> = scores
            .into_iter()
            .map(|(job_id, (score, count))| Recommendation {
                job_id: job_id.to_string(),
                score,
                method: RecommendationMethod::Collaborative,
                reasons: vec![format!("{count} candidate(s) with applications similar to yours were accepted here")],
            })
            .collect();
        rank(&mut recs);
        recs.truncate(limit);
        debug!(user_id, neighbors = neighbors.len(), returned = recs.len(), "collaborative ranking");
        recs
    }

    pub fn get_hybrid_recommendations(
        &self,
        user_id: &str,
        jobs: &[JobPosting],
        applications: &[Application],
        limit: usize,
    ) -> Vec<Recommendation> {
        let wide = limit.saturating_mul(2);
        let content = self.get_content_based_recommendations(user_id, jobs, wide);
        let collaborative = self.get_collaborative_recommendations(user_id, jobs, applications, wide);

        // job id -> (content score, collaborative score, reasons)
        let mut merged: HashMap<String, (f64, f64, Vec<String>)> = HashMap::new();
        for rec in content {
            let entry = merged.entry(rec.job_id).or_default();
            entry.0 = rec.score;
            entry.2.extend(rec.reasons);
        }
        for rec in collaborative {
            let entry = merged.entry(rec.job_id).or_default();
            entry.1 = rec.score;
            for reason in rec.reasons {
                if !entry.2.contains(&reason) {
                    entry.2.push(reason);
                }
            }
        }

        let w = &self.scoring;
        let mut recs: Vec<Recommendation> = merged
            .into_iter()
            .map(|(job_id, (content, collaborative, reasons))| Recommendation {
                job_id,
                score: content * w.content_blend + collaborative * w.collaborative_blend,
                method: RecommendationMethod::Hybrid,
                reasons,
            })
            .collect();
        rank(&mut recs);
        recs.truncate(limit);
        recs
    }

    pub fn recommend(
        &self,
        user_id: &str,
        method: RecommendationMethod,
        jobs: &[JobPosting],
        applications: &[Application],
        limit: usize,
    ) -> Vec<Recommendation> {
        match method {
            RecommendationMethod::ContentBased => self.get_content_based_recommendations(user_id, jobs, limit),
            RecommendationMethod::Collaborative => self.get_collaborative_recommendations(user_id, jobs, applications, limit),
            RecommendationMethod::Popular => self.get_popular_jobs(jobs, limit),
            RecommendationMethod::Hybrid => self.get_hybrid_recommendations(user_id, jobs, applications, limit),
        }
    }

    pub fn get_recommendation_explanation(&self, _user_id: &str, _job_id: &str, method: &str) -> String {
        explanation_for(method).to_string()
    }
}

fn insert_non_empty(set: &mut std::collections::BTreeSet<String>, value: String) {
    if !value.is_empty() {
        set.insert(value);
    }
}

/// First occurrence of each job id, input order preserved.
fn unique_jobs(jobs: &[JobPosting]) -> Vec<&JobPosting> {
    let mut seen = HashSet::new();
    jobs.iter().filter(|j| seen.insert(j.id.as_str())).collect()
}
