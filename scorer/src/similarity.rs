//! Scoring primitives shared by the ranking methods.

use std::collections::HashSet;
use std::hash::Hash;

use crate::model::SalaryRange;

/// Case-insensitive containment in either direction. Inputs are expected to
/// be normalized already; empty strings never match.
pub fn skill_matches(a: &str, b: &str) -> bool {
    if a.is_empty() || b.is_empty() { return false; }
    a.contains(b) || b.contains(a)
}

/// Fraction of `profile_skills` covered by at least one of `job_skills`.
/// Returns the matched skills alongside the ratio.
pub fn skill_overlap<'a>(profile_skills: impl IntoIterator<Item = &'a String>, job_skills: &[String]) -> (f64, Vec<&'a str>) {
    let mut total = 0usize;
    let mut matched = Vec::new();
    for skill in profile_skills {
        total += 1;
        if job_skills.iter().any(|js| skill_matches(skill, js)) {
            matched.push(skill.as_str());
        }
    }
    (matched.len() as f64 / total.max(1) as f64, matched)
}

/// Closeness of a job's salary midpoint to the user's, in [0, 1]. `neutral`
/// is returned when either side carries no salary information.
pub fn salary_match(user: Option<&SalaryRange>, job: Option<&SalaryRange>, neutral: f64) -> f64 {
    let (user, job) = match (user, job) {
        (Some(u), Some(j)) if !u.is_unset() && !j.is_unset() => (u, j),
        _ => return neutral,
    };
    let user_mid = user.midpoint();
    if user_mid <= 0.0 || !user_mid.is_finite() { return neutral; }
    (1.0 - (user_mid - job.midpoint()).abs() / user_mid).max(0.0)
}

/// `|A ∩ B| / |A ∪ B|`, zero when both sets are empty.
pub fn jaccard<T: Eq + Hash>(a: &HashSet<T>, b: &HashSet<T>) -> f64 {
    let union = a.union(b).count();
    if union == 0 { return 0.0; }
    a.intersection(b).count() as f64 / union as f64
}
