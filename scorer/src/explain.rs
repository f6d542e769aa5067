pub const DEFAULT_EXPLANATION: &str = "This job was recommended based on your activity on the platform.";

/// Fixed explanation sentence for a method name. Unknown names get
/// [`DEFAULT_EXPLANATION`].
pub fn explanation_for(method: &str) -> &'static str {
    match method.trim().to_ascii_lowercase().as_str() {
        "content-based" => "This job matches the skills, locations and kinds of roles you have shown interest in.",
        "collaborative" => "Candidates whose applications look like yours were accepted for this job.",
        "popular" => "This job is currently popular with candidates on the platform.",
        "hybrid" => "This job fits your profile and is favoured by candidates similar to you.",
        _ => DEFAULT_EXPLANATION,
    }
}
