//! Prompt templates for tailored resumes, cover letters and suggestions

pub const SYSTEM_PROMPT: &str = "You are an AI-powered career coach that analyzes resumes and job descriptions, rewrites resumes for better alignment, crafts tailored cover letters, and provides suggestions to maximize a candidate's chances of getting hired.";

pub const TAILORED_RESUME_INPUT_CHARS: usize = 3000;
pub const COVER_LETTER_INPUT_CHARS: usize = 2500;
pub const SUGGESTION_SKILL_LIMIT: usize = 10;

/// First `max_chars` characters of `text`
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

pub fn tailored_resume_prompt(resume: &str, job: &str) -> String {
    format!(
        "Resume:\n{}\n\nJob description:\n{}\n\n\
         Rewrite the resume so it better matches the job description.\n\
         Focus on aligning skills, experience, and phrasing with the job description while keeping authenticity.",
        truncate_chars(resume, TAILORED_RESUME_INPUT_CHARS),
        truncate_chars(job, TAILORED_RESUME_INPUT_CHARS)
    )
}

pub fn cover_letter_prompt(resume: &str, job: &str) -> String {
    format!(
        "Write a professional cover letter tailored to the following job description:\n{}\n\n\
         Resume content:\n{}\n\n\
         Make it concise, skill-focused, and role-specific.",
        truncate_chars(job, COVER_LETTER_INPUT_CHARS),
        truncate_chars(resume, COVER_LETTER_INPUT_CHARS)
    )
}

/// The similarity is reported as a percentage with two decimals.
pub fn suggestions_prompt(cosine_similarity: f64, missing_skills: &[String]) -> String {
    let missing = if missing_skills.is_empty() {
        "None".to_string()
    } else {
        missing_skills
            .iter()
            .take(SUGGESTION_SKILL_LIMIT)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    };
    let score = (cosine_similarity * 100.0 * 100.0).round() / 100.0;

    format!(
        "You are an expert career coach.\n\
         A candidate has a resume and is applying for this job description.\n\
         Their resume-Job description match score is {}%\n\
         Missing Skills: {}\n\n\
         Provide a numbered list of 3-5 clear, practical suggestions.\n\
         Each suggestion must be on a new line.",
        score, missing
    )
}
