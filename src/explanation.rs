//! Natural-language explanations for ranked matches.

use crate::generation::{GenerationClientError, GenerationOptions, TextGenerator};
use crate::records::{CanonicalJobRecord, CanonicalResumeRecord};

/// Build the prompt asking the model to explain a job/resume pairing.
pub fn build_explanation_prompt(
    job: &CanonicalJobRecord,
    resume: &CanonicalResumeRecord,
    score: f32,
) -> String {
    let score = (score * 1000.0).round() / 1000.0;
    format!(
        "You are an AI recruitment assistant.

Explain why the following resume is a good or poor match for the job.
Be concise, factual, and explicit.

Job description:
- Job title: {job_title}
- Skills: {job_skills}
- Experience: {job_experience}
- Education: {job_education}
- Industry: {job_industry}

Candidate profile:
- Skills: {skills}
- Experience: {experience}
- Education: {education}
- Certifications: {certifications}
- Industries: {industries}

Similarity score: {score}

Explain:
- Key strengths
- Any gaps or risks
- Overall suitability
",
        job_title = job.job_title,
        job_skills = job.required_skills.join(", "),
        job_experience = job.required_experience,
        job_education = job.required_education,
        job_industry = job.industry,
        skills = resume.skills.join(", "),
        experience = resume.experience.join("; "),
        education = resume.education.join("; "),
        certifications = resume.certifications.join(", "),
        industries = resume.industries.join(", "),
    )
}

/// Ask the text-generation backend to explain a pairing.
pub async fn explain_match(
    generator: &dyn TextGenerator,
    options: &GenerationOptions,
    job: &CanonicalJobRecord,
    resume: &CanonicalResumeRecord,
    score: f32,
) -> Result<String, GenerationClientError> {
    let prompt = build_explanation_prompt(job, resume, score);
    let explanation = generator.generate(&prompt, options).await?;
    Ok(explanation.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct EchoGenerator;

    #[async_trait]
    impl TextGenerator for EchoGenerator {
        async fn generate(
            &self,
            prompt: &str,
            options: &GenerationOptions,
        ) -> Result<String, GenerationClientError> {
            assert!(options.stop.is_empty());
            Ok(format!("  {}  ", prompt.lines().count()))
        }
    }

    fn fixtures() -> (CanonicalJobRecord, CanonicalResumeRecord) {
        let job = CanonicalJobRecord {
            job_title: "Backend Software Engineer".into(),
            required_skills: vec!["Rust".into(), "SQL".into()],
            required_experience: "3+ years of experience".into(),
            required_education: "Bachelor's degree in Computer Science".into(),
            industry: "Fintech".into(),
        };
        let resume = CanonicalResumeRecord {
            skills: vec!["Rust".into(), "Go".into()],
            experience: vec!["Engineer at Acme (2019-2022)".into()],
            education: vec!["BSc in CS from MIT (2018)".into()],
            certifications: Vec::new(),
            industries: vec!["Finance".into()],
        };
        (job, resume)
    }

    #[test]
    fn prompt_includes_both_sides_and_rounded_score() {
        let (job, resume) = fixtures();
        let prompt = build_explanation_prompt(&job, &resume, 0.876_54);

        assert!(prompt.contains("- Job title: Backend Software Engineer"));
        assert!(prompt.contains("- Skills: Rust, SQL"));
        assert!(prompt.contains("- Skills: Rust, Go"));
        assert!(prompt.contains("- Experience: Engineer at Acme (2019-2022)"));
        assert!(prompt.contains("Similarity score: 0.877"));
    }

    #[tokio::test]
    async fn explanation_is_trimmed() {
        let (job, resume) = fixtures();
        let explanation = explain_match(
            &EchoGenerator,
            &GenerationOptions::explanation(256),
            &job,
            &resume,
            0.5,
        )
        .await
        .expect("explanation");

        assert_eq!(explanation, explanation.trim());
        assert!(!explanation.is_empty());
    }
}
