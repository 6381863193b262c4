//! Extraction prompts for resumes and job descriptions.

use crate::records::{MAX_EDUCATION, MAX_EXPERIENCE, MAX_INDUSTRIES, MAX_SKILLS, NOT_SPECIFIED};

const STRICT_RULES: &str = "STRICT RULES:
- Do NOT print any text before or after the JSON
- Do NOT include explanations, comments, or greetings
- Do NOT invent information
- Ensure the JSON is syntactically valid and complete
- Output exactly one JSON object";

/// Build the resume extraction prompt around the cleaned resume text.
pub fn build_resume_prompt(resume_text: &str) -> String {
    format!(
        "RETURN ONLY VALID JSON.

You are an expert resume parser.

Extract the following fields and produce exactly one JSON object with keys:

- skills: list of professional skills (strings)
- experience: list of work experience entries (strings)
- education: list of degrees and fields of study (strings)
- certifications: list of professional certifications (strings)
- industries: list of industries the candidate has worked in (strings)

Output format rules:

skills:
- Output a JSON array of strings
- Normalize skill names (e.g. \"MS Office\" -> \"Microsoft Office\")
- Max {MAX_SKILLS} skills

experience:
- Output a JSON array of strings
- Each item represents ONE job role, split by employer or job title
- Format: \"<Title> at <Company> (<Years>): <Main responsibilities>\"
- Summarize each role in 25 words or fewer
- Max {MAX_EXPERIENCE} roles

education:
- Output a JSON array of strings
- One item per degree or certification
- Format: \"<Degree> in <Field> from <Institution> (<Year or year range>)\"
- Ignore grades, exam scores, and remarks
- Max {MAX_EDUCATION} items

certifications:
- Output a JSON array of strings

industries:
- Output a JSON array of strings
- Max {MAX_INDUSTRIES} industries

{STRICT_RULES}

Resume:
{resume_text}
"
    )
}

/// Build the job description extraction prompt around the cleaned job text.
pub fn build_job_prompt(job_text: &str) -> String {
    format!(
        "RETURN ONLY VALID JSON.

You are an expert job description parser.

Extract the following fields and produce exactly one JSON object with keys:

- job_title: specific and normalized title of the job (string)
- required_skills: skills explicitly or implicitly required (list of strings)
- required_experience: required experience level or years (string)
- required_education: minimum education requirement (string)
- industry: primary industry of the role (string)

Output format rules:

job_title:
- Output a single string
- Normalize the title (e.g. \"Backend Ninja\" -> \"Backend Software Engineer\")
- Keep seniority words when they are clear (e.g. Senior, Junior)

required_skills:
- Output a JSON array of strings
- Include only skills relevant to performing the job
- Normalize skill names (e.g. \"MS Office\" -> \"Microsoft Office\")
- Max {MAX_SKILLS} skills

required_experience:
- Output a single string
- Prefer explicit years if stated (e.g. \"3+ years of experience\")
- Otherwise infer a level (e.g. \"Entry-level\", \"Mid-level\", \"Senior\")
- Do NOT invent exact years if not implied

required_education:
- Output a single string
- Use the minimum required level (e.g. \"Bachelor's degree in Computer Science\")
- If education is not specified, output \"{NOT_SPECIFIED}\"

industry:
- Output a single string
- Choose the most relevant industry based on the job context
- Do NOT list multiple industries

{STRICT_RULES}

Job description:
{job_text}
"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resume_prompt_embeds_text_and_limits() {
        let prompt = build_resume_prompt("Category: IT. Resume text: Rust developer");
        assert!(prompt.starts_with("RETURN ONLY VALID JSON."));
        assert!(prompt.ends_with("Resume:\nCategory: IT. Resume text: Rust developer\n"));
        assert!(prompt.contains("Max 8 skills"));
        assert!(prompt.contains("Max 4 roles"));
        assert!(prompt.contains("Max 3 items"));
        assert!(prompt.contains("\"MS Office\" -> \"Microsoft Office\""));
        assert!(prompt.contains("Output exactly one JSON object"));
    }

    #[test]
    fn job_prompt_names_every_field() {
        let prompt = build_job_prompt("title: Backend Ninja");
        for key in [
            "job_title",
            "required_skills",
            "required_experience",
            "required_education",
            "industry",
        ] {
            assert!(prompt.contains(key), "missing {key}");
        }
        assert!(prompt.contains("output \"Not specified\""));
        assert!(prompt.ends_with("Job description:\ntitle: Backend Ninja\n"));
    }
}
