use crate::cli::Args;
use log::{ info, warn };
use std::fs;
use std::path::Path;

const RESUME_UNAVAILABLE: &str = "Resume information unavailable";

/// Who the assistant speaks as, and the background material it answers from.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonaConfig {
    pub name: String,
    pub title: String,
    pub summary: String,
    pub resume: String,
    pub tools_enabled: bool,
}

impl PersonaConfig {
    pub fn from_args(args: &Args) -> Self {
        let summary = read_optional_text(&args.summary_path).unwrap_or_default();
        let resume = read_resume(&args.resume_path).unwrap_or_else(|| RESUME_UNAVAILABLE.to_string());
        info!(
            "Persona loaded: name={}, summary={} chars, resume={} chars",
            args.persona_name,
            summary.len(),
            resume.len()
        );

        Self {
            name: args.persona_name.clone(),
            title: args.persona_title.clone(),
            summary,
            resume,
            tools_enabled: args.enable_tools,
        }
    }

    pub fn system_prompt(&self) -> String {
        let name = &self.name;
        let mut prompt = format!(
            "You are acting as {name}, a {title}. You are answering questions on {name}'s portfolio website, \
particularly questions related to {name}'s career, background, skills, experience, and projects. \
Your responsibility is to represent {name} for interactions on the website as faithfully as possible. \
Be professional, engaging, and friendly, as if talking to a potential client, recruiter, or future employer who came across the website. \
Keep your responses concise and to the point; aim for 2-3 sentences unless more detail is specifically requested.",
            name = name,
            title = self.title
        );

        if self.tools_enabled {
            prompt.push_str(
                " If you don't know the answer to any question, use your record_unknown_question tool to record the question that you couldn't answer. \
If the user is engaging in discussion and seems interested in collaboration or hiring, steer them towards getting in touch via email; \
ask for their email and record it using your record_user_details tool."
            );
        }

        if !self.summary.trim().is_empty() {
            prompt.push_str(&format!("\n\n## Summary:\n{}\n\n", self.summary.trim()));
        } else {
            prompt.push_str("\n\n");
        }
        if !self.resume.trim().is_empty() {
            prompt.push_str(&format!("## Resume:\n{}\n\n", self.resume.trim()));
        }

        prompt.push_str(
            &format!(
                "With this context, please chat with the user, always staying in character as {}. Be helpful, professional, and engaging!",
                name
            )
        );
        prompt
    }
}

/// Reads the resume as text, extracting it page by page when the file is a PDF.
/// `None` when the file is missing, unreadable, or yields no text.
fn read_resume<P: AsRef<Path>>(path: P) -> Option<String> {
    let path = path.as_ref();
    let is_pdf = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false);
    if !is_pdf {
        return read_optional_text(path).filter(|text| !text.trim().is_empty());
    }

    match pdf_extract::extract_text(path) {
        Ok(text) if !text.trim().is_empty() => Some(text),
        Ok(_) => {
            warn!("No text could be extracted from '{}'.", path.display());
            None
        }
        Err(e) => {
            warn!("Error reading PDF '{}': {}. Continuing without it.", path.display(), e);
            None
        }
    }
}

fn read_optional_text<P: AsRef<Path>>(path: P) -> Option<String> {
    let path = path.as_ref();
    match fs::read_to_string(path) {
        Ok(text) => Some(text),
        Err(e) => {
            warn!("Could not read '{}': {}. Continuing without it.", path.display(), e);
            None
        }
    }
}
