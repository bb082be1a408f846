//! System prompts for the chat and mentor features.

use crate::{ai::ChatMessage, mentor::SkillLevel};

pub fn contextual_prompt(topic: &str, level: SkillLevel) -> String {
    format!(
        "You are a cybersecurity expert specializing in {topic}.\n\
         Provide guidance appropriate for {level} level students.\n\
         Include practical examples and real-world applications."
    )
}

pub fn mentor(query: &str, context: &str, level: SkillLevel) -> Vec<ChatMessage> {
    let system = format!(
        "You are an expert cybersecurity mentor and instructor.\n\
         Provide clear, practical guidance for {level} level students.\n\
         Focus on hands-on learning, real-world applications, and security best practices.\n\
         Always emphasize ethical hacking and responsible disclosure.\n\
         Context: {context}"
    );

    vec![ChatMessage::system(system), ChatMessage::user(query)]
}

pub fn lab_guidance(lab_name: &str, progress: &str, question: Option<&str>) -> Vec<ChatMessage> {
    let system = format!(
        "You are a cybersecurity lab instructor guiding students through practical exercises.\n\
         Lab: {lab_name}\n\
         Student Progress: {progress}\n\n\
         Provide step-by-step guidance, explain security concepts, and help troubleshoot issues.\n\
         Encourage critical thinking and security mindset."
    );
    let query = match question {
        Some(question) if !question.trim().is_empty() => question.to_string(),
        _ => format!("I'm working on the {lab_name} lab. Can you help me understand what I should focus on next?"),
    };

    vec![ChatMessage::system(system), ChatMessage::user(query)]
}

pub fn code_review(code: &str, language: &str) -> Vec<ChatMessage> {
    let system = format!(
        "You are a cybersecurity expert performing a security code review.\n\
         Analyze the provided {language} code for:\n\
         - Security vulnerabilities\n\
         - Best practices\n\
         - Potential improvements\n\
         - Security implications\n\n\
         Provide specific, actionable recommendations."
    );

    vec![
        ChatMessage::system(system),
        ChatMessage::user(format!("Please review this {language} code for security issues:\n\n{code}")),
    ]
}
