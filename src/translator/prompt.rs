//! Prompt construction for batch translation

/// System prompt; `{language}` is replaced with the target language
const SYSTEM_PROMPT: &str = r#"You are a bilingual dictionary for English learners. For every English word or phrase you are given, write its common meanings in {language}.

Rules:
- Return ONLY a single JSON object of the form {"words": [{"word": "...", "meaning": "..."}]}
- One record per input item, in exactly the input order, with "word" copied verbatim from the input
- Each "meaning" is one or more lines joined with "\n", each line formatted "<part-of-speech abbreviation>. <translation>", for example "n. 苹果\nv. 使用"
- Use standard abbreviations: n., v., vt., vi., adj., adv., prep., conj., pron., phr.
- No explanations, no markdown, no code fences, nothing outside the JSON object"#;

pub fn build_system_prompt(target_language: &str) -> String {
    SYSTEM_PROMPT.replace("{language}", target_language)
}

/// User prompt listing the batch as a JSON array so phrases stay intact
pub fn build_user_prompt(words: &[String]) -> String {
    let list = serde_json::to_string(words).unwrap_or_else(|_| format!("{:?}", words));
    format!(
        "Give the meanings of these {} items, in this order:\n{}",
        words.len(),
        list
    )
}
