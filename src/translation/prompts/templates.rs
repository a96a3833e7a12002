/*!
 * Prompt templates for subtitle translation.
 *
 * The system prompt describes the translator role; user messages are JSON
 * documents built from a [`ContextBatch`]. The model answers batch requests
 * with a JSON array of `{number, translation}` objects and line requests with
 * plain text.
 */

use serde::{Deserialize, Deserializer, Serialize};

use crate::app_config::TranslationMode;
use crate::translation::context::{BatchItem, ContextBatch};

/// System prompt template for subtitle translation.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// The template string with placeholders
    template: String,
}

impl PromptTemplate {
    /// The default system prompt for subtitle translation.
    pub const SUBTITLE_TRANSLATOR: &'static str = r#"You are a professional video subtitle translator. Your task is to translate {source_language} subtitles into {target_language}.

1. Input format:
{input_format}

2. Translation requirements:
   - Convey the meaning of the original accurately
   - Use natural, idiomatic {target_language}
   - Keep the dialogue coherent with the surrounding context
   - Keep proper nouns consistent
   - Make the subject explicit when a pronoun would be ambiguous"#;

    const DOMAIN_SECTION: &'static str = r#"

3. Specialist domains:
This content involves the following fields: {domains}
Make sure to:
   - Use the terminology and jargon of these fields
   - Keep technical terms accurate and consistent
   - Follow the conventions of these fields"#;

    const BATCH_INPUT: &'static str = r#"   {
     "context_before": ["up to two preceding lines"],
     "batch": [{"number": 1, "text": "line to translate"}],
     "context_after": ["up to two following lines"]
   }"#;

    const LINE_INPUT: &'static str = r#"   {
     "context_before": ["up to two preceding lines"],
     "current_line": "line to translate",
     "context_after": ["up to two following lines"]
   }"#;

    const BATCH_OUTPUT: &'static str = r#"

Output requirements:
- Return ONLY a JSON array: [{"number": <number>, "translation": "<translated text>"}]
- Include exactly one object for every entry of "batch", keeping its number
- Do not translate the context lines
- Do not add explanations or any other text

Keep the translation natural and fluent while staying coherent with the context."#;

    const LINE_OUTPUT: &'static str = r#"

Output requirements:
- Return only the {target_language} translation of the current line
- Do not include explanations or any other content
- Do not translate the context lines

Keep the translation natural and fluent while staying coherent with the context."#;

    /// Create a new prompt template.
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }

    /// Create the subtitle translator template for a translation mode.
    pub fn subtitle_translator(mode: TranslationMode, domains: &[String]) -> Self {
        let (input, output) = match mode {
            TranslationMode::Batch => (Self::BATCH_INPUT, Self::BATCH_OUTPUT),
            TranslationMode::Line => (Self::LINE_INPUT, Self::LINE_OUTPUT),
        };

        let mut template = Self::SUBTITLE_TRANSLATOR.replace("{input_format}", input);
        let domains: Vec<&str> = domains
            .iter()
            .map(|d| d.trim())
            .filter(|d| !d.is_empty())
            .collect();
        if !domains.is_empty() {
            template.push_str(&Self::DOMAIN_SECTION.replace("{domains}", &domains.join(", ")));
        }
        template.push_str(output);

        Self { template }
    }

    /// Render the template with the given variables.
    pub fn render(&self, source_language: &str, target_language: &str) -> String {
        self.template
            .replace("{source_language}", source_language)
            .replace("{target_language}", target_language)
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::subtitle_translator(TranslationMode::default(), &[])
    }
}

/// Builder for the prompts of one translation run.
#[derive(Debug, Clone)]
pub struct TranslationPromptBuilder {
    source_language: String,
    target_language: String,
    mode: TranslationMode,
    domains: Vec<String>,
}

impl TranslationPromptBuilder {
    /// Create a new prompt builder.
    pub fn new(source_language: &str, target_language: &str) -> Self {
        Self {
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
            mode: TranslationMode::default(),
            domains: Vec::new(),
        }
    }

    /// Set the translation mode.
    pub fn with_mode(mut self, mode: TranslationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the specialist domains of the content.
    pub fn with_domains(mut self, domains: &[String]) -> Self {
        self.domains = domains.to_vec();
        self
    }

    /// Build the system prompt.
    pub fn build_system_prompt(&self) -> String {
        PromptTemplate::subtitle_translator(self.mode, &self.domains)
            .render(&self.source_language, &self.target_language)
    }

    /// Build the user message for a batch, shaped by the mode.
    ///
    /// In line mode the batch is expected to hold a single item.
    pub fn build_user_prompt(&self, batch: &ContextBatch) -> String {
        match self.mode {
            TranslationMode::Batch => BatchRequest::from(batch).to_json(),
            TranslationMode::Line => LineRequest::from(batch).to_json(),
        }
    }
}

/// Batch-mode request sent as the user message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRequest {
    pub context_before: Vec<String>,
    pub batch: Vec<BatchItem>,
    pub context_after: Vec<String>,
}

impl From<&ContextBatch> for BatchRequest {
    fn from(batch: &ContextBatch) -> Self {
        Self {
            context_before: batch.context_before.clone(),
            batch: batch.items.clone(),
            context_after: batch.context_after.clone(),
        }
    }
}

impl BatchRequest {
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Line-mode request sent as the user message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineRequest {
    pub context_before: Vec<String>,
    pub current_line: String,
    pub context_after: Vec<String>,
}

impl From<&ContextBatch> for LineRequest {
    fn from(batch: &ContextBatch) -> Self {
        Self {
            context_before: batch.context_before.clone(),
            current_line: batch
                .items
                .iter()
                .map(|item| item.text.as_str())
                .collect::<Vec<_>>()
                .join(" "),
            context_after: batch.context_after.clone(),
        }
    }
}

impl LineRequest {
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// One element of a batch-mode response.
///
/// Models are inconsistent about key names and about quoting numbers, so a few
/// aliases are accepted for both fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslatedEntry {
    /// Source sequence number the translation belongs to
    #[serde(alias = "id", alias = "编号", deserialize_with = "number_or_string")]
    pub number: usize,

    /// Translated text
    #[serde(alias = "translated_text", alias = "translated", alias = "译文")]
    pub translation: String,
}

fn number_or_string<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(usize),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
