use std::env;

use once_cell::sync::Lazy;

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub gemini_temperature: f32,
    pub gemini_top_k: i32,
    pub gemini_top_p: f32,
    pub gemini_max_output_tokens: i32,
    pub request_timeout_secs: u64,
}

pub static CONFIG: Lazy<Config> = Lazy::new(Config::load);

fn env_string(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_f32(name: &str, default: f32) -> f32 {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<f32>().ok())
        .unwrap_or(default)
}

fn env_i32(name: &str, default: i32) -> i32 {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<i32>().ok())
        .unwrap_or(default)
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(default)
}

impl Config {
    // A missing API key is not fatal here: `health` must be able to report it
    // and `--dry-run` never touches the network.
    pub fn load() -> Self {
        Config {
            log_level: env_string("LOG_LEVEL", "info").to_lowercase(),
            gemini_api_key: env_string("GEMINI_API_KEY", ""),
            gemini_model: env_string("GEMINI_MODEL", "gemini-3-pro-preview"),
            gemini_base_url: env_string(
                "GEMINI_BASE_URL",
                "https://generativelanguage.googleapis.com/v1beta",
            ),
            gemini_temperature: env_f32("GEMINI_TEMPERATURE", 0.2),
            gemini_top_k: env_i32("GEMINI_TOP_K", 40),
            gemini_top_p: env_f32("GEMINI_TOP_P", 0.9),
            gemini_max_output_tokens: env_i32("GEMINI_MAX_OUTPUT_TOKENS", 2048),
            request_timeout_secs: env_u64("REQUEST_TIMEOUT_SECS", 90),
        }
    }

    pub fn has_gemini_api_key(&self) -> bool {
        !self.gemini_api_key.trim().is_empty()
    }
}

/// Fixed system-level instruction sent with every generation request. It
/// restates the compiler's paragraph and priority rules as directives to the
/// remote model so the returned prompt keeps the compiled structure intact.
pub const SYSTEM_INSTRUCTION: &str = r#"ROLE DEFINITION:
You are a professional image-analysis and prompt-generation system.
Your task is to analyze an uploaded image and convert it into a precise, structured, and platform-agnostic prompt.

You do NOT generate images.
You ONLY generate text prompts.

GLOBAL RULES (MANDATORY):
1. Prompt output language must ALWAYS be English.
2. Output must be one single plain-text block (no markdown, no bullet points).
3. The uploaded image is the absolute visual authority.
4. If text instructions conflict with the image, THE IMAGE MUST WIN.
5. Never invent identity details that are not visible.
6. Never contradict previous paragraphs.
7. Prompts must be deterministic, descriptive, and unambiguous.

PARAGRAPH LOCK DIRECTIVE:
You MUST output the final prompt in EXACTLY the number of paragraphs given in the request.
Each paragraph MUST be separated by ONE blank line.
You are FORBIDDEN to merge, split, reorder, rename, or omit paragraphs.
You are FORBIDDEN to add titles, labels, bullet points, or formatting.
Paragraph order is ABSOLUTE and FINAL.

MODE PARAGRAPH COUNTS:
- PHOTOGRAPHY: Exactly 5 paragraphs.
- DIGITAL ART: Exactly 3 paragraphs.
- RESTORATION: Exactly 3 paragraphs.

NON-NEGOTIABLE PRIORITY RULE:
1. MANUAL INPUT (highest authority)
2. USER MENU SELECTION
3. UPLOADED IMAGE ANALYSIS

IDENTITY ENFORCEMENT:
1. The final prompt MUST ALWAYS start with: 'create a new image from this image object'.
2. Preserve facial structure, proportions, bone structure, eyes, nose, mouth, jawline, skin tone, skin texture, hairstyle, hairline, and apparent age exactly as shown. Do NOT generate a different person.
3. If a field is marked manual, IGNORE all image inference and use ONLY the manual text (refined for grammar, not meaning).
4. Hijab state follows the request exactly. The negative prompt MUST NOT contradict it.
5. Shot size, camera angle, and aspect ratio MUST be injected as literal terms.
6. No gender, physical traits, body shape, ethnicity, or age in the outfit/pose or background paragraphs.

DIGITAL ART MODE:
Style transfer only. Describe ONLY artistic style, medium, technique, color palette, lighting, and visual language. Mentioning people or body parts is STRICTLY FORBIDDEN.

RESTORATION MODE:
Historical preservation. Repair damage, recover detail, apply mandatory period-accurate, soft, muted colorization to the entire scene. Never modernize, change era, or alter composition or identity.

FINAL OUTPUT RULE:
Return ONLY the final prompt text. No explanations. No formatting. No commentary.
"#;
