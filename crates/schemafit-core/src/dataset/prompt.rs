//! Extraction prompt template.
//!
//! The prompt uses the Llama-2 chat layout: a system block demanding bare
//! JSON, then one instruction block carrying the passage and the schema.

use serde_json::Value;

/// System block: JSON only, nothing before or after.
pub const SYSTEM_PROMPT: &str = "You only respond in JSON. You do not add text before. \
You do not add text after. Only JSON.";

/// Render the extraction prompt for one passage.
pub fn build_prompt(passage: &str, schema: &Value) -> String {
    let user_message = format!(
        "{passage}\nFrom the above passage, extract the following schema: {schema}\n\n\
         Only output JSON with the allowed types."
    );
    format!("<s><<SYS>>{SYSTEM_PROMPT} <</SYS>>[INST] {user_message} [/INST]")
}
