//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "veil.toml")]
    pub output: String,

    /// Include example values and comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing Veil configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2); // Configuration error exit code
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. To detect names and places, set [model] endpoint");
                println!("     (or VEIL_MODEL_ENDPOINT in .env)");
                println!("  3. Validate configuration: veil validate-config");
                println!("  4. Run: echo 'Mail me at jane@example.com' | veil anonymize");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {}", e);
                Ok(5) // Fatal error exit code
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# Veil Configuration File
# Multilingual PII detection and redaction

[application]
log_level = "info"

[analyzer]
default_language = "en"
entities = [
    "PHONES_en", "PHONES_el", "PERSON", "LONG_NUMBERS_en", "LONG_NUMBERS_el",
    "EMAIL_ADDRESS", "IP_ADDRESS", "LOCATION", "DATE_TIME", "IBAN_CODE", "CREDIT_CARD",
]
append_terminator = true
score_threshold = 0.0
recognizer_timeout_ms = 5000

[patterns]
include_defaults = true

# [model]
# endpoint = "${VEIL_MODEL_ENDPOINT}"
# languages = ["en", "el"]

[audit]
enabled = false
log_path = "./audit/redactions.log"
json_format = true

[logging]
local_enabled = false
local_path = "./logs"
local_rotation = "daily"
"#
        .to_string()
    }

    /// Generate configuration with examples and comments
    fn generate_config_with_examples() -> String {
        r#"# Veil Configuration File
# Multilingual PII detection and redaction
#
# Every section is optional. Values shown are the defaults unless noted.
# Use ${VAR_NAME} to substitute environment variables, and VEIL_<SECTION>_<KEY>
# environment variables to override any value at runtime.

# ============================================================================
# Application Settings
# ============================================================================
[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

# ============================================================================
# Analyzer
# ============================================================================
[analyzer]
# Language used when a request does not name one
default_language = "en"

# Entity types detected when a request does not name any
entities = [
    "PHONES_en", "PHONES_el", "PERSON", "LONG_NUMBERS_en", "LONG_NUMBERS_el",
    "EMAIL_ADDRESS", "IP_ADDRESS", "LOCATION", "DATE_TIME", "IBAN_CODE", "CREDIT_CARD",
]

# Append a terminator before detection so that end-of-text entities are
# recognized; it never appears in the output
append_terminator = true
terminator = "."

# Drop spans scoring below this value
score_threshold = 0.0

# Per-request budget for every recognizer; a recognizer that exceeds it
# fails the whole request
recognizer_timeout_ms = 5000

# Context words near a match raise its score
[analyzer.context]
window_words = 5
similarity_factor = 0.35
min_score_with_context = 0.4

# ============================================================================
# Pattern Library
# ============================================================================
[patterns]
# Load the built-in English and Greek recognizers
include_defaults = true

# Additional recognizers in the same TOML format
# library = "./custom-recognizers.toml"

# ============================================================================
# Named-Entity Model (PERSON, LOCATION, DATE_TIME)
# ============================================================================
# The model is an HTTP service answering
#   POST {"text": "...", "language": "en"}
# with
#   {"entities": [{"label": "PERSON", "start": 0, "end": 4, "score": 0.9}]}
# Offsets are character offsets.
#
# [model]
# endpoint = "${VEIL_MODEL_ENDPOINT}"
# languages = ["en", "el"]
# timeout_ms = 5000
# default_score = 0.85
# ignored_labels = ["NORP"]

# ============================================================================
# Operator Overrides
# ============================================================================
# Rules replace the built-in preset entry for one entity type.
# Rule types:
#   replace  - new_value
#   mask     - masking_char, chars_to_mask, from_end
#   generate - generator = "iban" | "digits" | "list" (list needs values)

[operators.redact.IP_ADDRESS]
type = "mask"
masking_char = "*"
chars_to_mask = 5
from_end = true

[operators.synthetic.PERSON]
type = "generate"
generator = "list"
values = ["Alex Doe", "Sam Roe"]

# ============================================================================
# Audit Log
# ============================================================================
[audit]
# Record every request with SHA-256 hashes of the redacted values
enabled = false
log_path = "./audit/redactions.log"
json_format = true

# ============================================================================
# Logging
# ============================================================================
[logging]
# JSON log files in addition to console output on stderr
local_enabled = false
local_path = "./logs"
# daily, hourly or never
local_rotation = "daily"
"#
        .to_string()
    }
}
