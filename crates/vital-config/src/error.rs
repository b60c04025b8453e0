//! Errors raised while loading or checking the `vitals` configuration.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A config file or `VITALS_*` variable failed to parse or extract.
    #[error("failed to load vitals config: {0}")]
    Figment(#[from] figment::Error),

    /// A section the session needs has empty fields.
    #[error(
        "[{section}] is missing {}; set it in .vitals/config.toml or as VITALS_{}__<FIELD>",
        .missing.join(", "),
        .section.to_uppercase()
    )]
    NotConfigured {
        section: String,
        missing: Vec<String>,
    },

    /// A field is set but unusable.
    #[error("invalid {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}
