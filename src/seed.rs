//! Default mapping data
//!
//! Bootstraps the Greenhouse mappings the extension ships with. Seeding is
//! idempotent: once any Greenhouse row exists the seeder does nothing, even
//! if the existing rows differ from the defaults.

use crate::Result;
use crate::mapping::NewFieldMapping;
use crate::storage::SqliteStore;

pub const GREENHOUSE: &str = "greenhouse";

const GREENHOUSE_FIELDS: &[(&str, &[&str])] = &[
    (
        "first_name",
        &[
            r#"input[name*="first_name"]"#,
            r#"input[id*="first_name"]"#,
            r#"input[autocomplete="given-name"]"#,
        ],
    ),
    (
        "last_name",
        &[
            r#"input[name*="last_name"]"#,
            r#"input[id*="last_name"]"#,
            r#"input[autocomplete="family-name"]"#,
        ],
    ),
    (
        "email",
        &[
            r#"input[name*="email"]"#,
            r#"input[type="email"]"#,
            r#"input[autocomplete="email"]"#,
        ],
    ),
    (
        "phone",
        &[
            r#"input[name*="phone"]"#,
            r#"input[type="tel"]"#,
            r#"input[autocomplete="tel"]"#,
        ],
    ),
    (
        "linkedin",
        &[
            r#"input[name*="linkedin"]"#,
            r#"input[id*="linkedin"]"#,
            r#"input[placeholder*="linkedin" i]"#,
        ],
    ),
    (
        "github",
        &[
            r#"input[name*="github"]"#,
            r#"input[id*="github"]"#,
            r#"input[placeholder*="github" i]"#,
        ],
    ),
];

/// The built-in Greenhouse mappings, in insertion order
pub fn greenhouse_defaults() -> Vec<NewFieldMapping> {
    GREENHOUSE_FIELDS
        .iter()
        .map(|(field_name, selectors)| NewFieldMapping::new(GREENHOUSE, *field_name, selectors.iter().copied()))
        .collect()
}

/// What a seeding run did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Seeded(usize),
    AlreadySeeded,
}

impl SeedOutcome {
    /// Client-facing message
    pub fn message(&self) -> String {
        match self {
            SeedOutcome::Seeded(count) => format!("Seeded {} Greenhouse mappings", count),
            SeedOutcome::AlreadySeeded => "Greenhouse mappings already exist".to_string(),
        }
    }
}

impl std::fmt::Display for SeedOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}

/// Insert the Greenhouse defaults unless the platform already has mappings
pub fn seed_greenhouse(store: &mut SqliteStore) -> Result<SeedOutcome> {
    let outcome = match store.seed_platform(GREENHOUSE, &greenhouse_defaults())? {
        Some(count) => SeedOutcome::Seeded(count),
        None => SeedOutcome::AlreadySeeded,
    };
    tracing::info!("Greenhouse seed: {}", outcome);
    Ok(outcome)
}
