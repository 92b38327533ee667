//! Input validation for job names, rsync patterns and folder arguments
//!
//! Everything submitted here ends up as a CLI argument or in the daemon's XML store.

use anyhow::{Result, bail};

/// Validate exclude/include patterns
///
/// Ensures patterns are safe, properly formatted, and within reasonable limits.
pub fn validate_patterns(patterns: &[String]) -> Result<()> {
    const MAX_PATTERNS: usize = 100;
    const MAX_PATTERN_LENGTH: usize = 255;

    if patterns.len() > MAX_PATTERNS {
        bail!(
            "Too many patterns: {} (max: {})",
            patterns.len(),
            MAX_PATTERNS
        );
    }

    for pattern in patterns {
        let trimmed = pattern.trim();

        if trimmed.is_empty() {
            continue;
        }

        if trimmed.chars().count() > MAX_PATTERN_LENGTH {
            bail!(
                "Pattern too long: '{}...' ({} chars, max: {})",
                trimmed.chars().take(20).collect::<String>(),
                trimmed.chars().count(),
                MAX_PATTERN_LENGTH
            );
        }

        if trimmed.chars().any(char::is_control) {
            bail!("Pattern contains control characters");
        }

        globset::Glob::new(trimmed).map_err(|e| {
            anyhow::anyhow!("Invalid pattern '{}': {}", trimmed, e)
        })?;
    }

    Ok(())
}

/// Validate a job name
///
/// The name becomes the job's key in the daemon store; it must be non-empty after trimming.
pub fn validate_job_name(name: &str) -> Result<()> {
    const MAX_JOB_NAME_LENGTH: usize = 100;

    let trimmed = name.trim();

    if trimmed.is_empty() {
        bail!("Job name cannot be empty");
    }

    if trimmed.chars().count() > MAX_JOB_NAME_LENGTH {
        bail!(
            "Job name too long: {} chars (max: {})",
            trimmed.chars().count(),
            MAX_JOB_NAME_LENGTH
        );
    }

    if trimmed.chars().any(char::is_control) {
        bail!("Job name contains control characters");
    }

    Ok(())
}

/// Validate a source/destination folder argument
pub fn validate_path_argument(path: &str) -> Result<()> {
    if path.len() > 4096 {
        bail!("Path too long: {} bytes (max: 4096)", path.len());
    }

    if path.contains('\0') {
        bail!("Path contains null byte");
    }

    Ok(())
}
