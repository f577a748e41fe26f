use crate::utils::error::{EtlError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(EtlError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

/// URL templates carry an `{id}` placeholder that must survive until expansion.
pub fn validate_url_template(field_name: &str, template: &str) -> Result<()> {
    if !template.contains("{id}") {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: template.to_string(),
            reason: "Template must contain an {id} placeholder".to_string(),
        });
    }
    validate_url(field_name, &template.replace("{id}", "sample"))
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

/// A source location is either an http(s) URL or a path relative to the input directory.
pub fn validate_source_location(field_name: &str, location: &str) -> Result<()> {
    if location.starts_with("http://") || location.starts_with("https://") {
        validate_url(field_name, location)
    } else {
        validate_path(field_name, location)
    }
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("urls.session", "https://example.com").is_ok());
        assert!(validate_url("urls.session", "http://example.com").is_ok());
        assert!(validate_url("urls.session", "").is_err());
        assert!(validate_url("urls.session", "invalid-url").is_err());
        assert!(validate_url("urls.session", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_url_template() {
        assert!(validate_url_template("urls.session", "https://io.example.com/s/{id}").is_ok());
        assert!(validate_url_template("urls.session", "https://io.example.com/s/").is_err());
    }

    #[test]
    fn test_validate_source_location() {
        assert!(validate_source_location("sources.topics", "vendor/topics.json").is_ok());
        assert!(validate_source_location("sources.topics", "https://cms.example.com/topics").is_ok());
        assert!(validate_source_location("sources.topics", "").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("conference.year", 2016, 2000, 2100).is_ok());
        assert!(validate_range("conference.year", 1999, 2000, 2100).is_err());
    }
}
