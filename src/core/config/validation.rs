use thiserror::Error;

use super::schema::AppConfig;

#[derive(Debug, Error)]
#[error("invalid config at '{path}': {message}")]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

pub fn validate_config(config: &AppConfig) -> Result<(), ValidationError> {
    let server = &config.server;
    validate_non_empty_string("server.host", &server.host)?;
    validate_u64_range("server.port", u64::from(server.port), 1, 65535)?;
    for (index, origin) in server.cors_allowed_origins.iter().enumerate() {
        validate_non_empty_string(&format!("server.cors_allowed_origins[{}]", index), origin)?;
    }

    let model = &config.model;
    validate_non_empty_string("model.name", &model.name)?;
    validate_non_empty_string("model.tokenizer_path", &model.tokenizer_path)?;
    validate_non_empty_string("model.eos_token", &model.eos_token)?;
    validate_url("model.server_url", &model.server_url)?;
    validate_u64_range(
        "model.max_position_embeddings",
        model.max_position_embeddings as u64,
        2,
        10_000_000,
    )?;
    validate_u64_range(
        "model.startup_retries",
        u64::from(model.startup_retries),
        1,
        10_000,
    )?;

    let generation = &config.generation;
    validate_u64_range(
        "generation.max_new_tokens",
        generation.max_new_tokens as u64,
        1,
        model.max_position_embeddings.saturating_sub(1) as u64,
    )?;
    validate_u64_range(
        "generation.num_return_sequences",
        u64::from(generation.num_return_sequences),
        1,
        1,
    )?;
    validate_u64_range(
        "generation.no_repeat_ngram_size",
        u64::from(generation.no_repeat_ngram_size),
        0,
        64,
    )?;
    validate_u64_range("generation.top_k", u64::from(generation.top_k), 0, 100_000)?;
    validate_f32_range("generation.temperature", generation.temperature, 0.0, 10.0)?;

    let session = &config.session;
    validate_cookie_name("session.cookie_name", &session.cookie_name)?;
    validate_u64_range(
        "session.sweep_interval_secs",
        session.sweep_interval_secs,
        1,
        86_400,
    )?;

    Ok(())
}

fn validate_non_empty_string(path: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(config_error(path, "must be a non-empty string"));
    }
    Ok(())
}

fn validate_u64_range(path: &str, value: u64, min: u64, max: u64) -> Result<(), ValidationError> {
    if value < min || value > max {
        return Err(config_error(
            path,
            &format!("must be between {} and {}", min, max),
        ));
    }
    Ok(())
}

fn validate_f32_range(path: &str, value: f32, min: f32, max: f32) -> Result<(), ValidationError> {
    if !value.is_finite() || value < min || value > max {
        return Err(config_error(
            path,
            &format!("must be between {} and {}", min, max),
        ));
    }
    Ok(())
}

fn validate_url(path: &str, value: &str) -> Result<(), ValidationError> {
    let trimmed = value.trim();
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(config_error(path, "must be an http(s) URL"));
    }
    Ok(())
}

fn validate_cookie_name(path: &str, value: &str) -> Result<(), ValidationError> {
    validate_non_empty_string(path, value)?;
    let valid = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !valid {
        return Err(config_error(
            path,
            "may only contain ASCII letters, digits, '_' and '-'",
        ));
    }
    Ok(())
}

fn config_error(path: &str, message: &str) -> ValidationError {
    ValidationError {
        path: path.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn reply_budget_must_fit_inside_context() {
        let mut config = AppConfig::default();
        config.generation.max_new_tokens = config.model.max_position_embeddings;

        let err = validate_config(&config).unwrap_err();

        assert_eq!(err.path, "generation.max_new_tokens");
    }

    #[test]
    fn only_single_sequence_generation_is_supported() {
        let mut config = AppConfig::default();
        config.generation.num_return_sequences = 3;

        let err = validate_config(&config).unwrap_err();

        assert_eq!(err.path, "generation.num_return_sequences");
    }

    #[test]
    fn rejects_non_finite_temperature() {
        let mut config = AppConfig::default();
        config.generation.temperature = f32::NAN;

        let err = validate_config(&config).unwrap_err();

        assert_eq!(err.path, "generation.temperature");
    }

    #[test]
    fn rejects_cookie_names_with_separators() {
        let mut config = AppConfig::default();
        config.session.cookie_name = "chat;session".to_string();

        let err = validate_config(&config).unwrap_err();

        assert_eq!(err.path, "session.cookie_name");
    }

    #[test]
    fn rejects_non_http_model_server() {
        let mut config = AppConfig::default();
        config.model.server_url = "localhost:8088".to_string();

        let err = validate_config(&config).unwrap_err();

        assert_eq!(err.path, "model.server_url");
        assert!(err.to_string().contains("http(s) URL"));
    }

    #[test]
    fn rejects_blank_cors_origin() {
        let mut config = AppConfig::default();
        config.server.cors_allowed_origins = vec!["http://localhost:3000".into(), "  ".into()];

        let err = validate_config(&config).unwrap_err();

        assert_eq!(err.path, "server.cors_allowed_origins[1]");
    }
}
