use figment::Jail;
use ragchat_core::config::{EmbeddingProvider, Settings};

#[test]
fn defaults_are_valid() {
    let settings = Settings::default();
    settings.validate().expect("defaults validate");
    assert_eq!(settings.chunk_size, 1000);
    assert_eq!(settings.chunk_overlap, 200);
    assert_eq!(settings.top_k, 5);
    assert_eq!(settings.history_capacity, 10);
}

#[test]
fn env_overrides_file_and_defaults() {
    Jail::expect_with(|jail| {
        jail.create_file("config.toml", r#"
            chunk_size = 800
            model = "llama3"

            [embedding]
            provider = "fake"
            dimension = 64
        "#)?;
        jail.set_env("RAGCHAT_CHUNK_OVERLAP", "100");
        jail.set_env("RAGCHAT_GENERATION__MAX_RETRIES", "3");

        let settings = Settings::from_figment(Settings::figment_for_env("dev")).map_err(|e| e.to_string())?;
        assert_eq!(settings.chunk_size, 800);
        assert_eq!(settings.chunk_overlap, 100);
        assert_eq!(settings.model, "llama3");
        assert_eq!(settings.embedding.provider, EmbeddingProvider::Fake);
        assert_eq!(settings.embedding.dimension, 64);
        assert_eq!(settings.generation.max_retries, 3);
        assert_eq!(settings.top_k, 5, "untouched keys keep defaults");
        Ok(())
    });
}

#[test]
fn env_specific_file_is_layered() {
    Jail::expect_with(|jail| {
        jail.create_file("config.toml", "top_k = 4")?;
        jail.create_file("config.prod.toml", "top_k = 8")?;
        let dev = Settings::from_figment(Settings::figment_for_env("dev")).map_err(|e| e.to_string())?;
        let prod = Settings::from_figment(Settings::figment_for_env("prod")).map_err(|e| e.to_string())?;
        assert_eq!(dev.top_k, 4);
        assert_eq!(prod.top_k, 8);
        Ok(())
    });
}

#[test]
fn overlap_not_below_size_is_fatal() {
    Jail::expect_with(|jail| {
        jail.set_env("RAGCHAT_CHUNK_SIZE", "200");
        jail.set_env("RAGCHAT_CHUNK_OVERLAP", "200");
        let err = Settings::from_figment(Settings::figment_for_env("dev")).unwrap_err();
        assert!(err.to_string().contains("chunk_overlap"));
        Ok(())
    });
}

#[test]
fn invalid_values_are_rejected() {
    let mut s = Settings::default();
    s.top_k = 0;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.history_capacity = 0;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.ollama_url = "localhost:11434".to_string();
    assert!(s.validate().is_err());

    Jail::expect_with(|jail| {
        jail.set_env("RAGCHAT_TOP_K", "many");
        assert!(Settings::from_figment(Settings::figment_for_env("dev")).is_err());
        Ok(())
    });
}
