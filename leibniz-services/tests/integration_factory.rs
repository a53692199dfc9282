//! Integration: client factory selection
//!
//! Drives `ClientFactory` through an injected environment so the signals can
//! be flipped between calls without touching the process environment.

use std::sync::Arc;

use leibniz_services::factory::{
    ClientFactory, EnvSource, StaticEnv, CODEX_ENVIRONMENT_ENV, LEIBNIZ_USE_MOCKS_ENV,
};
use leibniz_services::settings::ServiceSettings;

fn factory(env: &Arc<StaticEnv>) -> ClientFactory {
    ClientFactory::new(ServiceSettings::default()).with_env(Arc::clone(env) as Arc<dyn EnvSource>)
}

fn simulation_flags(factory: &ClientFactory) -> [bool; 6] {
    let settings = factory.settings().clone();
    [
        factory.cache_client(&settings.cache_options()).is_simulation(),
        factory.graph_client(&settings.graph_options()).is_simulation(),
        factory.vector_client(&settings.vector_options()).is_simulation(),
        factory.search_client(&settings.search_options()).is_simulation(),
        factory
            .language_model_client(&settings.language_model_options())
            .is_simulation(),
        factory
            .document_parser(&settings.document_parser_options())
            .is_simulation(),
    ]
}

#[test]
fn test_override_yields_all_simulators() {
    for key in [CODEX_ENVIRONMENT_ENV, LEIBNIZ_USE_MOCKS_ENV] {
        let env = Arc::new(StaticEnv::new());
        env.set(key, "true");
        assert_eq!(simulation_flags(&factory(&env)), [true; 6], "{key} did not force simulators");
    }
}

#[test]
fn test_simulator_names() {
    let env = Arc::new(StaticEnv::new());
    env.set(LEIBNIZ_USE_MOCKS_ENV, "true");
    let factory = factory(&env);
    let settings = factory.settings().clone();

    assert_eq!(factory.cache_client(&settings.cache_options()).name(), "sim-cache");
    assert_eq!(factory.graph_client(&settings.graph_options()).name(), "sim-graph");
    assert_eq!(factory.vector_client(&settings.vector_options()).name(), "sim-vector");
    assert_eq!(factory.search_client(&settings.search_options()).name(), "sim-search");
    assert_eq!(
        factory
            .language_model_client(&settings.language_model_options())
            .name(),
        "sim-llm"
    );
    assert_eq!(
        factory
            .document_parser(&settings.document_parser_options())
            .name(),
        "sim-parser"
    );
}

#[cfg(not(any(
    feature = "redis",
    feature = "neo4j",
    feature = "qdrant",
    feature = "meilisearch",
    feature = "openai"
)))]
#[test]
fn test_missing_backends_fall_back_to_simulators() {
    let env = Arc::new(StaticEnv::new());
    let factory = factory(&env);

    assert!(!factory.simulation_mode());
    assert_eq!(simulation_flags(&factory), [true; 6]);
}

#[cfg(feature = "redis")]
#[test]
fn test_real_cache_when_enabled() {
    let env = Arc::new(StaticEnv::new());
    let factory = factory(&env);

    // Construction does not connect, so no server is needed.
    let cache = factory.cache_client(&factory.settings().cache_options());
    assert!(!cache.is_simulation());
    assert_eq!(cache.name(), "redis");
}

#[cfg(feature = "openai")]
#[test]
fn test_language_model_without_key_falls_back() {
    let env = Arc::new(StaticEnv::new());
    let factory = factory(&env);

    let llm = factory.language_model_client(&factory.settings().language_model_options());
    assert!(llm.is_simulation());

    let settings = ServiceSettings::default().with_openai_api_key("sk-test");
    let llm = factory.language_model_client(&settings.language_model_options());
    assert!(!llm.is_simulation());
}

#[test]
fn test_signal_is_read_per_call() {
    let env = Arc::new(StaticEnv::new());
    let factory = factory(&env);
    let options = factory.settings().cache_options();

    env.set(LEIBNIZ_USE_MOCKS_ENV, "true");
    assert!(factory.simulation_mode());
    assert!(factory.cache_client(&options).is_simulation());

    env.set(LEIBNIZ_USE_MOCKS_ENV, "false");
    assert!(!factory.simulation_mode());

    env.set(CODEX_ENVIRONMENT_ENV, "TRUE");
    assert!(factory.simulation_mode());
}

#[tokio::test]
async fn test_separate_calls_do_not_share_state() {
    let env = Arc::new(StaticEnv::new());
    env.set(LEIBNIZ_USE_MOCKS_ENV, "true");
    let factory = factory(&env);
    let options = factory.settings().cache_options();

    let first = factory.cache_client(&options);
    let second = factory.cache_client(&options);

    first.set("k", "v").await.unwrap();
    assert_eq!(first.get("k").await.unwrap().as_deref(), Some("v"));
    assert_eq!(second.get("k").await.unwrap(), None);
}

#[test]
fn test_parser_is_simulated_without_signal() {
    let env = Arc::new(StaticEnv::new());
    let factory = factory(&env);

    let parser = factory.document_parser(&factory.settings().document_parser_options());
    assert!(parser.is_simulation());
}
