//! Runtime wiring from [`AppConfig`] to a ready-to-ask agent.

use std::sync::Arc;

use fagent::{
    AgentConfig, AgentEventStream, AgentPolicy, AgentRequest, AgentTurnResult, ChatAgent,
};
use fcommon::SpecId;
use fobserve::{SafeAgentHooks, SafeRequestHooks, SafeToolHooks, TracingObservabilityHooks};
use fopenapi::{
    HttpTransport, OpenApiTools, RequestExecutor, ReqwestTransport, SpecService, ToolAssembler,
};
use fprovider::adapters::openai::OpenAiProvider;
use fprovider::{Message, ModelRouter, ProviderId, ProviderRegistry};
use fstore::{SpecStore, create_spec_store};
use ftooling::ToolRegistry;

use crate::{AppConfig, ProviderKeys, SpecAgentError};

/// Spec service, tool factory, and agent sharing one configuration.
#[derive(Clone)]
pub struct SpecAgentRuntime {
    config: AppConfig,
    specs: SpecService,
    tools: OpenApiTools,
    agent: ChatAgent,
}

impl SpecAgentRuntime {
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn specs(&self) -> &SpecService {
        &self.specs
    }

    pub fn tools(&self) -> &OpenApiTools {
        &self.tools
    }

    pub fn agent(&self) -> &ChatAgent {
        &self.agent
    }

    pub fn agent_config(&self) -> AgentConfig {
        self.config.agent.clone()
    }

    /// Asks the configured agent without tools.
    pub async fn ask(&self, messages: Vec<Message>) -> Result<AgentTurnResult, SpecAgentError> {
        let request = AgentRequest::new(self.agent_config(), messages);
        Ok(self.agent.run(request).await?)
    }

    /// Asks the configured agent with every operation of a stored spec as a tool.
    pub async fn ask_with_spec(
        &self,
        spec_id: &SpecId,
        messages: Vec<Message>,
    ) -> Result<AgentTurnResult, SpecAgentError> {
        let request = self.spec_request(spec_id, messages).await?;
        Ok(self.agent.run(request).await?)
    }

    pub async fn stream_with_spec<'a>(
        &'a self,
        spec_id: &SpecId,
        messages: Vec<Message>,
    ) -> Result<AgentEventStream<'a>, SpecAgentError> {
        let request = self.spec_request(spec_id, messages).await?;
        Ok(self.agent.stream(request).await?)
    }

    async fn spec_request(
        &self,
        spec_id: &SpecId,
        messages: Vec<Message>,
    ) -> Result<AgentRequest, SpecAgentError> {
        let registry: ToolRegistry = self.tools.registry_for_spec(spec_id).await?;
        tracing::debug!(
            phase = "runtime",
            event = "spec_tools_loaded",
            spec_id = %spec_id,
            tool_count = registry.len() as u64
        );

        Ok(AgentRequest::new(self.agent_config(), messages)
            .with_tools(Arc::new(registry))
            .with_metadata("spec_id", spec_id.to_string()))
    }
}

/// Opens the configured store and builds a reqwest-backed runtime.
///
/// Adapters for configured provider keys are added to `providers` unless the
/// caller already registered that provider.
pub fn build_runtime(
    config: AppConfig,
    mut providers: ProviderRegistry,
) -> Result<SpecAgentRuntime, SpecAgentError> {
    let store = create_spec_store(config.store_config())?;
    let client = reqwest::Client::builder()
        .timeout(config.http_timeout)
        .build()
        .map_err(|error| SpecAgentError::config(format!("failed to build HTTP client: {error}")))?;

    // Model calls stream for as long as the model talks, so only connecting is bounded.
    let model_client = reqwest::Client::builder()
        .connect_timeout(config.http_timeout)
        .build()
        .map_err(|error| SpecAgentError::config(format!("failed to build HTTP client: {error}")))?;
    register_configured_providers(&mut providers, &config.provider_keys, &model_client);

    Ok(build_runtime_with(
        config,
        ModelRouter::with_providers(providers),
        store,
        Arc::new(ReqwestTransport::new(client)),
    ))
}

fn register_configured_providers(
    providers: &mut ProviderRegistry,
    keys: &ProviderKeys,
    client: &reqwest::Client,
) {
    for provider in keys.configured() {
        if providers.contains(provider) {
            continue;
        }

        match (provider, keys.get(provider)) {
            (ProviderId::OpenAi, Some(key)) => {
                providers.register(OpenAiProvider::over_http(key, client.clone()));
                tracing::debug!(
                    phase = "runtime",
                    event = "provider_registered",
                    provider = %provider
                );
            }
            _ => tracing::warn!(
                phase = "runtime",
                event = "provider_key_unused",
                provider = %provider,
                "no built-in adapter for this provider; register one before building the runtime"
            ),
        }
    }
}

/// Builds a runtime over an explicit store and HTTP transport.
pub fn build_runtime_with(
    config: AppConfig,
    router: ModelRouter,
    store: Arc<dyn SpecStore>,
    transport: Arc<dyn HttpTransport>,
) -> SpecAgentRuntime {
    let executor = RequestExecutor::new(transport)
        .with_hooks(Arc::new(SafeRequestHooks::new(TracingObservabilityHooks)));

    let mut assembler = ToolAssembler::new(executor);
    if let Some(base_url) = &config.openapi_base_url {
        assembler = assembler.with_base_url_override(base_url.clone());
    }

    let specs = SpecService::new(store);
    let tools = OpenApiTools::new(specs.clone(), assembler);

    let agent = ChatAgent::new(router)
        .with_policy(
            AgentPolicy::default().with_max_tool_round_trips(config.max_tool_round_trips),
        )
        .with_hooks(Arc::new(SafeAgentHooks::new(TracingObservabilityHooks)))
        .with_tool_hooks(Arc::new(SafeToolHooks::new(TracingObservabilityHooks)));

    SpecAgentRuntime {
        config,
        specs,
        tools,
        agent,
    }
}
