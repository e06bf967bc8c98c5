//! Engine assembly
//!
//! One [`Engine`] bundles the startup-built registries and the external
//! collaborators. It is immutable once built and shared behind `Arc`; each
//! incoming request gets its own [`ActionHandler`] created from it.
//!
//! [`ActionHandler`]: crate::handler::ActionHandler

use std::sync::Arc;

use crate::actions::ActionRegistry;
use crate::config::EngineConfig;
use crate::controllers::{Controller, ControllerRegistry};
use crate::error::ConfigError;
use crate::gateway::{EntityGateway, NoSession, SessionProvider};
use crate::model::ModelRegistry;
use crate::script::ScriptEvaluator;

pub struct Engine {
    models: ModelRegistry,
    actions: ActionRegistry,
    controllers: ControllerRegistry,
    gateway: Arc<dyn EntityGateway>,
    scripting: Arc<dyn ScriptEvaluator>,
    session: Arc<dyn SessionProvider>,
}

impl Engine {
    /// Start assembling an engine from its two required collaborators.
    pub fn builder(
        gateway: Arc<dyn EntityGateway>,
        scripting: Arc<dyn ScriptEvaluator>,
    ) -> EngineBuilder {
        EngineBuilder {
            models: ModelRegistry::new(),
            actions: ActionRegistry::new(),
            controllers: ControllerRegistry::new(),
            gateway,
            scripting,
            session: Arc::new(NoSession),
        }
    }

    pub fn models(&self) -> &ModelRegistry {
        &self.models
    }

    pub fn actions(&self) -> &ActionRegistry {
        &self.actions
    }

    pub fn controllers(&self) -> &ControllerRegistry {
        &self.controllers
    }

    pub fn gateway(&self) -> &Arc<dyn EntityGateway> {
        &self.gateway
    }

    pub fn scripting(&self) -> &Arc<dyn ScriptEvaluator> {
        &self.scripting
    }

    pub fn session(&self) -> &Arc<dyn SessionProvider> {
        &self.session
    }
}

pub struct EngineBuilder {
    models: ModelRegistry,
    actions: ActionRegistry,
    controllers: ControllerRegistry,
    gateway: Arc<dyn EntityGateway>,
    scripting: Arc<dyn ScriptEvaluator>,
    session: Arc<dyn SessionProvider>,
}

impl EngineBuilder {
    /// Load models and actions from one declarative config.
    pub fn config(mut self, config: EngineConfig) -> Result<Self, ConfigError> {
        self.models = ModelRegistry::from_models(config.models);
        self.actions = ActionRegistry::from_actions(config.actions)?;
        Ok(self)
    }

    pub fn models(mut self, models: ModelRegistry) -> Self {
        self.models = models;
        self
    }

    pub fn actions(mut self, actions: ActionRegistry) -> Self {
        self.actions = actions;
        self
    }

    pub fn controllers(mut self, controllers: ControllerRegistry) -> Self {
        self.controllers = controllers;
        self
    }

    pub fn register_controller(mut self, controller: Arc<dyn Controller>) -> Self {
        self.controllers.register(controller);
        self
    }

    pub fn session(mut self, session: Arc<dyn SessionProvider>) -> Self {
        self.session = session;
        self
    }

    pub fn build(self) -> Arc<Engine> {
        Arc::new(Engine {
            models: self.models,
            actions: self.actions,
            controllers: self.controllers,
            gateway: self.gateway,
            scripting: self.scripting,
            session: self.session,
        })
    }
}
