//! Controller registry
//!
//! `call:` directives name a controller and a method. Instead of resolving
//! classes reflectively at runtime, controllers register here at startup
//! under their public name and dispatch method names themselves. The
//! invocation contract is `(request, response)`: a controller reads the
//! request and writes its outcome into the response; a returned error is
//! caught at the facade boundary and carried in the response, never raised.

use std::collections::HashMap;
use std::sync::Arc;

use crate::rpc::{ActionRequest, ActionResponse};

/// A named unit of imperative business logic callable from directives.
pub trait Controller: Send + Sync {
    /// The name `call:` directives resolve this controller under.
    fn name(&self) -> &str;

    /// Invoke one method. Unknown method names and any internal fault are
    /// reported through `Err`; the facade records them into the response.
    fn invoke(
        &self,
        method: &str,
        request: &ActionRequest,
        response: &mut ActionResponse,
    ) -> anyhow::Result<()>;
}

/// All controllers known to one engine, keyed by registered name.
#[derive(Default, Clone)]
pub struct ControllerRegistry {
    controllers: HashMap<String, Arc<dyn Controller>>,
}

impl ControllerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, controller: Arc<dyn Controller>) {
        self.controllers
            .insert(controller.name().to_string(), controller);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Controller>> {
        self.controllers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.controllers.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }
}
