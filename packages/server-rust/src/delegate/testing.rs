//! Collaborators shared by the delegate tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use authbridge_core::{
    AuthConfigProvider, AuthError, AuthStatus, Callback, CallbackError, CallbackHandler,
    MessageInfo, ServerAuthConfig, ServerAuthContext, Subject,
};
use parking_lot::Mutex;

/// Handler that stamps its tag into every `CallerPrincipal` callback.
pub(crate) struct TagHandler {
    tag: String,
    calls: AtomicU32,
}

impl TagHandler {
    pub(crate) fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            calls: AtomicU32::new(0),
        }
    }

    pub(crate) fn arc(tag: &str) -> Arc<dyn CallbackHandler> {
        Arc::new(Self::new(tag))
    }

    pub(crate) fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CallbackHandler for TagHandler {
    fn handle(&self, callbacks: &mut [Callback]) -> Result<(), CallbackError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        for callback in callbacks {
            match callback {
                Callback::CallerPrincipal { name } => name.clone_from(&self.tag),
                other => {
                    return Err(CallbackError::Unsupported {
                        kind: other.kind().to_string(),
                    })
                }
            }
        }
        Ok(())
    }
}

/// Asks `handler` which tag it answers with.
pub(crate) fn observed_tag(handler: &dyn CallbackHandler) -> String {
    try_observed_tag(handler).expect("tag handler failed")
}

/// Like [`observed_tag`] but surfaces the handler's error.
pub(crate) fn try_observed_tag(handler: &dyn CallbackHandler) -> Result<String, CallbackError> {
    let mut callbacks = [Callback::CallerPrincipal {
        name: String::new(),
    }];
    handler.handle(&mut callbacks)?;
    match &callbacks[0] {
        Callback::CallerPrincipal { name } => Ok(name.clone()),
        other => unreachable!("callback kind changed to {}", other.kind()),
    }
}

// ---------------------------------------------------------------------------
// Echo provider: reports which real handler each call observed
// ---------------------------------------------------------------------------

/// Tag reported by echo objects when the stand-in has nothing to forward to.
pub(crate) const NO_DELEGATE: &str = "<none>";

fn echo(handler: &dyn CallbackHandler) -> String {
    try_observed_tag(handler).unwrap_or_else(|_| NO_DELEGATE.to_string())
}

/// Provider whose configs and contexts report, through their return values,
/// the tag of whichever real handler the stand-in forwarded to.
#[derive(Default)]
pub(crate) struct EchoProvider {
    /// Tag observed while the provider itself was being asked for a config.
    pub(crate) observed_on_create: Mutex<Option<String>>,
    /// Handler the provider was given.
    pub(crate) given_handler: Mutex<Option<Arc<dyn CallbackHandler>>>,
    /// Return no config at all.
    pub(crate) yields_nothing: bool,
}

impl AuthConfigProvider for EchoProvider {
    fn get_server_auth_config(
        &self,
        layer: &str,
        app_context: &str,
        handler: Arc<dyn CallbackHandler>,
    ) -> Result<Option<Arc<dyn ServerAuthConfig>>, AuthError> {
        *self.observed_on_create.lock() = Some(echo(handler.as_ref()));
        *self.given_handler.lock() = Some(Arc::clone(&handler));
        if self.yields_nothing {
            return Ok(None);
        }
        Ok(Some(Arc::new(EchoConfig {
            handler,
            layer: layer.to_string(),
            app_context: app_context.to_string(),
            refreshed_with: Mutex::new(Vec::new()),
        })))
    }
}

pub(crate) struct EchoConfig {
    pub(crate) handler: Arc<dyn CallbackHandler>,
    pub(crate) layer: String,
    pub(crate) app_context: String,
    pub(crate) refreshed_with: Mutex<Vec<String>>,
}

impl EchoConfig {
    pub(crate) fn new(handler: Arc<dyn CallbackHandler>) -> Self {
        Self {
            handler,
            layer: "HttpServlet".to_string(),
            app_context: "/app".to_string(),
            refreshed_with: Mutex::new(Vec::new()),
        }
    }
}

impl ServerAuthConfig for EchoConfig {
    fn get_message_layer(&self) -> String {
        format!("{}:{}", self.layer, echo(self.handler.as_ref()))
    }

    fn get_app_context(&self) -> String {
        format!("{}:{}", self.app_context, echo(self.handler.as_ref()))
    }

    fn get_auth_context_id(&self, _message_info: &MessageInfo) -> Option<String> {
        Some(echo(self.handler.as_ref()))
    }

    fn refresh(&self) {
        let tag = echo(self.handler.as_ref());
        self.refreshed_with.lock().push(tag);
    }

    fn is_protected(&self) -> bool {
        try_observed_tag(self.handler.as_ref()).is_ok()
    }

    fn get_auth_context(
        &self,
        auth_context_id: Option<&str>,
        _service_subject: Option<&Subject>,
        _properties: &BTreeMap<String, String>,
    ) -> Result<Option<Arc<dyn ServerAuthContext>>, AuthError> {
        try_observed_tag(self.handler.as_ref())?;
        if auth_context_id == Some("missing") {
            return Ok(None);
        }
        Ok(Some(Arc::new(EchoContext {
            handler: Arc::clone(&self.handler),
        })))
    }
}

pub(crate) struct EchoContext {
    pub(crate) handler: Arc<dyn CallbackHandler>,
}

impl ServerAuthContext for EchoContext {
    fn validate_request(
        &self,
        _message_info: &mut MessageInfo,
        client_subject: &mut Subject,
        _service_subject: Option<&Subject>,
    ) -> Result<AuthStatus, AuthError> {
        let tag = try_observed_tag(self.handler.as_ref())?;
        client_subject.principals.insert(tag);
        Ok(AuthStatus::Success)
    }

    fn secure_response(
        &self,
        message_info: &mut MessageInfo,
        _service_subject: Option<&Subject>,
    ) -> Result<AuthStatus, AuthError> {
        let tag = try_observed_tag(self.handler.as_ref())?;
        message_info
            .map
            .insert("secured_by".to_string(), tag.into());
        Ok(AuthStatus::SendSuccess)
    }

    fn clean_subject(
        &self,
        _message_info: &MessageInfo,
        subject: &mut Subject,
    ) -> Result<(), AuthError> {
        let tag = try_observed_tag(self.handler.as_ref())?;
        subject.principals.remove(&tag);
        Ok(())
    }
}
