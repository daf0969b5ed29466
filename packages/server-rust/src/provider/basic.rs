//! Username/password auth module reading credentials from the message map.

use std::collections::BTreeMap;
use std::sync::Arc;

use authbridge_core::{
    AuthConfigProvider, AuthError, AuthStatus, Callback, CallbackHandler, MessageInfo,
    ServerAuthConfig, ServerAuthContext, Subject,
};

/// Message map property holding the username.
pub const USERNAME_PROPERTY: &str = "username";
/// Message map property holding the password.
pub const PASSWORD_PROPERTY: &str = "password";
/// Optional message map property listing asserted groups, comma-separated.
pub const GROUPS_PROPERTY: &str = "groups";
/// The only auth context id this module serves.
pub const BASIC_AUTH_CONTEXT_ID: &str = "basic";

/// Provider of [`BasicServerAuthConfig`]s.
#[derive(Debug, Default)]
pub struct BasicAuthConfigProvider;

impl BasicAuthConfigProvider {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl AuthConfigProvider for BasicAuthConfigProvider {
    fn get_server_auth_config(
        &self,
        layer: &str,
        app_context: &str,
        handler: Arc<dyn CallbackHandler>,
    ) -> Result<Option<Arc<dyn ServerAuthConfig>>, AuthError> {
        Ok(Some(Arc::new(BasicServerAuthConfig {
            layer: layer.to_string(),
            app_context: app_context.to_string(),
            handler,
        })))
    }
}

pub struct BasicServerAuthConfig {
    layer: String,
    app_context: String,
    handler: Arc<dyn CallbackHandler>,
}

impl ServerAuthConfig for BasicServerAuthConfig {
    fn get_message_layer(&self) -> String {
        self.layer.clone()
    }

    fn get_app_context(&self) -> String {
        self.app_context.clone()
    }

    fn get_auth_context_id(&self, _message_info: &MessageInfo) -> Option<String> {
        Some(BASIC_AUTH_CONTEXT_ID.to_string())
    }

    fn refresh(&self) {}

    fn is_protected(&self) -> bool {
        true
    }

    fn get_auth_context(
        &self,
        auth_context_id: Option<&str>,
        _service_subject: Option<&Subject>,
        _properties: &BTreeMap<String, String>,
    ) -> Result<Option<Arc<dyn ServerAuthContext>>, AuthError> {
        match auth_context_id {
            None | Some(BASIC_AUTH_CONTEXT_ID) => Ok(Some(Arc::new(BasicServerAuthContext {
                handler: Arc::clone(&self.handler),
            }))),
            Some(_) => Ok(None),
        }
    }
}

pub struct BasicServerAuthContext {
    handler: Arc<dyn CallbackHandler>,
}

impl ServerAuthContext for BasicServerAuthContext {
    fn validate_request(
        &self,
        message_info: &mut MessageInfo,
        client_subject: &mut Subject,
        _service_subject: Option<&Subject>,
    ) -> Result<AuthStatus, AuthError> {
        let (Some(username), Some(password)) = (
            message_info.property_str(USERNAME_PROPERTY),
            message_info.property_str(PASSWORD_PROPERTY),
        ) else {
            return Ok(AuthStatus::SendContinue);
        };

        let mut check = [Callback::password(username, password)];
        self.handler.handle(&mut check)?;
        if !matches!(
            check[0],
            Callback::PasswordValidation {
                result: Some(true),
                ..
            }
        ) {
            return Ok(AuthStatus::SendFailure);
        }

        let groups: Vec<String> = message_info
            .property_str(GROUPS_PROPERTY)
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|group| !group.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        let mut establish = [
            Callback::CallerPrincipal {
                name: username.to_string(),
            },
            Callback::GroupPrincipal {
                groups: groups.clone(),
            },
        ];
        self.handler.handle(&mut establish)?;
        client_subject.principals.insert(username.to_string());
        client_subject.groups.extend(groups);
        Ok(AuthStatus::Success)
    }

    fn secure_response(
        &self,
        _message_info: &mut MessageInfo,
        _service_subject: Option<&Subject>,
    ) -> Result<AuthStatus, AuthError> {
        Ok(AuthStatus::SendSuccess)
    }

    fn clean_subject(
        &self,
        _message_info: &MessageInfo,
        subject: &mut Subject,
    ) -> Result<(), AuthError> {
        subject.clear();
        Ok(())
    }
}
