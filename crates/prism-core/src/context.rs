use secrecy::SecretString;

/// Runtime context carried through a single gateway request
///
/// Built once by middleware and handed to every downstream component,
/// so providers and the tool subsystem never touch raw HTTP parts.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Bearer credential presented by the caller, forwarded to upstream
    /// vendors that are configured to accept it
    pub api_key: Option<SecretString>,
    /// Resolved caller, when the identity layer recognized the credential
    pub caller: Option<CallerIdentity>,
}

impl RequestContext {
    /// Create an anonymous context for embedded (non-HTTP) use
    pub fn empty() -> Self {
        Self::default()
    }

    /// The user id attributed to this request, if any
    pub fn user_id(&self) -> Option<&str> {
        self.caller.as_ref().map(|c| c.user_id.as_str())
    }
}

/// Identity of the authenticated caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    /// Stable user identifier used for tool-account lookups
    pub user_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_context_is_anonymous() {
        let ctx = RequestContext::empty();
        assert!(ctx.api_key.is_none());
        assert!(ctx.user_id().is_none());
    }

    #[test]
    fn user_id_comes_from_caller() {
        let ctx = RequestContext {
            api_key: None,
            caller: Some(CallerIdentity {
                user_id: "user-1".to_owned(),
            }),
        };
        assert_eq!(ctx.user_id(), Some("user-1"));
    }
}
