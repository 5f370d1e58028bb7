//! Sales channel context: language chain, sales channel and version used to scope every search.

use crate::error::AppError;
use crate::settings::Settings;
use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use std::sync::Arc;
use uuid::Uuid;

pub const LANGUAGE_HEADER: &str = "sw-language-id";
pub const SALES_CHANNEL_HEADER: &str = "sw-sales-channel-id";
pub const VERSION_HEADER: &str = "sw-version-id";

/// Host system language; the last entry of every language chain.
pub const SYSTEM_LANGUAGE_ID: Uuid = Uuid::from_u128(0x2fbb5fe2_e29a_4d70_aa58_54ce7ce3e20b);
/// Host live version for versioned entities.
pub const LIVE_VERSION_ID: Uuid = Uuid::from_u128(0x0fa91ce3_e96a_4bc2_be4b_d9ce752c3425);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SalesChannelContext {
    /// Current language first, then fallbacks; never empty.
    pub language_chain: Vec<Uuid>,
    pub sales_channel_id: Option<Uuid>,
    pub version_id: Uuid,
}

impl SalesChannelContext {
    pub fn new(language_id: Uuid, sales_channel_id: Option<Uuid>) -> Self {
        let mut language_chain = vec![language_id];
        if language_id != SYSTEM_LANGUAGE_ID {
            language_chain.push(SYSTEM_LANGUAGE_ID);
        }
        SalesChannelContext {
            language_chain,
            sales_channel_id,
            version_id: LIVE_VERSION_ID,
        }
    }

    pub fn with_version(mut self, version_id: Uuid) -> Self {
        self.version_id = version_id;
        self
    }

    pub fn language_id(&self) -> Uuid {
        self.language_chain[0]
    }
}

impl Default for SalesChannelContext {
    fn default() -> Self {
        SalesChannelContext::new(SYSTEM_LANGUAGE_ID, None)
    }
}

fn header_uuid(parts: &Parts, name: &str) -> Result<Option<Uuid>, AppError> {
    let Some(value) = parts.headers.get(name) else {
        return Ok(None);
    };
    let s = value
        .to_str()
        .map_err(|_| AppError::BadRequest(format!("{} must be ascii", name)))?
        .trim();
    if s.is_empty() {
        return Ok(None);
    }
    Uuid::parse_str(s)
        .map(Some)
        .map_err(|_| AppError::BadRequest(format!("{} must be a uuid", name)))
}

/// Builds the context from `sw-*` headers, falling back to configured defaults.
#[async_trait]
impl<S> FromRequestParts<S> for SalesChannelContext
where
    S: Send + Sync,
    Arc<Settings>: axum::extract::FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let settings: Arc<Settings> = axum::extract::FromRef::from_ref(state);
        let language_id = header_uuid(parts, LANGUAGE_HEADER)?.unwrap_or(settings.default_language_id);
        let sales_channel_id = header_uuid(parts, SALES_CHANNEL_HEADER)?.or(settings.default_sales_channel_id);
        let version_id = header_uuid(parts, VERSION_HEADER)?.unwrap_or(LIVE_VERSION_ID);
        Ok(SalesChannelContext::new(language_id, sales_channel_id).with_version(version_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_falls_back_to_system_language() {
        let de = Uuid::new_v4();
        let ctx = SalesChannelContext::new(de, None);
        assert_eq!(ctx.language_chain, vec![de, SYSTEM_LANGUAGE_ID]);
        assert_eq!(ctx.language_id(), de);
        assert_eq!(SalesChannelContext::default().language_chain, vec![SYSTEM_LANGUAGE_ID]);
    }

    #[test]
    fn system_language_constant_matches_host_id() {
        assert_eq!(SYSTEM_LANGUAGE_ID.simple().to_string(), "2fbb5fe2e29a4d70aa5854ce7ce3e20b");
        assert_eq!(LIVE_VERSION_ID.simple().to_string(), "0fa91ce3e96a4bc2be4bd9ce752c3425");
    }

    #[tokio::test]
    async fn headers_override_defaults_and_reject_garbage() {
        let settings = Arc::new(Settings::for_tests());
        let de = Uuid::new_v4();
        let req = axum::http::Request::builder()
            .header(LANGUAGE_HEADER, de.to_string())
            .body(())
            .unwrap();
        let (mut parts, _) = req.into_parts();
        let ctx = SalesChannelContext::from_request_parts(&mut parts, &settings).await.unwrap();
        assert_eq!(ctx.language_id(), de);
        assert_eq!(ctx.version_id, LIVE_VERSION_ID);

        let req = axum::http::Request::builder()
            .header(LANGUAGE_HEADER, "not-a-uuid")
            .body(())
            .unwrap();
        let (mut parts, _) = req.into_parts();
        let err = SalesChannelContext::from_request_parts(&mut parts, &settings).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
