use super::sas_token_generator::SasTokenGenerator;
use crate::administration::AdministrationResult;
use async_trait::async_trait;

/// Produces the `Authorization` header value for a management request.
///
/// `resource` is the request URL without its query string; SAS credentials
/// sign for it, bearer credentials ignore it.
#[async_trait]
pub trait Credential: Send + Sync {
    async fn authorization(&self, resource: &str) -> AdministrationResult<String>;
}

/// Signs every request with a fresh SAS token from a shared access key.
#[derive(Debug, Clone)]
pub struct SharedAccessKeyCredential {
    generator: SasTokenGenerator,
    validity: chrono::Duration,
}

impl SharedAccessKeyCredential {
    pub fn new(key_name: impl Into<String>, key: impl Into<String>, validity: chrono::Duration) -> Self {
        Self {
            generator: SasTokenGenerator::new(key_name, key),
            validity,
        }
    }
}

#[async_trait]
impl Credential for SharedAccessKeyCredential {
    async fn authorization(&self, resource: &str) -> AdministrationResult<String> {
        self.generator.generate_sas_token(resource, self.validity)
    }
}

/// A pre-issued `SharedAccessSignature …` token, sent as is.
#[derive(Clone)]
pub struct SharedAccessSignatureCredential {
    signature: String,
}

impl SharedAccessSignatureCredential {
    pub fn new(signature: impl Into<String>) -> Self {
        Self {
            signature: signature.into(),
        }
    }
}

#[async_trait]
impl Credential for SharedAccessSignatureCredential {
    async fn authorization(&self, _resource: &str) -> AdministrationResult<String> {
        Ok(self.signature.clone())
    }
}

/// A static Azure AD access token. Acquiring and refreshing it is the
/// caller's job.
#[derive(Clone)]
pub struct BearerTokenCredential {
    token: String,
}

impl BearerTokenCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl Credential for BearerTokenCredential {
    async fn authorization(&self, _resource: &str) -> AdministrationResult<String> {
        Ok(format!("Bearer {}", self.token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bearer_prefixes_token() {
        let credential = BearerTokenCredential::new("eyJ0eXAi");
        assert_eq!(
            credential.authorization("https://a/").await.unwrap(),
            "Bearer eyJ0eXAi"
        );
    }

    #[tokio::test]
    async fn shared_access_key_signs_for_resource() {
        let credential =
            SharedAccessKeyCredential::new("policy", "c2VjcmV0LWtleQ==", chrono::Duration::hours(1));
        let header = credential
            .authorization("https://contoso.servicebus.windows.net/orders")
            .await
            .unwrap();
        assert!(header.starts_with("SharedAccessSignature sr=https%3A%2F%2Fcontoso"));
        assert!(header.ends_with("&skn=policy"));
    }
}
