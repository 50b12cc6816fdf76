use super::credential::{
    Credential, SharedAccessKeyCredential, SharedAccessSignatureCredential,
};
use crate::administration::{AdministrationError, AdministrationResult};
use std::fmt;
use std::sync::Arc;
use url::Url;

/// Parsed namespace connection string.
///
/// Accepts the portal format
/// `Endpoint=sb://<ns>.servicebus.windows.net/;SharedAccessKeyName=<name>;SharedAccessKey=<key>`
/// as well as a pre-issued `SharedAccessSignature=` in place of the key pair.
/// `EntityPath` is recorded but administration requests always target the
/// namespace.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionStringProperties {
    endpoint: Url,
    access: SharedAccess,
    entity_path: Option<String>,
}

#[derive(Clone, PartialEq, Eq)]
enum SharedAccess {
    Key { name: String, key: String },
    Signature(String),
}

impl ConnectionStringProperties {
    pub fn parse(value: &str) -> AdministrationResult<Self> {
        if value.trim().is_empty() {
            return Err(AdministrationError::Configuration(
                "Connection string cannot be empty".to_string(),
            ));
        }

        let mut endpoint = None;
        let mut key_name = None;
        let mut key = None;
        let mut signature = None;
        let mut entity_path = None;

        for part in value.split(';') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let Some((name, value)) = part.split_once('=') else {
                return Err(AdministrationError::Configuration(format!(
                    "Connection string segment '{part}' is not a key=value pair"
                )));
            };
            let value = value.trim().to_string();
            match name.trim().to_ascii_lowercase().as_str() {
                "endpoint" => endpoint = Some(value),
                "sharedaccesskeyname" => key_name = Some(value),
                "sharedaccesskey" => key = Some(value),
                "sharedaccesssignature" => signature = Some(value),
                "entitypath" => entity_path = Some(value),
                // UseDevelopmentEmulator and friends do not affect administration.
                _ => {}
            }
        }

        let endpoint = endpoint.ok_or_else(|| {
            AdministrationError::Configuration("Missing Endpoint in connection string".to_string())
        })?;
        let endpoint = management_endpoint(&endpoint)?;

        let access = match (signature, key_name, key) {
            (Some(signature), _, _) => SharedAccess::Signature(signature),
            (None, Some(name), Some(key)) => SharedAccess::Key { name, key },
            (None, None, _) => {
                return Err(AdministrationError::Configuration(
                    "Missing SharedAccessKeyName in connection string".to_string(),
                ));
            }
            (None, Some(_), None) => {
                return Err(AdministrationError::Configuration(
                    "Missing SharedAccessKey in connection string".to_string(),
                ));
            }
        };

        Ok(Self {
            endpoint,
            access,
            entity_path,
        })
    }

    /// HTTPS base URL of the namespace, always ending in `/`.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn fully_qualified_namespace(&self) -> &str {
        self.endpoint.host_str().unwrap_or_default()
    }

    pub fn shared_access_key_name(&self) -> Option<&str> {
        match &self.access {
            SharedAccess::Key { name, .. } => Some(name),
            SharedAccess::Signature(_) => None,
        }
    }

    pub fn entity_path(&self) -> Option<&str> {
        self.entity_path.as_deref()
    }

    /// Credential described by the connection string. A pre-issued signature
    /// wins over a key pair.
    pub fn credential(&self, sas_validity: chrono::Duration) -> Arc<dyn Credential> {
        match &self.access {
            SharedAccess::Signature(signature) => {
                Arc::new(SharedAccessSignatureCredential::new(signature.clone()))
            }
            SharedAccess::Key { name, key } => Arc::new(SharedAccessKeyCredential::new(
                name.clone(),
                key.clone(),
                sas_validity,
            )),
        }
    }
}

impl fmt::Debug for ConnectionStringProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionStringProperties")
            .field("endpoint", &self.endpoint.as_str())
            .field("shared_access_key_name", &self.shared_access_key_name())
            .field("entity_path", &self.entity_path)
            .finish_non_exhaustive()
    }
}

/// `sb://host[:port]/` becomes `https://host[:port]/`; `http(s)` endpoints are kept.
fn management_endpoint(endpoint: &str) -> AdministrationResult<Url> {
    let parsed = Url::parse(endpoint).map_err(|e| {
        AdministrationError::Configuration(format!("Invalid Endpoint '{endpoint}': {e}"))
    })?;
    let host = parsed.host_str().filter(|h| !h.is_empty()).ok_or_else(|| {
        AdministrationError::Configuration(format!("Endpoint '{endpoint}' has no host"))
    })?;

    let scheme = match parsed.scheme() {
        "http" => "http",
        _ => "https",
    };
    let authority = match parsed.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    };
    Url::parse(&format!("{scheme}://{authority}/")).map_err(|e| {
        AdministrationError::Configuration(format!("Invalid Endpoint '{endpoint}': {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use claims::{assert_err, assert_ok, assert_some_eq};

    #[test]
    fn parses_portal_connection_string() {
        let props = assert_ok!(ConnectionStringProperties::parse(
            "Endpoint=sb://contoso.servicebus.windows.net/;SharedAccessKeyName=RootManageSharedAccessKey;SharedAccessKey=c2VjcmV0"
        ));
        assert_eq!(props.endpoint().as_str(), "https://contoso.servicebus.windows.net/");
        assert_eq!(props.fully_qualified_namespace(), "contoso.servicebus.windows.net");
        assert_some_eq!(props.shared_access_key_name(), "RootManageSharedAccessKey");
        assert_eq!(props.entity_path(), None);
    }

    #[test]
    fn keys_are_case_insensitive_and_key_may_contain_equals() {
        let props = assert_ok!(ConnectionStringProperties::parse(
            "endpoint=sb://contoso.servicebus.windows.net;sharedaccesskeyname=p;sharedaccesskey=abc==;EntityPath=orders;"
        ));
        assert_some_eq!(props.entity_path(), "orders");
        assert!(matches!(
            &props.access,
            SharedAccess::Key { name, key } if name == "p" && key == "abc=="
        ));
    }

    #[test]
    fn keeps_explicit_port_for_local_emulators() {
        let props = assert_ok!(ConnectionStringProperties::parse(
            "Endpoint=http://localhost:5300/;SharedAccessSignature=SharedAccessSignature sr=x&sig=y&se=1&skn=z"
        ));
        assert_eq!(props.endpoint().as_str(), "http://localhost:5300/");
    }

    #[test]
    fn rejects_incomplete_strings() {
        assert_err!(ConnectionStringProperties::parse(""));
        assert_err!(ConnectionStringProperties::parse(
            "SharedAccessKeyName=p;SharedAccessKey=k"
        ));
        assert_err!(ConnectionStringProperties::parse(
            "Endpoint=sb://contoso.servicebus.windows.net/;SharedAccessKey=k"
        ));
        assert_err!(ConnectionStringProperties::parse(
            "Endpoint=sb://contoso.servicebus.windows.net/;SharedAccessKeyName=p"
        ));
        assert_err!(ConnectionStringProperties::parse("Endpoint=not a url;SharedAccessSignature=s"));
    }
}
