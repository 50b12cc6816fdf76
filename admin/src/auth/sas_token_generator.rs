use crate::administration::{AdministrationError, AdministrationResult};
use base64::{Engine as _, engine::general_purpose};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Generator for Shared Access Signature (SAS) tokens.
///
/// Signs `url-encoded(resource) + "\n" + expiry` with HMAC-SHA256 using the
/// base64-decoded shared access key. The token is scoped to the resource URI
/// it was generated for; a namespace-level policy accepts tokens for any
/// resource beneath the namespace.
///
/// # Examples
///
/// ```no_run
/// use admin::auth::SasTokenGenerator;
///
/// let generator = SasTokenGenerator::new("RootManageSharedAccessKey", "base64_encoded_key");
/// let token = generator.generate_sas_token(
///     "https://contoso.servicebus.windows.net/orders",
///     chrono::Duration::hours(1),
/// )?;
/// # Ok::<(), admin::administration::AdministrationError>(())
/// ```
#[derive(Clone)]
pub struct SasTokenGenerator {
    key_name: String,
    key: String,
}

impl SasTokenGenerator {
    pub fn new(key_name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            key_name: key_name.into(),
            key: key.into(),
        }
    }

    pub fn key_name(&self) -> &str {
        &self.key_name
    }

    /// Generates a token for `resource_uri` valid for `validity` from now.
    ///
    /// # Errors
    ///
    /// Returns [`AdministrationError::Configuration`] if the key is not
    /// valid base64 or the expiry falls outside the representable range.
    pub fn generate_sas_token(
        &self,
        resource_uri: &str,
        validity: Duration,
    ) -> AdministrationResult<String> {
        let expiry = Utc::now().checked_add_signed(validity).ok_or_else(|| {
            AdministrationError::Configuration(format!(
                "SAS token validity of {} hours is out of range",
                validity.num_hours()
            ))
        })?;
        self.generate_sas_token_with_expiry(resource_uri, expiry.timestamp())
    }

    /// Generates a token with an explicit expiry (seconds since the Unix epoch).
    pub fn generate_sas_token_with_expiry(
        &self,
        resource_uri: &str,
        expiry_timestamp: i64,
    ) -> AdministrationResult<String> {
        let resource = resource_uri.to_lowercase();
        let string_to_sign = format!("{}\n{}", urlencoding::encode(&resource), expiry_timestamp);

        let key_bytes = general_purpose::STANDARD.decode(&self.key).map_err(|e| {
            AdministrationError::Configuration(format!("Failed to decode shared access key: {e}"))
        })?;

        let mut mac = HmacSha256::new_from_slice(&key_bytes).map_err(|e| {
            AdministrationError::Configuration(format!("Failed to create HMAC: {e}"))
        })?;

        mac.update(string_to_sign.as_bytes());
        let signature = mac.finalize();
        let signature_base64 = general_purpose::STANDARD.encode(signature.into_bytes());

        Ok(format!(
            "SharedAccessSignature sr={}&sig={}&se={}&skn={}",
            urlencoding::encode(&resource),
            urlencoding::encode(&signature_base64),
            expiry_timestamp,
            self.key_name
        ))
    }
}

impl std::fmt::Debug for SasTokenGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SasTokenGenerator")
            .field("key_name", &self.key_name)
            .finish_non_exhaustive()
    }
}
