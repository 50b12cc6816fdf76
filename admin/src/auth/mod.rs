pub mod connection_string;
pub mod credential;
pub mod sas_token_generator;

pub use connection_string::ConnectionStringProperties;
pub use credential::{
    BearerTokenCredential, Credential, SharedAccessKeyCredential, SharedAccessSignatureCredential,
};
pub use sas_token_generator::SasTokenGenerator;
