//! Bind request and response
//!
//! ```text
//! BindRequest ::= [APPLICATION 0] SEQUENCE {
//!      version                 INTEGER (1 ..  127),
//!      name                    LDAPDN,
//!      authentication          AuthenticationChoice }
//!
//! AuthenticationChoice ::= CHOICE {
//!      simple                  [0] OCTET STRING,
//!      sasl                    [3] SaslCredentials,
//!      ...  }
//!
//! BindResponse ::= [APPLICATION 1] SEQUENCE {
//!      COMPONENTS OF LDAPResult,
//!      serverSaslCreds    [7] OCTET STRING OPTIONAL }
//! ```

use super::{ProtocolOpCodec, ProtocolOpType};
use crate::result::LdapResultComponents;
use bytes::Bytes;
use ldap_asn1::BerElement;
use ldap_core::{DecodeContext, LdapError, LdapResult};

pub const TYPE_CREDENTIALS_SIMPLE: u8 = 0x80;
pub const TYPE_CREDENTIALS_SASL: u8 = 0xA3;
pub const TYPE_SERVER_SASL_CREDENTIALS: u8 = 0x87;

/// LDAP protocol version sent by this implementation
pub const LDAP_VERSION_3: i32 = 3;

/// Authentication choice of a bind request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindCredentials {
    Simple(Bytes),
    Sasl {
        mechanism: String,
        credentials: Option<Bytes>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindRequestProtocolOp {
    version: i32,
    bind_dn: String,
    credentials: BindCredentials,
}

impl BindRequestProtocolOp {
    pub fn new(version: i32, bind_dn: impl Into<String>, credentials: BindCredentials) -> Self {
        Self {
            version,
            bind_dn: bind_dn.into(),
            credentials,
        }
    }

    /// LDAPv3 simple bind
    pub fn simple(bind_dn: impl Into<String>, password: Bytes) -> Self {
        Self::new(LDAP_VERSION_3, bind_dn, BindCredentials::Simple(password))
    }

    /// LDAPv3 SASL bind
    pub fn sasl(
        bind_dn: impl Into<String>,
        mechanism: impl Into<String>,
        credentials: Option<Bytes>,
    ) -> Self {
        Self::new(
            LDAP_VERSION_3,
            bind_dn,
            BindCredentials::Sasl {
                mechanism: mechanism.into(),
                credentials,
            },
        )
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    pub fn bind_dn(&self) -> &str {
        &self.bind_dn
    }

    pub fn credentials(&self) -> &BindCredentials {
        &self.credentials
    }
}

impl ProtocolOpCodec for BindRequestProtocolOp {
    const TYPE: ProtocolOpType = ProtocolOpType::BindRequest;

    fn encode_protocol_op(&self) -> BerElement {
        let credentials = match &self.credentials {
            BindCredentials::Simple(password) => {
                BerElement::octet_string(TYPE_CREDENTIALS_SIMPLE, password.clone())
            }
            BindCredentials::Sasl {
                mechanism,
                credentials,
            } => {
                let mut elements = vec![BerElement::universal_octet_string(mechanism.clone())];
                if let Some(credentials) = credentials {
                    elements.push(BerElement::universal_octet_string(credentials.clone()));
                }
                BerElement::sequence(TYPE_CREDENTIALS_SASL, &elements)
            }
        };

        BerElement::sequence(
            Self::TYPE.tag(),
            &[
                BerElement::universal_integer(i64::from(self.version)),
                BerElement::universal_octet_string(self.bind_dn.clone()),
                credentials,
            ],
        )
    }

    fn decode_content(element: &BerElement) -> LdapResult<Self> {
        let elements = element.decode_as_sequence()?;
        if elements.len() != 3 {
            return Err(LdapError::decoding(format!(
                "bind request must have 3 elements, got {}",
                elements.len()
            )));
        }

        let version = elements[0]
            .decode_as_integer()
            .decoding_context(|| "cannot decode the protocol version")?;
        let bind_dn = elements[1]
            .decode_as_string()
            .decoding_context(|| "cannot decode the bind DN")?;

        let credentials = match elements[2].tag() {
            TYPE_CREDENTIALS_SIMPLE => {
                BindCredentials::Simple(elements[2].decode_as_octet_string())
            }
            TYPE_CREDENTIALS_SASL => {
                let sasl = elements[2]
                    .decode_as_sequence()
                    .decoding_context(|| "cannot decode the SASL credentials")?;
                if sasl.is_empty() || sasl.len() > 2 {
                    return Err(LdapError::decoding(format!(
                        "SASL credentials must have 1 or 2 elements, got {}",
                        sasl.len()
                    )));
                }
                let mechanism = sasl[0]
                    .decode_as_string()
                    .decoding_context(|| "cannot decode the SASL mechanism")?;
                BindCredentials::Sasl {
                    mechanism,
                    credentials: sasl.get(1).map(BerElement::decode_as_octet_string),
                }
            }
            other => {
                return Err(LdapError::decoding(format!(
                    "unsupported authentication type 0x{:02x}",
                    other
                )));
            }
        };

        Ok(Self::new(version, bind_dn, credentials))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindResponseProtocolOp {
    result: LdapResultComponents,
    server_sasl_credentials: Option<Bytes>,
}

impl BindResponseProtocolOp {
    pub fn new(result: LdapResultComponents, server_sasl_credentials: Option<Bytes>) -> Self {
        Self {
            result,
            server_sasl_credentials,
        }
    }

    pub fn result(&self) -> &LdapResultComponents {
        &self.result
    }

    pub fn server_sasl_credentials(&self) -> Option<&Bytes> {
        self.server_sasl_credentials.as_ref()
    }
}

impl ProtocolOpCodec for BindResponseProtocolOp {
    const TYPE: ProtocolOpType = ProtocolOpType::BindResponse;

    fn encode_protocol_op(&self) -> BerElement {
        let mut elements = Vec::with_capacity(5);
        self.result.encode_into(&mut elements);
        if let Some(credentials) = &self.server_sasl_credentials {
            elements.push(BerElement::octet_string(
                TYPE_SERVER_SASL_CREDENTIALS,
                credentials.clone(),
            ));
        }
        BerElement::sequence(Self::TYPE.tag(), &elements)
    }

    fn decode_content(element: &BerElement) -> LdapResult<Self> {
        let elements = element.decode_as_sequence()?;
        let (result, consumed) = LdapResultComponents::decode_from(&elements)?;

        let mut server_sasl_credentials = None;
        for e in &elements[consumed..] {
            match e.tag() {
                TYPE_SERVER_SASL_CREDENTIALS if server_sasl_credentials.is_none() => {
                    server_sasl_credentials = Some(e.decode_as_octet_string());
                }
                other => {
                    return Err(LdapError::decoding(format!(
                        "unexpected bind response element type 0x{:02x}",
                        other
                    )));
                }
            }
        }

        Ok(Self::new(result, server_sasl_credentials))
    }
}
