//! The JOSE header model.
//!
//! A [`Header`] is one JSON object of header parameters. A JWS or JWE may
//! carry several of them: one integrity protected header and any number of
//! unprotected ones, which are merged into a [`JoseHeader`].

mod critical;
mod error;
mod parameter;
mod value;

use alloc::{
    borrow::ToOwned,
    collections::BTreeSet,
    string::String,
    vec::Vec,
};
use core::fmt;

use hashbrown::DefaultHashBuilder;
use indexmap::IndexMap;
use mediatype::MediaTypeBuf;
use serde::{
    de::{self, MapAccess, Visitor},
    ser::SerializeMap as _,
    Deserialize, Deserializer, Serialize, Serializer,
};
use serde_json::Value;

pub(crate) use self::{critical::TokenKind, parameter::is_jwt};
#[doc(inline)]
pub use self::{error::Error, parameter::Parameter, value::HeaderValue};
use crate::{
    jwa::{JsonWebAlgorithm, JsonWebCompressionAlgorithm, JsonWebContentEncryptionAlgorithm},
    Base64UrlString,
};

type Parameters = IndexMap<String, Parameter, DefaultHashBuilder>;

/// An ordered set of header parameters, unique by name.
///
/// A header is never modified in place, [`Header::with_parameters`] returns an
/// extended copy.
///
/// ```
/// # use jwx::header::{Header, Parameter};
/// let base = Header::new().with_parameter(Parameter::KeyId("a".into()));
/// let extended = base.with_parameter(Parameter::KeyId("b".into()));
///
/// assert_eq!(base.key_id(), Some("a"));
/// assert_eq!(extended.key_id(), Some("b"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Header {
    parameters: Parameters,
}

impl Header {
    /// Creates an empty header.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of this header with `parameters` added. A parameter
    /// that already exists is replaced, keeping its position.
    #[must_use]
    pub fn with_parameters(&self, parameters: impl IntoIterator<Item = Parameter>) -> Self {
        let mut header = self.clone();
        for parameter in parameters {
            header
                .parameters
                .insert(parameter.name().to_owned(), parameter);
        }
        header
    }

    /// Returns a copy of this header with a single parameter added.
    #[must_use]
    pub fn with_parameter(&self, parameter: Parameter) -> Self {
        self.with_parameters([parameter])
    }

    /// Parses a header from its JSON representation.
    ///
    /// # Errors
    ///
    /// Returns an error if `json` is not an object, contains a member twice
    /// or a registered parameter has an invalid value.
    pub fn from_slice(json: &[u8]) -> Result<Self, Error> {
        let Members(members) = serde_json::from_slice(json)?;
        Self::from_members(members)
    }

    /// Builds a header from an already parsed JSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` is not an object or a registered parameter
    /// has an invalid value.
    pub fn from_value(value: Value) -> Result<Self, Error> {
        match value {
            Value::Object(members) => Self::from_members(members),
            _ => Err(Error::NotAnObject),
        }
    }

    fn from_members(members: impl IntoIterator<Item = (String, Value)>) -> Result<Self, Error> {
        let mut parameters = Parameters::default();
        for (name, value) in members {
            if parameters.contains_key(&name) {
                return Err(Error::DuplicateParameter(name));
            }
            let parameter = Parameter::parse(&name, value)?;
            parameters.insert(name, parameter);
        }
        Ok(Self { parameters })
    }

    /// The base64url encoded JSON of this header, as it is used as the
    /// first segment of a compact token.
    pub(crate) fn encode(&self) -> Result<Base64UrlString, serde_json::Error> {
        serde_json::to_vec(self).map(Base64UrlString::encode)
    }

    /// Looks up a parameter by its member name.
    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.parameters.get(name)
    }

    /// Returns `true` if a parameter with the member name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.parameters.contains_key(name)
    }

    /// Iterates over all parameters in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.values()
    }

    /// Iterates over the member names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.parameters.keys().map(String::as_str)
    }

    /// The number of parameters.
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    /// Returns `true` if there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// The `alg` parameter.
    pub fn algorithm(&self) -> Option<&JsonWebAlgorithm> {
        match self.get("alg")? {
            Parameter::Algorithm(alg) => Some(alg),
            _ => None,
        }
    }

    /// The `enc` parameter.
    pub fn content_encryption(&self) -> Option<&JsonWebContentEncryptionAlgorithm> {
        match self.get("enc")? {
            Parameter::ContentEncryption(enc) => Some(enc),
            _ => None,
        }
    }

    /// The `zip` parameter.
    pub fn compression(&self) -> Option<&JsonWebCompressionAlgorithm> {
        match self.get("zip")? {
            Parameter::Compression(zip) => Some(zip),
            _ => None,
        }
    }

    /// The `kid` parameter.
    pub fn key_id(&self) -> Option<&str> {
        match self.get("kid")? {
            Parameter::KeyId(kid) => Some(kid),
            _ => None,
        }
    }

    /// The `typ` parameter.
    pub fn typ(&self) -> Option<&MediaTypeBuf> {
        match self.get("typ")? {
            Parameter::Type(typ) => Some(typ),
            _ => None,
        }
    }

    /// The `cty` parameter.
    pub fn content_type(&self) -> Option<&MediaTypeBuf> {
        match self.get("cty")? {
            Parameter::ContentType(cty) => Some(cty),
            _ => None,
        }
    }

    /// The `crit` parameter.
    pub fn critical(&self) -> Option<&[String]> {
        match self.get("crit")? {
            Parameter::Critical(names) => Some(names),
            _ => None,
        }
    }

    /// The `b64` parameter.
    pub fn base64_payload(&self) -> Option<bool> {
        match self.get("b64")? {
            Parameter::Base64Payload(b64) => Some(*b64),
            _ => None,
        }
    }
}

impl FromIterator<Parameter> for Header {
    fn from_iter<T: IntoIterator<Item = Parameter>>(iter: T) -> Self {
        Self::new().with_parameters(iter)
    }
}

impl Serialize for Header {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.parameters.len()))?;
        for (name, parameter) in &self.parameters {
            map.serialize_entry(name, parameter)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Header {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Members(members) = Members::deserialize(deserializer)?;
        Self::from_members(members).map_err(de::Error::custom)
    }
}

/// The members of a JSON object in order, duplicates included.
struct Members(Vec<(String, Value)>);

impl<'de> Deserialize<'de> for Members {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct MembersVisitor;

        impl<'de> Visitor<'de> for MembersVisitor {
            type Value = Members;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object of header parameters")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut members = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, Value>()? {
                    members.push(entry);
                }
                Ok(Members(members))
            }
        }

        deserializer.deserialize_map(MembersVisitor)
    }
}

/// The merged view of the protected header and the unprotected headers of a
/// JWS or JWE.
///
/// No member name appears in more than one of the merged headers.
#[derive(Debug, Clone, PartialEq)]
pub struct JoseHeader {
    protected: Header,
    unprotected: Vec<Header>,
}

impl JoseHeader {
    /// Merges `protected` with the `unprotected` headers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotDisjoint`] if a member name appears twice.
    pub fn new(protected: Header, unprotected: Vec<Header>) -> Result<Self, Error> {
        let mut seen: BTreeSet<&str> = protected.names().collect();
        for header in &unprotected {
            for name in header.names() {
                if !seen.insert(name) {
                    return Err(Error::NotDisjoint(name.to_owned()));
                }
            }
        }

        Ok(Self {
            protected,
            unprotected,
        })
    }

    /// Merges `protected` with at most one unprotected header, as found in a
    /// flattened serialization.
    pub(crate) fn flattened(protected: Header, unprotected: Option<Header>) -> Result<Self, Error> {
        Self::new(protected, unprotected.into_iter().collect())
    }

    /// Applies the `crit` and `b64` rules for a token of `kind`.
    pub(crate) fn check_critical(&self, kind: TokenKind) -> Result<(), Error> {
        critical::check(self, kind)
    }

    /// The integrity protected header.
    pub fn protected(&self) -> &Header {
        &self.protected
    }

    /// The unprotected headers.
    pub fn unprotected(&self) -> &[Header] {
        &self.unprotected
    }

    /// Looks up a parameter in all headers.
    pub fn get(&self, name: &str) -> Option<HeaderValue<&Parameter>> {
        self.find(|h| h.get(name))
    }

    /// Returns `true` if any of the headers contains `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// The `alg` parameter.
    pub fn algorithm(&self) -> Option<HeaderValue<&JsonWebAlgorithm>> {
        self.find(Header::algorithm)
    }

    /// The `enc` parameter.
    pub fn content_encryption(&self) -> Option<HeaderValue<&JsonWebContentEncryptionAlgorithm>> {
        self.find(Header::content_encryption)
    }

    /// The `zip` parameter.
    pub fn compression(&self) -> Option<HeaderValue<&JsonWebCompressionAlgorithm>> {
        self.find(Header::compression)
    }

    /// The `kid` parameter.
    pub fn key_id(&self) -> Option<HeaderValue<&str>> {
        self.find(Header::key_id)
    }

    /// The `cty` parameter.
    pub fn content_type(&self) -> Option<HeaderValue<&MediaTypeBuf>> {
        self.find(Header::content_type)
    }

    fn find<'a, T: ?Sized + 'a>(
        &'a self,
        f: impl Fn(&'a Header) -> Option<&'a T>,
    ) -> Option<HeaderValue<&'a T>> {
        if let Some(v) = f(&self.protected) {
            return Some(HeaderValue::Protected(v));
        }
        self.unprotected
            .iter()
            .find_map(|h| f(h))
            .map(HeaderValue::Unprotected)
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use serde_json::json;

    use super::*;
    use crate::jwa::{Hmac, JsonWebSigningAlgorithm};

    #[test]
    fn with_parameters_is_copy_on_write() {
        let base: Header = [Parameter::KeyId("1".into()), Parameter::Base64Payload(true)]
            .into_iter()
            .collect();
        let extended = base.with_parameters([
            Parameter::Algorithm(JsonWebSigningAlgorithm::Hmac(Hmac::Hs256).into()),
            Parameter::KeyId("2".into()),
        ]);

        assert_eq!(base.len(), 2);
        assert_eq!(base.key_id(), Some("1"));
        assert_eq!(extended.len(), 3);
        assert_eq!(extended.key_id(), Some("2"));
        assert_eq!(
            extended.names().collect::<Vec<_>>(),
            ["kid", "b64", "alg"]
        );
    }

    #[test]
    fn rejects_duplicate_members() {
        let err = Header::from_slice(br#"{"alg":"HS256","kid":"a","alg":"none"}"#).unwrap_err();
        assert!(matches!(err, Error::DuplicateParameter(name) if name == "alg"));

        assert!(serde_json::from_str::<Header>(r#"{"kid":"a","kid":"a"}"#).is_err());
    }

    #[test]
    fn rejects_non_objects() {
        assert!(matches!(Header::from_slice(b"[]"), Err(Error::Json(_))));
        assert!(matches!(
            Header::from_value(json!("alg")),
            Err(Error::NotAnObject)
        ));
    }

    #[test]
    fn keeps_member_order() {
        let json = r#"{"typ":"JWT","alg":"HS256","x":[1,2]}"#;
        let header = Header::from_slice(json.as_bytes()).unwrap();
        assert_eq!(serde_json::to_string(&header).unwrap(), json);
        assert!(matches!(
            header.get("x"),
            Some(Parameter::Other { value, .. }) if *value == json!([1, 2])
        ));
    }

    #[test]
    fn merged_view() {
        let protected = Header::from_value(json!({"alg": "A128KW", "enc": "A128GCM"})).unwrap();
        let unprotected = Header::from_value(json!({"kid": "k"})).unwrap();
        let header = JoseHeader::new(protected.clone(), vec![unprotected]).unwrap();

        assert!(header.algorithm().unwrap().is_protected());
        assert_eq!(header.key_id(), Some(HeaderValue::Unprotected("k")));
        assert!(header.get("zip").is_none());

        let clash = Header::from_value(json!({"enc": "A256GCM"})).unwrap();
        assert!(matches!(
            JoseHeader::new(protected, vec![clash]),
            Err(Error::NotDisjoint(name)) if name == "enc"
        ));
    }
}
