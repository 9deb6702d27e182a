use bitcoin::consensus::{Decodable, Encodable};
use cosmwasm_schema::schemars::{gen, schema, JsonSchema};
use cosmwasm_schema::serde::{de, ser, Deserialize, Serialize};
use cosmwasm_std::Binary;
use derive_more::{Deref, DerefMut};

/// A wrapper that lets types from the `bitcoin` crate round-trip through
/// CosmWasm's JSON storage layer via their consensus (byte-exact) encoding.
#[derive(Clone, Debug, PartialEq, Deref, DerefMut)]
pub struct Adapter<T> {
    inner: T,
}

impl<T> Adapter<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T> From<T> for Adapter<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T: Default> Default for Adapter<T> {
    fn default() -> Self {
        Self {
            inner: Default::default(),
        }
    }
}

impl<T: Copy> Copy for Adapter<T> {}

/// Serialises as the hex-free raw bytes of the consensus encoding, base64'd
/// by `Binary` the way any other CosmWasm byte field would be.
impl<T: Encodable> Serialize for Adapter<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        let mut dest = Vec::new();
        self.inner
            .consensus_encode(&mut dest)
            .map_err(ser::Error::custom)?;
        Binary::from(dest).serialize(serializer)
    }
}

impl<'de, T: Decodable> Deserialize<'de> for Adapter<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        let v = Binary::deserialize(deserializer)?;
        let inner: T = Decodable::consensus_decode(&mut v.as_slice()).map_err(de::Error::custom)?;
        Ok(inner.into())
    }
}

impl<T> JsonSchema for Adapter<T> {
    fn schema_name() -> String {
        Binary::schema_name()
    }

    fn schema_id() -> std::borrow::Cow<'static, str> {
        Binary::schema_id()
    }

    fn json_schema(gen: &mut gen::SchemaGenerator) -> schema::Schema {
        Binary::json_schema(gen)
    }
}
