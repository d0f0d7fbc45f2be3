//! A `serde`-able wrapper around [`RoaringTreemap`], which does not
//! implement `Serialize`/`Deserialize` itself. Round-trips through
//! roaring's own portable byte format rather than reimplementing bitmap
//! encoding.

use std::ops::{Deref, DerefMut};

use roaring::RoaringTreemap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TreemapField(pub RoaringTreemap);

impl Deref for TreemapField {
    type Target = RoaringTreemap;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for TreemapField {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<RoaringTreemap> for TreemapField {
    fn from(bitmap: RoaringTreemap) -> Self {
        TreemapField(bitmap)
    }
}

impl Serialize for TreemapField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut buf = Vec::new();
        self.0.serialize_into(&mut buf).map_err(serde::ser::Error::custom)?;
        serializer.serialize_bytes(&buf)
    }
}

impl<'de> Deserialize<'de> for TreemapField {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bytes: Vec<u8> = Vec::<u8>::deserialize(deserializer)?;
        let bitmap = RoaringTreemap::deserialize_from(&bytes[..]).map_err(serde::de::Error::custom)?;
        Ok(TreemapField(bitmap))
    }
}
