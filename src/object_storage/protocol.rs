// Copyright 2024 Dmitry Tantsur <dtantsur@protonmail.com>
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! JSON structures for the object storage API.

/// A container of objects.
#[derive(Debug, Clone, Deserialize)]
pub struct Container {
    /// Container name (also its unique identifier).
    pub name: String,
    /// Total size of the objects in bytes.
    pub bytes: u64,
    /// Number of objects.
    #[serde(rename = "count")]
    pub object_count: u64,
}

/// An object in a container.
#[derive(Debug, Clone, Deserialize)]
pub struct Object {
    /// Object name, unique within its container.
    pub name: String,
    /// Object size in bytes.
    pub bytes: u64,
    /// Content type, if known.
    #[serde(default)]
    pub content_type: Option<String>,
    /// MD5 hash of the content.
    #[serde(default)]
    pub hash: Option<String>,
}

#[cfg(test)]
mod test {
    use super::{Container, Object};

    #[test]
    fn test_container_object_deserialize() {
        let containers: Vec<Container> =
            serde_json::from_str(r#"[{"name": "backups", "bytes": 1024, "count": 3}]"#).unwrap();
        assert_eq!(containers[0].object_count, 3);

        let object: Object = serde_json::from_str(
            r#"{"name": "db.tar.gz", "bytes": 512, "content_type": "application/gzip",
                "hash": "d41d8cd98f00b204e9800998ecf8427e"}"#,
        )
        .unwrap();
        assert_eq!(object.content_type.as_deref(), Some("application/gzip"));
    }
}
