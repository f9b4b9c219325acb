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

//! Internal macros.

/// Define a string enumeration used in the wire protocol.
///
/// Generates `Display`, `FromStr`, `Serialize` and `Deserialize`
/// implementations based on the provided string values.
macro_rules! protocol_enum {
    {$(#[$attr:meta])* enum $name:ident { $($item:ident = $val:literal),+ }} => (
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $(
                #[allow(missing_docs)]
                $item,
            )+
        }

        impl $name {
            /// String representation used in the API.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$item => $val,)+
                }
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::Error;

            fn from_str(value: &str) -> $crate::Result<$name> {
                match value {
                    $($val => Ok($name::$item),)+
                    other => Err($crate::Error::new(
                        $crate::ErrorKind::InvalidResponse,
                        format!("Invalid {} value: {}", stringify!($name), other),
                    )),
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> String {
                String::from(value.as_str())
            }
        }

        impl ::serde::ser::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error>
            where
                S: ::serde::ser::Serializer,
            {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> ::serde::de::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::std::result::Result<$name, D::Error>
            where
                D: ::serde::de::Deserializer<'de>,
            {
                let value: String = ::serde::de::Deserialize::deserialize(deserializer)?;
                value.parse().map_err(::serde::de::Error::custom)
            }
        }
    );
}

/// Implement `Stateful` for a protocol structure with a `status` field.
macro_rules! stateful_resource {
    ($name:ident, $state:ty) => {
        impl $crate::common::Stateful for $name {
            type State = $state;

            #[inline]
            fn state(&self) -> $state {
                self.status
            }
        }
    };
}

/// Define a `FetchStatus` adapter calling a provider method.
macro_rules! status_source {
    ($(#[$attr:meta])* $name:ident: $api:ident::$call:ident -> $entity:ty) => {
        $(#[$attr])*
        #[derive(Debug)]
        pub struct $name<'p, P: ?Sized>(&'p P);

        #[async_trait::async_trait]
        impl<'p, P: $api + ?Sized> $crate::common::FetchStatus for $name<'p, P> {
            type Entity = $entity;

            async fn fetch_status(&self, id: &str) -> $crate::Result<$entity> {
                self.0.$call(id).await
            }
        }
    };
}

/// Define a `ResourceQuery` adapter calling a provider listing method.
macro_rules! list_query {
    ($(#[$attr:meta])* $name:ident: $api:ident::$call:ident -> $item:ty, marker $marker:ident, limit $limit:expr) => {
        $(#[$attr])*
        #[derive(Debug)]
        pub struct $name<'p, P: ?Sized>(&'p P);

        #[async_trait::async_trait]
        impl<'p, P: $api + ?Sized> $crate::common::ResourceQuery for $name<'p, P> {
            type Item = $item;

            const DEFAULT_LIMIT: usize = $limit;

            fn extract_marker(&self, resource: &$item) -> String {
                resource.$marker.clone()
            }

            async fn fetch_chunk(
                &self,
                limit: Option<usize>,
                marker: Option<String>,
            ) -> $crate::Result<Vec<$item>> {
                self.0.$call(marker, limit).await
            }
        }
    };
}

#[cfg(test)]
mod test {
    protocol_enum! {
        #[doc = "Test enumeration."]
        enum TestStatus {
            Active = "ACTIVE",
            Building = "BUILD"
        }
    }

    #[test]
    fn test_protocol_enum_roundtrip() {
        assert_eq!(TestStatus::Active.to_string(), "ACTIVE");
        assert_eq!("BUILD".parse::<TestStatus>().unwrap(), TestStatus::Building);
        let value: TestStatus = serde_json::from_str("\"ACTIVE\"").unwrap();
        assert_eq!(value, TestStatus::Active);
        assert_eq!(serde_json::to_string(&TestStatus::Building).unwrap(), "\"BUILD\"");
    }

    #[test]
    fn test_protocol_enum_unknown_value() {
        let err = "SHELVED".parse::<TestStatus>().unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::InvalidResponse);
        assert!(serde_json::from_str::<TestStatus>("\"SHELVED\"").is_err());
    }
}
