/// Declares an `info` payload struct together with its key table.
///
/// Required keys become plain fields, optional keys become `Option<T>` fields that are
/// skipped when absent. The JSON key of each field is given after `=`.
macro_rules! variant_info {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            required { $( $(#[$rmeta:meta])* $rfield:ident : $rty:ty = $rkey:literal ),* $(,)? }
            optional { $( $(#[$ometa:meta])* $ofield:ident : $oty:ty = $okey:literal ),* $(,)? }
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, ::serde::Serialize, ::serde::Deserialize)]
        $vis struct $name {
            $(
                $(#[$rmeta])*
                #[serde(rename = $rkey)]
                pub $rfield: $rty,
            )*
            $(
                $(#[$ometa])*
                #[serde(rename = $okey, default, skip_serializing_if = "Option::is_none")]
                pub $ofield: Option<$oty>,
            )*
        }

        impl $crate::codec::InfoShape for $name {
            const KEYS: &'static [$crate::codec::InfoKey] = &[
                $( $crate::codec::InfoKey::required($rkey), )*
                $( $crate::codec::InfoKey::optional($okey), )*
            ];
        }
    };
}

/// Declares a `{type, info}` enum, its serde representation and its shape table.
macro_rules! define_variants {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident as $field:literal {
            $( $(#[$vmeta:meta])* $variant:ident = $tag:literal => $info:ty ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, ::serde::Serialize)]
        #[serde(tag = "type", content = "info")]
        $vis enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $tag)]
                $variant($info),
            )*
        }

        // Goes through the shape table so every decode path accepts a missing `info` and
        // rejects keys the variant does not permit.
        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::std::result::Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                #[derive(::serde::Deserialize)]
                #[serde(tag = "type", content = "info")]
                enum Tagged {
                    $(
                        #[serde(rename = $tag)]
                        $variant($info),
                    )*
                }

                let raw = <::serde_json::Value as ::serde::Deserialize>::deserialize(deserializer)?;
                let normalized = $crate::codec::normalize::<Self>(&raw, $field)
                    .map_err(<D::Error as ::serde::de::Error>::custom)?;
                let tagged: Tagged = ::serde_json::from_value(normalized)
                    .map_err(<D::Error as ::serde::de::Error>::custom)?;
                Ok(match tagged {
                    $( Tagged::$variant(info) => $name::$variant(info), )*
                })
            }
        }

        impl $crate::codec::TaggedUnion for $name {
            const FIELD: &'static str = $field;
            const SHAPES: &'static [$crate::codec::VariantShape] = &[
                $(
                    $crate::codec::VariantShape {
                        tag: $tag,
                        keys: <$info as $crate::codec::InfoShape>::KEYS,
                    },
                )*
            ];

            fn tag(&self) -> &'static str {
                match self {
                    $( $name::$variant(_) => $tag, )*
                }
            }
        }
    };
}

pub(crate) use define_variants;
pub(crate) use variant_info;
