/// Define an API object whose fields are all [`Optional`](crate::Optional).
///
/// Each field is declared as `field / setter: Type = "jsonName"`. The macro
/// generates the struct, one setter per field (`None` records an explicit
/// clear), the force-send list, `null_fields()` and a sparse `Serialize`
/// implementation.
macro_rules! api_object {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field:ident / $setter:ident : $ty:ty = $json:literal,
            )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, serde::Deserialize)]
        #[serde(default)]
        pub struct $name {
            $(
                $(#[$field_meta])*
                #[serde(rename = $json)]
                pub $field: $crate::optional::Optional<$ty>,
            )*
            #[serde(skip)]
            force_send_fields: Vec<String>,
        }

        impl $name {
            $(
                pub fn $setter(&mut self, value: Option<$ty>) -> &mut Self {
                    self.$field = $crate::optional::Optional::from_option(value);
                    self
                }
            )*

            /// Send a field (by upper-camel name) even when it is unset
            pub fn force_send(&mut self, field: &str) -> &mut Self {
                if !self.force_send_fields.iter().any(|f| f == field) {
                    self.force_send_fields.push(field.to_string());
                }
                self
            }

            pub fn force_send_fields(&self) -> &[String] {
                &self.force_send_fields
            }

            /// Upper-camel names of the fields explicitly cleared
            pub fn null_fields(&self) -> Vec<String> {
                let mut fields = Vec::new();
                $(
                    if self.$field.is_null() {
                        fields.push($crate::jsonutil::go_name($json));
                    }
                )*
                fields
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                use serde::ser::SerializeMap;
                let mut map = serializer.serialize_map(None)?;
                $(
                    $crate::jsonutil::serialize_entry(
                        &mut map,
                        $json,
                        &self.$field,
                        &self.force_send_fields,
                    )?;
                )*
                map.end()
            }
        }
    };
}
