//! Declarative top-level scalar fields
//!
//! Scalars need no companion validation, so each one is a table row: a
//! schema plus a getter and a setter on the wrapper. One generic
//! expand/flatten turns every row into a registered field.

use spotform_core::field::{FieldCategory, FieldError, FieldMap, FieldResult, GenericField};
use spotform_core::resource::{ResourceData, Value};
use spotform_core::schema::AttributeSchema;

/// Reads the current value out of the wrapper's object
pub type Getter<W> = fn(&W) -> Option<Value>;

/// Writes a value into the wrapper's object; `None` clears it
pub type Setter<W> = fn(&mut W, Option<&Value>);

pub struct ScalarField<W> {
    pub category: FieldCategory,
    pub schema: AttributeSchema,
    pub get: Getter<W>,
    pub set: Setter<W>,
    /// Treat a configured zero value as absent
    pub zero_as_absent: bool,
}

impl<W: 'static> ScalarField<W> {
    pub fn new(
        category: FieldCategory,
        schema: AttributeSchema,
        get: Getter<W>,
        set: Setter<W>,
    ) -> Self {
        Self {
            category,
            schema,
            get,
            set,
            zero_as_absent: false,
        }
    }

    /// Send a configured zero as a removal rather than as a value
    pub fn zero_as_absent(mut self) -> Self {
        self.zero_as_absent = true;
        self
    }

    /// Create sends only present values; update also clears removed ones.
    ///
    /// A configured zero is a value unless the row opted into
    /// [`ScalarField::zero_as_absent`].
    pub fn into_field(self) -> GenericField<W> {
        let Self {
            category,
            schema,
            get,
            set,
            zero_as_absent,
        } = self;
        let name = schema.name.clone();
        let zero = schema.attr_type.zero_value();

        let read_name = name.clone();
        let create_name = name.clone();
        let update_name = name;

        GenericField::new(category, schema)
            .on_read(move |w: &mut W, d| {
                let value = get(w).unwrap_or_else(|| zero.clone());
                d.set(&read_name, value)
                    .map_err(|e| FieldError::write_back(read_name.as_str(), e))
            })
            .on_create(move |w: &mut W, d| {
                if let Some(value) = configured(d, &create_name, zero_as_absent) {
                    set(w, Some(value));
                }
                Ok(())
            })
            .on_update(move |w: &mut W, d| {
                set(w, configured(d, &update_name, zero_as_absent));
                Ok(())
            })
    }
}

fn configured<'a>(d: &'a ResourceData, name: &str, zero_as_absent: bool) -> Option<&'a Value> {
    if zero_as_absent {
        d.get_ok(name)
    } else {
        d.get(name)
    }
}

/// Register every row of a scalar table
pub fn register_all<W: 'static>(
    fields: &mut FieldMap<W>,
    table: Vec<ScalarField<W>>,
) -> FieldResult<()> {
    for row in table {
        fields.register(row.into_field())?;
    }
    Ok(())
}
