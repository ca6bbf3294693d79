//! Form submission to update-map reconstruction.

use crudmin_router::FormData;

use crate::options::ModelAdmin;

/// Form field carrying the requested action.
pub const ACTION_FIELD: &str = "action";
/// Form field carrying the primary keys selected in a list view.
pub const SELECTED_FIELD: &str = "_selected";

/// Builds the update map handed to [`Accessor::upsert`](crate::Accessor::upsert).
///
/// Every submitted key is kept with all of its values, except read-only and
/// omitted fields and the dispatcher's own `action`/`_selected` keys. Dotted
/// identifiers such as `Parts.0.Name` pass through as flat keys.
pub fn unmarshal(form: &FormData, admin: &ModelAdmin) -> FormData {
    form.iter()
        .filter(|(key, _)| {
            let key = key.as_str();
            key != ACTION_FIELD
                && key != SELECTED_FIELD
                && !admin.is_readonly(key)
                && !admin.is_omitted(key)
        })
        .map(|(key, values)| (key.clone(), values.clone()))
        .collect()
}

/// Returns the primary keys selected in a list form.
pub fn selected_ids(form: &FormData) -> Vec<String> {
    form.get_all(SELECTED_FIELD).to_vec()
}
