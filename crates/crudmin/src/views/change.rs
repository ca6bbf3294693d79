//! Admin change/create form, save and delete.

use crudmin_router::FormData;

use crate::error::{AdminError, StoreError};
use crate::form::unmarshal;
use crate::marshal::{marshal, values_map};
use crate::record::Record;
use crate::site::{AdminSite, ModelRegistration, ADD_PK};

use super::{AdminResponse, ChangePage, Message, Page, PageContext};

/// Renders the change form of an existing record.
pub async fn change_view(
    site: &AdminSite,
    reg: &ModelRegistration,
    pk: &str,
    message: Option<Message>,
) -> AdminResponse {
    match reg.admin.accessor().get(pk).await {
        Ok(record) => change_page(site, reg, pk, record.as_ref(), message),
        Err(StoreError::NotFound) => AdminError::NotFound.into_response(),
        Err(StoreError::InvalidId) => AdminError::InvalidId.into_response(),
        Err(err) => {
            tracing::error!(model = %reg.admin.name, pk = %pk, error = %err, "get failed");
            AdminResponse::ServerError(err.to_string())
        }
    }
}

/// Renders the create form from the accessor's prototype.
pub fn create_view(site: &AdminSite, reg: &ModelRegistration, message: Option<Message>) -> AdminResponse {
    let prototype = reg.admin.accessor().prototype();
    change_page(site, reg, ADD_PK, prototype.as_ref(), message)
}

/// Saves a submitted change form.
///
/// Only the unmarshaled values reach the store; an empty update skips it.
/// Afterwards the user is sent back to the list, or with `continue_editing`
/// the change form of the saved record is shown again.
pub async fn save_view(
    site: &AdminSite,
    reg: &ModelRegistration,
    pk: &str,
    form: &FormData,
    continue_editing: bool,
) -> AdminResponse {
    let values = unmarshal(form, &reg.admin);
    let saved_pk = if values.is_empty() {
        tracing::debug!(model = %reg.admin.name, pk = %pk, "nothing to save");
        pk.to_string()
    } else {
        let target = if pk == ADD_PK { "" } else { pk };
        match reg.admin.accessor().upsert(target, &values).await {
            Ok(saved) => {
                tracing::info!(model = %reg.admin.name, pk = %saved, "saved record");
                saved
            }
            Err(err) => {
                tracing::warn!(model = %reg.admin.name, pk = %pk, error = %err, "save rejected");
                return AdminError::from(err).into_response();
            }
        }
    };

    if !continue_editing {
        return AdminResponse::Redirect(site.list_url(&reg.slug));
    }
    if saved_pk == ADD_PK {
        return create_view(site, reg, None);
    }
    change_view(site, reg, &saved_pk, Some(Message::success("Saved."))).await
}

/// Deletes a record and returns to the list.
pub async fn delete_view(site: &AdminSite, reg: &ModelRegistration, pk: &str) -> AdminResponse {
    match reg.admin.accessor().delete(pk).await {
        Ok(()) => {
            tracing::info!(model = %reg.admin.name, pk = %pk, "deleted record");
            AdminResponse::Redirect(site.list_url(&reg.slug))
        }
        Err(err) => {
            tracing::warn!(model = %reg.admin.name, pk = %pk, error = %err, "delete failed");
            AdminError::from(err).into_response()
        }
    }
}

fn change_page(
    site: &AdminSite,
    reg: &ModelRegistration,
    pk: &str,
    record: &dyn Record,
    message: Option<Message>,
) -> AdminResponse {
    let admin = &reg.admin;
    AdminResponse::Page(Page::Change(ChangePage {
        context: PageContext::for_site(site),
        model: admin.name.clone(),
        verbose_name: reg.verbose_name.clone(),
        pk: pk.to_string(),
        is_new: pk == ADD_PK,
        fields: marshal(record, admin, ""),
        values: values_map(record),
        widgets: admin.field_widgets.clone().unwrap_or_default(),
        notes: admin.field_notes.clone(),
        list_url: site.list_url(&reg.slug),
        action_url: site.change_url(&reg.slug, pk),
        message,
    }))
}
