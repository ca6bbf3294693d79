//! Admin list view and bulk actions.

use crudmin_router::FormData;

use crate::form::ACTION_FIELD;
use crate::list::{compose_listing, ListParams};
use crate::site::{AdminSite, ModelRegistration};

use super::{AdminResponse, ListPage, Message, Page, PageContext};

/// Renders one page of a model's records.
///
/// Store failures abort the page with a server error.
pub async fn list_view(
    site: &AdminSite,
    reg: &ModelRegistration,
    params: &ListParams,
    message: Option<Message>,
) -> AdminResponse {
    match compose_listing(&reg.admin, site.config(), params).await {
        Ok(listing) => AdminResponse::Page(Page::List(ListPage {
            context: PageContext::for_site(site),
            verbose_name: reg.verbose_name.clone(),
            verbose_name_plural: reg.verbose_name_plural.clone(),
            list_url: site.list_url(&reg.slug),
            add_url: site.add_url(&reg.slug),
            listing,
            message,
        })),
        Err(err) => AdminResponse::ServerError(err.to_string()),
    }
}

/// Runs the submitted bulk action and re-renders the list with its outcome.
pub async fn list_update(
    site: &AdminSite,
    reg: &ModelRegistration,
    form: &FormData,
    params: &ListParams,
) -> AdminResponse {
    let identifier = form.get(ACTION_FIELD).unwrap_or_default();
    let message = match reg.admin.find_action(identifier) {
        Some(action) => {
            tracing::info!(model = %reg.admin.name, action = %identifier, "running list action");
            let result = action.execute(form.clone()).await;
            match (result.error, result.message) {
                (Some(error), _) => {
                    tracing::warn!(model = %reg.admin.name, action = %identifier, error = %error, "list action failed");
                    Message::error(error)
                }
                (None, Some(message)) => Message::success(message),
                (None, None) => Message::info(format!(
                    "{} applied to {} item(s).",
                    action.display_name, result.affected_count
                )),
            }
        }
        None => {
            tracing::debug!(model = %reg.admin.name, action = %identifier, "unknown list action");
            Message::error("unknown action")
        }
    };

    list_view(site, reg, params, Some(message)).await
}
