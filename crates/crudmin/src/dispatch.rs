//! Request routing and permission enforcement.

use std::sync::Arc;

use crudmin_router::{FormData, Method, Request};

use crate::auth::Operation;
use crate::error::{AdminError, Result};
use crate::form::{selected_ids, ACTION_FIELD};
use crate::list::ListParams;
use crate::site::{AdminSite, ModelRegistration, ADD_PK};
use crate::views::{
    change_view, create_view, delete_view, index_view, list_update, list_view, save_view,
    AdminResponse, DeniedPage, Page, PageContext,
};

const ACTION_SAVE: &str = "save";
const ACTION_SAVE_CONTINUE: &str = "save-continue";
const ACTION_DELETE: &str = "delete";

/// What an admin request asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminRoute {
    Index,
    List,
    ListUpdate { action: String },
    ChangeView { pk: String },
    Create,
    Save { pk: String },
    SaveAndContinue { pk: String },
    Delete { pk: String },
}

impl AdminRoute {
    /// Maps method and path segments to a route.
    ///
    /// `HEAD` resolves like `GET`. A change-form `POST` picks its route from
    /// the `action` field (default `save`); any other action fails with
    /// [`AdminError::UnknownAction`].
    pub fn resolve(
        method: Method,
        model: Option<&str>,
        pk: Option<&str>,
        form: &FormData,
    ) -> Result<Self> {
        let method = if method == Method::Head {
            Method::Get
        } else {
            method
        };

        match (method, model, pk) {
            (Method::Get, None, None) => Ok(Self::Index),
            (Method::Get, Some(_), None) => Ok(Self::List),
            (Method::Post, Some(_), None) => Ok(Self::ListUpdate {
                action: form.get(ACTION_FIELD).unwrap_or_default().to_string(),
            }),
            (Method::Get, Some(_), Some(ADD_PK)) => Ok(Self::Create),
            (Method::Get, Some(_), Some(pk)) => Ok(Self::ChangeView { pk: pk.to_string() }),
            (Method::Post, Some(_), Some(pk)) => {
                let pk = pk.to_string();
                match form.get(ACTION_FIELD).unwrap_or(ACTION_SAVE) {
                    ACTION_SAVE => Ok(Self::Save { pk }),
                    ACTION_SAVE_CONTINUE => Ok(Self::SaveAndContinue { pk }),
                    ACTION_DELETE => Ok(Self::Delete { pk }),
                    other => Err(AdminError::UnknownAction(other.to_string())),
                }
            }
            _ => Err(AdminError::NotFound),
        }
    }

    /// Privileges the route needs, checked in order.
    fn required_privileges(&self, form: &FormData) -> Vec<(Operation, Vec<String>)> {
        match self {
            Self::Index | Self::List => vec![(Operation::Read, Vec::new())],
            Self::ListUpdate { .. } => vec![
                (Operation::Write, selected_ids(form)),
                (Operation::Read, Vec::new()),
            ],
            Self::ChangeView { pk } => vec![(Operation::Read, vec![pk.clone()])],
            Self::Create => vec![(Operation::Create, Vec::new())],
            Self::Save { pk } | Self::SaveAndContinue { pk } if pk == ADD_PK => {
                vec![(Operation::Create, Vec::new())]
            }
            Self::Save { pk } | Self::SaveAndContinue { pk } | Self::Delete { pk } => {
                vec![(Operation::Write, vec![pk.clone()])]
            }
        }
    }
}

/// Serves admin requests against a sealed [`AdminSite`].
pub struct Dispatcher {
    site: Arc<AdminSite>,
}

impl Dispatcher {
    pub fn new(site: Arc<AdminSite>) -> Self {
        Self { site }
    }

    pub fn site(&self) -> &AdminSite {
        &self.site
    }

    /// Handles one request.
    ///
    /// Reads the `model` and `pk` path parameters and, for `POST`, the
    /// url-encoded form body. Permission is checked before any store call;
    /// a refusal renders the denied page.
    pub async fn dispatch(&self, req: &Request) -> AdminResponse {
        let form = if req.method == Method::Post {
            req.form()
        } else {
            FormData::new()
        };
        let model = req.params.get("model");
        let pk = req.params.get("pk");

        let registration = match model {
            Some(name) => match self.site.registration(name) {
                Some(reg) => Some(reg),
                None => {
                    tracing::debug!(model = %name, "unknown model");
                    return AdminError::ModelNotRegistered(name.to_string()).into_response();
                }
            },
            None => None,
        };

        let route = match AdminRoute::resolve(req.method, model, pk, &form) {
            Ok(route) => route,
            Err(err) => {
                tracing::debug!(method = %req.method, path = %req.path, error = %err, "unroutable admin request");
                return err.into_response();
            }
        };
        tracing::debug!(?route, model = ?model, "dispatching admin request");

        let Some(reg) = registration else {
            return self.index(req).await;
        };

        if let Some(denied) = self.check_permission(req, reg, &route, &form).await {
            return denied;
        }

        let site = self.site.as_ref();
        match route {
            AdminRoute::Index => self.index(req).await,
            AdminRoute::List => list_view(site, reg, &ListParams::from_request(req), None).await,
            AdminRoute::ListUpdate { .. } => {
                list_update(site, reg, &form, &ListParams::from_request(req)).await
            }
            AdminRoute::ChangeView { pk } => change_view(site, reg, &pk, None).await,
            AdminRoute::Create => create_view(site, reg, None),
            AdminRoute::Save { pk } => save_view(site, reg, &pk, &form, false).await,
            AdminRoute::SaveAndContinue { pk } => save_view(site, reg, &pk, &form, true).await,
            AdminRoute::Delete { pk } => delete_view(site, reg, &pk).await,
        }
    }

    async fn index(&self, req: &Request) -> AdminResponse {
        let mut readable = Vec::new();
        match self.site.get_authenticator() {
            Some(auth) => {
                if !auth.is_logged_in_as_admin(req).await {
                    return self.denied("You must be logged in as an administrator.");
                }
                for reg in self.site.registered_models() {
                    if auth
                        .has_privilege(req, &reg.admin.name, Operation::Read, &[])
                        .await
                    {
                        readable.push(reg);
                    }
                }
            }
            None => readable.extend(self.site.registered_models()),
        }
        index_view(&self.site, &readable).await
    }

    async fn check_permission(
        &self,
        req: &Request,
        reg: &ModelRegistration,
        route: &AdminRoute,
        form: &FormData,
    ) -> Option<AdminResponse> {
        let auth = self.site.get_authenticator()?;
        if !auth.is_logged_in_as_admin(req).await {
            return Some(self.denied("You must be logged in as an administrator."));
        }
        for (op, ids) in route.required_privileges(form) {
            if !auth.has_privilege(req, &reg.admin.name, op, &ids).await {
                tracing::info!(model = %reg.admin.name, operation = %op, "permission denied");
                return Some(self.denied(&format!(
                    "You do not have permission to {op} {}.",
                    reg.verbose_name_plural.to_lowercase()
                )));
            }
        }
        None
    }

    fn denied(&self, message: &str) -> AdminResponse {
        AdminResponse::Page(Page::Denied(DeniedPage {
            context: PageContext::for_site(&self.site),
            message: message.to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(method: Method, model: Option<&str>, pk: Option<&str>, body: &str) -> Result<AdminRoute> {
        AdminRoute::resolve(method, model, pk, &FormData::parse(body))
    }

    #[test]
    fn test_resolve_get_routes() {
        assert_eq!(resolve(Method::Get, None, None, "").unwrap(), AdminRoute::Index);
        assert_eq!(resolve(Method::Get, Some("w"), None, "").unwrap(), AdminRoute::List);
        assert_eq!(resolve(Method::Head, Some("w"), None, "").unwrap(), AdminRoute::List);
        assert_eq!(
            resolve(Method::Get, Some("w"), Some("add"), "").unwrap(),
            AdminRoute::Create
        );
        assert_eq!(
            resolve(Method::Get, Some("w"), Some("7"), "").unwrap(),
            AdminRoute::ChangeView { pk: "7".to_string() }
        );
    }

    #[test]
    fn test_resolve_list_update() {
        assert_eq!(
            resolve(Method::Post, Some("w"), None, "action=delete_selected&_selected=1").unwrap(),
            AdminRoute::ListUpdate {
                action: "delete_selected".to_string()
            }
        );
    }

    #[test]
    fn test_resolve_change_actions() {
        let pk = || "7".to_string();
        assert_eq!(
            resolve(Method::Post, Some("w"), Some("7"), "Name=x").unwrap(),
            AdminRoute::Save { pk: pk() }
        );
        assert_eq!(
            resolve(Method::Post, Some("w"), Some("7"), "action=save-continue").unwrap(),
            AdminRoute::SaveAndContinue { pk: pk() }
        );
        assert_eq!(
            resolve(Method::Post, Some("w"), Some("7"), "action=delete").unwrap(),
            AdminRoute::Delete { pk: pk() }
        );
        assert!(matches!(
            resolve(Method::Post, Some("w"), Some("7"), "action=explode"),
            Err(AdminError::UnknownAction(a)) if a == "explode"
        ));
    }

    #[test]
    fn test_resolve_unroutable() {
        assert!(matches!(
            resolve(Method::Delete, Some("w"), Some("7"), ""),
            Err(AdminError::NotFound)
        ));
        assert!(matches!(
            resolve(Method::Post, None, None, ""),
            Err(AdminError::NotFound)
        ));
    }

    #[test]
    fn test_required_privileges() {
        let form = FormData::parse("_selected=1&_selected=2");
        assert_eq!(
            AdminRoute::ListUpdate {
                action: "x".to_string()
            }
            .required_privileges(&form),
            vec![
                (Operation::Write, vec!["1".to_string(), "2".to_string()]),
                (Operation::Read, Vec::new())
            ]
        );
        assert_eq!(
            AdminRoute::Save {
                pk: "add".to_string()
            }
            .required_privileges(&form),
            vec![(Operation::Create, Vec::new())]
        );
        assert_eq!(
            AdminRoute::Delete {
                pk: "3".to_string()
            }
            .required_privileges(&form),
            vec![(Operation::Write, vec!["3".to_string()])]
        );
    }
}
