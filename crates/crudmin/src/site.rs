//! Admin site registration and routing.

use std::collections::HashMap;
use std::sync::Arc;

use crudmin_router::{percent_encode, Request, RouteGroup, Router};
use serde::Serialize;

use crate::auth::Authenticator;
use crate::config::AdminConfig;
use crate::dispatch::Dispatcher;
use crate::error::{AdminError, Result};
use crate::marshal::default_widgets;
use crate::options::ModelAdmin;
use crate::views::ViewRenderer;

/// Primary key segment that opens the create form.
pub const ADD_PK: &str = "add";

/// A registered model.
#[derive(Debug, Clone)]
pub struct ModelRegistration {
    /// Lower-cased model name used in URLs and lookups.
    pub slug: String,
    /// Verbose name for display.
    pub verbose_name: String,
    /// Verbose name plural.
    pub verbose_name_plural: String,
    /// Admin configuration, with widgets filled in.
    pub admin: ModelAdmin,
}

/// Navigation entry for one model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelLink {
    pub name: String,
    pub verbose_name_plural: String,
    pub url: String,
}

/// Registry of administered models.
///
/// Built by value during startup. [`AdminSite::into_router`] (or wrapping the
/// site in an `Arc`) freezes it; every model must be registered before
/// requests are served.
pub struct AdminSite {
    config: AdminConfig,
    registrations: Vec<ModelRegistration>,
    by_slug: HashMap<String, usize>,
    authenticator: Option<Arc<dyn Authenticator>>,
}

impl Default for AdminSite {
    fn default() -> Self {
        Self::new(AdminConfig::default())
    }
}

impl AdminSite {
    /// Creates an empty site.
    pub fn new(config: AdminConfig) -> Self {
        Self {
            config,
            registrations: Vec::new(),
            by_slug: HashMap::new(),
            authenticator: None,
        }
    }

    pub fn config(&self) -> &AdminConfig {
        &self.config
    }

    /// Restricts the site to requests the authenticator accepts.
    #[must_use]
    pub fn authenticator(mut self, authenticator: Arc<dyn Authenticator>) -> Self {
        self.authenticator = Some(authenticator);
        self
    }

    pub fn get_authenticator(&self) -> Option<&Arc<dyn Authenticator>> {
        self.authenticator.as_ref()
    }

    /// Registers a model.
    ///
    /// Registering a name twice (case-insensitively) logs a warning and the
    /// later descriptor replaces the earlier one in its original position.
    #[must_use]
    pub fn register(mut self, admin: ModelAdmin) -> Self {
        let registration = prepare(admin);
        match self.by_slug.get(&registration.slug) {
            Some(&position) => {
                tracing::warn!(model = %registration.admin.name, "model admin already registered, replacing");
                self.registrations[position] = registration;
            }
            None => {
                self.by_slug
                    .insert(registration.slug.clone(), self.registrations.len());
                self.registrations.push(registration);
            }
        }
        self
    }

    /// Registers a model, failing on a duplicate name.
    pub fn try_register(self, admin: ModelAdmin) -> Result<Self> {
        if self.by_slug.contains_key(&admin.name.to_lowercase()) {
            return Err(AdminError::DuplicateModel(admin.name));
        }
        Ok(self.register(admin))
    }

    /// Looks up a descriptor by case-insensitive name.
    pub fn get(&self, name: &str) -> Option<&ModelAdmin> {
        self.registration(name).map(|reg| &reg.admin)
    }

    /// Looks up a registration by case-insensitive name.
    pub fn registration(&self, name: &str) -> Option<&ModelRegistration> {
        self.by_slug
            .get(&name.to_lowercase())
            .and_then(|&i| self.registrations.get(i))
    }

    /// Returns all registered models in registration order.
    pub fn registered_models(&self) -> &[ModelRegistration] {
        &self.registrations
    }

    /// Returns the model list for navigation.
    pub fn model_list(&self) -> Vec<ModelLink> {
        self.registrations
            .iter()
            .map(|reg| ModelLink {
                name: reg.admin.name.clone(),
                verbose_name_plural: reg.verbose_name_plural.clone(),
                url: self.list_url(&reg.slug),
            })
            .collect()
    }

    /// Counts the records of every model, in registration order.
    pub async fn model_counts(&self) -> Result<Vec<(String, usize)>> {
        let mut counts = Vec::with_capacity(self.registrations.len());
        for reg in &self.registrations {
            counts.push((reg.admin.name.clone(), count_records(reg).await?));
        }
        Ok(counts)
    }

    /// Returns the index URL.
    pub fn index_url(&self) -> String {
        format!("{}/", self.config.prefix())
    }

    /// Returns the list URL for a model.
    pub fn list_url(&self, model: &str) -> String {
        format!("{}/{}/", self.config.prefix(), model.to_lowercase())
    }

    /// Returns the change URL for a record.
    pub fn change_url(&self, model: &str, pk: &str) -> String {
        format!(
            "{}/{}/{}",
            self.config.prefix(),
            model.to_lowercase(),
            percent_encode(pk)
        )
    }

    /// Returns the create URL for a model.
    pub fn add_url(&self, model: &str) -> String {
        self.change_url(model, ADD_PK)
    }

    /// Seals the site and builds its routes:
    ///
    /// - `GET {prefix}/` - index
    /// - `GET {prefix}/{model}/` - list
    /// - `POST {prefix}/{model}/` - list action
    /// - `GET {prefix}/{model}/{pk}` - change or create form
    /// - `POST {prefix}/{model}/{pk}` - save, save and continue, delete
    pub fn into_router(self, renderer: Arc<dyn ViewRenderer>) -> Result<Router> {
        if self.authenticator.is_none() {
            tracing::warn!("no authenticator configured, the admin is open to every request");
        }
        let prefix = self.config.prefix().to_string();
        let dispatcher = Arc::new(Dispatcher::new(Arc::new(self)));

        let handler = move |req: Request| {
            let dispatcher = Arc::clone(&dispatcher);
            let renderer = Arc::clone(&renderer);
            async move {
                dispatcher
                    .dispatch(&req)
                    .await
                    .into_response(renderer.as_ref())
            }
        };

        let group = RouteGroup::new(&prefix)
            .get("/", handler.clone())?
            .get("/{model}/", handler.clone())?
            .post("/{model}/", handler.clone())?
            .get("/{model}/{pk}", handler.clone())?
            .post("/{model}/{pk}", handler)?;

        Ok(Router::new().group(group))
    }
}

fn prepare(mut admin: ModelAdmin) -> ModelRegistration {
    let prototype = admin.accessor().prototype();
    let mut widgets = default_widgets(prototype.as_ref());
    if let Some(explicit) = admin.field_widgets.take() {
        widgets.extend(explicit);
    }
    admin.field_widgets = Some(widgets);

    let verbose_name = admin
        .verbose_name
        .clone()
        .unwrap_or_else(|| humanize_model_name(&admin.name));
    let verbose_name_plural = pluralize(&verbose_name);
    tracing::info!(model = %admin.name, "registering model admin");

    ModelRegistration {
        slug: admin.name.to_lowercase(),
        verbose_name,
        verbose_name_plural,
        admin,
    }
}

pub(crate) async fn count_records(reg: &ModelRegistration) -> Result<usize> {
    reg.admin.accessor().count().await.map_err(|err| {
        tracing::error!(model = %reg.admin.name, error = %err, "count failed");
        AdminError::Store(err.to_string())
    })
}

/// Converts a CamelCase model name to a human-readable name.
fn humanize_model_name(name: &str) -> String {
    let mut result = String::new();
    for (i, c) in name.chars().enumerate() {
        if c.is_uppercase() && i > 0 {
            result.push(' ');
        }
        if i == 0 {
            result.extend(c.to_uppercase());
        } else {
            result.extend(c.to_lowercase());
        }
    }
    result
}

/// Simple pluralization (adds 's' or 'es').
fn pluralize(name: &str) -> String {
    if name.ends_with('s') || name.ends_with('x') || name.ends_with("ch") || name.ends_with("sh") {
        format!("{name}es")
    } else if let Some(stem) = name.strip_suffix('y') {
        format!("{stem}ies")
    } else {
        format!("{name}s")
    }
}
