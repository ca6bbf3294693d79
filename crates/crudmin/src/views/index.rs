//! Admin index view.

use crate::site::{count_records, AdminSite, ModelRegistration};

use super::{AdminResponse, IndexPage, ModelSummary, Page, PageContext};

/// Renders record counts for `models`.
///
/// The dispatcher passes only the models the user may read. A failing count
/// aborts the page.
pub async fn index_view(site: &AdminSite, models: &[&ModelRegistration]) -> AdminResponse {
    let mut summaries = Vec::with_capacity(models.len());
    for reg in models {
        let count = match count_records(reg).await {
            Ok(count) => count,
            Err(err) => return AdminResponse::ServerError(err.to_string()),
        };
        summaries.push(ModelSummary {
            name: reg.admin.name.clone(),
            verbose_name_plural: reg.verbose_name_plural.clone(),
            list_url: site.list_url(&reg.slug),
            add_url: site.add_url(&reg.slug),
            count,
        });
    }

    AdminResponse::Page(Page::Index(IndexPage {
        context: PageContext::for_site(site),
        models: summaries,
    }))
}
