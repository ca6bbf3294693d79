//! Bulk actions offered on list views.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crudmin_router::{BoxFuture, FormData};
use serde::Serialize;

use crate::form::selected_ids;
use crate::store::Accessor;

/// Handler run when an action is submitted. Receives the whole list form,
/// including `_selected`.
pub type ActionHandler = Arc<dyn Fn(FormData) -> BoxFuture<'static, ActionResult> + Send + Sync>;

/// A bulk action on selected records.
#[derive(Clone)]
pub struct AdminAction {
    /// Value submitted in the `action` field.
    pub identifier: String,
    /// Label shown in the action menu.
    pub display_name: String,
    /// Ask before running.
    pub confirm: Option<Confirmation>,
    handler: ActionHandler,
}

/// Confirmation prompt for an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Confirmation {
    pub title: String,
    pub message: String,
}

impl AdminAction {
    /// Creates an action from an async closure.
    pub fn new<F, Fut>(
        identifier: impl Into<String>,
        display_name: impl Into<String>,
        handler: F,
    ) -> Self
    where
        F: Fn(FormData) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ActionResult> + Send + 'static,
    {
        Self {
            identifier: identifier.into(),
            display_name: display_name.into(),
            confirm: None,
            handler: Arc::new(move |form| Box::pin(handler(form))),
        }
    }

    /// Requires confirmation before running.
    #[must_use]
    pub fn confirm(mut self, title: impl Into<String>, message: impl Into<String>) -> Self {
        self.confirm = Some(Confirmation {
            title: title.into(),
            message: message.into(),
        });
        self
    }

    /// Runs the action.
    pub fn execute(&self, form: FormData) -> BoxFuture<'static, ActionResult> {
        (self.handler)(form)
    }

    /// Deletes every selected record through the accessor.
    ///
    /// Stops at the first failure and reports how many records were deleted
    /// before it.
    pub fn delete_selected(accessor: Arc<dyn Accessor>) -> Self {
        Self::new("delete_selected", "Delete selected", move |form| {
            let accessor = Arc::clone(&accessor);
            async move {
                let ids = selected_ids(&form);
                if ids.is_empty() {
                    return ActionResult::error("No items selected.");
                }
                let mut deleted = 0;
                for pk in &ids {
                    if let Err(err) = accessor.delete(pk).await {
                        tracing::error!(pk = %pk, error = %err, "bulk delete failed");
                        return ActionResult {
                            message: None,
                            error: Some(format!("Could not delete {pk}: {err}")),
                            affected_count: deleted,
                        };
                    }
                    deleted += 1;
                }
                ActionResult::success(format!("Successfully deleted {deleted} item(s)"), deleted)
            }
        })
        .confirm(
            "Delete selected",
            "Are you sure you want to delete the selected items?",
        )
    }
}

impl fmt::Debug for AdminAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminAction")
            .field("identifier", &self.identifier)
            .field("display_name", &self.display_name)
            .field("confirm", &self.confirm)
            .finish_non_exhaustive()
    }
}

/// Outcome of an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionResult {
    /// Success message.
    pub message: Option<String>,
    /// Error message.
    pub error: Option<String>,
    /// Number of records affected.
    pub affected_count: usize,
}

impl ActionResult {
    /// Creates a success result.
    pub fn success(message: impl Into<String>, affected: usize) -> Self {
        Self {
            message: Some(message.into()),
            error: None,
            affected_count: affected,
        }
    }

    /// Creates an error result.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: None,
            error: Some(message.into()),
            affected_count: 0,
        }
    }

    pub const fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryAccessor;

    #[tokio::test]
    async fn test_custom_action() {
        let action = AdminAction::new("touch", "Touch selected", |form: FormData| async move {
            let count = selected_ids(&form).len();
            ActionResult::success(format!("Touched {count} item(s)"), count)
        });

        let result = action
            .execute(FormData::parse("_selected=1&_selected=2"))
            .await;
        assert_eq!(result.message, Some("Touched 2 item(s)".to_string()));
        assert_eq!(result.affected_count, 2);
        assert!(action.confirm.is_none());
    }

    #[tokio::test]
    async fn test_delete_selected() {
        let accessor = Arc::new(MemoryAccessor::with_names(&["a", "b", "c"]));
        let action = AdminAction::delete_selected(accessor.clone());
        assert!(action.confirm.is_some());

        let result = action
            .execute(FormData::parse("_selected=1&_selected=3"))
            .await;
        assert!(!result.is_error());
        assert_eq!(result.affected_count, 2);
        assert_eq!(accessor.len().await, 1);
    }

    #[tokio::test]
    async fn test_delete_selected_reports_failure() {
        let accessor = Arc::new(MemoryAccessor::with_names(&["a"]));
        let action = AdminAction::delete_selected(accessor);

        let result = action
            .execute(FormData::parse("_selected=1&_selected=9"))
            .await;
        assert!(result.is_error());
        assert_eq!(result.affected_count, 1);
    }

    #[tokio::test]
    async fn test_delete_selected_requires_selection() {
        let action = AdminAction::delete_selected(Arc::new(MemoryAccessor::default()));
        let result = action.execute(FormData::new()).await;
        assert_eq!(result.error, Some("No items selected.".to_string()));
    }
}
