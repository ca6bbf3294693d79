//! Permission checks.

use std::fmt;

use crudmin_router::{BoxFuture, Request};
use serde::Serialize;

/// Kind of operation a request performs on a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Read,
    Write,
    Create,
}

impl Operation {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Create => "create",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decides who may use the admin.
///
/// When a site has no authenticator every request is allowed.
pub trait Authenticator: Send + Sync {
    /// Returns true when the request comes from a logged-in administrator.
    fn is_logged_in_as_admin<'a>(&'a self, req: &'a Request) -> BoxFuture<'a, bool>;

    /// Returns true when the request may perform `op` on `model`.
    ///
    /// `ids` lists the affected primary keys; it is empty for listings and
    /// creation.
    fn has_privilege<'a>(
        &'a self,
        req: &'a Request,
        model: &'a str,
        op: Operation,
        ids: &'a [String],
    ) -> BoxFuture<'a, bool>;
}
