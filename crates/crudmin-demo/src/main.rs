//! crudmin demo server
//!
//! Serves the admin over an in-memory product catalog.
//! Run with: cargo run -p crudmin-demo
//! Then visit: http://localhost:3000/admin/
//!
//! Pass `--format json` to get the page values as JSON instead of HTML,
//! `--read-only` to refuse every write, and `--token` to require an
//! `X-Admin-Token` header.

mod store;

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request as HyperRequest, Response as HyperResponse, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crudmin::{
    AdminAction, AdminConfig, AdminSite, Authenticator, BoxFuture, HtmlRenderer, JsonRenderer,
    ModelAdmin, Operation, ViewRenderer,
};
use crudmin_router::{LoggingMiddleware, Method, Request, Response, Router};

use crate::store::{mark_unavailable, ProductSearch, ProductStore};

/// Generic admin interface demo over an in-memory product catalog.
#[derive(Parser)]
#[command(name = "crudmin-demo")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Address to listen on.
    #[arg(short, long, env = "CRUDMIN_ADDR", default_value = "127.0.0.1:3000")]
    addr: SocketAddr,

    /// Brand shown in the page header.
    #[arg(long, env = "CRUDMIN_BRAND", default_value = "Parts Depot")]
    brand: String,

    /// URL prefix the admin is mounted under.
    #[arg(long, env = "CRUDMIN_PREFIX", default_value = "/admin")]
    prefix: String,

    /// Records per list page.
    #[arg(long, env = "CRUDMIN_PAGE_SIZE", default_value_t = 25)]
    page_size: usize,

    /// Page links shown around the current page.
    #[arg(long, env = "CRUDMIN_SHOW_PAGES", default_value_t = 8)]
    show_pages: usize,

    /// Response format of admin pages.
    #[arg(long, value_enum, env = "CRUDMIN_FORMAT", default_value_t = Format::Html)]
    format: Format,

    /// Require this value in the `X-Admin-Token` header.
    #[arg(long, env = "CRUDMIN_TOKEN")]
    token: Option<String>,

    /// Allow reads only.
    #[arg(long)]
    read_only: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Html,
    Json,
}

/// Optional token check plus a read-only switch.
struct DemoAuth {
    token: Option<String>,
    read_only: bool,
}

impl Authenticator for DemoAuth {
    fn is_logged_in_as_admin<'a>(&'a self, req: &'a Request) -> BoxFuture<'a, bool> {
        Box::pin(async move {
            match &self.token {
                Some(token) => req.get_header("X-Admin-Token") == Some(token.as_str()),
                None => true,
            }
        })
    }

    fn has_privilege<'a>(
        &'a self,
        _req: &'a Request,
        model: &'a str,
        op: Operation,
        ids: &'a [String],
    ) -> BoxFuture<'a, bool> {
        Box::pin(async move {
            let allowed = !self.read_only || op == Operation::Read;
            tracing::debug!(model = %model, operation = %op, ids = ?ids, allowed, "privilege check");
            allowed
        })
    }
}

fn build_site(cli: &Cli) -> AdminSite {
    let config = AdminConfig::new()
        .brand(cli.brand.clone())
        .url_prefix(cli.prefix.clone())
        .page_size(cli.page_size)
        .show_page_count(cli.show_pages);

    let products = Arc::new(ProductStore::seeded());
    let admin = ModelAdmin::new("Product", products.clone())
        .pk_field("ID")
        .list_fields(&["ID", "Name", "Price", "Available"])
        .readonly_fields(&["ID", "Created"])
        .field_note("Price", "Unit price in euros, excluding VAT")
        .field_note("Variants", "Stock per SKU")
        .searcher(Arc::new(ProductSearch(products.clone())))
        .action(AdminAction::delete_selected(products.clone()))
        .action(mark_unavailable(products).confirm(
            "Mark unavailable",
            "Hide the selected products from the shop?",
        ));

    let site = AdminSite::new(config).register(admin);
    if cli.token.is_some() || cli.read_only {
        site.authenticator(Arc::new(DemoAuth {
            token: cli.token.clone(),
            read_only: cli.read_only,
        }))
    } else {
        site
    }
}

fn build_router(cli: &Cli) -> anyhow::Result<Router> {
    let renderer: Arc<dyn ViewRenderer> = match cli.format {
        Format::Html => Arc::new(HtmlRenderer),
        Format::Json => Arc::new(JsonRenderer),
    };
    let site = build_site(cli);
    let index = site.index_url();
    let router = site
        .into_router(renderer)?
        // Redirect root to admin
        .get("/", move |_| {
            let index = index.clone();
            async move { Response::redirect(index) }
        })?
        .middleware(LoggingMiddleware);
    Ok(router)
}

async fn handle_request(
    req: HyperRequest<hyper::body::Incoming>,
    router: Arc<Router>,
) -> Result<HyperResponse<Full<Bytes>>, Infallible> {
    let Some(method) = Method::parse(req.method().as_str()) else {
        return Ok(to_hyper(Response::method_not_allowed()));
    };
    let uri = req.uri();
    let mut admin_req = Request::new(method, uri.path());
    if let Some(query) = uri.query() {
        admin_req.query = Request::parse_query_string(query);
    }

    for (key, value) in req.headers() {
        if let Ok(v) = value.to_str() {
            admin_req.headers.insert(key.to_string(), v.to_string());
        }
    }

    admin_req.body = match req.collect().await {
        Ok(body) => body.to_bytes().to_vec(),
        Err(err) => {
            tracing::warn!(error = %err, "failed to read request body");
            Vec::new()
        }
    };

    Ok(to_hyper(router.handle(admin_req).await))
}

fn to_hyper(res: Response) -> HyperResponse<Full<Bytes>> {
    let mut builder = HyperResponse::builder()
        .status(StatusCode::from_u16(res.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR));
    for (key, value) in &res.headers {
        builder = builder.header(key.as_str(), value.as_str());
    }
    builder
        .body(Full::new(Bytes::from(res.body)))
        .unwrap_or_else(|err| {
            tracing::error!(error = %err, "invalid response");
            let mut fallback = HyperResponse::new(Full::new(Bytes::from_static(b"Internal Server Error")));
            *fallback.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            fallback
        })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let router = Arc::new(build_router(&cli)?);
    let listener = TcpListener::bind(cli.addr).await?;
    info!(addr = %cli.addr, prefix = %cli.prefix, "crudmin demo listening");

    loop {
        let (stream, peer) = tokio::select! {
            accepted = listener.accept() => accepted?,
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                return Ok(());
            }
        };
        let io = TokioIo::new(stream);
        let router = router.clone();

        tokio::task::spawn(async move {
            let service = service_fn(move |req| {
                let router = router.clone();
                handle_request(req, router)
            });

            if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                tracing::warn!(peer = %peer, error = %err, "error serving connection");
            }
        });
    }
}
