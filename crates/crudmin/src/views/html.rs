//! Bootstrap 5 HTML rendering of admin pages.

use ironhtml::typed::{Document, Element};
use ironhtml_elements::{
    Body, Button, Div, Fieldset, Form, Head, Html, Input, Label, Legend, Li, Link, Meta, Nav,
    Option_, Script, Select as SelectEl, Small, Span, Style, Td, Textarea, Th, Title, Tr, Ul, A,
    H2, H5, P,
};

use crudmin_router::{percent_encode, Response};

use crate::list::{ListParams, PageWindow};
use crate::marshal::{default_widget, FieldNode, WIDGET_RADIO, WIDGET_TEXTAREA};

use super::{
    ChangePage, DeniedPage, IndexPage, ListPage, Message, MessageLevel, Page, PageContext,
    ViewRenderer,
};

const BOOTSTRAP_CSS: &str = "https://cdn.jsdelivr.net/npm/bootstrap@5.3.2/dist/css/bootstrap.min.css";

const CSS: &str = "\
:root { --sidebar-width: 240px; }\n\
body { min-height: 100vh; }\n\
.sidebar { position: fixed; top: 0; left: 0; bottom: 0; \
width: var(--sidebar-width); background-color: #212529; overflow-y: auto; }\n\
.sidebar .nav-link { color: rgba(255,255,255,0.75); padding: 0.75rem 1rem; }\n\
.sidebar .nav-link:hover { color: #fff; background-color: rgba(255,255,255,0.1); }\n\
.sidebar-header { padding: 1rem; background-color: #0d6efd; color: white; }\n\
.main-content { margin-left: var(--sidebar-width); padding: 1.5rem; }";

const JS: &str = "\
document.querySelectorAll('.select-all').forEach(checkbox=>{\
checkbox.addEventListener('change',function(){\
this.closest('table').querySelectorAll('.row-select').forEach(cb=>{\
cb.checked=this.checked;});});});\
document.querySelectorAll('button[data-confirm]').forEach(el=>{\
el.addEventListener('click',function(e){\
if(!confirm(this.dataset.confirm)){e.preventDefault();}});});\
document.querySelectorAll('select.action-select').forEach(sel=>{\
sel.form.addEventListener('submit',function(e){\
const opt=sel.options[sel.selectedIndex];\
if(opt&&opt.dataset.confirm&&!confirm(opt.dataset.confirm)){e.preventDefault();}});});";

/// Renders pages as Bootstrap 5 HTML.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlRenderer;

impl ViewRenderer for HtmlRenderer {
    fn render(&self, page: &Page) -> Response {
        let (content, message) = match page {
            Page::Index(p) => (render_index(p), None),
            Page::List(p) => (render_list(p), p.message.as_ref()),
            Page::Change(p) => (render_change(p), p.message.as_ref()),
            Page::Denied(p) => (render_denied(p), None),
        };
        Response::html(render_layout(page.context(), &page.title(), message, &content))
    }
}

fn render_layout(ctx: &PageContext, title: &str, message: Option<&Message>, content: &str) -> String {
    let title_str = format!("{title} | {}", ctx.brand);

    Document::new()
        .doctype()
        .root::<Html, _>(|html_el| {
            html_el
                .attr("lang", "en")
                .child::<Head, _>(|head| {
                    head.child::<Meta, _>(|m| m.attr("charset", "UTF-8"))
                        .child::<Meta, _>(|m| {
                            m.attr("name", "viewport")
                                .attr("content", "width=device-width, initial-scale=1.0")
                        })
                        .child::<Title, _>(|t| t.text(&title_str))
                        .child::<Link, _>(|l| l.attr("href", BOOTSTRAP_CSS).attr("rel", "stylesheet"))
                        .child::<Style, _>(|s| s.raw(CSS))
                })
                .child::<Body, _>(|body| {
                    body.child::<Nav, _>(|nav| render_sidebar(nav, ctx))
                        .child::<Div, _>(|main| {
                            let main = main.class("main-content");
                            let main = match message {
                                Some(m) => render_message(main, m),
                                None => main,
                            };
                            main.child::<H2, _>(|h| h.class("mb-4").text(title))
                                .raw(content)
                        })
                        .child::<Script, _>(|s| s.raw(JS))
                })
        })
        .build()
}

fn render_sidebar(nav: Element<Nav>, ctx: &PageContext) -> Element<Nav> {
    nav.class("sidebar")
        .child::<Div, _>(|d| {
            d.class("sidebar-header")
                .child::<H5, _>(|h| h.class("m-0").text(&ctx.brand))
        })
        .child::<Ul, _>(|ul| {
            ul.class("nav flex-column")
                .child::<Li, _>(|li| {
                    li.class("nav-item").child::<A, _>(|a| {
                        a.class("nav-link").attr("href", &ctx.index_url).text("Dashboard")
                    })
                })
                .children(ctx.models.iter(), |model, li: Element<Li>| {
                    li.class("nav-item").child::<A, _>(|a| {
                        a.class("nav-link")
                            .attr("href", &model.url)
                            .text(&model.verbose_name_plural)
                    })
                })
        })
}

fn render_message(wrapper: Element<Div>, message: &Message) -> Element<Div> {
    let alert_class = match message.level {
        MessageLevel::Success => "alert alert-success",
        MessageLevel::Error => "alert alert-danger",
        MessageLevel::Info => "alert alert-info",
    };
    wrapper.child::<Div, _>(|d| d.class(alert_class).attr("role", "alert").text(&message.text))
}

fn render_index(page: &IndexPage) -> String {
    if page.models.is_empty() {
        return Element::<Div>::new()
            .class("alert alert-info")
            .text("No models are available.")
            .render();
    }

    Element::<Div>::new()
        .class("row")
        .children(page.models.iter(), |model, col: Element<Div>| {
            let count = format!("{} record(s)", model.count);
            col.class("col-md-4 col-lg-3 mb-4").child::<Div, _>(|card| {
                card.class("card h-100")
                    .child::<Div, _>(|body| {
                        body.class("card-body")
                            .child::<H5, _>(|h| h.class("card-title").text(&model.verbose_name_plural))
                            .child::<P, _>(|p| p.class("card-text text-muted").text(&count))
                    })
                    .child::<Div, _>(|footer| {
                        footer
                            .class("card-footer bg-transparent")
                            .child::<A, _>(|a| {
                                a.attr("href", &model.list_url)
                                    .class("btn btn-outline-primary btn-sm me-1")
                                    .text("View")
                            })
                            .child::<A, _>(|a| {
                                a.attr("href", &model.add_url)
                                    .class("btn btn-primary btn-sm")
                                    .text("Add")
                            })
                    })
            })
        })
        .render()
}

fn render_list(page: &ListPage) -> String {
    let listing = &page.listing;
    let params = ListParams {
        page: listing.window.current,
        query: listing.query.clone(),
        sort: listing.sort.as_ref().map(|s| s.token()),
    };
    let add_label = format!("Add {}", page.verbose_name.to_lowercase());
    let total_label = format!("{} {}", listing.total, page.verbose_name_plural.to_lowercase());

    let mut header_cells = String::new();
    Element::<Th>::new()
        .child::<Input, _>(|i| i.attr("type", "checkbox").class("form-check-input select-all"))
        .render_to(&mut header_cells);
    for (column, (_, direction)) in listing.columns.iter().zip(&listing.directions) {
        let th = Element::<Th>::new();
        let th = if column.sortable {
            let token = if *direction == 1 {
                format!("-{}", column.name)
            } else {
                column.name.clone()
            };
            let href = ListParams {
                page: 0,
                query: listing.query.clone(),
                sort: Some(token),
            }
            .query_string_for_page(0);
            let label = match direction {
                1 => format!("{} \u{25b2}", column.name),
                -1 => format!("{} \u{25bc}", column.name),
                _ => column.name.clone(),
            };
            th.child::<A, _>(|a| a.attr("href", &href).text(&label))
        } else {
            th.text(&column.name)
        };
        th.render_to(&mut header_cells);
    }

    let mut rows = String::new();
    for row in &listing.rows {
        let change_url = format!("{}{}", page.list_url, percent_encode(&row.pk));
        let mut tr = Element::<Tr>::new().child::<Td, _>(|td| {
            td.child::<Input, _>(|i| {
                i.attr("type", "checkbox")
                    .attr("name", "_selected")
                    .attr("value", &row.pk)
                    .class("form-check-input row-select")
            })
        });
        for (index, column) in listing.columns.iter().enumerate() {
            let text = row.cell(&column.name).map(cell_text).unwrap_or_default();
            tr = tr.child::<Td, _>(|td| {
                if index == 0 {
                    td.child::<A, _>(|a| a.attr("href", &change_url).text(&text))
                } else {
                    td.text(&text)
                }
            });
        }
        tr.render_to(&mut rows);
    }

    // Tr/Tbody cannot take raw children, so the table shell is formatted.
    let table_html = format!(
        "<table class=\"table table-hover mb-0\">\
         <thead><tr>{header_cells}</tr></thead>\
         <tbody>{rows}</tbody></table>"
    );

    let search = listing.search_placeholder.as_ref().map(|placeholder| {
        Element::<Form>::new()
            .attr("method", "get")
            .class("d-flex mb-3")
            .child::<Input, _>(|i| {
                i.attr("type", "search")
                    .attr("name", "q")
                    .class("form-control me-2")
                    .attr("placeholder", placeholder)
                    .attr("value", listing.query.as_deref().unwrap_or(""))
            })
            .child::<Button, _>(|b| {
                b.attr("type", "submit")
                    .class("btn btn-outline-secondary")
                    .text("Search")
            })
            .render()
    });

    let actions = Element::<Div>::new()
        .class("card-header bg-white d-flex justify-content-between align-items-center")
        .child::<Span, _>(|s| s.class("fw-semibold").text(&total_label))
        .child::<Div, _>(|d| {
            if listing.actions.is_empty() {
                return d;
            }
            d.class("d-flex gap-2")
                .child::<SelectEl, _>(|s| {
                    s.attr("name", "action")
                        .class("form-select form-select-sm action-select")
                        .children(listing.actions.iter(), |action, o: Element<Option_>| {
                            let o = o.attr("value", &action.identifier);
                            let o = match &action.confirm {
                                Some(confirm) => o.data("confirm", &confirm.message),
                                None => o,
                            };
                            o.text(&action.display_name)
                        })
                })
                .child::<Button, _>(|b| {
                    b.attr("type", "submit").class("btn btn-sm btn-primary").text("Go")
                })
        })
        .render();

    Element::<Div>::new()
        .child::<Div, _>(|d| {
            d.class("d-flex justify-content-end mb-3").child::<A, _>(|a| {
                a.attr("href", &page.add_url)
                    .class("btn btn-primary")
                    .text(&add_label)
            })
        })
        .raw(search.unwrap_or_default())
        .child::<Form, _>(|f| {
            f.attr("method", "post")
                .attr("action", &page.list_url)
                .child::<Div, _>(|card| {
                    card.class("card")
                        .raw(&actions)
                        .child::<Div, _>(|body| body.class("card-body p-0").raw(&table_html))
                        .child::<Div, _>(|footer| {
                            footer
                                .class("card-footer bg-white")
                                .raw(render_pagination(&params, &listing.window))
                        })
                })
        })
        .render()
}

fn render_pagination(params: &ListParams, window: &PageWindow) -> String {
    let previous = window
        .has_previous()
        .then(|| window.current.saturating_sub(1).min(window.last_page().unwrap_or(0)));
    let next = window.has_next().then(|| window.current.saturating_add(1));

    Element::<Nav>::new()
        .attr("aria-label", "pagination")
        .child::<Ul, _>(|ul| {
            let ul = ul
                .class("pagination mb-0")
                .child::<Li, _>(|li| page_link(li, params, previous, "\u{ab}"));
            ul.children(window.pages.iter(), |&page, li: Element<Li>| {
                let label = (page + 1).to_string();
                let li = page_link(li, params, Some(page), &label);
                if page == params.page {
                    li.class("active")
                } else {
                    li
                }
            })
            .child::<Li, _>(|li| page_link(li, params, next, "\u{bb}"))
        })
        .render()
}

fn page_link(li: Element<Li>, params: &ListParams, page: Option<usize>, label: &str) -> Element<Li> {
    match page {
        Some(page) => li.class("page-item").child::<A, _>(|a| {
            a.class("page-link")
                .attr("href", params.query_string_for_page(page))
                .text(label)
        }),
        None => li
            .class("page-item disabled")
            .child::<Span, _>(|s| s.class("page-link").text(label)),
    }
}

fn cell_text(node: &FieldNode) -> String {
    if node.is_leaf() {
        node.value.clone()
    } else {
        format!("{} item(s)", node.children.len())
    }
}

fn render_change(page: &ChangePage) -> String {
    let mut fields = String::new();
    for node in page.fields.iter().filter(|n| !n.omit) {
        render_field(page, node, &mut fields);
    }

    Element::<Form>::new()
        .attr("method", "post")
        .attr("action", &page.action_url)
        .child::<Div, _>(|card| {
            card.class("card")
                .child::<Div, _>(|body| body.class("card-body").raw(&fields))
                .child::<Div, _>(|footer| {
                    let footer = footer
                        .class("card-footer d-flex gap-2")
                        .child::<Button, _>(|b| {
                            b.attr("type", "submit")
                                .attr("name", "action")
                                .attr("value", "save")
                                .class("btn btn-primary")
                                .text("Save")
                        })
                        .child::<Button, _>(|b| {
                            b.attr("type", "submit")
                                .attr("name", "action")
                                .attr("value", "save-continue")
                                .class("btn btn-outline-primary")
                                .text("Save and continue editing")
                        })
                        .child::<A, _>(|a| {
                            a.attr("href", &page.list_url)
                                .class("btn btn-outline-secondary")
                                .text("Cancel")
                        });
                    if page.is_new {
                        footer
                    } else {
                        footer.child::<Button, _>(|b| {
                            b.attr("type", "submit")
                                .attr("name", "action")
                                .attr("value", "delete")
                                .class("btn btn-danger ms-auto")
                                .data("confirm", "Are you sure you want to delete this item?")
                                .text("Delete")
                        })
                    }
                })
        })
        .render()
}

fn render_field(page: &ChangePage, node: &FieldNode, out: &mut String) {
    let name = node.name();
    let note = page.notes.get(name);

    // Nested records are edited field by field under their dotted names.
    if !node.is_leaf() {
        let mut children = String::new();
        for child in node.children.iter().filter(|c| !c.omit) {
            render_field(page, child, &mut children);
        }
        Element::<Fieldset>::new()
            .class("border rounded p-3 mb-3")
            .child::<Legend, _>(|l| l.class("fs-6 fw-semibold").text(&node.identifier))
            .child::<Div, _>(|d| d.raw(&children))
            .render_to(out);
        return;
    }

    let widget = page
        .widgets
        .get(name)
        .map_or_else(|| default_widget(node.kind), String::as_str);
    let id = format!("field-{}", node.identifier.replace('.', "-"));

    let group = Element::<Div>::new().class("mb-3").child::<Label, _>(|l| {
        l.attr("for", &id).class("form-label").text(&node.identifier)
    });

    let group = match widget {
        WIDGET_RADIO => group.child::<Div, _>(|d| {
            let d = d.class("d-flex gap-3");
            ["true", "false"].iter().fold(d, |d, option| {
                d.child::<Div, _>(|opt| {
                    opt.class("form-check").child::<Input, _>(|i| {
                        let i = i
                            .attr("type", "radio")
                            .attr("name", &node.identifier)
                            .attr("value", *option)
                            .class("form-check-input");
                        let i = if node.value == *option { i.bool_attr("checked") } else { i };
                        if node.readonly { i.bool_attr("disabled") } else { i }
                    })
                    .child::<Label, _>(|l| l.class("form-check-label").text(*option))
                })
            })
        }),
        WIDGET_TEXTAREA => {
            let text = page
                .values
                .get(&node.identifier)
                .cloned()
                .unwrap_or_else(|| node.value.clone());
            group.child::<Textarea, _>(|t| {
                let t = t
                    .id(&id)
                    .attr("name", &node.identifier)
                    .attr("rows", "4")
                    .class("form-control font-monospace")
                    .text(&text);
                if node.readonly { t.bool_attr("readonly") } else { t }
            })
        }
        _ => group.child::<Input, _>(|i| {
            let i = i
                .attr("type", "text")
                .id(&id)
                .attr("name", &node.identifier)
                .attr("value", &node.value)
                .class("form-control");
            if node.readonly { i.bool_attr("readonly") } else { i }
        }),
    };

    let group = match note {
        Some(note) => group.child::<Small, _>(|s| s.class("form-text text-muted").text(note)),
        None => group,
    };
    group.render_to(out);
}

fn render_denied(page: &DeniedPage) -> String {
    Element::<Div>::new()
        .class("alert alert-danger")
        .attr("role", "alert")
        .text(&page.message)
        .render()
}
