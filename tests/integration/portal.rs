//! Markup builders and mock mounting for a fake portal

use news_harvester::config::Config;
use std::path::Path;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const CATEGORY_NAMES: [&str; 8] = [
    "Entertainment",
    "Sports",
    "Funny",
    "Domestic",
    "World",
    "Columns",
    "IT",
    "Gourmet",
];

/// Listing path of a category in the fake portal
pub fn category_path(name: &str) -> String {
    format!("/categories/{}", name.to_lowercase())
}

/// Portal root with one `nav_color_N` entry per name (relative hrefs)
pub fn nav_html(names: &[&str]) -> String {
    let entries: String = names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            format!(
                r#"<li class="nav_item nav_color_{}"><a href="{}">{}</a></li>"#,
                i + 1,
                category_path(name),
                name
            )
        })
        .collect();
    format!(
        r#"<html><head><title>Portal</title></head><body><nav class="nav"><ul>{}</ul></nav></body></html>"#,
        entries
    )
}

/// Listing page linking to `hrefs`, with a pager when `next` is given
pub fn listing_html(hrefs: &[String], next: Option<&str>) -> String {
    let entries: String = hrefs
        .iter()
        .map(|href| {
            format!(
                r#"<div class="list_content"><a href="{}"><img src="/thumb.png"></a><a href="/ranking">rank</a></div>"#,
                href
            )
        })
        .collect();
    let pager = next
        .map(|href| {
            format!(
                r#"<div class="pager-link-option"><a class="btn" href="{}">Next</a></div>"#,
                href
            )
        })
        .unwrap_or_default();
    format!(
        r#"<html><body><div class="article_list">{}</div>{}</body></html>"#,
        entries, pager
    )
}

/// Article page with a heading and body paragraphs
pub fn article_html(title: &str, paragraphs: &[&str]) -> String {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<p>{}</p>", p))
        .collect();
    format!(
        r#"<html><body><header><span>Portal</span></header><h1>{}</h1><div class="article">{}</div></body></html>"#,
        title, body
    )
}

/// Serves `body` as HTML for GET requests to `route`
pub async fn mount_html(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

/// Serves `body` as HTML for GET requests to `route` after `delay`
pub async fn mount_slow_html(server: &MockServer, route: &str, body: String, delay: Duration) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .set_delay(delay),
        )
        .mount(server)
        .await;
}

/// Serves a bare status code for GET requests to `route`
pub async fn mount_status(server: &MockServer, route: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Mounts an article at `/articles/{id}` and returns its path
pub async fn mount_article(server: &MockServer, id: &str, title: &str) -> String {
    let route = format!("/articles/{}", id);
    let opening = format!("{} opens.", title);
    mount_html(
        server,
        &route,
        article_html(title, &[opening.as_str(), "It ends."]),
    )
    .await;
    route
}

/// Mounts the portal root plus an empty, pager-less listing for every category
/// except those in `skip`
pub async fn mount_portal(server: &MockServer, skip: &[&str]) {
    mount_html(server, "/", nav_html(&CATEGORY_NAMES)).await;
    for name in CATEGORY_NAMES.iter().filter(|name| !skip.contains(name)) {
        mount_html(server, &category_path(name), listing_html(&[], None)).await;
    }
}

/// A config pointing at the mock server with fast retries
pub fn test_config(base_url: &str, data_root: &Path) -> Config {
    let mut config = Config::default();
    config.site.base_url = base_url.to_string();
    config.output.data_root_dir = data_root.to_path_buf();
    config.fetch.timeout_secs = 5;
    config.fetch.connect_timeout_secs = 2;
    config.fetch.max_retries = 1;
    config.fetch.retry_delay_ms = 10;
    config.user_agent.crawler_name = "TestBot".to_string();
    config
}
